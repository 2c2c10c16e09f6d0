use super::{FileReport, Formatter};

/// One JSON object per recording (JSON Lines)
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, report: &FileReport) -> String {
        match serde_json::to_string(report) {
            Ok(line) => line,
            Err(e) => serde_json::json!({
                "filename": report.filename,
                "analysis": null,
                "error": format!("failed to serialize report: {}", e),
            })
            .to_string(),
        }
    }
}
