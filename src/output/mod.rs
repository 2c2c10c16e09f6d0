mod csv;
mod json;
mod text;

use serde::Serialize;

use crate::processing::AnalysisReport;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Outcome of analyzing one recording file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub analysis: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn success(filename: impl Into<String>, analysis: AnalysisReport) -> Self {
        Self {
            filename: filename.into(),
            analysis: Some(analysis),
            error: None,
        }
    }

    pub fn failure(filename: impl Into<String>, error: impl ToString) -> Self {
        Self {
            filename: filename.into(),
            analysis: None,
            error: Some(error.to_string()),
        }
    }
}

pub trait Formatter: Send {
    fn format(&self, report: &FileReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}
