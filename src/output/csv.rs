use super::{FileReport, Formatter};
use crate::processing::TrackAnalysis;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &FileReport) -> String {
        let error = report.error.as_deref().map_or(String::new(), escape);
        match &report.analysis {
            Some(analysis) => format!(
                "{},{:.3},{},{},{},{}",
                escape(&report.filename),
                analysis.sampling_rate.hz,
                analysis.sampling_rate.source,
                track_columns(&analysis.pulse),
                track_columns(&analysis.respiration),
                error
            ),
            None => format!("{},,,,,,,,,,,{}", escape(&report.filename), error),
        }
    }

    fn header(&self) -> Option<&'static str> {
        Some(concat!(
            "file,sampling_rate_hz,rate_source,",
            "hr_bpm,hr_hz,hr_method,hr_ref_median,",
            "rr_bpm,rr_hz,rr_method,rr_ref_median,error"
        ))
    }
}

fn track_columns(track: &TrackAnalysis) -> String {
    let reference = track
        .reference
        .map_or(String::new(), |r| format!("{:.1}", r.median));
    format!(
        "{:.1},{:.3},{},{}",
        track.rate.per_minute,
        track.rate.frequency_hz,
        escape(&track.method.to_string()),
        reference
    )
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    fn columns(line: &str) -> usize {
        line.split(',').count()
    }

    #[test]
    fn test_row_matches_header() {
        let formatter = CsvFormatter;
        let header = formatter.header().unwrap();
        let row = formatter.format(&fixtures::report());
        assert_eq!(columns(&row), columns(header));
        assert!(row.starts_with("subject_01.json,30.000,timestamps,75.0,1.250,"));
        assert!(row.contains(",75.0,"));
    }

    #[test]
    fn test_error_row() {
        let formatter = CsvFormatter;
        let row = formatter.format(&FileReport::failure("bad.json", "Malformed recording: x, y"));
        assert_eq!(row, "bad.json,,,,,,,,,,,\"Malformed recording: x, y\"");
    }
}
