use super::{FileReport, Formatter};
use crate::processing::TrackAnalysis;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn track_line(&self, track: &TrackAnalysis) -> String {
        let mut line = format!(
            "  {}: {:>6.1} {} ({:.3} Hz)",
            track.sign.abbreviation(),
            track.rate.per_minute,
            track.sign.unit(),
            track.rate.frequency_hz
        );
        if let Some(reference) = track.reference {
            line.push_str(&format!(
                "  reference median {:.1} ({:+.1})",
                reference.median,
                reference.difference(track.rate.per_minute)
            ));
        }
        if self.verbose {
            line.push_str(&format!(
                " [{}, {} peaks, band {} Hz]",
                track.method, track.peak_count, track.band
            ));
            if let Some(reference) = track.reference {
                line.push_str(&format!(
                    " [ref n={} mean {:.1} std {:.1} range {:.1}-{:.1}]",
                    reference.count, reference.mean, reference.std_dev, reference.min, reference.max
                ));
            }
        }
        line
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &FileReport) -> String {
        let Some(analysis) = &report.analysis else {
            return format!(
                "{}: ERROR {}",
                report.filename,
                report.error.as_deref().unwrap_or("unknown error")
            );
        };

        let mut out = format!(
            "{}: {} samples @ {:.3} Hz ({})",
            report.filename,
            analysis.sample_count,
            analysis.sampling_rate.hz,
            analysis.sampling_rate.source
        );
        if self.verbose {
            let declared = analysis
                .declared_rate_hz
                .map_or("-".to_string(), |hz| format!("{:.3} Hz", hz));
            let duration = analysis
                .duration_secs
                .map_or("-".to_string(), |s| format!("{:.3} s", s));
            out.push_str(&format!(" [declared {}, duration {}]", declared, duration));
        }
        for track in analysis.tracks() {
            out.push('\n');
            out.push_str(&self.track_line(track));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_text_report() {
        let text = TextFormatter::new(false).format(&fixtures::report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "subject_01.json: 600 samples @ 30.000 Hz (timestamps)");
        assert!(lines[1].contains("HR:   75.0 BPM (1.250 Hz)"));
        assert!(lines[1].contains("reference median 75.0 (+0.0)"));
        assert!(lines[2].contains("RR:   15.0 breaths/min"));
    }

    #[test]
    fn test_verbose_text_report() {
        let text = TextFormatter::new(true).format(&fixtures::report());
        assert!(text.contains("declared 15.000 Hz"));
        assert!(text.contains("harmonic corrected from 2.500 Hz"));
        assert!(text.contains("ref n=2"));
    }

    #[test]
    fn test_error_line() {
        let text = TextFormatter::new(false).format(&FileReport::failure("x.json", "bad"));
        assert_eq!(text, "x.json: ERROR bad");
    }
}
