//! Effective sampling-rate inference.
//!
//! Consumer camera and biosensor pipelines routinely report a rounded or
//! simply wrong sampling rate. The rate actually achieved is recovered from
//! the recording's start/end timestamps and its sample count; the declared
//! rate is only a fallback.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::config::{SamplingConfig, SamplingRate};
use crate::recording::RecordingMetadata;

/// Where the effective sampling rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// `sample_count / (end - start)`, floored
    Timestamps,
    /// Declared `samplingRate` from the metadata
    Declared,
    /// Fixed configuration default
    Default,
    /// Supplied by the caller
    Override,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RateSource::Timestamps => "timestamps",
            RateSource::Declared => "declared",
            RateSource::Default => "default",
            RateSource::Override => "override",
        };
        f.write_str(name)
    }
}

/// Sampling rate shared read-only by both tracks of one analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveSamplingRate {
    pub hz: f64,
    pub source: RateSource,
}

impl EffectiveSamplingRate {
    pub fn nyquist_hz(&self) -> f64 {
        0.5 * self.hz
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (including the `Z` suffix) and offset-less date-times,
/// which are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Recording duration in seconds, or `None` when either timestamp is
/// missing or unparseable.
pub fn recording_duration_secs(metadata: &RecordingMetadata) -> Option<f64> {
    let start = parse_timestamp(metadata.start_time.as_deref()?)?;
    let end = parse_timestamp(metadata.end_time.as_deref()?)?;
    let micros = (end - start).num_microseconds()?;
    Some(micros as f64 / 1e6)
}

/// Infer the effective sampling rate of a recording.
///
/// With a positive duration the rate is `sample_count / duration`, floored at
/// `config.min_rate_hz`. Otherwise the declared rate is used as-is, and when
/// that is missing too the configured default. Timing problems are never
/// reported as errors.
pub fn estimate_sampling_rate(
    metadata: &RecordingMetadata,
    sample_count: usize,
    config: &SamplingConfig,
) -> EffectiveSamplingRate {
    match recording_duration_secs(metadata) {
        Some(duration) if duration > 0.0 => {
            let measured = sample_count as f64 / duration;
            let hz = measured.max(config.min_rate_hz);
            if hz > measured {
                log::warn!(
                    "Measured sampling rate {:.3} Hz below floor, using {:.3} Hz",
                    measured,
                    hz
                );
            }
            log::debug!(
                "{} samples over {:.3}s -> {:.3} Hz (declared {:?})",
                sample_count,
                duration,
                hz,
                metadata.sampling_rate
            );
            EffectiveSamplingRate {
                hz,
                source: RateSource::Timestamps,
            }
        }
        duration => {
            log::warn!(
                "Timing metadata unusable (duration {:?}), falling back to declared rate",
                duration
            );
            declared_or_default(metadata, config)
        }
    }
}

/// Resolve the effective rate, letting a caller-supplied value win.
pub fn resolve_sampling_rate(
    metadata: &RecordingMetadata,
    sample_count: usize,
    config: &SamplingConfig,
    manual: Option<SamplingRate>,
) -> EffectiveSamplingRate {
    match manual {
        Some(rate) => EffectiveSamplingRate {
            hz: rate.as_hz(),
            source: RateSource::Override,
        },
        None => estimate_sampling_rate(metadata, sample_count, config),
    }
}

fn declared_or_default(
    metadata: &RecordingMetadata,
    config: &SamplingConfig,
) -> EffectiveSamplingRate {
    match metadata.sampling_rate {
        Some(hz) if hz > 0.0 && hz.is_finite() => EffectiveSamplingRate {
            hz,
            source: RateSource::Declared,
        },
        _ => {
            log::warn!(
                "No usable declared sampling rate, using default {:.1} Hz",
                config.default_rate_hz
            );
            EffectiveSamplingRate {
                hz: config.default_rate_hz,
                source: RateSource::Default,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(start: &str, end: &str, declared: Option<f64>) -> RecordingMetadata {
        RecordingMetadata {
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            sampling_rate: declared,
        }
    }

    #[test]
    fn test_rate_from_timestamps() {
        let meta = metadata("2025-04-16T12:47:14Z", "2025-04-16T12:47:24Z", Some(15.0));
        let rate = estimate_sampling_rate(&meta, 300, &SamplingConfig::default());
        assert_eq!(rate.source, RateSource::Timestamps);
        assert!((rate.hz - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_fractional_seconds_and_offsets() {
        let meta = metadata(
            "2025-04-16T12:47:14.917Z",
            "2025-04-16T14:47:19.917+02:00",
            None,
        );
        let duration = recording_duration_secs(&meta).unwrap();
        assert!((duration - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_naive_timestamps_read_as_utc() {
        let meta = metadata("2025-04-16T12:47:14.5", "2025-04-16 12:47:24.5", None);
        let duration = recording_duration_secs(&meta).unwrap();
        assert!((duration - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_floor_applied_to_measured_rate() {
        // 50 samples over 10 s is 5 Hz, below the 10 Hz floor
        let meta = metadata("2025-04-16T12:47:14Z", "2025-04-16T12:47:24Z", Some(30.0));
        let rate = estimate_sampling_rate(&meta, 50, &SamplingConfig::default());
        assert_eq!(rate.source, RateSource::Timestamps);
        assert!((rate.hz - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_duration_uses_declared() {
        let meta = metadata("2025-04-16T12:47:24Z", "2025-04-16T12:47:24Z", Some(25.0));
        let rate = estimate_sampling_rate(&meta, 300, &SamplingConfig::default());
        assert_eq!(rate.source, RateSource::Declared);
        assert!((rate.hz - 25.0).abs() < 1e-9);

        let meta = metadata("2025-04-16T12:47:30Z", "2025-04-16T12:47:24Z", Some(25.0));
        let rate = estimate_sampling_rate(&meta, 300, &SamplingConfig::default());
        assert_eq!(rate.source, RateSource::Declared);
    }

    #[test]
    fn test_declared_rate_not_floored() {
        let meta = metadata("garbage", "2025-04-16T12:47:24Z", Some(8.0));
        let rate = estimate_sampling_rate(&meta, 300, &SamplingConfig::default());
        assert_eq!(rate.source, RateSource::Declared);
        assert!((rate.hz - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_timestamps_fall_back() {
        let meta = metadata("yesterday", "today", Some(15.0));
        assert!(recording_duration_secs(&meta).is_none());
        let rate = estimate_sampling_rate(&meta, 300, &SamplingConfig::default());
        assert_eq!(rate.source, RateSource::Declared);
        assert!((rate.hz - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_everything_uses_default() {
        let rate = estimate_sampling_rate(
            &RecordingMetadata::default(),
            300,
            &SamplingConfig::default(),
        );
        assert_eq!(rate.source, RateSource::Default);
        assert!((rate.hz - crate::constants::DEFAULT_SAMPLING_RATE_HZ).abs() < 1e-9);
    }

    #[test]
    fn test_override_wins() {
        let meta = metadata("2025-04-16T12:47:14Z", "2025-04-16T12:47:24Z", Some(15.0));
        let rate = resolve_sampling_rate(
            &meta,
            300,
            &SamplingConfig::default(),
            Some(SamplingRate::from_hz(12.5)),
        );
        assert_eq!(rate.source, RateSource::Override);
        assert!((rate.hz - 12.5).abs() < 1e-9);
    }
}
