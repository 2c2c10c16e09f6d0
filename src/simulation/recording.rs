use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

use super::noise::{NoiseConfig, apply_noise};
use super::signal::{
    DEFAULT_PULSE_HARMONIC_RATIO, generate_pulse_waveform, generate_respiration_waveform,
};
use crate::error::{Result, VitalError};
use crate::recording::{RatePoint, RateTimestamp, Recording, RecordingMetadata, ReferenceRates};

/// Builder for synthetic recordings with known heart and respiratory rates
///
/// Start and end timestamps always agree with the true sampling rate, so
/// the declared rate can be set to a wrong value to exercise sampling-rate
/// inference.
///
/// # Example
/// ```
/// use vitalrate::simulation::SyntheticRecording;
///
/// let recording = SyntheticRecording::new(30.0, 20.0)
///     .with_heart_rate(72.0)
///     .with_declared_rate(15.0)
///     .build()
///     .unwrap();
/// assert_eq!(recording.sample_count(), 600);
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticRecording {
    sample_rate: f64,
    duration_secs: f64,
    heart_rate_bpm: f64,
    respiratory_rate_bpm: f64,
    harmonic_ratio: f64,
    offset: f64,
    pulse_noise: NoiseConfig,
    respiration_noise: NoiseConfig,
    declared_rate_hz: Option<f64>,
    start_time: DateTime<Utc>,
    reference: bool,
}

impl SyntheticRecording {
    pub fn new(sample_rate: f64, duration_secs: f64) -> Self {
        Self {
            sample_rate,
            duration_secs,
            heart_rate_bpm: 75.0,
            respiratory_rate_bpm: 15.0,
            harmonic_ratio: DEFAULT_PULSE_HARMONIC_RATIO,
            offset: 0.0,
            pulse_noise: NoiseConfig::default(),
            respiration_noise: NoiseConfig::default(),
            declared_rate_hz: Some(sample_rate),
            start_time: DateTime::from_timestamp(1_744_807_634, 917_000_000).unwrap_or_default(),
            reference: false,
        }
    }

    pub fn with_heart_rate(mut self, bpm: f64) -> Self {
        self.heart_rate_bpm = bpm;
        self
    }

    pub fn with_respiratory_rate(mut self, bpm: f64) -> Self {
        self.respiratory_rate_bpm = bpm;
        self
    }

    /// Relative amplitude of the pulse second harmonic.
    pub fn with_harmonic_ratio(mut self, ratio: f64) -> Self {
        self.harmonic_ratio = ratio;
        self
    }

    /// Constant offset added to both channels (raw sensor levels are rarely
    /// zero-mean).
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Same impairments on both channels, with decorrelated seeds.
    pub fn with_noise(mut self, config: NoiseConfig) -> Self {
        self.respiration_noise = NoiseConfig {
            seed: config.seed.map(|s| s.wrapping_add(1)),
            ..config.clone()
        };
        self.pulse_noise = config;
        self
    }

    pub fn with_pulse_noise(mut self, config: NoiseConfig) -> Self {
        self.pulse_noise = config;
        self
    }

    pub fn with_respiration_noise(mut self, config: NoiseConfig) -> Self {
        self.respiration_noise = config;
        self
    }

    /// Rate written to `metadata.samplingRate`, independent of the true rate.
    pub fn with_declared_rate(mut self, hz: f64) -> Self {
        self.declared_rate_hz = Some(hz);
        self
    }

    pub fn without_declared_rate(mut self) -> Self {
        self.declared_rate_hz = None;
        self
    }

    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = start;
        self
    }

    /// Attach per-second reference series at the true rates.
    pub fn with_reference(mut self, enabled: bool) -> Self {
        self.reference = enabled;
        self
    }

    pub fn num_samples(&self) -> usize {
        (self.duration_secs * self.sample_rate).round().max(0.0) as usize
    }

    /// # Errors
    /// Returns `VitalError::InsufficientData` when the duration and rate
    /// yield no samples.
    pub fn build(&self) -> Result<Recording> {
        if !(self.sample_rate > 0.0 && self.sample_rate.is_finite()) {
            return Err(VitalError::Config(format!(
                "synthetic sampling rate must be positive, got {}",
                self.sample_rate
            )));
        }
        let n = self.num_samples();
        if n == 0 {
            return Err(VitalError::InsufficientData {
                needed: 1,
                available: 0,
            });
        }

        let fs = self.sample_rate;
        let pulse = generate_pulse_waveform(n, fs, self.heart_rate_bpm, self.harmonic_ratio);
        let respiration = generate_respiration_waveform(n, fs, self.respiratory_rate_bpm);
        let pulse = self.finish(apply_noise(&pulse, &self.pulse_noise, fs));
        let respiration = self.finish(apply_noise(&respiration, &self.respiration_noise, fs));

        let elapsed = TimeDelta::microseconds((n as f64 / fs * 1e6).round() as i64);
        let end_time = self.start_time + elapsed;
        let metadata = RecordingMetadata {
            start_time: Some(format_timestamp(&self.start_time)),
            end_time: Some(format_timestamp(&end_time)),
            sampling_rate: self.declared_rate_hz,
        };

        let recording = Recording::new(metadata, pulse, respiration)?;
        if !self.reference {
            return Ok(recording);
        }

        let seconds = (n as f64 / fs).floor().max(1.0) as i64;
        let series = |bpm: f64| -> Vec<RatePoint> {
            (0..seconds)
                .map(|s| RatePoint {
                    value: bpm,
                    timestamp: Some(RateTimestamp::Text(format_timestamp(
                        &(self.start_time + TimeDelta::seconds(s)),
                    ))),
                })
                .collect()
        };
        Ok(recording.with_reference(ReferenceRates {
            heart: series(self.heart_rate_bpm),
            respiratory: series(self.respiratory_rate_bpm),
        }))
    }

    fn finish(&self, mut samples: Vec<f64>) -> Vec<f64> {
        for sample in samples.iter_mut() {
            *sample += self.offset;
        }
        samples
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
