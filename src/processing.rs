use std::thread;

use serde::Serialize;

use crate::config::{AnalysisConfig, BandConfig, SamplingRate, TrackConfig};
use crate::error::Result;
use crate::rate::{
    EstimateMethod, RateEstimate, ReferenceSummary, SpectralRateEstimator, VitalSign,
};
use crate::recording::Recording;
use crate::signal_processing::{ConditionedSignal, SignalConditioner};
use crate::timing::{EffectiveSamplingRate, recording_duration_secs, resolve_sampling_rate};

/// Result of conditioning and estimating one vital-sign track
#[derive(Debug, Clone, Serialize)]
pub struct TrackAnalysis {
    pub sign: VitalSign,
    pub band: BandConfig,
    pub rate: RateEstimate,
    pub method: EstimateMethod,
    pub peak_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceSummary>,
    #[serde(skip)]
    pub conditioned: ConditionedSignal,
}

impl TrackAnalysis {
    /// Estimate minus the reference median, when a reference was supplied.
    pub fn reference_difference(&self) -> Option<f64> {
        self.reference
            .map(|reference| reference.difference(self.rate.per_minute))
    }
}

/// Both tracks of one recording plus how its sampling rate was resolved
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub sampling_rate: EffectiveSamplingRate,
    pub declared_rate_hz: Option<f64>,
    pub duration_secs: Option<f64>,
    pub sample_count: usize,
    pub pulse: TrackAnalysis,
    pub respiration: TrackAnalysis,
}

impl AnalysisReport {
    /// Heart rate in beats per minute (0 when unavailable)
    pub fn heart_rate(&self) -> f64 {
        self.pulse.rate.per_minute
    }

    /// Respiratory rate in breaths per minute (0 when unavailable)
    pub fn respiratory_rate(&self) -> f64 {
        self.respiration.rate.per_minute
    }

    pub fn tracks(&self) -> [&TrackAnalysis; 2] {
        [&self.pulse, &self.respiration]
    }
}

/// Batch HR/RR pipeline over complete recordings
///
/// Resolves the effective sampling rate once per recording, then conditions
/// and estimates the pulse and respiration tracks independently. The two
/// tracks share nothing but the read-only recording and rate, so they are
/// evaluated on scoped threads unless `parallel` is disabled.
pub struct VitalSignsProcessor {
    config: AnalysisConfig,
    estimator: SpectralRateEstimator,
    compare_reference: bool,
}

impl VitalSignsProcessor {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.check()?;
        let estimator = SpectralRateEstimator::new(config.spectral.clone());
        Ok(Self {
            config,
            estimator,
            compare_reference: true,
        })
    }

    /// Enable or disable summarising the recording's reference rates.
    pub fn with_reference_comparison(mut self, enabled: bool) -> Self {
        self.compare_reference = enabled;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a recording, optionally forcing the sampling rate.
    ///
    /// # Errors
    /// Fails when a track's band cannot be realised at the effective rate.
    /// Unusable timing metadata and degenerate spectra are not errors.
    pub fn analyze(
        &self,
        recording: &Recording,
        manual_rate: Option<SamplingRate>,
    ) -> Result<AnalysisReport> {
        let metadata = recording.metadata();
        let sample_count = recording.sample_count();
        let sampling_rate =
            resolve_sampling_rate(metadata, sample_count, &self.config.sampling, manual_rate);
        log::debug!(
            "Effective sampling rate {:.3} Hz from {}",
            sampling_rate.hz,
            sampling_rate.source
        );

        let fs = sampling_rate.hz;
        let (pulse, respiration) = if self.config.parallel {
            thread::scope(|s| {
                let pulse = s.spawn(|| self.analyze_track(VitalSign::Pulse, recording.pulse(), fs));
                let respiration = s.spawn(|| {
                    self.analyze_track(VitalSign::Respiration, recording.respiration(), fs)
                });
                (join(pulse), join(respiration))
            })
        } else {
            (
                self.analyze_track(VitalSign::Pulse, recording.pulse(), fs),
                self.analyze_track(VitalSign::Respiration, recording.respiration(), fs),
            )
        };
        let mut pulse = pulse?;
        let mut respiration = respiration?;

        if self.compare_reference {
            let reference = recording.reference();
            pulse.reference = ReferenceSummary::from_values(&reference.heart_values());
            respiration.reference = ReferenceSummary::from_values(&reference.respiratory_values());
        }

        for track in [&pulse, &respiration] {
            match track.reference {
                Some(reference) => log::info!(
                    "{}: {:.1} {} (reference median {:.1})",
                    track.sign.abbreviation(),
                    track.rate.per_minute,
                    track.sign.unit(),
                    reference.median
                ),
                None => log::info!(
                    "{}: {:.1} {}",
                    track.sign.abbreviation(),
                    track.rate.per_minute,
                    track.sign.unit()
                ),
            }
        }

        Ok(AnalysisReport {
            sampling_rate,
            declared_rate_hz: metadata.sampling_rate,
            duration_secs: recording_duration_secs(metadata),
            sample_count,
            pulse,
            respiration,
        })
    }

    /// Condition one raw waveform and estimate its rate.
    pub fn analyze_track(
        &self,
        sign: VitalSign,
        raw: &[f64],
        sample_rate: f64,
    ) -> Result<TrackAnalysis> {
        let track = self.track_config(sign);
        let conditioner = SignalConditioner::new(track, sample_rate)?;
        let conditioned = conditioner.condition(raw)?;
        let estimate = self
            .estimator
            .estimate(conditioned.samples(), sample_rate, &track.band);

        if !estimate.method.is_reliable() {
            log::warn!("No reliable {} estimate ({})", sign, estimate.method);
        }

        Ok(TrackAnalysis {
            sign,
            band: track.band,
            rate: RateEstimate::from_frequency(estimate.frequency_hz),
            method: estimate.method,
            peak_count: estimate.peak_count,
            reference: None,
            conditioned,
        })
    }

    fn track_config(&self, sign: VitalSign) -> &TrackConfig {
        match sign {
            VitalSign::Pulse => &self.config.pulse,
            VitalSign::Respiration => &self.config.respiration,
        }
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VitalError;
    use crate::recording::{RatePoint, RecordingMetadata, ReferenceRates};
    use crate::timing::RateSource;
    use std::f64::consts::PI;

    fn sine(freq_hz: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 5.0 + (2.0 * PI * freq_hz * i as f64 / sample_rate).sin())
            .collect()
    }

    /// 600 samples over 20 s (30 Hz) with a deliberately wrong declared rate
    fn recording() -> Recording {
        let metadata = RecordingMetadata {
            start_time: Some("2025-04-16T12:47:14Z".to_string()),
            end_time: Some("2025-04-16T12:47:34Z".to_string()),
            sampling_rate: Some(15.0),
        };
        Recording::new(metadata, sine(1.25, 30.0, 600), sine(0.25, 30.0, 600)).unwrap()
    }

    #[test]
    fn test_analyze_recovers_rates() {
        let processor = VitalSignsProcessor::new(AnalysisConfig::default()).unwrap();
        let report = processor.analyze(&recording(), None).unwrap();

        assert_eq!(report.sampling_rate.source, RateSource::Timestamps);
        assert!((report.sampling_rate.hz - 30.0).abs() < 1e-9);
        assert_eq!(report.declared_rate_hz, Some(15.0));
        assert_eq!(report.sample_count, 600);
        assert!((report.heart_rate() - 75.0).abs() <= 1.5);
        assert!((report.respiratory_rate() - 15.0).abs() <= 1.5);
        assert_eq!(report.pulse.conditioned.len(), 600);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let rec = recording();
        let parallel = VitalSignsProcessor::new(AnalysisConfig::default()).unwrap();
        let sequential = VitalSignsProcessor::new(AnalysisConfig {
            parallel: false,
            ..AnalysisConfig::default()
        })
        .unwrap();

        let a = parallel.analyze(&rec, None).unwrap();
        let b = sequential.analyze(&rec, None).unwrap();
        assert_eq!(a.pulse.rate, b.pulse.rate);
        assert_eq!(a.respiration.rate, b.respiration.rate);
        assert_eq!(a.pulse.conditioned, b.pulse.conditioned);
    }

    #[test]
    fn test_override_below_band_is_config_error() {
        let processor = VitalSignsProcessor::new(AnalysisConfig::default()).unwrap();
        let result = processor.analyze(&recording(), Some(SamplingRate::from_hz(6.0)));
        assert!(matches!(result, Err(VitalError::InvalidBand { .. })));
    }

    #[test]
    fn test_reference_summary_attached() {
        let reference = ReferenceRates {
            heart: vec![RatePoint::new(74.0), RatePoint::new(76.0)],
            respiratory: vec![],
        };
        let rec = recording().with_reference(reference);

        let processor = VitalSignsProcessor::new(AnalysisConfig::default()).unwrap();
        let report = processor.analyze(&rec, None).unwrap();
        let summary = report.pulse.reference.unwrap();
        assert!((summary.median - 75.0).abs() < 1e-12);
        assert!(report.respiration.reference.is_none());
        assert!(report.pulse.reference_difference().unwrap().abs() <= 1.5);

        let processor = processor.with_reference_comparison(false);
        let report = processor.analyze(&rec, None).unwrap();
        assert!(report.pulse.reference.is_none());
    }

    #[test]
    fn test_flat_track_reports_zero() {
        let metadata = RecordingMetadata {
            sampling_rate: Some(30.0),
            ..RecordingMetadata::default()
        };
        let rec = Recording::new(metadata, vec![2.0; 300], sine(0.25, 30.0, 300)).unwrap();
        let processor = VitalSignsProcessor::new(AnalysisConfig::default()).unwrap();
        let report = processor.analyze(&rec, None).unwrap();
        assert_eq!(report.heart_rate(), 0.0);
        assert!(!report.pulse.method.is_reliable());
        assert_eq!(report.sampling_rate.source, RateSource::Declared);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AnalysisConfig::default();
        config.pulse.filter_order = 0;
        assert!(matches!(
            VitalSignsProcessor::new(config),
            Err(VitalError::Config(_))
        ));
    }
}
