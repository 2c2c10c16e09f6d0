use crate::config::TrackConfig;
use crate::error::Result;

use super::dc_removal::remove_dc;
use super::iir_butterworth_bandpass::ButterworthBandpass;

/// DC-free, bandpass-limited waveform at the effective sampling rate.
///
/// Always the same length as the raw waveform it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionedSignal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl ConditionedSignal {
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Mean removal followed by zero-phase Butterworth bandpass filtering
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    bandpass: ButterworthBandpass,
}

impl SignalConditioner {
    /// # Errors
    /// Fails with a configuration error when the track's band cannot be
    /// realised at `sample_rate`; no partial filter is ever built.
    pub fn new(track: &TrackConfig, sample_rate: f64) -> Result<Self> {
        Ok(Self {
            bandpass: ButterworthBandpass::new(track.band, sample_rate, track.filter_order)?,
        })
    }

    pub fn bandpass(&self) -> &ButterworthBandpass {
        &self.bandpass
    }

    pub fn condition(&self, raw: &[f64]) -> Result<ConditionedSignal> {
        let centered = remove_dc(raw);
        let samples = self.bandpass.filtfilt(&centered)?;
        debug_assert_eq!(samples.len(), raw.len());
        Ok(ConditionedSignal {
            samples,
            sample_rate: self.bandpass.sample_rate(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BandConfig;
    use crate::signal_processing::math::mean;

    #[test]
    fn test_condition_preserves_length() {
        let conditioner =
            SignalConditioner::new(&TrackConfig::new(BandConfig::PULSE), 30.0).unwrap();
        for n in [1, 7, 64, 300] {
            let raw: Vec<f64> = (0..n).map(|i| 10.0 + (i as f64 * 0.4).sin()).collect();
            let out = conditioner.condition(&raw).unwrap();
            assert_eq!(out.len(), n);
            assert_eq!(out.sample_rate(), 30.0);
        }
    }

    #[test]
    fn test_condition_removes_offset() {
        let conditioner =
            SignalConditioner::new(&TrackConfig::new(BandConfig::RESPIRATION), 15.0).unwrap();
        let raw: Vec<f64> = (0..900)
            .map(|i| 250.0 + (2.0 * std::f64::consts::PI * 0.3 * i as f64 / 15.0).sin())
            .collect();
        let out = conditioner.condition(&raw).unwrap();
        assert!(mean(out.samples()).abs() < 0.05);
    }

    #[test]
    fn test_condition_invalid_band() {
        let track = TrackConfig::new(BandConfig::new(0.6, 8.0));
        assert!(SignalConditioner::new(&track, 15.0).is_err());
    }
}
