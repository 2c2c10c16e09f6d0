use crate::config::{BandConfig, SpectralConfig};
use crate::constants::MIN_POWER_THRESHOLD;
use crate::rate::estimate::{EstimateMethod, FrequencyEstimate};
use crate::signal_processing::{BandSpectrum, SpectralPeak, find_spectral_peaks};

/// FFT-based dominant-frequency estimator with second-harmonic correction
///
/// Pulse and respiration spectra often carry a second harmonic strong enough
/// to beat the fundamental. After picking the highest-power peak in the
/// search band, the estimator looks for a weaker peak at half its frequency
/// with enough power to be the physiological fundamental, and reports that
/// instead.
#[derive(Debug, Clone, Default)]
pub struct SpectralRateEstimator {
    config: SpectralConfig,
}

impl SpectralRateEstimator {
    pub fn new(config: SpectralConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Estimate the dominant physiological frequency of `signal` within `band`.
    ///
    /// Never fails: an empty or powerless band yields a 0 Hz estimate, and a
    /// band without a clean local peak yields the band maximum.
    pub fn estimate(
        &self,
        signal: &[f64],
        sample_rate: f64,
        band: &BandConfig,
    ) -> FrequencyEstimate {
        let spectrum = BandSpectrum::compute(signal, sample_rate, band.low_hz, band.high_hz);
        self.estimate_spectrum(&spectrum)
    }

    /// Same as [`SpectralRateEstimator::estimate`] on a precomputed spectrum.
    pub fn estimate_spectrum(&self, spectrum: &BandSpectrum) -> FrequencyEstimate {
        let Some(max_idx) = spectrum.argmax() else {
            log::debug!("Empty search band, no estimate");
            return FrequencyEstimate::none(EstimateMethod::EmptyBand);
        };
        if spectrum.power[max_idx] <= MIN_POWER_THRESHOLD {
            log::debug!("No power in search band, no estimate");
            return FrequencyEstimate::none(EstimateMethod::FlatSpectrum);
        }

        let peaks = find_spectral_peaks(spectrum, self.config.peak_threshold_ratio);
        log::debug!(
            "{} candidate peaks in bins {}..{}",
            peaks.len(),
            spectrum.min_idx,
            spectrum.max_idx
        );

        let Some(dominant) = peaks.first() else {
            return FrequencyEstimate {
                frequency_hz: spectrum.frequency_at(max_idx),
                method: EstimateMethod::GlobalMaximum,
                peak_count: 0,
            };
        };

        match select_fundamental(&peaks, &self.config) {
            Some(fundamental) => {
                log::info!(
                    "Detected harmonic: {:.3} Hz is the second harmonic of {:.3} Hz",
                    dominant.frequency_hz,
                    fundamental.frequency_hz
                );
                FrequencyEstimate {
                    frequency_hz: fundamental.frequency_hz,
                    method: EstimateMethod::HarmonicCorrected {
                        dominant_hz: dominant.frequency_hz,
                    },
                    peak_count: peaks.len(),
                }
            }
            None => FrequencyEstimate {
                frequency_hz: dominant.frequency_hz,
                method: EstimateMethod::DominantPeak,
                peak_count: peaks.len(),
            },
        }
    }
}

/// Find the peak the dominant one is a second harmonic of.
///
/// `peaks` must be sorted by descending power with the dominant peak first.
/// The first later peak whose frequency ratio `dominant / peak` lies strictly
/// inside the configured window and whose power exceeds the configured
/// fraction of the dominant power wins.
pub fn select_fundamental<'a>(
    peaks: &'a [SpectralPeak],
    config: &SpectralConfig,
) -> Option<&'a SpectralPeak> {
    let (dominant, rest) = peaks.split_first()?;
    rest.iter().find(|peak| {
        let ratio = dominant.frequency_hz / peak.frequency_hz;
        ratio > config.harmonic_ratio_min
            && ratio < config.harmonic_ratio_max
            && peak.power > config.harmonic_power_ratio * dominant.power
    })
}
