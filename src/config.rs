//! Configuration for the vital-sign rate estimator.
//!
//! Every section has defaults matching the reference analysis, so an empty
//! TOML file yields `AnalysisConfig::default()`. Any subset can be overridden:
//!
//! ```toml
//! parallel = false
//!
//! [pulse.band]
//! low_hz = 0.7
//! high_hz = 3.0
//!
//! [spectral]
//! peak_threshold_ratio = 0.25
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{
    DEFAULT_FILTER_ORDER, DEFAULT_SAMPLING_RATE_HZ, HARMONIC_POWER_RATIO, HARMONIC_RATIO_MAX,
    HARMONIC_RATIO_MIN, MIN_SAMPLING_RATE_HZ, PEAK_THRESHOLD_RATIO, PULSE_BAND_HZ,
    RESPIRATION_BAND_HZ,
};
use crate::error::{Result, VitalError};

/// Sampling rate specification
///
/// Can be specified as either a frequency in Hz or a sample period in
/// milliseconds, which is how frame intervals are often reported by camera
/// tooling.
///
/// # Parsing formats
/// - `15` - frequency in Hz (no suffix)
/// - `15hz` or `15Hz` - frequency in Hz (explicit)
/// - `66.667ms` - sample period in milliseconds
///
/// # Example
/// ```
/// use vitalrate::config::SamplingRate;
///
/// let rate: SamplingRate = "40ms".parse().unwrap();
/// assert!((rate.as_hz() - 25.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingRate(f64);

impl SamplingRate {
    /// Create from frequency in Hz
    pub fn from_hz(hz: f64) -> Self {
        Self(hz)
    }

    /// Create from sample period in milliseconds
    pub fn from_period_ms(ms: f64) -> Self {
        Self(1000.0 / ms)
    }

    /// Get frequency in Hz
    pub fn as_hz(&self) -> f64 {
        self.0
    }

    /// Get sample period in milliseconds
    pub fn as_period_ms(&self) -> f64 {
        1000.0 / self.0
    }
}

impl fmt::Display for SamplingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}hz", self.0)
    }
}

impl FromStr for SamplingRate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(num) = s.strip_suffix("ms") {
            let ms: f64 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid sample period: {}", s))?;
            if !(ms > 0.0 && ms.is_finite()) {
                return Err("sample period must be positive".to_string());
            }
            return Ok(Self::from_period_ms(ms));
        }

        let num = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
            .unwrap_or(s);

        let hz: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid sampling rate: {}", s))?;
        if !(hz > 0.0 && hz.is_finite()) {
            return Err("sampling rate must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

/// Physiological frequency band in Hz
///
/// Used both as the bandpass cutoffs and as the spectral search range of a
/// track. A band is only meaningful for a given sampling rate; see
/// [`BandConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    /// Lower cutoff in Hz
    pub low_hz: f64,
    /// Upper cutoff in Hz
    pub high_hz: f64,
}

impl BandConfig {
    pub const PULSE: Self = Self {
        low_hz: PULSE_BAND_HZ.0,
        high_hz: PULSE_BAND_HZ.1,
    };

    pub const RESPIRATION: Self = Self {
        low_hz: RESPIRATION_BAND_HZ.0,
        high_hz: RESPIRATION_BAND_HZ.1,
    };

    pub fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Check `0 < low < high < nyquist` for the given sampling rate.
    ///
    /// # Errors
    /// Returns `VitalError::InvalidBand` when the band cannot be realised.
    pub fn validate(&self, sample_rate: f64) -> Result<()> {
        let nyquist_hz = 0.5 * sample_rate;
        let ok = self.low_hz.is_finite()
            && self.high_hz.is_finite()
            && self.low_hz > 0.0
            && self.low_hz < self.high_hz
            && self.high_hz < nyquist_hz;
        if ok {
            Ok(())
        } else {
            Err(VitalError::InvalidBand {
                low_hz: self.low_hz,
                high_hz: self.high_hz,
                nyquist_hz,
            })
        }
    }

    /// Cutoffs normalized by the Nyquist frequency.
    pub fn normalized(&self, sample_rate: f64) -> (f64, f64) {
        let nyquist_hz = 0.5 * sample_rate;
        (self.low_hz / nyquist_hz, self.high_hz / nyquist_hz)
    }

    /// Band edges expressed per minute.
    pub fn per_minute(&self) -> (f64, f64) {
        (self.low_hz * 60.0, self.high_hz * 60.0)
    }
}

impl fmt::Display for BandConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low_hz, self.high_hz)
    }
}

/// Parses `LOW-HIGH` in Hz, e.g. `0.6-3.3`.
impl FromStr for BandConfig {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (low, high) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid band '{}', expected LOW-HIGH", s))?;
        let low_hz: f64 = low
            .trim()
            .parse()
            .map_err(|_| format!("invalid lower cutoff: {}", low))?;
        let high_hz: f64 = high
            .trim()
            .parse()
            .map_err(|_| format!("invalid upper cutoff: {}", high))?;
        if !(low_hz > 0.0 && low_hz < high_hz) {
            return Err(format!("band must satisfy 0 < low < high, got {}", s));
        }
        Ok(Self::new(low_hz, high_hz))
    }
}

/// Top-level analysis configuration
///
/// # Example
/// ```
/// use vitalrate::config::{AnalysisConfig, BandConfig};
///
/// let mut config = AnalysisConfig::default();
/// config.pulse.band = BandConfig::new(0.7, 3.0);
/// assert_eq!(config.respiration.band, BandConfig::RESPIRATION);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sampling-rate inference
    pub sampling: SamplingConfig,
    /// Pulse (BVP) track
    #[serde(deserialize_with = "pulse_track")]
    pub pulse: TrackConfig,
    /// Respiration track
    #[serde(deserialize_with = "respiration_track")]
    pub respiration: TrackConfig,
    /// Peak picking and harmonic correction
    pub spectral: SpectralConfig,
    /// Evaluate the two tracks on separate threads
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            pulse: TrackConfig::new(BandConfig::PULSE),
            respiration: TrackConfig::new(BandConfig::RESPIRATION),
            spectral: SpectralConfig::default(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document, filling unspecified fields with defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| VitalError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Sanity checks that do not depend on the sampling rate.
    ///
    /// Band validity against Nyquist is checked per recording by the
    /// conditioner once the effective rate is known.
    pub fn check(&self) -> Result<()> {
        if !(self.sampling.min_rate_hz > 0.0) {
            return Err(VitalError::Config(format!(
                "sampling.min_rate_hz must be positive, got {}",
                self.sampling.min_rate_hz
            )));
        }
        if !(self.sampling.default_rate_hz > 0.0) {
            return Err(VitalError::Config(format!(
                "sampling.default_rate_hz must be positive, got {}",
                self.sampling.default_rate_hz
            )));
        }
        for (name, track) in [("pulse", &self.pulse), ("respiration", &self.respiration)] {
            if track.filter_order == 0 {
                return Err(VitalError::Config(format!(
                    "{}.filter_order must be at least 1",
                    name
                )));
            }
        }
        let s = &self.spectral;
        if !(s.harmonic_ratio_min < s.harmonic_ratio_max) {
            return Err(VitalError::Config(format!(
                "spectral.harmonic_ratio_min ({}) must be below harmonic_ratio_max ({})",
                s.harmonic_ratio_min, s.harmonic_ratio_max
            )));
        }
        if !(0.0..1.0).contains(&s.peak_threshold_ratio) {
            return Err(VitalError::Config(format!(
                "spectral.peak_threshold_ratio must be in [0, 1), got {}",
                s.peak_threshold_ratio
            )));
        }
        Ok(())
    }
}

/// Sampling-rate inference configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Floor applied to rates inferred from timestamps
    pub min_rate_hz: f64,
    /// Rate used when neither timestamps nor declared rate are usable
    pub default_rate_hz: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            min_rate_hz: MIN_SAMPLING_RATE_HZ,
            default_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
        }
    }
}

/// Per-track conditioning configuration
///
/// In TOML each field of a `[pulse]` or `[respiration]` section, band edges
/// included, may be given on its own; the rest keep that track's defaults.
#[derive(Debug, Clone)]
pub struct TrackConfig {
    /// Bandpass cutoffs, also used as the spectral search range
    pub band: BandConfig,
    /// Butterworth prototype order (applied twice by zero-phase filtering)
    pub filter_order: usize,
}

impl TrackConfig {
    pub fn new(band: BandConfig) -> Self {
        Self {
            band,
            filter_order: DEFAULT_FILTER_ORDER,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TrackOverride {
    band: BandOverride,
    filter_order: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BandOverride {
    low_hz: Option<f64>,
    high_hz: Option<f64>,
}

impl TrackOverride {
    fn apply(self, defaults: TrackConfig) -> TrackConfig {
        TrackConfig {
            band: BandConfig {
                low_hz: self.band.low_hz.unwrap_or(defaults.band.low_hz),
                high_hz: self.band.high_hz.unwrap_or(defaults.band.high_hz),
            },
            filter_order: self.filter_order.unwrap_or(defaults.filter_order),
        }
    }
}

fn pulse_track<'de, D>(deserializer: D) -> std::result::Result<TrackConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = TrackOverride::deserialize(deserializer)?;
    Ok(overrides.apply(TrackConfig::new(BandConfig::PULSE)))
}

fn respiration_track<'de, D>(deserializer: D) -> std::result::Result<TrackConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = TrackOverride::deserialize(deserializer)?;
    Ok(overrides.apply(TrackConfig::new(BandConfig::RESPIRATION)))
}

/// Peak picking and harmonic-correction thresholds
///
/// The defaults are empirical and kept for compatibility with existing
/// analyses; change them only when recalibrating against labelled data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Candidate peaks must exceed this fraction of the band maximum
    pub peak_threshold_ratio: f64,
    /// Lower bound (exclusive) of the dominant/candidate frequency ratio
    pub harmonic_ratio_min: f64,
    /// Upper bound (exclusive) of the dominant/candidate frequency ratio
    pub harmonic_ratio_max: f64,
    /// Candidate fundamental must exceed this fraction of the dominant power
    pub harmonic_power_ratio: f64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            peak_threshold_ratio: PEAK_THRESHOLD_RATIO,
            harmonic_ratio_min: HARMONIC_RATIO_MIN,
            harmonic_ratio_max: HARMONIC_RATIO_MAX,
            harmonic_power_ratio: HARMONIC_POWER_RATIO,
        }
    }
}
