use std::fmt;

use serde::Serialize;

/// Which physiological quantity a track measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSign {
    /// Heart rate from the blood volume pulse channel
    Pulse,
    /// Respiratory rate from the respiration channel
    Respiration,
}

impl VitalSign {
    pub fn unit(&self) -> &'static str {
        match self {
            VitalSign::Pulse => "BPM",
            VitalSign::Respiration => "breaths/min",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            VitalSign::Pulse => "HR",
            VitalSign::Respiration => "RR",
        }
    }
}

impl fmt::Display for VitalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VitalSign::Pulse => f.write_str("pulse"),
            VitalSign::Respiration => f.write_str("respiration"),
        }
    }
}

/// How the spectral estimator arrived at its frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimateMethod {
    /// The search band maps to no bins at this resolution
    EmptyBand,
    /// The band holds no power at all (e.g. a flat input)
    FlatSpectrum,
    /// No qualifying local peak; the band maximum was used
    GlobalMaximum,
    /// Highest-power peak
    DominantPeak,
    /// Dominant peak judged to be the second harmonic of this estimate
    HarmonicCorrected { dominant_hz: f64 },
}

impl EstimateMethod {
    /// `false` when the 0 Hz "no reliable estimate" value was returned.
    pub fn is_reliable(&self) -> bool {
        !matches!(self, EstimateMethod::EmptyBand | EstimateMethod::FlatSpectrum)
    }
}

impl fmt::Display for EstimateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateMethod::EmptyBand => f.write_str("empty band"),
            EstimateMethod::FlatSpectrum => f.write_str("flat spectrum"),
            EstimateMethod::GlobalMaximum => f.write_str("global maximum"),
            EstimateMethod::DominantPeak => f.write_str("dominant peak"),
            EstimateMethod::HarmonicCorrected { dominant_hz } => {
                write!(f, "harmonic corrected from {:.3} Hz", dominant_hz)
            }
        }
    }
}

/// Dominant frequency selected from a band spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyEstimate {
    /// Selected frequency in Hz; 0 when no estimate is possible
    pub frequency_hz: f64,
    pub method: EstimateMethod,
    /// Candidate peaks that passed the threshold
    pub peak_count: usize,
}

impl FrequencyEstimate {
    pub(crate) fn none(method: EstimateMethod) -> Self {
        Self {
            frequency_hz: 0.0,
            method,
            peak_count: 0,
        }
    }
}

/// Per-minute rate and the frequency it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateEstimate {
    pub per_minute: f64,
    pub frequency_hz: f64,
}

impl RateEstimate {
    pub fn from_frequency(frequency_hz: f64) -> Self {
        Self {
            per_minute: frequency_hz * 60.0,
            frequency_hz,
        }
    }

    /// A zero rate means the spectrum gave no usable estimate.
    pub fn is_available(&self) -> bool {
        self.per_minute > 0.0
    }
}
