//! Numeric constants for rate estimation
//!
//! Defaults for the configurable thresholds live here so the configuration
//! layer and the tests agree on the same values.

/// Lower bound applied to a sampling rate inferred from recording timestamps.
/// Keeps the bandpass design away from degenerate normalized cutoffs.
pub const MIN_SAMPLING_RATE_HZ: f64 = 10.0;

/// Sampling rate used when neither timestamps nor the declared rate are usable.
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 30.0;

/// Butterworth prototype order for both tracks.
pub const DEFAULT_FILTER_ORDER: usize = 4;

/// Pulse search band in Hz (36-198 BPM).
pub const PULSE_BAND_HZ: (f64, f64) = (0.6, 3.3);

/// Respiration search band in Hz (6-32 breaths/min).
pub const RESPIRATION_BAND_HZ: (f64, f64) = (0.1, 0.54);

/// A spectral peak must exceed this fraction of the band maximum.
pub const PEAK_THRESHOLD_RATIO: f64 = 0.2;

/// Open interval for the dominant/candidate frequency ratio that marks the
/// dominant peak as a second harmonic.
pub const HARMONIC_RATIO_MIN: f64 = 1.9;
pub const HARMONIC_RATIO_MAX: f64 = 2.1;

/// Minimum power of the candidate fundamental relative to the dominant peak.
pub const HARMONIC_POWER_RATIO: f64 = 0.3;

/// Power spectra whose maximum does not exceed this are treated as flat.
pub const MIN_POWER_THRESHOLD: f64 = 1e-20;
