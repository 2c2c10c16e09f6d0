//! Heart-rate and respiratory-rate estimation from recorded physiological
//! waveforms.
//!
//! The pipeline infers the sampling rate actually achieved by the recorder,
//! conditions each waveform with a zero-phase Butterworth bandpass, and picks
//! the dominant frequency of its windowed spectrum with second-harmonic
//! correction. See [`processing::VitalSignsProcessor`].

pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod processing;
pub mod rate;
pub mod recording;
pub mod signal_processing;
pub mod timing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{AnalysisConfig, BandConfig, SamplingRate};
pub use error::{Result, VitalError};
pub use processing::{AnalysisReport, TrackAnalysis, VitalSignsProcessor};
pub use recording::Recording;
pub use wav::save_conditioned_wav;
