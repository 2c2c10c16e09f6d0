//! Synthetic physiological recordings for testing and benchmarking.

mod noise;
mod recording;
mod signal;

pub use noise::{
    AdditiveNoiseConfig, BaselineWanderConfig, ImpulseNoiseConfig, NoiseConfig, apply_noise,
};
pub use recording::SyntheticRecording;
pub use signal::{
    DEFAULT_PULSE_HARMONIC_RATIO, generate_pulse_waveform, generate_respiration_waveform,
    generate_sinusoid,
};
