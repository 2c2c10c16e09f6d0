pub mod generate;

#[allow(unused_imports)]
pub use generate::{local_maxima, recording_with_rates, sinusoid, timed_recording, tones};
