pub mod conditioner;
pub mod dc_removal;
pub mod iir_butterworth_bandpass;
pub mod math;
pub mod peak_detector;
pub mod spectrum;
pub mod window;

pub use conditioner::{ConditionedSignal, SignalConditioner};
pub use dc_removal::{remove_dc, remove_dc_in_place};
pub use iir_butterworth_bandpass::ButterworthBandpass;
pub use math::{mean, median, signal_power};
pub use peak_detector::{SpectralPeak, find_spectral_peaks};
pub use spectrum::BandSpectrum;
pub use window::{apply_hamming, hamming};
