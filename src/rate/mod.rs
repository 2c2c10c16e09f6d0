pub mod estimate;
pub mod reference;
mod spectral;

pub use estimate::{EstimateMethod, FrequencyEstimate, RateEstimate, VitalSign};
pub use reference::ReferenceSummary;
pub use spectral::{SpectralRateEstimator, select_fundamental};
