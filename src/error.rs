use thiserror::Error;

#[derive(Error, Debug)]
pub enum VitalError {
    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Invalid band {low_hz}-{high_hz} Hz for Nyquist frequency {nyquist_hz} Hz")]
    InvalidBand {
        low_hz: f64,
        high_hz: f64,
        nyquist_hz: f64,
    },

    #[error("Insufficient data: need {needed} samples, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed recording: {0}")]
    Recording(String),

    #[error("Signal length mismatch: pulse has {pulse} samples, respiration has {respiration}")]
    SignalLengthMismatch { pulse: usize, respiration: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VitalError>;
