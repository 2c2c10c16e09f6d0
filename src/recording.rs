//! Recording data model and JSON I/O.
//!
//! A recording file looks like:
//!
//! ```json
//! {
//!   "metadata": {
//!     "startTime": "2025-04-16T12:47:14.917Z",
//!     "endTime": "2025-04-16T12:47:24.917Z",
//!     "samplingRate": 30
//!   },
//!   "signals": { "bvp": { "raw": [..] }, "resp": { "raw": [..] } },
//!   "rates": { "heart": [{ "value": 72 }], "respiratory": [{ "value": 14 }] }
//! }
//! ```
//!
//! `rates` and `samplingRate` are optional. Timestamps are kept as text here;
//! parsing happens in [`crate::timing`] so that malformed values only affect
//! sampling-rate inference. Non-string timestamps (epoch numbers, objects)
//! are read as their JSON text and end up unparseable there as well.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, VitalError};

/// Declared recording metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingMetadata {
    /// ISO-8601 start timestamp as written by the recorder
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start_time: Option<String>,
    /// ISO-8601 end timestamp as written by the recorder
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub end_time: Option<String>,
    /// Declared sampling rate in Hz (often rounded or wrong)
    #[serde(default)]
    pub sampling_rate: Option<f64>,
}

/// Accept any JSON value for a metadata timestamp.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Timestamp attached to a reference rate sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateTimestamp {
    Epoch(f64),
    Text(String),
}

/// One externally recorded reference rate sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RateTimestamp>,
}

impl RatePoint {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            timestamp: None,
        }
    }
}

/// Reference rate series, used for comparison only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRates {
    #[serde(default)]
    pub heart: Vec<RatePoint>,
    #[serde(default)]
    pub respiratory: Vec<RatePoint>,
}

impl ReferenceRates {
    pub fn is_empty(&self) -> bool {
        self.heart.is_empty() && self.respiratory.is_empty()
    }

    pub fn heart_values(&self) -> Vec<f64> {
        self.heart.iter().map(|p| p.value).collect()
    }

    pub fn respiratory_values(&self) -> Vec<f64> {
        self.respiratory.iter().map(|p| p.value).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawChannel {
    raw: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSignals {
    bvp: RawChannel,
    resp: RawChannel,
}

/// On-disk layout of a recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordingFile {
    metadata: RecordingMetadata,
    signals: RawSignals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rates: Option<ReferenceRates>,
}

/// Immutable recording: metadata, two equal-length waveforms and optional
/// reference rates.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    metadata: RecordingMetadata,
    pulse: Vec<f64>,
    respiration: Vec<f64>,
    reference: ReferenceRates,
}

impl Recording {
    /// Build a recording from already-extracted waveforms.
    ///
    /// # Errors
    /// Fails when either waveform is empty, the lengths differ, or a sample
    /// is not finite.
    pub fn new(
        metadata: RecordingMetadata,
        pulse: Vec<f64>,
        respiration: Vec<f64>,
    ) -> Result<Self> {
        validate_channel("bvp", &pulse)?;
        validate_channel("resp", &respiration)?;
        if pulse.len() != respiration.len() {
            return Err(VitalError::SignalLengthMismatch {
                pulse: pulse.len(),
                respiration: respiration.len(),
            });
        }
        Ok(Self {
            metadata,
            pulse,
            respiration,
            reference: ReferenceRates::default(),
        })
    }

    /// Build a recording from the output of an external waveform extractor
    /// (for example a video model producing pulse and respiration traces).
    pub fn from_extractor<I, F>(metadata: RecordingMetadata, input: &I, extract: F) -> Result<Self>
    where
        I: ?Sized,
        F: FnOnce(&I) -> Result<(Vec<f64>, Vec<f64>)>,
    {
        let (pulse, respiration) = extract(input)?;
        Self::new(metadata, pulse, respiration)
    }

    pub fn with_reference(mut self, reference: ReferenceRates) -> Self {
        self.reference = reference;
        self
    }

    pub fn without_reference(mut self) -> Self {
        self.reference = ReferenceRates::default();
        self
    }

    pub fn metadata(&self) -> &RecordingMetadata {
        &self.metadata
    }

    pub fn pulse(&self) -> &[f64] {
        &self.pulse
    }

    pub fn respiration(&self) -> &[f64] {
        &self.respiration
    }

    pub fn reference(&self) -> &ReferenceRates {
        &self.reference
    }

    /// Samples per channel
    pub fn sample_count(&self) -> usize {
        self.pulse.len()
    }

    /// Parse a recording from a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: RecordingFile = serde_json::from_str(content)?;
        Self::from_file(file)
    }

    /// Load a recording from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let file: RecordingFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    /// Serialize to a pretty-printed JSON document.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }

    /// Write the recording as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, &self.to_file())?;
        Ok(())
    }

    fn from_file(file: RecordingFile) -> Result<Self> {
        let recording = Self::new(file.metadata, file.signals.bvp.raw, file.signals.resp.raw)?;
        Ok(match file.rates {
            Some(rates) => recording.with_reference(rates),
            None => recording,
        })
    }

    fn to_file(&self) -> RecordingFile {
        RecordingFile {
            metadata: self.metadata.clone(),
            signals: RawSignals {
                bvp: RawChannel {
                    raw: self.pulse.clone(),
                },
                resp: RawChannel {
                    raw: self.respiration.clone(),
                },
            },
            rates: (!self.reference.is_empty()).then(|| self.reference.clone()),
        }
    }
}

fn validate_channel(name: &str, samples: &[f64]) -> Result<()> {
    if samples.is_empty() {
        return Err(VitalError::Recording(format!("signals.{}.raw is empty", name)));
    }
    if let Some(idx) = samples.iter().position(|x| !x.is_finite()) {
        return Err(VitalError::Recording(format!(
            "signals.{}.raw[{}] is not a finite number",
            name, idx
        )));
    }
    Ok(())
}
