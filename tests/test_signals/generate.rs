#![allow(dead_code)]

use chrono::{DateTime, SecondsFormat, TimeDelta};
use std::f64::consts::PI;

use vitalrate::recording::{Recording, RecordingMetadata};

pub const START_TIME: &str = "2025-04-16T12:47:14.917Z";

/// `sin(2π f t)` sampled at `sample_rate`
pub fn sinusoid(freq_hz: f64, sample_rate: f64, num_samples: usize) -> Vec<f64> {
    tones(&[(freq_hz, 1.0)], sample_rate, num_samples)
}

/// Sum of `(frequency, amplitude)` sine components
pub fn tones(components: &[(f64, f64)], sample_rate: f64, num_samples: usize) -> Vec<f64> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            components
                .iter()
                .map(|&(freq, amp)| amp * (2.0 * PI * freq * t).sin())
                .sum()
        })
        .collect()
}

/// Recording whose timestamps span `num_samples / true_rate` seconds,
/// with an arbitrary declared rate.
pub fn timed_recording(
    pulse: Vec<f64>,
    respiration: Vec<f64>,
    true_rate: f64,
    declared_rate: Option<f64>,
) -> Recording {
    let start = DateTime::parse_from_rfc3339(START_TIME).unwrap();
    let micros = (pulse.len() as f64 / true_rate * 1e6).round() as i64;
    let end = start + TimeDelta::microseconds(micros);
    let metadata = RecordingMetadata {
        start_time: Some(start.to_rfc3339_opts(SecondsFormat::Millis, true)),
        end_time: Some(end.to_rfc3339_opts(SecondsFormat::Micros, true)),
        sampling_rate: declared_rate,
    };
    Recording::new(metadata, pulse, respiration).unwrap()
}

/// Clean recording at the given heart and respiratory rates (per minute)
pub fn recording_with_rates(
    heart_bpm: f64,
    resp_bpm: f64,
    sample_rate: f64,
    num_samples: usize,
) -> Recording {
    let pulse: Vec<f64> = sinusoid(heart_bpm / 60.0, sample_rate, num_samples)
        .into_iter()
        .map(|x| x + 50.0)
        .collect();
    let resp = sinusoid(resp_bpm / 60.0, sample_rate, num_samples);
    timed_recording(pulse, resp, sample_rate, Some(sample_rate))
}

/// Indices of strict local maxima above `min_value`
pub fn local_maxima(samples: &[f64], min_value: f64) -> Vec<usize> {
    (1..samples.len().saturating_sub(1))
        .filter(|&i| {
            samples[i] > samples[i - 1] && samples[i] >= samples[i + 1] && samples[i] > min_value
        })
        .collect()
}
