use std::f64::consts::PI;

/// Relative amplitude of the second harmonic in generated pulse waveforms
pub const DEFAULT_PULSE_HARMONIC_RATIO: f64 = 0.5;

/// Sine wave `amplitude * sin(2π f t + phase)`.
pub fn generate_sinusoid(
    num_samples: usize,
    sample_rate: f64,
    freq_hz: f64,
    amplitude: f64,
    phase: f64,
) -> Vec<f64> {
    let omega = 2.0 * PI * freq_hz;
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            amplitude * (omega * t + phase).sin()
        })
        .collect()
}

/// Blood volume pulse: unit fundamental at the heart rate plus a second
/// harmonic of relative amplitude `harmonic_ratio`.
///
/// The harmonic is phase-shifted so the waveform has the asymmetric
/// fast-rise/slow-decay shape of a real BVP trace.
pub fn generate_pulse_waveform(
    num_samples: usize,
    sample_rate: f64,
    heart_rate_bpm: f64,
    harmonic_ratio: f64,
) -> Vec<f64> {
    let f0 = heart_rate_bpm / 60.0;
    let fundamental = generate_sinusoid(num_samples, sample_rate, f0, 1.0, 0.0);
    let harmonic = generate_sinusoid(num_samples, sample_rate, 2.0 * f0, harmonic_ratio, -PI / 4.0);
    fundamental
        .iter()
        .zip(&harmonic)
        .map(|(a, b)| a + b)
        .collect()
}

/// Respiration: a slightly skewed sinusoid at the breathing rate
/// (inhalation shorter than exhalation).
pub fn generate_respiration_waveform(
    num_samples: usize,
    sample_rate: f64,
    respiratory_rate_bpm: f64,
) -> Vec<f64> {
    let f0 = respiratory_rate_bpm / 60.0;
    let omega = 2.0 * PI * f0;
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            let phase = omega * t;
            phase.sin() + 0.1 * (2.0 * phase).sin()
        })
        .collect()
}
