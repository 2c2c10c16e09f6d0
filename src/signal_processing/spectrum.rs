use num_complex::Complex;
use rustfft::FftPlanner;

use super::window::apply_hamming;

/// Power spectrum of a Hamming-windowed signal restricted to a search band
///
/// Holds `|X[k]|²` for `k` in `[min_idx, max_idx)`, where
/// `min_idx = max(1, floor(min_hz / resolution))` and
/// `max_idx = min(floor(max_hz / resolution), N / 2)`. The DC bin is never
/// included. The slice is empty when the band is narrower than the
/// resolution allows.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSpectrum {
    /// Bin spacing `fs / N` in Hz
    pub resolution_hz: f64,
    /// First bin (inclusive) of the search band
    pub min_idx: usize,
    /// Last bin (exclusive) of the search band
    pub max_idx: usize,
    /// Power of bins `min_idx..max_idx`
    pub power: Vec<f64>,
}

impl BandSpectrum {
    /// Window, transform and slice `signal` to `[min_hz, max_hz]`.
    pub fn compute(signal: &[f64], sample_rate: f64, min_hz: f64, max_hz: f64) -> Self {
        let n = signal.len();
        if n == 0 {
            return Self {
                resolution_hz: 0.0,
                min_idx: 1,
                max_idx: 1,
                power: Vec::new(),
            };
        }

        let resolution_hz = sample_rate / n as f64;
        let min_idx = ((min_hz / resolution_hz).floor() as usize).max(1);
        let max_idx = ((max_hz / resolution_hz).floor() as usize).min(n / 2);

        let power = if min_idx < max_idx {
            let spectrum = fft(&apply_hamming(signal));
            spectrum[min_idx..max_idx]
                .iter()
                .map(|c| c.norm_sqr())
                .collect()
        } else {
            Vec::new()
        };

        log::trace!(
            "Spectrum N={} resolution {:.4} Hz, bins {}..{}",
            n,
            resolution_hz,
            min_idx,
            max_idx
        );

        Self {
            resolution_hz,
            min_idx,
            max_idx: max_idx.max(min_idx),
            power,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// Frequency in Hz of band-local bin `local`.
    pub fn frequency_at(&self, local: usize) -> f64 {
        (self.min_idx + local) as f64 * self.resolution_hz
    }

    /// Largest power in the band, 0 when empty.
    pub fn max_power(&self) -> f64 {
        self.power.iter().copied().fold(0.0, f64::max)
    }

    /// Band-local index of the global maximum; the first one on ties.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &p) in self.power.iter().enumerate() {
            if best.is_none_or(|(_, bp)| p > bp) {
                best = Some((i, p));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Full complex forward DFT of a real signal.
fn fft(signal: &[f64]) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}
