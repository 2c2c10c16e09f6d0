use std::f64::consts::PI;

/// Symmetric Hamming window of length `n`.
///
/// `w[k] = 0.54 - 0.46 cos(2πk / (n - 1))`; a single-point window is `[1.0]`.
pub fn hamming(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|k| 0.54 - 0.46 * (2.0 * PI * k as f64 / denom).cos())
                .collect()
        }
    }
}

/// Multiply a signal element-wise by a Hamming window of its own length.
pub fn apply_hamming(samples: &[f64]) -> Vec<f64> {
    samples
        .iter()
        .zip(hamming(samples.len()))
        .map(|(x, w)| x * w)
        .collect()
}
