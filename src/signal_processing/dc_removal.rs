use super::math::mean;

/// Subtract the arithmetic mean of the whole sequence from every sample.
pub fn remove_dc_in_place(samples: &mut [f64]) {
    let dc = mean(samples);
    for sample in samples.iter_mut() {
        *sample -= dc;
    }
}

/// Copying variant of [`remove_dc_in_place`].
pub fn remove_dc(samples: &[f64]) -> Vec<f64> {
    let mut out = samples.to_vec();
    remove_dc_in_place(&mut out);
    out
}
