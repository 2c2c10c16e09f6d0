use serde::Serialize;

use super::spectrum::BandSpectrum;

/// A local maximum of a band power spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralPeak {
    pub frequency_hz: f64,
    pub power: f64,
}

/// Find candidate peaks in a band spectrum
///
/// A bin is a candidate when it is strictly interior (`1 <= i <= len - 2`),
/// strictly greater than both neighbours, and strictly greater than
/// `threshold_ratio * max(power)`. Peaks come back sorted by descending
/// power; equal powers keep ascending frequency order.
pub fn find_spectral_peaks(spectrum: &BandSpectrum, threshold_ratio: f64) -> Vec<SpectralPeak> {
    let power = &spectrum.power;
    if power.len() < 3 {
        return Vec::new();
    }
    let threshold = threshold_ratio * spectrum.max_power();

    let mut peaks: Vec<SpectralPeak> = power
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2] && w[1] > threshold)
        .map(|(i, w)| SpectralPeak {
            frequency_hz: spectrum.frequency_at(i + 1),
            power: w[1],
        })
        .collect();

    peaks.sort_by(|a, b| b.power.total_cmp(&a.power));
    peaks
}
