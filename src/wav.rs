use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::processing::AnalysisReport;

/// Write the conditioned tracks of a report as a stereo float WAV file
/// (left = pulse, right = respiration).
///
/// WAV headers only hold integer rates, so the effective sampling rate is
/// rounded to the nearest Hz.
pub fn save_conditioned_wav<P: AsRef<Path>>(
    path: P,
    report: &AnalysisReport,
) -> Result<(), hound::Error> {
    let sample_rate = report.sampling_rate.hz.round().max(1.0) as u32;
    save_stereo_wav(
        path,
        report.pulse.conditioned.samples(),
        report.respiration.conditioned.samples(),
        sample_rate,
    )
}

/// Interleave two channels into a 32-bit float WAV file. The shorter
/// channel is zero-padded.
pub fn save_stereo_wav<P: AsRef<Path>>(
    path: P,
    left: &[f64],
    right: &[f64],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;

    for i in 0..left.len().max(right.len()) {
        writer.write_sample(left.get(i).copied().unwrap_or(0.0) as f32)?;
        writer.write_sample(right.get(i).copied().unwrap_or(0.0) as f32)?;
    }

    writer.finalize()?;
    Ok(())
}
