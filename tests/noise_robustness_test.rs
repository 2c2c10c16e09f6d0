use vitalrate::config::AnalysisConfig;
use vitalrate::processing::{AnalysisReport, VitalSignsProcessor};
use vitalrate::simulation::{NoiseConfig, SyntheticRecording};

const HEART_RATE: f64 = 72.0;
const RESP_RATE: f64 = 15.0;

fn analyze_with_noise(noise: NoiseConfig) -> AnalysisReport {
    let rec = SyntheticRecording::new(30.0, 60.0)
        .with_heart_rate(HEART_RATE)
        .with_respiratory_rate(RESP_RATE)
        .with_offset(100.0)
        .with_declared_rate(25.0)
        .with_noise(noise)
        .build()
        .unwrap();
    VitalSignsProcessor::new(AnalysisConfig::default())
        .unwrap()
        .analyze(&rec, None)
        .unwrap()
}

fn assert_rates(report: &AnalysisReport, label: &str) {
    assert!(
        (report.heart_rate() - HEART_RATE).abs() <= 2.0,
        "{}: HR {} expected {}",
        label,
        report.heart_rate(),
        HEART_RATE
    );
    assert!(
        (report.respiratory_rate() - RESP_RATE).abs() <= 2.0,
        "{}: RR {} expected {}",
        label,
        report.respiratory_rate(),
        RESP_RATE
    );
}

#[test]
fn test_clean() {
    let report = analyze_with_noise(NoiseConfig::default());
    assert!((report.sampling_rate.hz - 30.0).abs() < 1e-3);
    assert_rates(&report, "clean");
}

#[test]
fn test_awgn() {
    for (seed, snr_db) in [(1, 10.0), (2, 3.0), (3, 0.0)] {
        let report = analyze_with_noise(NoiseConfig::default().with_seed(seed).with_awgn(snr_db));
        assert_rates(&report, &format!("AWGN {} dB", snr_db));
    }
}

#[test]
fn test_baseline_wander() {
    let report = analyze_with_noise(
        NoiseConfig::default()
            .with_seed(4)
            .with_baseline_wander(1.0, 0.03),
    );
    assert_rates(&report, "baseline wander");
}

#[test]
fn test_motion_impulses() {
    let report = analyze_with_noise(
        NoiseConfig::default()
            .with_seed(5)
            .with_impulse(0.2, 2.0, 3),
    );
    assert_rates(&report, "impulses");
}

#[test]
fn test_combined_impairments() {
    let report = analyze_with_noise(
        NoiseConfig::default()
            .with_seed(6)
            .with_awgn(5.0)
            .with_baseline_wander(0.5, 0.02)
            .with_impulse(0.1, 1.5, 2),
    );
    assert_rates(&report, "combined");
}
