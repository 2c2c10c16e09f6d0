use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use vitalrate::simulation::{NoiseConfig, SyntheticRecording};

#[derive(Parser, Debug)]
#[command(name = "generate_recording")]
#[command(about = "Generate synthetic JSON recordings with known heart and respiratory rates")]
struct Args {
    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Heart rates in BPM: comma-separated (e.g., "60,75,90") or range (e.g., "50-150:10")
    #[arg(long, default_value = "75")]
    heart_rates: String,

    /// Respiratory rate in breaths/min
    #[arg(long, default_value_t = 15.0)]
    resp_rate: f64,

    /// Number of trials per heart rate
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Recording duration in seconds
    #[arg(short, long, default_value_t = 30.0)]
    duration: f64,

    /// True sampling rate in Hz
    #[arg(long, default_value_t = 30.0)]
    sample_rate: f64,

    /// Sampling rate written to the metadata (defaults to the true rate)
    #[arg(long)]
    declared_rate: Option<f64>,

    /// Relative amplitude of the pulse second harmonic
    #[arg(long, default_value_t = 0.5)]
    harmonic_ratio: f64,

    /// Include per-second reference rate series
    #[arg(long)]
    reference: bool,

    /// Output filename prefix
    #[arg(long, default_value = "synth")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f64>,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    heart_rate_bpm: f64,
    respiratory_rate_bpm: f64,
    trial: u32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate: f64,
    declared_rate: Option<f64>,
    duration: f64,
    files: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    noise: NoiseConfig,
}

fn parse_rates(s: &str) -> Result<Vec<f64>> {
    if let Some((range, step)) = s.split_once(':') {
        let step: f64 = step.trim().parse().context("Invalid step value")?;
        if step <= 0.0 {
            anyhow::bail!("Step must be positive");
        }
        let (start, end) = range
            .split_once('-')
            .context("Invalid range format. Use 'start-end:step'")?;
        let start: f64 = start.trim().parse().context("Invalid start value")?;
        let end: f64 = end.trim().parse().context("Invalid end value")?;

        let mut rates = Vec::new();
        let mut r = start;
        while r <= end {
            rates.push(r);
            r += step;
        }
        Ok(rates)
    } else {
        s.split(',')
            .map(|p| p.trim().parse::<f64>().context("Invalid rate value"))
            .collect()
    }
}

fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = match args.config {
        Some(ref path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };

    let heart_rates = parse_rates(&args.heart_rates)?;
    let base_seed = args.seed.unwrap_or(0);
    let declared = args.declared_rate.unwrap_or(args.sample_rate);

    let mut manifest_entries = Vec::new();
    let total_files = heart_rates.len() * args.trials as usize;
    let mut file_count = 0;

    for &heart_rate in &heart_rates {
        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + heart_rate.round() as u64;
            let mut noise = toml_config.noise.clone().with_seed(seed);
            if let Some(snr) = args.snr {
                noise = noise.with_awgn(snr);
            }

            let recording = SyntheticRecording::new(args.sample_rate, args.duration)
                .with_heart_rate(heart_rate)
                .with_respiratory_rate(args.resp_rate)
                .with_harmonic_ratio(args.harmonic_ratio)
                .with_declared_rate(declared)
                .with_noise(noise)
                .with_reference(args.reference)
                .build()
                .context("Failed to build recording")?;

            let filename = format!(
                "{}_hr{:03}_t{:02}.json",
                args.prefix,
                heart_rate.round() as i32,
                trial
            );
            let filepath = args.output_dir.join(&filename);
            recording
                .save(&filepath)
                .with_context(|| format!("Failed to write {}", filepath.display()))?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                heart_rate_bpm: heart_rate,
                respiratory_rate_bpm: args.resp_rate,
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sample_rate: args.sample_rate,
            declared_rate: args.declared_rate,
            duration: args.duration,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
