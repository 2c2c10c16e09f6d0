use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use vitalrate::config::{AnalysisConfig, BandConfig, SamplingRate};
use vitalrate::output::{FileReport, OutputFormat, create_formatter};
use vitalrate::processing::{AnalysisReport, VitalSignsProcessor};
use vitalrate::recording::Recording;
use vitalrate::wav::save_conditioned_wav;

#[derive(Parser, Debug)]
#[command(name = "vitalrate")]
#[command(about = "Estimate heart and respiratory rate from recorded waveforms", long_about = None)]
struct Args {
    /// JSON recordings to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Force the sampling rate (e.g., "30", "29.97hz", "33.3ms")
    #[arg(long)]
    sampling_rate: Option<SamplingRate>,

    /// TOML analysis configuration
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Pulse band in Hz (e.g., "0.6-3.3")
    #[arg(long)]
    pulse_band: Option<BandConfig>,

    /// Respiration band in Hz (e.g., "0.1-0.54")
    #[arg(long)]
    resp_band: Option<BandConfig>,

    /// Skip comparison against reference rates in the recording
    #[arg(long)]
    no_reference: bool,

    /// Evaluate the pulse and respiration tracks on one thread
    #[arg(long)]
    sequential: bool,

    /// Directory for conditioned signals (stereo WAV: left=pulse, right=respiration)
    #[arg(long)]
    dump_filtered: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(band) = args.pulse_band {
        config.pulse.band = band;
    }
    if let Some(band) = args.resp_band {
        config.respiration.band = band;
    }
    if args.sequential {
        config.parallel = false;
    }

    let processor = VitalSignsProcessor::new(config)
        .context("Invalid analysis configuration")?
        .with_reference_comparison(!args.no_reference);

    if let Some(dir) = &args.dump_filtered {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let mut failures = 0;
    for path in &args.files {
        let filename = display_name(path);
        let dump_dir = args.dump_filtered.as_deref();
        let report = match analyze_file(path, &processor, args.sampling_rate, dump_dir) {
            Ok(analysis) => FileReport::success(filename, analysis),
            Err(e) => {
                log::error!("{}: {:#}", path.display(), e);
                failures += 1;
                FileReport::failure(filename, format!("{:#}", e))
            }
        };
        println!("{}", formatter.format(&report));
    }

    if failures == args.files.len() {
        anyhow::bail!("All {} recordings failed", failures);
    }
    Ok(())
}

fn analyze_file(
    path: &Path,
    processor: &VitalSignsProcessor,
    sampling_rate: Option<SamplingRate>,
    dump_dir: Option<&Path>,
) -> anyhow::Result<AnalysisReport> {
    let recording =
        Recording::load(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let report = processor.analyze(&recording, sampling_rate)?;

    if let Some(dir) = dump_dir {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "recording".to_string());
        let out = dir.join(format!("{}_filtered.wav", stem));
        save_conditioned_wav(&out, &report)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        log::info!("Wrote conditioned signals to {}", out.display());
    }

    Ok(report)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
