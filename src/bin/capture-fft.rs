use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use capture_spectrum::listener::LogListener;
use capture_spectrum::pipeline::{run_with, AnalyzedCapture, CaptureSource, PipelineConfig};
use capture_spectrum::{NoiseModel, WaveformKind, WindowFunction};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// `frequency,magnitude` per line
    Csv,
    /// Captures and spectra as a JSON array
    Json,
}

#[derive(Parser)]
#[command(name = "capture-fft", about = "Magnitude spectrum of analog captures")]
struct Cli {
    /// Generate a square wave to analyze with the given frequency in MHz
    #[arg(long, value_name = "MHZ")]
    square: Option<f64>,

    /// Generate a sine wave to analyze with the given frequency in MHz
    #[arg(long = "sin", value_name = "MHZ")]
    sine: Option<f64>,

    /// Noise scale: each sample gets scale * u added, u drawn from the noise model
    #[arg(short, long)]
    noise: Option<f32>,

    /// Distribution of the noise draws
    #[arg(long, value_parser = ["uniform", "gaussian"])]
    noise_model: Option<String>,

    /// Seed for reproducible noise
    #[arg(long)]
    seed: Option<u64>,

    /// Sample rate for generated waveforms in samples/s (default 50 MS/s)
    #[arg(long, value_name = "HZ")]
    sample_rate: Option<u64>,

    /// Path(s) to binary analog capture files
    #[arg(short, long, num_args = 1..)]
    input: Vec<PathBuf>,

    /// JSON pipeline configuration; command-line options override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window applied before the transform
    #[arg(long, value_parser = ["rectangular", "hann"])]
    window: Option<String>,

    /// Drop bins above Nyquist
    #[arg(long)]
    one_sided: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Enable verbose output on stderr
    #[arg(long)]
    verbose: bool,
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(noise) = cli.noise {
        config.noise_scale = noise;
    }
    if let Some(name) = &cli.noise_model {
        config.noise_model = NoiseModel::from_str(name)
            .with_context(|| format!("Unknown noise model: {}", name))?;
    }
    if let Some(name) = &cli.window {
        config.window =
            WindowFunction::from_str(name).with_context(|| format!("Unknown window: {}", name))?;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(rate) = cli.sample_rate {
        config.synth_sample_rate = rate;
    }

    if let Some(mhz) = cli.square {
        config
            .sources
            .push(CaptureSource::synth(WaveformKind::Square, mhz * 1.0e6));
    }
    if let Some(mhz) = cli.sine {
        config
            .sources
            .push(CaptureSource::synth(WaveformKind::Sine, mhz * 1.0e6));
    }
    for path in &cli.input {
        config.sources.push(CaptureSource::file(path.clone()));
    }

    Ok(config)
}

fn write_output(captures: &[AnalyzedCapture], format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match format {
        OutputFormat::Csv => {
            for capture in captures {
                capture.spectrum.write_csv(&mut out)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, captures)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout stays clean for piping into a CSV
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };
    env_logger::Builder::new().filter_level(level).init();

    let config = build_config(&cli)?;
    if config.sources.is_empty() {
        bail!("No capture sources given. Use --square, --sin, --input or --config.");
    }

    let mut rng = config.rng();
    let outcomes = run_with(&config, &mut rng, &mut LogListener);
    let total = outcomes.len();

    let mut captures = Vec::with_capacity(total);
    for outcome in outcomes {
        match outcome.result {
            Ok(mut analyzed) => {
                log::info!(
                    "Processed {} ({} samples, {} bins)",
                    analyzed.label,
                    analyzed.capture.num_samples(),
                    analyzed.spectrum.len()
                );
                if cli.one_sided {
                    analyzed.spectrum = analyzed.spectrum.one_sided();
                }
                captures.push(analyzed);
            }
            Err(e) => log::warn!("Skipping {}: {}", outcome.label, e),
        }
    }

    write_output(&captures, cli.format)?;

    if captures.is_empty() {
        bail!("All {} capture sources failed", total);
    }
    Ok(())
}
