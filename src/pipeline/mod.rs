//! Batch pipeline: obtain captures, then compute a spectrum for each.
//!
//! Every source is processed on its own. A source that fails to parse or
//! synthesize yields an error outcome and the remaining sources still run.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::capture::{
    parse_with_listener, synthesize_with_listener, CaptureRecord, ParseError, SynthError,
    WaveformKind,
};
use crate::listener::{NoOpListener, PipelineListener};
use crate::spectrum::{NoiseModel, Spectrum, SpectrumAnalyzer, WindowFunction};

/// Default synthesis rate: 50 MS/s.
pub const DEFAULT_SYNTH_SAMPLE_RATE: u64 = 50_000_000;

/// Where a capture comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CaptureSource {
    /// Binary capture file on disk.
    File { path: PathBuf },
    /// Generated waveform; `frequency` in Hz.
    Synth { kind: WaveformKind, frequency: f64 },
}

impl CaptureSource {
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        CaptureSource::File { path: path.into() }
    }

    pub fn synth(kind: WaveformKind, frequency: f64) -> Self {
        CaptureSource::Synth { kind, frequency }
    }

    /// Name used for this source in output.
    pub fn label(&self) -> String {
        match self {
            CaptureSource::File { path } => path.display().to_string(),
            CaptureSource::Synth { kind, .. } => kind.label().to_string(),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sources: Vec<CaptureSource>,
    /// Scale of the additive noise; 0 disables it.
    pub noise_scale: f32,
    pub noise_model: NoiseModel,
    /// Seed for the noise generator. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Sample rate stamped on synthesized captures.
    pub synth_sample_rate: u64,
    pub high_level: f32,
    pub low_level: f32,
    pub window: WindowFunction,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            noise_scale: 0.0,
            noise_model: NoiseModel::Uniform,
            seed: None,
            synth_sample_rate: DEFAULT_SYNTH_SAMPLE_RATE,
            high_level: 1.0,
            low_level: -1.0,
            window: WindowFunction::Rectangular,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Random source for noise injection, seeded when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn analyzer(&self) -> SpectrumAnalyzer {
        SpectrumAnalyzer::new()
            .with_window(self.window)
            .with_noise_model(self.noise_model)
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Synthesis error: {0}")]
    Synth(#[from] SynthError),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A capture together with its spectrum.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedCapture {
    pub label: String,
    pub capture: CaptureRecord,
    pub spectrum: Spectrum,
}

/// Result of processing one source.
#[derive(Debug)]
pub struct SourceOutcome {
    pub label: String,
    pub result: Result<AnalyzedCapture, PipelineError>,
}

/// Obtain the capture for one source.
pub fn load_capture<L: PipelineListener>(
    source: &CaptureSource,
    config: &PipelineConfig,
    listener: &mut L,
) -> Result<CaptureRecord, PipelineError> {
    let capture = match source {
        CaptureSource::File { path } => parse_with_listener(path, listener)?,
        CaptureSource::Synth { kind, frequency } => synthesize_with_listener(
            *kind,
            *frequency,
            config.synth_sample_rate,
            config.high_level,
            config.low_level,
            listener,
        )?,
    };
    Ok(capture)
}

/// Run every configured source with the config's own random source.
pub fn run(config: &PipelineConfig) -> Vec<SourceOutcome> {
    let mut rng = config.rng();
    run_with(config, &mut rng, &mut NoOpListener)
}

/// Run every configured source, drawing noise from `rng`.
///
/// Outcomes come back in source order, one per source.
pub fn run_with<R: Rng + ?Sized, L: PipelineListener>(
    config: &PipelineConfig,
    rng: &mut R,
    listener: &mut L,
) -> Vec<SourceOutcome> {
    let mut analyzer = config.analyzer();

    config
        .sources
        .iter()
        .map(|source| {
            let label = source.label();
            let result = load_capture(source, config, listener).map(|capture| {
                let spectrum = analyzer.analyze_with_listener(
                    capture.samples(),
                    capture.sample_rate(),
                    config.noise_scale,
                    rng,
                    listener,
                );
                AnalyzedCapture {
                    label: label.clone(),
                    capture,
                    spectrum,
                }
            });
            SourceOutcome { label, result }
        })
        .collect()
}

/// Parse a capture file and compute its spectrum without noise.
pub fn analyze_capture_file<P: AsRef<Path>>(path: P) -> Result<AnalyzedCapture, PipelineError> {
    let path = path.as_ref();
    let capture = parse_with_listener(path, &mut NoOpListener)?;
    let mut rng = StdRng::seed_from_u64(0);
    let spectrum = SpectrumAnalyzer::new().analyze_capture(&capture, 0.0, &mut rng);
    Ok(AnalyzedCapture {
        label: path.display().to_string(),
        capture,
        spectrum,
    })
}
