//! Capture Spectrum Core
//!
//! Ingests analog signal captures and produces frequency-domain magnitude
//! spectra for inspection.
//!
//! # Features
//!
//! - Binary analog capture parsing with strict header validation
//! - Square and sine test waveform synthesis
//! - Length-preserving FFT magnitude spectra via RustFFT
//! - Seedable additive noise for stress-testing downstream analysis
//! - Batch pipeline with per-capture failure isolation

pub mod capture;
pub mod listener;
pub mod pipeline;
pub mod spectrum;

// Re-export commonly used types
pub use capture::{
    parse, synthesize, CaptureHeader, CaptureRecord, ParseError, SynthError, WaveformKind,
};
pub use listener::{LogListener, NoOpListener, PipelineEvent, PipelineListener, RecordingListener};
pub use pipeline::{
    analyze_capture_file, run, run_with, AnalyzedCapture, CaptureSource, PipelineConfig,
    PipelineError, SourceOutcome,
};
pub use spectrum::{NoiseModel, Spectrum, SpectrumAnalyzer, SpectrumBin, WindowFunction};
