//! Spectral analysis of capture sample buffers.
//!
//! This module provides:
//! - Length-preserving FFT magnitude spectra via RustFFT
//! - Optional additive noise drawn from a caller-supplied random source
//! - The labelled spectrum result with CSV and JSON output

pub mod fft;
pub mod noise;
pub mod result;

// Re-export commonly used types
pub use fft::{analyze, SpectrumAnalyzer, WindowFunction};
pub use noise::{add_noise, NoiseModel};
pub use result::{Spectrum, SpectrumBin};
