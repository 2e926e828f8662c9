//! FFT spectrum analysis using RustFFT.
//!
//! The transform is length-preserving: a buffer of `M` samples yields `M`
//! complex coefficients, each reduced to its magnitude with no scaling.
//! Bin `i` is labelled `i * sample_rate / M`.

use std::f64::consts::PI;

use rand::Rng;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use super::noise::{add_noise, NoiseModel};
use super::result::{Spectrum, SpectrumBin};
use crate::capture::CaptureRecord;
use crate::listener::{NoOpListener, PipelineEvent, PipelineListener};

/// Window applied to the samples before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// No windowing; magnitudes are the plain DFT magnitudes.
    #[default]
    Rectangular,
    /// Hann window (reduces spectral leakage).
    Hann,
}

impl WindowFunction {
    /// Window coefficients for `size` samples.
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        match self {
            WindowFunction::Rectangular => vec![1.0; size],
            WindowFunction::Hann if size < 2 => vec![1.0; size],
            WindowFunction::Hann => (0..size)
                .map(|i| {
                    let t = i as f64 / (size - 1) as f64;
                    0.5 * (1.0 - (2.0 * PI * t).cos())
                })
                .collect(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "rectangular" | "rect" => Some(WindowFunction::Rectangular),
            "hann" | "hanning" => Some(WindowFunction::Hann),
            _ => None,
        }
    }
}

/// Spectrum analyzer for capture sample buffers.
///
/// Holds an FFT planner so repeated analyses of equal-length buffers reuse
/// the same plan. Each analyzer is independent; use one per thread.
pub struct SpectrumAnalyzer {
    planner: FftPlanner<f64>,
    window: WindowFunction,
    noise_model: NoiseModel,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    /// Analyzer with a rectangular window and uniform noise.
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            window: WindowFunction::default(),
            noise_model: NoiseModel::default(),
        }
    }

    pub fn with_window(mut self, window: WindowFunction) -> Self {
        self.window = window;
        self
    }

    pub fn with_noise_model(mut self, noise_model: NoiseModel) -> Self {
        self.noise_model = noise_model;
        self
    }

    pub fn window(&self) -> WindowFunction {
        self.window
    }

    pub fn noise_model(&self) -> NoiseModel {
        self.noise_model
    }

    /// Frequency of `bin` for a transform of `num_samples` points.
    pub fn bin_to_freq(bin: usize, num_samples: usize, sample_rate: u64) -> f64 {
        bin as f64 * sample_rate as f64 / num_samples as f64
    }

    /// Compute one magnitude per input sample.
    ///
    /// When `noise_scale > 0`, `noise_scale * u` is added to a copy of each
    /// sample first, with `u` drawn from `rng`. The input is never modified
    /// and `rng` is not touched when no noise is requested.
    pub fn magnitudes<R: Rng + ?Sized>(
        &mut self,
        samples: &[f32],
        noise_scale: f32,
        rng: &mut R,
    ) -> Vec<f64> {
        self.magnitudes_inner(samples, noise_scale, rng, &mut NoOpListener)
    }

    fn magnitudes_inner<R: Rng + ?Sized, L: PipelineListener>(
        &mut self,
        samples: &[f32],
        noise_scale: f32,
        rng: &mut R,
        listener: &mut L,
    ) -> Vec<f64> {
        if samples.is_empty() {
            return Vec::new();
        }

        let noisy;
        let input = if noise_scale > 0.0 {
            noisy = add_noise(samples, noise_scale, self.noise_model, rng);
            listener.on_event(PipelineEvent::NoiseApplied {
                scale: noise_scale,
                model: self.noise_model,
            });
            &noisy[..]
        } else {
            samples
        };

        let window = self.window.coefficients(input.len());
        let mut buffer: Vec<Complex<f64>> = input
            .iter()
            .zip(&window)
            .map(|(&s, &w)| Complex::new(s as f64 * w, 0.0))
            .collect();

        let fft = self.planner.plan_fft_forward(buffer.len());
        fft.process(&mut buffer);

        buffer.iter().map(|c| c.norm()).collect()
    }

    /// Compute the labelled magnitude spectrum of `samples`.
    ///
    /// An empty buffer gives an empty spectrum.
    pub fn analyze<R: Rng + ?Sized>(
        &mut self,
        samples: &[f32],
        sample_rate: u64,
        noise_scale: f32,
        rng: &mut R,
    ) -> Spectrum {
        self.analyze_with_listener(samples, sample_rate, noise_scale, rng, &mut NoOpListener)
    }

    /// Like [`analyze`](Self::analyze), reporting to `listener`.
    pub fn analyze_with_listener<R: Rng + ?Sized, L: PipelineListener>(
        &mut self,
        samples: &[f32],
        sample_rate: u64,
        noise_scale: f32,
        rng: &mut R,
        listener: &mut L,
    ) -> Spectrum {
        let magnitudes = self.magnitudes_inner(samples, noise_scale, rng, listener);
        let num_samples = magnitudes.len();

        let bins = magnitudes
            .into_iter()
            .enumerate()
            .map(|(i, magnitude)| SpectrumBin {
                frequency: Self::bin_to_freq(i, num_samples, sample_rate),
                magnitude,
            })
            .collect::<Vec<_>>();

        listener.on_event(PipelineEvent::Analyzed {
            num_bins: bins.len(),
            sample_rate,
        });

        Spectrum { sample_rate, bins }
    }

    /// Analyze a capture at its own sample rate.
    pub fn analyze_capture<R: Rng + ?Sized>(
        &mut self,
        capture: &CaptureRecord,
        noise_scale: f32,
        rng: &mut R,
    ) -> Spectrum {
        self.analyze(capture.samples(), capture.sample_rate(), noise_scale, rng)
    }
}

/// One-shot analysis with a default analyzer.
pub fn analyze<R: Rng + ?Sized>(
    samples: &[f32],
    sample_rate: u64,
    noise_scale: f32,
    rng: &mut R,
) -> Spectrum {
    SpectrumAnalyzer::new().analyze(samples, sample_rate, noise_scale, rng)
}
