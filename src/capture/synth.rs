//! Synthetic analog captures for testing the spectrum pipeline.
//!
//! Every generated capture has exactly [`SYNTH_NUM_SAMPLES`] samples,
//! regardless of frequency or sample rate.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::CaptureRecord;
use crate::listener::{NoOpListener, PipelineEvent, PipelineListener};

/// Number of samples produced by every synthesis call.
pub const SYNTH_NUM_SAMPLES: usize = 1024;

/// Shape of a synthesized waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    Square,
    Sine,
}

impl WaveformKind {
    pub fn name(&self) -> &'static str {
        match self {
            WaveformKind::Square => "square",
            WaveformKind::Sine => "sine",
        }
    }

    /// Label given to captures of this kind in pipeline output.
    pub fn label(&self) -> &'static str {
        match self {
            WaveformKind::Square => "generated_square_wave",
            WaveformKind::Sine => "generated_sine_wave",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "square" => Some(WaveformKind::Square),
            "sine" | "sin" => Some(WaveformKind::Sine),
            _ => None,
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur when validating a synthesis request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("Frequency must be positive and finite, got {0}")]
    InvalidFrequency(f64),

    #[error("Sample rate {sample_rate} is below the Nyquist limit for frequency {frequency}")]
    BelowNyquist { frequency: f64, sample_rate: u64 },
}

/// Generate a square or sine capture.
///
/// `frequency` and `sample_rate` share a unit (Hz and samples/s, or MHz and
/// MS/s scaled to Hz by the caller). The record carries `sample_rate`,
/// `begin_time = 0` and no header.
///
/// # Errors
///
/// Fails when `2 * frequency > sample_rate`, since the waveform would alias.
pub fn synthesize(
    kind: WaveformKind,
    frequency: f64,
    sample_rate: u64,
    high_level: f32,
    low_level: f32,
) -> Result<CaptureRecord, SynthError> {
    synthesize_with_listener(
        kind,
        frequency,
        sample_rate,
        high_level,
        low_level,
        &mut NoOpListener,
    )
}

/// Like [`synthesize`], reporting the outcome to `listener`.
pub fn synthesize_with_listener<L: PipelineListener>(
    kind: WaveformKind,
    frequency: f64,
    sample_rate: u64,
    high_level: f32,
    low_level: f32,
    listener: &mut L,
) -> Result<CaptureRecord, SynthError> {
    let samples_per_period = match samples_per_period(frequency, sample_rate) {
        Ok(spp) => spp,
        Err(err) => {
            listener.on_event(PipelineEvent::SynthFailed {
                kind,
                error: err.to_string(),
            });
            return Err(err);
        }
    };

    let samples = match kind {
        WaveformKind::Square => generate_square(samples_per_period, high_level, low_level),
        WaveformKind::Sine => generate_sine(frequency, sample_rate, high_level, low_level),
    };

    listener.on_event(PipelineEvent::Synthesized {
        kind,
        num_samples: samples.len(),
        samples_per_period,
    });

    Ok(CaptureRecord::from_parts(None, 0.0, sample_rate, 1, samples))
}

/// Validate a request and return the whole number of samples in one period.
fn samples_per_period(frequency: f64, sample_rate: u64) -> Result<u64, SynthError> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(SynthError::InvalidFrequency(frequency));
    }
    if 2.0 * frequency > sample_rate as f64 {
        return Err(SynthError::BelowNyquist {
            frequency,
            sample_rate,
        });
    }
    Ok((sample_rate as f64 / frequency).floor() as u64)
}

/// Generate a square wave.
///
/// Sample `i` is `high_level` when `i % samples_per_period >= samples_per_period / 2`
/// (integer division), else `low_level`. Odd periods therefore spend one
/// more sample high than low.
pub fn generate_square(samples_per_period: u64, high_level: f32, low_level: f32) -> Vec<f32> {
    let spp = samples_per_period.max(1);
    let half = spp / 2;
    (0..SYNTH_NUM_SAMPLES as u64)
        .map(|i| if i % spp >= half { high_level } else { low_level })
        .collect()
}

/// Generate a sine wave with amplitude `(high_level - low_level) / 2`.
///
/// The wave is centered on zero, not on the midpoint of the two levels.
pub fn generate_sine(frequency: f64, sample_rate: u64, high_level: f32, low_level: f32) -> Vec<f32> {
    let amplitude = (high_level as f64 - low_level as f64) / 2.0;
    let sample_rate = sample_rate as f64;
    (0..SYNTH_NUM_SAMPLES)
        .map(|i| (amplitude * (2.0 * PI * frequency * i as f64 / sample_rate).sin()) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::RecordingListener;

    #[test]
    fn test_nyquist_boundary() {
        assert!(matches!(
            synthesize(WaveformKind::Square, 26.0, 50, 1.0, -1.0),
            Err(SynthError::BelowNyquist { .. })
        ));
        assert!(synthesize(WaveformKind::Square, 25.0, 50, 1.0, -1.0).is_ok());
        assert!(synthesize(WaveformKind::Sine, 26.0, 50, 1.0, -1.0).is_err());
        assert!(synthesize(WaveformKind::Sine, 25.0, 50, 1.0, -1.0).is_ok());
    }

    #[test]
    fn test_invalid_frequency() {
        for freq in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                synthesize(WaveformKind::Square, freq, 50, 1.0, -1.0),
                Err(SynthError::InvalidFrequency(_))
            ));
        }
    }

    #[test]
    fn test_square_duty_cycle() {
        let rec = synthesize(WaveformKind::Square, 3.0, 10, 1.0, -1.0).unwrap();
        // floor(10 / 3) = 3 samples per period, high from index 1 of each period
        assert_eq!(&rec.samples()[..6], &[-1.0, 1.0, 1.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_square_at_nyquist_alternates() {
        let rec = synthesize(WaveformKind::Square, 25.0, 50, 2.0, 0.0).unwrap();
        for (i, &s) in rec.samples().iter().enumerate() {
            let expected = if i % 2 == 1 { 2.0 } else { 0.0 };
            assert_eq!(s, expected);
        }
    }

    #[test]
    fn test_record_metadata() {
        let rec = synthesize(WaveformKind::Sine, 1.0e6, 50_000_000, 1.0, -1.0).unwrap();
        assert_eq!(rec.num_samples(), SYNTH_NUM_SAMPLES as u64);
        assert_eq!(rec.sample_rate(), 50_000_000);
        assert_eq!(rec.begin_time(), 0.0);
        assert!(rec.header().is_none());
    }

    #[test]
    fn test_sine_centered_on_zero() {
        let samples = generate_sine(1.0, 64, 3.0, 1.0);
        assert_eq!(samples[0], 0.0);
        // amplitude (3 - 1) / 2 = 1, peak a quarter period in
        assert!((samples[16] - 1.0).abs() < 1e-6);
        assert!((samples[48] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(WaveformKind::from_str("SQUARE"), Some(WaveformKind::Square));
        assert_eq!(WaveformKind::from_str("sin"), Some(WaveformKind::Sine));
        assert_eq!(WaveformKind::from_str("triangle"), None);
        assert_eq!(WaveformKind::Sine.label(), "generated_sine_wave");
    }

    #[test]
    fn test_listener_reports_rejection() {
        let mut listener = RecordingListener::new();
        let _ = synthesize_with_listener(WaveformKind::Square, 40.0, 50, 1.0, -1.0, &mut listener);
        assert!(matches!(
            listener.events.as_slice(),
            [PipelineEvent::SynthFailed {
                kind: WaveformKind::Square,
                ..
            }]
        ));
    }
}
