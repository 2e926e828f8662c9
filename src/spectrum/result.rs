//! Magnitude spectrum produced by the analyzer.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// One frequency bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumBin {
    /// Bin center frequency in Hz.
    pub frequency: f64,
    /// Absolute value of the transform coefficient.
    pub magnitude: f64,
}

/// Magnitude per frequency bin, index-aligned with the transform output.
///
/// Bin `i` sits at `i * sample_rate / len()`. The mirror half above Nyquist
/// is kept; use [`Spectrum::one_sided`] to drop it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spectrum {
    /// Sample rate the bins were labelled with.
    pub sample_rate: u64,
    pub bins: Vec<SpectrumBin>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Width of one bin in Hz (0 for an empty spectrum).
    pub fn resolution(&self) -> f64 {
        if self.bins.is_empty() {
            return 0.0;
        }
        self.sample_rate as f64 / self.bins.len() as f64
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.frequency).collect()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.magnitude).collect()
    }

    /// Bins from DC up to and including Nyquist (`0..=len / 2`).
    pub fn one_sided(&self) -> Spectrum {
        let keep = if self.bins.is_empty() {
            0
        } else {
            self.bins.len() / 2 + 1
        };
        Spectrum {
            sample_rate: self.sample_rate,
            bins: self.bins[..keep].to_vec(),
        }
    }

    /// Strongest non-DC bin at or below Nyquist.
    ///
    /// Falls back to the DC bin for spectra with a single bin.
    pub fn peak(&self) -> Option<SpectrumBin> {
        let half = self.one_sided();
        let candidates = if half.bins.len() > 1 {
            &half.bins[1..]
        } else {
            &half.bins[..]
        };
        candidates
            .iter()
            .copied()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    }

    /// Magnitudes in decibels (`20 * log10`), clamped to an -80 dB floor.
    pub fn magnitudes_db(&self) -> Vec<f64> {
        self.bins
            .iter()
            .map(|b| {
                let db = 20.0 * b.magnitude.max(1e-10).log10();
                db.max(-80.0)
            })
            .collect()
    }

    /// Write one `frequency,magnitude` line per bin.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for bin in &self.bins {
            writeln!(writer, "{},{}", bin.frequency, bin.magnitude)?;
        }
        Ok(())
    }
}
