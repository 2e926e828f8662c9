//! Diagnostics sink for the capture pipeline.
//!
//! Components report what they did through a [`PipelineListener`] handed in by
//! the caller instead of writing to a process-wide logger, so they can be
//! tested without any global setup. [`LogListener`] bridges to the `log`
//! facade for binaries that want ordinary log output.

use std::fmt;

use crate::capture::WaveformKind;
use crate::spectrum::NoiseModel;

/// Byte order of the machine running the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn host() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Little => write!(f, "little-endian"),
            ByteOrder::Big => write!(f, "big-endian"),
        }
    }
}

/// Events emitted while ingesting and analyzing captures.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Parsing started; fields will be swapped if the host is big-endian.
    DecodingStarted { source: String, host: ByteOrder },

    /// A capture file was decoded and validated.
    ParsedCapture {
        source: String,
        num_samples: u64,
        sample_rate: u64,
    },

    /// A capture file was rejected.
    ParseFailed { source: String, error: String },

    /// A waveform was generated.
    Synthesized {
        kind: WaveformKind,
        num_samples: usize,
        samples_per_period: u64,
    },

    /// A synthesis request was rejected.
    SynthFailed { kind: WaveformKind, error: String },

    /// Noise was added to a copy of the input before the transform.
    NoiseApplied { scale: f32, model: NoiseModel },

    /// A spectrum was produced.
    Analyzed { num_bins: usize, sample_rate: u64 },
}

/// Observer for pipeline events. Implement this for logging, UI, tests, etc.
pub trait PipelineListener {
    fn on_event(&mut self, event: PipelineEvent);
}

impl<L: PipelineListener + ?Sized> PipelineListener for &mut L {
    fn on_event(&mut self, event: PipelineEvent) {
        (**self).on_event(event)
    }
}

/// No-op listener — compiles to nothing when monomorphized.
pub struct NoOpListener;

impl PipelineListener for NoOpListener {
    #[inline(always)]
    fn on_event(&mut self, _event: PipelineEvent) {}
}

/// Forwards events to the `log` facade.
pub struct LogListener;

impl PipelineListener for LogListener {
    fn on_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::DecodingStarted { source, host } => {
                log::debug!("Decoding capture {} on {} host", source, host);
            }
            PipelineEvent::ParsedCapture {
                source,
                num_samples,
                sample_rate,
            } => {
                log::debug!(
                    "Parsed capture {} ({} samples at {} S/s)",
                    source,
                    num_samples,
                    sample_rate
                );
            }
            PipelineEvent::ParseFailed { source, error } => {
                log::error!("Failed to parse capture {}: {}", source, error);
            }
            PipelineEvent::Synthesized {
                kind,
                num_samples,
                samples_per_period,
            } => {
                log::debug!(
                    "Generated {} wave ({} samples, {} samples per period)",
                    kind,
                    num_samples,
                    samples_per_period
                );
            }
            PipelineEvent::SynthFailed { kind, error } => {
                log::error!("Failed to generate {} wave: {}", kind, error);
            }
            PipelineEvent::NoiseApplied { scale, model } => {
                log::debug!("Applied {} noise with scale {}", model, scale);
            }
            PipelineEvent::Analyzed {
                num_bins,
                sample_rate,
            } => {
                log::debug!("Computed {} spectrum bins at {} S/s", num_bins, sample_rate);
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub events: Vec<PipelineEvent>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PipelineListener for RecordingListener {
    fn on_event(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(listener: &mut impl PipelineListener) {
        listener.on_event(PipelineEvent::Analyzed {
            num_bins: 8,
            sample_rate: 100,
        });
    }

    #[test]
    fn test_recording_listener_keeps_order() {
        let mut listener = RecordingListener::new();
        listener.on_event(PipelineEvent::NoiseApplied {
            scale: 0.5,
            model: NoiseModel::Uniform,
        });
        emit(&mut listener);
        assert_eq!(listener.events.len(), 2);
        assert!(matches!(
            listener.events[1],
            PipelineEvent::Analyzed { num_bins: 8, .. }
        ));
    }

    #[test]
    fn test_listener_by_mutable_reference() {
        let mut listener = RecordingListener::new();
        {
            let mut borrowed = &mut listener;
            emit(&mut borrowed);
        }
        assert_eq!(listener.events.len(), 1);
    }

    #[test]
    fn test_host_byte_order_matches_target() {
        let expected = if u16::from_ne_bytes([1, 0]) == 1 {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        };
        assert_eq!(ByteOrder::host(), expected);
    }
}
