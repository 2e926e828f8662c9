//! Capture ingestion.
//!
//! This module provides:
//! - The in-memory capture record shared by the whole pipeline
//! - Binary capture file parsing with strict header validation
//! - Square and sine waveform synthesis

pub mod parser;
pub mod record;
pub mod synth;

// Re-export commonly used types
pub use parser::{
    parse, parse_bytes, parse_reader, parse_reader_with_listener, parse_with_listener, ParseError,
    ParseErrorKind,
};
pub use record::{CaptureHeader, CaptureRecord, CAPTURE_MAGIC, FIXED_LEN};
pub use synth::{synthesize, synthesize_with_listener, SynthError, WaveformKind, SYNTH_NUM_SAMPLES};
