//! Decoder for binary analog capture files.
//!
//! Layout (little-endian, no padding):
//!
//! | Offset | Size | Field        |
//! |--------|------|--------------|
//! | 0      | 8    | identifier   |
//! | 8      | 4    | version      |
//! | 12     | 4    | capture type |
//! | 16     | 8    | begin_time   |
//! | 24     | 8    | sample_rate  |
//! | 32     | 8    | downsample   |
//! | 40     | 8    | num_samples  |
//! | 48     | 4×N  | samples      |
//!
//! Every multi-byte field is decoded with an explicit little-endian read, so
//! big-endian hosts get the byte swap for free. Bytes after the declared
//! payload are ignored.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder as _, LittleEndian, ReadBytesExt};
use thiserror::Error;

use super::record::{
    CaptureHeader, CaptureRecord, ANALOG_CAPTURE_TYPE, CAPTURE_MAGIC, SUPPORTED_VERSION,
};
use crate::listener::{ByteOrder, NoOpListener, PipelineEvent, PipelineListener};

/// Errors that can occur while parsing a capture file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to open capture file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Truncated header")]
    TruncatedHeader,

    #[error("Truncated sample data: header declares {declared} samples but only {available} are present")]
    TruncatedSamples { declared: u64, available: u64 },

    #[error("Failed to read capture: {0}")]
    Io(#[from] io::Error),

    #[error("Bad magic: found {found:?}")]
    BadMagic { found: [u8; 8] },

    #[error("Unsupported version: expected 0, found {0}")]
    UnsupportedVersion(i32),

    #[error("Not an analog capture: expected type 1, found {0}")]
    NotAnalog(i32),
}

/// Coarse category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// File unavailable, unreadable or truncated.
    Io,
    /// Identifier, version or type mismatch.
    Format,
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::Open { .. }
            | ParseError::TruncatedHeader
            | ParseError::TruncatedSamples { .. }
            | ParseError::Io(_) => ParseErrorKind::Io,
            ParseError::BadMagic { .. }
            | ParseError::UnsupportedVersion(_)
            | ParseError::NotAnalog(_) => ParseErrorKind::Format,
        }
    }
}

/// Parse a capture file from disk.
///
/// The file handle is dropped before returning, on success and on every
/// error path.
///
/// # Example
///
/// ```no_run
/// use capture_spectrum::capture::parse;
///
/// let capture = parse("analog_0.bin").unwrap();
/// println!("{} samples at {} S/s", capture.num_samples(), capture.sample_rate());
/// ```
pub fn parse<P: AsRef<Path>>(path: P) -> Result<CaptureRecord, ParseError> {
    parse_with_listener(path, &mut NoOpListener)
}

/// Like [`parse`], reporting progress and failures to `listener`.
pub fn parse_with_listener<P: AsRef<Path>, L: PipelineListener>(
    path: P,
    listener: &mut L,
) -> Result<CaptureRecord, ParseError> {
    let path = path.as_ref();
    let source = path.display().to_string();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            let err = ParseError::Open {
                path: path.to_path_buf(),
                source: e,
            };
            listener.on_event(PipelineEvent::ParseFailed {
                source,
                error: err.to_string(),
            });
            return Err(err);
        }
    };

    decode_reported(BufReader::new(file), source, listener)
}

/// Parse a capture from any byte stream.
pub fn parse_reader<R: Read>(reader: R) -> Result<CaptureRecord, ParseError> {
    parse_reader_with_listener(reader, &mut NoOpListener)
}

/// Like [`parse_reader`], reporting progress and failures to `listener`.
pub fn parse_reader_with_listener<R: Read, L: PipelineListener>(
    reader: R,
    listener: &mut L,
) -> Result<CaptureRecord, ParseError> {
    decode_reported(reader, "<stream>".to_string(), listener)
}

/// Parse a capture held in memory.
pub fn parse_bytes(bytes: &[u8]) -> Result<CaptureRecord, ParseError> {
    parse_reader(bytes)
}

fn decode_reported<R: Read, L: PipelineListener>(
    reader: R,
    source: String,
    listener: &mut L,
) -> Result<CaptureRecord, ParseError> {
    listener.on_event(PipelineEvent::DecodingStarted {
        source: source.clone(),
        host: ByteOrder::host(),
    });

    match decode(reader) {
        Ok(record) => {
            listener.on_event(PipelineEvent::ParsedCapture {
                source,
                num_samples: record.num_samples(),
                sample_rate: record.sample_rate(),
            });
            Ok(record)
        }
        Err(err) => {
            listener.on_event(PipelineEvent::ParseFailed {
                source,
                error: err.to_string(),
            });
            Err(err)
        }
    }
}

/// Map a short read inside the fixed-size prefix to `TruncatedHeader`.
fn header_field<T>(result: io::Result<T>) -> Result<T, ParseError> {
    result.map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ParseError::TruncatedHeader,
        _ => ParseError::Io(e),
    })
}

fn decode<R: Read>(mut reader: R) -> Result<CaptureRecord, ParseError> {
    // Validate the header before trusting anything after it
    let mut identifier = [0u8; 8];
    header_field(reader.read_exact(&mut identifier))?;
    if identifier != CAPTURE_MAGIC {
        return Err(ParseError::BadMagic { found: identifier });
    }

    let version = header_field(reader.read_i32::<LittleEndian>())?;
    if version != SUPPORTED_VERSION {
        return Err(ParseError::UnsupportedVersion(version));
    }

    let capture_type = header_field(reader.read_i32::<LittleEndian>())?;
    if capture_type != ANALOG_CAPTURE_TYPE {
        return Err(ParseError::NotAnalog(capture_type));
    }

    let begin_time = header_field(reader.read_f64::<LittleEndian>())?;
    let sample_rate = header_field(reader.read_u64::<LittleEndian>())?;
    let downsample = header_field(reader.read_u64::<LittleEndian>())?;
    let num_samples = header_field(reader.read_u64::<LittleEndian>())?;

    // Read through `take` so a corrupt count can't force a huge allocation
    // before we know the payload is really there.
    let byte_len = num_samples.saturating_mul(4);
    let mut payload = Vec::new();
    reader.by_ref().take(byte_len).read_to_end(&mut payload)?;
    if (payload.len() as u64) < byte_len {
        return Err(ParseError::TruncatedSamples {
            declared: num_samples,
            available: payload.len() as u64 / 4,
        });
    }

    let mut samples = vec![0.0f32; payload.len() / 4];
    LittleEndian::read_f32_into(&payload, &mut samples);

    let header = CaptureHeader {
        identifier,
        version,
        capture_type,
    };

    Ok(CaptureRecord::from_parts(
        Some(header),
        begin_time,
        sample_rate,
        downsample,
        samples,
    ))
}
