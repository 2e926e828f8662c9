//! In-memory representation of one analog capture.

use serde::{Deserialize, Serialize};

/// Literal identifier at the start of every capture file.
pub const CAPTURE_MAGIC: [u8; 8] = *b"<SALEAE>";

/// The only format version this crate understands.
pub const SUPPORTED_VERSION: i32 = 0;

/// Capture type value marking an analog capture.
pub const ANALOG_CAPTURE_TYPE: i32 = 1;

/// Bytes before the sample payload: 16-byte header plus four 8-byte fields.
pub const FIXED_LEN: usize = 48;

/// Fixed 16-byte prefix of a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureHeader {
    pub identifier: [u8; 8],
    pub version: i32,
    pub capture_type: i32,
}

impl CaptureHeader {
    /// Header of a valid analog capture.
    pub fn analog() -> Self {
        Self {
            identifier: CAPTURE_MAGIC,
            version: SUPPORTED_VERSION,
            capture_type: ANALOG_CAPTURE_TYPE,
        }
    }
}

/// One recorded or synthesized analog signal.
///
/// Records are built by [`parse`](super::parse) or [`synthesize`](super::synthesize)
/// and never mutated afterwards; the fields are read through accessors so the
/// `samples.len() == num_samples` invariant can't be broken by a caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureRecord {
    header: Option<CaptureHeader>,
    begin_time: f64,
    sample_rate: u64,
    downsample: u64,
    samples: Vec<f32>,
}

impl CaptureRecord {
    pub(crate) fn from_parts(
        header: Option<CaptureHeader>,
        begin_time: f64,
        sample_rate: u64,
        downsample: u64,
        samples: Vec<f32>,
    ) -> Self {
        Self {
            header,
            begin_time,
            sample_rate,
            downsample,
            samples,
        }
    }

    /// Header read from the file; `None` for synthesized records.
    pub fn header(&self) -> Option<&CaptureHeader> {
        self.header.as_ref()
    }

    /// Timestamp of the first sample in seconds.
    pub fn begin_time(&self) -> f64 {
        self.begin_time
    }

    /// Samples per second.
    pub fn sample_rate(&self) -> u64 {
        self.sample_rate
    }

    /// Decimation factor applied by the capturing instrument.
    pub fn downsample(&self) -> u64 {
        self.downsample
    }

    pub fn num_samples(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Give up the record and keep only the sample buffer.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Duration of the capture in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Timestamp of every sample, starting at `begin_time`.
    ///
    /// Returns an empty vector when the sample rate is zero since no time
    /// axis can be derived.
    pub fn sample_times(&self) -> Vec<f64> {
        if self.sample_rate == 0 {
            return Vec::new();
        }
        let period = 1.0 / self.sample_rate as f64;
        (0..self.samples.len())
            .map(|i| self.begin_time + i as f64 * period)
            .collect()
    }
}
