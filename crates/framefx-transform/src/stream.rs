//! Stream topology, flags, messages and state snapshots

use std::fmt;
use std::sync::Arc;

use enumflags2::{bitflags, BitFlags};

use crate::error::{Result, TransformError};
use crate::sample::MediaSample;

/// The only valid stream id on either side
pub const STREAM_ID: u32 = 0;

/// Flags accepted by `set_input_type` / `set_output_type`
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetTypeFlag {
    /// Validate the type without committing it
    TestOnly = 0x1,
}

/// Properties of a stream reported by `input_stream_info` / `output_stream_info`
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFlag {
    /// Each buffer holds whole samples
    WholeSamples = 0x1,
    /// Each buffer holds exactly one sample
    SingleSamplePerBuffer = 0x2,
    /// All samples have the same size
    FixedSampleSize = 0x4,
}

/// Parse a raw flag word, rejecting unknown bits
pub fn parse_set_type_flags(flags: u32) -> Result<BitFlags<SetTypeFlag>> {
    BitFlags::from_bits(flags)
        .map_err(|_| TransformError::invalid_argument(format!("unknown type flags 0x{flags:x}")))
}

/// Reject a nonzero reserved flag word
pub(crate) fn ensure_reserved_zero(flags: u32, operation: &str) -> Result<()> {
    if flags != 0 {
        return Err(TransformError::invalid_argument(format!(
            "{operation} flags must be zero, got 0x{flags:x}"
        )));
    }
    Ok(())
}

/// Fail unless `id` names the single stream
pub(crate) fn ensure_stream_id(id: u32) -> Result<()> {
    if id != STREAM_ID {
        return Err(TransformError::InvalidStreamNumber(id));
    }
    Ok(())
}

/// Stream count bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamLimits {
    pub input_min: u32,
    pub input_max: u32,
    pub output_min: u32,
    pub output_max: u32,
}

impl StreamLimits {
    /// One input and one output stream, fixed
    pub const FIXED: Self = Self {
        input_min: 1,
        input_max: 1,
        output_min: 1,
        output_max: 1,
    };
}

/// Buffer requirements of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub flags: BitFlags<StreamFlag>,
    /// Bytes per sample, 0 until the stream's type is set
    pub sample_size: u32,
    /// Latency in 100-ns units
    pub max_latency: i64,
    pub max_lookahead: u32,
    pub alignment: u32,
}

/// Command sent by the host through `process_message`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMessage {
    /// Drop the held sample without producing output
    CommandFlush,
    CommandDrain,
    /// Hardware device manager; carries the host's handle
    SetD3dManager(usize),
    NotifyBeginStreaming,
    NotifyEndStreaming,
    NotifyStartOfStream,
    NotifyEndOfStream,
}

/// One output slot handed to `process_output`
#[derive(Clone, Default)]
pub struct OutputDataBuffer {
    pub stream_id: u32,
    /// Destination sample allocated by the host
    pub sample: Option<Arc<dyn MediaSample>>,
    /// Per-slot status, reserved and left at 0
    pub status: u32,
}

impl OutputDataBuffer {
    /// Slot for stream 0 with the given destination sample
    pub fn new(sample: Arc<dyn MediaSample>) -> Self {
        Self {
            stream_id: STREAM_ID,
            sample: Some(sample),
            status: 0,
        }
    }
}

impl fmt::Debug for OutputDataBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputDataBuffer")
            .field("stream_id", &self.stream_id)
            .field("has_sample", &self.sample.is_some())
            .field("status", &self.status)
            .finish()
    }
}

/// Outcome of `process_output`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    /// The output sample was written
    Produced,
    /// No input sample is held; deliver input first
    NeedMoreInput,
}

/// Which formats are negotiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Unset,
    InputOnly,
    OutputOnly,
    BothSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamingState {
    Idle,
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    Empty,
    Holding,
}
