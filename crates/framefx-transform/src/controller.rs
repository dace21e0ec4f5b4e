//! The host-facing effect transform
//!
//! [`EffectTransform`] is one pipeline stage with exactly one input and one
//! output stream. Its mutable state sits behind a single mutex: every host
//! call takes the lock, so calls from different threads are serialized. The
//! render inside [`EffectTransform::process_output`] blocks on the chain
//! while the lock is held.
//!
//! # Protocol
//!
//! ```text
//! set_properties(chain)
//!        │
//!        ▼
//! negotiate input/output type ──► process_input ──► process_output ──┐
//!        ▲                              ▲                              │
//!        │                              └──────────────────────────────┘
//!        └── allowed again once no sample is held
//! ```
//!
//! Parameter checks (flag words, stream ids, slot counts) run before the lock
//! is taken and never change state.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use framefx_format::{
    geometry, transform_fn_for, MajorType, ProcessingChain, Rect, StreamFormat, TransformFn,
    SUPPORTED_SUBTYPES,
};

use crate::buffer_lock::{LockMode, VideoBufferLock};
use crate::config::TransformConfig;
use crate::error::{Result, TransformError};
use crate::properties::{Attributes, PropertySet};
use crate::sample::MediaSample;
use crate::stream::{
    ensure_reserved_zero, ensure_stream_id, parse_set_type_flags, NegotiationState,
    OutputDataBuffer, OutputStatus, SampleState, SetTypeFlag, StreamFlag, StreamInfo,
    StreamLimits, StreamingState, TransformMessage,
};

/// Frame geometry derived from the committed input type
#[derive(Clone, Copy)]
struct Geometry {
    width: u32,
    height: u32,
    image_size: u32,
    transform: TransformFn,
}

#[derive(Default)]
struct TransformState {
    input_type: Option<StreamFormat>,
    output_type: Option<StreamFormat>,
    geometry: Option<Geometry>,
    streaming: bool,
    dest_rect: Rect,
    sample: Option<Arc<dyn MediaSample>>,
    chain: Option<ProcessingChain>,
}

impl TransformState {
    /// Idempotent; recomputes the destination rectangle on first use
    fn begin_streaming(&mut self) {
        if self.streaming {
            return;
        }
        self.dest_rect = self
            .geometry
            .map(|g| Rect::from_size(g.width, g.height))
            .unwrap_or_default();
        self.streaming = true;
        debug!("Streaming started, destination {:?}", self.dest_rect);
    }

    fn end_streaming(&mut self) {
        if self.streaming {
            debug!("Streaming ended");
        }
        self.streaming = false;
    }

    fn release_sample(&mut self) {
        if self.sample.take().is_some() {
            trace!("Released held sample");
        }
    }
}

/// Which side of the transform an operation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Input,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Single-sample video effect transform
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use framefx_format::{ProcessingChain, StreamFormat, Subtype};
/// use framefx_stages::Negative;
/// use framefx_transform::{
///     EffectTransform, MemorySample, OutputDataBuffer, OutputStatus, PropertySet,
///     IMAGE_PROVIDERS_KEY,
/// };
///
/// let transform = EffectTransform::with_default()?;
/// transform.set_properties(
///     &PropertySet::new().with(IMAGE_PROVIDERS_KEY, ProcessingChain::new().with_stage(Negative)),
/// )?;
///
/// let format = StreamFormat::video(Subtype::Packed422, 4, 2);
/// transform.set_input_type(0, Some(&format), 0)?;
/// transform.set_output_type(0, Some(&format), 0)?;
///
/// transform.process_input(0, Arc::new(MemorySample::from_bytes(vec![0; 16])), 0)?;
///
/// let output = Arc::new(MemorySample::new(16));
/// let mut slots = [OutputDataBuffer::new(output.clone())];
/// assert_eq!(transform.process_output(0, &mut slots)?, OutputStatus::Produced);
/// assert_eq!(output.to_vec(), vec![255; 16]);
/// # Ok::<(), framefx_transform::TransformError>(())
/// ```
pub struct EffectTransform {
    config: TransformConfig,
    attributes: Attributes,
    state: Mutex<TransformState>,
}

impl EffectTransform {
    /// Create a transform; fails if the configuration is invalid
    pub fn new(config: TransformConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|issues| TransformError::config(issues.join("; ")))?;

        info!(
            "Creating effect transform (max dimension {}, copy metadata {})",
            config.max_dimension, config.copy_sample_metadata
        );

        Ok(Self {
            attributes: Attributes::with_capacity(config.attribute_capacity),
            config,
            state: Mutex::new(TransformState::default()),
        })
    }

    /// Create a transform with the default configuration
    pub fn with_default() -> Result<Self> {
        Self::new(TransformConfig::default())
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Configure the processing chain from host properties
    ///
    /// On failure the current chain is left in place.
    pub fn set_properties(&self, properties: &PropertySet) -> Result<()> {
        let chain = properties.image_providers()?.clone();
        info!("Processing chain configured: {:?}", chain.names());
        self.state.lock().chain = Some(chain);
        Ok(())
    }

    /// The configured processing chain
    pub fn chain(&self) -> Option<ProcessingChain> {
        self.state.lock().chain.clone()
    }

    // =========================================================================
    // Stream topology
    // =========================================================================

    pub fn stream_limits(&self) -> StreamLimits {
        StreamLimits::FIXED
    }

    /// Input and output stream counts
    pub fn stream_count(&self) -> (u32, u32) {
        (1, 1)
    }

    /// Stream ids are implicitly 0 on both sides
    pub fn stream_ids(&self) -> Result<(Vec<u32>, Vec<u32>)> {
        Err(TransformError::NotImplemented("stream ids are fixed at 0"))
    }

    pub fn input_stream_info(&self, id: u32) -> Result<StreamInfo> {
        self.stream_info(Side::Input, id)
    }

    pub fn output_stream_info(&self, id: u32) -> Result<StreamInfo> {
        self.stream_info(Side::Output, id)
    }

    fn stream_info(&self, side: Side, id: u32) -> Result<StreamInfo> {
        ensure_stream_id(id)?;
        let state = self.state.lock();

        let format = match side {
            Side::Input => state.input_type.as_ref(),
            Side::Output => state.output_type.as_ref(),
        };
        // A type without a frame size has no fixed sample size yet.
        let sample_size = format.and_then(|f| f.image_size().ok()).unwrap_or(0);

        let mut flags = StreamFlag::WholeSamples | StreamFlag::SingleSamplePerBuffer;
        if side == Side::Output {
            flags |= StreamFlag::FixedSampleSize;
        }

        Ok(StreamInfo {
            flags,
            sample_size,
            max_latency: 0,
            max_lookahead: 0,
            alignment: 0,
        })
    }

    /// Attribute store shared with the host
    pub fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }

    pub fn input_stream_attributes(&self, _id: u32) -> Result<Attributes> {
        Err(TransformError::NotImplemented("per-stream input attributes"))
    }

    pub fn output_stream_attributes(&self, _id: u32) -> Result<Attributes> {
        Err(TransformError::NotImplemented("per-stream output attributes"))
    }

    pub fn add_input_streams(&self, _ids: &[u32]) -> Result<()> {
        Err(TransformError::NotImplemented("the stream topology is fixed"))
    }

    pub fn delete_input_stream(&self, _id: u32) -> Result<()> {
        Err(TransformError::NotImplemented("the stream topology is fixed"))
    }

    pub fn set_output_bounds(&self, _lower: i64, _upper: i64) -> Result<()> {
        Err(TransformError::NotImplemented("output bounds"))
    }

    pub fn process_event(&self, _id: u32, _event: u32) -> Result<()> {
        Err(TransformError::NotImplemented("stream events"))
    }

    // =========================================================================
    // Type negotiation
    // =========================================================================

    /// Type offered at `index` for the input stream, `None` past the end
    pub fn input_available_type(&self, id: u32, index: u32) -> Result<Option<StreamFormat>> {
        self.available_type(Side::Input, id, index)
    }

    /// Type offered at `index` for the output stream, `None` past the end
    pub fn output_available_type(&self, id: u32, index: u32) -> Result<Option<StreamFormat>> {
        self.available_type(Side::Output, id, index)
    }

    fn available_type(&self, side: Side, id: u32, index: u32) -> Result<Option<StreamFormat>> {
        ensure_stream_id(id)?;
        let state = self.state.lock();

        let peer = match side {
            Side::Input => state.output_type.as_ref(),
            Side::Output => state.input_type.as_ref(),
        };

        // A fixed peer is the only type the pair can agree on.
        let offered = match peer {
            Some(peer) => (index == 0).then(|| peer.clone()),
            None => usize::try_from(index)
                .ok()
                .and_then(|i| SUPPORTED_SUBTYPES.get(i))
                .map(|subtype| StreamFormat::partial(*subtype)),
        };

        debug!("Available {} type {}: {:?}", side, index, offered);
        Ok(offered)
    }

    /// Validate and, unless `TestOnly` is set, commit the input type
    ///
    /// `None` clears the type.
    pub fn set_input_type(&self, id: u32, format: Option<&StreamFormat>, flags: u32) -> Result<()> {
        self.set_type(Side::Input, id, format, flags)
    }

    /// Validate and, unless `TestOnly` is set, commit the output type
    ///
    /// `None` clears the type.
    pub fn set_output_type(
        &self,
        id: u32,
        format: Option<&StreamFormat>,
        flags: u32,
    ) -> Result<()> {
        self.set_type(Side::Output, id, format, flags)
    }

    fn set_type(
        &self,
        side: Side,
        id: u32,
        format: Option<&StreamFormat>,
        flags: u32,
    ) -> Result<()> {
        let flags = parse_set_type_flags(flags)?;
        ensure_stream_id(id)?;

        let mut state = self.state.lock();
        if state.sample.is_some() {
            warn!("Rejected {} type change while a sample is held", side);
            return Err(TransformError::CannotChangeTypeWhileProcessing);
        }

        let peer = match side {
            Side::Input => state.output_type.as_ref(),
            Side::Output => state.input_type.as_ref(),
        };
        let geometry = match format {
            Some(candidate) => {
                validate_type(candidate, peer)?;
                match side {
                    Side::Input => Some(self.input_geometry(candidate)?),
                    Side::Output => None,
                }
            }
            None => None,
        };

        if flags.contains(SetTypeFlag::TestOnly) {
            debug!("Test-only {} type accepted: {:?}", side, format);
            return Ok(());
        }

        match side {
            Side::Input => {
                state.input_type = format.cloned();
                state.geometry = geometry;
            }
            Side::Output => state.output_type = format.cloned(),
        }
        state.end_streaming();

        match format {
            Some(format) => info!("Committed {} type {}", side, format),
            None => info!("Cleared {} type", side),
        }
        Ok(())
    }

    fn input_geometry(&self, format: &StreamFormat) -> Result<Geometry> {
        let (width, height) = format
            .dimensions()
            .map_err(|e| TransformError::invalid_media_type(e.to_string()))?;

        let max = self.config.max_dimension;
        if width > max || height > max {
            return Err(TransformError::invalid_media_type(format!(
                "frame {width}x{height} exceeds the {max} pixel limit"
            )));
        }

        let image_size = geometry::image_size(format.subtype, width, height)?;
        let transform = transform_fn_for(format.subtype).ok_or_else(|| {
            TransformError::unexpected(format!("no conversion for validated {}", format.subtype))
        })?;

        Ok(Geometry {
            width,
            height,
            image_size,
            transform,
        })
    }

    pub fn input_current_type(&self, id: u32) -> Result<StreamFormat> {
        ensure_stream_id(id)?;
        self.state
            .lock()
            .input_type
            .clone()
            .ok_or(TransformError::TypeNotSet)
    }

    pub fn output_current_type(&self, id: u32) -> Result<StreamFormat> {
        ensure_stream_id(id)?;
        self.state
            .lock()
            .output_type
            .clone()
            .ok_or(TransformError::TypeNotSet)
    }

    // =========================================================================
    // Status and messages
    // =========================================================================

    /// Whether the input stream can accept a sample
    pub fn input_status(&self, id: u32) -> Result<bool> {
        ensure_stream_id(id)?;
        Ok(self.state.lock().sample.is_none())
    }

    /// Whether an output sample can be produced
    pub fn output_status(&self) -> bool {
        self.state.lock().sample.is_some()
    }

    pub fn process_message(&self, message: TransformMessage) -> Result<()> {
        debug!("Message {:?}", message);
        match message {
            TransformMessage::CommandFlush => self.state.lock().release_sample(),
            TransformMessage::NotifyBeginStreaming => self.state.lock().begin_streaming(),
            TransformMessage::NotifyEndStreaming => self.state.lock().end_streaming(),
            TransformMessage::CommandDrain
            | TransformMessage::NotifyStartOfStream
            | TransformMessage::NotifyEndOfStream => {}
            TransformMessage::SetD3dManager(_) => {
                return Err(TransformError::NotImplemented("hardware device manager"))
            }
        }
        Ok(())
    }

    pub fn negotiation_state(&self) -> NegotiationState {
        let state = self.state.lock();
        match (state.input_type.is_some(), state.output_type.is_some()) {
            (false, false) => NegotiationState::Unset,
            (true, false) => NegotiationState::InputOnly,
            (false, true) => NegotiationState::OutputOnly,
            (true, true) => NegotiationState::BothSet,
        }
    }

    pub fn streaming_state(&self) -> StreamingState {
        if self.state.lock().streaming {
            StreamingState::Streaming
        } else {
            StreamingState::Idle
        }
    }

    pub fn sample_state(&self) -> SampleState {
        if self.state.lock().sample.is_some() {
            SampleState::Holding
        } else {
            SampleState::Empty
        }
    }

    // =========================================================================
    // Processing
    // =========================================================================

    /// Accept one input sample
    ///
    /// Both types must be set and no sample may be held.
    pub fn process_input(&self, id: u32, sample: Arc<dyn MediaSample>, flags: u32) -> Result<()> {
        ensure_reserved_zero(flags, "process_input")?;
        ensure_stream_id(id)?;

        let mut state = self.state.lock();
        if state.input_type.is_none() || state.output_type.is_none() {
            return Err(TransformError::TypeNotSet);
        }
        if state.sample.is_some() {
            warn!("Rejected input: a sample is already held");
            return Err(TransformError::NotAccepting);
        }

        state.begin_streaming();
        state.sample = Some(sample);
        trace!("Accepted input sample");
        Ok(())
    }

    /// Render the held sample into the single output slot
    ///
    /// Returns [`OutputStatus::NeedMoreInput`] without changing state when
    /// no sample is held. Otherwise the held sample is released whether or
    /// not rendering succeeds.
    pub fn process_output(
        &self,
        flags: u32,
        buffers: &mut [OutputDataBuffer],
    ) -> Result<OutputStatus> {
        ensure_reserved_zero(flags, "process_output")?;
        let [slot] = &*buffers else {
            return Err(TransformError::invalid_argument(format!(
                "expected 1 output buffer, got {}",
                buffers.len()
            )));
        };
        ensure_stream_id(slot.stream_id)?;
        let output = slot
            .sample
            .clone()
            .ok_or_else(|| TransformError::invalid_argument("output buffer has no sample"))?;

        let mut state = self.state.lock();
        let Some(input) = state.sample.take() else {
            return Ok(OutputStatus::NeedMoreInput);
        };

        if std::ptr::addr_eq(Arc::as_ptr(&input), Arc::as_ptr(&output)) {
            return Err(TransformError::invalid_argument(
                "input and output are the same sample",
            ));
        }

        state.begin_streaming();
        self.render_sample(&state, input.as_ref(), output.as_ref())?;
        trace!("Produced output sample");
        Ok(OutputStatus::Produced)
    }

    fn render_sample(
        &self,
        state: &TransformState,
        input: &dyn MediaSample,
        output: &dyn MediaSample,
    ) -> Result<()> {
        let chain = state
            .chain
            .as_ref()
            .ok_or_else(|| TransformError::config("no processing chain configured"))?;
        let (Some(format), Some(geometry)) = (state.input_type.as_ref(), state.geometry) else {
            return Err(TransformError::unexpected("input geometry missing"));
        };

        let output_buffer = output.buffer()?;
        {
            let input_lock = VideoBufferLock::lock(input.buffer()?, LockMode::Read, format)?;
            let mut output_lock = VideoBufferLock::lock(output_buffer, LockMode::Write, format)?;

            (geometry.transform)(
                &state.dest_rect,
                output_lock.frame_mut()?,
                input_lock.frame(),
                geometry.width,
                geometry.height,
                chain,
            )?;
        }

        let length = usize::try_from(geometry.image_size)
            .map_err(|_| TransformError::buffer("image size exceeds the address space"))?;
        output_buffer.set_current_length(length)?;

        if self.config.copy_sample_metadata {
            // Optional metadata; failures are not reported.
            if let Some(duration) = input.sample_duration() {
                let _ = output.set_sample_duration(duration);
            }
            if let Some(time) = input.sample_time() {
                let _ = output.set_sample_time(time);
            }
        }
        Ok(())
    }
}

/// Check a candidate type against the supported set and the fixed peer
fn validate_type(candidate: &StreamFormat, peer: Option<&StreamFormat>) -> Result<()> {
    if candidate.major_type != MajorType::Video {
        return Err(TransformError::invalid_media_type(format!(
            "major type {:?} is not video",
            candidate.major_type
        )));
    }
    if !candidate.subtype.is_supported() {
        return Err(TransformError::invalid_media_type(format!(
            "unsupported subtype {}",
            candidate.subtype
        )));
    }
    if candidate.interlace.is_some_and(|mode| mode.is_single_field()) {
        return Err(TransformError::invalid_media_type(
            "single-field interlace is not supported",
        ));
    }
    if let Some(peer) = peer {
        if candidate != peer {
            return Err(TransformError::invalid_media_type(format!(
                "{candidate} does not match the other stream's {peer}"
            )));
        }
    }
    Ok(())
}

impl fmt::Debug for EffectTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EffectTransform")
            .field("config", &self.config)
            .field("input_type", &state.input_type)
            .field("output_type", &state.output_type)
            .field("streaming", &state.streaming)
            .field("holding_sample", &state.sample.is_some())
            .field("chain", &state.chain)
            .finish()
    }
}
