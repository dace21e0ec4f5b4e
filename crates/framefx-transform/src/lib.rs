//! # framefx-transform
//!
//! Host-facing single-sample video effect transform.
//!
//! [`EffectTransform`] sits in a media pipeline with one input and one
//! output stream. The host negotiates a packed YUV format on both sides,
//! configures a [`ProcessingChain`] through [`PropertySet`], then
//! alternates [`process_input`](EffectTransform::process_input) and
//! [`process_output`](EffectTransform::process_output). Each output frame is
//! the input frame rendered through the chain.
//!
//! # Features
//!
//! - **Negotiation**: input and output types must match exactly; only
//!   YUY2 and NV12 video are accepted, single-field interlace is refused
//! - **Strict alternation**: at most one sample is held; input is refused
//!   until the held sample is consumed or flushed
//! - **Scoped buffer access**: [`VideoBufferLock`] releases buffers on
//!   every path, including failed renders
//! - **Thread safety**: every call is serialized by one internal lock, so
//!   an `Arc<EffectTransform>` can be driven from any thread
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     EffectTransform                      │
//! ├───────────────┬───────────────┬──────────────────────────┤
//! │  negotiation  │ sample slot   │ render                   │
//! │  StreamFormat │ MediaSample   │ VideoBufferLock (in/out) │
//! │  in / out     │ (0 or 1 held) │ TransformFn + chain      │
//! └───────────────┴───────────────┴──────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use framefx_format::{StreamFormat, Subtype};
//! use framefx_stages::StageRegistry;
//! use framefx_transform::{
//!     EffectTransform, MemorySample, OutputDataBuffer, OutputStatus, PropertySet,
//!     TransformConfig, IMAGE_PROVIDERS_KEY,
//! };
//!
//! let chain = StageRegistry::with_builtin()
//!     .parse_chain("grayscale")
//!     .expect("builtin stage");
//!
//! let transform = EffectTransform::new(TransformConfig::default())?;
//! transform.set_properties(&PropertySet::new().with(IMAGE_PROVIDERS_KEY, chain))?;
//!
//! let format = StreamFormat::video(Subtype::SemiPlanar420, 4, 2);
//! transform.set_input_type(0, Some(&format), 0)?;
//! transform.set_output_type(0, Some(&format), 0)?;
//!
//! transform.process_input(0, Arc::new(MemorySample::from_bytes(vec![90; 12])), 0)?;
//!
//! let output = Arc::new(MemorySample::new(12));
//! let status = transform.process_output(0, &mut [OutputDataBuffer::new(output.clone())])?;
//!
//! assert_eq!(status, OutputStatus::Produced);
//! assert_eq!(&output.to_vec()[8..], &[128; 4]);
//! # Ok::<(), framefx_transform::TransformError>(())
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod buffer_lock;
pub mod config;
pub mod controller;
pub mod error;
pub mod properties;
pub mod sample;
pub mod stream;

// =============================================================================
// RE-EXPORTS
// =============================================================================

// Transform
pub use controller::EffectTransform;

// Configuration
pub use config::{TransformConfig, TransformConfigBuilder};

// Errors
pub use error::{classify_error, ErrorType, Result, TransformError};

// Properties and attributes
pub use properties::{AttributeValue, Attributes, PropertySet, PropertyValue, IMAGE_PROVIDERS_KEY};

// Samples and buffers
pub use buffer_lock::{LockMode, VideoBufferLock};
pub use sample::{BufferGuard, MediaBuffer, MediaSample, MemoryBuffer, MemorySample};

// Stream protocol
pub use stream::{
    parse_set_type_flags, NegotiationState, OutputDataBuffer, OutputStatus, SampleState,
    SetTypeFlag, StreamFlag, StreamInfo, StreamLimits, StreamingState, TransformMessage,
    STREAM_ID,
};

// Frequently used format types
pub use framefx_format::{ProcessingChain, ProcessingStage, Rect, StreamFormat, Subtype};

// =============================================================================
// CRATE-LEVEL ITEMS
// =============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
