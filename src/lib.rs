//! # framefx
//!
//! Single-sample video effect transform for packed YUV frames.
//!
//! This crate is a facade over the framefx libraries:
//!
//! - **[`format`]** - Stream formats, plane views and the processing-chain contract
//! - **[`transform`]** - The host-facing transform: negotiation, sample slot, rendering
//! - **[`stages`]** - Reference YUV stages and a name-based stage registry
//!
//! # Features
//!
//! All features are enabled by default. You can selectively enable only what you need:
//!
//! ```toml
//! # Everything (default)
//! framefx = "0.1"
//!
//! # Write your own stages against the chain contract only
//! framefx = { version = "0.1", default-features = false, features = ["format"] }
//!
//! # Transform without the reference stages
//! framefx = { version = "0.1", default-features = false, features = ["transform"] }
//! ```
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `format` | Yes | Formats, plane views, chains |
//! | `transform` | Yes | Host-facing transform |
//! | `stages` | Yes | Reference stages and registry |
//! | `full` | No | All features from all sub-crates |
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use framefx::prelude::*;
//!
//! let chain = StageRegistry::with_builtin()
//!     .parse_chain("brightness:0.1,negative")
//!     .expect("builtin stages");
//!
//! let transform = EffectTransform::new(TransformConfig::default())?;
//! transform.set_properties(&PropertySet::new().with(IMAGE_PROVIDERS_KEY, chain))?;
//!
//! let format = StreamFormat::video(Subtype::Packed422, 4, 2);
//! transform.set_input_type(0, Some(&format), 0)?;
//! transform.set_output_type(0, Some(&format), 0)?;
//!
//! transform.process_input(0, Arc::new(MemorySample::from_bytes(vec![16; 16])), 0)?;
//! let output = Arc::new(MemorySample::new(16));
//! transform.process_output(0, &mut [OutputDataBuffer::new(output.clone())])?;
//! # Ok::<(), TransformError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            framefx                              │
//! ├─────────────────────┬─────────────────────┬─────────────────────┤
//! │  framefx-transform  │   framefx-stages    │   framefx-format    │
//! │                     │                     │                     │
//! │  EffectTransform    │  StageRegistry      │  StreamFormat       │
//! │  VideoBufferLock    │  Grayscale, Tint    │  ImageView          │
//! │  TransformConfig    │  FrameProbe         │  Renderer           │
//! └──────────┬──────────┴──────────┬──────────┴──────────┬──────────┘
//!            │                     │                     │
//!            ▼                     ▼                     ▼
//!      media host            YUV sample math      YUY2 / NV12 memory
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// RE-EXPORTS
// =============================================================================

/// Stream formats, plane views and processing chains.
///
/// See [`framefx_format`] documentation for details.
#[cfg(feature = "format")]
#[cfg_attr(docsrs, doc(cfg(feature = "format")))]
pub use framefx_format as format;

/// The host-facing effect transform.
///
/// See [`framefx_transform`] documentation for details.
#[cfg(feature = "transform")]
#[cfg_attr(docsrs, doc(cfg(feature = "transform")))]
pub use framefx_transform as transform;

/// Reference processing stages and the stage registry.
///
/// See [`framefx_stages`] documentation for details.
#[cfg(feature = "stages")]
#[cfg_attr(docsrs, doc(cfg(feature = "stages")))]
pub use framefx_stages as stages;

// =============================================================================
// PRELUDE - Common types for convenience
// =============================================================================

/// Prelude module with commonly used types.
///
/// ```rust
/// use framefx::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "format")]
    pub use framefx_format::{
        ImageView, ImageViewMut, ProcessingChain, ProcessingStage, StageError, StageFuture,
        StreamFormat, Subtype,
    };

    #[cfg(feature = "transform")]
    pub use framefx_transform::{
        EffectTransform, MediaSample, MemorySample, OutputDataBuffer, OutputStatus, PropertySet,
        TransformConfig, TransformError, IMAGE_PROVIDERS_KEY,
    };

    #[cfg(feature = "stages")]
    pub use framefx_stages::{FrameProbe, StageRegistry};
}
