//! # framefx-stages
//!
//! Reference processing stages for the framefx video effect transform, and
//! a registry that turns a host's textual filter list into a
//! [`ProcessingChain`](framefx_format::ProcessingChain).
//!
//! # Stages
//!
//! | Stage | Kind | Effect |
//! |-------|------|--------|
//! | [`Identity`] | producing | copies the frame |
//! | [`Grayscale`] | producing | chroma set to 128 |
//! | [`Negative`] | producing | every sample inverted |
//! | [`Brightness`] | producing | luma shifted, clamped |
//! | [`Tint`] | producing | chroma replaced by an RGB color |
//! | [`FrameProbe`] | consume-only | frame count and mean luma |
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use framefx_format::ProcessingChain;
//! use framefx_stages::{FrameProbe, Grayscale, StageRegistry};
//!
//! // Build a chain in code...
//! let probe = Arc::new(FrameProbe::new());
//! let mut chain = ProcessingChain::new().with_stage(Grayscale);
//! chain.push(probe.clone());
//!
//! // ...or from a filter list
//! let parsed = StageRegistry::with_builtin().parse_chain("negative, brightness:-0.1")?;
//! assert_eq!(parsed.len(), 2);
//! # Ok::<(), framefx_stages::RegistryError>(())
//! ```

pub mod error;
pub mod registry;
pub mod stages;
pub mod yuv;

pub use error::{RegistryError, Result};
pub use registry::{parse_stage_list, StageFactory, StageRegistry, StageSpec};
pub use stages::{Brightness, FrameProbe, Grayscale, Identity, Negative, ProbeStats, Tint};
pub use yuv::{
    map_samples, mean_luma, mean_rgb, rgb_to_yuv, sample_kind, yuv_to_rgb, Sample,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
