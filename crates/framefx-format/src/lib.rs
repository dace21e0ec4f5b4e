//! # framefx-format
//!
//! Pixel formats, borrowed plane views and processing-chain rendering for
//! the framefx video effect transform.
//!
//! This crate holds no host state: it knows how the two supported packed
//! layouts are laid out in memory and how to hand a locked frame to an
//! external chain of processing stages. The host-facing
//! state machine lives in `framefx-transform`.
//!
//! # Features
//!
//! - **Format description**: [`StreamFormat`], [`Subtype`], [`FourCc`] and
//!   [`InterlaceMode`] for negotiation
//! - **Geometry**: overflow-checked [`image_size`] and [`default_stride`]
//! - **Plane views**: zero-copy [`ImageView`] / [`ImageViewMut`] over YUY2
//!   and NV12 frames, tied to the lifetime of the borrowed bytes
//! - **Chains**: the [`ProcessingStage`] contract and [`ProcessingChain`]
//! - **Rendering**: [`Renderer`] plus per-subtype [`TransformFn`] dispatch
//!
//! # Supported layouts
//!
//! | Subtype | FourCC | Size | Default stride | Planes |
//! |---------|--------|------|----------------|--------|
//! | [`Subtype::Packed422`] | `YUY2` | `2 * w * h` | `(2w + 3) & !3` | 1 |
//! | [`Subtype::SemiPlanar420`] | `NV12` | `w * (h + h/2)` | `w` | 2 |
//!
//! # Quick Start
//!
//! ```rust
//! use framefx_format::{
//!     transform_fn_for, FrameBuffer, FrameBufferMut, ImageView, ImageViewMut,
//!     ProcessingChain, ProcessingStage, Rect, StageFuture, Subtype,
//! };
//!
//! #[derive(Debug)]
//! struct Invert;
//!
//! impl ProcessingStage for Invert {
//!     fn name(&self) -> &str {
//!         "invert"
//!     }
//!
//!     fn render<'a>(
//!         &'a self,
//!         source: &'a ImageView<'_>,
//!         dest: Option<&'a mut ImageViewMut<'_>>,
//!     ) -> StageFuture<'a> {
//!         Box::pin(async move {
//!             if let Some(dest) = dest {
//!                 for (dst, src) in dest.planes_mut().iter_mut().zip(source.planes()) {
//!                     for (d, s) in dst.data_mut().iter_mut().zip(src.data()) {
//!                         *d = 255 - s;
//!                     }
//!                 }
//!             }
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let chain = ProcessingChain::new().with_stage(Invert);
//! let source = vec![0u8; 16];
//! let mut dest = vec![0u8; 16];
//!
//! let transform = transform_fn_for(Subtype::Packed422).expect("YUY2 is supported");
//! transform(
//!     &Rect::from_size(4, 2),
//!     FrameBufferMut { data: &mut dest, stride: 8 },
//!     FrameBuffer { data: &source, stride: 8 },
//!     4,
//!     2,
//!     &chain,
//! )?;
//!
//! assert!(dest.iter().all(|&b| b == 255));
//! # Ok::<(), framefx_format::RenderError>(())
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod chain;
pub mod error;
pub mod format;
pub mod geometry;
pub mod image;
pub mod render;

// =============================================================================
// RE-EXPORTS
// =============================================================================

// Errors
pub use error::{FormatError, RenderError, Result, StageError};

// Format description
pub use format::{FourCc, InterlaceMode, MajorType, StreamFormat, Subtype, SUPPORTED_SUBTYPES};

// Geometry
pub use geometry::{default_stride, image_size, row_bytes, Rect};

// Plane views
pub use image::{
    ensure_same_geometry, plane_layout, wrap_packed422, wrap_packed422_mut, wrap_semi_planar420,
    wrap_semi_planar420_mut, ColorMode, ImageView, ImageViewMut, Plane, PlaneLayout, PlaneMut,
};

// Chains and rendering
pub use chain::{ProcessingChain, ProcessingStage, StageFuture};
pub use render::{
    transform_fn_for, transform_packed422, transform_semi_planar420, FrameBuffer,
    FrameBufferMut, Renderer, TransformFn,
};

// =============================================================================
// CRATE-LEVEL ITEMS
// =============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
