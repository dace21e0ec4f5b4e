//! Chain rendering and per-subtype conversion dispatch
//!
//! [`Renderer`] runs a [`ProcessingChain`] from a source image into a
//! destination image. Intermediate producing stages render into scratch
//! frames; the last producing stage renders straight into the destination.
//! Consume-only stages observe whichever image is current when they run.
//!
//! The conversion functions ([`transform_packed422`],
//! [`transform_semi_planar420`]) wrap raw locked frame memory as image
//! views, render the chain and block until it completes.

use tracing::trace;

use crate::chain::ProcessingChain;
use crate::error::RenderError;
use crate::format::Subtype;
use crate::geometry::{self, Rect};
use crate::image::{
    ensure_same_geometry, wrap_packed422, wrap_packed422_mut, wrap_semi_planar420,
    wrap_semi_planar420_mut, ImageView, ImageViewMut,
};

/// Which image holds the chain output so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Current {
    Source,
    Scratch(usize),
    Target,
}

/// Runs a processing chain against a source and destination image
#[derive(Debug)]
pub struct Renderer<'c> {
    chain: &'c ProcessingChain,
    target_rect: Option<Rect>,
}

impl<'c> Renderer<'c> {
    /// Bind a renderer to a chain
    pub fn new(chain: &'c ProcessingChain) -> Self {
        Self {
            chain,
            target_rect: None,
        }
    }

    /// Restrict the render to a region of the destination
    ///
    /// The rectangle must lie within the destination frame.
    #[must_use]
    pub fn with_target_rect(mut self, rect: Rect) -> Self {
        self.target_rect = Some(rect);
        self
    }

    /// Render the chain, leaving its output in `dest`
    pub async fn render(
        &self,
        source: &ImageView<'_>,
        dest: &mut ImageViewMut<'_>,
    ) -> Result<(), RenderError> {
        if self.chain.is_empty() {
            return Err(RenderError::EmptyChain);
        }
        ensure_same_geometry(source, dest)?;

        let (mode, width, height) = (dest.color_mode(), dest.width(), dest.height());
        if let Some(rect) = self.target_rect {
            if !Rect::from_size(width, height).contains_rect(&rect) {
                return Err(RenderError::RectOutOfBounds {
                    rect,
                    width,
                    height,
                });
            }
            dest.set_target_rect(rect);
        }

        let frame_len = geometry::image_size(mode.subtype(), width, height)? as usize;
        let last_producer = self.chain.iter().rposition(|s| s.produces_output());
        let mut scratch: [Vec<u8>; 2] = [Vec::new(), Vec::new()];
        let mut current = Current::Source;

        for (index, stage) in self.chain.iter().enumerate() {
            trace!(
                "Rendering stage {} '{}' from {:?}",
                index,
                stage.name(),
                current
            );

            if !stage.produces_output() {
                match current {
                    Current::Source => stage.render(source, None).await?,
                    Current::Scratch(k) => {
                        let view = ImageView::wrap(mode, &scratch[k], width, height)?;
                        stage.render(&view, None).await?;
                    }
                    Current::Target => {
                        let view = dest.as_view();
                        stage.render(&view, None).await?;
                    }
                }
                continue;
            }

            if Some(index) == last_producer {
                match current {
                    Current::Source => stage.render(source, Some(&mut *dest)).await?,
                    Current::Scratch(k) => {
                        let view = ImageView::wrap(mode, &scratch[k], width, height)?;
                        stage.render(&view, Some(&mut *dest)).await?;
                    }
                    Current::Target => {
                        return Err(RenderError::Internal(
                            "producing stage after the final producer",
                        ))
                    }
                }
                current = Current::Target;
                continue;
            }

            let next = if current == Current::Scratch(0) { 1 } else { 0 };
            let [a, b] = &mut scratch;
            let (input, output) = if next == 0 { (&*b, a) } else { (&*a, b) };
            output.resize(frame_len, 0);
            let mut out_view = ImageViewMut::wrap(mode, output.as_mut_slice(), width, height)?;

            match current {
                Current::Source => stage.render(source, Some(&mut out_view)).await?,
                Current::Scratch(_) => {
                    let view = ImageView::wrap(mode, input.as_slice(), width, height)?;
                    stage.render(&view, Some(&mut out_view)).await?;
                }
                Current::Target => {
                    return Err(RenderError::Internal(
                        "intermediate stage reading the destination",
                    ))
                }
            }
            current = Current::Scratch(next);
        }

        match current {
            Current::Target => {}
            Current::Source => dest.copy_from(source)?,
            Current::Scratch(k) => {
                let view = ImageView::wrap(mode, &scratch[k], width, height)?;
                dest.copy_from(&view)?;
            }
        }

        Ok(())
    }

    /// Render on the calling thread, blocking until the chain completes
    pub fn render_blocking(
        &self,
        source: &ImageView<'_>,
        dest: &mut ImageViewMut<'_>,
    ) -> Result<(), RenderError> {
        futures::executor::block_on(self.render(source, dest))
    }
}

/// Read-only locked frame memory
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer<'a> {
    /// Bytes starting at the top row
    pub data: &'a [u8],
    /// Byte distance between rows
    pub stride: i32,
}

/// Writable locked frame memory
#[derive(Debug)]
pub struct FrameBufferMut<'a> {
    /// Bytes starting at the top row
    pub data: &'a mut [u8],
    /// Byte distance between rows
    pub stride: i32,
}

/// Per-subtype conversion: `(dest_rect, dest, source, width, height, chain)`
pub type TransformFn = fn(
    &Rect,
    FrameBufferMut<'_>,
    FrameBuffer<'_>,
    u32,
    u32,
    &ProcessingChain,
) -> Result<(), RenderError>;

/// Run the chain over a YUY2 frame
pub fn transform_packed422(
    dest_rect: &Rect,
    dest: FrameBufferMut<'_>,
    source: FrameBuffer<'_>,
    width: u32,
    height: u32,
    chain: &ProcessingChain,
) -> Result<(), RenderError> {
    trace!(
        "YUY2 {}x{} render (src stride {}, dst stride {})",
        width,
        height,
        source.stride,
        dest.stride
    );

    let source_view = wrap_packed422(source.data, width, height)?;
    let mut dest_view = wrap_packed422_mut(dest.data, width, height)?;

    Renderer::new(chain)
        .with_target_rect(*dest_rect)
        .render_blocking(&source_view, &mut dest_view)
}

/// Run the chain over an NV12 frame
pub fn transform_semi_planar420(
    dest_rect: &Rect,
    dest: FrameBufferMut<'_>,
    source: FrameBuffer<'_>,
    width: u32,
    height: u32,
    chain: &ProcessingChain,
) -> Result<(), RenderError> {
    trace!(
        "NV12 {}x{} render (src stride {}, dst stride {})",
        width,
        height,
        source.stride,
        dest.stride
    );

    let source_view = wrap_semi_planar420(source.data, width, height)?;
    let mut dest_view = wrap_semi_planar420_mut(dest.data, width, height)?;

    Renderer::new(chain)
        .with_target_rect(*dest_rect)
        .render_blocking(&source_view, &mut dest_view)
}

/// Conversion function for a subtype, `None` for unsupported layouts
pub fn transform_fn_for(subtype: Subtype) -> Option<TransformFn> {
    match subtype {
        Subtype::Packed422 => Some(transform_packed422),
        Subtype::SemiPlanar420 => Some(transform_semi_planar420),
        Subtype::Other(_) => None,
    }
}
