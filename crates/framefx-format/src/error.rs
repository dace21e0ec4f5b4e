//! Error types for format, plane and render operations

use thiserror::Error;

use crate::format::Subtype;
use crate::geometry::Rect;

/// Result type for format operations
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors produced while describing or wrapping a frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The subtype is not one of the supported packed layouts
    #[error("Unsupported subtype {0}")]
    UnsupportedSubtype(Subtype),

    /// The format does not carry a frame size
    #[error("Stream format has no frame size")]
    MissingFrameSize,

    /// Width or height is zero
    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The byte size of the frame does not fit in 32 bits
    #[error("Frame size {width}x{height} overflows the image size")]
    Overflow { width: u32, height: u32 },

    /// A computed stride does not fit a signed 32-bit stride
    #[error("Stride for width {0} is out of range")]
    StrideOutOfRange(u32),

    /// The buffer is shorter than the planes it must hold
    #[error("Buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Two images that must share geometry do not
    #[error("Image geometry mismatch: {0}")]
    GeometryMismatch(String),
}

/// Errors returned by processing stages
///
/// External stages report failures through this type; the renderer
/// propagates it unchanged inside [`RenderError::Stage`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The stage cannot handle the image color mode
    #[error("Stage '{stage}' does not support {mode}")]
    UnsupportedColorMode { stage: String, mode: String },

    /// The stage failed while rendering
    #[error("Stage '{stage}' failed: {reason}")]
    Failed { stage: String, reason: String },

    /// The asynchronous operation behind the stage was dropped
    #[error("Stage '{0}' was cancelled before completion")]
    Cancelled(String),

    /// Plane access failed inside the stage
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl StageError {
    /// Create a failure error for a named stage
    pub fn failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced while rendering a processing chain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The chain has no stages to render
    #[error("Processing chain is empty")]
    EmptyChain,

    /// The destination rectangle lies outside the destination image
    #[error("Destination rectangle {rect:?} exceeds {width}x{height} image")]
    RectOutOfBounds { rect: Rect, width: u32, height: u32 },

    /// Wrapping or copying an image failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A stage reported a failure
    #[error(transparent)]
    Stage(#[from] StageError),

    /// The renderer reached a state its stage ordering rules out
    #[error("Renderer invariant violated: {0}")]
    Internal(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FormatError::Overflow {
            width: 70000,
            height: 70000,
        };
        assert_eq!(err.to_string(), "Frame size 70000x70000 overflows the image size");

        let err = StageError::failed("blur", "kernel too large");
        assert_eq!(err.to_string(), "Stage 'blur' failed: kernel too large");
    }

    #[test]
    fn test_render_error_wraps_stage() {
        let err: RenderError = StageError::Cancelled("probe".into()).into();
        assert!(matches!(err, RenderError::Stage(StageError::Cancelled(_))));
        assert_eq!(err.to_string(), "Stage 'probe' was cancelled before completion");
    }
}
