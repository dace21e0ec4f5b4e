//! Error types for transform operations
//!
//! Every host-facing operation returns `Result<T, TransformError>`. Two
//! outcomes that hosts treat as normal are not errors here: type
//! enumeration past the end returns `Ok(None)` and output production with
//! no pending sample returns [`OutputStatus::NeedMoreInput`].
//!
//! [`OutputStatus::NeedMoreInput`]: crate::stream::OutputStatus::NeedMoreInput
//!
//! # Examples
//!
//! ```rust
//! use framefx_transform::{classify_error, EffectTransform, ErrorType, TransformError};
//!
//! let transform = EffectTransform::with_default()?;
//!
//! match transform.input_current_type(0) {
//!     Ok(format) => println!("Input: {format}"),
//!     Err(TransformError::TypeNotSet) => println!("Input type not negotiated yet"),
//!     Err(e) => match classify_error(&e) {
//!         ErrorType::Parameter => eprintln!("Bad call: {e}"),
//!         _ => eprintln!("Error: {e}"),
//!     },
//! }
//! # Ok::<(), TransformError>(())
//! ```

use thiserror::Error;

use framefx_format::{FormatError, RenderError};

/// Errors returned by the transform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A required argument is missing or malformed, or a reserved flag
    /// word is nonzero
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Only stream 0 exists on either side
    #[error("Invalid stream number {0}")]
    InvalidStreamNumber(u32),

    /// The candidate type is unsupported or conflicts with the other side
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    /// The requested type has not been negotiated
    #[error("Media type not set")]
    TypeNotSet,

    /// A sample is already held; call `process_output` or flush first
    #[error("Transform is not accepting input")]
    NotAccepting,

    /// A type change was attempted while a sample is held
    #[error("Cannot change media type while processing")]
    CannotChangeTypeWhileProcessing,

    /// Frame geometry could not be computed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The processing chain failed to render
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A sample or buffer operation failed
    #[error("Buffer error: {0}")]
    Buffer(String),

    /// Configuration or properties are invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The operation is not supported by this transform
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// An internal invariant was violated
    #[error("Unexpected internal state: {0}")]
    Unexpected(String),
}

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_media_type(msg: impl Into<String>) -> Self {
        Self::InvalidMediaType(msg.into())
    }

    /// Create a buffer error
    pub fn buffer(msg: impl Into<String>) -> Self {
        Self::Buffer(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }
}

/// Broad category of a [`TransformError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed call; fix the caller
    Parameter,
    /// Call made in the wrong protocol state; retry after the state changes
    ProtocolState,
    /// Configuration or properties rejected
    Configuration,
    /// Frame processing failed
    Processing,
    /// The transform does not offer this operation; do not retry
    Unsupported,
    /// An internal invariant was violated
    Internal,
}

/// Classify an error for recovery decisions
pub fn classify_error(error: &TransformError) -> ErrorType {
    match error {
        TransformError::InvalidArgument(_) | TransformError::Format(FormatError::Overflow { .. }) => {
            ErrorType::Parameter
        }
        TransformError::InvalidStreamNumber(_)
        | TransformError::InvalidMediaType(_)
        | TransformError::TypeNotSet
        | TransformError::NotAccepting
        | TransformError::CannotChangeTypeWhileProcessing => ErrorType::ProtocolState,
        TransformError::Config(_) => ErrorType::Configuration,
        TransformError::Format(_) | TransformError::Render(_) | TransformError::Buffer(_) => {
            ErrorType::Processing
        }
        TransformError::NotImplemented(_) => ErrorType::Unsupported,
        TransformError::Unexpected(_) => ErrorType::Internal,
    }
}
