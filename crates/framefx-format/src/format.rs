//! Stream format description
//!
//! A [`StreamFormat`] is what the host and the transform agree on during
//! negotiation: the major type, the packed-pixel subtype and, once the host
//! completes it, frame size, default stride and interlace mode.
//!
//! # Examples
//!
//! ```rust
//! use framefx_format::{InterlaceMode, StreamFormat, Subtype};
//!
//! let format = StreamFormat::video(Subtype::Packed422, 640, 480)
//!     .with_interlace(InterlaceMode::Progressive);
//!
//! assert_eq!(format.frame_size, Some((640, 480)));
//! assert_eq!(format.subtype.fourcc().to_string(), "YUY2");
//! ```

use std::fmt;

use crate::error::FormatError;
use crate::geometry;

/// Four-character code identifying a pixel layout or media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// Construct from raw bytes
    #[must_use]
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Little-endian u32 encoding
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Try to view the code as a printable string
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl From<u32> for FourCc {
    fn from(value: u32) -> Self {
        Self(value.to_le_bytes())
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "0x{:08x}", self.to_u32()),
        }
    }
}

/// Major media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorType {
    Video,
    Audio,
    Other(FourCc),
}

/// Packed-pixel memory layout of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtype {
    /// Interleaved 4:2:2, Y0 U Y1 V macropixels, 2 bytes per pixel (YUY2)
    Packed422,
    /// Full-resolution luma plane followed by interleaved UV at half
    /// resolution, 12 bits per pixel (NV12)
    SemiPlanar420,
    /// Any other layout; never accepted by negotiation
    Other(FourCc),
}

/// Supported subtypes in order of preference
pub const SUPPORTED_SUBTYPES: [Subtype; 2] = [Subtype::Packed422, Subtype::SemiPlanar420];

impl Subtype {
    /// FourCC for this subtype
    #[must_use]
    pub const fn fourcc(self) -> FourCc {
        match self {
            Self::Packed422 => FourCc::new(*b"YUY2"),
            Self::SemiPlanar420 => FourCc::new(*b"NV12"),
            Self::Other(code) => code,
        }
    }

    /// Map a FourCC onto a subtype
    #[must_use]
    pub fn from_fourcc(code: FourCc) -> Self {
        match &code.0 {
            b"YUY2" => Self::Packed422,
            b"NV12" => Self::SemiPlanar420,
            _ => Self::Other(code),
        }
    }

    /// Whether negotiation accepts this subtype
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Packed422 | Self::SemiPlanar420)
    }

    /// Nominal bits per pixel
    #[must_use]
    pub const fn bits_per_pixel(self) -> Option<u32> {
        match self {
            Self::Packed422 => Some(16),
            Self::SemiPlanar420 => Some(12),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fourcc())
    }
}

/// Field layout of the frames in a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterlaceMode {
    Progressive,
    FieldInterleavedUpperFirst,
    FieldInterleavedLowerFirst,
    /// One field per sample, upper field only
    FieldSingleUpper,
    /// One field per sample, lower field only
    FieldSingleLower,
    MixedInterlaceOrProgressive,
}

impl InterlaceMode {
    /// Whether each sample carries a single field
    #[must_use]
    pub const fn is_single_field(self) -> bool {
        matches!(self, Self::FieldSingleUpper | Self::FieldSingleLower)
    }
}

/// Negotiated description of a video stream
///
/// Equality is field-for-field: two formats match only if every attribute,
/// including the optional ones, is identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFormat {
    /// Major type (must be video to negotiate)
    pub major_type: MajorType,

    /// Packed-pixel layout
    pub subtype: Subtype,

    /// Frame size in pixels as (width, height)
    pub frame_size: Option<(u32, u32)>,

    /// Default stride in bytes when the host supplies one
    pub default_stride: Option<i32>,

    /// Interlace mode when the host supplies one
    pub interlace: Option<InterlaceMode>,
}

impl StreamFormat {
    /// Partial video format carrying only the subtype
    ///
    /// This is what type enumeration offers before the host fills in the
    /// frame attributes.
    #[must_use]
    pub const fn partial(subtype: Subtype) -> Self {
        Self {
            major_type: MajorType::Video,
            subtype,
            frame_size: None,
            default_stride: None,
            interlace: None,
        }
    }

    /// Video format with a frame size
    #[must_use]
    pub const fn video(subtype: Subtype, width: u32, height: u32) -> Self {
        Self {
            major_type: MajorType::Video,
            subtype,
            frame_size: Some((width, height)),
            default_stride: None,
            interlace: None,
        }
    }

    /// Set the major type
    #[must_use]
    pub fn with_major_type(mut self, major_type: MajorType) -> Self {
        self.major_type = major_type;
        self
    }

    /// Set the frame size
    #[must_use]
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = Some((width, height));
        self
    }

    /// Set an explicit default stride
    #[must_use]
    pub fn with_default_stride(mut self, stride: i32) -> Self {
        self.default_stride = Some(stride);
        self
    }

    /// Set the interlace mode
    #[must_use]
    pub fn with_interlace(mut self, interlace: InterlaceMode) -> Self {
        self.interlace = Some(interlace);
        self
    }

    /// Frame width, if known
    pub fn width(&self) -> Option<u32> {
        self.frame_size.map(|(w, _)| w)
    }

    /// Frame height, if known
    pub fn height(&self) -> Option<u32> {
        self.frame_size.map(|(_, h)| h)
    }

    /// Frame size, failing when absent or degenerate
    pub fn dimensions(&self) -> Result<(u32, u32), FormatError> {
        let (width, height) = self.frame_size.ok_or(FormatError::MissingFrameSize)?;
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidDimensions { width, height });
        }
        Ok((width, height))
    }

    /// Byte size of one whole frame in this format
    pub fn image_size(&self) -> Result<u32, FormatError> {
        let (width, height) = self.dimensions()?;
        geometry::image_size(self.subtype, width, height)
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame_size {
            Some((w, h)) => write!(f, "{} {}x{}", self.subtype, w, h),
            None => write!(f, "{} (partial)", self.subtype),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_roundtrip() {
        let code = FourCc::new(*b"NV12");
        assert_eq!(code.to_string(), "NV12");
        assert_eq!(FourCc::from(code.to_u32()), code);
        assert_eq!(FourCc::new([0xff, 0, 0, 0]).to_string(), "0x000000ff");
    }

    #[test]
    fn test_subtype_from_fourcc() {
        assert_eq!(Subtype::from_fourcc(FourCc::new(*b"YUY2")), Subtype::Packed422);
        assert_eq!(Subtype::from_fourcc(FourCc::new(*b"NV12")), Subtype::SemiPlanar420);

        let uyvy = Subtype::from_fourcc(FourCc::new(*b"UYVY"));
        assert!(!uyvy.is_supported());
        assert_eq!(uyvy.bits_per_pixel(), None);
    }

    #[test]
    fn test_supported_order() {
        assert_eq!(SUPPORTED_SUBTYPES[0], Subtype::Packed422);
        assert_eq!(SUPPORTED_SUBTYPES[1], Subtype::SemiPlanar420);
        assert!(SUPPORTED_SUBTYPES.iter().all(|s| s.is_supported()));
    }

    #[test]
    fn test_single_field_detection() {
        assert!(InterlaceMode::FieldSingleUpper.is_single_field());
        assert!(InterlaceMode::FieldSingleLower.is_single_field());
        assert!(!InterlaceMode::Progressive.is_single_field());
        assert!(!InterlaceMode::FieldInterleavedUpperFirst.is_single_field());
    }

    #[test]
    fn test_format_equality_is_field_for_field() {
        let a = StreamFormat::video(Subtype::Packed422, 4, 2);
        let b = a.clone().with_interlace(InterlaceMode::Progressive);
        assert_ne!(a, b);
        assert_eq!(b, a.with_interlace(InterlaceMode::Progressive));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(
            StreamFormat::partial(Subtype::Packed422).dimensions(),
            Err(FormatError::MissingFrameSize)
        );
        assert_eq!(
            StreamFormat::video(Subtype::Packed422, 0, 2).dimensions(),
            Err(FormatError::InvalidDimensions { width: 0, height: 2 })
        );
        assert_eq!(
            StreamFormat::video(Subtype::SemiPlanar420, 4, 2).image_size(),
            Ok(12)
        );
    }
}
