//! Frame size, stride and rectangle arithmetic
//!
//! All byte counts are computed in `u32` with checked arithmetic; a frame
//! whose size does not fit is rejected with [`FormatError::Overflow`] before
//! any buffer is touched.
//!
//! | Subtype | Image size | Default stride |
//! |---------|------------|----------------|
//! | Packed422 | `w * h * 2` | `(w * 2 + 3) & !3` |
//! | SemiPlanar420 | `w * (h + h / 2)` | `w` |

use crate::error::FormatError;
use crate::format::{StreamFormat, Subtype};

/// Byte size of one whole frame
///
/// # Examples
///
/// ```rust
/// use framefx_format::{image_size, Subtype};
///
/// assert_eq!(image_size(Subtype::Packed422, 4, 2), Ok(16));
/// assert_eq!(image_size(Subtype::SemiPlanar420, 4, 2), Ok(12));
/// ```
pub fn image_size(subtype: Subtype, width: u32, height: u32) -> Result<u32, FormatError> {
    let overflow = FormatError::Overflow { width, height };
    match subtype {
        Subtype::Packed422 => width
            .checked_mul(2)
            .and_then(|row| row.checked_mul(height))
            .ok_or(overflow),
        Subtype::SemiPlanar420 => height
            .checked_add(height / 2)
            .and_then(|rows| rows.checked_mul(width))
            .ok_or(overflow),
        Subtype::Other(_) => Err(FormatError::UnsupportedSubtype(subtype)),
    }
}

/// Tight row length in bytes of the first plane
pub fn row_bytes(subtype: Subtype, width: u32) -> Result<u32, FormatError> {
    match subtype {
        Subtype::Packed422 => width
            .checked_mul(2)
            .ok_or(FormatError::Overflow { width, height: 1 }),
        Subtype::SemiPlanar420 => Ok(width),
        Subtype::Other(_) => Err(FormatError::UnsupportedSubtype(subtype)),
    }
}

/// Default stride for a format
///
/// Uses the stride carried by the format when present, otherwise derives it
/// from the subtype and frame width. Packed422 rows are padded to a 4-byte
/// boundary; SemiPlanar420 uses the luma row width.
pub fn default_stride(format: &StreamFormat) -> Result<i32, FormatError> {
    if let Some(stride) = format.default_stride {
        return Ok(stride);
    }

    let width = format.width().ok_or(FormatError::MissingFrameSize)?;
    let stride = match format.subtype {
        Subtype::Packed422 => width
            .checked_mul(2)
            .and_then(|row| row.checked_add(3))
            .map(|row| row & !3)
            .ok_or(FormatError::StrideOutOfRange(width))?,
        Subtype::SemiPlanar420 => width,
        Subtype::Other(_) => return Err(FormatError::UnsupportedSubtype(format.subtype)),
    };

    i32::try_from(stride).map_err(|_| FormatError::StrideOutOfRange(width))
}

/// Rectangle in pixel coordinates (right/bottom exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rect {
    /// Create a rectangle from edges
    #[must_use]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a whole frame
    #[must_use]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Rectangle width
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Rectangle height
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Whether the rectangle has no area
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether `other` lies entirely within this rectangle
    #[must_use]
    pub const fn contains_rect(&self, other: &Self) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
            && other.left <= other.right
            && other.top <= other.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FourCc;

    #[test]
    fn test_image_size_scenario() {
        assert_eq!(image_size(Subtype::Packed422, 4, 2), Ok(16));
        assert_eq!(image_size(Subtype::SemiPlanar420, 4, 2), Ok(12));
        assert_eq!(image_size(Subtype::SemiPlanar420, 4, 3), Ok(16)); // 3 + 1 rows
        assert_eq!(image_size(Subtype::Packed422, 1920, 1080), Ok(4_147_200));
        assert_eq!(image_size(Subtype::SemiPlanar420, 1920, 1080), Ok(3_110_400));
    }

    #[test]
    fn test_image_size_monotonic() {
        for subtype in crate::format::SUPPORTED_SUBTYPES {
            let mut previous = 0;
            for w in 1..16 {
                let size = image_size(subtype, w, 7).expect("small sizes fit");
                assert!(size >= previous);
                previous = size;
            }
            let mut previous = 0;
            for h in 1..16 {
                let size = image_size(subtype, 7, h).expect("small sizes fit");
                assert!(size >= previous);
                previous = size;
            }
        }
    }

    #[test]
    fn test_image_size_overflow() {
        assert_eq!(
            image_size(Subtype::Packed422, u32::MAX / 2 + 1, 1),
            Err(FormatError::Overflow {
                width: u32::MAX / 2 + 1,
                height: 1
            })
        );
        assert!(image_size(Subtype::Packed422, 65536, 32768).is_err());
        assert!(image_size(Subtype::Packed422, 65536, 32767).is_ok());
        assert!(image_size(Subtype::SemiPlanar420, 65536, 65536).is_err());
        assert!(image_size(Subtype::SemiPlanar420, 1, u32::MAX).is_err());
        assert!(image_size(Subtype::SemiPlanar420, u32::MAX, 1).is_ok());
    }

    #[test]
    fn test_image_size_unsupported() {
        let other = Subtype::Other(FourCc::new(*b"RGB3"));
        assert_eq!(
            image_size(other, 4, 4),
            Err(FormatError::UnsupportedSubtype(other))
        );
    }

    #[test]
    fn test_default_stride() {
        let yuy2 = StreamFormat::video(Subtype::Packed422, 4, 2);
        assert_eq!(default_stride(&yuy2), Ok(8));

        let odd = StreamFormat::video(Subtype::Packed422, 5, 2);
        assert_eq!(default_stride(&odd), Ok(12));

        let nv12 = StreamFormat::video(Subtype::SemiPlanar420, 4, 2);
        assert_eq!(default_stride(&nv12), Ok(4));

        let explicit = StreamFormat::video(Subtype::Packed422, 4, 2).with_default_stride(64);
        assert_eq!(default_stride(&explicit), Ok(64));

        let partial = StreamFormat::partial(Subtype::SemiPlanar420);
        assert_eq!(default_stride(&partial), Err(FormatError::MissingFrameSize));

        let huge = StreamFormat::video(Subtype::SemiPlanar420, u32::MAX, 2);
        assert_eq!(
            default_stride(&huge),
            Err(FormatError::StrideOutOfRange(u32::MAX))
        );
    }

    #[test]
    fn test_rect() {
        let frame = Rect::from_size(4, 2);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert!(frame.contains_rect(&Rect::new(1, 0, 3, 2)));
        assert!(!frame.contains_rect(&Rect::new(0, 0, 5, 2)));
        assert!(Rect::default().is_empty());
    }
}
