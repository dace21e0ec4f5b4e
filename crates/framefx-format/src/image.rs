//! Borrowed plane views over raw frame memory
//!
//! [`ImageView`] and [`ImageViewMut`] bind a locked buffer to a plane layout
//! without copying. Their lifetime is the lifetime of the borrow they were
//! built from, so a view can never outlive the buffer lock that exposed the
//! bytes.
//!
//! | Color mode | Planes | Row length |
//! |------------|--------|------------|
//! | `Yuv422Y1Uy2V` | 1: `w * h * 2` bytes | `2 * w` |
//! | `Yuv420Sp` | 0: `w * h` luma, 1: `w * (h / 2)` interleaved UV | `w`, `w` |
//!
//! # Examples
//!
//! ```rust
//! use framefx_format::{wrap_semi_planar420, ColorMode};
//!
//! let frame = vec![0u8; 12]; // 4x2 NV12
//! let view = wrap_semi_planar420(&frame, 4, 2)?;
//!
//! assert_eq!(view.color_mode(), ColorMode::Yuv420Sp);
//! assert_eq!(view.planes().len(), 2);
//! assert_eq!(view.planes()[1].data().len(), 4);
//! # Ok::<(), framefx_format::FormatError>(())
//! ```

use std::fmt;

use crate::error::FormatError;
use crate::format::Subtype;
use crate::geometry::{self, Rect};

/// Pixel layout declared by an image descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Interleaved luma/chroma, Y1 U Y2 V, two pixels per macropixel
    Yuv422Y1Uy2V,
    /// Luma plane plus interleaved UV plane at half resolution
    Yuv420Sp,
}

impl ColorMode {
    /// Color mode used to describe a subtype
    #[must_use]
    pub const fn for_subtype(subtype: Subtype) -> Option<Self> {
        match subtype {
            Subtype::Packed422 => Some(Self::Yuv422Y1Uy2V),
            Subtype::SemiPlanar420 => Some(Self::Yuv420Sp),
            Subtype::Other(_) => None,
        }
    }

    /// Subtype this color mode describes
    #[must_use]
    pub const fn subtype(self) -> Subtype {
        match self {
            Self::Yuv422Y1Uy2V => Subtype::Packed422,
            Self::Yuv420Sp => Subtype::SemiPlanar420,
        }
    }

    /// Number of planes in the descriptor
    #[must_use]
    pub const fn plane_count(self) -> usize {
        match self {
            Self::Yuv422Y1Uy2V => 1,
            Self::Yuv420Sp => 2,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yuv422Y1Uy2V => write!(f, "YUV 4:2:2 (Y1UY2V)"),
            Self::Yuv420Sp => write!(f, "YUV 4:2:0 semi-planar"),
        }
    }
}

/// Byte extent and row length of one plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Plane length in bytes
    pub len: usize,
    /// Row length in bytes
    pub row_bytes: usize,
}

/// Plane layout for a frame, in memory order
pub fn plane_layout(
    mode: ColorMode,
    width: u32,
    height: u32,
) -> Result<Vec<PlaneLayout>, FormatError> {
    let total = geometry::image_size(mode.subtype(), width, height)? as usize;
    let layout = match mode {
        ColorMode::Yuv422Y1Uy2V => vec![PlaneLayout {
            len: total,
            row_bytes: geometry::row_bytes(Subtype::Packed422, width)? as usize,
        }],
        ColorMode::Yuv420Sp => {
            // Cannot overflow: both planes together make up `total`.
            let luma = width as usize * height as usize;
            vec![
                PlaneLayout {
                    len: luma,
                    row_bytes: width as usize,
                },
                PlaneLayout {
                    len: total - luma,
                    row_bytes: width as usize,
                },
            ]
        }
    };
    Ok(layout)
}

/// Read-only view of one plane
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    data: &'a [u8],
    row_bytes: usize,
}

impl<'a> Plane<'a> {
    /// Plane bytes
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Row length in bytes
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Number of rows in the plane
    pub fn rows(&self) -> usize {
        if self.row_bytes == 0 {
            0
        } else {
            self.data.len() / self.row_bytes
        }
    }

    /// Bytes of one row
    pub fn row(&self, index: usize) -> Option<&'a [u8]> {
        let start = index.checked_mul(self.row_bytes)?;
        self.data.get(start..start.checked_add(self.row_bytes)?)
    }
}

/// Writable view of one plane
#[derive(Debug)]
pub struct PlaneMut<'a> {
    data: &'a mut [u8],
    row_bytes: usize,
}

impl PlaneMut<'_> {
    /// Plane bytes
    pub fn data(&self) -> &[u8] {
        self.data
    }

    /// Mutable plane bytes
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Row length in bytes
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Reborrow as a read-only plane
    pub fn as_plane(&self) -> Plane<'_> {
        Plane {
            data: self.data,
            row_bytes: self.row_bytes,
        }
    }
}

/// Read-only multi-plane image descriptor
#[derive(Debug, Clone)]
pub struct ImageView<'a> {
    width: u32,
    height: u32,
    color_mode: ColorMode,
    planes: Vec<Plane<'a>>,
}

impl<'a> ImageView<'a> {
    /// Wrap `data` as an image of the given color mode
    ///
    /// Fails if `data` is shorter than the frame; trailing bytes are not
    /// part of the view.
    pub fn wrap(
        mode: ColorMode,
        data: &'a [u8],
        width: u32,
        height: u32,
    ) -> Result<Self, FormatError> {
        let layout = plane_layout(mode, width, height)?;
        check_len(&layout, data.len())?;

        let mut rest = data;
        let planes = layout
            .iter()
            .map(|plane| {
                let (head, tail) = rest.split_at(plane.len);
                rest = tail;
                Plane {
                    data: head,
                    row_bytes: plane.row_bytes,
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            color_mode: mode,
            planes,
        })
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Declared pixel layout
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Planes in memory order
    pub fn planes(&self) -> &[Plane<'a>] {
        &self.planes
    }
}

/// Writable multi-plane image descriptor
#[derive(Debug)]
pub struct ImageViewMut<'a> {
    width: u32,
    height: u32,
    color_mode: ColorMode,
    planes: Vec<PlaneMut<'a>>,
    target_rect: Rect,
}

impl<'a> ImageViewMut<'a> {
    /// Wrap `data` as a writable image of the given color mode
    pub fn wrap(
        mode: ColorMode,
        data: &'a mut [u8],
        width: u32,
        height: u32,
    ) -> Result<Self, FormatError> {
        let layout = plane_layout(mode, width, height)?;
        check_len(&layout, data.len())?;

        let mut rest = data;
        let planes = layout
            .iter()
            .map(|plane| {
                let (head, tail) = std::mem::take(&mut rest).split_at_mut(plane.len);
                rest = tail;
                PlaneMut {
                    data: head,
                    row_bytes: plane.row_bytes,
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            color_mode: mode,
            planes,
            target_rect: Rect::from_size(width, height),
        })
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Declared pixel layout
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Region of the frame the render is asked to fill
    pub fn target_rect(&self) -> Rect {
        self.target_rect
    }

    pub(crate) fn set_target_rect(&mut self, rect: Rect) {
        self.target_rect = rect;
    }

    /// Planes in memory order
    pub fn planes(&self) -> &[PlaneMut<'a>] {
        &self.planes
    }

    /// Mutable planes in memory order
    pub fn planes_mut(&mut self) -> &mut [PlaneMut<'a>] {
        &mut self.planes
    }

    /// Reborrow as a read-only view
    pub fn as_view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            color_mode: self.color_mode,
            planes: self.planes.iter().map(PlaneMut::as_plane).collect(),
        }
    }

    /// Copy every plane of `source` into this image
    pub fn copy_from(&mut self, source: &ImageView<'_>) -> Result<(), FormatError> {
        ensure_same_geometry(source, self)?;
        for (dst, src) in self.planes.iter_mut().zip(source.planes()) {
            dst.data.copy_from_slice(src.data);
        }
        Ok(())
    }
}

/// Fail unless both images describe the same frame geometry
pub fn ensure_same_geometry(
    source: &ImageView<'_>,
    dest: &ImageViewMut<'_>,
) -> Result<(), FormatError> {
    if source.width != dest.width
        || source.height != dest.height
        || source.color_mode != dest.color_mode
    {
        return Err(FormatError::GeometryMismatch(format!(
            "{} {}x{} vs {} {}x{}",
            source.color_mode,
            source.width,
            source.height,
            dest.color_mode,
            dest.width,
            dest.height
        )));
    }
    Ok(())
}

fn check_len(layout: &[PlaneLayout], actual: usize) -> Result<(), FormatError> {
    let needed = layout.iter().map(|p| p.len).sum();
    if actual < needed {
        return Err(FormatError::BufferTooSmall { needed, actual });
    }
    Ok(())
}

/// Wrap a YUY2 frame as a single-plane descriptor
pub fn wrap_packed422(data: &[u8], width: u32, height: u32) -> Result<ImageView<'_>, FormatError> {
    ImageView::wrap(ColorMode::Yuv422Y1Uy2V, data, width, height)
}

/// Wrap an NV12 frame as a two-plane descriptor
pub fn wrap_semi_planar420(
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<ImageView<'_>, FormatError> {
    ImageView::wrap(ColorMode::Yuv420Sp, data, width, height)
}

/// Wrap a writable YUY2 frame as a single-plane descriptor
pub fn wrap_packed422_mut(
    data: &mut [u8],
    width: u32,
    height: u32,
) -> Result<ImageViewMut<'_>, FormatError> {
    ImageViewMut::wrap(ColorMode::Yuv422Y1Uy2V, data, width, height)
}

/// Wrap a writable NV12 frame as a two-plane descriptor
pub fn wrap_semi_planar420_mut(
    data: &mut [u8],
    width: u32,
    height: u32,
) -> Result<ImageViewMut<'_>, FormatError> {
    ImageViewMut::wrap(ColorMode::Yuv420Sp, data, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed422_single_plane() {
        let frame: Vec<u8> = (0..16).collect();
        let view = wrap_packed422(&frame, 4, 2).expect("4x2 YUY2 fits");

        assert_eq!(view.planes().len(), 1);
        let plane = view.planes()[0];
        assert_eq!(plane.row_bytes(), 8);
        assert_eq!(plane.rows(), 2);
        assert_eq!(plane.row(1), Some(&frame[8..16]));
        assert_eq!(plane.row(2), None);
    }

    #[test]
    fn test_semi_planar420_two_planes() {
        let frame: Vec<u8> = (0..12).collect();
        let view = wrap_semi_planar420(&frame, 4, 2).expect("4x2 NV12 fits");

        let planes = view.planes();
        assert_eq!(planes.len(), 2);
        assert_eq!(planes[0].data(), &frame[..8]);
        assert_eq!(planes[0].row_bytes(), 4);
        assert_eq!(planes[1].data(), &frame[8..12]);
        assert_eq!(planes[1].row_bytes(), 4);
        assert_eq!(planes[1].rows(), 1);
    }

    #[test]
    fn test_chroma_plane_for_odd_height() {
        // 4x3 NV12: 12 luma bytes, one chroma row of 4 bytes
        let frame = vec![0u8; 16];
        let view = wrap_semi_planar420(&frame, 4, 3).expect("4x3 NV12 fits");
        assert_eq!(view.planes()[0].data().len(), 12);
        assert_eq!(view.planes()[1].data().len(), 4);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let frame = vec![7u8; 64];
        let view = wrap_packed422(&frame, 4, 2).expect("larger buffer is fine");
        assert_eq!(view.planes()[0].data().len(), 16);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let frame = vec![0u8; 11];
        assert_eq!(
            wrap_semi_planar420(&frame, 4, 2).map(|_| ()),
            Err(FormatError::BufferTooSmall {
                needed: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_mut_view_writes_through() {
        let mut frame = vec![0u8; 12];
        {
            let mut view = wrap_semi_planar420_mut(&mut frame, 4, 2).expect("fits");
            view.planes_mut()[1].data_mut().fill(128);
            assert_eq!(view.target_rect(), Rect::from_size(4, 2));
        }
        assert_eq!(&frame[..8], &[0; 8]);
        assert_eq!(&frame[8..], &[128; 4]);
    }

    #[test]
    fn test_copy_from() {
        let source: Vec<u8> = (0..16).collect();
        let mut dest = vec![0u8; 16];

        let src_view = wrap_packed422(&source, 4, 2).expect("fits");
        let mut dst_view = wrap_packed422_mut(&mut dest, 4, 2).expect("fits");
        dst_view.copy_from(&src_view).expect("same geometry");
        drop(dst_view);

        assert_eq!(dest, source);
    }

    #[test]
    fn test_copy_from_geometry_mismatch() {
        let source = vec![0u8; 16];
        let mut dest = vec![0u8; 16];

        let src_view = wrap_packed422(&source, 4, 2).expect("fits");
        let mut dst_view = wrap_semi_planar420_mut(&mut dest, 4, 2).expect("fits");
        assert!(matches!(
            dst_view.copy_from(&src_view),
            Err(FormatError::GeometryMismatch(_))
        ));
    }
}
