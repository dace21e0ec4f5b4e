//! BT.601 color helpers and per-sample plane access
//!
//! Stages operate directly on YUV samples. The helpers here classify each
//! byte of a YUY2 or NV12 view as luma or chroma so a stage can be written
//! once for both layouts.
//!
//! | Layout | Plane 0 | Plane 1 |
//! |--------|---------|---------|
//! | YUY2 | `Y0 U Y1 V` repeating | - |
//! | NV12 | `Y` | `U V` repeating |

use framefx_format::{ensure_same_geometry, ColorMode, FormatError, ImageView, ImageViewMut};

/// Component carried by one byte of a YUV frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    Y,
    U,
    V,
}

/// Component of the byte at `column` within a row of plane `plane`
///
/// Columns restart at every row, so odd widths keep the chroma order of
/// the first row.
#[inline]
pub fn sample_kind(mode: ColorMode, plane: usize, column: usize) -> Sample {
    match (mode, plane) {
        (ColorMode::Yuv422Y1Uy2V, _) => match column % 4 {
            1 => Sample::U,
            3 => Sample::V,
            _ => Sample::Y,
        },
        (ColorMode::Yuv420Sp, 0) => Sample::Y,
        (ColorMode::Yuv420Sp, _) => {
            if column % 2 == 0 {
                Sample::U
            } else {
                Sample::V
            }
        }
    }
}

/// Kinds and values of every byte of `plane`, row by row
fn plane_samples<'p>(
    mode: ColorMode,
    plane: usize,
    data: &'p [u8],
    row_bytes: usize,
) -> impl Iterator<Item = (Sample, u8)> + 'p {
    let row_bytes = row_bytes.max(1);
    data.iter()
        .enumerate()
        .map(move |(index, value)| (sample_kind(mode, plane, index % row_bytes), *value))
}

/// Write `f(kind, value)` for every byte of `source` into `dest`
pub fn map_samples<F>(
    source: &ImageView<'_>,
    dest: &mut ImageViewMut<'_>,
    f: F,
) -> Result<(), FormatError>
where
    F: Fn(Sample, u8) -> u8,
{
    ensure_same_geometry(source, dest)?;
    let mode = source.color_mode();

    for (plane, (dst, src)) in dest.planes_mut().iter_mut().zip(source.planes()).enumerate() {
        let samples = plane_samples(mode, plane, src.data(), src.row_bytes());
        for (d, (kind, value)) in dst.data_mut().iter_mut().zip(samples) {
            *d = f(kind, value);
        }
    }
    Ok(())
}

/// Per-component sums and counts over a whole image
fn component_totals(image: &ImageView<'_>) -> [(u64, u64); 3] {
    let mode = image.color_mode();
    let mut totals = [(0u64, 0u64); 3];
    for (plane, p) in image.planes().iter().enumerate() {
        for (kind, value) in plane_samples(mode, plane, p.data(), p.row_bytes()) {
            let slot = match kind {
                Sample::Y => 0,
                Sample::U => 1,
                Sample::V => 2,
            };
            totals[slot].0 += u64::from(value);
            totals[slot].1 += 1;
        }
    }
    totals
}

fn mean(total: (u64, u64)) -> Option<f64> {
    let (sum, count) = total;
    (count > 0).then(|| sum as f64 / count as f64)
}

/// Mean luma of an image, `None` for an image without luma samples
pub fn mean_luma(image: &ImageView<'_>) -> Option<f64> {
    mean(component_totals(image)[0])
}

/// Mean color of an image as RGB
///
/// Averages each YUV component separately, then converts the averages.
/// `None` when the image lacks luma or chroma samples.
pub fn mean_rgb(image: &ImageView<'_>) -> Option<(u8, u8, u8)> {
    let [y, u, v] = component_totals(image).map(mean);
    let to_byte = |value: f64| value.round().clamp(0.0, 255.0) as u8;
    Some(yuv_to_rgb(to_byte(y?), to_byte(u?), to_byte(v?)))
}

/// Convert a studio-range BT.601 YUV triple to RGB
///
/// Fixed point with 8 fractional bits:
/// R = 1.164(Y-16) + 1.596(V-128)
/// G = 1.164(Y-16) - 0.391(U-128) - 0.813(V-128)
/// B = 1.164(Y-16) + 2.018(U-128)
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let luma = 298 * (i32::from(y) - 16) + 128;
    let (cb, cr) = (i32::from(u) - 128, i32::from(v) - 128);

    let channel = |value: i32| (value >> 8).clamp(0, 255) as u8;
    (
        channel(luma + 409 * cr),
        channel(luma - 100 * cb - 208 * cr),
        channel(luma + 516 * cb),
    )
}

/// Convert an RGB color to studio-range BT.601 YUV
///
/// Y = 16 + (66R + 129G + 25B) / 256
/// U = 128 + (-38R - 74G + 112B) / 256
/// V = 128 + (112R - 94G - 18B) / 256
#[inline]
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));

    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;

    (
        y.clamp(0, 255) as u8,
        u.clamp(0, 255) as u8,
        v.clamp(0, 255) as u8,
    )
}

#[cfg(test)]
mod tests {
    use framefx_format::{
        wrap_packed422, wrap_packed422_mut, wrap_semi_planar420, wrap_semi_planar420_mut,
    };

    use super::*;

    #[test]
    fn test_yuv_to_rgb() {
        // Black (Y=16, U=128, V=128)
        assert_eq!(yuv_to_rgb(16, 128, 128), (0, 0, 0));

        // White (Y=235, U=128, V=128)
        let (r, g, b) = yuv_to_rgb(235, 128, 128);
        assert!(r > 250 && g > 250 && b > 250);
    }

    #[test]
    fn test_rgb_to_yuv() {
        assert_eq!(rgb_to_yuv(0, 0, 0), (16, 128, 128));
        assert_eq!(rgb_to_yuv(255, 255, 255), (235, 128, 128));

        // Pure red pushes V up and U down
        let (_, u, v) = rgb_to_yuv(255, 0, 0);
        assert!(v > 200);
        assert!(u < 128);
    }

    #[test]
    fn test_rgb_roundtrip_is_close() {
        for (r, g, b) in [(200, 100, 50), (10, 220, 130), (128, 128, 128)] {
            let (y, u, v) = rgb_to_yuv(r, g, b);
            let (r2, g2, b2) = yuv_to_rgb(y, u, v);
            assert!((i32::from(r) - i32::from(r2)).abs() <= 3);
            assert!((i32::from(g) - i32::from(g2)).abs() <= 3);
            assert!((i32::from(b) - i32::from(b2)).abs() <= 3);
        }
    }

    #[test]
    fn test_sample_kind_packed422() {
        let kinds: Vec<_> = (0..8)
            .map(|i| sample_kind(ColorMode::Yuv422Y1Uy2V, 0, i))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Sample::Y,
                Sample::U,
                Sample::Y,
                Sample::V,
                Sample::Y,
                Sample::U,
                Sample::Y,
                Sample::V
            ]
        );
    }

    #[test]
    fn test_sample_kind_semi_planar() {
        assert_eq!(sample_kind(ColorMode::Yuv420Sp, 0, 1), Sample::Y);
        assert_eq!(sample_kind(ColorMode::Yuv420Sp, 1, 0), Sample::U);
        assert_eq!(sample_kind(ColorMode::Yuv420Sp, 1, 1), Sample::V);
    }

    #[test]
    fn test_map_samples() {
        let source = vec![50u8; 12];
        let mut dest = vec![0u8; 12];
        let src = wrap_semi_planar420(&source, 4, 2).expect("fits");
        let mut dst = wrap_semi_planar420_mut(&mut dest, 4, 2).expect("fits");

        map_samples(&src, &mut dst, |kind, value| match kind {
            Sample::Y => value + 1,
            Sample::U => 1,
            Sample::V => 2,
        })
        .expect("same geometry");
        drop(dst);

        assert_eq!(&dest[..8], &[51; 8]);
        assert_eq!(&dest[8..], &[1, 2, 1, 2]);
    }

    #[test]
    fn test_map_samples_odd_width_packed() {
        // 3x2 YUY2: rows are 6 bytes, each starting with Y U
        let source = vec![0u8; 12];
        let mut dest = vec![0u8; 12];
        let src = wrap_packed422(&source, 3, 2).expect("fits");
        let mut dst = wrap_packed422_mut(&mut dest, 3, 2).expect("fits");

        map_samples(&src, &mut dst, |kind, _| match kind {
            Sample::Y => 0,
            Sample::U => 1,
            Sample::V => 2,
        })
        .expect("same geometry");
        drop(dst);

        assert_eq!(&dest[..6], &[0, 1, 0, 2, 0, 1]);
        assert_eq!(&dest[6..], &[0, 1, 0, 2, 0, 1]);
    }

    #[test]
    fn test_map_samples_odd_width_semi_planar() {
        // 3x2 NV12: one chroma row of 3 bytes after 6 luma bytes
        let source = vec![0u8; 9];
        let mut dest = vec![0u8; 9];
        let src = wrap_semi_planar420(&source, 3, 2).expect("fits");
        let mut dst = wrap_semi_planar420_mut(&mut dest, 3, 2).expect("fits");

        map_samples(&src, &mut dst, |kind, _| match kind {
            Sample::Y => 0,
            Sample::U => 1,
            Sample::V => 2,
        })
        .expect("same geometry");
        drop(dst);

        assert_eq!(&dest[..6], &[0; 6]);
        assert_eq!(&dest[6..], &[1, 2, 1]);
    }

    #[test]
    fn test_mean_rgb() {
        // Studio white and black average to mid gray
        let frame = vec![235, 128, 16, 128, 235, 128, 16, 128];
        let view = wrap_packed422(&frame, 2, 2).expect("fits");
        let (r, g, b) = mean_rgb(&view).expect("has luma and chroma");
        assert_eq!((r, g), (g, b));
        assert!((127..=129).contains(&r));
    }

    #[test]
    fn test_mean_luma() {
        // Luma 10 and 30, chroma ignored
        let frame = vec![10, 200, 30, 200, 10, 200, 30, 200];
        let view = wrap_packed422(&frame, 2, 2).expect("fits");
        assert_eq!(mean_luma(&view), Some(20.0));
    }
}
