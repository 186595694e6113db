//! Image scaling operations
//!
//! Bilinear resampling with pixel-center alignment: destination pixel
//! `d` samples the source at `(d + 0.5) * src / dst - 0.5`, clamped to
//! the image. Used to downsample the estimation input and to blow the
//! low-resolution vignette estimates back up to display size.

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Precomputed source taps for one destination coordinate
#[derive(Debug, Clone, Copy)]
struct Tap {
    lo: u32,
    hi: u32,
    frac: f64,
}

fn taps(src: u32, dst: u32) -> Vec<Tap> {
    let scale = src as f64 / dst as f64;
    let last = src - 1;
    (0..dst)
        .map(|d| {
            let pos = ((d as f64 + 0.5) * scale - 0.5).max(0.0);
            let lo = (pos.floor() as u32).min(last);
            let hi = (lo + 1).min(last);
            let frac = if lo == last { 0.0 } else { pos - lo as f64 };
            Tap { lo, hi, frac }
        })
        .collect()
}

/// Resize an image to `width` x `height` using bilinear interpolation
///
/// # Arguments
/// * `buf` - Input image (gray or RGB)
/// * `width` - Target width
/// * `height` - Target height
///
/// # Errors
///
/// Returns `Error::InvalidDimension` if the target size is zero.
pub fn resize(buf: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    if buf.dimensions() == (width, height) {
        return Ok(buf.clone());
    }

    let xs = taps(buf.width(), width);
    let ys = taps(buf.height(), height);
    let nc = buf.channels().count();
    let mut out = PixelBuffer::new(width, height, buf.channels())?;

    for (y, ty) in ys.iter().enumerate() {
        for (x, tx) in xs.iter().enumerate() {
            let p00 = buf.pixel_unchecked(tx.lo, ty.lo);
            let p10 = buf.pixel_unchecked(tx.hi, ty.lo);
            let p01 = buf.pixel_unchecked(tx.lo, ty.hi);
            let p11 = buf.pixel_unchecked(tx.hi, ty.hi);
            let dst = out.pixel_unchecked_mut(x as u32, y as u32);
            for c in 0..nc {
                let top = p00[c] as f64 * (1.0 - tx.frac) + p10[c] as f64 * tx.frac;
                let bottom = p01[c] as f64 * (1.0 - tx.frac) + p11[c] as f64 * tx.frac;
                let v = top * (1.0 - ty.frac) + bottom * ty.frac;
                dst[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    #[test]
    fn test_resize_same_size_is_copy() {
        let buf = PixelBuffer::from_fn_gray(7, 5, |x, y| (x * 10 + y) as u8).unwrap();
        assert_eq!(resize(&buf, 7, 5).unwrap(), buf);
    }

    #[test]
    fn test_resize_constant_stays_constant() {
        let buf = PixelBuffer::new_with_value(101, 67, Channels::Rgb, 173).unwrap();
        let small = resize(&buf, 75, 50).unwrap();
        assert_eq!(small.dimensions(), (75, 50));
        assert!(small.data().iter().all(|&v| v == 173));
        let big = resize(&small, 512, 512).unwrap();
        assert!(big.data().iter().all(|&v| v == 173));
    }

    #[test]
    fn test_resize_preserves_horizontal_ramp_order() {
        let buf = PixelBuffer::from_fn_gray(100, 4, |x, _| (x * 2) as u8).unwrap();
        let small = resize(&buf, 50, 4).unwrap();
        let row = small.row(0);
        assert!(row.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_resize_zero_target() {
        let buf = PixelBuffer::new(4, 4, Channels::Gray).unwrap();
        assert!(resize(&buf, 0, 4).is_err());
    }
}
