//! Synthetic test images
//!
//! The vignetted images darken a flat field of value [`FLAT_VALUE`] by
//! `1 - STRENGTH * r^2`, where `r` is the distance from the image center
//! normalized by the half diagonal, rounded to the nearest integer.

use devignette_core::{Channels, PixelBuffer, Result};

/// Value of the undarkened flat field
pub const FLAT_VALUE: u8 = 200;

/// Quadratic falloff coefficient
pub const STRENGTH: f64 = 0.4;

/// Attenuation applied at pixel (x, y) of a `width` x `height` image
pub fn falloff(x: u32, y: u32, width: u32, height: u32) -> f64 {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let max_r2 = cx * cx + cy * cy;
    if max_r2 == 0.0 {
        return 1.0;
    }
    let dx = x as f64 - cx;
    let dy = y as f64 - cy;
    1.0 - STRENGTH * (dx * dx + dy * dy) / max_r2
}

/// Flat gray image with every pixel at `value`
pub fn flat_gray(width: u32, height: u32, value: u8) -> Result<PixelBuffer> {
    PixelBuffer::new_with_value(width, height, Channels::Gray, value)
}

/// Gray flat field darkened toward the corners
pub fn vignetted_gray(width: u32, height: u32) -> Result<PixelBuffer> {
    PixelBuffer::from_fn_gray(width, height, |x, y| {
        (FLAT_VALUE as f64 * falloff(x, y, width, height)).round() as u8
    })
}

/// RGB version of [`vignetted_gray`] with equal channels
pub fn vignetted_rgb(width: u32, height: u32) -> Result<PixelBuffer> {
    let gray = vignetted_gray(width, height)?;
    let data = gray.data().iter().flat_map(|&v| [v, v, v]).collect();
    PixelBuffer::from_data(width, height, Channels::Rgb, data)
}

/// RGB gradient with distinct channels, for codec tests
pub fn color_ramp(width: u32, height: u32) -> Result<PixelBuffer> {
    let mut buf = PixelBuffer::new(width, height, Channels::Rgb)?;
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = ((x + y) % 256) as u8;
            buf.set_pixel(x, y, &[r, g, b])?;
        }
    }
    Ok(buf)
}
