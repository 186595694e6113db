//! Color space conversion
//!
//! Provides the per-pixel transforms used by the estimators:
//! - RGB -> Grayscale (ITU-R BT.601)
//! - RGB -> Luma (Rec.709)
//! - RGB <-> LAB (CIE L*a*b*, sRGB primaries, D65 white)

/// D65 reference white
const WHITE_X: f64 = 0.950_47;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_83;

/// (6/29)^3
const LAB_EPSILON: f64 = 216.0 / 24389.0;
/// (29/3)^3
const LAB_KAPPA: f64 = 24389.0 / 27.0;

/// CIE L*a*b* color representation
///
/// - `l`: Lightness in range [0.0, 100.0]
/// - `a`: Green-Red component, typically [-128, 127]
/// - `b`: Blue-Yellow component, typically [-128, 127]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    /// Create a new LAB color
    pub fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }
}

/// Convert RGB to grayscale using ITU-R BT.601 coefficients
///
/// Formula: gray = 0.299*R + 0.587*G + 0.114*B, rounded
#[inline]
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    let v = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    v.round().clamp(0.0, 255.0) as u8
}

/// Rec.709 luma, unrounded
///
/// Formula: luma = 0.2126*R + 0.7152*G + 0.0722*B
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
}

#[inline]
fn srgb_to_linear(v: u8) -> f64 {
    let c = v as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(c: f64) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let v = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

#[inline]
fn lab_f_inv(f: f64) -> f64 {
    let t = f * f * f;
    if t > LAB_EPSILON {
        t
    } else {
        (116.0 * f - 16.0) / LAB_KAPPA
    }
}

/// Convert an sRGB pixel to CIE L*a*b*
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    let rl = srgb_to_linear(r);
    let gl = srgb_to_linear(g);
    let bl = srgb_to_linear(b);

    let x = 0.412_456_4 * rl + 0.357_576_1 * gl + 0.180_437_5 * bl;
    let y = 0.212_672_9 * rl + 0.715_152_2 * gl + 0.072_175_0 * bl;
    let z = 0.019_333_9 * rl + 0.119_192_0 * gl + 0.950_304_1 * bl;

    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y / WHITE_Y);
    let fz = lab_f(z / WHITE_Z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Convert CIE L*a*b* back to an sRGB pixel, clamping out-of-gamut values
pub fn lab_to_rgb(lab: Lab) -> (u8, u8, u8) {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let x = lab_f_inv(fx) * WHITE_X;
    let y = lab_f_inv(fy) * WHITE_Y;
    let z = lab_f_inv(fz) * WHITE_Z;

    let rl = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let gl = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
    let bl = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

    (linear_to_srgb(rl), linear_to_srgb(gl), linear_to_srgb(bl))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_conversion() {
        assert_eq!(rgb_to_gray(0, 0, 0), 0);
        assert_eq!(rgb_to_gray(255, 255, 255), 255);
        assert_eq!(rgb_to_gray(255, 0, 0), 76);
    }

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert!((luma(200, 200, 200) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_lab_white_and_black() {
        let white = rgb_to_lab(255, 255, 255);
        assert!((white.l - 100.0).abs() < 0.01);
        assert!(white.a.abs() < 0.01);
        assert!(white.b.abs() < 0.01);

        let black = rgb_to_lab(0, 0, 0);
        assert!(black.l.abs() < 1e-9);
    }

    #[test]
    fn test_lab_gray_roundtrip() {
        for v in 0..=255u8 {
            let (r, g, b) = lab_to_rgb(rgb_to_lab(v, v, v));
            assert!(
                (r as i32 - v as i32).abs() <= 1
                    && (g as i32 - v as i32).abs() <= 1
                    && (b as i32 - v as i32).abs() <= 1,
                "roundtrip failed for {v}: got ({r},{g},{b})"
            );
        }
    }

    #[test]
    fn test_lab_color_roundtrip() {
        let colors = [(255, 0, 0), (0, 255, 0), (0, 0, 255), (128, 64, 32)];
        for (r, g, b) in colors {
            let (rr, rg, rb) = lab_to_rgb(rgb_to_lab(r, g, b));
            assert!(
                (rr as i32 - r as i32).abs() <= 1
                    && (rg as i32 - g as i32).abs() <= 1
                    && (rb as i32 - b as i32).abs() <= 1,
                "roundtrip failed for ({r},{g},{b}): got ({rr},{rg},{rb})"
            );
        }
    }
}
