//! Polynomial gain model
//!
//! Gain `g(r) = 1 + a r^2 + b r^4 + c r^6` about an optical center shifted
//! from the image center by `(dx, dy)`. The radius is normalized so that
//! the image origin corner sits at `r = 1`.
//!
//! The [`GainConvention`] records which estimator produced the model. It
//! decides where the image center lies and how the gain is applied, so that
//! a fitted model reproduces the correction its estimator made.

use crate::cmlie::OptimizationTarget;
use crate::entropy;
use devignette_core::{PixelBuffer, Result, resize};

/// Largest gain a valid model may reach at `r = 1`
pub const MAX_BRIGHTNESS_MULTIPLICATION: f64 = 3.0;

/// Number of indexed parameters: a, b, c, dx, dy
pub const PARAMETER_COUNT: usize = 5;

/// Side of the square gain visualization
pub const VISUALIZATION_SIZE: u32 = 512;

/// Gray level the visualization scales by the gain
const VISUALIZATION_BASE: f64 = 128.0;

/// Center and application rules of a polynomial model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GainConvention {
    /// Center at the integer pixel `(w / 2, h / 2)`; every sample is
    /// multiplied and truncated (CMLIE)
    #[default]
    Cmlie,
    /// Center at `(w / 2.0, h / 2.0)`; gray samples or the L* channel of
    /// RGB are multiplied and rounded (LIE)
    Lie,
}

/// Even polynomial gain with an optional center offset
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolynomialModel {
    /// r^2 coefficient
    pub a: f64,
    /// r^4 coefficient
    pub b: f64,
    /// r^6 coefficient
    pub c: f64,
    /// Horizontal offset of the optical center from the image center
    pub dx: f64,
    /// Vertical offset of the optical center from the image center
    pub dy: f64,
    /// Center and application rules
    pub convention: GainConvention,
}

impl PolynomialModel {
    /// The identity model: gain 1 everywhere
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a centered model from its three coefficients
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        PolynomialModel {
            a,
            b,
            c,
            ..Self::default()
        }
    }

    /// Set the center and application rules
    pub fn with_convention(mut self, convention: GainConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Set the optical center offset
    pub fn with_center_offset(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    /// Gain at squared normalized radius `r2`
    #[inline]
    pub fn gain_at_r2(&self, r2: f64) -> f64 {
        1.0 + r2 * (self.a + r2 * (self.b + r2 * self.c))
    }

    /// Optical center for a `width` x `height` image
    pub fn center(&self, width: u32, height: u32) -> (f64, f64) {
        let (cx, cy) = match self.convention {
            GainConvention::Cmlie => ((width / 2) as f64, (height / 2) as f64),
            GainConvention::Lie => (width as f64 / 2.0, height as f64 / 2.0),
        };
        (cx + self.dx, cy + self.dy)
    }

    /// Gain at pixel (x, y) of a `width` x `height` image
    pub fn gain(&self, x: u32, y: u32, width: u32, height: u32) -> f64 {
        let (cx, cy) = self.center(width, height);
        let norm = cx * cx + cy * cy;
        let r2 = if norm == 0.0 {
            0.0
        } else {
            let (ddx, ddy) = (x as f64 - cx, y as f64 - cy);
            (ddx * ddx + ddy * ddy) / norm
        };
        self.gain_at_r2(r2)
    }

    /// Whether the gain is non-decreasing on `r` in [0, 1] and stays within
    /// [`MAX_BRIGHTNESS_MULTIPLICATION`] at the corner.
    pub fn is_valid(&self) -> bool {
        let (a, b, c) = (self.a, self.b, self.c);

        if 1.0 + a + b + c > MAX_BRIGHTNESS_MULTIPLICATION {
            return false;
        }

        if c == 0.0 {
            return a >= 0.0 && a + 2.0 * b >= 0.0;
        }

        let d = 4.0 * b * b - 12.0 * a * c;
        let q_minus = (-2.0 * b - d.sqrt()) / (6.0 * c);
        let q_plus = (-2.0 * b + d.sqrt()) / (6.0 * c);

        if c < 0.0 {
            d >= 0.0 && !(q_minus > 0.0 || q_plus < 1.0)
        } else {
            d < 0.0 || (q_minus <= 0.0 && q_plus <= 0.0) || (q_minus >= 1.0 && q_plus >= 1.0)
        }
    }

    /// Parameter by index: 0 = a, 1 = b, 2 = c, 3 = dx, 4 = dy
    ///
    /// # Panics
    ///
    /// Panics if `index >= PARAMETER_COUNT`.
    pub fn parameter(&self, index: usize) -> f64 {
        match index {
            0 => self.a,
            1 => self.b,
            2 => self.c,
            3 => self.dx,
            4 => self.dy,
            _ => panic!("polynomial parameter index {} out of range", index),
        }
    }

    /// Set a parameter by index (see [`PolynomialModel::parameter`])
    ///
    /// # Panics
    ///
    /// Panics if `index >= PARAMETER_COUNT`.
    pub fn set_parameter(&mut self, index: usize, value: f64) {
        match index {
            0 => self.a = value,
            1 => self.b = value,
            2 => self.c = value,
            3 => self.dx = value,
            4 => self.dy = value,
            _ => panic!("polynomial parameter index {} out of range", index),
        }
    }

    /// Correct `image` with this model under its convention
    pub fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        match self.convention {
            GainConvention::Cmlie => crate::cmlie::apply(image, self),
            GainConvention::Lie => crate::lie::apply(image, self),
        }
    }

    /// Log2 luma entropy of `image` corrected by this model
    pub fn evaluate(&self, image: &PixelBuffer) -> f64 {
        let (w, h) = image.dimensions();
        entropy::log2_luma_entropy(image, |x, y| self.gain(x, y, w, h))
    }

    /// Render the gain field as `128 * g` over a `width` x `height` frame,
    /// resized to 512 x 512.
    pub fn visualize(&self, width: u32, height: u32) -> Result<PixelBuffer> {
        let field = PixelBuffer::from_fn_gray(width, height, |x, y| {
            (VISUALIZATION_BASE * self.gain(x, y, width, height)).clamp(0.0, 255.0) as u8
        })?;
        resize(&field, VISUALIZATION_SIZE, VISUALIZATION_SIZE)
    }
}

impl OptimizationTarget for PolynomialModel {
    type Data = PixelBuffer;

    fn parameter_count(&self) -> usize {
        PARAMETER_COUNT
    }

    fn parameter(&self, index: usize) -> f64 {
        PolynomialModel::parameter(self, index)
    }

    fn set_parameter(&mut self, index: usize, value: f64) {
        PolynomialModel::set_parameter(self, index, value)
    }

    fn is_valid(&self) -> bool {
        PolynomialModel::is_valid(self)
    }

    fn evaluate(&self, data: &PixelBuffer) -> f64 {
        PolynomialModel::evaluate(self, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_gain() {
        let m = PolynomialModel::identity();
        assert_eq!(m.gain(0, 0, 100, 80), 1.0);
        assert_eq!(m.gain(50, 40, 100, 80), 1.0);
        assert!(m.is_valid());
    }

    #[test]
    fn test_gain_at_corner_and_center() {
        let m = PolynomialModel::new(0.5, 0.25, 0.125);
        assert_eq!(m.gain(50, 40, 100, 80), 1.0);
        assert!((m.gain(0, 0, 100, 80) - 1.875).abs() < 1e-12);
    }

    #[test]
    fn test_center_offset() {
        let m = PolynomialModel::new(1.0, 0.0, 0.0).with_center_offset(10.0, -5.0);
        assert_eq!(m.center(100, 80), (60.0, 35.0));
        assert_eq!(m.gain(60, 35, 100, 80), 1.0);
    }

    #[test]
    fn test_lie_convention_centers_between_pixels() {
        let m = PolynomialModel::new(1.0, 0.0, 0.0).with_convention(GainConvention::Lie);
        assert_eq!(m.center(5, 4), (2.5, 2.0));
        assert_eq!(PolynomialModel::new(1.0, 0.0, 0.0).center(5, 4), (2.0, 2.0));
        // (0, 0) lies on the normalizing diagonal under both conventions
        assert!((m.gain(0, 0, 5, 4) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_validity_boundaries() {
        assert!(PolynomialModel::new(1.0, 0.0, 0.0).is_valid());
        assert!(!PolynomialModel::new(-1.0, 0.0, 0.0).is_valid());
        // Corner gain above the brightness cap
        assert!(!PolynomialModel::new(2.5, 0.0, 0.0).is_valid());
        // a + 2b < 0 turns the quartic down before r = 1
        assert!(!PolynomialModel::new(1.0, -0.6, 0.0).is_valid());
        assert!(PolynomialModel::new(1.0, -0.5, 0.0).is_valid());
        // c > 0 with negative discriminant
        assert!(PolynomialModel::new(1.0, 0.0, 0.5).is_valid());
        // c < 0 requires real roots bracketing [0, 1]
        assert!(!PolynomialModel::new(0.0, 0.0, -0.5).is_valid());
    }

    #[test]
    fn test_indexed_parameters() {
        let mut m = PolynomialModel::identity();
        for i in 0..PARAMETER_COUNT {
            m.set_parameter(i, i as f64 + 1.0);
        }
        assert_eq!(m, PolynomialModel::new(1.0, 2.0, 3.0).with_center_offset(4.0, 5.0));
        assert_eq!(m.parameter(4), 5.0);
    }

    #[test]
    #[should_panic]
    fn test_parameter_out_of_range() {
        PolynomialModel::identity().parameter(PARAMETER_COUNT);
    }

    #[test]
    fn test_visualize_identity_is_mid_gray() {
        let vis = PolynomialModel::identity().visualize(40, 30).unwrap();
        assert_eq!(vis.dimensions(), (512, 512));
        assert!(vis.data().iter().all(|&v| v == 128));
    }
}
