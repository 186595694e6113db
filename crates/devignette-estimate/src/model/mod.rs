//! Gain models
//!
//! A gain model maps a pixel position to a brightness multiplier. Two
//! families are supported:
//!
//! - [`RadialTable`]: per-radius attenuation estimated by ASIV
//! - [`PolynomialModel`]: even polynomial in the normalized radius, fitted
//!   by LIE and CMLIE
//!
//! [`GainModel`] wraps either behind one interface.

mod polynomial;
mod radial;
pub mod serial;

pub use polynomial::{
    GainConvention, MAX_BRIGHTNESS_MULTIPLICATION, PARAMETER_COUNT, PolynomialModel,
    VISUALIZATION_SIZE,
};
pub use radial::RadialTable;

use crate::entropy;
use devignette_core::PixelBuffer;

/// A fitted gain model
#[derive(Debug, Clone, PartialEq)]
pub enum GainModel {
    /// Per-radius attenuation table.
    ///
    /// `ratio` converts full-resolution radii to table radii.
    Radial { table: RadialTable, ratio: f64 },
    /// Polynomial gain
    Polynomial(PolynomialModel),
}

impl Default for GainModel {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<PolynomialModel> for GainModel {
    fn from(model: PolynomialModel) -> Self {
        GainModel::Polynomial(model)
    }
}

impl GainModel {
    /// The identity polynomial
    pub fn identity() -> Self {
        GainModel::Polynomial(PolynomialModel::identity())
    }

    /// Brightness multiplier at pixel (x, y) of a `width` x `height` image
    pub fn gain(&self, x: u32, y: u32, width: u32, height: u32) -> f64 {
        match self {
            GainModel::Radial { table, ratio } => {
                let cx = x as f64 - (width as f64 * 0.5).round_ties_even();
                let cy = y as f64 - (height as f64 * 0.5).round_ties_even();
                let radius = ((cx * cx + cy * cy).sqrt() + 0.5) * ratio;
                1.0 / table.attenuation_at(radius)
            }
            GainModel::Polynomial(model) => model.gain(x, y, width, height),
        }
    }

    /// Whether the model describes a usable correction
    pub fn is_valid(&self) -> bool {
        match self {
            GainModel::Radial { table, ratio } => table.is_valid() && *ratio > 0.0,
            GainModel::Polynomial(model) => model.is_valid(),
        }
    }

    /// Log2 luma entropy of `image` corrected by this model
    pub fn evaluate(&self, image: &PixelBuffer) -> f64 {
        let (w, h) = image.dimensions();
        entropy::log2_luma_entropy(image, |x, y| self.gain(x, y, w, h))
    }

    /// Number of indexed parameters
    pub fn parameter_count(&self) -> usize {
        match self {
            GainModel::Radial { table, .. } => table.len(),
            GainModel::Polynomial(_) => PARAMETER_COUNT,
        }
    }

    /// Parameter by index: table entry or polynomial coefficient
    ///
    /// # Panics
    ///
    /// Panics if `index >= parameter_count()`.
    pub fn parameter(&self, index: usize) -> f64 {
        match self {
            GainModel::Radial { table, .. } => table.values()[index],
            GainModel::Polynomial(model) => model.parameter(index),
        }
    }

    /// Set a parameter by index
    ///
    /// # Panics
    ///
    /// Panics if `index >= parameter_count()`.
    pub fn set_parameter(&mut self, index: usize, value: f64) {
        match self {
            GainModel::Radial { table, .. } => table.values_mut()[index] = value,
            GainModel::Polynomial(model) => model.set_parameter(index, value),
        }
    }

    /// Correct `image` with this model.
    ///
    /// Radial tables multiply every sample and truncate; polynomial models
    /// follow their [`GainConvention`].
    pub fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        match self {
            GainModel::Radial { .. } => {
                let (w, h) = image.dimensions();
                apply_truncated(image, |x, y| self.gain(x, y, w, h))
            }
            GainModel::Polynomial(model) => model.apply(image),
        }
    }
}

/// Scale every sample of `image` by `gain(x, y)`, truncating toward zero
/// and clamping to [0, 255]
pub(crate) fn apply_truncated(image: &PixelBuffer, gain: impl Fn(u32, u32) -> f64) -> PixelBuffer {
    let mut out = image.clone();
    for y in 0..image.height() {
        for x in 0..image.width() {
            let g = gain(x, y);
            for s in out.pixel_unchecked_mut(x, y) {
                *s = (*s as f64 * g).clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}
