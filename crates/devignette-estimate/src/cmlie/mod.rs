//! CMLIE: constrained minimization of log-intensity entropy
//!
//! Fits a [`PolynomialModel`] (coefficients `a`, `b`, `c` and optionally
//! the optical center offset `dx`, `dy`) by hill climbing on the entropy
//! of the log2-binned luma of the corrected image. Candidates that fail
//! [`PolynomialModel::is_valid`] are never evaluated.
//!
//! # Example
//!
//! ```ignore
//! use devignette_estimate::cmlie::{CmlieOptions, correct};
//!
//! let result = correct(&image, &CmlieOptions::default())?;
//! println!("a = {}", result.model.a);
//! ```

pub mod hill_climb;

pub use hill_climb::{
    DEFAULT_MAX_SWEEPS, HillClimbOptions, HillClimbState, OptimizationTarget, advance, run,
};

use crate::EstimateResult;
use crate::model::{PARAMETER_COUNT, PolynomialModel, apply_truncated};
use devignette_core::PixelBuffer;

/// Default initial step of the polynomial coefficients
pub const DEFAULT_COEFFICIENT_STEP: f64 = 5.0;
/// Default step reduction factor of every parameter
pub const DEFAULT_STEP_REDUCTION: f64 = 0.5;
/// Default final step of the polynomial coefficients
pub const DEFAULT_COEFFICIENT_FINAL_STEP: f64 = 1.0 / 256.0;
/// Default final step of the center offset, in pixels
pub const DEFAULT_CENTER_FINAL_STEP: f64 = 1.0;

/// Index of the last polynomial coefficient
const LAST_COEFFICIENT: usize = 2;

/// Options for CMLIE estimation
#[derive(Debug, Clone, PartialEq)]
pub struct CmlieOptions {
    /// Also search the optical center offset
    pub optimize_center: bool,
    /// Hard cap on hill-climbing sweeps
    pub max_sweeps: usize,
}

impl Default for CmlieOptions {
    fn default() -> Self {
        Self {
            optimize_center: true,
            max_sweeps: DEFAULT_MAX_SWEEPS,
        }
    }
}

impl CmlieOptions {
    /// Hill-climbing schedule for a `width` x `height` image.
    ///
    /// Coefficients start at step 5 and stop below 1/256; the center
    /// offset starts at a quarter of the image size and stops below one
    /// pixel. Every step halves. An image side shorter than 4 pixels gives
    /// a zero step, which leaves that offset at 0.
    pub fn hill_climb_options(&self, width: u32, height: u32) -> HillClimbOptions {
        let c = DEFAULT_COEFFICIENT_STEP;
        let f = DEFAULT_COEFFICIENT_FINAL_STEP;
        HillClimbOptions {
            initial_step: vec![c, c, c, (width / 4) as f64, (height / 4) as f64],
            step_reduction: vec![DEFAULT_STEP_REDUCTION; PARAMETER_COUNT],
            final_step: vec![f, f, f, DEFAULT_CENTER_FINAL_STEP, DEFAULT_CENTER_FINAL_STEP],
            start_index: 0,
            end_index: if self.optimize_center {
                PARAMETER_COUNT - 1
            } else {
                LAST_COEFFICIENT
            },
            max_sweeps: self.max_sweeps,
        }
    }
}

/// Result of a CMLIE correction
#[derive(Debug, Clone)]
pub struct CmlieCorrection {
    /// Corrected image, same shape as the input
    pub corrected: PixelBuffer,
    /// 512 x 512 rendering of the gain field around mid-gray
    pub estimate: PixelBuffer,
    /// Fitted model
    pub model: PolynomialModel,
}

/// Fit the gain model of an image with an explicit schedule
pub fn estimate_with(
    image: &PixelBuffer,
    options: HillClimbOptions,
) -> EstimateResult<PolynomialModel> {
    let state = HillClimbState::new(PolynomialModel::identity(), options, image)?;
    let state = run(state, image);

    let model = state.target;
    tracing::info!(
        a = model.a,
        b = model.b,
        c = model.c,
        dx = model.dx,
        dy = model.dy,
        entropy = state.best_value,
        sweeps = state.sweeps,
        "cmlie model fitted"
    );
    Ok(model)
}

/// Fit the gain model of an image
pub fn estimate(image: &PixelBuffer, options: &CmlieOptions) -> EstimateResult<PolynomialModel> {
    let (w, h) = image.dimensions();
    estimate_with(image, options.hill_climb_options(w, h))
}

/// Multiply every sample by the model gain, truncating and clamping
pub fn apply(image: &PixelBuffer, model: &PolynomialModel) -> PixelBuffer {
    let (w, h) = image.dimensions();
    apply_truncated(image, |x, y| model.gain(x, y, w, h))
}

/// Estimate the vignetting of an image and correct it
pub fn correct(image: &PixelBuffer, options: &CmlieOptions) -> EstimateResult<CmlieCorrection> {
    let model = estimate(image, options)?;
    let (w, h) = image.dimensions();
    Ok(CmlieCorrection {
        corrected: apply(image, &model),
        estimate: model.visualize(w, h)?,
        model,
    })
}
