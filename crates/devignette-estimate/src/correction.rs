//! Method selection
//!
//! [`remove_vignette`] runs exactly one estimator on an image and returns
//! the corrected image, the fitted model, and a visualization of the
//! estimate where the method produces one.

use crate::asiv::{self, AsivOptions};
use crate::cmlie::{self, CmlieOptions};
use crate::lie::{self, LieOptions};
use crate::model::{GainModel, RadialTable};
use crate::EstimateResult;
use devignette_core::PixelBuffer;

/// Estimator to run, with its options
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    /// Radial gradient estimation. A supplied table skips estimation.
    Asiv(AsivOptions, Option<RadialTable>),
    /// Log-intensity entropy pattern search
    Lie(LieOptions),
    /// Log2 luma entropy hill climbing
    Cmlie(CmlieOptions),
}

impl Method {
    /// Short lowercase name of the method
    pub fn name(&self) -> &'static str {
        match self {
            Method::Asiv(..) => "asiv",
            Method::Lie(_) => "lie",
            Method::Cmlie(_) => "cmlie",
        }
    }
}

/// Output of [`remove_vignette`]
#[derive(Debug, Clone)]
pub struct Correction {
    /// Corrected image, same shape as the input
    pub corrected: PixelBuffer,
    /// Visualization of the estimated vignetting (`None` for LIE)
    pub estimate: Option<PixelBuffer>,
    /// Fitted gain model
    pub model: GainModel,
}

/// Estimate and remove the vignetting of an image with one method
///
/// # Errors
///
/// Propagates the estimator's error; no partial correction is returned.
pub fn remove_vignette(image: &PixelBuffer, method: &Method) -> EstimateResult<Correction> {
    tracing::debug!(
        method = method.name(),
        width = image.width(),
        height = image.height(),
        "removing vignette"
    );

    match method {
        Method::Asiv(options, table) => {
            let result = match table {
                Some(table) => asiv::correct_with_table(image, table.clone(), options)?,
                None => asiv::correct(image, options)?,
            };
            let model = result.model();
            Ok(Correction {
                corrected: result.corrected,
                estimate: Some(result.estimate),
                model,
            })
        }
        Method::Lie(options) => {
            let result = lie::correct(image, options)?;
            Ok(Correction {
                corrected: result.corrected,
                estimate: None,
                model: GainModel::Polynomial(result.model),
            })
        }
        Method::Cmlie(options) => {
            let result = cmlie::correct(image, options)?;
            Ok(Correction {
                corrected: result.corrected,
                estimate: Some(result.estimate),
                model: GainModel::Polynomial(result.model),
            })
        }
    }
}
