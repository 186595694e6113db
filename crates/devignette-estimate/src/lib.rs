//! devignette-estimate - Vignetting estimation and correction
//!
//! Three single-image estimators fit a brightness gain model to a photo
//! and apply it:
//!
//! - [`asiv`]: weighted least squares on radial gradients, producing a
//!   per-radius [`RadialTable`]
//! - [`lie`]: pattern search over a 3-coefficient polynomial minimizing
//!   log-intensity entropy
//! - [`cmlie`]: hill climbing over a polynomial with optional center offset
//!   minimizing log2-binned luma entropy
//!
//! [`remove_vignette`] selects one of them with a [`Method`].
//!
//! # Example
//!
//! ```ignore
//! use devignette_estimate::{Method, remove_vignette};
//! use devignette_estimate::cmlie::CmlieOptions;
//!
//! let result = remove_vignette(&image, &Method::Cmlie(CmlieOptions::default()))?;
//! ```

pub mod asiv;
pub mod cmlie;
mod correction;
pub mod entropy;
mod error;
pub mod lie;
pub mod model;

pub use asiv::{AsivCorrection, AsivOptions};
pub use cmlie::{CmlieCorrection, CmlieOptions, HillClimbOptions, HillClimbState, OptimizationTarget};
pub use correction::{Correction, Method, remove_vignette};
pub use entropy::Histogram;
pub use error::{EstimateError, EstimateResult};
pub use lie::{LieCorrection, LieOptions, LieState};
pub use model::{GainConvention, GainModel, PolynomialModel, RadialTable};
