//! devignette - Single-image vignetting removal for Rust
//!
//! Estimates the brightness falloff of a photograph from the image itself
//! and applies the inverse gain. Three estimators are available:
//!
//! - ASIV: radial gradient least squares, producing a per-radius table
//! - LIE: log-intensity entropy minimization over a polynomial gain
//! - CMLIE: hill climbing over a polynomial gain with a movable center
//!
//! # Example
//!
//! ```
//! use devignette::{Channels, Method, PixelBuffer, remove_vignette};
//! use devignette::estimate::CmlieOptions;
//!
//! let image = PixelBuffer::new_with_value(32, 24, Channels::Rgb, 120).unwrap();
//! let options = CmlieOptions { optimize_center: false, ..Default::default() };
//! let result = remove_vignette(&image, &Method::Cmlie(options)).unwrap();
//! assert_eq!(result.corrected.dimensions(), (32, 24));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use devignette_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use devignette_estimate as estimate;
pub use devignette_io as io;

// Selection entry point
pub use devignette_estimate::{Correction, GainModel, Method, remove_vignette};
