//! devignette-core - Basic data structures for vignetting correction
//!
//! This crate provides the fundamental types and numeric kernels shared by
//! the estimators:
//!
//! - [`PixelBuffer`] / [`Channels`] - Decoded 8-bit gray or RGB image
//! - [`Matrix`] - Dense matrix with multiply, transpose and full-pivot inversion
//! - [`color`] - Gray, luma and CIE L*a*b* conversions
//! - [`scale`] - Bilinear resize

pub mod buffer;
pub mod color;
pub mod error;
pub mod matrix;
pub mod scale;

pub use buffer::{Channels, PixelBuffer};
pub use color::Lab;
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use scale::resize;
