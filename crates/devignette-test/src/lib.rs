//! devignette-test - Regression test framework for devignette
//!
//! Supports three modes, selected with the `REGTEST_MODE` environment
//! variable:
//!
//! - **Generate**: Write golden files for comparison
//! - **Compare**: Compare results with golden files (default)
//! - **Display**: Run tests and keep the produced images for inspection
//!
//! Test inputs are synthesized in code (see [`synthetic`]); there are no
//! binary fixtures.
//!
//! # Usage
//!
//! ```ignore
//! use devignette_test::{RegParams, synthetic};
//!
//! let mut rp = RegParams::new("asiv");
//! let input = synthetic::vignetted_gray(101, 101).unwrap();
//! rp.compare_values(101.0, input.width() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```

mod error;
mod params;
pub mod synthetic;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // devignette-test is at crates/devignette-test
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
