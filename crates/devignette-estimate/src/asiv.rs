//! ASIV: radial-gradient vignetting estimation
//!
//! Fits a per-radius log-attenuation profile to the radial gradients of a
//! downsampled gray copy of the image by iteratively reweighted least
//! squares:
//!
//! 1. Downsample so the width is at most `max_width`, convert to gray
//! 2. Compute the radial component of the log-intensity gradient
//! 3. Solve the normal equations of a first-difference model with a
//!    second-difference smoothness penalty and a ridge term
//! 4. Reweight pixels by how well they agree with the fit and repeat
//! 5. Exponentiate and normalize so the center entry is 1
//!
//! Every iteration appends its full solution to the table; the weights of
//! later iterations read the table from its start.
//!
//! # Example
//!
//! ```ignore
//! use devignette_estimate::asiv::{AsivOptions, correct};
//!
//! let result = correct(&image, &AsivOptions::default())?;
//! assert_eq!(result.table.values()[0], 1.0);
//! ```

use crate::model::{GainModel, RadialTable};
use crate::{EstimateError, EstimateResult};
use devignette_core::{Matrix, PixelBuffer, resize};

/// Default width the estimation image is reduced to
pub const DEFAULT_MAX_WIDTH: u32 = 75;
/// Default number of reweighting iterations
pub const DEFAULT_ITERATIONS: usize = 5;
/// Default smoothness weight, scaled by `2 * pixels / radii`
pub const DEFAULT_SMOOTHNESS: f64 = 0.15;
/// Default ridge term pulling every log-attenuation toward 0
pub const DEFAULT_RIDGE: f64 = 0.03;
/// Default exponent of the robust reweighting
pub const DEFAULT_ALPHA: f64 = 0.6;

/// Offset added to intensities before taking logs
const LOG_SHIFT: f64 = 1.0;
/// Guards the radial projection at the center pixel
const RADIUS_EPS: f64 = 1e-6;

/// Options for ASIV estimation
#[derive(Debug, Clone, PartialEq)]
pub struct AsivOptions {
    /// Maximum width of the estimation image
    pub max_width: u32,
    /// Number of reweighted least-squares iterations
    pub iterations: usize,
    /// Smoothness weight of the second-difference penalty
    pub smoothness: f64,
    /// Diagonal regularization of the normal equations
    pub ridge: f64,
    /// Exponent of the robust weight function, in (0, 1]
    pub alpha: f64,
}

impl Default for AsivOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            iterations: DEFAULT_ITERATIONS,
            smoothness: DEFAULT_SMOOTHNESS,
            ridge: DEFAULT_RIDGE,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl AsivOptions {
    fn validate(&self) -> EstimateResult<()> {
        if self.max_width == 0 {
            return Err(EstimateError::InvalidParameters(
                "max_width must be positive".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(EstimateError::InvalidParameters(
                "iterations must be positive".to_string(),
            ));
        }
        if !(self.smoothness >= 0.0 && self.ridge >= 0.0) {
            return Err(EstimateError::InvalidParameters(format!(
                "smoothness ({}) and ridge ({}) must be non-negative",
                self.smoothness, self.ridge
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(EstimateError::InvalidParameters(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Result of an ASIV correction
#[derive(Debug, Clone)]
pub struct AsivCorrection {
    /// Corrected image, same shape as the input
    pub corrected: PixelBuffer,
    /// Gray rendering of the attenuation, same size as the input
    pub estimate: PixelBuffer,
    /// Attenuation per radius of the estimation image
    pub table: RadialTable,
    /// Scale from input radii to table radii
    pub ratio: f64,
}

impl AsivCorrection {
    /// The fitted gain model
    pub fn model(&self) -> GainModel {
        GainModel::Radial {
            table: self.table.clone(),
            ratio: self.ratio,
        }
    }
}

// ============================================================================
// Estimation
// ============================================================================

/// Downsampling ratio and estimation image size for a `width` x `height`
/// input.
///
/// Returns `(ratio, small_width, small_height)`.
pub fn estimation_size(width: u32, height: u32, max_width: u32) -> (f64, u32, u32) {
    let ratio = if width > max_width {
        max_width as f64 / width as f64
    } else {
        1.0
    };
    let sw = ((width as f64 * ratio + 0.5) as u32).max(1);
    let sh = ((height as f64 * ratio + 0.5) as u32).max(1);
    (ratio, sw, sh)
}

/// Reduce the image to the estimation size and convert to gray.
///
/// Returns the gray image and the downsampling ratio.
pub fn downsample(image: &PixelBuffer, max_width: u32) -> EstimateResult<(PixelBuffer, f64)> {
    let (ratio, sw, sh) = estimation_size(image.width(), image.height(), max_width);
    let small = resize(image, sw, sh)?;
    Ok((small.to_gray(), ratio))
}

/// Radius of every pixel of a `width` x `height` image about
/// `(width / 2, height / 2)`, rounded to the nearest integer
fn pixel_radii(width: usize, height: usize) -> Vec<usize> {
    let (hw, hh) = ((width / 2) as f64, (height / 2) as f64);
    let mut radii = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (cx, cy) = (x as f64 - hw, y as f64 - hh);
            radii.push(((cx * cx + cy * cy).sqrt() + 0.5) as usize);
        }
    }
    radii
}

/// Radial component of the log-intensity gradient.
///
/// Backward differences; row 0 and column 0 stay 0.
fn radial_gradients(gray: &PixelBuffer) -> Vec<f64> {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let (hw, hh) = ((w / 2) as f64, (h / 2) as f64);
    let data = gray.data();
    let log = |i: usize| (data[i] as f64 + LOG_SHIFT).ln();

    let mut rg = vec![0.0; w * h];
    for y in 1..h {
        for x in 1..w {
            let i = y * w + x;
            let dx = log(i) - log(i - 1);
            let dy = log(i) - log(i - w);
            let (cx, cy) = (x as f64 - hw, y as f64 - hh);
            rg[i] = (cx * dx + cy * dy) / (cx * cx + cy * cy + RADIUS_EPS).sqrt();
        }
    }
    rg
}

/// `B^T B` for the second-difference operator `B` on `n` radii
fn smoothness_matrix(n: usize) -> EstimateResult<Matrix> {
    let mut b = Matrix::new(n, n);
    for i in 1..n.saturating_sub(1) {
        b.set(i, i - 1, 1.0);
        b.set(i, i, -2.0);
        b.set(i, i + 1, 1.0);
    }
    Ok(b.transpose().multiply(&b)?)
}

/// Fit the log-attenuation profile of a gray estimation image.
///
/// Returns the accumulated solutions of all iterations, unnormalized.
///
/// # Errors
///
/// Returns [`EstimateError::SingularSystem`] if the normal equations of
/// any iteration cannot be inverted, and
/// [`EstimateError::UnsupportedImage`] for a 1x1 image.
pub fn fit_log_profile(gray: &PixelBuffer, options: &AsivOptions) -> EstimateResult<Vec<f64>> {
    options.validate()?;

    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let (hw, hh) = ((w / 2) as f64, (h / 2) as f64);
    let n = ((hh * hh + hw * hw).sqrt() + 0.5 + 1.0) as usize;
    if n < 2 {
        return Err(EstimateError::UnsupportedImage(format!(
            "estimation image {}x{} has no radial extent",
            w, h
        )));
    }

    let lambda = options.smoothness * 2.0 * (w * h) as f64 / n as f64;
    let btb = smoothness_matrix(n)?;
    let rg = radial_gradients(gray);
    let radii = pixel_radii(w, h);
    let mut weight = vec![1.0; w * h];
    let mut profile: Vec<f64> = Vec::with_capacity(n * options.iterations);

    tracing::debug!(width = w, height = h, radii = n, lambda, "asiv fit");

    for iteration in 0..options.iterations {
        let mut ata = Matrix::new(n, n);
        let mut atl = Matrix::new(n, 1);

        for y in 1..h {
            for x in 1..w {
                let i = y * w + x;
                let r = radii[i];
                if r == 0 || r >= n {
                    continue;
                }
                let w2 = weight[i] * weight[i];
                ata.add_at(r, r, w2);
                ata.add_at(r - 1, r - 1, w2);
                ata.add_at(r, r - 1, -w2);
                ata.add_at(r - 1, r, -w2);
                atl.add_at(r, 0, rg[i] * w2);
                atl.add_at(r - 1, 0, -rg[i] * w2);
            }
        }

        let lambda2 = lambda * lambda;
        for (s, b) in ata.data_mut().iter_mut().zip(btb.data()) {
            *s += lambda2 * b;
        }
        for k in 0..n {
            ata.add_at(k, k, options.ridge);
        }

        if !ata.invert() {
            tracing::warn!(iteration, size = n, "asiv normal equations are singular");
            return Err(EstimateError::SingularSystem { size: n });
        }
        let solution = ata.multiply(&atl)?;
        profile.extend_from_slice(solution.data());

        // Reweight against the first solution in the table
        for y in 1..h {
            for x in 1..w {
                let i = y * w + x;
                let r = radii[i].clamp(1, n - 1);
                let rv = profile[r] - profile[r - 1];
                let s1 = (rg[i] - rv).abs();
                let s2 = options.alpha * s1.powf(options.alpha - 1.0);
                weight[i] = (-s1).exp() * (1.0 - (-s2).exp());
            }
        }

        tracing::debug!(iteration, entries = profile.len(), "asiv iteration");
    }

    Ok(profile)
}

/// Exponentiate a log profile and normalize it so entry 0 is 1.
///
/// # Errors
///
/// Returns [`EstimateError::InvalidParameters`] if the profile is empty or
/// its first entry does not give a finite positive attenuation.
pub fn normalize_profile(profile: &[f64]) -> EstimateResult<RadialTable> {
    let first = profile
        .first()
        .map(|v| v.exp())
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| {
            EstimateError::InvalidParameters("log profile has no usable first entry".to_string())
        })?;
    Ok(RadialTable::new(
        profile.iter().map(|v| v.exp() / first).collect(),
    ))
}

/// Estimate the Radial Table of an image.
///
/// Returns the table and the ratio from input radii to table radii.
pub fn estimate_table(
    image: &PixelBuffer,
    options: &AsivOptions,
) -> EstimateResult<(RadialTable, f64)> {
    options.validate()?;
    let (gray, ratio) = downsample(image, options.max_width)?;
    let profile = fit_log_profile(&gray, options)?;
    let table = normalize_profile(&profile)?;
    tracing::info!(entries = table.len(), ratio, "asiv table estimated");
    Ok((table, ratio))
}

// ============================================================================
// Correction
// ============================================================================

/// Render the table as a gray attenuation image of `width` x `height`.
///
/// Drawn at the estimation size, then resized: pixels at radius `r` in
/// `1..=len` with attenuation below 1 show `round(255 * T[r - 1])`, all
/// others are white.
pub fn visualize(
    table: &RadialTable,
    width: u32,
    height: u32,
    max_width: u32,
) -> EstimateResult<PixelBuffer> {
    let (_, sw, sh) = estimation_size(width, height, max_width);
    let hw = (sw as f64 * 0.5).round_ties_even() as i64;
    let hh = (sh as f64 * 0.5).round_ties_even() as i64;
    let values = table.values();

    let small = PixelBuffer::from_fn_gray(sw, sh, |x, y| {
        let (cx, cy) = (x as i64 - hw, y as i64 - hh);
        let r = (((cx * cx + cy * cy) as f64).sqrt() + 0.5) as usize;
        match r.checked_sub(1).and_then(|i| values.get(i)) {
            Some(&v) if v < 1.0 => (255.0 * v).round_ties_even().clamp(0.0, 255.0) as u8,
            _ => 255,
        }
    })?;
    Ok(resize(&small, width, height)?)
}

/// Correct an image with an already estimated table
///
/// # Errors
///
/// Returns [`EstimateError::InvalidParameters`] if the table fails
/// [`RadialTable::is_valid`]; a zero entry would divide by zero.
pub fn correct_with_table(
    image: &PixelBuffer,
    table: RadialTable,
    options: &AsivOptions,
) -> EstimateResult<AsivCorrection> {
    options.validate()?;
    if !table.is_valid() {
        return Err(EstimateError::InvalidParameters(
            "radial table must be non-empty with finite positive entries".to_string(),
        ));
    }

    let (width, height) = image.dimensions();
    let (ratio, _, _) = estimation_size(width, height, options.max_width);
    let model = GainModel::Radial {
        table: table.clone(),
        ratio,
    };
    let corrected = model.apply(image);
    let estimate = visualize(&table, width, height, options.max_width)?;

    Ok(AsivCorrection {
        corrected,
        estimate,
        table,
        ratio,
    })
}

/// Estimate the vignetting of an image and correct it
pub fn correct(image: &PixelBuffer, options: &AsivOptions) -> EstimateResult<AsivCorrection> {
    let (table, _) = estimate_table(image, options)?;
    correct_with_table(image, table, options)
}
