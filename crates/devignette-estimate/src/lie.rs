//! LIE: log-intensity entropy minimization
//!
//! Searches the coefficients `(a, b, c)` of the gain
//! `g(r) = 1 + a r^2 + b r^4 + c r^6` that minimize the entropy of the
//! log-intensity histogram of the corrected gray image. The radius is
//! measured from `(w / 2.0, h / 2.0)` and normalized by the half diagonal.
//!
//! The search is a pattern search: each sweep tries `±delta` on every
//! coefficient around the current point, moves to the single best
//! improving candidate, then halves `delta`. Candidates that fail
//! [`check`] are never evaluated.
//!
//! The gain is applied to the lightness channel of CIE L*a*b* so that
//! chromaticity is preserved.

use crate::entropy;
use crate::model::{GainConvention, PolynomialModel};
use crate::{EstimateError, EstimateResult};
use devignette_core::color::{lab_to_rgb, rgb_to_lab};
use devignette_core::{Channels, PixelBuffer};

/// Default initial search step
pub const DEFAULT_INITIAL_DELTA: f64 = 8.0;
/// Default step at which the search stops
pub const DEFAULT_FINAL_DELTA: f64 = 1.0 / 256.0;

/// Options for LIE estimation
#[derive(Debug, Clone, PartialEq)]
pub struct LieOptions {
    /// Step of the first sweep
    pub initial_delta: f64,
    /// The search stops once the step is at or below this value
    pub final_delta: f64,
}

impl Default for LieOptions {
    fn default() -> Self {
        Self {
            initial_delta: DEFAULT_INITIAL_DELTA,
            final_delta: DEFAULT_FINAL_DELTA,
        }
    }
}

impl LieOptions {
    fn validate(&self) -> EstimateResult<()> {
        if !(self.final_delta > 0.0 && self.final_delta.is_finite()) {
            return Err(EstimateError::InvalidParameters(format!(
                "final_delta must be positive, got {}",
                self.final_delta
            )));
        }
        if !(self.initial_delta > 0.0 && self.initial_delta.is_finite()) {
            return Err(EstimateError::InvalidParameters(format!(
                "initial_delta must be positive, got {}",
                self.initial_delta
            )));
        }
        Ok(())
    }

    /// Upper bound on the number of sweeps: `ceil(log2(initial / final))`
    pub fn max_sweeps(&self) -> usize {
        if self.initial_delta <= self.final_delta {
            0
        } else {
            (self.initial_delta / self.final_delta).log2().ceil() as usize
        }
    }
}

/// Result of a LIE correction
#[derive(Debug, Clone)]
pub struct LieCorrection {
    /// Corrected image, same shape as the input
    pub corrected: PixelBuffer,
    /// Fitted coefficients (no center offset, LIE convention)
    pub model: PolynomialModel,
}

// ============================================================================
// Gain and validity
// ============================================================================

/// Whether `1 + a r^2 + b r^4 + c r^6` is non-decreasing on `r` in [0, 1].
///
/// Closed-form test over nine cases on the signs of the coefficients and
/// the roots `q = (-2b ± sqrt(4b^2 - 12ac)) / 6c` of the derivative in `r^2`.
pub fn check(a: f64, b: f64, c: f64) -> bool {
    if a > 0.0 && b == 0.0 && c == 0.0 {
        return true;
    }
    if a >= 0.0 && b > 0.0 && c == 0.0 {
        return true;
    }
    if c == 0.0 && b < 0.0 && -a <= 2.0 * b {
        return true;
    }
    if c > 0.0 && b * b < 3.0 * a * c {
        return true;
    }
    if c > 0.0 && b * b == 3.0 * a * c && b >= 0.0 {
        return true;
    }
    if c > 0.0 && b * b == 3.0 * a * c && -b >= 3.0 * c {
        return true;
    }

    let disc = (4.0 * b * b - 12.0 * a * c).sqrt();
    let q_plus = (-2.0 * b + disc) / (6.0 * c);
    let q_minus = (-2.0 * b - disc) / (6.0 * c);

    if c > 0.0 && b * b > 3.0 * a * c && q_plus <= 0.0 {
        return true;
    }
    if c > 0.0 && b * b > 3.0 * a * c && q_minus >= 1.0 {
        return true;
    }
    c < 0.0 && b * b > 3.0 * a * c && q_plus >= 1.0 && q_minus <= 0.0
}

/// The centered LIE model with the given coefficients
pub fn model(coefficients: [f64; 3]) -> PolynomialModel {
    let [a, b, c] = coefficients;
    PolynomialModel::new(a, b, c).with_convention(GainConvention::Lie)
}

/// Gain at pixel (x, y) of a `width` x `height` image
pub fn gain(coefficients: [f64; 3], x: u32, y: u32, width: u32, height: u32) -> f64 {
    model(coefficients).gain(x, y, width, height)
}

/// Log-intensity entropy of a gray image corrected with `coefficients`
pub fn objective(gray: &PixelBuffer, coefficients: [f64; 3]) -> f64 {
    let (w, h) = gray.dimensions();
    entropy::log_intensity_entropy(gray, |x, y| gain(coefficients, x, y, w, h))
}

// ============================================================================
// Search
// ============================================================================

/// Pattern search state
#[derive(Debug, Clone, PartialEq)]
pub struct LieState {
    /// Current point `[a, b, c]`
    pub coefficients: [f64; 3],
    /// Step of the next sweep
    pub delta: f64,
    /// Entropy at the current point
    pub best_entropy: f64,
    /// Sweeps performed so far
    pub sweeps: usize,
    final_delta: f64,
}

impl LieState {
    /// Start a search at the identity model
    pub fn new(gray: &PixelBuffer, options: &LieOptions) -> Self {
        let coefficients = [0.0; 3];
        LieState {
            coefficients,
            delta: options.initial_delta,
            best_entropy: objective(gray, coefficients),
            sweeps: 0,
            final_delta: options.final_delta,
        }
    }

    /// Whether the step has reached the final value
    pub fn is_done(&self) -> bool {
        !(self.delta > self.final_delta)
    }

    /// The current point as a polynomial model
    pub fn model(&self) -> PolynomialModel {
        model(self.coefficients)
    }
}

/// Perform one sweep.
///
/// Tries `±delta` on `a`, `b` and `c` in that order, moves to the best
/// candidate whose entropy is strictly below the current one, then halves
/// `delta`. Returns the new state and whether the search is finished.
pub fn advance(mut state: LieState, gray: &PixelBuffer) -> (LieState, bool) {
    if state.is_done() {
        return (state, true);
    }

    let mut best: Option<([f64; 3], f64)> = None;
    for index in 0..3 {
        for sign in [1.0, -1.0] {
            let mut candidate = state.coefficients;
            candidate[index] += sign * state.delta;
            let [a, b, c] = candidate;
            if !check(a, b, c) {
                continue;
            }
            let h = objective(gray, candidate);
            let threshold = best.map_or(state.best_entropy, |(_, e)| e);
            if h < threshold {
                best = Some((candidate, h));
            }
        }
    }

    if let Some((coefficients, h)) = best {
        state.coefficients = coefficients;
        state.best_entropy = h;
    }

    tracing::debug!(
        sweep = state.sweeps,
        delta = state.delta,
        entropy = state.best_entropy,
        a = state.coefficients[0],
        b = state.coefficients[1],
        c = state.coefficients[2],
        "lie sweep"
    );

    state.delta /= 2.0;
    state.sweeps += 1;
    let done = state.is_done();
    (state, done)
}

/// Fit the gain coefficients of an image.
///
/// RGB input is searched on its BT.601 gray conversion.
pub fn estimate(image: &PixelBuffer, options: &LieOptions) -> EstimateResult<PolynomialModel> {
    options.validate()?;
    let gray = image.to_gray();

    let mut state = LieState::new(&gray, options);
    let mut done = state.is_done();
    while !done {
        (state, done) = advance(state, &gray);
    }

    let model = state.model();
    tracing::info!(
        a = model.a,
        b = model.b,
        c = model.c,
        entropy = state.best_entropy,
        sweeps = state.sweeps,
        "lie model fitted"
    );
    Ok(model)
}

/// Apply fitted coefficients.
///
/// Gray images are scaled directly. RGB images are scaled on the L*
/// channel (mapped to 0..255) with a* and b* unchanged. Results are
/// rounded and clamped. The gain is centered at `(w / 2.0, h / 2.0)` plus
/// the model's offset, whatever its convention.
pub fn apply(image: &PixelBuffer, model: &PolynomialModel) -> PixelBuffer {
    let (w, h) = image.dimensions();
    let model = model.with_convention(GainConvention::Lie);
    let mut out = image.clone();

    for y in 0..h {
        for x in 0..w {
            let g = model.gain(x, y, w, h);
            let px = out.pixel_unchecked_mut(x, y);
            match image.channels() {
                Channels::Gray => {
                    px[0] = (px[0] as f64 * g).round().clamp(0.0, 255.0) as u8;
                }
                Channels::Rgb => {
                    let mut lab = rgb_to_lab(px[0], px[1], px[2]);
                    let l8 = lab.l * 255.0 / 100.0;
                    lab.l = (l8 * g).round().clamp(0.0, 255.0) * 100.0 / 255.0;
                    let (r, gr, b) = lab_to_rgb(lab);
                    px.copy_from_slice(&[r, gr, b]);
                }
            }
        }
    }
    out
}

/// Estimate the vignetting of an image and correct it
pub fn correct(image: &PixelBuffer, options: &LieOptions) -> EstimateResult<LieCorrection> {
    let model = estimate(image, options)?;
    Ok(LieCorrection {
        corrected: apply(image, &model),
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_cases() {
        assert!(check(1.0, 0.0, 0.0));
        assert!(!check(-1.0, 0.0, 0.0));
        assert!(!check(0.0, 0.0, 0.0));
        assert!(check(0.0, 1.0, 0.0));
        // c = 0, b < 0 needs -a <= 2b
        assert!(check(3.0, -1.0, 0.0));
        assert!(check(2.0, -1.0, 0.0));
        assert!(!check(1.0, -1.0, 0.0));
        // c > 0 with complex roots
        assert!(check(1.0, 0.0, 1.0));
        // b^2 == 3ac, b >= 0
        assert!(check(0.0, 0.0, 8.0));
        // c > 0, both roots at or below 0
        assert!(check(0.0, 1.0, 1.0));
        // c < 0 orders the roots q+ <= q-, so the last case never holds
        assert!(!check(0.0, 0.0, -1.0));
        assert!(!check(3.0, 0.0, -0.5));
    }

    #[test]
    fn test_gain_center_and_corner() {
        let coeffs = [0.5, 0.0, 0.0];
        assert_eq!(gain(coeffs, 50, 40, 100, 80), 1.0);
        assert!((gain(coeffs, 0, 0, 100, 80) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_model_gain_matches_lie_gain() {
        let coeffs = [0.7, -0.2, 0.1];
        let m = model(coeffs);
        assert_eq!(m.convention, GainConvention::Lie);
        for (x, y) in [(0, 0), (3, 8), (10, 6), (4, 4)] {
            assert_eq!(m.gain(x, y, 11, 9), gain(coeffs, x, y, 11, 9));
        }
    }

    #[test]
    fn test_max_sweeps() {
        assert_eq!(LieOptions::default().max_sweeps(), 11);
        let none = LieOptions {
            initial_delta: 0.001,
            final_delta: 0.01,
        };
        assert_eq!(none.max_sweeps(), 0);
    }

    #[test]
    fn test_sweeps_never_raise_entropy() {
        let img = PixelBuffer::from_fn_gray(24, 24, |x, y| (150 + (x + y) % 7) as u8).unwrap();
        let options = LieOptions::default();
        let mut state = LieState::new(&img, &options);
        let mut done = false;
        while !done {
            let before = state.best_entropy;
            (state, done) = advance(state, &img);
            assert!(state.best_entropy <= before);
            assert!(state.sweeps <= options.max_sweeps());
        }
        assert_eq!(state.sweeps, options.max_sweeps());
        let [a, b, c] = state.coefficients;
        assert!(a == 0.0 && b == 0.0 && c == 0.0 || check(a, b, c));
    }

    #[test]
    fn test_advance_when_done_is_noop() {
        let flat = PixelBuffer::new_with_value(8, 8, Channels::Gray, 100).unwrap();
        let options = LieOptions {
            initial_delta: 1.0 / 256.0,
            ..Default::default()
        };
        let state = LieState::new(&flat, &options);
        let (next, done) = advance(state.clone(), &flat);
        assert!(done);
        assert_eq!(next, state);
    }

    #[test]
    fn test_apply_identity_gray() {
        let img = PixelBuffer::from_fn_gray(9, 9, |x, y| (x * 20 + y) as u8).unwrap();
        assert_eq!(apply(&img, &PolynomialModel::identity()), img);
    }

    #[test]
    fn test_invalid_options() {
        let img = PixelBuffer::new(4, 4, Channels::Gray).unwrap();
        let options = LieOptions {
            final_delta: 0.0,
            ..Default::default()
        };
        assert!(estimate(&img, &options).is_err());
    }
}
