//! Intensity histograms and their entropy
//!
//! Both entropy objectives bin a gain-corrected intensity on a logarithmic
//! axis into 256 bins, smooth the histogram with a 9-tap triangular kernel,
//! and measure Shannon entropy in bits. They differ in how a value maps to
//! a bin:
//!
//! - [`Histogram::add_log_intensity`]: continuous position
//!   `255 * ln(1 + v) / 8`, split linearly between neighbouring bins
//! - [`Histogram::add_log2_luma`]: integer value, coarse bin
//!   `LOG2_BIN_MUL * floor(log2(v + 1))`

use devignette_core::PixelBuffer;

/// Number of histogram bins
pub const BINS: usize = 256;

/// Bin spacing of the log2 luma histogram: `floor(255 / 8 / 3 + 1)`
pub const LOG2_BIN_MUL: usize = 11;

/// Smoothing kernel, normalized by [`SMOOTH_NORM`]
const SMOOTH_KERNEL: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
const SMOOTH_NORM: f64 = 25.0;

/// 256-bin histogram of real-valued counts
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: [f64; BINS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Histogram { bins: [0.0; BINS] }
    }

    /// Bin contents
    pub fn bins(&self) -> &[f64; BINS] {
        &self.bins
    }

    /// Sum of all bins
    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }

    /// Add one sample on the natural-log intensity axis.
    ///
    /// The position `255 * ln(1 + v) / 8` is clamped to `[0, 255]` and its
    /// unit weight split between the floor and ceiling bins in proportion
    /// to the fractional part.
    pub fn add_log_intensity(&mut self, value: f64) {
        let pos = (255.0 * (1.0 + value.max(0.0)).ln() / 8.0).clamp(0.0, (BINS - 1) as f64);
        let lo = pos.floor();
        let frac = pos - lo;
        let lo = lo as usize;
        self.bins[lo] += 1.0 - frac;
        if frac > 0.0 {
            self.bins[lo + 1] += frac;
        }
    }

    /// Add one integer sample on the coarse log2 axis.
    ///
    /// Negative values count as 0; bins past the end clamp to the last bin.
    pub fn add_log2_luma(&mut self, value: i64) {
        let v = value.max(0) as f64;
        let bin = LOG2_BIN_MUL * (v + 1.0).log2().floor() as usize;
        self.bins[bin.min(BINS - 1)] += 1.0;
    }

    /// Smooth with the 1-2-3-4-5-4-3-2-1 kernel (normalized by 25).
    ///
    /// The ends are padded by mirroring without repeating the edge bin:
    /// `h4 h3 h2 h1 | h0 .. h255 | h254 h253 h252 h251`.
    pub fn smooth(&mut self) {
        let mut padded = [0.0; BINS + 8];
        for i in 0..4 {
            padded[i] = self.bins[4 - i];
            padded[BINS + 4 + i] = self.bins[BINS - 2 - i];
        }
        padded[4..BINS + 4].copy_from_slice(&self.bins);

        for (i, bin) in self.bins.iter_mut().enumerate() {
            *bin = padded[i..i + 9]
                .iter()
                .zip(SMOOTH_KERNEL)
                .map(|(h, k)| h * k)
                .sum::<f64>()
                / SMOOTH_NORM;
        }
    }

    /// Shannon entropy in bits of the normalized histogram.
    ///
    /// Empty bins contribute nothing; an empty histogram has entropy 0.
    pub fn entropy(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        self.bins
            .iter()
            .filter(|&&h| h > 0.0)
            .map(|&h| {
                let p = h / total;
                -p * p.log2()
            })
            .sum()
    }
}

// ============================================================================
// Objectives
// ============================================================================

/// Smoothed log-intensity entropy of a gray image scaled by `gain(x, y)`.
///
/// Reads the first sample of each pixel; pass a gray buffer.
pub fn log_intensity_entropy(gray: &PixelBuffer, gain: impl Fn(u32, u32) -> f64) -> f64 {
    let mut hist = Histogram::new();
    for y in 0..gray.height() {
        for x in 0..gray.width() {
            let v = gray.pixel_unchecked(x, y)[0] as f64;
            hist.add_log_intensity(v * gain(x, y));
        }
    }
    hist.smooth();
    hist.entropy()
}

/// Smoothed log2-binned entropy of the Rec.709 luma of an image scaled by
/// `gain(x, y)`.
///
/// The scaled luma is truncated toward zero before binning.
pub fn log2_luma_entropy(image: &PixelBuffer, gain: impl Fn(u32, u32) -> f64) -> f64 {
    let mut hist = Histogram::new();
    for y in 0..image.height() {
        for x in 0..image.width() {
            let v = image.luma_unchecked(x, y) * gain(x, y);
            hist.add_log2_luma(v as i64);
        }
    }
    hist.smooth();
    hist.entropy()
}
