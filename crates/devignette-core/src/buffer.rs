//! PixelBuffer - 8-bit interleaved image container
//!
//! `PixelBuffer` is the image type consumed and produced by every
//! estimator. It holds a decoded grayscale or RGB image as one `u8` per
//! sample, with no row padding.
//!
//! # Memory layout
//!
//! Samples are stored row-major and interleaved. The sample for channel
//! `c` of the pixel at (x, y) is at index `(y * width + x) * channels + c`.
//!
//! # Examples
//!
//! ```
//! use devignette_core::{Channels, PixelBuffer};
//!
//! let mut buf = PixelBuffer::new(4, 3, Channels::Rgb).unwrap();
//! buf.set_pixel(1, 2, &[10, 20, 30]).unwrap();
//! assert_eq!(buf.pixel(1, 2).unwrap(), &[10, 20, 30]);
//! ```

use crate::color;
use crate::error::{Error, Result};

/// Number of samples per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Channels {
    /// Single 8-bit gray sample
    Gray = 1,
    /// Red, green and blue samples, in that order
    Rgb = 3,
}

impl Channels {
    /// Create `Channels` from a raw sample count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannels`] if `count` is not 1 or 3.
    pub fn from_count(count: u32) -> Result<Self> {
        match count {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Rgb),
            _ => Err(Error::InvalidChannels(count)),
        }
    }

    /// Get the number of samples per pixel.
    #[inline]
    pub fn count(self) -> usize {
        self as usize
    }
}

/// Decoded 8-bit image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Samples per pixel
    channels: Channels,
    /// Sample data (row-major, interleaved, no padding)
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new buffer with all samples set to zero
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new(width: u32, height: u32, channels: Channels) -> Result<Self> {
        Self::new_with_value(width, height, channels, 0)
    }

    /// Create a new buffer with every sample set to `value`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, channels: Channels, value: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let size = (width as usize) * (height as usize) * channels.count();
        Ok(PixelBuffer {
            width,
            height,
            channels,
            data: vec![value; size],
        })
    }

    /// Create a buffer from raw interleaved samples
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `channels` - Samples per pixel
    /// * `data` - Samples in row-major interleaved order
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let expected = (width as usize) * (height as usize) * channels.count();
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{}x{} = {}",
                data.len(),
                width,
                height,
                channels.count(),
                expected
            )));
        }

        Ok(PixelBuffer {
            width,
            height,
            channels,
            data,
        })
    }

    /// Create a buffer by evaluating `f(x, y)` for every pixel of a
    /// single-channel image.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn from_fn_gray(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Result<Self> {
        let mut buf = Self::new(width, height, Channels::Gray)?;
        for y in 0..height {
            for x in 0..width {
                let idx = buf.index(x, y);
                buf.data[idx] = f(x, y);
            }
        }
        Ok(buf)
    }

    /// Get the image width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the image dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the channel layout
    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of pixels (width * height)
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Index of the first sample of the pixel at (x, y)
    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * self.channels.count()
    }

    /// Get the samples of the pixel at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Result<&[u8]> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: (y as usize) * (self.width as usize) + (x as usize),
                len: self.pixel_count(),
            });
        }
        Ok(self.pixel_unchecked(x, y))
    }

    /// Set the samples of the pixel at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range and
    /// `Error::InvalidParameter` if `samples` has the wrong length.
    pub fn set_pixel(&mut self, x: u32, y: u32, samples: &[u8]) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: (y as usize) * (self.width as usize) + (x as usize),
                len: self.pixel_count(),
            });
        }
        if samples.len() != self.channels.count() {
            return Err(Error::InvalidParameter(format!(
                "expected {} samples, got {}",
                self.channels.count(),
                samples.len()
            )));
        }
        let idx = self.index(x, y);
        self.data[idx..idx + samples.len()].copy_from_slice(samples);
        Ok(())
    }

    /// Get the samples of the pixel at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn pixel_unchecked(&self, x: u32, y: u32) -> &[u8] {
        let idx = self.index(x, y);
        &self.data[idx..idx + self.channels.count()]
    }

    /// Get mutable samples of the pixel at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn pixel_unchecked_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let idx = self.index(x, y);
        let n = self.channels.count();
        &mut self.data[idx..idx + n]
    }

    /// Get raw access to the sample data
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable access to the sample data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its samples
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get a row of samples
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = (self.width as usize) * self.channels.count();
        let start = (y as usize) * stride;
        &self.data[start..start + stride]
    }

    /// Convert to a single-channel gray buffer.
    ///
    /// RGB pixels use ITU-R BT.601 weights (see [`color::rgb_to_gray`]).
    /// A gray buffer is returned as a copy.
    pub fn to_gray(&self) -> PixelBuffer {
        match self.channels {
            Channels::Gray => self.clone(),
            Channels::Rgb => {
                let data = self
                    .data
                    .chunks_exact(3)
                    .map(|p| color::rgb_to_gray(p[0], p[1], p[2]))
                    .collect();
                PixelBuffer {
                    width: self.width,
                    height: self.height,
                    channels: Channels::Gray,
                    data,
                }
            }
        }
    }

    /// Luma of the pixel at (x, y) using Rec.709 weights.
    ///
    /// For gray buffers this is the sample value itself.
    #[inline]
    pub fn luma_unchecked(&self, x: u32, y: u32) -> f64 {
        let p = self.pixel_unchecked(x, y);
        match self.channels {
            Channels::Gray => p[0] as f64,
            Channels::Rgb => color::luma(p[0], p[1], p[2]),
        }
    }

    /// Mean over all samples
    pub fn mean(&self) -> f64 {
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        sum / self.data.len() as f64
    }

    /// Population standard deviation over all samples
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let var: f64 = self
            .data
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / self.data.len() as f64;
        var.sqrt()
    }
}
