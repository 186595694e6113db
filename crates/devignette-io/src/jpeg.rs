//! JPEG image format support
//!
//! Reads JPEG images using the `jpeg-decoder` crate and writes them with
//! `jpeg-encoder`. Supports 8-bit grayscale and 24-bit RGB.

use crate::{IoError, IoResult};
use devignette_core::{Channels, PixelBuffer};
use jpeg_decoder::{Decoder, PixelFormat};
use jpeg_encoder::{ColorType, Encoder};
use std::io::{Read, Write};

/// Default JPEG quality used by [`write_jpeg`] callers that don't care
pub const DEFAULT_QUALITY: u8 = 90;

/// Read a JPEG image from a reader.
///
/// # Arguments
/// * `reader` - A reader positioned at the JPEG SOI marker (`FF D8`)
///
/// # Returns
/// A gray (L8) or RGB (RGB24) buffer.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<PixelBuffer> {
    let mut decoder = Decoder::new(reader);
    let data = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG header missing".to_string()))?;

    let channels = match info.pixel_format {
        PixelFormat::L8 => Channels::Gray,
        PixelFormat::RGB24 => Channels::Rgb,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported JPEG pixel format: {:?}",
                other
            )));
        }
    };

    Ok(PixelBuffer::from_data(
        info.width as u32,
        info.height as u32,
        channels,
        data,
    )?)
}

/// Write a JPEG image.
///
/// # Arguments
/// * `buf` - Gray or RGB image; both dimensions must fit in 16 bits
/// * `writer` - Output sink
/// * `quality` - 1..=100
pub fn write_jpeg<W: Write>(buf: &PixelBuffer, writer: W, quality: u8) -> IoResult<()> {
    let (width, height) = buf.dimensions();
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(IoError::InvalidData(format!(
            "image too large for JPEG: {}x{}",
            width, height
        )));
    }

    let color = match buf.channels() {
        Channels::Gray => ColorType::Luma,
        Channels::Rgb => ColorType::Rgb,
    };

    let encoder = Encoder::new(writer, quality.clamp(1, 100));
    encoder
        .encode(buf.data(), width as u16, height as u16, color)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))
}
