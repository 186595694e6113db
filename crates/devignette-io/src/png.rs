//! PNG image format support
//!
//! Decodes every PNG color type into an 8-bit gray or RGB buffer:
//! palettes and sub-byte depths are expanded, 16-bit samples are reduced
//! to their high byte, and alpha channels are dropped.

use crate::{IoError, IoResult};
use devignette_core::{Channels, PixelBuffer};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<PixelBuffer> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let width = output_info.width;
    let height = output_info.height;
    if output_info.bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unexpected PNG output depth: {:?}",
            output_info.bit_depth
        )));
    }

    // Samples per pixel in the decoded stream, and which of them we keep
    let (samples, channels) = match output_info.color_type {
        ColorType::Grayscale => (1, Channels::Gray),
        ColorType::GrayscaleAlpha => (2, Channels::Gray),
        ColorType::Rgb => (3, Channels::Rgb),
        ColorType::Rgba => (4, Channels::Rgb),
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "PNG palette was not expanded".to_string(),
            ));
        }
    };

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let keep = channels.count();
    let mut out = Vec::with_capacity(width as usize * height as usize * keep);
    for y in 0..height as usize {
        let row = &data[y * bytes_per_row..y * bytes_per_row + width as usize * samples];
        for px in row.chunks_exact(samples) {
            out.extend_from_slice(&px[..keep]);
        }
    }

    Ok(PixelBuffer::from_data(width, height, channels, out)?)
}

/// Write a PNG image
pub fn write_png<W: Write>(buf: &PixelBuffer, writer: W) -> IoResult<()> {
    let color_type = match buf.channels() {
        Channels::Gray => ColorType::Grayscale,
        Channels::Rgb => ColorType::Rgb,
    };

    let mut encoder = Encoder::new(writer, buf.width(), buf.height());
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;
    png_writer
        .write_image_data(buf.data())
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;
    png_writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {}", e)))?;

    Ok(())
}
