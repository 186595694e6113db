//! devignette-io - Image I/O for vignetting correction
//!
//! Decodes container formats into [`PixelBuffer`] and encodes results back:
//!
//! - PNG (feature `png-format`, default)
//! - JPEG (feature `jpeg`, default)
//!
//! # Example
//!
//! ```ignore
//! use devignette_io::{ImageFormat, read_image, write_image};
//!
//! let buf = read_image("photo.jpg")?;
//! write_image(&buf, "photo.png", ImageFormat::Png)?;
//! ```

mod error;
pub mod format;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format, detect_format_from_bytes};

use devignette_core::PixelBuffer;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Read an image from a file path, detecting the format from its header
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let bytes = std::fs::read(path)?;
    read_image_mem(&bytes)
}

/// Read an image from memory, detecting the format from its header
pub fn read_image_mem(data: &[u8]) -> IoResult<PixelBuffer> {
    match detect_format_from_bytes(data)? {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(BufReader::new(Cursor::new(data))),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(data),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            other
        ))),
    }
}

/// Write an image to a file path in the given format
pub fn write_image<P: AsRef<Path>>(
    buf: &PixelBuffer,
    path: P,
    format: ImageFormat,
) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_image_to(buf, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Encode an image into a byte vector
pub fn write_image_mem(buf: &PixelBuffer, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut bytes = Vec::new();
    write_image_to(buf, &mut bytes, format)?;
    Ok(bytes)
}

#[allow(unused_variables)]
fn write_image_to<W: Write>(buf: &PixelBuffer, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(buf, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg(buf, writer, jpeg::DEFAULT_QUALITY),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            other
        ))),
    }
}
