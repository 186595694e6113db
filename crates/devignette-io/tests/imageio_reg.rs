//! Image I/O regression test
//!
//! Round-trips synthetic buffers through PNG and JPEG, both in memory and
//! through files, and checks format detection on the encoded bytes.

use devignette_core::Channels;
use devignette_io::{ImageFormat, detect_format_from_bytes, read_image, read_image_mem, write_image_mem};
use devignette_test::{RegParams, regout_dir, synthetic};

#[test]
fn imageio_reg_png() {
    let mut rp = RegParams::new("imageio_png");

    let gray = synthetic::vignetted_gray(64, 48).unwrap();
    let rgb = synthetic::color_ramp(33, 21).unwrap();

    for buf in [&gray, &rgb] {
        let bytes = write_image_mem(buf, ImageFormat::Png).unwrap();
        assert_eq!(detect_format_from_bytes(&bytes).unwrap(), ImageFormat::Png);
        let back = read_image_mem(&bytes).unwrap();
        rp.compare_buffers(buf, &back);
    }

    // Through the filesystem
    rp.write_buffer_and_check(&rgb, ImageFormat::Png).unwrap();
    let path = format!("{}/imageio_png.{:02}.png", regout_dir(), rp.index());
    let back = read_image(&path).unwrap();
    rp.compare_buffers(&rgb, &back);

    assert!(rp.cleanup(), "imageio_png regression test failed");
}

#[test]
fn imageio_reg_jpeg() {
    let mut rp = RegParams::new("imageio_jpeg");

    // Lossy: compare shape and mean only
    let gray = synthetic::vignetted_gray(64, 48).unwrap();
    let bytes = write_image_mem(&gray, ImageFormat::Jpeg).unwrap();
    assert_eq!(detect_format_from_bytes(&bytes).unwrap(), ImageFormat::Jpeg);
    let back = read_image_mem(&bytes).unwrap();
    rp.compare_values(64.0, back.width() as f64, 0.0);
    rp.compare_values(48.0, back.height() as f64, 0.0);
    rp.check(back.channels() == Channels::Gray, "gray JPEG decodes as gray");
    rp.compare_values(gray.mean(), back.mean(), 1.5);

    let rgb = synthetic::vignetted_rgb(40, 40).unwrap();
    let back = read_image_mem(&write_image_mem(&rgb, ImageFormat::Jpeg).unwrap()).unwrap();
    rp.check(back.channels() == Channels::Rgb, "RGB JPEG decodes as RGB");
    rp.compare_values(rgb.mean(), back.mean(), 1.5);

    assert!(rp.cleanup(), "imageio_jpeg regression test failed");
}

#[test]
fn imageio_reg_errors() {
    assert!(read_image_mem(&[]).is_err());
    assert!(read_image_mem(b"GIF89a....").is_err());
    assert!(read_image("/nonexistent/devignette/input.png").is_err());
}
