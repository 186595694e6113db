//! Color conversion and resize regression test

use devignette_core::color::{lab_to_rgb, rgb_to_gray, rgb_to_lab};
use devignette_core::{Channels, PixelBuffer, resize};
use devignette_test::{RegParams, synthetic};

#[test]
fn color_scale_reg_lab() {
    let mut rp = RegParams::new("color_lab");

    // Gray levels survive the round trip
    let mut worst = 0i32;
    for v in 0..=255u8 {
        let (r, g, b) = lab_to_rgb(rgb_to_lab(v, v, v));
        for c in [r, g, b] {
            worst = worst.max((c as i32 - v as i32).abs());
        }
    }
    rp.compare_values(0.0, worst as f64, 1.0);

    // Lightness is monotone in gray level
    let ls: Vec<f64> = (0..=255u8).map(|v| rgb_to_lab(v, v, v).l).collect();
    rp.check(ls.windows(2).all(|w| w[0] < w[1]), "L* increases with gray");
    rp.compare_values(100.0, ls[255], 0.01);

    rp.compare_values(128.0, rgb_to_gray(128, 128, 128) as f64, 0.0);

    assert!(rp.cleanup(), "color_lab regression test failed");
}

#[test]
fn color_scale_reg_resize() {
    let mut rp = RegParams::new("color_resize");

    let img = synthetic::vignetted_rgb(101, 101).unwrap();
    let same = resize(&img, 101, 101).unwrap();
    rp.compare_buffers(&img, &same);

    // Downsampling keeps the mean and the radial falloff
    let small = resize(&img, 75, 75).unwrap();
    rp.compare_values(img.mean(), small.mean(), 1.0);
    let center = small.pixel(37, 37).unwrap()[0];
    let corner = small.pixel(0, 0).unwrap()[0];
    rp.check(center > corner, "center brighter than corner");

    let gray = small.to_gray();
    rp.check(gray.channels() == Channels::Gray, "to_gray is single channel");

    let flat = PixelBuffer::new_with_value(10, 7, Channels::Gray, 42).unwrap();
    let big = resize(&flat, 512, 512).unwrap();
    rp.check(big.data().iter().all(|&v| v == 42), "flat stays flat");

    assert!(rp.cleanup(), "color_resize regression test failed");
}
