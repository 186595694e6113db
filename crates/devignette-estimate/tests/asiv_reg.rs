//! ASIV regression test
//!
//! Fits the radial table of a synthetic vignetted flat field and checks
//! the normalization, the table layout, and the flattening of the
//! corrected image.

use devignette_estimate::asiv::{self, AsivOptions};
use devignette_estimate::model::serial::{read_table, write_table};
use devignette_io::ImageFormat;
use devignette_test::{RegParams, synthetic};

#[test]
fn asiv_reg_table() {
    let mut rp = RegParams::new("asiv_table");
    let options = AsivOptions::default();

    let img = synthetic::vignetted_gray(101, 101).unwrap();
    let (table, ratio) = asiv::estimate_table(&img, &options).unwrap();

    // 101 px reduced to 75 px: radii of a 75x75 image, one block per iteration
    rp.compare_values(75.0 / 101.0, ratio, 1e-12);
    let radii = ((37.0f64 * 37.0 * 2.0).sqrt() + 1.5) as usize;
    rp.compare_values((radii * options.iterations) as f64, table.len() as f64, 0.0);

    // Normalized at the center
    rp.compare_values(1.0, table.values()[0], 0.0);

    // Attenuation falls off toward the edge of the first block
    let first = &table.values()[..radii];
    rp.check(first[radii - 1] < first[0], "edge darker than center");
    rp.compare_values(0.6, first[radii - 1], 0.15);

    assert!(rp.cleanup(), "asiv_table regression test failed");
}

#[test]
fn asiv_reg_correct() {
    let mut rp = RegParams::new("asiv_correct");
    let options = AsivOptions::default();

    let img = synthetic::vignetted_rgb(101, 101).unwrap();
    let result = asiv::correct(&img, &options).unwrap();

    rp.check(
        result.corrected.dimensions() == img.dimensions()
            && result.corrected.channels() == img.channels(),
        "corrected image keeps its shape",
    );
    rp.check(
        result.corrected.std_dev() < 0.5 * img.std_dev(),
        "radial falloff flattened",
    );
    rp.check(result.corrected.mean() > img.mean(), "corners brightened");

    // Visualization: white at the center, darker toward the corners
    let est = &result.estimate;
    rp.check(est.dimensions() == (101, 101), "estimate at input size");
    rp.check(
        est.pixel(50, 50).unwrap()[0] > est.pixel(3, 3).unwrap()[0],
        "estimate darkens outward",
    );

    rp.write_buffer_and_check(&result.corrected, ImageFormat::Png)
        .unwrap();
    rp.write_buffer_and_check(&result.estimate, ImageFormat::Png)
        .unwrap();

    assert!(rp.cleanup(), "asiv_correct regression test failed");
}

#[test]
fn asiv_reg_saved_table() {
    let mut rp = RegParams::new("asiv_saved_table");
    let options = AsivOptions::default();

    let img = synthetic::vignetted_rgb(101, 101).unwrap();
    let fresh = asiv::correct(&img, &options).unwrap();

    // Persist, reload, and reuse the table
    let mut text = Vec::new();
    write_table(&fresh.table, &mut text).unwrap();
    let loaded = read_table(text.as_slice()).unwrap();
    rp.check(loaded == fresh.table, "table survives text round trip");

    let reused = asiv::correct_with_table(&img, loaded, &options).unwrap();
    rp.compare_buffers(&fresh.corrected, &reused.corrected);
    rp.compare_buffers(&fresh.estimate, &reused.estimate);

    rp.write_data_and_check(&text, "txt").unwrap();

    assert!(rp.cleanup(), "asiv_saved_table regression test failed");
}
