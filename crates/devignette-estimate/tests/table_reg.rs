//! Radial Table persistence regression test

use devignette_estimate::RadialTable;
use devignette_estimate::model::serial::{read_table, write_table};
use devignette_test::{RegParams, regout_dir};

#[test]
fn table_reg_roundtrip() {
    let mut rp = RegParams::new("table_roundtrip");

    let values = vec![
        1.0,
        0.999_999_999_999_9,
        0.1 + 0.2,
        std::f64::consts::FRAC_1_SQRT_2,
        1e-300,
        5e-324,
        123_456.789,
        0.0,
    ];
    let table = RadialTable::new(values.clone());

    let mut text = Vec::new();
    write_table(&table, &mut text).unwrap();
    let back = read_table(text.as_slice()).unwrap();
    rp.compare_values(values.len() as f64, back.len() as f64, 0.0);
    rp.check(
        back.values()
            .iter()
            .zip(&values)
            .all(|(a, b)| a.to_bits() == b.to_bits()),
        "values bit-identical after round trip",
    );

    // Through a file
    let path = format!("{}/table_roundtrip.txt", regout_dir());
    table.save(&path).unwrap();
    let loaded = RadialTable::load(&path).unwrap();
    rp.check(loaded == table, "file round trip");

    rp.write_data_and_check(&text, "txt").unwrap();

    assert!(rp.cleanup(), "table_roundtrip regression test failed");
}

#[test]
fn table_reg_errors() {
    assert!(read_table("1\nnot-a-number\n".as_bytes()).is_err());
    assert!(read_table("1\ninf\n".as_bytes()).is_err());
    assert!(RadialTable::load("/nonexistent/devignette/table.txt").is_err());
}
