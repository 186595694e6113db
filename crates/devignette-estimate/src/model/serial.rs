//! Radial Table text persistence
//!
//! One decimal value per line in table order, no header. Values are
//! written with the shortest representation that parses back to the
//! same `f64`, so a save/load cycle is exact.

use super::RadialTable;
use crate::{EstimateError, EstimateResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Write a table, one value per line
pub fn write_table<W: Write>(table: &RadialTable, mut writer: W) -> EstimateResult<()> {
    for v in table.values() {
        writeln!(writer, "{}", v)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a table written by [`write_table`].
///
/// Blank lines are skipped. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`EstimateError::TableFormat`] with the 1-based line number if a
/// line is not a finite, non-negative number.
pub fn read_table<R: BufRead>(reader: R) -> EstimateResult<RadialTable> {
    let mut values = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let v: f64 = text.parse().map_err(|_| EstimateError::TableFormat {
            line: i + 1,
            message: format!("not a number: '{}'", text),
        })?;
        if !v.is_finite() || v < 0.0 {
            return Err(EstimateError::TableFormat {
                line: i + 1,
                message: format!("value out of range: {}", v),
            });
        }
        values.push(v);
    }
    Ok(RadialTable::new(values))
}

impl RadialTable {
    /// Save the table to a text file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> EstimateResult<()> {
        let file = File::create(path)?;
        write_table(self, BufWriter::new(file))
    }

    /// Load a table from a text file
    pub fn load<P: AsRef<Path>>(path: P) -> EstimateResult<Self> {
        let file = File::open(path)?;
        read_table(BufReader::new(file))
    }
}
