//! Radial Table gain model
//!
//! A Radial Table holds one attenuation value per integer radius of the
//! (possibly downsampled) image it was estimated on. Lookups at
//! fractional radii interpolate between the two bracketing entries,
//! with the table treated as starting one radius in:
//!
//! - radius below 1 reads entry 0
//! - radius `n + d` (`1 <= n < len`) blends entries `n - 1` and `n`
//! - radius at or past the table end reads the last entry

/// Attenuation per integer radius
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadialTable {
    values: Vec<f64>,
}

impl RadialTable {
    /// Create a table from attenuation values in radius order
    pub fn new(values: Vec<f64>) -> Self {
        RadialTable { values }
    }

    /// Create an empty table
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attenuation values in radius order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable attenuation values
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Consume the table and return its values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entry at `index`, if present
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Interpolated attenuation at a (scaled) radius.
    ///
    /// An empty table attenuates nothing and returns 1.0.
    pub fn attenuation_at(&self, radius: f64) -> f64 {
        let len = self.values.len();
        if len == 0 {
            return 1.0;
        }

        let n = radius.max(0.0) as usize;
        if n == 0 {
            self.values[0]
        } else if n < len {
            let d = radius - n as f64;
            self.values[n - 1] * (1.0 - d) + self.values[n] * d
        } else {
            self.values[len - 1]
        }
    }

    /// Whether every entry is finite and strictly positive
    pub fn is_valid(&self) -> bool {
        !self.values.is_empty() && self.values.iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

impl From<Vec<f64>> for RadialTable {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation_lookup() {
        let t = RadialTable::new(vec![1.0, 0.8, 0.6]);
        assert_eq!(t.attenuation_at(0.0), 1.0);
        assert_eq!(t.attenuation_at(0.99), 1.0);
        assert_eq!(t.attenuation_at(1.0), 1.0);
        assert!((t.attenuation_at(1.5) - 0.9).abs() < 1e-12);
        assert!((t.attenuation_at(2.25) - 0.75).abs() < 1e-12);
        assert_eq!(t.attenuation_at(3.0), 0.6);
        assert_eq!(t.attenuation_at(100.0), 0.6);
    }

    #[test]
    fn test_empty_table_is_identity() {
        let t = RadialTable::empty();
        assert!(t.is_empty());
        assert_eq!(t.attenuation_at(5.0), 1.0);
        assert!(!t.is_valid());
    }

    #[test]
    fn test_validity() {
        assert!(RadialTable::new(vec![1.0, 0.5]).is_valid());
        assert!(!RadialTable::new(vec![1.0, 0.0]).is_valid());
        assert!(!RadialTable::new(vec![1.0, f64::NAN]).is_valid());
    }
}
