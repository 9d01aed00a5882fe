//! Per-class pixel counting and area aggregation.
//!
//! One histogram pass over the grid, then a lookup per requested code, so the
//! cost is O(cells + classes) rather than O(cells x classes).

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::grid::ClassGrid;

/// Ordered list of distinct class codes to report on. Output records follow
/// this order exactly; downstream table and chart writers iterate it as-is.
#[derive(Debug, Clone)]
pub struct ClassSpec {
    codes: Vec<i32>,
}

impl ClassSpec {
    /// Build a spec from an ordered code list. Duplicate codes are rejected:
    /// a duplicate would silently report the same class twice.
    pub fn new(codes: Vec<i32>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::with_capacity(codes.len());
        for &code in &codes {
            if !seen.insert(code) {
                return Err(ConfigError::DuplicateClass(code));
            }
        }
        Ok(Self { codes })
    }

    /// Like [`ClassSpec::new`], but first checks the caller-declared class
    /// count against the number of codes actually supplied. A mismatch fails
    /// the whole operation before any counting work happens.
    pub fn with_declared_count(codes: Vec<i32>, declared: usize) -> Result<Self, ConfigError> {
        if codes.len() != declared {
            return Err(ConfigError::ClassCountMismatch {
                declared,
                supplied: codes.len(),
            });
        }
        Self::new(codes)
    }

    /// Parse a comma-separated code list such as `"1, 2,3"`. Whitespace
    /// around tokens is ignored and empty segments are skipped; anything else
    /// that fails integer parsing is a configuration error.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Self::new(parse_codes(text)?)
    }

    /// Parse a comma-separated code list and enforce the declared count.
    pub fn parse_with_declared_count(text: &str, declared: usize) -> Result<Self, ConfigError> {
        Self::with_declared_count(parse_codes(text)?, declared)
    }

    pub fn codes(&self) -> &[i32] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn parse_codes(text: &str) -> Result<Vec<i32>, ConfigError> {
    let mut codes = Vec::new();
    for token in text.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let code: i32 = token
            .parse()
            .map_err(|_| ConfigError::BadClassToken(token.to_string()))?;
        codes.push(code);
    }
    Ok(codes)
}

/// Pixel resolution must be a positive finite number of metres.
pub fn validate_resolution(resolution_m: f64) -> Result<(), ConfigError> {
    if resolution_m.is_finite() && resolution_m > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidResolution(resolution_m))
    }
}

/// One output row: a requested class code, the number of grid cells carrying
/// it, and the corresponding ground area in square kilometres (4 decimals).
#[derive(Debug, Clone, PartialEq)]
pub struct AreaRecord {
    pub class: i32,
    pub pixel_count: u64,
    pub area_km2: f64,
}

/// Frequency table of every class code present in the grid. Counts over all
/// codes always sum to the grid's total cell count.
pub fn class_histogram(grid: &ClassGrid) -> HashMap<i32, u64> {
    let mut counts = HashMap::new();
    for code in grid.iter() {
        *counts.entry(code).or_insert(0u64) += 1;
    }
    counts
}

/// Count cells per requested class and scale counts to ground area.
///
/// `resolution_m` is the linear size of one cell in metres (square pixels),
/// so area per cell = resolution squared. Areas are reported in km2:
///   area_km2 = count * resolution_m^2 / 1_000_000
/// rounded to 4 decimal places, half away from zero.
///
/// Codes present in the grid but absent from `spec` are ignored; a requested
/// code absent from the grid yields a record with count 0 and area 0.0.
pub fn aggregate_areas(
    grid: &ClassGrid,
    spec: &ClassSpec,
    resolution_m: f64,
) -> Result<Vec<AreaRecord>, ConfigError> {
    validate_resolution(resolution_m)?;

    let counts = class_histogram(grid);
    let cell_area_m2 = resolution_m * resolution_m;

    Ok(spec
        .codes()
        .iter()
        .map(|&class| {
            let pixel_count = counts.get(&class).copied().unwrap_or(0);
            let area_km2 = round4(pixel_count as f64 * cell_area_m2 / 1_000_000.0);
            AreaRecord {
                class,
                pixel_count,
                area_km2,
            }
        })
        .collect())
}

/// Round to 4 decimal places, half away from zero.
fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn aggregate_counts_pixels_and_scales_to_km2() {
        // 2 cells of class 1 at 10 m pixels -> 200 m2 = 0.0002 km2;
        // 3 cells of class 2 -> 300 m2 = 0.0003 km2.
        let grid = ClassGrid::from_rows(vec![vec![1, 1, 2], vec![2, 2, 0]]).unwrap();
        let spec = ClassSpec::new(vec![1, 2]).unwrap();

        let records = aggregate_areas(&grid, &spec, 10.0).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].class, 1);
        assert_eq!(records[0].pixel_count, 2);
        assert_abs_diff_eq!(records[0].area_km2, 0.0002, epsilon = 1e-12);

        assert_eq!(records[1].class, 2);
        assert_eq!(records[1].pixel_count, 3);
        assert_abs_diff_eq!(records[1].area_km2, 0.0003, epsilon = 1e-12);
    }

    #[test]
    fn absent_class_yields_zero_record() {
        let grid = ClassGrid::new(4, 4, 0);
        let spec = ClassSpec::new(vec![5]).unwrap();

        let records = aggregate_areas(&grid, &spec, 30.0).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].class, 5);
        assert_eq!(records[0].pixel_count, 0);
        assert_eq!(records[0].area_km2, 0.0);
    }

    #[test]
    fn output_preserves_request_order() {
        let grid = ClassGrid::from_rows(vec![vec![3, 1, 2]]).unwrap();
        let spec = ClassSpec::new(vec![2, 3, 1]).unwrap();

        let records = aggregate_areas(&grid, &spec, 1.0).unwrap();
        let classes: Vec<i32> = records.iter().map(|r| r.class).collect();
        assert_eq!(classes, vec![2, 3, 1]);
    }

    #[test]
    fn histogram_counts_sum_to_cell_count() {
        let grid = ClassGrid::from_rows(vec![vec![1, 1, 2], vec![2, 2, 0], vec![7, 7, 7]]).unwrap();
        let counts = class_histogram(&grid);
        let total: u64 = counts.values().sum();
        assert_eq!(total, grid.cells() as u64);
        assert_eq!(counts[&7], 3);
        assert_eq!(counts[&0], 1);
    }

    #[test]
    fn empty_grid_succeeds_with_zero_counts() {
        let grid = ClassGrid::from_rows(Vec::new()).unwrap();
        let spec = ClassSpec::new(vec![1, 2]).unwrap();

        let records = aggregate_areas(&grid, &spec, 10.0).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.pixel_count == 0));
        assert!(records.iter().all(|r| r.area_km2 == 0.0));
    }

    #[test]
    fn area_is_zero_iff_count_is_zero() {
        let grid = ClassGrid::from_rows(vec![vec![1, 0, 0, 0]]).unwrap();
        let spec = ClassSpec::new(vec![1, 9]).unwrap();

        let records = aggregate_areas(&grid, &spec, 30.0).unwrap();
        assert!(records[0].pixel_count > 0 && records[0].area_km2 > 0.0);
        assert!(records[1].pixel_count == 0 && records[1].area_km2 == 0.0);
    }

    #[test]
    fn duplicate_class_codes_rejected() {
        let err = ClassSpec::new(vec![1, 1]).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateClass(1));

        let err = ClassSpec::with_declared_count(vec![1, 1], 2).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateClass(1));
    }

    #[test]
    fn declared_count_mismatch_fails_before_counting() {
        let err = ClassSpec::with_declared_count(vec![1, 2], 3).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ClassCountMismatch {
                declared: 3,
                supplied: 2
            }
        );
    }

    #[test]
    fn non_positive_resolution_rejected() {
        let grid = ClassGrid::new(2, 2, 1);
        let spec = ClassSpec::new(vec![1]).unwrap();

        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = aggregate_areas(&grid, &spec, bad).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidResolution(_)), "{bad}");
        }
    }

    #[test]
    fn parse_tolerates_whitespace_and_empty_segments() {
        let spec = ClassSpec::parse(" 1, 2 ,,3 ").unwrap();
        assert_eq!(spec.codes(), &[1, 2, 3]);
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        let err = ClassSpec::parse("1,two,3").unwrap_err();
        assert_eq!(err, ConfigError::BadClassToken("two".to_string()));
    }

    #[test]
    fn parse_rejects_duplicates() {
        let err = ClassSpec::parse("4,4").unwrap_err();
        assert_eq!(err, ConfigError::DuplicateClass(4));
    }

    #[test]
    fn parse_with_declared_count_checks_list_length() {
        let spec = ClassSpec::parse_with_declared_count("1,2,3", 3).unwrap();
        assert_eq!(spec.len(), 3);

        let err = ClassSpec::parse_with_declared_count("1,2", 3).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ClassCountMismatch {
                declared: 3,
                supplied: 2
            }
        );
    }

    #[test]
    fn round4_rounds_to_fourth_decimal() {
        assert_abs_diff_eq!(round4(0.000_26), 0.0003, epsilon = 1e-12);
        assert_abs_diff_eq!(round4(-0.000_26), -0.0003, epsilon = 1e-12);
        assert_abs_diff_eq!(round4(0.123_44), 0.1234, epsilon = 1e-12);
        assert_abs_diff_eq!(round4(1.0 / 3.0), 0.3333, epsilon = 1e-12);
    }
}
