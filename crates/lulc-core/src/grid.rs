use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A 2D classified raster storing one integer class code per cell, row-major.
/// Codes are opaque to this crate; a no-data code is just another class that
/// callers leave out of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassGrid {
    /// Row-major class codes.
    pub data: Vec<i32>,
    pub width: usize,
    pub height: usize,
}

impl ClassGrid {
    /// Create a new ClassGrid filled with the given code.
    pub fn new(width: usize, height: usize, fill: i32) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
        }
    }

    /// Build a grid from already-flattened data, checking that the cell count
    /// matches the stated dimensions (deserialized grids come through here).
    pub fn from_parts(data: Vec<i32>, width: usize, height: usize) -> Result<Self, ConfigError> {
        if data.len() != width * height {
            return Err(ConfigError::CellCountMismatch {
                got: data.len(),
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Build a grid from nested rows. Every row must have the same width;
    /// an empty row list is a valid 0x0 grid.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, ConfigError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(width * height);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width {
                return Err(ConfigError::RaggedRows {
                    row,
                    got: cells.len(),
                    expected: width,
                });
            }
            data.extend(cells);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, code: i32) {
        self.data[row * self.width + col] = code;
    }

    /// Total cell count.
    pub fn cells(&self) -> usize {
        self.data.len()
    }

    /// Iterate over all cell codes in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.data.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_row_major_order() {
        let grid = ClassGrid::from_rows(vec![vec![1, 1, 2], vec![2, 2, 0]]).unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.get(0, 2), 2);
        assert_eq!(grid.get(1, 0), 2);
        assert_eq!(grid.cells(), 6);
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = ClassGrid::from_rows(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::RaggedRows {
                row: 1,
                got: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn from_rows_empty_is_valid() {
        let grid = ClassGrid::from_rows(Vec::new()).unwrap();
        assert_eq!(grid.cells(), 0);
    }

    #[test]
    fn from_parts_rejects_bad_cell_count() {
        let err = ClassGrid::from_parts(vec![1, 2, 3], 2, 2).unwrap_err();
        assert_eq!(
            err,
            ConfigError::CellCountMismatch {
                got: 3,
                width: 2,
                height: 2
            }
        );
    }
}
