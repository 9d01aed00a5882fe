use thiserror::Error;

/// Configuration-level failures. All of these are raised before any grid
/// cell is counted; there is never a partial result.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("declared class count is {declared} but {supplied} class codes were supplied")]
    ClassCountMismatch { declared: usize, supplied: usize },

    #[error("duplicate class code {0} in class list")]
    DuplicateClass(i32),

    #[error("pixel resolution must be a positive finite number of metres, got {0}")]
    InvalidResolution(f64),

    #[error("cannot parse class code {0:?}")]
    BadClassToken(String),

    #[error("grid row {row} has {got} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("grid data holds {got} cells but dimensions are {width}x{height}")]
    CellCountMismatch {
        got: usize,
        width: usize,
        height: usize,
    },
}
