//! Error types for quaternion aggregation.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is [`AggregationError`].

use thiserror::Error;

/// Main error type for aggregation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// A sample set with no quaternions was passed to the aggregator.
    #[error("Empty sample set: at least one quaternion is required")]
    EmptySampleSet,

    /// No input series were passed to a series aggregation.
    #[error("No input series: at least one series is required")]
    NoSeries,

    /// An input series does not share the grid size of the first series.
    #[error("Grid size mismatch: series {series} has {actual} points, expected {expected}")]
    GridSizeMismatch {
        series: usize,
        expected: usize,
        actual: usize,
    },

    /// A sample has a NaN or infinite component.
    #[error("Sample {index} has a non-finite component")]
    NonFiniteQuaternion { index: usize },

    /// A sample has (numerically) zero norm and does not represent a rotation.
    #[error("Sample {index} has zero norm")]
    ZeroNorm { index: usize },

    /// A sample is not a unit quaternion and the strict input policy is active.
    #[error("Sample {index} is not normalized (norm = {norm})")]
    NotNormalized { index: usize, norm: f64 },

    /// Columns of a series have different lengths.
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A per-point aggregation failed inside a series aggregation.
    #[error("At grid point {row}: {source}")]
    AtGridPoint {
        row: usize,
        #[source]
        source: Box<AggregationError>,
    },
}

/// Result type alias for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregationError>;

impl AggregationError {
    /// Create a grid size mismatch error.
    #[must_use]
    pub const fn grid_size_mismatch(series: usize, expected: usize, actual: usize) -> Self {
        Self::GridSizeMismatch {
            series,
            expected,
            actual,
        }
    }

    /// Create a column length mismatch error.
    #[must_use]
    pub const fn column_length_mismatch(
        column: &'static str,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::ColumnLengthMismatch {
            column,
            expected,
            actual,
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Attach the grid index at which a per-point error occurred.
    #[must_use]
    pub fn at_grid_point(row: usize, source: Self) -> Self {
        Self::AtGridPoint {
            row,
            source: Box::new(source),
        }
    }

    /// The innermost error, with any grid-point context stripped.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::AtGridPoint { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
