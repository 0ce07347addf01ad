//! Error types for domain and index-box construction.

use std::fmt;

/// Errors arising from constructing a [`Domain`](crate::Domain) or an
/// [`IndexBox`](crate::IndexBox).
#[derive(Clone, Debug, PartialEq)]
pub enum DomainError {
    /// The requested dimensionality is not supported.
    UnsupportedDimension {
        /// The dimension that was requested.
        dim: usize,
        /// Smallest supported dimension.
        min: usize,
        /// Largest supported dimension.
        max: usize,
    },
    /// Two per-axis argument lists disagree in length.
    ArgumentLength {
        /// Which argument was wrong (e.g. `"prob_lo"`).
        what: &'static str,
        /// Expected number of entries (the dimension).
        expected: usize,
        /// Number of entries supplied.
        got: usize,
    },
    /// An axis was given zero cells.
    EmptyAxis {
        /// The offending axis.
        axis: usize,
    },
    /// An axis has more cells than `i32` coordinates can address.
    AxisTooLarge {
        /// The offending axis.
        axis: usize,
        /// The requested cell count.
        cells: u32,
    },
    /// Physical bounds on an axis are non-finite or not strictly increasing.
    InvalidBounds {
        /// The offending axis.
        axis: usize,
        /// Lower physical bound.
        lower: f64,
        /// Upper physical bound.
        upper: f64,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDimension { dim, min, max } => {
                write!(f, "unsupported dimension {dim} (expected {min}..={max})")
            }
            Self::ArgumentLength {
                what,
                expected,
                got,
            } => write!(f, "{what} has {got} entries, expected {expected}"),
            Self::EmptyAxis { axis } => write!(f, "axis {axis} has zero cells"),
            Self::AxisTooLarge { axis, cells } => {
                write!(f, "axis {axis} has {cells} cells, exceeding i32::MAX")
            }
            Self::InvalidBounds { axis, lower, upper } => {
                write!(
                    f,
                    "invalid physical bounds on axis {axis}: [{lower}, {upper}]"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
