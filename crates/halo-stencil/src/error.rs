//! Errors from stencil application.

use std::error::Error;
use std::fmt;

use halo_field::FieldError;

/// Errors from [`advance`](crate::advance).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StencilError {
    /// The old and new fields do not share a layout or shape.
    Field(FieldError),
    /// The fields' ghost halo is narrower than the stencil reaches.
    GhostTooNarrow {
        /// Stencil name.
        stencil: String,
        /// Halo width the stencil reads.
        required: u32,
        /// Halo width of the fields.
        actual: u32,
    },
}

impl fmt::Display for StencilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(e) => write!(f, "stencil field error: {e}"),
            Self::GhostTooNarrow {
                stencil,
                required,
                actual,
            } => write!(
                f,
                "stencil '{stencil}' needs {required} ghost cells, field has {actual}"
            ),
        }
    }
}

impl Error for StencilError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            Self::GhostTooNarrow { .. } => None,
        }
    }
}

impl From<FieldError> for StencilError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}
