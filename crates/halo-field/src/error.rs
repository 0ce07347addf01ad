//! Error types for field storage and ghost exchange.

use std::fmt;

/// Errors from field allocation, copying and ghost exchange.
///
/// All of these indicate a caller bug (mismatched layouts or
/// out-of-range arguments) rather than a recoverable runtime condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// Two fields (or a field and a plan) were built over different tile
    /// decompositions.
    DecompositionMismatch {
        /// Tile count of the destination (or plan).
        expected_tiles: usize,
        /// Tile count of the source (or field).
        actual_tiles: usize,
    },
    /// Component count or ghost width differ between two fields.
    ShapeMismatch {
        /// Description of the mismatch.
        reason: String,
    },
    /// A field must have at least one component.
    NoComponents,
    /// The ghost halo is wider than a periodic axis, so a single periodic
    /// image cannot supply it.
    GhostTooWide {
        /// Requested ghost width.
        ghost: u32,
        /// The offending axis.
        axis: usize,
        /// Cells on that axis.
        cells: u32,
    },
    /// A tile index is past the end of the decomposition.
    TileOutOfRange {
        /// The requested tile.
        tile: usize,
        /// Number of tiles.
        count: usize,
    },
    /// Interior data supplied for a tile has the wrong length.
    InteriorLength {
        /// The tile being filled.
        tile: usize,
        /// Values the tile interior needs.
        expected: usize,
        /// Values supplied.
        got: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecompositionMismatch {
                expected_tiles,
                actual_tiles,
            } => write!(
                f,
                "decomposition mismatch: expected {expected_tiles} tiles, found {actual_tiles} \
                 (or same count with different boxes)"
            ),
            Self::ShapeMismatch { reason } => write!(f, "field shape mismatch: {reason}"),
            Self::NoComponents => write!(f, "field must have at least one component"),
            Self::GhostTooWide { ghost, axis, cells } => write!(
                f,
                "ghost width {ghost} exceeds the {cells} cells of periodic axis {axis}"
            ),
            Self::TileOutOfRange { tile, count } => {
                write!(f, "tile {tile} out of range (field has {count} tiles)")
            }
            Self::InteriorLength {
                tile,
                expected,
                got,
            } => write!(
                f,
                "tile {tile} interior needs {expected} values, got {got}"
            ),
        }
    }
}

impl std::error::Error for FieldError {}
