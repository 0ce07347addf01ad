//! Error types for tile decomposition and assignment.

use std::fmt;

use halo_core::IndexBox;

/// Errors from decomposing a domain or validating a tile layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecompositionError {
    /// The domain box has no cells.
    EmptyDomain {
        /// The offending box.
        domain: IndexBox,
    },
    /// `max_tile_size` must be at least 1.
    InvalidMaxTileSize {
        /// The value supplied.
        got: u32,
    },
    /// At least one worker is required.
    NoWorkers,
    /// A tile has a different dimension than the domain.
    DimensionMismatch {
        /// Index of the offending tile.
        tile: usize,
        /// The domain dimension.
        expected: usize,
        /// The tile dimension.
        got: usize,
    },
    /// A tile is empty or reaches outside the domain box.
    TileOutsideDomain {
        /// Index of the offending tile.
        tile: usize,
        /// The offending tile box.
        tile_box: IndexBox,
    },
    /// Two tiles share at least one cell.
    Overlap {
        /// Index of the first tile.
        first: usize,
        /// Index of the second tile.
        second: usize,
    },
    /// The tiles do not cover the whole domain.
    CoverageGap {
        /// Cells covered by the tiles.
        covered: usize,
        /// Cells in the domain.
        expected: usize,
    },
}

impl fmt::Display for DecompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain { domain } => write!(f, "domain box {domain} is empty"),
            Self::InvalidMaxTileSize { got } => {
                write!(f, "max tile size must be >= 1 (got {got})")
            }
            Self::NoWorkers => write!(f, "worker count must be >= 1"),
            Self::DimensionMismatch {
                tile,
                expected,
                got,
            } => write!(
                f,
                "tile {tile} is {got}-dimensional, domain is {expected}-dimensional"
            ),
            Self::TileOutsideDomain { tile, tile_box } => {
                write!(f, "tile {tile} {tile_box} is empty or outside the domain")
            }
            Self::Overlap { first, second } => {
                write!(f, "tiles {first} and {second} overlap")
            }
            Self::CoverageGap { covered, expected } => write!(
                f,
                "tiles cover {covered} cells, domain has {expected}"
            ),
        }
    }
}

impl std::error::Error for DecompositionError {}
