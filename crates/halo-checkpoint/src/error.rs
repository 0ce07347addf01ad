//! Error types for checkpoint write and read.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use halo_core::DomainError;
use halo_field::FieldError;
use halo_tiling::DecompositionError;

/// Errors that can occur while writing or reading a checkpoint.
///
/// Every variant is fatal to the run that hits it.
#[derive(Debug)]
pub enum CheckpointError {
    /// An I/O error, with the file or directory involved when known.
    Io {
        /// Path being accessed.
        path: Option<PathBuf>,
        /// Underlying error.
        source: io::Error,
    },
    /// No checkpoint exists for the requested step.
    NotFound {
        /// The requested step.
        step: u64,
        /// Where it was looked for.
        path: PathBuf,
    },
    /// A header or tile block does not start with the expected magic bytes.
    InvalidMagic {
        /// The magic that was expected.
        expected: [u8; 4],
        /// The bytes that were found.
        found: [u8; 4],
    },
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// The header could not be decoded or is internally inconsistent.
    MalformedHeader {
        /// What went wrong.
        detail: String,
    },
    /// A tile block could not be decoded.
    MalformedBlock {
        /// The tile whose block is bad.
        tile: usize,
        /// What went wrong.
        detail: String,
    },
    /// The number of tile blocks on disk differs from the header's tile count.
    TileCountMismatch {
        /// Tiles listed in the header.
        expected: usize,
        /// Tile blocks found.
        found: usize,
    },
    /// A tile block holds fewer values than its tile needs.
    Truncated {
        /// The affected tile.
        tile: usize,
        /// Values the tile interior needs.
        expected: usize,
        /// Values actually present.
        found: usize,
    },
    /// A tile block's stored checksum does not match its values.
    ChecksumMismatch {
        /// The affected tile.
        tile: usize,
        /// Checksum stored on disk.
        stored: u64,
        /// Checksum of the values read.
        computed: u64,
    },
    /// The header records a different step than the one requested.
    StepMismatch {
        /// The requested step.
        requested: u64,
        /// The step recorded in the header.
        stored: u64,
    },
    /// Checkpoints are numbered from step 1.
    InvalidStep {
        /// The rejected step.
        step: u64,
    },
    /// The stored domain is invalid.
    Domain(DomainError),
    /// The stored tile list does not partition the stored domain.
    Decomposition(DecompositionError),
    /// The field cannot be stored or rebuilt.
    Field(FieldError),
}

impl CheckpointError {
    /// Attach `path` to an I/O error that does not have one yet.
    pub fn at(self, path: &Path) -> Self {
        match self {
            Self::Io { path: None, source } => Self::Io {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path: Some(path),
                source,
            } => write!(f, "I/O error at {}: {source}", path.display()),
            Self::Io { path: None, source } => write!(f, "I/O error: {source}"),
            Self::NotFound { step, path } => {
                write!(f, "no checkpoint for step {step} at {}", path.display())
            }
            Self::InvalidMagic { expected, found } => write!(
                f,
                "invalid magic bytes {found:?} (expected {:?})",
                String::from_utf8_lossy(expected)
            ),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported checkpoint format version {found}")
            }
            Self::MalformedHeader { detail } => write!(f, "malformed checkpoint header: {detail}"),
            Self::MalformedBlock { tile, detail } => {
                write!(f, "malformed block for tile {tile}: {detail}")
            }
            Self::TileCountMismatch { expected, found } => write!(
                f,
                "header lists {expected} tiles but {found} tile blocks were found"
            ),
            Self::Truncated {
                tile,
                expected,
                found,
            } => write!(
                f,
                "tile {tile} block truncated: expected {expected} values, found {found}"
            ),
            Self::ChecksumMismatch {
                tile,
                stored,
                computed,
            } => write!(
                f,
                "tile {tile} checksum mismatch: stored={stored:#018x}, computed={computed:#018x}"
            ),
            Self::StepMismatch { requested, stored } => write!(
                f,
                "checkpoint for step {requested} records step {stored}"
            ),
            Self::InvalidStep { step } => {
                write!(f, "invalid checkpoint step {step} (steps start at 1)")
            }
            Self::Domain(e) => write!(f, "checkpoint domain: {e}"),
            Self::Decomposition(e) => write!(f, "checkpoint tile list: {e}"),
            Self::Field(e) => write!(f, "checkpoint field: {e}"),
        }
    }
}

impl std::error::Error for CheckpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Domain(e) => Some(e),
            Self::Decomposition(e) => Some(e),
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CheckpointError {
    fn from(source: io::Error) -> Self {
        Self::Io { path: None, source }
    }
}

impl From<DomainError> for CheckpointError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<DecompositionError> for CheckpointError {
    fn from(e: DecompositionError) -> Self {
        Self::Decomposition(e)
    }
}

impl From<FieldError> for CheckpointError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}
