//! The engine's top-level error type.

use std::error::Error;
use std::fmt;

use halo_checkpoint::CheckpointError;
use halo_core::DomainError;
use halo_field::FieldError;
use halo_stencil::StencilError;
use halo_tiling::DecompositionError;

use crate::config::ConfigError;
use crate::sink::SinkError;

/// Any error that ends a run.
#[derive(Debug)]
pub enum EngineError {
    /// The configuration is missing or invalid.
    Config(ConfigError),
    /// The configured domain is invalid.
    Domain(DomainError),
    /// The domain cannot be decomposed.
    Decomposition(DecompositionError),
    /// Field storage or ghost exchange failed.
    Field(FieldError),
    /// The stencil could not be applied.
    Stencil(StencilError),
    /// A checkpoint could not be written or read.
    Checkpoint(CheckpointError),
    /// The plot sink failed.
    Sink(SinkError),
    /// The checkpoint being restarted from does not fit the configuration.
    RestartMismatch {
        /// The checkpoint step.
        step: u64,
        /// What differs.
        reason: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Domain(e) => write!(f, "domain: {e}"),
            Self::Decomposition(e) => write!(f, "decomposition: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::Stencil(e) => write!(f, "stencil: {e}"),
            Self::Checkpoint(e) => write!(f, "checkpoint: {e}"),
            Self::Sink(e) => write!(f, "plot: {e}"),
            Self::RestartMismatch { step, reason } => {
                write!(f, "cannot restart from checkpoint {step}: {reason}")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Domain(e) => Some(e),
            Self::Decomposition(e) => Some(e),
            Self::Field(e) => Some(e),
            Self::Stencil(e) => Some(e),
            Self::Checkpoint(e) => Some(e),
            Self::Sink(e) => Some(e),
            Self::RestartMismatch { .. } => None,
        }
    }
}

macro_rules! from_error {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for EngineError {
                fn from(e: $ty) -> Self {
                    Self::$variant(e)
                }
            }
        )*
    };
}

from_error! {
    ConfigError => Config,
    DomainError => Domain,
    DecompositionError => Decomposition,
    FieldError => Field,
    StencilError => Stencil,
    CheckpointError => Checkpoint,
    SinkError => Sink,
}
