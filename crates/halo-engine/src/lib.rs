//! Run configuration and the time-stepping loop for Halo simulations.
//!
//! [`Simulation`] ties the lower crates together. It decomposes the domain
//! (or restores a checkpoint), then repeats
//!
//! ```text
//! exchange ghosts → stencil → swap old/new → plot? → checkpoint?
//! ```
//!
//! for the configured number of steps. A run is described by a
//! [`RunConfig`], normally parsed from an inputs file through a
//! [`ParamTable`].
//!
//! # Restart
//!
//! With `restart > 0` the run reads checkpoint `restart` and continues at
//! step `restart + 1`. Runs that checkpoint and restart reproduce an
//! uninterrupted run bit for bit.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod initial;
pub mod metrics;
pub mod params;
pub mod simulation;
pub mod sink;

pub use config::{ConfigError, RunConfig};
pub use error::EngineError;
pub use initial::{gaussian_pulse, GAUSSIAN_WIDTH_SQ};
pub use metrics::{RunSummary, StepMetrics};
pub use params::ParamTable;
pub use simulation::{Simulation, StartKind};
pub use sink::{ChannelSink, NullSink, PlotFrame, PlotSink, SinkError};
