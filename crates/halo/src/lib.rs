//! Halo: tiled structured-grid stencil simulation with ghost-cell exchange
//! and checkpoint/restart.
//!
//! This is the facade crate that re-exports the public API of every Halo
//! sub-crate.
//!
//! # Quick start
//!
//! ```rust
//! use halo::prelude::*;
//!
//! // 32x32 periodic unit square, tiles of at most 16 cells per side.
//! let mut config = RunConfig::new(32, 16, 1e-5);
//! config.nsteps = 5;
//! config.plot_int = 5;
//!
//! let (mut sink, frames) = ChannelSink::unbounded();
//! let mut sim = Simulation::new(config).unwrap();
//! let summary = sim.run(&mut sink).unwrap();
//!
//! assert_eq!(summary.final_step, 5);
//! assert_eq!(sim.layout().len(), 4);
//! // Step 0 and step 5 were plotted.
//! assert_eq!(frames.try_iter().count(), 2);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`grid`] | `halo-core` | Index boxes and the physical domain |
//! | [`tiling`] | `halo-tiling` | Domain decomposition and tile assignment |
//! | [`field`] | `halo-field` | Tile storage, distributed fields, ghost exchange |
//! | [`stencil`] | `halo-stencil` | The stencil trait and the heat stencil |
//! | [`checkpoint`] | `halo-checkpoint` | On-disk checkpoints |
//! | [`engine`] | `halo-engine` | Run configuration and the time-stepping loop |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Index boxes and the physical domain (`halo-core`).
pub use halo_core as grid;

/// Domain decomposition into tiles and tile-to-worker assignment
/// (`halo-tiling`).
pub use halo_tiling as tiling;

/// Tile storage, distributed fields and ghost exchange (`halo-field`).
///
/// [`field::ExchangePlan`] precomputes every halo copy for a layout;
/// [`field::Execution`] picks serial or parallel per-tile execution.
pub use halo_field as field;

/// The [`stencil::Stencil`] trait and [`stencil::HeatStencil`]
/// (`halo-stencil`).
pub use halo_stencil as stencil;

/// On-disk checkpoints (`halo-checkpoint`).
pub use halo_checkpoint as checkpoint;

/// Run configuration and the time-stepping loop (`halo-engine`).
pub use halo_engine as engine;

/// Common imports for typical Halo usage.
///
/// ```rust
/// use halo::prelude::*;
/// ```
pub mod prelude {
    // Geometry
    pub use halo_core::{Domain, IndexBox, IntVect};

    // Tiling
    pub use halo_tiling::{AssignmentPolicy, TileDecomposition, WorkerId};

    // Fields
    pub use halo_field::{DistributedField, Execution, ExchangePlan, TileArray};

    // Stencils
    pub use halo_stencil::{advance, HeatStencil, Stencil};

    // Checkpoints
    pub use halo_checkpoint::CheckpointStore;

    // Engine
    pub use halo_engine::{
        ChannelSink, EngineError, NullSink, ParamTable, PlotFrame, PlotSink, RunConfig,
        RunSummary, Simulation, StepMetrics,
    };
}
