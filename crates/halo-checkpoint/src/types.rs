//! Data types stored in a checkpoint.

use halo_core::{Domain, IndexBox};
use halo_tiling::AssignmentPolicy;

/// Everything in a checkpoint except the tile values.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckpointHeader {
    /// Step the checkpoint was taken after.
    pub step: u64,
    /// Simulation time at that step.
    pub time: f64,
    /// The simulated domain.
    pub domain: Domain,
    /// Scalars per cell.
    pub components: u32,
    /// Ghost width of the field that was written.
    pub ghost: u32,
    /// Worker count of the writing run.
    pub worker_count: u32,
    /// Assignment policy of the writing run.
    pub policy: AssignmentPolicy,
    /// Tile boxes in decomposition order.
    pub tiles: Vec<IndexBox>,
}

/// The interior values of one tile, component-major, x fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct TileBlock {
    /// Index of the tile in decomposition order.
    pub tile: u32,
    /// Interior values.
    pub values: Vec<f64>,
}
