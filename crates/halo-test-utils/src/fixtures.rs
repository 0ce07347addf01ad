//! Standard domains and layouts.

use std::sync::Arc;

use halo_core::Domain;
use halo_tiling::{AssignmentPolicy, TileDecomposition};

/// The unit square with `n × n` cells, periodic on both axes.
pub fn periodic_square(n: u32) -> Domain {
    Domain::unit(&[n, n]).expect("valid unit square")
}

/// Decompose `domain` with round-robin ownership.
pub fn layout(domain: &Domain, max_tile_size: u32, workers: usize) -> Arc<TileDecomposition> {
    Arc::new(
        TileDecomposition::new(
            domain.index_box(),
            max_tile_size,
            workers,
            AssignmentPolicy::RoundRobin,
        )
        .expect("valid decomposition"),
    )
}
