//! Seeded field fills and bitwise comparison.

use std::sync::Arc;

use halo_core::IntVect;
use halo_field::DistributedField;
use halo_tiling::TileDecomposition;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A zero-ghost-filled field whose interior holds uniform values in
/// `[-1, 1)`, reproducible from `seed`.
///
/// Values are drawn tile by tile in decomposition order, component-major,
/// x fastest.
pub fn random_field(
    layout: Arc<TileDecomposition>,
    components: usize,
    ghost: u32,
    seed: u64,
) -> DistributedField {
    let mut field =
        DistributedField::allocate(layout, components, ghost).expect("valid field shape");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for tile in 0..field.num_tiles() {
        let n = field.tile(tile).interior_len();
        let values: Vec<f64> = (0..n).map(|_| rng.random::<f64>() * 2.0 - 1.0).collect();
        field
            .load_interior(tile, &values)
            .expect("interior length matches");
    }
    field
}

/// Where two fields first differ.
#[derive(Clone, Debug, PartialEq)]
pub struct Difference {
    pub cell: IntVect,
    pub component: usize,
    pub left: f64,
    pub right: f64,
}

/// First interior cell (in tile order) whose bits differ between `a` and
/// `b`. Both fields must cover the same cells.
pub fn first_interior_difference(a: &DistributedField, b: &DistributedField) -> Option<Difference> {
    for tile in a.tiles() {
        for component in 0..tile.components() {
            for cell in tile.valid_box().cells() {
                let left = tile.at(&cell, component);
                let right = b
                    .interior_value(&cell, component)
                    .expect("fields cover the same cells");
                if left.to_bits() != right.to_bits() {
                    return Some(Difference {
                        cell,
                        component,
                        left,
                        right,
                    });
                }
            }
        }
    }
    None
}

/// Panic unless every interior value of `a` and `b` is bit-identical.
#[track_caller]
pub fn assert_interiors_bitwise_eq(a: &DistributedField, b: &DistributedField) {
    if let Some(d) = first_interior_difference(a, b) {
        panic!(
            "fields differ at {:?} component {}: {:e} vs {:e}",
            d.cell, d.component, d.left, d.right
        );
    }
}
