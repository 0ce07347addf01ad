//! The [`Stencil`] trait and the tiled [`advance`] driver.

use std::sync::Arc;

use halo_core::{Domain, MAX_DIM};
use halo_field::{DistributedField, Execution, FieldError, TileArray};

use crate::error::StencilError;

/// A local update rule evaluated tile by tile.
///
/// Implementations read only the old tile (interior plus a halo of
/// [`ghost_width`](Stencil::ghost_width) cells) and write only the new
/// tile's interior. A tile's cells never depend on each other's new values,
/// so tiles and cells may be computed in any order.
pub trait Stencil: Send + Sync {
    /// Human-readable name for errors and logs.
    fn name(&self) -> &str;

    /// How many ghost cells the stencil reads on each side.
    fn ghost_width(&self) -> u32;

    /// Largest time step for which the update is numerically stable on
    /// `domain`, if the stencil has such a bound.
    ///
    /// Informational only: [`advance`] never checks it.
    fn max_dt(&self, _domain: &Domain) -> Option<f64> {
        None
    }

    /// Write the new interior of one tile.
    ///
    /// `old` and `new` have the same shape. `inv_dx2[d]` is `1 / Δ[d]²`
    /// for each of the first `dim` axes.
    fn apply_tile(
        &self,
        old: &TileArray,
        new: &mut TileArray,
        inv_dx2: &[f64; MAX_DIM],
        dim: usize,
    );
}

/// Apply `stencil` to every tile: `new` interior from `old`.
///
/// `old`'s ghosts must be current. Ghost cells of `new` are not written.
pub fn advance(
    stencil: &dyn Stencil,
    old: &DistributedField,
    new: &mut DistributedField,
    domain: &Domain,
    exec: Execution,
) -> Result<(), StencilError> {
    new.check_compatible(old)?;
    if old.layout().domain_box() != domain.index_box() {
        return Err(FieldError::ShapeMismatch {
            reason: format!(
                "field covers {} but domain is {}",
                old.layout().domain_box(),
                domain.index_box()
            ),
        }
        .into());
    }
    if old.ghost_width() < stencil.ghost_width() {
        return Err(StencilError::GhostTooNarrow {
            stencil: stencil.name().to_string(),
            required: stencil.ghost_width(),
            actual: old.ghost_width(),
        });
    }
    let inv_dx2 = domain.inv_cell_size_sq();
    let dim = domain.dim();
    let layout = Arc::clone(new.layout());
    exec.for_each_tile(&layout, new.tiles_mut(), |t, tile| {
        stencil.apply_tile(old.tile(t), tile, &inv_dx2, dim);
    });
    Ok(())
}
