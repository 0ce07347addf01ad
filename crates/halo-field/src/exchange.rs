//! Ghost exchange: refresh every tile's halo from neighbour interiors.
//!
//! An [`ExchangePlan`] is computed once per layout. For each destination
//! tile it lists every piece of the grown tile box that overlaps another
//! tile's interior, directly or through a periodic image of the domain.
//! Executing the plan runs in two phases separated by a barrier:
//!
//! 1. every destination's source values are packed from the field, which
//!    is only read;
//! 2. the packed buffers are unpacked into the ghost cells.
//!
//! No interior value is written, and no ghost is written before every
//! read has finished, so the result does not depend on tile order or on
//! the execution backend.

use std::ops::Range;

use halo_core::{Domain, IndexBox, IntVect, MAX_DIM};
use halo_tiling::TileDecomposition;
use tracing::debug;

use crate::error::FieldError;
use crate::exec::Execution;
use crate::field::DistributedField;

/// One rectangular ghost fill: `dst[p] = src[p - shift]` for `p` in `region`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HaloCopy {
    /// Tile whose ghosts are written.
    pub dst_tile: usize,
    /// Tile whose interior is read.
    pub src_tile: usize,
    /// Ghost cells to fill, in destination (global) indices.
    pub region: IndexBox,
    /// Periodic image offset applied to the source tile.
    pub shift: IntVect,
}

impl HaloCopy {
    /// The cells read from the source tile.
    pub fn source_region(&self) -> IndexBox {
        self.region.shift(&negate(&self.shift))
    }
}

/// Precomputed ghost copies for one layout and ghost width.
#[derive(Clone, Debug)]
pub struct ExchangePlan {
    boxes: Vec<IndexBox>,
    ghost: u32,
    copies: Vec<HaloCopy>,
    by_dst: Vec<Range<usize>>,
}

impl ExchangePlan {
    /// Compute the copies that fill a ghost halo of width `ghost` around
    /// every tile of `layout`.
    ///
    /// Ghost cells beyond a non-periodic domain edge have no source and are
    /// left as they are. On periodic axes the halo must not be wider than
    /// the axis itself.
    pub fn build(
        layout: &TileDecomposition,
        domain: &Domain,
        ghost: u32,
    ) -> Result<Self, FieldError> {
        if layout.domain_box() != domain.index_box() {
            return Err(FieldError::ShapeMismatch {
                reason: format!(
                    "layout covers {} but domain is {}",
                    layout.domain_box(),
                    domain.index_box()
                ),
            });
        }
        for (axis, &cells) in domain.cells().iter().enumerate() {
            if domain.is_periodic(axis) && ghost > cells {
                return Err(FieldError::GhostTooWide { ghost, axis, cells });
            }
        }

        let shifts = domain.periodic_shifts();
        let boxes = layout.boxes();
        let mut copies = Vec::new();
        let mut by_dst = Vec::with_capacity(boxes.len());
        for (dst, dst_box) in boxes.iter().enumerate() {
            let start = copies.len();
            let grown = dst_box.grow(ghost);
            for shift in &shifts {
                let unshifted = *shift == [0; MAX_DIM];
                for (src, src_box) in boxes.iter().enumerate() {
                    if unshifted && src == dst {
                        continue;
                    }
                    if let Some(region) = grown.intersect(&src_box.shift(shift)) {
                        copies.push(HaloCopy {
                            dst_tile: dst,
                            src_tile: src,
                            region,
                            shift: *shift,
                        });
                    }
                }
            }
            by_dst.push(start..copies.len());
        }
        debug!(
            tiles = boxes.len(),
            ghost,
            copies = copies.len(),
            "built exchange plan"
        );
        Ok(Self {
            boxes: boxes.to_vec(),
            ghost,
            copies,
            by_dst,
        })
    }

    /// Ghost width the plan fills.
    pub fn ghost_width(&self) -> u32 {
        self.ghost
    }

    /// Every copy, grouped by destination tile.
    pub fn copies(&self) -> &[HaloCopy] {
        &self.copies
    }

    /// Copies that write into `tile`.
    pub fn copies_into(&self, tile: usize) -> &[HaloCopy] {
        &self.copies[self.by_dst[tile].clone()]
    }

    /// Fill every ghost cell of `field` from the current interiors.
    pub fn execute(&self, field: &mut DistributedField, exec: Execution) -> Result<(), FieldError> {
        if field.layout().boxes() != self.boxes.as_slice() {
            return Err(FieldError::DecompositionMismatch {
                expected_tiles: self.boxes.len(),
                actual_tiles: field.num_tiles(),
            });
        }
        if field.ghost_width() != self.ghost {
            return Err(FieldError::ShapeMismatch {
                reason: format!(
                    "plan fills {} ghost cells, field has {}",
                    self.ghost,
                    field.ghost_width()
                ),
            });
        }

        let layout = std::sync::Arc::clone(field.layout());

        // Phase 1: pack. The field is shared read-only.
        let buffers: Vec<Vec<f64>> = {
            let tiles = field.tiles();
            exec.map_tiles(&layout, |dst| {
                let mut buf = Vec::new();
                for copy in self.copies_into(dst) {
                    tiles[copy.src_tile].read_region(&copy.source_region(), &mut buf);
                }
                buf
            })
        };

        // Phase 2: unpack into ghosts. Only starts once every pack is done.
        exec.for_each_tile(&layout, field.tiles_mut(), |dst, tile| {
            let buf = &buffers[dst];
            let mut used = 0;
            for copy in self.copies_into(dst) {
                used += tile.write_region(&copy.region, &buf[used..]);
            }
        });
        Ok(())
    }
}

/// Refresh the ghosts of `field` over `layout` and `domain`.
///
/// Builds a fresh [`ExchangePlan`] on every call. Loops that exchange
/// repeatedly should build the plan once and call
/// [`ExchangePlan::execute`].
pub fn exchange(
    field: &mut DistributedField,
    layout: &TileDecomposition,
    domain: &Domain,
) -> Result<(), FieldError> {
    if !field.layout().same_tiles(layout) {
        return Err(FieldError::DecompositionMismatch {
            expected_tiles: layout.len(),
            actual_tiles: field.num_tiles(),
        });
    }
    ExchangePlan::build(layout, domain, field.ghost_width())?.execute(field, Execution::default())
}

fn negate(v: &IntVect) -> IntVect {
    [-v[0], -v[1], -v[2]]
}
