//! [`DistributedField`]: one ghost-padded array per tile.

use std::sync::Arc;

use halo_core::IntVect;
use halo_tiling::TileDecomposition;
use smallvec::SmallVec;

use crate::error::FieldError;
use crate::tile::TileArray;

/// A multi-component scalar field stored tile by tile.
///
/// The field shares its [`TileDecomposition`] through an `Arc`, so the
/// "old" and "new" buffers of a run point at the very same layout. Every
/// operation that combines two fields first checks that their tiles match.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use halo_core::IndexBox;
/// use halo_field::DistributedField;
/// use halo_tiling::{AssignmentPolicy, TileDecomposition};
///
/// let layout = Arc::new(
///     TileDecomposition::new(&IndexBox::from_extent(&[8, 8]), 4, 2, AssignmentPolicy::RoundRobin)
///         .unwrap(),
/// );
/// let mut field = DistributedField::allocate(layout, 1, 1).unwrap();
/// field.fill_interior(|p, _| f64::from(p[0]));
/// assert_eq!(field.interior_value(&[5, 2, 0], 0), Some(5.0));
/// assert_eq!(field.sum(0), 8.0 * 28.0);
/// ```
#[derive(Clone, Debug)]
pub struct DistributedField {
    layout: Arc<TileDecomposition>,
    components: usize,
    ghost: u32,
    tiles: Vec<TileArray>,
}

impl DistributedField {
    /// Allocate a zero-filled field with one array per tile.
    pub fn allocate(
        layout: Arc<TileDecomposition>,
        components: usize,
        ghost: u32,
    ) -> Result<Self, FieldError> {
        if components == 0 {
            return Err(FieldError::NoComponents);
        }
        let tiles = layout
            .boxes()
            .iter()
            .map(|bx| TileArray::new(*bx, ghost, components))
            .collect();
        Ok(Self {
            layout,
            components,
            ghost,
            tiles,
        })
    }

    /// The tile layout this field is stored over.
    pub fn layout(&self) -> &Arc<TileDecomposition> {
        &self.layout
    }

    /// Scalars per cell.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Ghost halo width.
    pub fn ghost_width(&self) -> u32 {
        self.ghost
    }

    /// Number of tiles.
    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// The array of `tile`.
    ///
    /// # Panics
    ///
    /// Panics if `tile` is out of range.
    pub fn tile(&self, tile: usize) -> &TileArray {
        &self.tiles[tile]
    }

    /// Mutable array of `tile`.
    ///
    /// # Panics
    ///
    /// Panics if `tile` is out of range.
    pub fn tile_mut(&mut self, tile: usize) -> &mut TileArray {
        &mut self.tiles[tile]
    }

    /// All tile arrays in decomposition order.
    pub fn tiles(&self) -> &[TileArray] {
        &self.tiles
    }

    /// Mutable tile arrays in decomposition order.
    pub fn tiles_mut(&mut self) -> &mut [TileArray] {
        &mut self.tiles
    }

    /// Every component of `tile` at global index `p`, which may be a ghost
    /// cell. `None` if the tile or cell is out of range.
    pub fn value_at(&self, tile: usize, p: &IntVect) -> Option<SmallVec<[f64; 4]>> {
        let t = self.tiles.get(tile)?;
        if !t.grown_box().contains(p) {
            return None;
        }
        Some(t.values(p))
    }

    /// Interior value at global index `p`, looked up in the tile that owns it.
    pub fn interior_value(&self, p: &IntVect, comp: usize) -> Option<f64> {
        self.tiles
            .iter()
            .find(|t| t.valid_box().contains(p))
            .and_then(|t| t.get(p, comp))
    }

    /// Set every interior value to `f(cell, component)`. Ghosts are untouched.
    pub fn fill_interior<F: Fn(&IntVect, usize) -> f64>(&mut self, f: F) {
        for tile in &mut self.tiles {
            let valid = *tile.valid_box();
            for comp in 0..tile.components() {
                for p in valid.cells() {
                    tile.set(&p, comp, f(&p, comp));
                }
            }
        }
    }

    /// Overwrite the interior of `tile` from values laid out as by
    /// [`TileArray::interior_to_vec`].
    pub fn load_interior(&mut self, tile: usize, values: &[f64]) -> Result<(), FieldError> {
        let count = self.tiles.len();
        let t = self
            .tiles
            .get_mut(tile)
            .ok_or(FieldError::TileOutOfRange { tile, count })?;
        let expected = t.interior_len();
        if values.len() != expected {
            return Err(FieldError::InteriorLength {
                tile,
                expected,
                got: values.len(),
            });
        }
        let valid = *t.valid_box();
        t.write_region(&valid, values);
        Ok(())
    }

    /// Check that `other` has the same tiles, components and ghost width.
    pub fn check_compatible(&self, other: &DistributedField) -> Result<(), FieldError> {
        if !self.layout.same_tiles(&other.layout) {
            return Err(FieldError::DecompositionMismatch {
                expected_tiles: self.layout.len(),
                actual_tiles: other.layout.len(),
            });
        }
        if self.components != other.components || self.ghost != other.ghost {
            return Err(FieldError::ShapeMismatch {
                reason: format!(
                    "{} components / ghost {} vs {} components / ghost {}",
                    self.components, self.ghost, other.components, other.ghost
                ),
            });
        }
        Ok(())
    }

    /// Deep copy every tile of `other` into `self`, ghosts included.
    pub fn copy_from(&mut self, other: &DistributedField) -> Result<(), FieldError> {
        self.check_compatible(other)?;
        for (dst, src) in self.tiles.iter_mut().zip(&other.tiles) {
            dst.copy_all_from(src);
        }
        Ok(())
    }

    /// Exchange contents with `other` without copying values.
    pub fn swap_with(&mut self, other: &mut DistributedField) -> Result<(), FieldError> {
        self.check_compatible(other)?;
        std::mem::swap(&mut self.tiles, &mut other.tiles);
        Ok(())
    }

    /// Rebind the field to a layout with the same tiles but different
    /// ownership.
    pub fn with_layout(mut self, layout: Arc<TileDecomposition>) -> Result<Self, FieldError> {
        if !self.layout.same_tiles(&layout) {
            return Err(FieldError::DecompositionMismatch {
                expected_tiles: layout.len(),
                actual_tiles: self.layout.len(),
            });
        }
        self.layout = layout;
        Ok(self)
    }

    /// Sum of component `comp` over all interior cells, in tile order.
    pub fn sum(&self, comp: usize) -> f64 {
        self.interior(comp).sum()
    }

    /// Smallest interior value of component `comp`.
    pub fn min(&self, comp: usize) -> f64 {
        self.interior(comp).fold(f64::INFINITY, f64::min)
    }

    /// Largest interior value of component `comp`.
    pub fn max(&self, comp: usize) -> f64 {
        self.interior(comp).fold(f64::NEG_INFINITY, f64::max)
    }

    fn interior(&self, comp: usize) -> impl Iterator<Item = f64> + '_ {
        self.tiles.iter().flat_map(move |t| {
            let data = t.component(comp);
            t.valid_box().cells().map(move |p| data[t.cell_offset(&p)])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::IndexBox;
    use halo_tiling::AssignmentPolicy;

    fn layout(max: u32) -> Arc<TileDecomposition> {
        Arc::new(
            TileDecomposition::new(
                &IndexBox::from_extent(&[8, 8]),
                max,
                2,
                AssignmentPolicy::RoundRobin,
            )
            .unwrap(),
        )
    }

    #[test]
    fn allocate_is_zeroed() {
        let f = DistributedField::allocate(layout(4), 2, 1).unwrap();
        assert_eq!(f.num_tiles(), 4);
        assert_eq!(f.sum(0), 0.0);
        assert_eq!(f.sum(1), 0.0);
        assert_eq!(f.value_at(0, &[-1, -1, 0]).unwrap().as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn zero_components_rejected() {
        assert!(matches!(
            DistributedField::allocate(layout(4), 0, 1),
            Err(FieldError::NoComponents)
        ));
    }

    #[test]
    fn copy_from_is_deep() {
        let mut a = DistributedField::allocate(layout(4), 1, 1).unwrap();
        let mut b = DistributedField::allocate(layout(4), 1, 1).unwrap();
        b.fill_interior(|p, _| f64::from(p[0] + 10 * p[1]));
        a.copy_from(&b).unwrap();
        b.fill_interior(|_, _| 0.0);
        assert_eq!(a.interior_value(&[3, 5, 0], 0), Some(53.0));
        assert_eq!(b.interior_value(&[3, 5, 0], 0), Some(0.0));
    }

    #[test]
    fn copy_from_rejects_other_decomposition() {
        let mut a = DistributedField::allocate(layout(4), 1, 1).unwrap();
        let b = DistributedField::allocate(layout(2), 1, 1).unwrap();
        assert_eq!(
            a.copy_from(&b),
            Err(FieldError::DecompositionMismatch {
                expected_tiles: 4,
                actual_tiles: 16
            })
        );
    }

    #[test]
    fn copy_from_rejects_other_ghost_width() {
        let mut a = DistributedField::allocate(layout(4), 1, 1).unwrap();
        let b = DistributedField::allocate(layout(4), 1, 2).unwrap();
        assert!(matches!(a.copy_from(&b), Err(FieldError::ShapeMismatch { .. })));
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a = DistributedField::allocate(layout(4), 1, 1).unwrap();
        let mut b = DistributedField::allocate(layout(4), 1, 1).unwrap();
        b.fill_interior(|_, _| 2.0);
        a.swap_with(&mut b).unwrap();
        assert_eq!(a.sum(0), 128.0);
        assert_eq!(b.sum(0), 0.0);
    }

    #[test]
    fn load_interior_checks_length() {
        let mut f = DistributedField::allocate(layout(4), 1, 1).unwrap();
        assert_eq!(
            f.load_interior(1, &[1.0; 3]),
            Err(FieldError::InteriorLength {
                tile: 1,
                expected: 16,
                got: 3
            })
        );
        assert_eq!(
            f.load_interior(9, &[]),
            Err(FieldError::TileOutOfRange { tile: 9, count: 4 })
        );
        f.load_interior(1, &[1.5; 16]).unwrap();
        assert_eq!(f.sum(0), 24.0);
    }

    #[test]
    fn with_layout_rebinds_ownership_only() {
        let original = layout(4);
        let moved = Arc::new(original.reassigned(3, AssignmentPolicy::LoadBalanced).unwrap());
        let f = DistributedField::allocate(original, 1, 1).unwrap();
        let f = f.with_layout(moved).unwrap();
        assert_eq!(f.layout().worker_count(), 3);
        let other = layout(2);
        assert!(f.with_layout(other).is_err());
    }

    #[test]
    fn min_max_over_interior_only() {
        let mut f = DistributedField::allocate(layout(4), 1, 1).unwrap();
        f.fill_interior(|p, _| f64::from(p[0] * p[1]));
        f.tile_mut(0).set(&[-1, -1, 0], 0, 1e9);
        assert_eq!(f.min(0), 0.0);
        assert_eq!(f.max(0), 49.0);
    }
}
