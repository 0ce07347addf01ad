//! Dense per-tile storage over a tile box grown by its ghost halo.

use halo_core::{IndexBox, IntVect, MAX_DIM};
use smallvec::SmallVec;

/// Storage for one tile: `components` scalars per cell over the tile's
/// valid box grown by `ghost` cells on every active axis.
///
/// Cells are addressed by **global** index. Data is laid out component
/// by component, x fastest within a component, so neighbouring cells
/// along axis `d` are [`strides()`](Self::strides)`[d]` apart.
///
/// # Examples
///
/// ```
/// use halo_core::IndexBox;
/// use halo_field::TileArray;
///
/// let valid = IndexBox::new(&[4, 0], &[7, 3]).unwrap();
/// let mut tile = TileArray::new(valid, 1, 2);
/// assert_eq!(tile.grown_box().lo(), [3, -1, 0]);
///
/// tile.set(&[4, 0, 0], 1, 2.5);
/// assert_eq!(tile.at(&[4, 0, 0], 1), 2.5);
/// assert_eq!(tile.get(&[9, 0, 0], 0), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TileArray {
    valid: IndexBox,
    grown: IndexBox,
    ghost: u32,
    components: usize,
    strides: [usize; MAX_DIM],
    cells: usize,
    data: Vec<f64>,
}

impl TileArray {
    /// Allocate a zero-filled tile.
    pub fn new(valid: IndexBox, ghost: u32, components: usize) -> Self {
        let grown = valid.grow(ghost);
        let mut strides = [0usize; MAX_DIM];
        let mut acc = 1usize;
        for (axis, s) in strides.iter_mut().enumerate() {
            *s = acc;
            acc *= grown.length(axis) as usize;
        }
        let cells = acc;
        Self {
            valid,
            grown,
            ghost,
            components,
            strides,
            cells,
            data: vec![0.0; cells * components],
        }
    }

    /// The tile's own (interior) cells.
    pub fn valid_box(&self) -> &IndexBox {
        &self.valid
    }

    /// The valid box grown by the ghost width: every addressable cell.
    pub fn grown_box(&self) -> &IndexBox {
        &self.grown
    }

    /// Ghost halo width.
    pub fn ghost_width(&self) -> u32 {
        self.ghost
    }

    /// Scalars stored per cell.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Offset between neighbouring cells along each axis.
    pub fn strides(&self) -> [usize; MAX_DIM] {
        self.strides
    }

    /// Offset of `p` within a component slice. `p` must lie in the grown box.
    #[inline]
    pub fn cell_offset(&self, p: &IntVect) -> usize {
        debug_assert!(self.grown.contains(p), "{p:?} outside {}", self.grown);
        let lo = self.grown.lo();
        (0..MAX_DIM)
            .map(|axis| (p[axis] - lo[axis]) as usize * self.strides[axis])
            .sum()
    }

    /// All values of component `comp`, grown box included.
    pub fn component(&self, comp: usize) -> &[f64] {
        &self.data[comp * self.cells..(comp + 1) * self.cells]
    }

    /// Mutable view of component `comp`, grown box included.
    pub fn component_mut(&mut self, comp: usize) -> &mut [f64] {
        &mut self.data[comp * self.cells..(comp + 1) * self.cells]
    }

    /// Value at `p`, or `None` if `p` is outside the grown box or `comp`
    /// is out of range.
    pub fn get(&self, p: &IntVect, comp: usize) -> Option<f64> {
        if comp >= self.components || !self.grown.contains(p) {
            return None;
        }
        Some(self.data[comp * self.cells + self.cell_offset(p)])
    }

    /// Mutable reference to the value at `p`, or `None` when out of range.
    pub fn get_mut(&mut self, p: &IntVect, comp: usize) -> Option<&mut f64> {
        if comp >= self.components || !self.grown.contains(p) {
            return None;
        }
        let idx = comp * self.cells + self.cell_offset(p);
        Some(&mut self.data[idx])
    }

    /// Value at `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` lies outside the grown box or `comp` is out of range.
    pub fn at(&self, p: &IntVect, comp: usize) -> f64 {
        match self.get(p, comp) {
            Some(v) => v,
            None => panic!("cell {p:?} component {comp} outside tile {}", self.grown),
        }
    }

    /// Overwrite the value at `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` lies outside the grown box or `comp` is out of range.
    pub fn set(&mut self, p: &IntVect, comp: usize, value: f64) {
        let grown = self.grown;
        match self.get_mut(p, comp) {
            Some(v) => *v = value,
            None => panic!("cell {p:?} component {comp} outside tile {grown}"),
        }
    }

    /// Every component at `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` lies outside the grown box.
    pub fn values(&self, p: &IntVect) -> SmallVec<[f64; 4]> {
        (0..self.components).map(|c| self.at(p, c)).collect()
    }

    /// Set every stored value, ghosts included.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Number of interior values across all components.
    pub fn interior_len(&self) -> usize {
        self.valid.num_cells() * self.components
    }

    /// Append the values of `region` for every component to `out`,
    /// component-major, x fastest.
    pub fn read_region(&self, region: &IndexBox, out: &mut Vec<f64>) {
        for comp in 0..self.components {
            let data = self.component(comp);
            out.extend(region.cells().map(|p| data[self.cell_offset(&p)]));
        }
    }

    /// Overwrite `region` from `values` laid out as by
    /// [`read_region`](Self::read_region). Returns how many values were used.
    pub fn write_region(&mut self, region: &IndexBox, values: &[f64]) -> usize {
        let n = region.num_cells();
        let mut used = 0;
        for comp in 0..self.components {
            let src = &values[comp * n..(comp + 1) * n];
            let offsets: Vec<usize> = region.cells().map(|p| self.cell_offset(&p)).collect();
            let data = self.component_mut(comp);
            for (off, &v) in offsets.into_iter().zip(src) {
                data[off] = v;
            }
            used += n;
        }
        used
    }

    /// Interior values, component-major, x fastest.
    pub fn interior_to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.interior_len());
        self.read_region(&self.valid, &mut out);
        out
    }

    /// Whether two tiles have the same boxes, ghost width and components.
    pub fn same_shape(&self, other: &TileArray) -> bool {
        self.valid == other.valid
            && self.ghost == other.ghost
            && self.components == other.components
    }

    /// Copy all values (ghosts included) from a same-shaped tile.
    pub(crate) fn copy_all_from(&mut self, other: &TileArray) {
        self.data.copy_from_slice(&other.data);
    }
}
