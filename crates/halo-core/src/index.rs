//! Integer index vectors and inclusive index boxes.

use std::fmt;

use crate::error::DomainError;

/// Maximum supported spatial dimension.
pub const MAX_DIM: usize = 3;

/// A cell index. Axes past the owning box's dimension are always zero.
pub type IntVect = [i32; MAX_DIM];

/// An axis-aligned, inclusive range of cell indices `[lo, hi]`.
///
/// A box is empty when `hi < lo` on any active axis. Inactive axes
/// (`axis >= dim`) are pinned to `lo == hi == 0`, so loops over all three
/// axes visit each active cell exactly once.
///
/// # Examples
///
/// ```
/// use halo_core::IndexBox;
///
/// let bx = IndexBox::new(&[0, 0], &[7, 3]).unwrap();
/// assert_eq!(bx.dim(), 2);
/// assert_eq!(bx.length(0), 8);
/// assert_eq!(bx.length(1), 4);
/// assert_eq!(bx.num_cells(), 32);
///
/// let (lower, upper) = bx.bisect(0);
/// assert_eq!(lower.hi()[0], 3);
/// assert_eq!(upper.lo()[0], 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox {
    dim: usize,
    lo: IntVect,
    hi: IntVect,
}

impl IndexBox {
    /// Build a box from per-axis bounds. The dimension is `lo.len()`.
    pub fn new(lo: &[i32], hi: &[i32]) -> Result<Self, DomainError> {
        let dim = lo.len();
        if dim == 0 || dim > MAX_DIM {
            return Err(DomainError::UnsupportedDimension {
                dim,
                min: 1,
                max: MAX_DIM,
            });
        }
        if hi.len() != dim {
            return Err(DomainError::ArgumentLength {
                what: "hi",
                expected: dim,
                got: hi.len(),
            });
        }
        let mut l = [0; MAX_DIM];
        let mut h = [0; MAX_DIM];
        l[..dim].copy_from_slice(lo);
        h[..dim].copy_from_slice(hi);
        Ok(Self { dim, lo: l, hi: h })
    }

    /// Build a box from full-width vectors, zeroing the inactive axes.
    ///
    /// # Panics
    ///
    /// Panics if `dim` is zero or larger than [`MAX_DIM`].
    pub fn from_corners(dim: usize, mut lo: IntVect, mut hi: IntVect) -> Self {
        assert!(
            (1..=MAX_DIM).contains(&dim),
            "dimension {dim} out of range"
        );
        for axis in dim..MAX_DIM {
            lo[axis] = 0;
            hi[axis] = 0;
        }
        Self { dim, lo, hi }
    }

    /// Box covering `cells[d]` cells per axis, starting at the origin.
    ///
    /// # Panics
    ///
    /// Panics if `cells` is empty or longer than [`MAX_DIM`].
    pub fn from_extent(cells: &[u32]) -> Self {
        let dim = cells.len();
        let mut hi = [0; MAX_DIM];
        for (axis, &n) in cells.iter().enumerate() {
            hi[axis] = n as i32 - 1;
        }
        Self::from_corners(dim, [0; MAX_DIM], hi)
    }

    /// Number of active axes.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Lower corner (inclusive).
    pub fn lo(&self) -> IntVect {
        self.lo
    }

    /// Upper corner (inclusive).
    pub fn hi(&self) -> IntVect {
        self.hi
    }

    /// Number of cells along `axis`; zero when the box is empty on that axis.
    pub fn length(&self, axis: usize) -> u32 {
        let n = i64::from(self.hi[axis]) - i64::from(self.lo[axis]) + 1;
        n.max(0) as u32
    }

    /// Whether the box contains no cells.
    pub fn is_empty(&self) -> bool {
        (0..self.dim).any(|axis| self.hi[axis] < self.lo[axis])
    }

    /// Total number of cells.
    pub fn num_cells(&self) -> usize {
        (0..MAX_DIM).map(|axis| self.length(axis) as usize).product()
    }

    /// Whether `p` lies inside the box.
    pub fn contains(&self, p: &IntVect) -> bool {
        (0..MAX_DIM).all(|axis| self.lo[axis] <= p[axis] && p[axis] <= self.hi[axis])
    }

    /// Whether `other` lies entirely inside `self`. An empty `other` is
    /// contained in any box.
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        other.is_empty() || (self.contains(&other.lo) && self.contains(&other.hi))
    }

    /// Intersection of two boxes, or `None` if they do not overlap.
    pub fn intersect(&self, other: &IndexBox) -> Option<IndexBox> {
        let mut lo = [0; MAX_DIM];
        let mut hi = [0; MAX_DIM];
        for axis in 0..MAX_DIM {
            lo[axis] = self.lo[axis].max(other.lo[axis]);
            hi[axis] = self.hi[axis].min(other.hi[axis]);
            if hi[axis] < lo[axis] {
                return None;
            }
        }
        Some(Self {
            dim: self.dim,
            lo,
            hi,
        })
    }

    /// Grow the box by `g` cells on both sides of every active axis.
    ///
    /// Corners saturate at the `i32` range.
    pub fn grow(&self, g: u32) -> IndexBox {
        let g = i32::try_from(g).unwrap_or(i32::MAX);
        let mut out = *self;
        for axis in 0..self.dim {
            out.lo[axis] = out.lo[axis].saturating_sub(g);
            out.hi[axis] = out.hi[axis].saturating_add(g);
        }
        out
    }

    /// Translate the box by `shift`. Inactive components of `shift` are ignored.
    pub fn shift(&self, shift: &IntVect) -> IndexBox {
        let mut out = *self;
        for axis in 0..self.dim {
            out.lo[axis] += shift[axis];
            out.hi[axis] += shift[axis];
        }
        out
    }

    /// The longest active axis; ties resolve to the lowest axis index.
    pub fn longest_axis(&self) -> usize {
        let mut best = 0;
        for axis in 1..self.dim {
            if self.length(axis) > self.length(best) {
                best = axis;
            }
        }
        best
    }

    /// Split along `axis` into a lower half of `floor(len / 2)` cells and an
    /// upper half holding the rest.
    ///
    /// # Panics
    ///
    /// Panics if the box has fewer than two cells along `axis`.
    pub fn bisect(&self, axis: usize) -> (IndexBox, IndexBox) {
        let len = self.length(axis);
        assert!(len >= 2, "cannot bisect axis {axis} of length {len}");
        let cut = self.lo[axis] + (len / 2) as i32;
        let mut lower = *self;
        let mut upper = *self;
        lower.hi[axis] = cut - 1;
        upper.lo[axis] = cut;
        (lower, upper)
    }

    /// Iterate over every cell, x fastest.
    pub fn cells(&self) -> Cells {
        Cells {
            lo: self.lo,
            hi: self.hi,
            next: if self.is_empty() { None } else { Some(self.lo) },
        }
    }
}

impl fmt::Display for IndexBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.dim;
        write!(f, "({:?} {:?})", &self.lo[..d], &self.hi[..d])
    }
}

/// Iterator over the cells of an [`IndexBox`], x fastest.
#[derive(Clone, Debug)]
pub struct Cells {
    lo: IntVect,
    hi: IntVect,
    next: Option<IntVect>,
}

impl Iterator for Cells {
    type Item = IntVect;

    fn next(&mut self) -> Option<IntVect> {
        let current = self.next?;
        let mut p = current;
        self.next = None;
        for axis in 0..MAX_DIM {
            if p[axis] < self.hi[axis] {
                p[axis] += 1;
                self.next = Some(p);
                break;
            }
            p[axis] = self.lo[axis];
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_rejects_mismatched_lengths() {
        let err = IndexBox::new(&[0, 0], &[3]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ArgumentLength {
                what: "hi",
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn new_rejects_zero_and_four_dimensions() {
        assert!(IndexBox::new(&[], &[]).is_err());
        assert!(IndexBox::new(&[0; 4], &[1; 4]).is_err());
    }

    #[test]
    fn inactive_axes_count_as_one_cell() {
        let bx = IndexBox::from_extent(&[4, 4]);
        assert_eq!(bx.length(2), 1);
        assert_eq!(bx.num_cells(), 16);
    }

    #[test]
    fn grow_leaves_inactive_axis_alone() {
        let bx = IndexBox::from_extent(&[4, 4]).grow(1);
        assert_eq!(bx.lo(), [-1, -1, 0]);
        assert_eq!(bx.hi(), [4, 4, 0]);
    }

    #[test]
    fn huge_grow_saturates_instead_of_inverting() {
        let bx = IndexBox::from_extent(&[8, 8]).grow(3_000_000_000);
        assert_eq!(bx.lo(), [i32::MIN, i32::MIN, 0]);
        assert_eq!(bx.hi(), [i32::MAX, i32::MAX, 0]);
        assert!(!bx.is_empty());
    }

    #[test]
    fn empty_box_has_no_cells() {
        let bx = IndexBox::new(&[0, 3], &[4, 2]).unwrap();
        assert!(bx.is_empty());
        assert_eq!(bx.num_cells(), 0);
        assert_eq!(bx.cells().count(), 0);
    }

    #[test]
    fn cells_iterate_x_fastest() {
        let bx = IndexBox::new(&[1, 5], &[2, 6]).unwrap();
        let got: Vec<IntVect> = bx.cells().collect();
        assert_eq!(got, vec![[1, 5, 0], [2, 5, 0], [1, 6, 0], [2, 6, 0]]);
    }

    #[test]
    fn longest_axis_ties_pick_lowest() {
        let bx = IndexBox::from_extent(&[4, 4, 4]);
        assert_eq!(bx.longest_axis(), 0);
        let bx = IndexBox::from_extent(&[4, 6, 6]);
        assert_eq!(bx.longest_axis(), 1);
    }

    #[test]
    fn bisect_odd_length_puts_extra_cell_above() {
        let bx = IndexBox::from_extent(&[5, 2]);
        let (lower, upper) = bx.bisect(0);
        assert_eq!(lower.length(0), 2);
        assert_eq!(upper.length(0), 3);
        assert_eq!(lower.num_cells() + upper.num_cells(), bx.num_cells());
    }

    #[test]
    fn intersect_disjoint_is_none() {
        let a = IndexBox::new(&[0, 0], &[3, 3]).unwrap();
        let b = IndexBox::new(&[4, 0], &[7, 3]).unwrap();
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn display_shows_active_axes() {
        let bx = IndexBox::new(&[0, 1], &[2, 3]).unwrap();
        assert_eq!(bx.to_string(), "([0, 1] [2, 3])");
    }

    fn arb_box() -> impl Strategy<Value = IndexBox> {
        (
            prop::collection::vec(-20i32..20, 3),
            prop::collection::vec(0i32..10, 3),
            2usize..=3,
        )
            .prop_map(|(lo, ext, dim)| {
                let hi: Vec<i32> = lo.iter().zip(&ext).map(|(l, e)| l + e).collect();
                IndexBox::new(&lo[..dim], &hi[..dim]).unwrap()
            })
    }

    proptest! {
        #[test]
        fn intersection_is_contained_in_both(a in arb_box(), b in arb_box()) {
            prop_assume!(a.dim() == b.dim());
            if let Some(i) = a.intersect(&b) {
                prop_assert!(a.contains_box(&i));
                prop_assert!(b.contains_box(&i));
                for p in i.cells() {
                    prop_assert!(a.contains(&p) && b.contains(&p));
                }
            }
        }

        #[test]
        fn cells_visits_every_cell_once(bx in arb_box()) {
            let cells: Vec<IntVect> = bx.cells().collect();
            prop_assert_eq!(cells.len(), bx.num_cells());
            let mut dedup = cells.clone();
            dedup.sort();
            dedup.dedup();
            prop_assert_eq!(dedup.len(), cells.len());
        }
    }
}
