//! Global simulation domain: index space, physical extents, periodicity.

use smallvec::SmallVec;

use crate::error::DomainError;
use crate::index::{IndexBox, IntVect, MAX_DIM};

/// Smallest supported domain dimension.
pub const MIN_DOMAIN_DIM: usize = 2;

/// The global rectangular region being simulated.
///
/// Immutable once constructed: cell counts, physical bounds and
/// periodicity never change during a run. The index space always starts
/// at the origin, so the domain box is `[0, N[d] - 1]` on every axis.
///
/// # Examples
///
/// ```
/// use halo_core::Domain;
///
/// let domain = Domain::unit(&[8, 8]).unwrap();
/// assert_eq!(domain.dim(), 2);
/// assert_eq!(domain.cell_size(0), 0.125);
/// assert!(domain.is_periodic(1));
///
/// let c = domain.cell_center(&[0, 7, 0]);
/// assert_eq!(c[0], 0.0625);
/// assert_eq!(c[1], 0.9375);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Domain {
    index_box: IndexBox,
    cells: [u32; MAX_DIM],
    prob_lo: [f64; MAX_DIM],
    prob_hi: [f64; MAX_DIM],
    periodic: [bool; MAX_DIM],
}

impl Domain {
    /// Build a domain from per-axis cell counts, physical bounds and
    /// periodicity flags. All slices must have the same length, which is
    /// the dimension (2 or 3).
    pub fn new(
        cells: &[u32],
        prob_lo: &[f64],
        prob_hi: &[f64],
        periodic: &[bool],
    ) -> Result<Self, DomainError> {
        let dim = cells.len();
        if !(MIN_DOMAIN_DIM..=MAX_DIM).contains(&dim) {
            return Err(DomainError::UnsupportedDimension {
                dim,
                min: MIN_DOMAIN_DIM,
                max: MAX_DIM,
            });
        }
        for (what, got) in [
            ("prob_lo", prob_lo.len()),
            ("prob_hi", prob_hi.len()),
            ("periodic", periodic.len()),
        ] {
            if got != dim {
                return Err(DomainError::ArgumentLength {
                    what,
                    expected: dim,
                    got,
                });
            }
        }

        let mut c = [1u32; MAX_DIM];
        let mut lo = [0.0; MAX_DIM];
        let mut hi = [1.0; MAX_DIM];
        let mut per = [false; MAX_DIM];
        for axis in 0..dim {
            if cells[axis] == 0 {
                return Err(DomainError::EmptyAxis { axis });
            }
            if cells[axis] > i32::MAX as u32 {
                return Err(DomainError::AxisTooLarge {
                    axis,
                    cells: cells[axis],
                });
            }
            let (l, h) = (prob_lo[axis], prob_hi[axis]);
            if !l.is_finite() || !h.is_finite() || l >= h {
                return Err(DomainError::InvalidBounds {
                    axis,
                    lower: l,
                    upper: h,
                });
            }
            c[axis] = cells[axis];
            lo[axis] = l;
            hi[axis] = h;
            per[axis] = periodic[axis];
        }

        Ok(Self {
            index_box: IndexBox::from_extent(cells),
            cells: c,
            prob_lo: lo,
            prob_hi: hi,
            periodic: per,
        })
    }

    /// The unit square (or cube), periodic on every axis.
    pub fn unit(cells: &[u32]) -> Result<Self, DomainError> {
        let dim = cells.len();
        Self::new(cells, &vec![0.0; dim], &vec![1.0; dim], &vec![true; dim])
    }

    /// Number of spatial dimensions (2 or 3).
    pub fn dim(&self) -> usize {
        self.index_box.dim()
    }

    /// The whole-domain index box.
    pub fn index_box(&self) -> &IndexBox {
        &self.index_box
    }

    /// Cells per axis.
    pub fn cells(&self) -> &[u32] {
        &self.cells[..self.dim()]
    }

    /// Lower physical bound per axis.
    pub fn prob_lo(&self) -> &[f64] {
        &self.prob_lo[..self.dim()]
    }

    /// Upper physical bound per axis.
    pub fn prob_hi(&self) -> &[f64] {
        &self.prob_hi[..self.dim()]
    }

    /// Periodicity flag per axis.
    pub fn periodicity(&self) -> &[bool] {
        &self.periodic[..self.dim()]
    }

    /// Whether `axis` wraps around. Inactive axes are never periodic.
    pub fn is_periodic(&self, axis: usize) -> bool {
        axis < self.dim() && self.periodic[axis]
    }

    /// Physical cell width along `axis`: `(hi - lo) / N`.
    pub fn cell_size(&self, axis: usize) -> f64 {
        (self.prob_hi[axis] - self.prob_lo[axis]) / f64::from(self.cells[axis])
    }

    /// `1 / Δ[d]²` for every active axis; zero on inactive axes.
    pub fn inv_cell_size_sq(&self) -> [f64; MAX_DIM] {
        let mut out = [0.0; MAX_DIM];
        for (axis, v) in out.iter_mut().enumerate().take(self.dim()) {
            let dx = self.cell_size(axis);
            *v = 1.0 / (dx * dx);
        }
        out
    }

    /// Physical coordinates of the center of cell `p`.
    pub fn cell_center(&self, p: &IntVect) -> [f64; MAX_DIM] {
        let mut x = [0.0; MAX_DIM];
        for (axis, v) in x.iter_mut().enumerate().take(self.dim()) {
            *v = self.prob_lo[axis] + (f64::from(p[axis]) + 0.5) * self.cell_size(axis);
        }
        x
    }

    /// Every periodic image offset of the domain, including the zero shift,
    /// which always comes first.
    ///
    /// Non-periodic axes contribute only a zero offset, so a fully
    /// non-periodic domain yields just `[0, 0, 0]`.
    pub fn periodic_shifts(&self) -> SmallVec<[IntVect; 27]> {
        let mut shifts: SmallVec<[IntVect; 27]> = SmallVec::new();
        shifts.push([0; MAX_DIM]);
        for axis in 0..self.dim() {
            if !self.periodic[axis] {
                continue;
            }
            let period = self.cells[axis] as i32;
            let existing = shifts.len();
            for i in 0..existing {
                for sign in [-1, 1] {
                    let mut s = shifts[i];
                    s[axis] = sign * period;
                    shifts.push(s);
                }
            }
        }
        shifts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_one_and_four_dimensions() {
        assert!(matches!(
            Domain::unit(&[8]),
            Err(DomainError::UnsupportedDimension { dim: 1, .. })
        ));
        assert!(matches!(
            Domain::unit(&[2, 2, 2, 2]),
            Err(DomainError::UnsupportedDimension { dim: 4, .. })
        ));
    }

    #[test]
    fn rejects_zero_cells() {
        assert_eq!(
            Domain::unit(&[8, 0]),
            Err(DomainError::EmptyAxis { axis: 1 })
        );
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = Domain::new(&[4, 4], &[0.0, 1.0], &[1.0, 1.0], &[true, true]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidBounds { axis: 1, .. }));
    }

    #[test]
    fn rejects_short_periodicity() {
        let err = Domain::new(&[4, 4], &[0.0, 0.0], &[1.0, 1.0], &[true]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ArgumentLength {
                what: "periodic",
                ..
            }
        ));
    }

    #[test]
    fn cell_size_uses_physical_extent() {
        let d = Domain::new(&[10, 4], &[-1.0, 0.0], &[1.0, 2.0], &[true, false]).unwrap();
        assert!((d.cell_size(0) - 0.2).abs() < 1e-15);
        assert_eq!(d.cell_size(1), 0.5);
        assert_eq!(d.inv_cell_size_sq()[1], 4.0);
        assert_eq!(d.inv_cell_size_sq()[2], 0.0);
    }

    #[test]
    fn shifts_fully_periodic_2d() {
        let d = Domain::unit(&[8, 4]).unwrap();
        let shifts = d.periodic_shifts();
        assert_eq!(shifts.len(), 9);
        assert_eq!(shifts[0], [0, 0, 0]);
        assert!(shifts.contains(&[-8, 4, 0]));
        assert!(shifts.contains(&[8, -4, 0]));
    }

    #[test]
    fn shifts_single_periodic_axis() {
        let d = Domain::new(&[4, 4], &[0.0; 2], &[1.0; 2], &[true, false]).unwrap();
        let shifts = d.periodic_shifts();
        assert_eq!(shifts.as_slice(), &[[0, 0, 0], [-4, 0, 0], [4, 0, 0]]);
    }

    #[test]
    fn shifts_fully_periodic_3d() {
        let d = Domain::unit(&[4, 4, 4]).unwrap();
        assert_eq!(d.periodic_shifts().len(), 27);
    }
}
