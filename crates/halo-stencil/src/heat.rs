//! Forward-Euler heat equation stencil.

use halo_core::{Domain, MAX_DIM};
use halo_field::{for_each_cell, TileArray};

use crate::stencil::Stencil;

/// Explicit update of `∂φ/∂t = ∇²φ`:
///
/// ```text
/// new = old + dt · Σ_d (old[+1 in d] − 2·old + old[−1 in d]) / Δ[d]²
/// ```
///
/// applied to each component independently. No stability check is made;
/// see [`max_stable_dt`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatStencil {
    dt: f64,
}

impl HeatStencil {
    /// A heat stencil advancing by `dt` per application.
    pub fn new(dt: f64) -> Self {
        Self { dt }
    }

    /// Time step per application.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl Stencil for HeatStencil {
    fn name(&self) -> &str {
        "heat"
    }

    fn ghost_width(&self) -> u32 {
        1
    }

    fn max_dt(&self, domain: &Domain) -> Option<f64> {
        Some(max_stable_dt(domain))
    }

    fn apply_tile(
        &self,
        old: &TileArray,
        new: &mut TileArray,
        inv_dx2: &[f64; MAX_DIM],
        dim: usize,
    ) {
        let strides = old.strides();
        let valid = *old.valid_box();
        for comp in 0..old.components() {
            let src = old.component(comp);
            let dst = new.component_mut(comp);
            for_each_cell(&valid, |p| {
                let i = old.cell_offset(&p);
                let centre = src[i];
                let mut lap = 0.0;
                for d in 0..dim {
                    let s = strides[d];
                    lap += (src[i + s] - 2.0 * centre + src[i - s]) * inv_dx2[d];
                }
                dst[i] = centre + self.dt * lap;
            });
        }
    }
}

/// Largest stable forward-Euler step on `domain`: `1 / (2 Σ_d 1/Δ[d]²)`.
pub fn max_stable_dt(domain: &Domain) -> f64 {
    let sum: f64 = domain.inv_cell_size_sq().iter().sum();
    1.0 / (2.0 * sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::IndexBox;

    #[test]
    fn stable_dt_on_unit_square() {
        let d = Domain::unit(&[8, 8]).unwrap();
        // Δ = 1/8, Σ 1/Δ² = 128
        assert_eq!(max_stable_dt(&d), 1.0 / 256.0);
        assert_eq!(HeatStencil::new(0.1).max_dt(&d), Some(1.0 / 256.0));
    }

    #[test]
    fn single_tile_point_source() {
        let valid = IndexBox::from_extent(&[3, 3]);
        let mut old = TileArray::new(valid, 1, 1);
        let mut new = TileArray::new(valid, 1, 1);
        old.set(&[1, 1, 0], 0, 1.0);
        let inv = [1.0, 1.0, 0.0];
        HeatStencil::new(0.1).apply_tile(&old, &mut new, &inv, 2);
        assert_eq!(new.at(&[1, 1, 0], 0), 1.0 + 0.1 * -4.0);
        assert_eq!(new.at(&[0, 1, 0], 0), 0.1);
        assert_eq!(new.at(&[2, 1, 0], 0), 0.1);
        assert_eq!(new.at(&[0, 0, 0], 0), 0.0);
    }

    #[test]
    fn ghosts_of_new_are_not_written() {
        let valid = IndexBox::from_extent(&[2, 2]);
        let mut old = TileArray::new(valid, 1, 1);
        let mut new = TileArray::new(valid, 1, 1);
        old.fill(3.0);
        new.set(&[-1, 0, 0], 0, -7.0);
        HeatStencil::new(0.5).apply_tile(&old, &mut new, &[1.0, 1.0, 0.0], 2);
        assert_eq!(new.at(&[-1, 0, 0], 0), -7.0);
        assert_eq!(new.at(&[0, 0, 0], 0), 3.0);
    }

    #[test]
    fn components_update_independently() {
        let valid = IndexBox::from_extent(&[3, 3]);
        let mut old = TileArray::new(valid, 1, 2);
        let mut new = TileArray::new(valid, 1, 2);
        old.set(&[1, 1, 0], 1, 2.0);
        HeatStencil::new(0.25).apply_tile(&old, &mut new, &[1.0, 1.0, 0.0], 2);
        assert_eq!(new.at(&[1, 1, 0], 0), 0.0);
        assert_eq!(new.at(&[1, 1, 0], 1), 2.0 + 0.25 * -8.0);
    }
}
