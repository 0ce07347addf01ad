//! Analytic initial condition for fresh runs.

use halo_core::Domain;
use halo_field::DistributedField;

/// `w²` in `φ = 1 + exp(-r² / w²)`.
pub const GAUSSIAN_WIDTH_SQ: f64 = 0.01;

/// Fill every interior cell (every component) with a Gaussian bump on a
/// unit background, `1 + exp(-r² / 0.01)`, where `r` is the distance from
/// the cell center to the domain center.
pub fn gaussian_pulse(field: &mut DistributedField, domain: &Domain) {
    let dim = domain.dim();
    let centre: Vec<f64> = (0..dim)
        .map(|axis| 0.5 * (domain.prob_lo()[axis] + domain.prob_hi()[axis]))
        .collect();
    field.fill_interior(|p, _| {
        let x = domain.cell_center(p);
        let r2: f64 = (0..dim).map(|axis| (x[axis] - centre[axis]).powi(2)).sum();
        1.0 + (-r2 / GAUSSIAN_WIDTH_SQ).exp()
    });
}
