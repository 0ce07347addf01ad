//! Benchmark profiles for the Halo simulation framework.
//!
//! - [`reference_config`]: 256x256 periodic grid in 64x64 tiles
//! - [`stress_config`]: 64x64x64 periodic grid in 16x16x16 tiles

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use halo_engine::RunConfig;
use halo_tiling::AssignmentPolicy;

/// A 2-D reference run: 256x256 cells (64K) in 16 tiles over `workers`.
///
/// dt = 1e-6 is well inside the stability limit of 1/(4·256²) ≈ 3.8e-6.
/// Plotting and checkpointing are off.
pub fn reference_config(workers: usize) -> RunConfig {
    let mut config = RunConfig::new(256, 64, 1e-6);
    config.nsteps = 10;
    config.workers = workers.max(1);
    config
}

/// A 3-D stress run: 64³ cells (262K) in 64 tiles, load balanced.
pub fn stress_config(workers: usize) -> RunConfig {
    let mut config = RunConfig::new(64, 16, 1e-5);
    config.cells = vec![64; 3];
    config.prob_lo = vec![0.0; 3];
    config.prob_hi = vec![1.0; 3];
    config.periodic = vec![true; 3];
    config.nsteps = 5;
    config.workers = workers.max(1);
    config.assignment = AssignmentPolicy::LoadBalanced;
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        reference_config(4).validate().unwrap();
        stress_config(0).validate().unwrap();
        assert_eq!(stress_config(0).workers, 1);
    }

    #[test]
    fn reference_dt_is_stable() {
        let config = reference_config(1);
        let domain = config.domain().unwrap();
        assert!(config.dt < halo_stencil::max_stable_dt(&domain));
        let config = stress_config(1);
        assert!(config.dt < halo_stencil::max_stable_dt(&config.domain().unwrap()));
    }
}
