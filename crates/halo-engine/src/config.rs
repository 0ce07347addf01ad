//! Run configuration, validation, and error types.
//!
//! [`RunConfig`] is built once from a [`ParamTable`] and never changes
//! during a run. [`validate()`](RunConfig::validate) enforces every
//! constraint that must hold before any simulation work starts.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use halo_core::{Domain, MAX_DIM};
use halo_field::Execution;
use halo_tiling::AssignmentPolicy;

use crate::params::ParamTable;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while reading or validating a run configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required parameter is absent.
    Missing {
        /// The parameter name.
        key: String,
    },
    /// A parameter value could not be parsed.
    Parse {
        /// The parameter name.
        key: String,
        /// The raw text.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// A parameter parsed but is out of range or inconsistent.
    Invalid {
        /// The parameter name.
        key: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A line of an inputs file is not a `key = value` assignment.
    Malformed {
        /// 1-based line number, or 0 for a command-line override.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// The inputs file could not be read.
    Unreadable {
        /// The file.
        path: PathBuf,
        /// Why it could not be read.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "missing required parameter '{key}'"),
            Self::Parse { key, value, reason } => {
                write!(f, "cannot parse '{value}' for '{key}': {reason}")
            }
            Self::Invalid { key, reason } => write!(f, "invalid '{key}': {reason}"),
            Self::Malformed { line: 0, text } => {
                write!(f, "override '{text}' is not of the form key=value")
            }
            Self::Malformed { line, text } => {
                write!(f, "line {line}: '{text}' is not of the form key = value")
            }
            Self::Unreadable { path, reason } => {
                write!(f, "cannot read inputs file {}: {reason}", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.into(),
    }
}

// ── RunConfig ──────────────────────────────────────────────────────

/// Everything needed to run one simulation.
///
/// `plot_int`, `chk_int` and `restart` keep the inputs-file convention:
/// a value `<= 0` disables the feature.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Cells per axis; its length is the dimension.
    pub cells: Vec<u32>,
    /// Largest tile extent on any axis.
    pub max_grid_size: u32,
    /// Time step.
    pub dt: f64,
    /// Steps to run in total, counted from step 0 of a fresh run.
    pub nsteps: u64,
    /// Plot every `plot_int` steps when positive.
    pub plot_int: i64,
    /// Checkpoint every `chk_int` steps when positive.
    pub chk_int: i64,
    /// Checkpoint step to restart from when positive.
    pub restart: i64,
    /// Lower physical bound per axis.
    pub prob_lo: Vec<f64>,
    /// Upper physical bound per axis.
    pub prob_hi: Vec<f64>,
    /// Periodicity per axis.
    pub periodic: Vec<bool>,
    /// Scalars per cell.
    pub components: usize,
    /// Ghost halo width.
    pub ghost: u32,
    /// Workers tiles are assigned across.
    pub workers: usize,
    /// Tile assignment policy.
    pub assignment: AssignmentPolicy,
    /// Run each worker's tiles as a parallel task.
    pub parallel: bool,
    /// Directory holding checkpoints.
    pub chk_dir: PathBuf,
    /// Checkpoint directory name prefix.
    pub chk_prefix: String,
}

impl RunConfig {
    /// A 2-D, single-component, periodic unit-square run with the
    /// inputs-file defaults for everything but the required values.
    pub fn new(n_cell: u32, max_grid_size: u32, dt: f64) -> Self {
        Self {
            cells: vec![n_cell; 2],
            max_grid_size,
            dt,
            nsteps: 10,
            plot_int: -1,
            chk_int: -1,
            restart: -1,
            prob_lo: vec![0.0; 2],
            prob_hi: vec![1.0; 2],
            periodic: vec![true; 2],
            components: 1,
            ghost: 1,
            workers: default_workers(),
            assignment: AssignmentPolicy::RoundRobin,
            parallel: true,
            chk_dir: PathBuf::from("."),
            chk_prefix: "chk".to_string(),
        }
    }

    /// Read a configuration from parsed parameters and validate it.
    ///
    /// `n_cell`, `max_grid_size` and `dt` are required. `n_cell` may give
    /// one value for every axis or one value per axis.
    pub fn from_params(params: &ParamTable) -> Result<Self, ConfigError> {
        let n_cell: Vec<u32> = params.get_list("n_cell")?;
        let dim = params.query("dim", if n_cell.len() > 1 { n_cell.len() } else { 2 })?;
        if !(2..=MAX_DIM).contains(&dim) {
            return Err(invalid("dim", format!("{dim} is not 2 or 3")));
        }
        let cells = match n_cell.as_slice() {
            [n] => vec![*n; dim],
            many if many.len() == dim => many.to_vec(),
            many => {
                return Err(invalid(
                    "n_cell",
                    format!("{} values for a {dim}-D domain", many.len()),
                ))
            }
        };

        let config = Self {
            cells,
            max_grid_size: params.get("max_grid_size")?,
            dt: params.get("dt")?,
            nsteps: params.query("nsteps", 10)?,
            plot_int: params.query("plot_int", -1)?,
            chk_int: params.query("chk_int", -1)?,
            restart: params.query("restart", -1)?,
            prob_lo: params.query_list("prob_lo", vec![0.0; dim])?,
            prob_hi: params.query_list("prob_hi", vec![1.0; dim])?,
            periodic: params
                .query_list::<i32>("is_periodic", vec![1; dim])?
                .into_iter()
                .map(|p| p != 0)
                .collect(),
            components: params.query("ncomp", 1)?,
            ghost: params.query("nghost", 1)?,
            workers: params.query("workers", default_workers())?,
            assignment: params.query("assignment", AssignmentPolicy::RoundRobin)?,
            parallel: params.query::<i32>("parallel", 1)? != 0,
            chk_dir: params.query("chk_dir", PathBuf::from("."))?,
            chk_prefix: params.query("chk_prefix", "chk".to_string())?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every constraint a run relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dim = self.cells.len();
        if !(2..=MAX_DIM).contains(&dim) {
            return Err(invalid("n_cell", format!("{dim}-D domains are not supported")));
        }
        if let Some(axis) = self.cells.iter().position(|&n| n == 0) {
            return Err(invalid("n_cell", format!("axis {axis} has no cells")));
        }
        if self.max_grid_size == 0 {
            return Err(invalid("max_grid_size", "must be at least 1"));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(invalid("dt", format!("{} is not a positive time step", self.dt)));
        }
        for (key, len) in [
            ("prob_lo", self.prob_lo.len()),
            ("prob_hi", self.prob_hi.len()),
            ("is_periodic", self.periodic.len()),
        ] {
            if len != dim {
                return Err(invalid(key, format!("{len} values for a {dim}-D domain")));
            }
        }
        for axis in 0..dim {
            let (lo, hi) = (self.prob_lo[axis], self.prob_hi[axis]);
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(invalid(
                    "prob_hi",
                    format!("axis {axis} bounds [{lo}, {hi}] are empty or not finite"),
                ));
            }
        }
        if self.components == 0 {
            return Err(invalid("ncomp", "must be at least 1"));
        }
        if self.ghost == 0 {
            return Err(invalid("nghost", "the stencil needs at least 1 ghost cell"));
        }
        for axis in 0..dim {
            if self.ghost > self.cells[axis] {
                return Err(invalid(
                    "nghost",
                    format!(
                        "{} ghost cells exceed the {} cells of axis {axis}",
                        self.ghost, self.cells[axis]
                    ),
                ));
            }
        }
        if self.workers == 0 {
            return Err(invalid("workers", "must be at least 1"));
        }
        if u32::try_from(self.workers).is_err() {
            return Err(invalid("workers", format!("{} exceeds {}", self.workers, u32::MAX)));
        }
        if self.chk_prefix.is_empty() {
            return Err(invalid("chk_prefix", "must not be empty"));
        }
        Ok(())
    }

    /// Build the domain this configuration describes.
    pub fn domain(&self) -> Result<Domain, halo_core::DomainError> {
        Domain::new(&self.cells, &self.prob_lo, &self.prob_hi, &self.periodic)
    }

    /// The restart step, or `None` for a fresh run.
    pub fn restart_step(&self) -> Option<u64> {
        (self.restart > 0).then_some(self.restart as u64)
    }

    /// Whether step `step` is plotted.
    pub fn plots_at(&self, step: u64) -> bool {
        self.plot_int > 0 && step % self.plot_int as u64 == 0
    }

    /// Whether a checkpoint is written after step `step`.
    pub fn checkpoints_at(&self, step: u64) -> bool {
        self.chk_int > 0 && step % self.chk_int as u64 == 0
    }

    /// The execution backend.
    pub fn execution(&self) -> Execution {
        Execution::from_flag(self.parallel)
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(text: &str) -> ParamTable {
        ParamTable::parse(text).unwrap()
    }

    #[test]
    fn defaults_follow_inputs_conventions() {
        let c = RunConfig::from_params(&params("n_cell = 32\nmax_grid_size = 16\ndt = 1e-5"))
            .unwrap();
        assert_eq!(c.cells, vec![32, 32]);
        assert_eq!(c.nsteps, 10);
        assert_eq!(c.plot_int, -1);
        assert_eq!(c.chk_int, -1);
        assert_eq!(c.restart, -1);
        assert_eq!(c.restart_step(), None);
        assert_eq!(c.periodic, vec![true, true]);
        assert_eq!(c.components, 1);
        assert_eq!(c.ghost, 1);
        assert!(c.workers >= 1);
        assert_eq!(c.assignment, AssignmentPolicy::RoundRobin);
        assert_eq!(c.chk_prefix, "chk");
    }

    #[test]
    fn each_required_key_is_reported() {
        for (text, key) in [
            ("max_grid_size = 4\ndt = 1", "n_cell"),
            ("n_cell = 8\ndt = 1", "max_grid_size"),
            ("n_cell = 8\nmax_grid_size = 4", "dt"),
        ] {
            assert_eq!(
                RunConfig::from_params(&params(text)),
                Err(ConfigError::Missing { key: key.into() })
            );
        }
    }

    #[test]
    fn non_positive_values_rejected() {
        for text in [
            "n_cell = 0\nmax_grid_size = 4\ndt = 1",
            "n_cell = 8\nmax_grid_size = 0\ndt = 1",
            "n_cell = 8\nmax_grid_size = 4\ndt = 0",
            "n_cell = 8\nmax_grid_size = 4\ndt = -1e-3",
            "n_cell = 8\nmax_grid_size = 4\ndt = 1\nnghost = 0",
        ] {
            assert!(
                matches!(RunConfig::from_params(&params(text)), Err(ConfigError::Invalid { .. })),
                "{text}"
            );
        }
        assert!(matches!(
            RunConfig::from_params(&params("n_cell = -8\nmax_grid_size = 4\ndt = 1")),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn per_axis_cells_set_dimension() {
        let c = RunConfig::from_params(&params(
            "n_cell = 8 4 2\nmax_grid_size = 4\ndt = 1\nis_periodic = 1 0 1",
        ))
        .unwrap();
        assert_eq!(c.cells, vec![8, 4, 2]);
        assert_eq!(c.periodic, vec![true, false, true]);
        assert_eq!(c.domain().unwrap().dim(), 3);
    }

    #[test]
    fn broadcast_to_explicit_dimension() {
        let c = RunConfig::from_params(&params("n_cell = 8\ndim = 3\nmax_grid_size = 4\ndt = 1"))
            .unwrap();
        assert_eq!(c.cells, vec![8, 8, 8]);
        assert_eq!(c.prob_hi, vec![1.0; 3]);
    }

    #[test]
    fn mismatched_axis_lists_rejected() {
        assert!(RunConfig::from_params(&params("n_cell = 8 8\ndim = 3\nmax_grid_size = 4\ndt = 1"))
            .is_err());
        assert!(RunConfig::from_params(&params(
            "n_cell = 8 8\nmax_grid_size = 4\ndt = 1\nprob_lo = 0"
        ))
        .is_err());
    }

    #[test]
    fn unknown_policy_is_parse_error() {
        assert!(matches!(
            RunConfig::from_params(&params(
                "n_cell = 8\nmax_grid_size = 4\ndt = 1\nassignment = cyclic"
            )),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn ghost_wider_than_any_axis_rejected() {
        let mut c = RunConfig::new(8, 4, 1e-4);
        c.periodic = vec![false, false];
        c.ghost = 3_000_000_000;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::Invalid { ref key, .. }) if key == "nghost"
        ));
        c.ghost = 9;
        assert!(c.validate().is_err());
        c.ghost = 8;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn cadence_helpers() {
        let mut c = RunConfig::new(8, 4, 1e-3);
        assert!(!c.plots_at(10));
        assert!(!c.checkpoints_at(10));
        c.plot_int = 5;
        c.chk_int = 3;
        assert!(c.plots_at(10));
        assert!(!c.plots_at(11));
        assert!(c.checkpoints_at(9));
        assert!(c.plots_at(0));
        c.restart = 20;
        assert_eq!(c.restart_step(), Some(20));
    }
}
