//! Subcommand implementations.

mod inspect;
mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use halo_engine::{ParamTable, RunConfig};

pub use inspect::{checkpoints, validate};
pub use run::run;

/// An inputs file plus command-line overrides.
#[derive(Args)]
pub struct InputArgs {
    /// Inputs file (`key = value` lines)
    pub inputs: PathBuf,

    /// Parameter overrides, `key=value`, applied after the inputs file
    pub overrides: Vec<String>,
}

/// Read the inputs file, apply overrides and build the run configuration.
pub fn load_config(args: &InputArgs) -> Result<RunConfig> {
    let mut params = ParamTable::from_file(&args.inputs)
        .with_context(|| format!("reading inputs file {}", args.inputs.display()))?;
    for arg in &args.overrides {
        params
            .apply_override(arg)
            .with_context(|| format!("applying override '{arg}'"))?;
    }
    RunConfig::from_params(&params)
        .with_context(|| format!("configuring from {}", args.inputs.display()))
}
