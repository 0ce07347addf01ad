//! `halo run`.

use std::time::Instant;

use anyhow::{Context, Result};
use halo_core::Domain;
use halo_engine::{PlotSink, Simulation, SinkError};
use halo_field::DistributedField;
use tracing::info;

use super::{load_config, InputArgs};

/// Logs per-component diagnostics of every plotted step.
struct LogSink;

impl PlotSink for LogSink {
    fn plot(
        &mut self,
        step: u64,
        time: f64,
        field: &DistributedField,
        _domain: &Domain,
    ) -> Result<(), SinkError> {
        for comp in 0..field.components() {
            info!(
                step,
                time,
                comp,
                sum = field.sum(comp),
                min = field.min(comp),
                max = field.max(comp),
                "plot"
            );
        }
        Ok(())
    }
}

/// Run the configured simulation to completion.
pub fn run(args: InputArgs) -> Result<()> {
    let config = load_config(&args)?;
    let started = Instant::now();

    let mut sim = Simulation::new(config).context("setting up the simulation")?;
    let summary = sim
        .run(&mut LogSink)
        .with_context(|| format!("running from step {}", sim.step()))?;

    info!(
        steps = summary.steps_run,
        final_step = summary.final_step,
        time = summary.final_time,
        plots = summary.plots_emitted,
        checkpoints = summary.checkpoints.len(),
        "done in {:.3}s",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
