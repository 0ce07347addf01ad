//! Per-step timings and the end-of-run summary.

use std::path::PathBuf;

/// Timings for one step. All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// The step these timings belong to.
    pub step: u64,
    /// Ghost exchange.
    pub exchange_us: u64,
    /// Stencil application.
    pub stencil_us: u64,
    /// Handing the field to the plot sink, if plotted.
    pub plot_us: u64,
    /// Writing the checkpoint, if one was written.
    pub checkpoint_us: u64,
    /// Whole step, plot and checkpoint included.
    pub total_us: u64,
}

/// What a run did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Last step completed before the run started (0 for a fresh run).
    pub start_step: u64,
    /// Last step completed.
    pub final_step: u64,
    /// Simulation time after the last step.
    pub final_time: f64,
    /// Steps advanced by this run.
    pub steps_run: u64,
    /// Frames handed to the plot sink.
    pub plots_emitted: u64,
    /// Checkpoints written, in order.
    pub checkpoints: Vec<PathBuf>,
    /// Wall-clock time of the whole run, in microseconds.
    pub total_us: u64,
}
