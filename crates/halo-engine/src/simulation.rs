//! The time-stepping loop.

use std::sync::Arc;
use std::time::Instant;

use halo_checkpoint::{CheckpointStore, Restored};
use halo_core::Domain;
use halo_field::{DistributedField, Execution, ExchangePlan};
use halo_stencil::{advance, HeatStencil};
use halo_tiling::TileDecomposition;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::EngineError;
use crate::initial::gaussian_pulse;
use crate::metrics::{RunSummary, StepMetrics};
use crate::sink::PlotSink;

/// How a [`Simulation`] got its initial state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartKind {
    /// Decomposed from scratch and seeded analytically at step 0.
    Fresh,
    /// Restored from the checkpoint of step `from`.
    Restart {
        /// The checkpoint step.
        from: u64,
    },
}

/// One run of the heat equation over a tiled domain.
///
/// The simulation owns two fields over one shared layout: `old`, the
/// state after the last completed step, and `new`, scratch for the next
/// one. A step exchanges `old`'s ghosts, applies the stencil into `new`,
/// then swaps the two, so after every step `old` again holds the current
/// state.
///
/// # Examples
///
/// ```
/// use halo_engine::{NullSink, RunConfig, Simulation};
///
/// let mut config = RunConfig::new(8, 4, 1e-4);
/// config.nsteps = 3;
/// let mut sim = Simulation::new(config).unwrap();
/// let summary = sim.run(&mut NullSink).unwrap();
/// assert_eq!(summary.final_step, 3);
/// assert_eq!(sim.step(), 3);
/// ```
pub struct Simulation {
    config: RunConfig,
    domain: Domain,
    layout: Arc<TileDecomposition>,
    plan: ExchangePlan,
    stencil: HeatStencil,
    exec: Execution,
    store: CheckpointStore,
    old: DistributedField,
    new: DistributedField,
    step: u64,
    time: f64,
    start: StartKind,
    last_metrics: StepMetrics,
}

impl Simulation {
    /// Set up a run: validate `config`, then either decompose and seed a
    /// fresh field or restore the checkpoint named by `config.restart`.
    pub fn new(config: RunConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let domain = config.domain()?;
        let store = CheckpointStore::new(config.chk_dir.clone(), config.chk_prefix.clone());

        let (old, step, time, start) = match config.restart_step() {
            None => {
                let layout = Arc::new(TileDecomposition::new(
                    domain.index_box(),
                    config.max_grid_size,
                    config.workers,
                    config.assignment,
                )?);
                let mut field =
                    DistributedField::allocate(layout, config.components, config.ghost)?;
                gaussian_pulse(&mut field, &domain);
                info!(tiles = field.num_tiles(), "fresh start");
                (field, 0, 0.0, StartKind::Fresh)
            }
            Some(from) => {
                let restored = store.read(from)?;
                let time = restored.time;
                let field = adopt_restored(&config, &domain, restored)?;
                info!(step = from, time, tiles = field.num_tiles(), "restarting from checkpoint");
                (field, from, time, StartKind::Restart { from })
            }
        };

        let layout = Arc::clone(old.layout());
        let new = DistributedField::allocate(Arc::clone(&layout), config.components, config.ghost)?;
        let plan = ExchangePlan::build(&layout, &domain, config.ghost)?;
        info!(
            dim = domain.dim(),
            cells = ?domain.cells(),
            tiles = layout.len(),
            workers = layout.worker_count(),
            components = config.components,
            dt = config.dt,
            nsteps = config.nsteps,
            "simulation ready"
        );

        Ok(Self {
            stencil: HeatStencil::new(config.dt),
            exec: config.execution(),
            config,
            domain,
            layout,
            plan,
            store,
            old,
            new,
            step,
            time,
            start,
            last_metrics: StepMetrics::default(),
        })
    }

    /// The configuration the run was built from.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The simulated domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The tile layout in use.
    pub fn layout(&self) -> &Arc<TileDecomposition> {
        &self.layout
    }

    /// Last completed step (0 before the first step of a fresh run).
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Simulation time after the last completed step.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// How the run started.
    pub fn start_kind(&self) -> StartKind {
        self.start
    }

    /// The current state: the field after the last completed step.
    pub fn field(&self) -> &DistributedField {
        &self.old
    }

    /// The checkpoint store the run writes to and restarts from.
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Timings of the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Advance one step: exchange ghosts, apply the stencil, swap.
    ///
    /// Does not plot or checkpoint; [`run`](Self::run) does.
    pub fn step_once(&mut self) -> Result<&StepMetrics, EngineError> {
        let started = Instant::now();

        // Barrier: every ghost is filled before any tile is updated.
        self.plan.execute(&mut self.old, self.exec)?;
        let exchanged = Instant::now();

        advance(&self.stencil, &self.old, &mut self.new, &self.domain, self.exec)?;
        let stepped = Instant::now();

        self.old.swap_with(&mut self.new)?;
        self.time += self.config.dt;
        self.step += 1;

        self.last_metrics = StepMetrics {
            step: self.step,
            exchange_us: micros(started, exchanged),
            stencil_us: micros(exchanged, stepped),
            plot_us: 0,
            checkpoint_us: 0,
            total_us: micros(started, Instant::now()),
        };
        info!(step = self.step, time = self.time, "advanced step {}", self.step);
        debug!(
            exchange_us = self.last_metrics.exchange_us,
            stencil_us = self.last_metrics.stencil_us,
            "step timings"
        );
        Ok(&self.last_metrics)
    }

    /// Write a checkpoint of the current state.
    pub fn checkpoint(&self) -> Result<std::path::PathBuf, EngineError> {
        Ok(self.store.write(self.step, self.time, &self.old, &self.domain)?)
    }

    /// Run until step `nsteps`, plotting and checkpointing on the
    /// configured cadence.
    ///
    /// A fresh run with plotting enabled also plots step 0.
    pub fn run(&mut self, sink: &mut dyn PlotSink) -> Result<RunSummary, EngineError> {
        let started = Instant::now();
        let mut summary = RunSummary {
            start_step: self.step,
            ..RunSummary::default()
        };

        if self.start == StartKind::Fresh && self.step == 0 && self.config.plot_int > 0 {
            sink.plot(0, self.time, &self.old, &self.domain)?;
            summary.plots_emitted += 1;
            info!(step = 0, "plotted");
        }

        while self.step < self.config.nsteps {
            self.step_once()?;

            if self.config.plots_at(self.step) {
                let t = Instant::now();
                sink.plot(self.step, self.time, &self.old, &self.domain)?;
                self.last_metrics.plot_us = micros(t, Instant::now());
                summary.plots_emitted += 1;
                info!(step = self.step, "plotted");
            }
            if self.config.checkpoints_at(self.step) {
                let t = Instant::now();
                let path = self.checkpoint()?;
                self.last_metrics.checkpoint_us = micros(t, Instant::now());
                summary.checkpoints.push(path);
            }
            self.last_metrics.total_us +=
                self.last_metrics.plot_us + self.last_metrics.checkpoint_us;
            summary.steps_run += 1;
        }

        summary.final_step = self.step;
        summary.final_time = self.time;
        summary.total_us = micros(started, Instant::now());
        info!(
            steps = summary.steps_run,
            final_step = summary.final_step,
            time = summary.final_time,
            "run complete"
        );
        Ok(summary)
    }
}

/// Fit a restored checkpoint to the current configuration.
///
/// The stored tile list is authoritative. Ownership is recomputed when the
/// worker count or policy changed, and the field is re-padded when the
/// ghost width changed. Anything that would change results is rejected.
fn adopt_restored(
    config: &RunConfig,
    domain: &Domain,
    restored: Restored,
) -> Result<DistributedField, EngineError> {
    let step = restored.step;
    if restored.domain != *domain {
        return Err(EngineError::RestartMismatch {
            step,
            reason: format!(
                "checkpoint domain has cells {:?}, configuration has {:?} \
                 (bounds or periodicity may also differ)",
                restored.domain.cells(),
                domain.cells()
            ),
        });
    }
    if restored.field.components() != config.components {
        return Err(EngineError::RestartMismatch {
            step,
            reason: format!(
                "checkpoint has {} components, configuration has {}",
                restored.field.components(),
                config.components
            ),
        });
    }

    let stored = &restored.layout;
    let mut field = restored.field;
    if stored.worker_count() != config.workers || stored.policy() != config.assignment {
        if stored.worker_count() != config.workers {
            warn!(
                step,
                recorded = stored.worker_count(),
                current = config.workers,
                "worker count changed since checkpoint; reassigning stored tiles"
            );
        }
        let layout = Arc::new(stored.reassigned(config.workers, config.assignment)?);
        field = field.with_layout(layout)?;
    }

    if field.ghost_width() != config.ghost {
        let layout = Arc::clone(field.layout());
        let mut padded = DistributedField::allocate(layout, config.components, config.ghost)?;
        for (tile, src) in field.tiles().iter().enumerate() {
            padded.load_interior(tile, &src.interior_to_vec())?;
        }
        field = padded;
    }
    Ok(field)
}

fn micros(from: Instant, to: Instant) -> u64 {
    to.duration_since(from).as_micros() as u64
}
