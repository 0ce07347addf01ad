//! `halo validate` and `halo checkpoints`.

use anyhow::{Context, Result};
use halo_checkpoint::CheckpointStore;
use halo_stencil::max_stable_dt;
use tracing::warn;

use super::{load_config, InputArgs};

/// Check an inputs file and print the run it describes.
pub fn validate(args: InputArgs) -> Result<()> {
    let config = load_config(&args)?;
    let domain = config.domain().context("building the domain")?;
    let limit = max_stable_dt(&domain);

    println!("{}: ok", args.inputs.display());
    println!("  cells         {:?}", config.cells);
    println!("  periodic      {:?}", config.periodic);
    println!("  max_grid_size {}", config.max_grid_size);
    println!("  components    {}", config.components);
    println!("  ghost         {}", config.ghost);
    println!("  workers       {} ({})", config.workers, config.assignment);
    println!("  dt            {:e} (stable below {:e})", config.dt, limit);
    println!("  nsteps        {}", config.nsteps);
    match config.restart_step() {
        Some(step) => println!("  restart       from step {step}"),
        None => println!("  restart       fresh"),
    }
    if config.dt >= limit {
        warn!(dt = config.dt, limit, "time step exceeds the explicit stability limit");
    }
    Ok(())
}

/// List the checkpoints in the configured checkpoint directory.
pub fn checkpoints(args: InputArgs) -> Result<()> {
    let config = load_config(&args)?;
    let store = CheckpointStore::new(config.chk_dir.clone(), config.chk_prefix.clone());
    let steps = store
        .list_steps()
        .with_context(|| format!("listing {}", store.root().display()))?;
    if steps.is_empty() {
        println!("no checkpoints under {}", store.root().display());
        return Ok(());
    }
    for step in steps {
        let header = store
            .read_header(step)
            .with_context(|| format!("reading checkpoint {}", store.path_for(step).display()))?;
        println!(
            "{}  time {:e}  tiles {}  workers {} ({})",
            store.path_for(step).display(),
            header.time,
            header.tiles.len(),
            header.worker_count,
            header.policy
        );
    }
    Ok(())
}
