//! `halo`: run the heat equation from an inputs file.
//!
//! ```text
//! halo run inputs nsteps=200 restart=100
//! halo validate inputs
//! halo checkpoints inputs
//! ```

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Tiled heat-equation solver with checkpoint/restart.
#[derive(Parser)]
#[command(name = "halo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tiled heat-equation solver with checkpoint/restart", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run(commands::InputArgs),
    /// Parse and validate an inputs file without running
    Validate(commands::InputArgs),
    /// List the checkpoints a run configuration would restart from
    Checkpoints(commands::InputArgs),
}

fn level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level(&cli.log_level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run(args),
        Commands::Validate(args) => commands::validate(args),
        Commands::Checkpoints(args) => commands::checkpoints(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inputs_and_overrides() {
        let cli = Cli::try_parse_from(["halo", "run", "inputs", "nsteps=5", "restart=2"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.inputs.to_str(), Some("inputs"));
                assert_eq!(args.overrides, vec!["nsteps=5", "restart=2"]);
            }
            _ => panic!("expected run"),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn log_level_after_subcommand() {
        let cli =
            Cli::try_parse_from(["halo", "validate", "inputs", "--log-level", "debug"]).unwrap();
        assert_eq!(level(&cli.log_level), Level::DEBUG);
        assert_eq!(level("bogus"), Level::INFO);
    }

    #[test]
    fn inputs_path_is_required() {
        assert!(Cli::try_parse_from(["halo", "run"]).is_err());
    }
}
