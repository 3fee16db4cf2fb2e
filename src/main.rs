//! Command-line front end: calibrates a routing rule set from example
//! routes, or answers a single routing query with a stored rule set.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use routrain_core::{NodeId, rules::CombineMode};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod config;
mod error;

use commands::RouteArgs;
use error::AppError;

#[derive(Parser)]
#[command(name = "routrain", version, about = "Learn pedestrian routing penalties from example routes")]
struct Cli {
    /// Log filter such as `info` or `routrain_core=debug`, overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate a rule set from the training examples named in a TOML config
    Train {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Route through waypoints and print the result as GeoJSON
    Route {
        /// Map document
        #[arg(short, long)]
        graph: PathBuf,
        /// Rule set, no penalties when omitted
        #[arg(short, long)]
        rules: Option<PathBuf>,
        /// Add up all matching rules instead of letting the most specific win
        #[arg(long)]
        additive: bool,
        /// Write the GeoJSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Node ids to visit in order, at least two
        #[arg(required = true, num_args = 2..)]
        waypoints: Vec<NodeId>,
    },
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Train { config } => commands::train(&config),
        Commands::Route {
            graph,
            rules,
            additive,
            output,
            waypoints,
        } => commands::route(RouteArgs {
            graph: &graph,
            rules: rules.as_deref(),
            mode: CombineMode::from_override_flag(!additive),
            waypoints: &waypoints,
            output: output.as_deref(),
        }),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(e.exit_code());
    }
}
