//! patchbundle - resource manifest rebuilder
//!
//! Rebuilds a target resource snapshot's manifest by pulling assets it lacks
//! forward from older snapshots, together with the bundles those assets
//! need, and stages the result as a self-contained mod directory.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod error;
mod hash;
mod manifest;
mod operations;
mod store;
mod transaction;
mod ui;

use cli::{Cli, Commands};

/// Default log filter; `RUST_LOG` takes precedence
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(cli.store, args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Closure(args) => commands::inspect::run_closure(args),
        Commands::Store(args) => commands::store::run(cli.store, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
