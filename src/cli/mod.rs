//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - build: Build command arguments
//! - inspect: Inspect and closure command arguments
//! - store: Store command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod completions;
pub mod inspect;
pub mod store;

pub use build::BuildArgs;
pub use completions::CompletionsArgs;
pub use inspect::{ClosureArgs, InspectArgs};
pub use store::{ClearStoreArgs, StoreArgs, StoreSubcommand};

/// patchbundle - resource manifest rebuilder
///
/// Pull assets missing from a target snapshot forward from older snapshots.
#[derive(Parser, Debug)]
#[command(
    name = "patchbundle",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Rebuild resource manifests with assets pulled forward from older snapshots",
    long_about = "patchbundle merges the asset trees of older resource snapshots into a target \
                  snapshot, pulls in the bundles those assets need, and stages a rebuilt \
                  manifest together with the bundle files.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  patchbundle build                          \x1b[90m# Build from ./patchbundle.yaml\x1b[0m\n   \
                  patchbundle build mods/chronosphere.yaml   \x1b[90m# Build a specific mod\x1b[0m\n   \
                  patchbundle inspect manifest.json --tree   \x1b[90m# Show a manifest's path tree\x1b[0m\n   \
                  patchbundle closure manifest.json ui.ab    \x1b[90m# Show a bundle's dependencies\x1b[0m\n   \
                  patchbundle store list                     \x1b[90m# List stored snapshots\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Asset store directory (defaults to $PATCHBUNDLE_STORE_DIR, then the user cache)
    #[arg(long, short = 's', global = true)]
    pub store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a mod from its configuration
    Build(BuildArgs),

    /// Show what a manifest contains
    Inspect(InspectArgs),

    /// Show the dependency closure of a bundle
    Closure(ClosureArgs),

    /// Manage the asset store
    Store(StoreArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
