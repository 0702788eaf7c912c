use clap::Parser;
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Arguments for the build command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Build from ./patchbundle.yaml:\n    patchbundle build\n\n\
                  Build a specific mod into a custom directory:\n    patchbundle build mods/chronosphere.yaml --output dist/chronosphere\n\n\
                  Preview without writing anything:\n    patchbundle build --dry-run\n\n\
                  Use a store outside the user cache:\n    patchbundle --store ./assets build")]
pub struct BuildArgs {
    /// Mod configuration file
    #[arg(default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Output directory (defaults to mod/<name>)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Directory for tree dumps (defaults to tmp/<name>)
    #[arg(long, conflicts_with = "no_dump")]
    pub dump_dir: Option<PathBuf>,

    /// Do not write tree dumps
    #[arg(long)]
    pub no_dump: bool,

    /// Show what would be built without writing anything
    #[arg(long)]
    pub dry_run: bool,
}
