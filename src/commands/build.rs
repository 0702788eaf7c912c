//! Build command implementation

use std::path::PathBuf;

use crate::cli::BuildArgs;
use crate::config::ModConfig;
use crate::error::Result;
use crate::operations::build::display::print_build_summary;
use crate::operations::{BuildOperation, BuildOptions};
use crate::store::LocalStore;

/// Run the build command
pub fn run(store: Option<PathBuf>, args: BuildArgs) -> Result<()> {
    let config = ModConfig::from_path(&args.config)?;
    let store = LocalStore::open(store)?;

    let options = BuildOptions {
        base_dir: args
            .config
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default(),
        output: args.output,
        dump_dir: args.dump_dir,
        no_dump: args.no_dump,
        dry_run: args.dry_run,
    };

    let summary = BuildOperation::new(&config, &options, &store, &store).execute()?;
    print_build_summary(&summary);
    Ok(())
}
