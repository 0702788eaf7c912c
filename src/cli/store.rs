use clap::{Parser, Subcommand};

/// Arguments for the store command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show store statistics:\n    patchbundle store\n\n\
                  List stored snapshots:\n    patchbundle store list\n\n\
                  Clear the whole store:\n    patchbundle store clear\n\n\
                  Remove one snapshot:\n    patchbundle store clear --only 25-02-10-11-39-31_a1dc28")]
pub struct StoreArgs {
    #[command(subcommand)]
    pub command: Option<StoreSubcommand>,
}

/// Store subcommands
#[derive(Subcommand, Debug)]
pub enum StoreSubcommand {
    /// List stored snapshots
    List,

    /// Remove stored snapshots
    Clear(ClearStoreArgs),
}

/// Arguments for the store clear command
#[derive(Parser, Debug)]
pub struct ClearStoreArgs {
    /// Remove only the snapshot with this resource version
    #[arg(long)]
    pub only: Option<String>,
}
