use clap::Parser;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show bundle and asset counts:\n    patchbundle inspect manifest.json\n\n\
                  Show the path tree:\n    patchbundle inspect manifest.json --tree\n\n\
                  List assets without a path:\n    patchbundle inspect manifest.json --dangling")]
pub struct InspectArgs {
    /// Decoded manifest (JSON)
    pub manifest: PathBuf,

    /// Print the path tree
    #[arg(long)]
    pub tree: bool,

    /// List assets that have no path
    #[arg(long)]
    pub dangling: bool,
}

/// Arguments for the closure command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show everything a bundle needs loaded:\n    patchbundle closure manifest.json ui/activity.ab")]
pub struct ClosureArgs {
    /// Decoded manifest (JSON)
    pub manifest: PathBuf,

    /// Bundle name
    pub bundle: String,
}
