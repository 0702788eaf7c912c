//! Inspect and closure command implementations

use std::path::Path;

use console::Style;

use crate::cli::{ClosureArgs, InspectArgs};
use crate::error::Result;
use crate::manifest::{ManifestView, RawManifest, SnapshotTag};
use crate::store::MANIFEST_FILE;

/// Label a standalone manifest by its snapshot directory or file stem
fn tag_for(path: &Path) -> SnapshotTag {
    let in_snapshot_dir = path.file_name().is_some_and(|name| name == MANIFEST_FILE);
    let label = if in_snapshot_dir {
        path.parent().and_then(Path::file_name)
    } else {
        path.file_stem()
    };
    let label = label.map_or_else(|| "manifest".to_string(), |l| l.to_string_lossy().to_string());
    SnapshotTag::new("local", label)
}

fn load_view(path: &Path) -> Result<ManifestView> {
    let raw = RawManifest::from_path(path)?;
    ManifestView::parse(tag_for(path), raw)
}

/// Run the inspect command
pub fn run(args: InspectArgs) -> Result<()> {
    let view = load_view(&args.manifest)?;
    let bold = Style::new().bold();
    let dangling = view.dangling().count();

    println!("{} {}", bold.apply_to("Manifest:"), args.manifest.display());
    println!("  {} {}", bold.apply_to("Bundles:"), view.graph().len());
    println!(
        "  {} {} ({} addressable, {} dangling)",
        bold.apply_to("Assets:"),
        view.assets().len(),
        view.tree().len(),
        dangling
    );
    if let Some(max) = view.graph().max_sequence_index() {
        println!("  {} {}", bold.apply_to("Max sequence index:"), max);
    }

    if args.tree {
        println!();
        print!("{}", view.tree().dump());
    }

    if args.dangling {
        println!();
        println!("{}", bold.apply_to("Dangling assets:"));
        if dangling == 0 {
            println!("  {}", Style::new().dim().apply_to("None"));
        }
        for asset in view.dangling() {
            let bundle = asset
                .bundle
                .and_then(|id| view.graph().get(id))
                .map_or("-", |b| b.name.as_str());
            match asset.asset_name() {
                Some(name) => println!("  {name} ({bundle})"),
                None => println!("  #{} ({bundle})", asset.id),
            }
        }
    }

    Ok(())
}

/// Run the closure command
pub fn run_closure(args: ClosureArgs) -> Result<()> {
    let view = load_view(&args.manifest)?;
    let graph = view.graph();
    for id in graph.closure_of(&args.bundle)? {
        if let Some(bundle) = graph.get(id) {
            println!("{}", bundle.name);
        }
    }
    Ok(())
}
