//! Store command implementation

use std::path::PathBuf;

use crate::cli::{StoreArgs, StoreSubcommand};
use crate::error::Result;
use crate::store::{self, LocalStore};

pub fn run(store_root: Option<PathBuf>, args: StoreArgs) -> Result<()> {
    let store = LocalStore::open(store_root)?;

    match args.command {
        Some(StoreSubcommand::List) => list_snapshots(&store),
        Some(StoreSubcommand::Clear(clear_args)) => match clear_args.only {
            Some(res_version) => remove_snapshot(&store, &res_version),
            None => clear_store(&store),
        },
        None => show_store_stats(&store),
    }
}

fn print_stats(store: &LocalStore) -> Result<store::StoreStats> {
    let stats = store::stats::store_stats(store)?;

    println!("Store Statistics:");
    println!("  Location: {}", store.root().display());
    println!("  Snapshots: {}", stats.snapshots);
    println!("  Bundle files: {}", stats.bundle_files);
    println!("  Size: {}", stats.formatted_size());

    Ok(stats)
}

fn show_store_stats(store: &LocalStore) -> Result<()> {
    let stats = print_stats(store)?;

    if stats.snapshots == 0 {
        println!("\nStore is empty.");
    } else {
        println!("\nRun 'patchbundle store list' to list stored snapshots.");
        println!("Run 'patchbundle store clear' to remove everything from the store.");
        println!("Run 'patchbundle store clear --only <version>' to remove one snapshot.");
    }

    Ok(())
}

fn list_snapshots(store: &LocalStore) -> Result<()> {
    print_stats(store)?;
    println!();

    let snapshots = store::stats::list_snapshots(store)?;
    if snapshots.is_empty() {
        println!("No stored snapshots.");
        return Ok(());
    }

    println!("Stored snapshots ({}):", snapshots.len());
    for snapshot in &snapshots {
        println!(
            "  {} ({} bundle file{}, {}{})",
            snapshot.res_version,
            snapshot.bundle_files,
            if snapshot.bundle_files == 1 { "" } else { "s" },
            snapshot.formatted_size(),
            if snapshot.has_manifest { "" } else { ", no manifest" }
        );
    }

    Ok(())
}

fn clear_store(store: &LocalStore) -> Result<()> {
    let removed = store::stats::clear_store(store)?;
    println!(
        "Store cleared successfully ({removed} snapshot{} removed).",
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

fn remove_snapshot(store: &LocalStore, res_version: &str) -> Result<()> {
    store::stats::remove_snapshot(store, res_version)?;
    println!("Removed stored snapshot: {res_version}");
    Ok(())
}
