//! Build operation
//!
//! Runs the mod build pipeline. Each stage completes before the next starts:
//!
//! ```text
//! config -> snapshot manifests -> views -> automatic merge -> aliases
//!        -> extra bundles -> rebuild -> payload resolution -> staging
//! ```
//!
//! A dry run stops after payload resolution and writes nothing.

pub mod display;
pub mod dump;
pub mod load;
pub mod stage;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ModConfig;
use crate::error::Result;
use crate::manifest::{ManifestMerger, ManifestRebuilder, ManifestView, MergeReport};
use crate::store::{BundleFetcher, LocalStore};
use crate::ui;

pub use dump::DumpWriter;
pub use stage::{ResolvedPayload, StagedBundle};

/// Default parent of output directories
const MOD_DIR: &str = "mod";

/// Default parent of diagnostics directories
const TMP_DIR: &str = "tmp";

/// Options for a build, usually from the command line
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Directory relative snapshot manifest paths are resolved against
    pub base_dir: PathBuf,
    pub output: Option<PathBuf>,
    pub dump_dir: Option<PathBuf>,
    pub no_dump: bool,
    pub dry_run: bool,
}

impl BuildOptions {
    pub fn output_dir(&self, config: &ModConfig) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| Path::new(MOD_DIR).join(&config.name))
    }

    /// Diagnostics directory, if tree dumps are written at all
    pub fn dump_dir(&self, config: &ModConfig) -> Option<PathBuf> {
        if self.no_dump || self.dry_run {
            return None;
        }
        Some(
            self.dump_dir
                .clone()
                .unwrap_or_else(|| Path::new(TMP_DIR).join(&config.name)),
        )
    }
}

/// Outcome of a build
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub name: String,
    pub output: PathBuf,
    pub report: MergeReport,
    pub appended_assets: usize,
    /// Appended bundles with their payloads
    pub payloads: Vec<ResolvedPayload>,
    /// Empty on a dry run
    pub staged: Vec<StagedBundle>,
    pub dry_run: bool,
}

/// Coordinates one mod build
pub struct BuildOperation<'a> {
    config: &'a ModConfig,
    options: &'a BuildOptions,
    store: &'a LocalStore,
    fetcher: &'a dyn BundleFetcher,
}

impl<'a> BuildOperation<'a> {
    /// `store` locates snapshot manifests; `fetcher` provides bundle payloads
    pub fn new(
        config: &'a ModConfig,
        options: &'a BuildOptions,
        store: &'a LocalStore,
        fetcher: &'a dyn BundleFetcher,
    ) -> Self {
        Self {
            config,
            options,
            store,
            fetcher,
        }
    }

    pub fn execute(&self) -> Result<BuildSummary> {
        let config = self.config;
        info!(name = %config.name, target = %config.target.tag(), "building mod");

        let target = load::load_snapshot(self.store, &self.options.base_dir, &config.target)?;
        let fallbacks = config
            .fallbacks
            .iter()
            .map(|snapshot| load::load_snapshot(self.store, &self.options.base_dir, snapshot))
            .collect::<Result<Vec<_>>>()?;

        let dumps = DumpWriter::new(self.options.dump_dir(config));
        dump_sources(&dumps, &target, &fallbacks)?;

        let mut merger = ManifestMerger::new(&target, &fallbacks);
        merger.merge()?;
        dumps.write_tree("overlay.txt", merger.overlay())?;

        for alias in &config.aliases {
            if alias.recursive {
                merger.copy_tree_subtree(&alias.from, &alias.to)?;
            } else {
                merger.copy_tree_node(&alias.from, &alias.to)?;
            }
        }
        dumps.write_tree("overlay-aliased.txt", merger.overlay())?;

        for name in &config.bundles {
            merger.require_bundle(name)?;
        }

        let merged = merger.finish();
        info!(
            paths = merged.overlay.len(),
            bundles = merged.required.len(),
            "overlay computed"
        );

        let rebuilt = ManifestRebuilder::new(&target, &fallbacks).rebuild(&merged)?;
        let payloads = stage::resolve_payloads(self.fetcher, &rebuilt, &fallbacks)?;

        let output = self.options.output_dir(config);
        let staged = if self.options.dry_run {
            Vec::new()
        } else {
            let mut reporter = ui::reporter_for(payloads.len() as u64, self.options.dry_run);
            stage::stage(&output, &rebuilt, &payloads, reporter.as_mut())?
        };

        Ok(BuildSummary {
            name: config.name.clone(),
            output,
            report: merged.report,
            appended_assets: rebuilt.appended_assets,
            payloads,
            staged,
            dry_run: self.options.dry_run,
        })
    }
}

fn dump_sources(dumps: &DumpWriter, target: &ManifestView, fallbacks: &[ManifestView]) -> Result<()> {
    dumps.write_tree("target.txt", target.tree())?;
    for (i, fallback) in fallbacks.iter().enumerate() {
        let file_name = format!("fallback-{i}-{}.txt", fallback.tag().res_version);
        dumps.write_tree(&file_name, fallback.tree())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
