//! Payload resolution and output staging
//!
//! ```text
//! <output>/
//! ├── manifest.json     rebuilt manifest
//! ├── staging.json      one entry per staged bundle
//! └── bundles/
//!     └── <bundle_name>
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, fs as fs_error, graph as graph_error};
use crate::hash;
use crate::manifest::{ManifestView, RebuiltManifest};
use crate::store::{BundleFetcher, MANIFEST_FILE, bundle_relative_path};
use crate::transaction::Transaction;
use crate::ui::ProgressReporter;

/// Staged bundle subdirectory of the output directory
pub const BUNDLES_DIR: &str = "bundles";

/// Staging record file name
pub const STAGING_FILE: &str = "staging.json";

/// An appended bundle with its payload located
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPayload {
    pub bundle: String,
    pub res_version: String,
    pub source: PathBuf,
}

/// One entry of `staging.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedBundle {
    pub bundle: String,
    pub res_version: String,
    /// Path relative to the output directory
    pub file: String,
    pub hash: String,
}

/// Locate the payload of every appended bundle
///
/// # Errors
///
/// Fails on the first bundle whose payload the fetcher cannot provide.
pub fn resolve_payloads(
    fetcher: &dyn BundleFetcher,
    rebuilt: &RebuiltManifest,
    fallbacks: &[ManifestView],
) -> Result<Vec<ResolvedPayload>> {
    rebuilt
        .appended_bundles
        .iter()
        .map(|appended| {
            let view = fallbacks.get(appended.source).ok_or_else(|| {
                graph_error::inconsistent(format!(
                    "bundle '{}' refers to missing fallback #{}",
                    appended.name, appended.source
                ))
            })?;
            let res_version = view.tag().res_version.clone();
            let source = fetcher.fetch(&res_version, &appended.name)?;
            debug!(bundle = %appended.name, %res_version, "payload resolved");
            Ok(ResolvedPayload {
                bundle: appended.name.clone(),
                res_version,
                source,
            })
        })
        .collect()
}

/// Copy payloads and write the rebuilt manifest and staging record
///
/// Nothing is left behind if any step fails.
pub fn stage(
    output: &Path,
    rebuilt: &RebuiltManifest,
    payloads: &[ResolvedPayload],
    reporter: &mut dyn ProgressReporter,
) -> Result<Vec<StagedBundle>> {
    let mut transaction = Transaction::new();
    transaction.create_dir_all(output)?;

    let staged = match stage_payloads(&mut transaction, output, payloads, reporter) {
        Ok(staged) => {
            reporter.finish();
            staged
        }
        Err(e) => {
            reporter.abandon();
            return Err(e);
        }
    };

    let manifest_json = rebuilt.manifest.to_json()?;
    transaction.write_file(&output.join(MANIFEST_FILE), manifest_json.as_bytes())?;

    let staging_json = serde_json::to_string_pretty(&staged)?;
    transaction.write_file(&output.join(STAGING_FILE), staging_json.as_bytes())?;

    transaction.commit();
    info!(output = %output.display(), bundles = staged.len(), "staged output");
    Ok(staged)
}

fn stage_payloads(
    transaction: &mut Transaction,
    output: &Path,
    payloads: &[ResolvedPayload],
    reporter: &mut dyn ProgressReporter,
) -> Result<Vec<StagedBundle>> {
    let mut staged = Vec::with_capacity(payloads.len());
    for payload in payloads {
        reporter.update_bundle(&payload.bundle);

        let relative = Path::new(BUNDLES_DIR).join(bundle_relative_path(&payload.bundle)?);
        let destination = output.join(&relative);

        let expected = hash::hash_file(&payload.source)?;
        transaction.copy_file(&payload.source, &destination)?;
        let actual = hash::hash_file(&destination)?;
        if !hash::verify_hash(&expected, &actual) {
            return Err(fs_error::write_failed(
                destination.display().to_string(),
                "staged copy does not match its source",
            ));
        }

        staged.push(StagedBundle {
            bundle: payload.bundle.clone(),
            res_version: payload.res_version.clone(),
            file: relative.to_string_lossy().replace('\\', "/"),
            hash: actual,
        });
        reporter.inc_bundle();
    }
    Ok(staged)
}
