//! Progress presentation for bundle staging
//!
//! All progress reporting goes through the [`ProgressReporter`] trait so the
//! build can run with a visible bar, or silently for dry runs and
//! non-interactive output.

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for the staging stage
pub trait ProgressReporter {
    /// Show the bundle being staged
    fn update_bundle(&mut self, bundle_name: &str);

    /// Mark one bundle as staged
    fn inc_bundle(&mut self);

    /// Finish successfully
    fn finish(&mut self);

    /// Abandon on error
    fn abandon(&mut self);
}

/// Progress bar on stderr
pub struct InteractiveProgressReporter {
    bundle_pb: ProgressBar,
}

impl InteractiveProgressReporter {
    pub fn new(total_bundles: u64) -> Self {
        let bundle_pb = ProgressBar::new(total_bundles);
        if let Ok(style) = ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            bundle_pb.set_style(style.progress_chars("#>-"));
        }
        Self { bundle_pb }
    }
}

impl ProgressReporter for InteractiveProgressReporter {
    fn update_bundle(&mut self, bundle_name: &str) {
        let display_name = if bundle_name.chars().count() > 50 {
            let tail: String = bundle_name
                .chars()
                .rev()
                .take(47)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("...{tail}")
        } else {
            bundle_name.to_string()
        };
        self.bundle_pb.set_message(display_name);
    }

    fn inc_bundle(&mut self) {
        self.bundle_pb.inc(1);
    }

    fn finish(&mut self) {
        self.bundle_pb.finish_and_clear();
    }

    fn abandon(&mut self) {
        self.bundle_pb.abandon();
    }
}

/// No-op reporter for dry runs and non-interactive output
#[derive(Default)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn update_bundle(&mut self, _bundle_name: &str) {}

    fn inc_bundle(&mut self) {}

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}

/// Pick a reporter: a bar only when stderr is a terminal and files are written
pub fn reporter_for(total_bundles: u64, dry_run: bool) -> Box<dyn ProgressReporter> {
    if dry_run || !Term::stderr().is_term() {
        Box::new(SilentProgressReporter)
    } else {
        Box::new(InteractiveProgressReporter::new(total_bundles))
    }
}
