//! Progress indicators for context scans

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
///
/// indicatif draws to stderr and hides itself when stderr is not a terminal.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner that reports which context is currently being scanned
pub struct ScanProgress {
    pb: ProgressBar,
}

impl ScanProgress {
    pub fn new(total_contexts: usize) -> Self {
        Self {
            pb: create_spinner(&format!("Scanning {} context(s)", total_contexts)),
        }
    }

    /// Disabled spinner, used when output must stay clean (e.g. JSON)
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn set_context(&self, context: &str, namespace: Option<&str>) {
        let message = match namespace {
            Some(ns) => format!("Scanning {} / {}", context, ns),
            None => format!("Scanning {}", context),
        };
        self.pb.set_message(message);
    }

    /// Run `f` with the spinner temporarily hidden so log lines stay intact
    pub fn suspend<F, T>(&self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.pb.suspend(f)
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
