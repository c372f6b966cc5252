//! Progress indicators
//!
//! Spinners shown while waiting on the location service.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner for a pending location query; hidden when `quiet`.
pub fn locating(quiet: bool) -> ProgressBar {
    if quiet {
        ProgressBar::hidden()
    } else {
        spinner("Locating device...")
    }
}

/// Clear a spinner once its operation has finished
pub fn finish(pb: &ProgressBar) {
    pb.finish_and_clear();
}
