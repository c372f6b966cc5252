//! CLI utilities for pinmap
//!
//! Provides the terminal side of the map workflows:
//! - Terminal output formatting
//! - Progress indicators
//! - A line-based dialog
//! - A printing map surface

#![warn(missing_docs)]

pub mod dialog;
#[allow(missing_docs)]
pub mod map;
pub mod output;
pub mod progress;

pub use dialog::TerminalDialog;
pub use map::TerminalMap;
