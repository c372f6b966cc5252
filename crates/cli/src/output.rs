//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::OwoColorize;
use pinmap_core::dialog::{Notice, NoticeLevel, NoticeLine};
use std::io::{self, Write};

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Write a notice as a titled block.
pub fn write_notice<W: Write>(out: &mut W, notice: &Notice) -> io::Result<()> {
    let marker = match notice.level {
        NoticeLevel::Info => "ℹ".blue().to_string(),
        NoticeLevel::Success => "✓".green().to_string(),
        NoticeLevel::Warning => "⚠".yellow().to_string(),
    };
    writeln!(out, "{} {}", marker, notice.title.bold())?;

    for line in &notice.lines {
        match line {
            NoticeLine::Text(text) => writeln!(out, "  {}", text)?,
            NoticeLine::Field { label, value } => {
                writeln!(out, "  {} {}", format!("{}:", label).dimmed(), value)?
            }
        }
    }
    Ok(())
}

/// Format a distance for display
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{:.2} km", km)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
