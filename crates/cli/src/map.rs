//! Terminal map surface
//!
//! There are no tiles in a terminal; markers and view changes are printed as
//! lines, one per command.

use owo_colors::OwoColorize;
use pinmap_core::map::MapSurface;
use pinmap_geo::{to_lon_lat, ProjectedPoint};
use std::io::{self, Write};

/// Map surface that prints what it is asked to draw.
pub struct TerminalMap<W> {
    output: W,
    show_projected: bool,
    markers: usize,
}

impl TerminalMap<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalMap<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            show_projected: false,
            markers: 0,
        }
    }

    /// Also print projected coordinates next to lon/lat.
    pub fn with_projected(mut self, show: bool) -> Self {
        self.show_projected = show;
        self
    }

    /// Saved-location markers placed so far
    pub fn marker_count(&self) -> usize {
        self.markers
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn describe(&self, position: &ProjectedPoint) -> String {
        let point = to_lon_lat(position);
        if self.show_projected {
            format!("{}  {}", point, format!("({})", position).dimmed())
        } else {
            point.to_string()
        }
    }

    fn emit(&mut self, line: String) {
        if let Err(e) = writeln!(self.output, "{}", line) {
            tracing::warn!(error = %e, "Could not write map output");
        }
    }
}

impl<W: Write> MapSurface for TerminalMap<W> {
    fn add_marker(&mut self, name: &str, position: ProjectedPoint) {
        self.markers += 1;
        let line = format!("{} {}  {}", "●".blue(), name.bold(), self.describe(&position));
        self.emit(line);
    }

    fn add_user_marker(&mut self, position: ProjectedPoint) {
        let line = format!("{} {}  {}", "◎".green(), "You are here".bold(), self.describe(&position));
        self.emit(line);
    }

    fn center_on(&mut self, center: ProjectedPoint, zoom: u8) {
        tracing::debug!(center = %to_lon_lat(&center), zoom, "View centered");
    }
}
