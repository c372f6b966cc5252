//! Map adapter contract
//!
//! The map surface renders tiles and markers and reports clicks in projected
//! coordinates. The session tells it where markers go and where to look.

use pinmap_geo::ProjectedPoint;

/// A map rendering surface.
pub trait MapSurface {
    /// Place a saved-location marker.
    fn add_marker(&mut self, name: &str, position: ProjectedPoint);

    /// Place the marker showing the user's own position.
    fn add_user_marker(&mut self, position: ProjectedPoint);

    /// Move the view to `center` at `zoom`.
    fn center_on(&mut self, center: ProjectedPoint, zoom: u8);
}

/// What a [`RecordingMap`] was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    Marker { name: String, position: ProjectedPoint },
    UserMarker(ProjectedPoint),
    Center { center: ProjectedPoint, zoom: u8 },
}

/// Map surface that only records commands.
#[derive(Debug, Default)]
pub struct RecordingMap {
    pub commands: Vec<MapCommand>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the saved-location markers, in placement order.
    pub fn marker_names(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                MapCommand::Marker { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The most recent view change.
    pub fn last_center(&self) -> Option<(ProjectedPoint, u8)> {
        self.commands.iter().rev().find_map(|command| match command {
            MapCommand::Center { center, zoom } => Some((*center, *zoom)),
            _ => None,
        })
    }
}

impl MapSurface for RecordingMap {
    fn add_marker(&mut self, name: &str, position: ProjectedPoint) {
        self.commands.push(MapCommand::Marker {
            name: name.to_string(),
            position,
        });
    }

    fn add_user_marker(&mut self, position: ProjectedPoint) {
        self.commands.push(MapCommand::UserMarker(position));
    }

    fn center_on(&mut self, center: ProjectedPoint, zoom: u8) {
        self.commands.push(MapCommand::Center { center, zoom });
    }
}
