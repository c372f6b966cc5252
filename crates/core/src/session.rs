//! Map session workflows
//!
//! Ties the location store to the host adapters:
//!
//! - **click to save**: a projected click is named through the dialog, saved,
//!   and marked on the map
//! - **details**: a saved marker's name and coordinate are shown
//! - **nearest**: the device position is queried and the closest saved
//!   location is reported and focused
//!
//! Nothing here is fatal to the session. Expected conditions (cancelled
//! prompt, empty store, no position) come back as outcomes; only storage
//! failures and overlapping location queries are errors.

use crate::dialog::{Dialog, Notice, TextPrompt};
use crate::error::{Error, Result};
use crate::geolocation::{
    GeolocationOptions, LocationProvider, LocationRequests, Position, PositionError,
};
use crate::map::MapSurface;
use crate::storage::KeyValueStorage;
use crate::store::LocationStore;
use pinmap_geo::{from_lon_lat, to_lon_lat, GeoPoint, ProjectedPoint};
use serde::Serialize;

/// Zoom used when the view focuses a single location.
pub const DEFAULT_FOCUS_ZOOM: u8 = 17;

/// Center of the initial view (Bandung).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(107.6098, -6.9175);

/// Zoom of the initial view.
pub const DEFAULT_ZOOM: u8 = 9;

/// Result of a map click.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    Saved { name: String, coordinate: GeoPoint },
    Cancelled,
}

/// Result of a nearest-location search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NearestOutcome {
    Found {
        index: usize,
        name: String,
        coordinate: GeoPoint,
        distance_km: f64,
    },
    /// The store holds nothing at all
    NoSavedLocations,
    /// The store holds entries but none with a usable coordinate
    NoneFound,
    LocationUnavailable { error: PositionError },
}

/// A running map session over one location store.
#[derive(Debug)]
pub struct MapSession<S> {
    store: LocationStore<S>,
    requests: LocationRequests,
    options: GeolocationOptions,
    center: GeoPoint,
    zoom: u8,
    focus_zoom: u8,
}

impl<S: KeyValueStorage> MapSession<S> {
    pub fn new(store: LocationStore<S>, options: GeolocationOptions) -> Self {
        Self {
            store,
            requests: LocationRequests::new(),
            options,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            focus_zoom: DEFAULT_FOCUS_ZOOM,
        }
    }

    /// Where the map starts before any location is focused.
    pub fn with_initial_view(mut self, center: GeoPoint, zoom: u8) -> Self {
        self.center = center;
        self.zoom = zoom;
        self
    }

    pub fn with_focus_zoom(mut self, zoom: u8) -> Self {
        self.focus_zoom = zoom;
        self
    }

    pub fn store(&self) -> &LocationStore<S> {
        &self.store
    }

    pub fn options(&self) -> &GeolocationOptions {
        &self.options
    }

    /// The in-flight guard used by [`Self::locate_nearest`].
    pub fn requests(&self) -> &LocationRequests {
        &self.requests
    }

    /// Show the initial view and the saved markers.
    ///
    /// Returns the number of markers placed.
    pub fn open_map(&self, map: &mut dyn MapSurface) -> usize {
        map.center_on(from_lon_lat(&self.center), self.zoom);
        self.render_saved_markers(map)
    }

    /// Place a marker for every saved location with a usable coordinate.
    ///
    /// Returns the number of markers placed.
    pub fn render_saved_markers(&self, map: &mut dyn MapSurface) -> usize {
        let mut placed = 0;
        for location in self.store.locations() {
            if let Some(point) = location.point() {
                map.add_marker(location.name(), from_lon_lat(&point));
                placed += 1;
            }
        }
        tracing::debug!(placed, total = self.store.len(), "Rendered saved markers");
        placed
    }

    /// Name and save the location under a map click.
    pub fn handle_click(
        &mut self,
        clicked: ProjectedPoint,
        dialog: &mut dyn Dialog,
        map: &mut dyn MapSurface,
    ) -> Result<ClickOutcome> {
        let coordinate = to_lon_lat(&clicked);
        tracing::debug!(projected = %clicked, lon_lat = %coordinate, "Map clicked");

        let Some(name) = dialog.prompt_text(&TextPrompt::location_name()) else {
            tracing::debug!("Save cancelled");
            return Ok(ClickOutcome::Cancelled);
        };

        self.save(name, coordinate, dialog, map)
    }

    /// Save an already named location, mark it, and confirm through the dialog.
    pub fn save(
        &mut self,
        name: String,
        coordinate: GeoPoint,
        dialog: &mut dyn Dialog,
        map: &mut dyn MapSurface,
    ) -> Result<ClickOutcome> {
        self.store.append(&name, coordinate)?;
        map.add_marker(&name, from_lon_lat(&coordinate));

        dialog.notify(&Notice::success("Saved!").text(format!("Location \"{}\" saved.", name)));

        Ok(ClickOutcome::Saved { name, coordinate })
    }

    /// Show the name and coordinate of the saved location at `index`.
    pub fn show_details(&self, index: usize, dialog: &mut dyn Dialog) -> Result<()> {
        let location = self
            .store
            .get(index)
            .ok_or_else(|| Error::location_not_found(&format!("#{}", index)))?;

        let coordinate = location
            .point()
            .map(|point| point.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        dialog.notify(
            &Notice::info("Location details")
                .field("Name", location.name())
                .field("Coordinate", coordinate),
        );
        Ok(())
    }

    /// Query the device position, holding the in-flight guard for the call.
    ///
    /// Fails only when another query is already in flight; the provider's own
    /// failure comes back as the inner `Err`.
    pub fn request_position(
        &self,
        provider: &dyn LocationProvider,
    ) -> Result<std::result::Result<Position, PositionError>> {
        let _ticket = self.requests.begin()?;
        tracing::debug!(options = ?self.options, "Requesting device position");
        Ok(provider.current_position(&self.options))
    }

    /// Query the device position and report the nearest saved location.
    ///
    /// Fails only when another query is already in flight.
    pub fn locate_nearest(
        &mut self,
        provider: &dyn LocationProvider,
        dialog: &mut dyn Dialog,
        map: &mut dyn MapSurface,
    ) -> Result<NearestOutcome> {
        let reply = self.request_position(provider)?;

        let position = match reply {
            Ok(position) => position,
            Err(error) => {
                tracing::warn!(%error, "Could not get the device position");
                dialog.notify(
                    &Notice::warning("Location not found")
                        .text("Enable location access to continue.")
                        .text(error.to_string()),
                );
                return Ok(NearestOutcome::LocationUnavailable { error });
            }
        };

        tracing::info!(user = %position.point, accuracy_m = ?position.accuracy_m, "Device position");

        let user = from_lon_lat(&position.point);
        map.add_user_marker(user);
        map.center_on(user, self.focus_zoom);

        Ok(self.nearest_to(&position.point, dialog, map))
    }

    /// Report the saved location nearest to `query`.
    pub fn nearest_to(
        &self,
        query: &GeoPoint,
        dialog: &mut dyn Dialog,
        map: &mut dyn MapSurface,
    ) -> NearestOutcome {
        if self.store.is_empty() {
            dialog.notify(
                &Notice::warning("No saved locations")
                    .text("You have not saved any locations yet. Click the map to add one."),
            );
            return NearestOutcome::NoSavedLocations;
        }

        let Some(nearest) = self.store.nearest(query) else {
            tracing::warn!(total = self.store.len(), "No saved location has a usable coordinate");
            dialog.notify(
                &Notice::warning("No nearby location").text("No nearby saved location was found."),
            );
            return NearestOutcome::NoneFound;
        };

        let name = nearest.entry.name().to_string();
        // find_nearest only returns entries with a usable coordinate
        let coordinate = nearest.entry.point().unwrap_or(*query);

        dialog.notify(
            &Notice::success("Nearest location found")
                .field("Name", name.clone())
                .field("Coordinate", coordinate.to_string())
                .field("Distance", format!("{:.2} km", nearest.distance_km)),
        );
        map.center_on(from_lon_lat(&coordinate), self.focus_zoom);

        tracing::info!(name = %name, distance_km = nearest.distance_km, "Nearest location");

        NearestOutcome::Found {
            index: nearest.index,
            name,
            coordinate,
            distance_km: nearest.distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{NoticeLevel, ScriptedDialog};
    use crate::error::ErrorCode;
    use crate::geolocation::{FailingLocationProvider, FixedLocationProvider};
    use crate::map::{MapCommand, RecordingMap};
    use crate::storage::{MemoryStorage, ReadOnlyStorage};

    const CITY_HALL: GeoPoint = GeoPoint::new(107.6098, -6.9175);
    const GEDUNG_SATE: GeoPoint = GeoPoint::new(107.6191, -6.9025);

    fn session() -> MapSession<MemoryStorage> {
        MapSession::new(LocationStore::open(MemoryStorage::new()), GeolocationOptions::default())
    }

    fn seeded_session() -> MapSession<MemoryStorage> {
        let mut store = LocationStore::open(MemoryStorage::new());
        store.append("A", CITY_HALL).unwrap();
        store.append("B", GEDUNG_SATE).unwrap();
        MapSession::new(store, GeolocationOptions::default())
    }

    #[test]
    fn test_click_saves_named_location() {
        let mut session = session();
        let mut dialog = ScriptedDialog::new().answer("").answer("Gedung Sate");
        let mut map = RecordingMap::new();

        let outcome = session
            .handle_click(from_lon_lat(&GEDUNG_SATE), &mut dialog, &mut map)
            .unwrap();

        let ClickOutcome::Saved { name, coordinate } = outcome else {
            panic!("expected a save");
        };
        assert_eq!(name, "Gedung Sate");
        assert!((coordinate.longitude - GEDUNG_SATE.longitude).abs() < 1e-9);
        assert!((coordinate.latitude - GEDUNG_SATE.latitude).abs() < 1e-9);

        assert_eq!(dialog.rejected_inputs, 1);
        assert_eq!(dialog.last_notice().unwrap().level, NoticeLevel::Success);
        assert_eq!(map.marker_names(), vec!["Gedung Sate"]);
        assert_eq!(session.store().load().len(), 1);
    }

    #[test]
    fn test_click_cancelled_saves_nothing() {
        let mut session = session();
        let mut dialog = ScriptedDialog::new().cancel();
        let mut map = RecordingMap::new();

        let outcome = session
            .handle_click(from_lon_lat(&CITY_HALL), &mut dialog, &mut map)
            .unwrap();

        assert_eq!(outcome, ClickOutcome::Cancelled);
        assert!(session.store().is_empty());
        assert!(map.commands.is_empty());
        assert!(dialog.notices.is_empty());
    }

    #[test]
    fn test_click_storage_failure_is_error() {
        let store = LocationStore::open(ReadOnlyStorage);
        let mut session = MapSession::new(store, GeolocationOptions::default());
        let mut dialog = ScriptedDialog::new().answer("A");
        let mut map = RecordingMap::new();

        let err = session
            .handle_click(from_lon_lat(&CITY_HALL), &mut dialog, &mut map)
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::StorageWriteFailed);
        assert!(map.commands.is_empty());
    }

    #[test]
    fn test_save_rejects_blank_name() {
        let mut session = session();
        let mut dialog = ScriptedDialog::new();
        let mut map = RecordingMap::new();

        let err = session
            .save("  ".to_string(), CITY_HALL, &mut dialog, &mut map)
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::EmptyName);
        assert!(map.commands.is_empty());
        assert!(dialog.notices.is_empty());
    }

    #[test]
    fn test_request_position_uses_guard() {
        let session = seeded_session();
        let provider = FixedLocationProvider::new(CITY_HALL);

        let ticket = session.requests().begin().unwrap();
        let err = session.request_position(&provider).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestInFlight);
        drop(ticket);

        let position = session.request_position(&provider).unwrap().unwrap();
        assert_eq!(position.point, CITY_HALL);
        assert!(!session.requests().is_in_flight());

        let failed = session
            .request_position(&FailingLocationProvider::new(PositionError::Timeout))
            .unwrap();
        assert_eq!(failed.unwrap_err(), PositionError::Timeout);
        assert!(!session.requests().is_in_flight());
    }

    #[test]
    fn test_open_map_centers_then_marks() {
        let session = seeded_session().with_initial_view(GEDUNG_SATE, 12);
        let mut map = RecordingMap::new();

        assert_eq!(session.open_map(&mut map), 2);
        assert_eq!(
            map.commands[0],
            MapCommand::Center {
                center: from_lon_lat(&GEDUNG_SATE),
                zoom: 12,
            }
        );
        assert_eq!(map.marker_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_open_map_default_view() {
        let session = session();
        let mut map = RecordingMap::new();

        assert_eq!(session.open_map(&mut map), 0);
        assert_eq!(map.last_center(), Some((from_lon_lat(&DEFAULT_CENTER), DEFAULT_ZOOM)));
    }

    #[test]
    fn test_render_skips_malformed() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                crate::store::LOCATIONS_KEY,
                r#"[{"name":"bad","coordinate":[1.0]},{"name":"A","coordinate":[107.6098,-6.9175]}]"#,
            )
            .unwrap();
        let session = MapSession::new(LocationStore::open(storage), GeolocationOptions::default());
        let mut map = RecordingMap::new();

        assert_eq!(session.render_saved_markers(&mut map), 1);
        assert_eq!(map.marker_names(), vec!["A"]);
    }

    #[test]
    fn test_show_details() {
        let session = seeded_session();
        let mut dialog = ScriptedDialog::new();

        session.show_details(1, &mut dialog).unwrap();
        let notice = dialog.last_notice().unwrap();
        assert_eq!(notice.title, "Location details");
        assert!(notice.lines.contains(&crate::dialog::NoticeLine::Field {
            label: "Coordinate".to_string(),
            value: "-6.90250, 107.61910".to_string(),
        }));

        let err = session.show_details(9, &mut dialog).unwrap_err();
        assert_eq!(err.code, ErrorCode::LocationNotFound);
    }

    #[test]
    fn test_locate_nearest_found() {
        let mut session = seeded_session();
        let provider = FixedLocationProvider::new(GeoPoint::new(107.61, -6.915));
        let mut dialog = ScriptedDialog::new();
        let mut map = RecordingMap::new();

        let outcome = session.locate_nearest(&provider, &mut dialog, &mut map).unwrap();

        let NearestOutcome::Found { name, index, distance_km, .. } = outcome else {
            panic!("expected a match");
        };
        assert_eq!(name, "A");
        assert_eq!(index, 0);
        assert!((distance_km - 0.279).abs() < 0.01);

        assert!(matches!(map.commands[0], MapCommand::UserMarker(_)));
        let (center, zoom) = map.last_center().unwrap();
        assert_eq!(zoom, DEFAULT_FOCUS_ZOOM);
        assert_eq!(center, from_lon_lat(&CITY_HALL));
        assert!(!session.requests().is_in_flight());

        let notice = dialog.last_notice().unwrap();
        assert_eq!(notice.title, "Nearest location found");
        assert!(notice.lines.contains(&crate::dialog::NoticeLine::Field {
            label: "Distance".to_string(),
            value: "0.28 km".to_string(),
        }));
    }

    #[test]
    fn test_locate_nearest_empty_store() {
        let mut session = session();
        let provider = FixedLocationProvider::new(CITY_HALL);
        let mut dialog = ScriptedDialog::new();
        let mut map = RecordingMap::new();

        let outcome = session.locate_nearest(&provider, &mut dialog, &mut map).unwrap();

        assert_eq!(outcome, NearestOutcome::NoSavedLocations);
        assert_eq!(dialog.last_notice().unwrap().title, "No saved locations");
    }

    #[test]
    fn test_locate_nearest_only_malformed() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(crate::store::LOCATIONS_KEY, r#"[{"name":"bad","coordinate":[1.0]}]"#)
            .unwrap();
        let mut session =
            MapSession::new(LocationStore::open(storage), GeolocationOptions::default());
        let mut dialog = ScriptedDialog::new();
        let mut map = RecordingMap::new();

        let outcome = session
            .locate_nearest(&FixedLocationProvider::new(CITY_HALL), &mut dialog, &mut map)
            .unwrap();

        assert_eq!(outcome, NearestOutcome::NoneFound);
    }

    #[test]
    fn test_locate_nearest_denied() {
        let mut session = seeded_session();
        let provider = FailingLocationProvider::new(PositionError::PermissionDenied);
        let mut dialog = ScriptedDialog::new();
        let mut map = RecordingMap::new();

        let outcome = session.locate_nearest(&provider, &mut dialog, &mut map).unwrap();

        assert_eq!(
            outcome,
            NearestOutcome::LocationUnavailable {
                error: PositionError::PermissionDenied
            }
        );
        assert_eq!(dialog.last_notice().unwrap().level, NoticeLevel::Warning);
        assert!(map.commands.is_empty());
        assert!(!session.requests().is_in_flight());
    }

    struct ReentrantProvider {
        requests: LocationRequests,
    }

    impl LocationProvider for ReentrantProvider {
        fn current_position(
            &self,
            _options: &GeolocationOptions,
        ) -> std::result::Result<Position, PositionError> {
            // A second trigger while this reply is pending must be refused.
            assert!(self.requests.begin().is_err());
            Ok(Position::new(CITY_HALL))
        }
    }

    #[test]
    fn test_overlapping_request_refused() {
        let mut session = seeded_session();
        let provider = ReentrantProvider {
            requests: session.requests().clone(),
        };
        let mut dialog = ScriptedDialog::new();
        let mut map = RecordingMap::new();

        let outcome = session.locate_nearest(&provider, &mut dialog, &mut map).unwrap();
        assert!(matches!(outcome, NearestOutcome::Found { .. }));

        let _held = session.requests().begin().unwrap();
        let err = session
            .locate_nearest(&FixedLocationProvider::new(CITY_HALL), &mut dialog, &mut map)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestInFlight);
    }
}
