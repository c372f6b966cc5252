//! Nearest-point search.
//!
//! A full linear scan. Saved lists are small (a handful to a few hundred
//! points), so no spatial index is kept.

use crate::{distance_km, GeoPoint};

/// Anything that may carry a geographic position.
///
/// Entries loaded from storage can be malformed; they report `None` and are
/// skipped by the search.
pub trait Located {
    fn position(&self) -> Option<GeoPoint>;
}

impl Located for GeoPoint {
    #[inline]
    fn position(&self) -> Option<GeoPoint> {
        Some(*self)
    }
}

/// The closest entry found by [`find_nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<'a, T> {
    /// The matching entry
    pub entry: &'a T,
    /// Position of the entry in the searched slice
    pub index: usize,
    /// Distance from the query in kilometers
    pub distance_km: f64,
}

/// Finds the entry closest to `query`.
///
/// Returns `None` when `entries` is empty or none of them has a well-formed
/// position. Among entries at exactly the same distance the earliest one wins.
///
/// # Example
/// ```
/// use pinmap_geo::{find_nearest, GeoPoint};
///
/// let points = [GeoPoint::new(107.6098, -6.9175), GeoPoint::new(107.6191, -6.9025)];
/// let nearest = find_nearest(&GeoPoint::new(107.61, -6.915), &points).unwrap();
/// assert_eq!(nearest.index, 0);
/// ```
pub fn find_nearest<'a, T: Located>(query: &GeoPoint, entries: &'a [T]) -> Option<Nearest<'a, T>> {
    let mut best: Option<Nearest<'a, T>> = None;

    for (index, entry) in entries.iter().enumerate() {
        let Some(position) = entry.position() else {
            tracing::debug!(index, "Skipping entry without a well-formed coordinate");
            continue;
        };

        let distance = distance_km(query, &position);
        // A NaN distance (from a NaN query) never counts as closer
        let closer = match &best {
            Some(current) => distance < current.distance_km,
            None => !distance.is_nan(),
        };

        if closer {
            best = Some(Nearest {
                entry,
                index,
                distance_km: distance,
            });
        }
    }

    best
}
