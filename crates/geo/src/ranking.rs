//! Distance ranking with optional parallelism.
//!
//! Lists every saved entry by distance from a query point, for "what is near
//! me" views that show more than the single nearest match.

use crate::{distance_km, GeoPoint, Located};
use serde::{Deserialize, Serialize};

/// Distance of one entry from the query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Position of the entry in the ranked slice
    pub index: usize,
    /// Distance in kilometers
    pub distance_km: f64,
}

/// Ranks entries by distance from `query`, closest first.
///
/// Entries without a well-formed position are left out. The sort is stable, so
/// entries at equal distance keep their original order.
///
/// # Example
/// ```
/// use pinmap_geo::{rank_by_distance, GeoPoint};
///
/// let points = [GeoPoint::new(10.0, 0.0), GeoPoint::new(1.0, 0.0), GeoPoint::new(5.0, 0.0)];
/// let ranked = rank_by_distance(&GeoPoint::new(0.0, 0.0), &points, None);
/// let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
/// assert_eq!(order, vec![1, 2, 0]);
/// ```
pub fn rank_by_distance<T: Located + Sync>(
    query: &GeoPoint,
    entries: &[T],
    max_results: Option<usize>,
) -> Vec<RankedEntry> {
    let mut results = measure(query, entries);

    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    if let Some(max) = max_results {
        results.truncate(max);
    }

    results
}

/// Entries within `radius_km` of `query`, closest first.
pub fn within_radius<T: Located + Sync>(
    query: &GeoPoint,
    entries: &[T],
    radius_km: f64,
) -> Vec<RankedEntry> {
    let mut results = rank_by_distance(query, entries, None);
    results.retain(|r| r.distance_km <= radius_km);
    results
}

fn measure<T: Located + Sync>(query: &GeoPoint, entries: &[T]) -> Vec<RankedEntry> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        entries
            .par_iter()
            .enumerate()
            .filter_map(|(index, entry)| measure_single(query, index, entry))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| measure_single(query, index, entry))
            .collect()
    }
}

#[inline]
fn measure_single<T: Located>(query: &GeoPoint, index: usize, entry: &T) -> Option<RankedEntry> {
    entry.position().map(|position| RankedEntry {
        index,
        distance_km: distance_km(query, &position),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Raw(Vec<f64>);

    impl Located for Raw {
        fn position(&self) -> Option<GeoPoint> {
            GeoPoint::from_slice(&self.0)
        }
    }

    fn create_test_entries() -> Vec<Raw> {
        vec![
            // Berlin
            Raw(vec![13.4050, 52.5200]),
            // Paris
            Raw(vec![2.3522, 48.8566]),
            // London
            Raw(vec![-0.1276, 51.5074]),
            // Malformed
            Raw(vec![8.0]),
        ]
    }

    // Frankfurt sits roughly between Berlin and Paris.
    const FRANKFURT: GeoPoint = GeoPoint::new(8.6821, 50.1109);

    #[test]
    fn test_sorted_and_skips_malformed() {
        let entries = create_test_entries();
        let results = rank_by_distance(&FRANKFURT, &entries, None);

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.index != 3));
        for window in results.windows(2) {
            assert!(window[0].distance_km <= window[1].distance_km);
        }
    }

    #[test]
    fn test_max_results() {
        let entries = create_test_entries();
        let results = rank_by_distance(&FRANKFURT, &entries, Some(2));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_radius_filter() {
        let entries = create_test_entries();
        let results = within_radius(&FRANKFURT, &entries, 450.0);

        // Berlin (~424 km) is inside; Paris (~478 km) and London (~637 km) are not.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);
    }

    #[test]
    fn test_equal_distances_keep_order() {
        let entries = [GeoPoint::new(1.0, 0.0), GeoPoint::new(-1.0, 0.0)];
        let results = rank_by_distance(&GeoPoint::new(0.0, 0.0), &entries, None);
        assert_eq!(results[0].index, 0);
        assert_eq!(results[1].index, 1);
    }
}
