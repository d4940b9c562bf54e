use super::model::{Cluster, Incident};

/// Default box half-width in degrees (roughly 5 km around Austin).
pub const DEFAULT_CLUSTER_RADIUS: f64 = 0.05;

// ---------------------------------------------------------------------------
// Greedy box clustering
// ---------------------------------------------------------------------------

/// Group `(lat, lng)` points into clusters in a single greedy pass.
///
/// Each point joins the *first* existing cluster (in creation order) whose
/// anchor lies within `radius` degrees on both axes; otherwise it starts a
/// new cluster anchored at itself. Anchors are never recentred, so the result
/// depends on input order. Points with a non-finite coordinate are skipped.
///
/// Runs in O(n·k) for k clusters.
pub fn cluster_points<I>(points: I, radius: f64) -> Vec<Cluster>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut clusters: Vec<Cluster> = Vec::new();

    for (lat, lng) in points {
        if !lat.is_finite() || !lng.is_finite() {
            continue;
        }
        match clusters
            .iter_mut()
            .find(|c| (c.lat - lat).abs() <= radius && (c.lng - lng).abs() <= radius)
        {
            Some(cluster) => cluster.count += 1,
            None => clusters.push(Cluster { lat, lng, count: 1 }),
        }
    }

    clusters
}

/// Cluster the located incidents of `incidents`, in input order.
pub fn cluster_incidents<'a, I>(incidents: I, radius: f64) -> Vec<Cluster>
where
    I: IntoIterator<Item = &'a Incident>,
{
    cluster_points(incidents.into_iter().map(|i| (i.lat, i.lng)), radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(clusters: &[Cluster]) -> usize {
        clusters.iter().map(|c| c.count).sum()
    }

    #[test]
    fn nearby_points_merge_and_far_point_splits() {
        let clusters = cluster_points(
            [(30.0, -97.0), (30.01, -97.01), (31.0, -97.0)],
            DEFAULT_CLUSTER_RADIUS,
        );
        assert_eq!(
            clusters,
            [
                Cluster { lat: 30.0, lng: -97.0, count: 2 },
                Cluster { lat: 31.0, lng: -97.0, count: 1 },
            ]
        );
    }

    #[test]
    fn anchor_never_moves() {
        // Each point is within radius of the first, but the last is outside
        // radius of the mean; it still joins because only the anchor counts.
        let points = [(0.0, 0.0), (0.05, 0.05), (0.05, 0.05), (-0.05, -0.05)];
        let clusters = cluster_points(points, 0.05);
        assert_eq!(clusters, [Cluster { lat: 0.0, lng: 0.0, count: 4 }]);
    }

    #[test]
    fn first_match_wins_over_nearest() {
        // Point (0.09, 0) is within radius of both anchors but nearer the second.
        let clusters = cluster_points([(0.0, 0.0), (0.12, 0.0), (0.09, 0.0)], 0.1);
        assert_eq!(clusters[0].count, 2);
        assert_eq!(clusters[1].count, 1);
    }

    #[test]
    fn box_metric_not_euclidean() {
        // Diagonal offset exceeds radius in Euclidean terms but each axis is within it.
        let clusters = cluster_points([(0.0, 0.0), (0.05, 0.05)], 0.05);
        assert_eq!(clusters.len(), 1);
        // Just outside on one axis.
        let clusters = cluster_points([(0.0, 0.0), (0.0, 0.0501)], 0.05);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn result_depends_on_input_order() {
        let forward = cluster_points([(0.0, 0.0), (0.08, 0.0), (0.16, 0.0)], 0.1);
        let backward = cluster_points([(0.16, 0.0), (0.08, 0.0), (0.0, 0.0)], 0.1);
        assert_eq!(forward[0], Cluster { lat: 0.0, lng: 0.0, count: 2 });
        assert_eq!(backward[0], Cluster { lat: 0.16, lng: 0.0, count: 2 });
    }

    #[test]
    fn repeated_runs_are_identical() {
        let points: Vec<(f64, f64)> = (0..500)
            .map(|i| {
                let i = f64::from(i);
                (30.1 + (i * 0.37).sin() * 0.3, -97.7 + (i * 0.53).cos() * 0.3)
            })
            .collect();
        let a = cluster_points(points.iter().copied(), DEFAULT_CLUSTER_RADIUS);
        let b = cluster_points(points.iter().copied(), DEFAULT_CLUSTER_RADIUS);
        assert_eq!(a, b);
        assert_eq!(total(&a), points.len());
    }

    #[test]
    fn invalid_points_are_skipped() {
        let clusters = cluster_points(
            [(f64::NAN, -97.0), (30.0, f64::NAN), (30.0, -97.0), (f64::INFINITY, 0.0)],
            DEFAULT_CLUSTER_RADIUS,
        );
        assert_eq!(clusters, [Cluster { lat: 30.0, lng: -97.0, count: 1 }]);
        assert_eq!(total(&clusters), 1);
    }

    #[test]
    fn clusters_incidents_with_location_only() {
        use chrono::NaiveDate;
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let mk = |lat, lng| Incident {
            date,
            lat,
            lng,
            crime_type: "THEFT".to_string(),
        };
        let data = vec![mk(30.0, -97.0), mk(f64::NAN, f64::NAN), mk(30.02, -97.03)];
        let clusters = cluster_incidents(&data, DEFAULT_CLUSTER_RADIUS);
        assert_eq!(clusters, [Cluster { lat: 30.0, lng: -97.0, count: 2 }]);
    }
}
