use super::aggregate::{by_category, by_time};
use super::cluster::{cluster_incidents, DEFAULT_CLUSTER_RADIUS};
use super::filter::{filter_incidents, with_location};
use super::model::{
    Bucket, CategoryCount, CategoryOrder, Cluster, Granularity, IncidentDataset, TimeRange,
};

// ---------------------------------------------------------------------------
// ViewState – every input the derived views depend on
// ---------------------------------------------------------------------------

/// The user-controlled inputs of one recompute pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Selected crime type; empty selects all.
    pub crime_type: String,
    pub time_range: TimeRange,
    pub granularity: Granularity,
    pub category_order: CategoryOrder,
    /// Cluster box half-width in degrees.
    pub cluster_radius: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            crime_type: String::new(),
            time_range: TimeRange::default(),
            granularity: Granularity::default(),
            category_order: CategoryOrder::default(),
            cluster_radius: DEFAULT_CLUSTER_RADIUS,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewModel – everything the charts and the map draw
// ---------------------------------------------------------------------------

/// Derived data for one render. Rebuilt from scratch on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    /// Time series over the whole dataset, crime-type filter only.
    pub overview: Vec<Bucket>,
    /// Time series for the selected window and crime type.
    pub buckets: Vec<Bucket>,
    /// Distribution of crime types within the selected window.
    pub categories: Vec<CategoryCount>,
    /// Map clusters for the selected window and crime type.
    pub clusters: Vec<Cluster>,
    /// Incidents passing the full filter.
    pub filtered_count: usize,
    /// Of those, incidents with usable coordinates.
    pub located_count: usize,
}

/// Run the full filter → aggregate → cluster pipeline for `state`.
pub fn compute_view_model(dataset: &IncidentDataset, state: &ViewState) -> ViewModel {
    let filtered = filter_incidents(&dataset.incidents, &state.time_range, &state.crime_type);
    let located = with_location(filtered.iter().copied());

    let overview = match dataset.extent() {
        Some(extent) => by_time(
            filter_incidents(&dataset.incidents, &extent, &state.crime_type),
            state.granularity,
        ),
        None => Vec::new(),
    };

    // The distribution ignores the crime-type selection so every type stays
    // visible (and selectable) while one is selected.
    let in_window = filter_incidents(&dataset.incidents, &state.time_range, "");

    let model = ViewModel {
        overview,
        buckets: by_time(filtered.iter().copied(), state.granularity),
        categories: by_category(in_window, state.category_order),
        clusters: cluster_incidents(located.iter().copied(), state.cluster_radius),
        filtered_count: filtered.len(),
        located_count: located.len(),
    };

    log::debug!(
        "Recomputed view: {} incidents, {} buckets, {} categories, {} clusters",
        model.filtered_count,
        model.buckets.len(),
        model.categories.len(),
        model.clusters.len()
    );
    model
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::Incident;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> IncidentDataset {
        let mk = |date, crime_type: &str, lat, lng| Incident {
            date,
            lat,
            lng,
            crime_type: crime_type.to_string(),
        };
        IncidentDataset::from_incidents(vec![
            mk(ymd(2015, 1, 1), "THEFT", 30.0, -97.0),
            mk(ymd(2015, 1, 1), "THEFT", 30.01, -97.01),
            mk(ymd(2015, 2, 1), "BURGLARY", f64::NAN, f64::NAN),
            mk(ymd(2015, 3, 5), "THEFT", 31.0, -97.0),
            mk(ymd(2015, 3, 9), "ASSAULT", 30.02, -97.0),
        ])
    }

    #[test]
    fn full_year_view() {
        let vm = compute_view_model(&dataset(), &ViewState::default());
        assert_eq!(vm.filtered_count, 5);
        assert_eq!(vm.located_count, 4);
        assert_eq!(vm.buckets.len(), 4);
        assert_eq!(vm.buckets[0], Bucket { start: ymd(2015, 1, 1), count: 2 });
        assert_eq!(vm.overview, vm.buckets);
        assert_eq!(vm.categories[0], CategoryCount { category: "THEFT".into(), count: 3 });
        assert_eq!(
            vm.clusters,
            [
                Cluster { lat: 30.0, lng: -97.0, count: 3 },
                Cluster { lat: 31.0, lng: -97.0, count: 1 },
            ]
        );
    }

    #[test]
    fn crime_type_selection_narrows_everything_but_categories() {
        let state = ViewState {
            crime_type: "THEFT".into(),
            granularity: Granularity::Month,
            ..ViewState::default()
        };
        let vm = compute_view_model(&dataset(), &state);
        assert_eq!(vm.filtered_count, 3);
        assert_eq!(
            vm.buckets,
            [
                Bucket { start: ymd(2015, 1, 1), count: 2 },
                Bucket { start: ymd(2015, 3, 1), count: 1 },
            ]
        );
        assert_eq!(vm.categories.len(), 3);
        assert_eq!(vm.clusters.iter().map(|c| c.count).sum::<usize>(), 3);
    }

    #[test]
    fn time_window_narrows_detail_but_not_overview() {
        let state = ViewState {
            time_range: TimeRange::new(ymd(2015, 3, 31), ymd(2015, 2, 1)),
            ..ViewState::default()
        };
        let vm = compute_view_model(&dataset(), &state);
        assert_eq!(vm.filtered_count, 3);
        assert_eq!(vm.buckets.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(vm.overview.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(vm.categories.iter().map(|c| c.count).sum::<usize>(), 3);
    }

    #[test]
    fn empty_dataset_gives_empty_model() {
        let vm = compute_view_model(&IncidentDataset::default(), &ViewState::default());
        assert_eq!(vm, ViewModel::default());
    }
}
