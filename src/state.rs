use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::color::CategoryColors;
use crate::config::DashboardConfig;
use crate::data::loader::load_file;
use crate::data::model::{CategoryOrder, Granularity, IncidentDataset, TimeRange};
use crate::data::view_model::{compute_view_model, ViewModel, ViewState};

// ---------------------------------------------------------------------------
// Display policies
// ---------------------------------------------------------------------------

/// What hovering a bar of the crime-type distribution does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverPolicy {
    /// Highlight only.
    #[default]
    Inspect,
    /// Select the hovered type for all views while hovered.
    Select,
}

/// Rendering of the time-series charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStyle {
    #[default]
    Line,
    Bar,
}

/// Outcome of the most recent load attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    /// Nothing loaded yet.
    #[default]
    Empty,
    Loaded,
    /// The last load failed; no dataset is held.
    Failed(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The dataset is immutable once loaded. Every change to [`ViewState`] goes
/// through a setter that recomputes [`ViewModel`] from scratch.
#[derive(Debug, Default)]
pub struct AppState {
    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<IncidentDataset>,

    pub status: LoadStatus,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    view: ViewState,

    /// Latest derived data; the only thing the views read.
    pub view_model: ViewModel,

    /// Colour per crime type, rebuilt on load.
    pub colors: Option<CategoryColors>,

    pub hover_policy: HoverPolicy,

    pub trend_style: TrendStyle,

    /// Crime type currently under the pointer in the distribution chart.
    pub hovered_category: Option<String>,

    /// Selection to restore when a `HoverPolicy::Select` hover ends.
    selection_before_hover: Option<String>,
}

impl AppState {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            view: ViewState {
                granularity: config.granularity,
                category_order: config.category_order,
                cluster_radius: config.cluster_radius,
                ..ViewState::default()
            },
            hover_policy: config.hover_policy,
            trend_style: config.trend_style,
            ..Self::default()
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Load `path`, replacing any previous dataset. A failure leaves the
    /// state in `LoadStatus::Failed` with no dataset.
    pub fn load_from_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.fail_load(format!("Could not load {}: {e}", path.display()));
            }
        }
    }

    /// Ingest a newly loaded dataset, reset the selection and recompute.
    pub fn set_dataset(&mut self, dataset: IncidentDataset) {
        if dataset.is_empty() {
            log::warn!("Dataset contains no valid incidents");
        }
        if let Some(extent) = dataset.extent() {
            self.view.time_range = extent;
        }
        self.view.crime_type.clear();
        self.hovered_category = None;
        self.selection_before_hover = None;
        self.colors = Some(CategoryColors::new(dataset.crime_types.iter()));

        self.dataset = Some(dataset);
        self.status = LoadStatus::Loaded;
        self.recompute();
    }

    pub fn fail_load(&mut self, message: String) {
        self.dataset = None;
        self.colors = None;
        self.view_model = ViewModel::default();
        self.status = LoadStatus::Failed(message);
    }

    /// Slider bounds: the dataset extent, or calendar 2015 before a load.
    pub fn slider_bounds(&self) -> TimeRange {
        self.dataset
            .as_ref()
            .and_then(IncidentDataset::extent)
            .unwrap_or_default()
    }

    /// Recompute the view model from the dataset and the current view state.
    pub fn recompute(&mut self) {
        self.view_model = match &self.dataset {
            Some(ds) => compute_view_model(ds, &self.view),
            None => ViewModel::default(),
        };
    }

    // -- view-state setters: each recomputes only on an actual change --

    /// Select a crime type (`""` for all).
    pub fn set_crime_type(&mut self, crime_type: &str) {
        self.selection_before_hover = None;
        self.apply_crime_type(crime_type);
    }

    fn apply_crime_type(&mut self, crime_type: &str) {
        if self.view.crime_type != crime_type {
            self.view.crime_type = crime_type.to_string();
            self.recompute();
        }
    }

    /// Apply slider values in epoch milliseconds. Inverted bounds are swapped;
    /// non-finite input is ignored and the previous range kept.
    ///
    /// Returns whether the range was accepted.
    pub fn set_time_range_millis(&mut self, start_ms: f64, end_ms: f64) -> bool {
        let Some(range) = TimeRange::from_epoch_millis(start_ms, end_ms) else {
            log::warn!("Ignoring invalid time range input ({start_ms}, {end_ms})");
            return false;
        };
        self.set_time_range(range);
        true
    }

    pub fn set_time_range(&mut self, range: TimeRange) {
        if self.view.time_range != range {
            self.view.time_range = range;
            self.recompute();
        }
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        if self.view.granularity != granularity {
            self.view.granularity = granularity;
            self.recompute();
        }
    }

    pub fn set_category_order(&mut self, order: CategoryOrder) {
        if self.view.category_order != order {
            self.view.category_order = order;
            self.recompute();
        }
    }

    /// Returns whether the radius was accepted (finite and non-negative).
    pub fn set_cluster_radius(&mut self, radius: f64) -> bool {
        if !radius.is_finite() || radius < 0.0 {
            log::warn!("Ignoring invalid cluster radius {radius}");
            return false;
        }
        if self.view.cluster_radius != radius {
            self.view.cluster_radius = radius;
            self.recompute();
        }
        true
    }

    /// Pointer entered (`Some`) or left (`None`) a distribution bar.
    pub fn hover_category(&mut self, category: Option<&str>) {
        if self.hovered_category.as_deref() == category {
            return;
        }
        self.hovered_category = category.map(str::to_string);

        if self.hover_policy != HoverPolicy::Select {
            return;
        }
        match category {
            Some(cat) => {
                if self.selection_before_hover.is_none() {
                    self.selection_before_hover = Some(self.view.crime_type.clone());
                }
                self.apply_crime_type(cat);
            }
            None => {
                if let Some(previous) = self.selection_before_hover.take() {
                    self.apply_crime_type(&previous);
                }
            }
        }
    }
}
