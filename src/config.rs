use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::cluster::DEFAULT_CLUSTER_RADIUS;
use crate::data::model::{CategoryOrder, Granularity};
use crate::state::{HoverPolicy, TrendStyle};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "crime-dashboard.json";

/// Dashboard settings. Every field is optional in the JSON file:
///
/// ```json
/// {
///   "data_path": "dataset/Annual_Crime_Dataset_2015withLongLad.csv",
///   "cluster_radius": 0.05,
///   "granularity": "month",
///   "category_order": "first_seen",
///   "hover_policy": "select",
///   "trend_style": "bar"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub cluster_radius: f64,
    pub granularity: Granularity,
    pub category_order: CategoryOrder,
    pub hover_policy: HoverPolicy,
    pub trend_style: TrendStyle,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("dataset/Annual_Crime_Dataset_2015withLongLad.csv"),
            cluster_radius: DEFAULT_CLUSTER_RADIUS,
            granularity: Granularity::Day,
            category_order: CategoryOrder::CountDescending,
            hover_policy: HoverPolicy::Inspect,
            trend_style: TrendStyle::Line,
        }
    }
}

impl DashboardConfig {
    /// Load settings.
    ///
    /// An explicit `path` must exist and parse. Without one, the default
    /// file is read if present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE}, using default settings");
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("invalid JSON settings")?;
        anyhow::ensure!(
            config.cluster_radius.is_finite() && config.cluster_radius >= 0.0,
            "cluster_radius must be a non-negative number, got {}",
            config.cluster_radius
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(DashboardConfig::from_json("{}").unwrap(), DashboardConfig::default());
    }

    #[test]
    fn parses_every_field() {
        let cfg = DashboardConfig::from_json(
            r#"{
                "data_path": "data/crimes.csv",
                "cluster_radius": 0.1,
                "granularity": "month",
                "category_order": "first_seen",
                "hover_policy": "select",
                "trend_style": "bar"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("data/crimes.csv"));
        assert_eq!(cfg.cluster_radius, 0.1);
        assert_eq!(cfg.granularity, Granularity::Month);
        assert_eq!(cfg.category_order, CategoryOrder::FirstSeen);
        assert_eq!(cfg.hover_policy, HoverPolicy::Select);
        assert_eq!(cfg.trend_style, TrendStyle::Bar);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(DashboardConfig::from_json(r#"{"cluster_radius": -1}"#).is_err());
        assert!(DashboardConfig::from_json(r#"{"granularity": "week"}"#).is_err());
        assert!(DashboardConfig::from_json(r#"{"radius": 0.1}"#).is_err());
        assert!(DashboardConfig::from_json("not json").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(DashboardConfig::load(Some(Path::new("no/such/config.json"))).is_err());
    }
}
