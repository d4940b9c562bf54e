/// Data layer: incident types, loading, and the derived-view pipeline.
///
/// Architecture:
/// ```text
///   crime CSV
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → IncidentDataset (bad rows dropped)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  time window + crime type → Vec<&Incident>
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌───────────┐  ┌──────────┐
///   │ aggregate  │  │ cluster   │  buckets / categories, map clusters
///   └───────────┘  └──────────┘
///        │              │
///        └──────┬───────┘
///               ▼
///        ┌────────────┐
///        │ view_model  │  compute_view_model(dataset, state)
///        └────────────┘
/// ```

pub mod aggregate;
pub mod cluster;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view_model;
