use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Incident – one row of the crime CSV
// ---------------------------------------------------------------------------

/// A single reported crime incident.
///
/// `lat`/`lng` are `NaN` when the source row had no usable coordinates;
/// spatial consumers check [`Incident::has_location`] before using them.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    /// Report date (day resolution).
    pub date: NaiveDate,
    pub lat: f64,
    pub lng: f64,
    /// Offense description, trimmed and never empty.
    pub crime_type: String,
}

impl Incident {
    /// Whether both coordinates are usable for map display.
    pub fn has_location(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

// ---------------------------------------------------------------------------
// TimeRange – inclusive date window
// ---------------------------------------------------------------------------

/// Slider step: one day in milliseconds.
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Inclusive `[start, end]` date window. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeRange {
    /// Build a range from two bounds in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// January 1st through December 31st of `year`.
    pub fn year(year: i32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
        let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// Build a range from slider values (milliseconds since the Unix epoch).
    ///
    /// Returns `None` if either bound is not a finite, representable instant.
    pub fn from_epoch_millis(start_ms: f64, end_ms: f64) -> Option<Self> {
        let a = date_from_millis(start_ms)?;
        let b = date_from_millis(end_ms)?;
        Some(Self::new(a, b))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Midnight UTC of the start day, in epoch milliseconds.
    pub fn start_millis(&self) -> f64 {
        millis_from_date(self.start)
    }

    /// Midnight UTC of the end day, in epoch milliseconds.
    pub fn end_millis(&self) -> f64 {
        millis_from_date(self.end)
    }

    /// Inclusive at both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::year(2015)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {}", self.start, self.end)
    }
}

/// UTC calendar day of an epoch-millisecond instant.
pub fn date_from_millis(ms: f64) -> Option<NaiveDate> {
    if !ms.is_finite() {
        return None;
    }
    let floored = (ms / MILLIS_PER_DAY).floor() * MILLIS_PER_DAY;
    if floored < i64::MIN as f64 || floored > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(floored as i64).map(|dt| dt.date_naive())
}

/// Midnight UTC of `date`, in epoch milliseconds.
pub fn millis_from_date(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis() as f64
}

// ---------------------------------------------------------------------------
// Aggregation keys and results
// ---------------------------------------------------------------------------

/// Time bucket size for temporal aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Month,
}

impl Granularity {
    /// First day of the bucket containing `date`.
    pub fn floor(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Day => "Day",
            Granularity::Month => "Month",
        }
    }
}

/// Ordering of categorical aggregation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrder {
    /// Order in which each crime type first appears in the input.
    FirstSeen,
    /// Highest count first; ties keep first-seen order.
    #[default]
    CountDescending,
}

/// Incident count for one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Floor of the bucket (the day itself, or the 1st of the month).
    pub start: NaiveDate,
    pub count: usize,
}

/// Incident count for one crime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Greedy spatial accumulator.
///
/// The anchor is the position of the first point that created the cluster
/// and never moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub lat: f64,
    pub lng: f64,
    pub count: usize,
}

impl Cluster {
    /// Marker radius in screen points: `sqrt(count) * 0.8`, never below
    /// [`Cluster::MIN_MARKER_RADIUS`].
    pub fn marker_radius(&self) -> f32 {
        ((self.count as f32).sqrt() * 0.8).max(Self::MIN_MARKER_RADIUS)
    }

    pub const MIN_MARKER_RADIUS: f32 = 2.0;
}

// ---------------------------------------------------------------------------
// IncidentDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All incidents of a session plus the distinct crime types, for selectors.
#[derive(Debug, Clone, Default)]
pub struct IncidentDataset {
    pub incidents: Vec<Incident>,
    pub crime_types: BTreeSet<String>,
}

impl IncidentDataset {
    /// Build the crime-type index from the loaded incidents.
    pub fn from_incidents(incidents: Vec<Incident>) -> Self {
        let crime_types = incidents.iter().map(|i| i.crime_type.clone()).collect();
        IncidentDataset {
            incidents,
            crime_types,
        }
    }

    /// Earliest and latest report date, or `None` when empty.
    pub fn extent(&self) -> Option<TimeRange> {
        let mut dates = self.incidents.iter().map(|i| i.date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(TimeRange::new(min, max))
    }

    /// Number of incidents with usable coordinates.
    pub fn located_len(&self) -> usize {
        self.incidents.iter().filter(|i| i.has_location()).count()
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}
