use super::model::{Incident, TimeRange};

// ---------------------------------------------------------------------------
// Filter predicate: time window + optional crime type
// ---------------------------------------------------------------------------

/// Whether `incident` passes the time window and crime-type selector.
///
/// * The report date must lie in `range` (inclusive).
/// * An empty `crime_type` selects every type; otherwise the incident's type
///   must equal the trimmed selector exactly (case-sensitive).
pub fn matches(incident: &Incident, range: &TimeRange, crime_type: &str) -> bool {
    if !range.contains(incident.date) {
        return false;
    }
    crime_type.is_empty() || incident.crime_type == crime_type.trim()
}

/// Return the incidents passing [`matches`], in input order.
///
/// Accepts any iterator of references so an already-filtered set can be
/// filtered again.
pub fn filter_incidents<'a, I>(
    incidents: I,
    range: &TimeRange,
    crime_type: &str,
) -> Vec<&'a Incident>
where
    I: IntoIterator<Item = &'a Incident>,
{
    incidents
        .into_iter()
        .filter(|incident| matches(incident, range, crime_type))
        .collect()
}

/// Keep only incidents usable on the map.
pub fn with_location<'a, I>(incidents: I) -> Vec<&'a Incident>
where
    I: IntoIterator<Item = &'a Incident>,
{
    incidents.into_iter().filter(|i| i.has_location()).collect()
}
