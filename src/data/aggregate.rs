use std::collections::{BTreeMap, HashMap};

use super::model::{Bucket, CategoryCount, CategoryOrder, Granularity, Incident};

// ---------------------------------------------------------------------------
// Temporal aggregation
// ---------------------------------------------------------------------------

/// Count incidents per day or month bucket.
///
/// Only buckets that contain at least one incident are returned (sparse),
/// ordered by ascending bucket start.
pub fn by_time<'a, I>(incidents: I, granularity: Granularity) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'a Incident>,
{
    let mut counts = BTreeMap::new();
    for incident in incidents {
        *counts.entry(granularity.floor(incident.date)).or_insert(0usize) += 1;
    }
    counts
        .into_iter()
        .map(|(start, count)| Bucket { start, count })
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical aggregation
// ---------------------------------------------------------------------------

/// Count incidents per crime type.
///
/// `CategoryOrder::FirstSeen` keeps the order in which each type first
/// appears; `CategoryOrder::CountDescending` sorts by count with ties left
/// in first-seen order.
pub fn by_category<'a, I>(incidents: I, order: CategoryOrder) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a Incident>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategoryCount> = Vec::new();

    for incident in incidents {
        let slot = *index.entry(incident.crime_type.as_str()).or_insert_with(|| {
            out.push(CategoryCount {
                category: incident.crime_type.clone(),
                count: 0,
            });
            out.len() - 1
        });
        out[slot].count += 1;
    }

    if order == CategoryOrder::CountDescending {
        // stable: equal counts keep first-seen order
        out.sort_by(|a, b| b.count.cmp(&a.count));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::filter_incidents;
    use crate::data::model::TimeRange;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn incident(date: NaiveDate, crime_type: &str) -> Incident {
        Incident {
            date,
            lat: f64::NAN,
            lng: f64::NAN,
            crime_type: crime_type.to_string(),
        }
    }

    fn total(buckets: &[Bucket]) -> usize {
        buckets.iter().map(|b| b.count).sum()
    }

    fn scenario() -> Vec<Incident> {
        vec![
            incident(ymd(2015, 1, 1), "THEFT"),
            incident(ymd(2015, 1, 1), "THEFT"),
            incident(ymd(2015, 2, 1), "BURGLARY"),
        ]
    }

    #[test]
    fn daily_buckets_for_scenario() {
        let data = scenario();
        let filtered = filter_incidents(&data, &TimeRange::year(2015), "");
        let buckets = by_time(filtered, Granularity::Day);
        assert_eq!(
            buckets,
            [
                Bucket { start: ymd(2015, 1, 1), count: 2 },
                Bucket { start: ymd(2015, 2, 1), count: 1 },
            ]
        );
    }

    #[test]
    fn categories_for_scenario() {
        let data = scenario();
        let cats = by_category(&data, CategoryOrder::CountDescending);
        let pairs: Vec<(&str, usize)> = cats
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect();
        assert_eq!(pairs, [("THEFT", 2), ("BURGLARY", 1)]);
    }

    #[test]
    fn monthly_buckets_are_sparse_and_ascending() {
        let data = vec![
            incident(ymd(2015, 5, 20), "A"),
            incident(ymd(2015, 1, 3), "A"),
            incident(ymd(2015, 5, 1), "B"),
            incident(ymd(2015, 1, 31), "C"),
        ];
        let buckets = by_time(&data, Granularity::Month);
        assert_eq!(
            buckets,
            [
                Bucket { start: ymd(2015, 1, 1), count: 2 },
                Bucket { start: ymd(2015, 5, 1), count: 2 },
            ]
        );
    }

    #[test]
    fn first_seen_versus_count_descending() {
        let data = vec![
            incident(ymd(2015, 1, 1), "ASSAULT"),
            incident(ymd(2015, 1, 2), "THEFT"),
            incident(ymd(2015, 1, 3), "THEFT"),
            incident(ymd(2015, 1, 4), "FRAUD"),
            incident(ymd(2015, 1, 5), "ASSAULT"),
            incident(ymd(2015, 1, 6), "THEFT"),
        ];
        let names = |order| -> Vec<String> {
            by_category(&data, order).into_iter().map(|c| c.category).collect()
        };
        assert_eq!(names(CategoryOrder::FirstSeen), ["ASSAULT", "THEFT", "FRAUD"]);
        assert_eq!(names(CategoryOrder::CountDescending), ["THEFT", "ASSAULT", "FRAUD"]);
    }

    #[test]
    fn count_ties_keep_first_seen_order() {
        let data = vec![
            incident(ymd(2015, 1, 1), "B"),
            incident(ymd(2015, 1, 1), "A"),
            incident(ymd(2015, 1, 1), "C"),
            incident(ymd(2015, 1, 1), "C"),
        ];
        let names: Vec<String> = by_category(&data, CategoryOrder::CountDescending)
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[test]
    fn counts_sum_to_input_size() {
        let data: Vec<Incident> = (0..200u32)
            .map(|i| {
                let date = ymd(2015, 1, 1) + chrono::Days::new(u64::from(i * 7 % 365));
                incident(date, ["THEFT", "ASSAULT", "DWI"][(i % 3) as usize])
            })
            .collect();
        let window = TimeRange::new(ymd(2015, 3, 1), ymd(2015, 9, 30));
        let filtered = filter_incidents(&data, &window, "");

        for granularity in [Granularity::Day, Granularity::Month] {
            assert_eq!(total(&by_time(filtered.iter().copied(), granularity)), filtered.len());
        }
        for order in [CategoryOrder::FirstSeen, CategoryOrder::CountDescending] {
            let sum: usize = by_category(filtered.iter().copied(), order)
                .iter()
                .map(|c| c.count)
                .sum();
            assert_eq!(sum, filtered.len());
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let data: Vec<Incident> = Vec::new();
        assert!(by_time(&data, Granularity::Day).is_empty());
        assert!(by_category(&data, CategoryOrder::FirstSeen).is_empty());
    }
}
