// Date-range, month and category filters. Each returns a new dataset.
use crate::types::{CanonicalDataset, DailyRecord, DateRange};
use chrono::Datelike;

/// Restrict a dataset to an inclusive date range, recomputing every total
/// from the retained records.
///
/// An inactive range returns an unchanged copy. The range covers local
/// midnight of `start` through the last instant of `end`, and each record is
/// placed at noon of its date, so the comparison is inclusive on both ends.
pub fn filter_by_range(dataset: &CanonicalDataset, range: &DateRange) -> CanonicalDataset {
    let Some((start, end)) = range.bounds() else {
        return dataset.clone();
    };
    retain(dataset, |r| start <= r.date && r.date <= end)
}

/// Restrict a dataset to records in calendar month `month` (1-12) of any year.
/// Monthly subtotals are kept as-is.
pub fn filter_by_month(dataset: &CanonicalDataset, month: u32) -> CanonicalDataset {
    retain(dataset, |r| r.date.month() == month)
}

/// Categories whose code contains `term`, case-insensitively. An empty term
/// matches everything.
pub fn search_categories<'a>(categories: &'a [String], term: &str) -> Vec<&'a String> {
    let needle = term.trim().to_lowercase();
    categories
        .iter()
        .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
        .collect()
}

fn retain<F>(dataset: &CanonicalDataset, keep: F) -> CanonicalDataset
where
    F: Fn(&DailyRecord) -> bool,
{
    let records: Vec<DailyRecord> = dataset.records.iter().filter(|r| keep(r)).cloned().collect();
    CanonicalDataset::from_records(
        dataset.origin,
        dataset.categories.clone(),
        records,
        dataset.monthly_subtotals.clone(),
    )
}
