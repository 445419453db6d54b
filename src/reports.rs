// Aggregations feeding the cards, charts and table. Everything here returns
// plain numbers and dates; `output` turns them into text.
use crate::filter::{filter_by_month, search_categories};
use crate::types::CanonicalDataset;
use crate::util::month_code;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub total_cost: f64,
    pub period_cost: f64,
    pub category_count: usize,
    pub record_count: usize,
}

/// Cards for an unfiltered dataset. The period card shows the current
/// month's subtotal when the sheet has one, else the sum of all records.
pub fn summary_cards(data: &CanonicalDataset, today: NaiveDate) -> SummaryCards {
    let current = month_code(today.month()).unwrap_or_default();
    let period_cost = data
        .monthly_subtotals
        .get(current)
        .copied()
        .unwrap_or_else(|| data.records_total());
    SummaryCards {
        total_cost: data.total,
        period_cost,
        category_count: data.categories.len(),
        record_count: data.records.len(),
    }
}

/// Cards for a date-filtered dataset; the period card is the filtered total.
pub fn summary_cards_filtered(data: &CanonicalDataset) -> SummaryCards {
    SummaryCards {
        total_cost: data.total,
        period_cost: data.total,
        category_count: data.categories.len(),
        record_count: data.records.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRanking {
    pub period_total: f64,
    pub entries: Vec<(String, f64)>,
}

/// All categories by spend, highest first, optionally for one month (1-12).
pub fn rank_categories(data: &CanonicalDataset, month: Option<u32>) -> CategoryRanking {
    let scoped;
    let data = match month {
        Some(m) => {
            scoped = filter_by_month(data, m);
            &scoped
        }
        None => data,
    };
    let entries = sorted_totals(data);
    let period_total = entries.iter().map(|(_, v)| v).sum();
    CategoryRanking {
        period_total,
        entries,
    }
}

/// The `top_n` highest-spend categories, for the category bar chart.
pub fn category_series(data: &CanonicalDataset, top_n: usize) -> Vec<(String, f64)> {
    let mut entries = sorted_totals(data);
    entries.truncate(top_n);
    entries
}

// Ties keep header order.
fn sorted_totals(data: &CanonicalDataset) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = data
        .categories
        .iter()
        .map(|c| (c.clone(), data.category_totals.get(c).copied().unwrap_or(0.0)))
        .collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    entries
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub label: Option<String>,
    pub value: f64,
}

/// One point per record, in record order, valued at the record total.
pub fn daily_series(data: &CanonicalDataset) -> Vec<SeriesPoint> {
    data.records
        .iter()
        .map(|r| SeriesPoint {
            date: r.date,
            label: r.display_label.clone(),
            value: r.total,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub label: Option<String>,
    pub cells: Vec<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// Table rows limited to categories matching `search` and, optionally, one
/// month. Without a search term the row total is the record total; with one
/// it is the sum of the visible columns.
pub fn table_view(data: &CanonicalDataset, search: &str, month: Option<u32>) -> TableView {
    let columns: Vec<String> = search_categories(&data.categories, search)
        .into_iter()
        .cloned()
        .collect();
    let searching = !search.trim().is_empty();
    let rows = data
        .records
        .iter()
        .filter(|r| month.map_or(true, |m| r.date.month() == m))
        .map(|r| {
            let cells: Vec<f64> = columns.iter().map(|c| r.value(c)).collect();
            let total = if searching {
                cells.iter().sum()
            } else {
                r.total
            };
            TableRow {
                date: r.date,
                label: r.display_label.clone(),
                cells,
                total,
            }
        })
        .collect();
    TableView { columns, rows }
}

/// Distinct months (1-12) present in the dataset, ascending.
pub fn available_months(data: &CanonicalDataset) -> Vec<u32> {
    let months: BTreeSet<u32> = data.records.iter().map(|r| r.date.month()).collect();
    months.into_iter().collect()
}
