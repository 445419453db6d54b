// Core data model shared by the parsers, filters and reports.
use crate::error::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tabled::Tabled;

/// The three dashboard views: the monthly rollup sheet and one daily sheet per ad platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Summary,
    TikTok,
    Facebook,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Summary, Platform::TikTok, Platform::Facebook];

    pub fn key(&self) -> &'static str {
        match self {
            Platform::Summary => "summary",
            Platform::TikTok => "tiktok",
            Platform::Facebook => "facebook",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(Platform::Summary),
            "tiktok" => Ok(Platform::TikTok),
            "facebook" => Ok(Platform::Facebook),
            _ => Err(Error::UnknownPlatform(s.to_string())),
        }
    }
}

/// Which sheet layout a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    TimeSeries,
    MonthlyRollup,
}

/// One row of spend data. Rollup-origin records carry a synthesized
/// first-of-month date and a month name in `display_label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub values: BTreeMap<String, f64>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
}

impl DailyRecord {
    /// Builds a record whose `total` is the sum of `values`.
    pub fn new(date: NaiveDate, values: BTreeMap<String, f64>, display_label: Option<String>) -> Self {
        let total = values.values().sum();
        Self {
            date,
            values,
            total,
            display_label,
        }
    }

    pub fn value(&self, category: &str) -> f64 {
        self.values.get(category).copied().unwrap_or(0.0)
    }
}

/// Output of either sheet parser. Never mutated after construction; filters
/// build a new dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDataset {
    pub origin: Origin,
    pub categories: Vec<String>,
    pub records: Vec<DailyRecord>,
    pub category_totals: BTreeMap<String, f64>,
    pub monthly_subtotals: BTreeMap<String, f64>,
    pub total: f64,
}

impl CanonicalDataset {
    pub fn empty(origin: Origin) -> Self {
        Self {
            origin,
            categories: Vec::new(),
            records: Vec::new(),
            category_totals: BTreeMap::new(),
            monthly_subtotals: BTreeMap::new(),
            total: 0.0,
        }
    }

    /// Assembles a dataset, computing category totals and the grand total
    /// from `records`.
    pub fn from_records(
        origin: Origin,
        categories: Vec<String>,
        records: Vec<DailyRecord>,
        monthly_subtotals: BTreeMap<String, f64>,
    ) -> Self {
        let category_totals = category_totals(&categories, &records);
        let total = category_totals.values().sum();
        Self {
            origin,
            categories,
            records,
            category_totals,
            monthly_subtotals,
            total,
        }
    }

    pub fn is_summary_shaped(&self) -> bool {
        self.origin == Origin::MonthlyRollup
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest record dates, used to bound the calendar inputs.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    pub fn records_total(&self) -> f64 {
        self.records.iter().map(|r| r.total).sum()
    }
}

/// Per-category sums over `records`; every category gets an entry, even at 0.
pub fn category_totals(categories: &[String], records: &[DailyRecord]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = categories.iter().map(|c| (c.clone(), 0.0)).collect();
    for r in records {
        for (category, sum) in totals.iter_mut() {
            *sum += r.value(category);
        }
    }
    totals
}

/// Inclusive calendar range; both ends absent means "no filter".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn none() -> Self {
        Self::default()
    }

    /// A bounded range, swapping the ends when given in reverse order.
    pub fn between(a: NaiveDate, b: NaiveDate) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Both bounds, only when the range is active.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start?, self.end?))
    }

    pub fn is_active(&self) -> bool {
        self.bounds().is_some()
    }

    /// Narrow the range to `[min, max]` when it overlaps them. A range that
    /// misses the bounds entirely is returned unchanged so it still selects
    /// nothing.
    pub fn clamp_to(self, min: NaiveDate, max: NaiveDate) -> Self {
        match self.bounds() {
            Some((start, end)) if start <= max && end >= min => {
                Self::between(start.max(min), end.min(max))
            }
            _ => self,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleAllocation {
    pub style: String,
    pub fraction: f64,
    pub amount: f64,
}

/// Budget allocation for one category. The code is matched loosely against
/// spend categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub code: String,
    pub primary_budget: f64,
    pub secondary_budget: f64,
    pub total_budget: f64,
    pub style_breakdown: Vec<StyleAllocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetModel {
    pub total_budget: f64,
    pub primary_total: f64,
    pub secondary_total: f64,
    pub categories: Vec<BudgetCategory>,
    pub period_year: i32,
    /// Zero-based month index.
    pub period_month_index: u32,
    pub days_in_period: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPacing {
    pub code: String,
    pub budget: f64,
    pub estimated_spend: f64,
    pub expected_spend: f64,
    pub percent_used: f64,
    pub is_over_pace: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacingMetrics {
    pub year: i32,
    pub month_index: u32,
    pub days_in_period: u32,
    pub days_elapsed: u32,
    pub total_budget: f64,
    pub actual_spent: f64,
    pub daily_budget_rate: f64,
    pub expected_spend: f64,
    pub remaining_budget: f64,
    pub is_over_pace: bool,
    pub percent_used: f64,
    pub categories: Vec<CategoryPacing>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryRankRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Cost")]
    pub cost: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PacingRow {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Budget")]
    pub budget: String,
    #[tabled(rename = "EstSpend")]
    pub estimated_spend: String,
    #[tabled(rename = "Expected")]
    pub expected_spend: String,
    #[tabled(rename = "Used%")]
    pub percent_used: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChartPointRow {
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn record_total_is_sum_of_values() {
        let values = BTreeMap::from([("A".to_string(), 100.0), ("B".to_string(), 200.0)]);
        let r = DailyRecord::new(d(2026, 1, 1), values, None);
        assert_eq!(r.total, 300.0);
        assert_eq!(r.value("C"), 0.0);
    }

    #[test]
    fn date_range_swaps_reversed_bounds() {
        let r = DateRange::between(d(2026, 1, 10), d(2026, 1, 5));
        assert_eq!(r.start, Some(d(2026, 1, 5)));
        assert_eq!(r.end, Some(d(2026, 1, 10)));
        assert!(r.is_active());
        assert!(!DateRange::none().is_active());
    }

    #[test]
    fn platform_round_trips_through_str() {
        for p in Platform::ALL {
            assert_eq!(p.to_string().parse::<Platform>().unwrap(), p);
        }
        assert!("instagram".parse::<Platform>().is_err());
        assert_eq!("TikTok".parse::<Platform>().unwrap(), Platform::TikTok);
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = CanonicalDataset::empty(Origin::TimeSeries);
        assert!(ds.date_bounds().is_none());
        assert_eq!(ds.total, 0.0);
        assert!(!ds.is_summary_shaped());
    }
}
