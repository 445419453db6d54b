// Budget pacing: actual month-to-date spend against a linear projection of
// the month's budget.
use crate::error::{Error, Result};
use crate::types::{BudgetModel, CanonicalDataset, CategoryPacing, PacingMetrics};
use crate::util::{in_month, month_number};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;

/// Per-category spend is an estimate: the month's actual spend split by
/// budget share, scaled by this factor. The feed has no per-category spend.
pub const CATEGORY_SPEND_FACTOR: f64 = 0.5;

/// A calendar month picked for pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedMonth {
    pub year: i32,
    /// Zero-based month index.
    pub month_index: u32,
}

impl SelectedMonth {
    /// Resolve `JAN`..`DEC` or `1`..`12` against a fixed reference year.
    pub fn resolve(month: &str, reference_year: i32) -> Result<Self> {
        let trimmed = month.trim();
        let number = month_number(trimmed)
            .or_else(|| trimmed.parse::<u32>().ok().filter(|m| (1..=12).contains(m)))
            .ok_or_else(|| Error::UnknownMonth(month.to_string()))?;
        Ok(Self {
            year: reference_year,
            month_index: number - 1,
        })
    }

    pub fn month(&self) -> u32 {
        self.month_index + 1
    }

    /// Days of the period elapsed as of `today`: the day of month inside the
    /// period, all of it once past, none before it starts.
    pub fn days_elapsed(&self, today: NaiveDate, days_in_period: u32) -> u32 {
        match (self.year, self.month()).cmp(&(today.year(), today.month())) {
            Ordering::Equal => today.day(),
            Ordering::Less => days_in_period,
            Ordering::Greater => 0,
        }
    }
}

/// Compare spend in `selected` month against `budget` as of `today`.
///
/// Every ratio is guarded: a zero budget or zero-length period yields zero
/// rates and percentages.
pub fn compute_pacing(
    spend: &CanonicalDataset,
    budget: &BudgetModel,
    selected: SelectedMonth,
    today: NaiveDate,
) -> PacingMetrics {
    let days_in_period = budget.days_in_period;
    let days_elapsed = selected.days_elapsed(today, days_in_period);

    let actual_spent: f64 = spend
        .records
        .iter()
        .filter(|r| in_month(r.date, selected.year, selected.month()))
        .map(|r| r.total)
        .sum();

    let daily_budget_rate = ratio(budget.total_budget, days_in_period as f64);
    let expected_spend = daily_budget_rate * days_elapsed as f64;
    let percent_used = ratio(actual_spent, budget.total_budget) * 100.0;

    let allocated: f64 = budget.categories.iter().map(|c| c.total_budget).sum();
    let categories = budget
        .categories
        .iter()
        .map(|c| {
            let estimated_spend =
                actual_spent * ratio(c.total_budget, allocated) * CATEGORY_SPEND_FACTOR;
            let expected_spend =
                ratio(c.total_budget, days_in_period as f64) * days_elapsed as f64;
            CategoryPacing {
                code: c.code.clone(),
                budget: c.total_budget,
                estimated_spend,
                expected_spend,
                percent_used: ratio(estimated_spend, c.total_budget) * 100.0,
                is_over_pace: estimated_spend > expected_spend,
            }
        })
        .collect();

    PacingMetrics {
        year: selected.year,
        month_index: selected.month_index,
        days_in_period,
        days_elapsed,
        total_budget: budget.total_budget,
        actual_spent,
        daily_budget_rate,
        expected_spend,
        remaining_budget: budget.total_budget - actual_spent,
        is_over_pace: actual_spent > expected_spend,
        percent_used,
        categories,
    }
}

fn ratio(num: f64, denom: f64) -> f64 {
    if denom == 0.0 {
        0.0
    } else {
        num / denom
    }
}
