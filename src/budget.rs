// Budget sheet parser.
//
// A budget sheet has one row per category. Columns are found by header
// substring, so sheets may order or omit them freely:
// - primary pool amount (`ABX`)
// - secondary pool amount (`ACE`)
// - style fractions of the primary pool (`sale`, `review`, `brand`)
use crate::types::{BudgetCategory, BudgetModel, StyleAllocation};
use crate::util::{days_in_month, parse_number, split_rows};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const PRIMARY_MARKER: &str = "abx";
pub const SECONDARY_MARKER: &str = "ace";

/// `(header marker, style name)` for each recognized campaign style.
pub const STYLE_MARKERS: [(&str, &str); 3] =
    [("sale", "Sale"), ("review", "Review"), ("brand", "Branding")];

const SUM_MARKER: &str = "SUM";

/// A category's allocation as written in configuration, used when no budget
/// sheet has been assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSeed {
    pub code: String,
    #[serde(default)]
    pub primary: f64,
    #[serde(default)]
    pub secondary: f64,
    #[serde(default)]
    pub sale: f64,
    #[serde(default)]
    pub review: f64,
    #[serde(default)]
    pub branding: f64,
}

impl BudgetSeed {
    pub fn to_category(&self) -> BudgetCategory {
        build_category(
            &self.code,
            self.primary,
            self.secondary,
            &[self.sale, self.review, self.branding],
        )
    }
}

/// Column indices resolved from the header row.
#[derive(Debug, Default)]
struct BudgetColumns {
    primary: Option<usize>,
    secondary: Option<usize>,
    styles: [Option<usize>; 3],
}

impl BudgetColumns {
    fn from_header(header: &[String]) -> Self {
        let find = |marker: &str| {
            header
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, h)| h.to_lowercase().contains(marker))
                .map(|(i, _)| i)
        };
        Self {
            primary: find(PRIMARY_MARKER),
            secondary: find(SECONDARY_MARKER),
            styles: STYLE_MARKERS.map(|(marker, _)| find(marker)),
        }
    }
}

fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i)).map(String::as_str)
}

/// Read a style share. Accepts both `60%` and `0.6`; values above 1 are
/// taken as percentages. Note `1%` therefore reads as a full share.
pub fn parse_fraction(s: Option<&str>) -> f64 {
    let Some(s) = s else {
        return 0.0;
    };
    let trimmed = s.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let value = parse_number(Some(trimmed));
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

/// Build a category, keeping only styles with a positive share. `fractions`
/// follow the order of `STYLE_MARKERS`.
pub fn build_category(code: &str, primary: f64, secondary: f64, fractions: &[f64]) -> BudgetCategory {
    let style_breakdown = STYLE_MARKERS
        .iter()
        .zip(fractions)
        .filter(|(_, f)| **f > 0.0)
        .map(|((_, style), f)| StyleAllocation {
            style: style.to_string(),
            fraction: *f,
            amount: primary * f,
        })
        .collect();
    BudgetCategory {
        code: code.to_string(),
        primary_budget: primary,
        secondary_budget: secondary,
        total_budget: primary + secondary,
        style_breakdown,
    }
}

/// Wrap categories into a model for the month containing `today`.
///
/// Grand totals are taken from the categories themselves.
pub fn budget_from_categories(categories: Vec<BudgetCategory>, today: NaiveDate) -> BudgetModel {
    let primary_total = categories.iter().map(|c| c.primary_budget).sum();
    let secondary_total = categories.iter().map(|c| c.secondary_budget).sum();
    model(categories, primary_total, secondary_total, today)
}

// The period is always the month containing `today`, not the month the sheet
// describes.
fn model(categories: Vec<BudgetCategory>, primary_total: f64, secondary_total: f64, today: NaiveDate) -> BudgetModel {
    BudgetModel {
        total_budget: primary_total + secondary_total,
        primary_total,
        secondary_total,
        categories,
        period_year: today.year(),
        period_month_index: today.month0(),
        days_in_period: days_in_month(today.year(), today.month()),
    }
}

/// Parse one platform's monthly budget sheet.
///
/// Rows with an empty first cell or the `SUM` marker are skipped. Every other
/// row counts toward the pool totals, but only rows with a positive pool
/// amount become categories.
pub fn parse_budget(text: &str, today: NaiveDate) -> BudgetModel {
    let rows = split_rows(text);
    let columns = rows
        .first()
        .map(|h| BudgetColumns::from_header(h))
        .unwrap_or_default();
    debug!("Budget columns: {:?}", columns);

    let mut categories = Vec::new();
    let mut primary_total = 0.0;
    let mut secondary_total = 0.0;
    for row in rows.iter().skip(1) {
        let code = row.first().map(String::as_str).unwrap_or("");
        if code.is_empty() || code == SUM_MARKER {
            continue;
        }
        let primary = parse_number(cell(row, columns.primary));
        let secondary = parse_number(cell(row, columns.secondary));
        primary_total += primary;
        secondary_total += secondary;
        if primary > 0.0 || secondary > 0.0 {
            let fractions = columns.styles.map(|idx| parse_fraction(cell(row, idx)));
            categories.push(build_category(code, primary, secondary, &fractions));
        }
    }

    model(categories, primary_total, secondary_total, today)
}

/// True when a configured sheet reference has not been filled in yet.
pub fn is_placeholder(sheet: &str) -> bool {
    let s = sheet.trim();
    s.is_empty() || s.starts_with("YOUR_")
}

/// Parse `sheet` when one is available, otherwise build the model from the
/// configured fallback categories.
pub fn resolve_budget(sheet: Option<&str>, fallback: &[BudgetSeed], today: NaiveDate) -> BudgetModel {
    match sheet {
        Some(text) => parse_budget(text, today),
        None => {
            info!("No budget sheet assigned, using the default budget");
            budget_from_categories(fallback.iter().map(BudgetSeed::to_category).collect(), today)
        }
    }
}
