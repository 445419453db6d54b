// Sheet parsers: raw CSV text in, `CanonicalDataset` out.
//
// Two layouts are supported. Platform sheets carry one row per day under a
// date header, optionally preceded by monthly rollup rows. The summary sheet
// carries one row per month and no daily data.
use crate::types::{CanonicalDataset, DailyRecord, Origin, Platform};
use crate::util::{
    is_iso_date, month_number, parse_date_safe, parse_number, split_rows, thai_month_name,
};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// First-cell markers of the daily header row (Thai and English sheets).
pub const DATE_HEADERS: [&str; 2] = ["วันที่", "Date"];

/// First-cell marker of the summary sheet header row.
pub const MONTH_HEADER: &str = "MONTH";

const SUM_MARKER: &str = "SUM";

/// Header labels of grand-total columns, which are not categories.
const TOTAL_LABELS: [&str; 5] = ["รวม", "Sum", "SUM", "Total", "TOTAL"];

/// Header cells mapped to categories: `(column index, category)` pairs plus the
/// ordered, de-duplicated category list.
struct ColumnMap {
    columns: Vec<(usize, String)>,
    categories: Vec<String>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let mut columns = Vec::new();
        let mut categories: Vec<String> = Vec::new();
        for (idx, cell) in header.iter().enumerate().skip(1) {
            if cell.is_empty() || TOTAL_LABELS.contains(&cell.as_str()) {
                continue;
            }
            if !categories.contains(cell) {
                categories.push(cell.clone());
            }
            columns.push((idx, cell.clone()));
        }
        Self {
            columns,
            categories,
        }
    }

    /// Category values of one row; missing cells count as 0 and duplicate
    /// header codes accumulate into the same category.
    fn values(&self, row: &[String]) -> BTreeMap<String, f64> {
        let mut values: BTreeMap<String, f64> =
            self.categories.iter().map(|c| (c.clone(), 0.0)).collect();
        for (idx, category) in &self.columns {
            let v = parse_number(row.get(*idx).map(String::as_str));
            if let Some(slot) = values.get_mut(category) {
                *slot += v;
            }
        }
        values
    }

    fn has_positive_value(&self, row: &[String]) -> bool {
        self.columns
            .iter()
            .any(|(idx, _)| parse_number(row.get(*idx).map(String::as_str)) > 0.0)
    }
}

fn first_cell(row: &[String]) -> &str {
    row.first().map(String::as_str).unwrap_or("")
}

fn is_header(row: &[String]) -> bool {
    let cell = first_cell(row);
    cell == MONTH_HEADER || DATE_HEADERS.contains(&cell)
}

/// Sum every month row in the sheet, independent of the daily header.
///
/// All cells after the first count, except the grand-total columns named by
/// the nearest header row above the month row. Only positive months are kept.
fn scan_monthly_subtotals(rows: &[Vec<String>]) -> BTreeMap<String, f64> {
    let mut subtotals = BTreeMap::new();
    let mut total_columns: Vec<usize> = Vec::new();
    for row in rows {
        if is_header(row) {
            total_columns = row
                .iter()
                .enumerate()
                .filter(|(_, h)| TOTAL_LABELS.contains(&h.as_str()))
                .map(|(i, _)| i)
                .collect();
            continue;
        }
        let code = first_cell(row).to_uppercase();
        if month_number(&code).is_none() {
            continue;
        }
        let sum: f64 = row
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(i, _)| !total_columns.contains(i))
            .map(|(_, v)| parse_number(Some(v.as_str())))
            .sum();
        if sum > 0.0 {
            subtotals.insert(code, sum);
        }
    }
    subtotals
}

/// Parse a platform's daily sheet.
///
/// Returns an empty dataset when no date header row exists. Rows whose first
/// cell is not a `YYYY-MM-DD` date are skipped. Monthly rollup rows anywhere
/// in the sheet are summed into `monthly_subtotals`, keeping only positive
/// months.
pub fn parse_time_series(text: &str) -> CanonicalDataset {
    let rows = split_rows(text);

    let Some(header_idx) = rows
        .iter()
        .position(|r| DATE_HEADERS.contains(&first_cell(r)))
    else {
        warn!("Header row not found, returning an empty dataset");
        return CanonicalDataset::empty(Origin::TimeSeries);
    };
    let columns = ColumnMap::from_header(&rows[header_idx]);

    let mut records = Vec::new();
    for row in &rows[header_idx + 1..] {
        let cell = first_cell(row);
        if !is_iso_date(cell) {
            continue;
        }
        // The pattern admits impossible dates such as 2026-02-30.
        let Some(date) = parse_date_safe(Some(cell)) else {
            debug!("Skipping row with invalid date {}", cell);
            continue;
        };
        records.push(DailyRecord::new(date, columns.values(row), None));
    }

    let monthly_subtotals = scan_monthly_subtotals(&rows);

    debug!(
        "Parsed daily sheet: {} categories, {} records, {} monthly subtotals",
        columns.categories.len(),
        records.len(),
        monthly_subtotals.len()
    );
    CanonicalDataset::from_records(
        Origin::TimeSeries,
        columns.categories,
        records,
        monthly_subtotals,
    )
}

/// Parse the monthly summary sheet, synthesizing first-of-month dates in the
/// current local year.
pub fn parse_summary(text: &str) -> CanonicalDataset {
    parse_summary_for_year(text, Local::now().year())
}

/// Parse the monthly summary sheet with synthesized dates in `year`.
///
/// The first row must start with `MONTH`, otherwise an empty dataset is
/// returned. Month rows with no positive value are treated as months that
/// have not happened yet and are dropped.
pub fn parse_summary_for_year(text: &str, year: i32) -> CanonicalDataset {
    let rows = split_rows(text);
    let Some(header) = rows.first().filter(|r| first_cell(r) == MONTH_HEADER) else {
        warn!("Summary sheet has unexpected format, returning an empty dataset");
        return CanonicalDataset::empty(Origin::MonthlyRollup);
    };
    let columns = ColumnMap::from_header(header);

    let mut records: Vec<DailyRecord> = Vec::new();
    for row in &rows[1..] {
        let code = first_cell(row).to_uppercase();
        if code.is_empty() || code == SUM_MARKER {
            continue;
        }
        let Some(month) = month_number(&code) else {
            continue;
        };
        if !columns.has_positive_value(row) {
            continue;
        }
        let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) else {
            continue;
        };
        let label = thai_month_name(month).map(str::to_string);
        records.push(DailyRecord::new(date, columns.values(row), label));
    }
    records.sort_by_key(|r| r.date);

    debug!(
        "Parsed summary sheet: {} categories, {} months",
        columns.categories.len(),
        records.len()
    );
    CanonicalDataset::from_records(
        Origin::MonthlyRollup,
        columns.categories,
        records,
        BTreeMap::new(),
    )
}

/// Parse a sheet with the parser matching the platform's layout.
pub fn parse_platform(platform: Platform, text: &str) -> CanonicalDataset {
    match platform {
        Platform::Summary => parse_summary(text),
        Platform::TikTok | Platform::Facebook => parse_time_series(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = "COST TT ADS,,,\n\
MONTH,A1,C1,รวม\n\
JAN,\"1,000\",\"500\",\"1,500\"\n\
FEB,0,0,0\n\
SUM,\"1,000\",\"500\",\"1,500\"\n\
\n\
วันที่,A1,C1,รวม\n\
2026-01-01,\"600\",\"200\",\"800\"\r\n\
2026-01-02,\"400\",\"300\",\"700\"\r\n\
not a date,1,1,2\n";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn assert_totals_consistent(ds: &CanonicalDataset) {
        let by_category: f64 = ds.category_totals.values().sum();
        assert!((by_category - ds.records_total()).abs() < 1e-6);
        assert!((ds.total - by_category).abs() < 1e-6);
    }

    #[test]
    fn end_to_end_thai_header() {
        let ds = parse_time_series("วันที่,A,B\n2026-01-01,100,200\n2026-01-02,50,50");
        assert_eq!(ds.categories, vec!["A", "B"]);
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.records[0].date, d(2026, 1, 1));
        assert_eq!(ds.records[0].value("A"), 100.0);
        assert_eq!(ds.records[0].value("B"), 200.0);
        assert_eq!(ds.records[0].total, 300.0);
        assert_eq!(ds.records[1].total, 100.0);
        assert_eq!(ds.category_totals["A"], 150.0);
        assert_eq!(ds.category_totals["B"], 250.0);
        assert_eq!(ds.total, 400.0);
        assert_eq!(ds.origin, Origin::TimeSeries);
        assert!(ds.monthly_subtotals.is_empty());
    }

    #[test]
    fn english_header_and_total_column_ignored() {
        let ds = parse_time_series("Date,A,Total\n2026-03-01,\"1,234\",\"1,234\"");
        assert_eq!(ds.categories, vec!["A"]);
        assert_eq!(ds.records[0].total, 1234.0);
    }

    #[test]
    fn missing_header_yields_empty_dataset() {
        let ds = parse_time_series("foo,bar\n2026-01-01,1");
        assert!(ds.is_empty());
        assert!(ds.categories.is_empty());
        assert_eq!(ds.total, 0.0);
        assert_eq!(parse_time_series(""), CanonicalDataset::empty(Origin::TimeSeries));
    }

    #[test]
    fn daily_sheet_with_rollup_rows() {
        let ds = parse_time_series(DAILY);
        assert_eq!(ds.categories, vec!["A1", "C1"]);
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.monthly_subtotals.get("JAN"), Some(&1500.0));
        assert!(!ds.monthly_subtotals.contains_key("FEB"));
        assert_totals_consistent(&ds);
    }

    #[test]
    fn rollup_block_wider_than_daily_header() {
        let ds = parse_time_series(
            "MONTH,A1,C1,D2,รวม\nJAN,100,200,300,600\nวันที่,A1,รวม\n2026-01-01,5,5",
        );
        assert_eq!(ds.monthly_subtotals.get("JAN"), Some(&600.0));
        assert_eq!(ds.categories, vec!["A1"]);
        assert_eq!(ds.total, 5.0);
    }

    #[test]
    fn month_rows_without_header_sum_every_cell() {
        let ds = parse_time_series("FEB,1,2,3\nDate,A\n2026-02-01,1");
        assert_eq!(ds.monthly_subtotals.get("FEB"), Some(&6.0));
    }

    #[test]
    fn ragged_rows_fill_missing_cells_with_zero() {
        let ds = parse_time_series("Date,A,B,C\n2026-01-01,5\n2026-01-02,1,2,3");
        assert_eq!(ds.records[0].value("B"), 0.0);
        assert_eq!(ds.records[0].total, 5.0);
        assert_eq!(ds.category_totals["C"], 3.0);
        assert_totals_consistent(&ds);
    }

    #[test]
    fn impossible_dates_are_skipped() {
        let ds = parse_time_series("Date,A\n2026-02-30,5\n2026-02-28,1");
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.total, 1.0);
    }

    #[test]
    fn duplicate_header_codes_accumulate() {
        let ds = parse_time_series("Date,A,A\n2026-01-01,1,2");
        assert_eq!(ds.categories, vec!["A"]);
        assert_eq!(ds.records[0].value("A"), 3.0);
        assert_totals_consistent(&ds);
    }

    #[test]
    fn summary_sheet_synthesizes_monthly_records() {
        let text = "MONTH,A1,C1,รวม\n\
MAR,\"300\",\"0\",\"300\"\n\
JAN,\"1,000\",\"500\",\"1,500\"\n\
FEB,0,0,0\n\
XYZ,1,1,2\n\
,1,1,2\n\
SUM,\"1,300\",\"500\",\"1,800\"";
        let ds = parse_summary_for_year(text, 2026);
        assert!(ds.is_summary_shaped());
        assert_eq!(ds.categories, vec!["A1", "C1"]);
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.records[0].date, d(2026, 1, 1));
        assert_eq!(ds.records[0].display_label.as_deref(), Some("มกราคม"));
        assert_eq!(ds.records[0].total, 1500.0);
        assert_eq!(ds.records[1].date, d(2026, 3, 1));
        assert_eq!(ds.category_totals["A1"], 1300.0);
        assert!(ds.monthly_subtotals.is_empty());
        assert_totals_consistent(&ds);
    }

    #[test]
    fn summary_sheet_requires_month_marker() {
        let ds = parse_summary_for_year("COST TT ADS,,\nMONTH,A1\nJAN,1", 2026);
        assert!(ds.is_empty());
        assert_eq!(ds.origin, Origin::MonthlyRollup);
    }

    #[test]
    fn platform_dispatch_picks_layout() {
        let ds = parse_platform(Platform::Facebook, DAILY);
        assert_eq!(ds.origin, Origin::TimeSeries);
        let ds = parse_platform(Platform::Summary, "MONTH,A\nJAN,5");
        assert_eq!(ds.origin, Origin::MonthlyRollup);
        assert_eq!(ds.total, 5.0);
    }
}
