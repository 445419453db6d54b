// Presentation layer: text tables for the terminal plus CSV/JSON export.
use crate::error::Result;
use crate::reports::{CategoryRanking, SeriesPoint, SummaryCards, TableRow, TableView};
use crate::types::{CategoryRankRow, ChartPointRow, PacingMetrics, PacingRow};
use crate::util::{format_compact, format_currency, format_day_label, format_int, format_number};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

const DATE_COLUMN: &str = "วันที่";
const TOTAL_COLUMN: &str = "รวม";

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Export the table view as CSV with raw numbers.
pub fn write_table_csv(path: &Path, view: &TableView) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(view.columns.iter().cloned());
    header.push(TOTAL_COLUMN.to_string());
    wtr.write_record(&header)?;
    for row in &view.rows {
        let mut record = vec![row.date.to_string()];
        record.extend(row.cells.iter().map(|v| v.to_string()));
        record.push(row.total.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn render_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

fn row_label(date: chrono::NaiveDate, label: &Option<String>) -> String {
    label.clone().unwrap_or_else(|| format_day_label(date))
}

pub fn render_cards(cards: &SummaryCards) -> String {
    format!(
        "Total cost: {}\nPeriod cost: {}\nCategories: {}\nDays: {}",
        format_currency(cards.total_cost),
        format_currency(cards.period_cost),
        format_int(cards.category_count as u64),
        format_int(cards.record_count as u64),
    )
}

pub fn ranking_rows(ranking: &CategoryRanking) -> Vec<CategoryRankRow> {
    ranking
        .entries
        .iter()
        .enumerate()
        .map(|(i, (category, cost))| CategoryRankRow {
            rank: i + 1,
            category: category.clone(),
            cost: format_currency(*cost),
        })
        .collect()
}

pub fn daily_chart_rows(points: &[SeriesPoint]) -> Vec<ChartPointRow> {
    points
        .iter()
        .map(|p| ChartPointRow {
            label: row_label(p.date, &p.label),
            value: format_compact(p.value),
        })
        .collect()
}

pub fn category_chart_rows(entries: &[(String, f64)]) -> Vec<ChartPointRow> {
    entries
        .iter()
        .map(|(category, value)| ChartPointRow {
            label: category.clone(),
            value: format_compact(*value),
        })
        .collect()
}

fn table_cells(row: &TableRow) -> Vec<String> {
    let mut cells = vec![row_label(row.date, &row.label)];
    cells.extend(row.cells.iter().map(|v| {
        if *v > 0.0 {
            format_currency(*v)
        } else {
            "-".to_string()
        }
    }));
    cells.push(format_currency(row.total));
    cells
}

/// Render the spend table: a date column, one column per visible category
/// and a row total. Zero cells show as `-`.
pub fn render_table(view: &TableView, max_rows: usize) -> String {
    if view.rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(view.columns.iter().cloned());
    header.push(TOTAL_COLUMN.to_string());
    builder.push_record(header);
    for row in view.rows.iter().take(max_rows) {
        builder.push_record(table_cells(row));
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn pacing_rows(metrics: &PacingMetrics) -> Vec<PacingRow> {
    metrics
        .categories
        .iter()
        .map(|c| PacingRow {
            category: c.code.clone(),
            budget: format_currency(c.budget),
            estimated_spend: format_currency(c.estimated_spend),
            expected_spend: format_currency(c.expected_spend),
            percent_used: format_number(c.percent_used, 1),
            status: status(c.is_over_pace).to_string(),
        })
        .collect()
}

pub fn render_pacing(metrics: &PacingMetrics) -> String {
    format!(
        "Period: {}-{:02} (day {} of {})\nBudget: {}\nSpent: {} ({}%)\nExpected to date: {}\nRemaining: {}\nStatus: {}",
        metrics.year,
        metrics.month_index + 1,
        metrics.days_elapsed,
        metrics.days_in_period,
        format_currency(metrics.total_budget),
        format_currency(metrics.actual_spent),
        format_number(metrics.percent_used, 1),
        format_currency(metrics.expected_spend),
        format_currency(metrics.remaining_budget),
        status(metrics.is_over_pace),
    )
}

fn status(over: bool) -> &'static str {
    if over {
        "Over pace"
    } else {
        "On track"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_time_series;
    use crate::reports::{rank_categories, table_view};

    #[test]
    fn table_shows_dash_for_zero_cells() {
        let data = parse_time_series("Date,A,B\n2026-01-05,\"1,500\",0");
        let text = render_table(&table_view(&data, "", None), 10);
        assert!(text.contains("วันที่"));
        assert!(text.contains("05/01"));
        assert!(text.contains("฿1,500"));
        assert!(text.contains(" - "));
    }

    #[test]
    fn empty_views_render_placeholder() {
        let data = parse_time_series("");
        assert_eq!(render_table(&table_view(&data, "", None), 10), "(no rows)");
        let rows: Vec<CategoryRankRow> = Vec::new();
        assert_eq!(render_rows(&rows, 5), "(no rows)");
    }

    #[test]
    fn ranking_rows_are_numbered() {
        let data = parse_time_series("Date,A,B\n2026-01-05,1,2");
        let rows = ranking_rows(&rank_categories(&data, None));
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].category, "B");
        assert_eq!(rows[1].cost, "฿1");
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let data = parse_time_series("Date,A,B\n2026-01-05,1,2");
        write_table_csv(&path, &table_view(&data, "", None)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("วันที่,A,B,รวม"));
        assert_eq!(lines.next(), Some("2026-01-05,1,2,3"));
    }
}
