// Utility helpers for parsing and formatting.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values. Display formatting lives
// at the bottom and is only used by the presentation layer.
use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

/// Three-letter month codes as they appear in the first column of rollup rows.
pub const MONTH_CODES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const THAI_MONTH_NAMES: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

// Same prefix rule as a lenient float reader: digits with an optional
// fraction and exponent, anything after the match is ignored.
static LEADING_FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap());

/// Parse a locale-formatted amount into `f64`, coercing anything unusable to 0.
///
/// - Accepts `Option<&str>` so callers can pass ragged-row cells straight through.
/// - Strips double quotes, single quotes and thousands separators.
/// - Trims whitespace and reads the leading numeric part.
/// - Empty cells, stray text and non-finite results all yield `0.0`.
pub fn parse_number(s: Option<&str>) -> f64 {
    let Some(s) = s else {
        return 0.0;
    };
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(*c, '"' | '\'' | ','))
        .collect();
    let cleaned = cleaned.trim();
    LEADING_FLOAT
        .find(cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Split one CSV line into trimmed fields.
///
/// A double quote toggles the "inside quotes" state and is dropped; commas
/// inside quotes are kept as field content. Carriage returns are removed.
///
/// Known limitation: doubled quotes (`""`) inside a quoted field are two
/// toggles, not an escaped literal quote.
pub fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            '\r' => {}
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Tokenize every line of a CSV document.
pub fn split_rows(text: &str) -> Vec<Vec<String>> {
    text.split('\n').map(split_row).collect()
}

pub fn is_iso_date(s: &str) -> bool {
    ISO_DATE.is_match(s)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Strict `YYYY-MM-DD` reading for user-supplied dates.
pub fn parse_date_input(s: &str) -> Result<NaiveDate> {
    parse_date_safe(Some(s))
        .filter(|_| is_iso_date(s.trim()))
        .ok_or_else(|| Error::InvalidDate(s.to_string()))
}

/// Month number (1-12) for a three-letter code, case-insensitive.
pub fn month_number(code: &str) -> Option<u32> {
    let upper = code.trim().to_uppercase();
    MONTH_CODES
        .iter()
        .position(|m| *m == upper)
        .map(|i| i as u32 + 1)
}

pub fn month_code(month: u32) -> Option<&'static str> {
    MONTH_CODES.get(month.checked_sub(1)? as usize).copied()
}

pub fn thai_month_name(month: u32) -> Option<&'static str> {
    THAI_MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Number of days in the given calendar month; 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map_or(31, |n| (n - first).num_days() as u32)
}

/// True when `date` lies in the given year and month.
pub fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Baht amount without decimals, e.g. `฿1,772,791`.
pub fn format_currency(n: f64) -> String {
    let rounded = format_number(n.round(), 0);
    match rounded.strip_prefix('-') {
        Some(abs) => format!("-฿{}", abs),
        None => format!("฿{}", rounded),
    }
}

/// Axis-tick style abbreviation: `1.5M`, `250K`, or the plain value.
pub fn format_compact(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.0}K", n / 1_000.0)
    } else {
        format!("{}", n)
    }
}

/// Short `DD/MM` label for a calendar date.
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}
