//! Display formatting of raw cell values.

use crate::value::{number_to_string, CellValue};
use chrono::{Datelike, Days, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMERIC_TEXT: Regex = Regex::new(r"^[\d.,%-]+$").expect("valid numeric pattern");
}

/// Spreadsheet serials in this open range are rendered as dates.
const DATE_SERIAL_RANGE: (f64, f64) = (40000.0, 50000.0);

/// Normalize a raw value into its display string.
///
/// Rules are tried in order and the first match wins: strings containing
/// `%` pass through, fractions below one become whole percentages, serials
/// between 40000 and 50000 become `M/D/YYYY` dates, integral numbers print
/// plainly, other numbers get one decimal place, and text is trimmed.
///
/// `_column` is accepted so per-column rules can be added without changing
/// call sites.
pub fn format_cell_content(value: &CellValue, _column: usize) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(s) if s.contains('%') => s.clone(),
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::Number(n) => format_number(*n),
    }
}

fn format_number(n: f64) -> String {
    if let Some(pct) = as_percentage(n) {
        return pct;
    }

    if n > DATE_SERIAL_RANGE.0 && n < DATE_SERIAL_RANGE.1 {
        return serial_to_date(n).unwrap_or_else(|| number_to_string(n));
    }

    if n.fract() == 0.0 {
        number_to_string(n)
    } else {
        // Half away from zero, so 1.25 reads 1.3 rather than 1.2.
        format!("{:.1}", (n * 10.0).round() / 10.0)
    }
}

/// Fractions in `[0, 1)` render as whole percentages. Exact zero counts as
/// a fraction so an empty ratio reads `0%`.
fn as_percentage(n: f64) -> Option<String> {
    if !(0.0..1.0).contains(&n) || (n.fract() == 0.0 && n != 0.0) {
        return None;
    }
    let rounded = (n * 100.0).round();
    (0.0..=100.0)
        .contains(&rounded)
        .then(|| format!("{:.0}%", rounded))
}

/// Days since 1899-12-30, the spreadsheet epoch with the 1900 leap-year
/// correction folded in.
fn serial_to_date(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.trunc();
    if days < 0.0 {
        return None;
    }
    let date = epoch.checked_add_days(Days::new(days as u64))?;
    Some(format!("{}/{}/{}", date.month(), date.day(), date.year()))
}

/// True when formatted text consists only of digits and numeric punctuation.
pub fn looks_numeric(text: &str) -> bool {
    NUMERIC_TEXT.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value: impl Into<CellValue>) -> String {
        format_cell_content(&value.into(), 0)
    }

    #[test]
    fn test_percentages() {
        assert_eq!(fmt(0.2), "20%");
        assert_eq!(fmt(0.0), "0%");
        assert_eq!(fmt(0.125), "13%");
        assert_eq!(fmt(0.999), "100%");
        assert_eq!(fmt(0.001), "0%");
    }

    #[test]
    fn test_percent_strings_pass_through() {
        assert_eq!(fmt(" 45% "), " 45% ");
    }

    #[test]
    fn test_date_serials() {
        assert_eq!(fmt(41000.0), "4/1/2012");
        assert_eq!(fmt(45292.0), "1/1/2024");
        assert_eq!(fmt(45292.75), "1/1/2024");
    }

    #[test]
    fn test_date_range_is_exclusive() {
        assert_eq!(fmt(40000.0), "40000");
        assert_eq!(fmt(50000.0), "50000");
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_numbers() {
        assert_eq!(fmt(3.14159), "3.1");
        assert_eq!(fmt(5.0), "5");
        assert_eq!(fmt(1.0), "1");
        assert_eq!(fmt(-2.26), "-2.3");
        assert_eq!(fmt(1234567.0), "1234567");
        assert_eq!(fmt(12.96), "13.0");
    }

    #[test]
    fn test_numbers_round_ties_away_from_zero() {
        assert_eq!(fmt(1.25), "1.3");
        assert_eq!(fmt(12.25), "12.3");
        assert_eq!(fmt(-1.25), "-1.3");
        assert_eq!(fmt(2.75), "2.8");
    }

    #[test]
    fn test_text_and_empty() {
        assert_eq!(fmt("  Norway "), "Norway");
        assert_eq!(format_cell_content(&CellValue::Empty, 3), "");
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("1,234.50"));
        assert!(looks_numeric("-12"));
        assert!(looks_numeric("45%"));
        assert!(!looks_numeric("4/1/2012"));
        assert!(!looks_numeric("12 kg"));
        assert!(!looks_numeric(""));
    }
}
