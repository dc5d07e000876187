//! Raw cell values and the dataset they form.

use serde::{Deserialize, Serialize};

/// A raw spreadsheet cell value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Plain string form without any display formatting.
    pub fn to_plain_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => number_to_string(*n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

/// Shortest string form of a number; integral values print without a
/// fractional part.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Ordered rows of raw values. Row `i` is the spreadsheet's native row `i`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Build a dataset from anything convertible into cell values.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of a row; missing rows are empty.
    pub fn row(&self, index: usize) -> &[CellValue] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A cell; out-of-range addresses read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.row(row).get(col).unwrap_or(&EMPTY)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of non-blank cells in a row.
    pub fn filled_cells(&self, index: usize) -> usize {
        self.row(index).iter().filter(|c| !c.is_blank()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::text(" x ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(CellValue::Number(2024.0).to_plain_string(), "2024");
        assert_eq!(CellValue::Number(2.5).to_plain_string(), "2.5");
        assert_eq!(CellValue::text(" Rank ").to_plain_string(), " Rank ");
        assert_eq!(CellValue::Empty.to_plain_string(), "");
    }

    #[test]
    fn test_dataset_out_of_range_reads_empty() {
        let data = Dataset::from_rows(vec![vec!["a", "b"]]);
        assert_eq!(data.cell(0, 1), &CellValue::text("b"));
        assert_eq!(data.cell(0, 5), &CellValue::Empty);
        assert_eq!(data.cell(9, 0), &CellValue::Empty);
        assert!(data.row(3).is_empty());
    }

    #[test]
    fn test_filled_cells() {
        let data = Dataset::new(vec![vec![
            CellValue::text("x"),
            CellValue::Empty,
            CellValue::text(" "),
            CellValue::Number(1.0),
        ]]);
        assert_eq!(data.filled_cells(0), 2);
    }

    #[test]
    fn test_cell_value_json_shape() {
        let row: Vec<CellValue> = serde_json::from_str(r#"[1.5, "x", null]"#).unwrap();
        assert_eq!(
            row,
            vec![CellValue::Number(1.5), CellValue::text("x"), CellValue::Empty]
        );
    }
}
