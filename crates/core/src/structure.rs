//! Table structure inference.
//!
//! Spreadsheets exported from reporting tools usually carry one or more
//! caption rows above the actual table. The analyzer scans the first rows to
//! separate those captions from the header row and the data that follows.

use crate::config::LayoutConfig;
use crate::error::{ConversionError, Result};
use crate::value::{CellValue, Dataset};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Substrings that mark a row as the table header.
const HEADER_KEYWORDS: [&str; 5] = ["country", "name", "rank", "total", "year"];

/// Substrings that mark a single-cell row as a caption.
const TITLE_KEYWORDS: [&str; 4] = ["report", "data", "table", "summary"];

/// A caption row shown once above the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TitleRow {
    pub row_index: usize,
    pub text: String,
}

/// Result of structure inference for one dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureAnalysis {
    pub title_rows: Vec<TitleRow>,
    pub header_row_index: usize,
    /// Source rows after the header, `[header + 1, dataset length)`.
    pub data_row_range: Range<usize>,
    /// Source indices of the non-blank rows inside `data_row_range`.
    pub data_rows: Vec<usize>,
    /// Number of table columns, taken from the header row.
    pub column_count: usize,
}

impl StructureAnalysis {
    pub fn has_titles(&self) -> bool {
        !self.title_rows.is_empty()
    }
}

/// Classifies title rows, the header row and the data rows.
pub struct StructureAnalyzer {
    scan_rows: usize,
    fallback_scan_rows: usize,
    title_min_length: usize,
}

impl StructureAnalyzer {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            scan_rows: config.structure_scan_rows,
            fallback_scan_rows: config.fallback_scan_rows,
            title_min_length: config.title_min_length,
        }
    }

    /// Infer the table structure of `data`.
    ///
    /// Fails with [`ConversionError::EmptyWorksheet`] when there are no rows
    /// and with [`ConversionError::NoTabularData`] when the header has no
    /// columns or no data rows follow it.
    pub fn analyze(&self, data: &Dataset) -> Result<StructureAnalysis> {
        if data.is_empty() {
            return Err(ConversionError::EmptyWorksheet);
        }

        let mut title_rows = Vec::new();
        let mut header_row_index = None;

        for index in 0..data.len().min(self.scan_rows) {
            let row = data.row(index);
            let filled = data.filled_cells(index);
            if filled == 0 {
                continue;
            }

            if filled == 1 {
                if let Some(text) = self.title_text(row) {
                    debug!("Row {} classified as title: {:?}", index, text);
                    title_rows.push(TitleRow {
                        row_index: index,
                        text,
                    });
                    continue;
                }
            }

            if filled > 2 && is_header_row(row) {
                header_row_index = Some(index);
                break;
            }
        }

        let header_row_index = match header_row_index {
            Some(index) => {
                debug!("Header row {} matched by keyword", index);
                index
            }
            None => {
                let index = self.fallback_header(data, &title_rows);
                debug!("No keyword header; using densest row {}", index);
                index
            }
        };

        let column_count = trimmed_len(data.row(header_row_index));
        let data_row_range = (header_row_index + 1)..data.len().max(header_row_index + 1);
        let data_rows: Vec<usize> = data_row_range
            .clone()
            .filter(|&index| data.filled_cells(index) > 0)
            .collect();

        if column_count == 0 || data_rows.is_empty() {
            return Err(ConversionError::NoTabularData);
        }

        Ok(StructureAnalysis {
            title_rows,
            header_row_index,
            data_row_range,
            data_rows,
            column_count,
        })
    }

    /// Caption text of a single-cell row, if it reads like a caption.
    fn title_text(&self, row: &[CellValue]) -> Option<String> {
        let cell = row.iter().find(|cell| !cell.is_blank())?;
        let text = cell.to_plain_string();
        let lowered = text.trim().to_lowercase();

        let is_title = lowered.chars().count() > self.title_min_length
            || TITLE_KEYWORDS.iter().any(|kw| lowered.contains(kw));
        is_title.then_some(text)
    }

    /// Densest row after the captions, within the fallback window. Ties keep
    /// the earlier row; a window without filled rows yields row 0.
    fn fallback_header(&self, data: &Dataset, titles: &[TitleRow]) -> usize {
        let start = titles.last().map_or(0, |t| t.row_index + 1);
        let end = data.len().min(self.fallback_scan_rows);

        let mut best = (0usize, 0usize);
        for index in start..end {
            let filled = data.filled_cells(index);
            if filled > best.1 {
                best = (index, filled);
            }
        }
        best.0
    }
}

fn is_header_row(row: &[CellValue]) -> bool {
    let matches = |cell: &CellValue| {
        let text = cell.to_plain_string().to_lowercase();
        HEADER_KEYWORDS.iter().any(|kw| text.contains(kw))
    };
    row.first().is_some_and(matches) || row.iter().any(matches)
}

/// Row length without trailing blank cells.
fn trimmed_len(row: &[CellValue]) -> usize {
    row.iter()
        .rposition(|cell| !cell.is_blank())
        .map_or(0, |last| last + 1)
}
