//! Column width solving.

use crate::config::LayoutConfig;
use crate::format::format_cell_content;
use crate::metrics::{measure_or_estimate, FontFace, FontMetrics};
use crate::structure::StructureAnalysis;
use crate::value::Dataset;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One table column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub width: f32,
    /// Left edge on the page.
    pub x: f32,
}

/// Column widths and positions, fixed for a whole document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub columns: Vec<Column>,
    left: f32,
}

impl ColumnLayout {
    /// Lay out `widths` left to right starting at `left`.
    pub fn from_widths(left: f32, widths: &[f32]) -> Self {
        let mut x = left;
        let columns = widths
            .iter()
            .map(|&width| {
                let column = Column { width, x };
                x += width;
                column
            })
            .collect();
        Self { columns, left }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn table_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    pub fn right_edge(&self) -> f32 {
        self.left + self.table_width()
    }

    /// X positions of every column edge, both outer edges included.
    pub fn edges(&self) -> Vec<f32> {
        let mut edges: Vec<f32> = self.columns.iter().map(|c| c.x).collect();
        edges.push(self.right_edge());
        edges
    }
}

/// Sizes columns to their content and fits the table to the page width.
pub struct ColumnWidthSolver<'a> {
    config: &'a LayoutConfig,
    metrics: &'a dyn FontMetrics,
}

impl<'a> ColumnWidthSolver<'a> {
    pub fn new(config: &'a LayoutConfig, metrics: &'a dyn FontMetrics) -> Self {
        Self { config, metrics }
    }

    /// Measure the header and a sample of data rows, then fit to the page.
    pub fn solve(&self, data: &Dataset, analysis: &StructureAnalysis) -> ColumnLayout {
        let cfg = self.config;
        let padding = 2.0 * cfg.cell_padding_x + cfg.column_fit_slack;
        let header = data.row(analysis.header_row_index);
        let sample = &analysis.data_rows[..analysis.data_rows.len().min(cfg.width_sample_rows)];

        let widths: Vec<f32> = (0..analysis.column_count)
            .map(|col| {
                let mut width = cfg.min_column_width;

                let header_text = header.get(col).map(|v| v.to_plain_string()).unwrap_or_default();
                if !header_text.is_empty() {
                    let measured = measure_or_estimate(
                        self.metrics,
                        &header_text,
                        FontFace::Bold,
                        cfg.header_font_size,
                    );
                    width = width.max(measured + padding);
                }

                for &row in sample {
                    let text = format_cell_content(data.cell(row, col), col);
                    if text.is_empty() {
                        continue;
                    }
                    let measured = measure_or_estimate(
                        self.metrics,
                        &text,
                        FontFace::Regular,
                        cfg.data_font_size,
                    );
                    width = width.max(measured + padding);
                }

                width.min(cfg.max_column_width)
            })
            .collect();

        let widths = self.fit_to_page(widths);
        debug!("Column widths: {:?}", widths);
        ColumnLayout::from_widths(cfg.margin, &widths)
    }

    /// Scale widths down so their sum fits the printable width without any
    /// column dropping below the minimum.
    ///
    /// Columns that would fall below the minimum are pinned there and the
    /// remaining space is shared proportionally among the rest. When even
    /// all-minimum columns overflow the page, every column keeps the minimum.
    pub fn fit_to_page(&self, mut widths: Vec<f32>) -> Vec<f32> {
        let available = self.config.printable_width();
        let min = self.config.min_column_width;
        let total: f32 = widths.iter().sum();
        if total <= available {
            return widths;
        }

        if widths.len() as f32 * min >= available {
            warn!(
                "{} columns at {}pt overflow the printable width of {}pt",
                widths.len(),
                min,
                available
            );
            return vec![min; widths.len()];
        }

        let mut pinned = vec![false; widths.len()];
        loop {
            let pinned_total = pinned.iter().filter(|&&p| p).count() as f32 * min;
            let free_total: f32 = widths
                .iter()
                .zip(&pinned)
                .filter_map(|(w, p)| (!*p).then_some(*w))
                .sum();
            let scale = (available - pinned_total) / free_total;

            let mut newly_pinned = false;
            for (width, pin) in widths.iter().zip(pinned.iter_mut()) {
                if !*pin && *width * scale < min {
                    *pin = true;
                    newly_pinned = true;
                }
            }

            if !newly_pinned {
                for (width, pin) in widths.iter_mut().zip(&pinned) {
                    *width = if *pin { min } else { *width * scale };
                }
                return widths;
            }
        }
    }
}
