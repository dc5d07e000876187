//! Per-row drawing.
//!
//! A row is first prepared (text formatted, style resolved, lines wrapped)
//! and the same prepared row is then used for both height accounting and
//! drawing, so the two passes can never disagree.

use crate::columns::ColumnLayout;
use crate::config::LayoutConfig;
use crate::draw::{DrawCommand, Page};
use crate::format::format_cell_content;
use crate::metrics::FontFace;
use crate::paginate::PageRowRecord;
use crate::structure::TitleRow;
use crate::style::{CellStyle, HorizontalAlign, StyleResolver};
use crate::value::Dataset;
use crate::wrap::TextWrapper;

/// One cell ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedCell {
    pub style: CellStyle,
    pub face: FontFace,
    pub alignment: HorizontalAlign,
    pub lines: Vec<String>,
}

/// One row ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRow {
    pub source_row_index: usize,
    pub is_header: bool,
    pub font_size: f32,
    pub height: f32,
    pub cells: Vec<PreparedCell>,
}

impl PreparedRow {
    /// True when any cell carries its own background color.
    pub fn has_explicit_background(&self) -> bool {
        self.cells.iter().any(|c| c.style.background.is_some())
    }
}

/// Emits background, text and border commands for table rows.
pub struct RowRenderer<'a> {
    config: &'a LayoutConfig,
    columns: &'a ColumnLayout,
    wrapper: TextWrapper<'a>,
    styles: StyleResolver<'a>,
}

impl<'a> RowRenderer<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        columns: &'a ColumnLayout,
        wrapper: TextWrapper<'a>,
        styles: StyleResolver<'a>,
    ) -> Self {
        Self {
            config,
            columns,
            wrapper,
            styles,
        }
    }

    /// Format, style and wrap every cell of a source row.
    ///
    /// Header cells show the raw value's string form in bold; data cells go
    /// through the content formatter.
    pub fn prepare(&self, data: &Dataset, source_row: usize, is_header: bool) -> PreparedRow {
        let cfg = self.config;
        let font_size = if is_header {
            cfg.header_font_size
        } else {
            cfg.data_font_size
        };

        let cells: Vec<PreparedCell> = self
            .columns
            .columns
            .iter()
            .enumerate()
            .map(|(col, column)| {
                let raw = data.cell(source_row, col);
                let text = if is_header {
                    raw.to_plain_string()
                } else {
                    format_cell_content(raw, col)
                };
                let style = self.styles.resolve(source_row, col);
                let face = FontFace::from_bold(is_header || style.bold);
                let alignment = style.effective_alignment(raw, &text);
                let lines = self.wrapper.wrap(&text, column.width, face, font_size);

                PreparedCell {
                    style,
                    face,
                    alignment,
                    lines,
                }
            })
            .collect();

        let max_lines = cells.iter().map(|c| c.lines.len()).max().unwrap_or(1).max(1);
        let height = cfg
            .min_row_height
            .max(max_lines as f32 * cfg.line_height + 2.0 * cfg.cell_padding_y);

        PreparedRow {
            source_row_index: source_row,
            is_header,
            font_size,
            height,
            cells,
        }
    }

    /// Draw a row's backgrounds and text with its top edge at `y_top`.
    ///
    /// `ordinal` is the row's position among data rows; even positions get
    /// the alternating tint. Header rows pass `None`.
    pub fn draw_row(&self, page: &mut Page, row: &PreparedRow, y_top: f32, ordinal: Option<usize>) {
        self.draw_background(page, row, y_top, ordinal);
        self.draw_content(page, row, y_top);
    }

    fn draw_background(
        &self,
        page: &mut Page,
        row: &PreparedRow,
        y_top: f32,
        ordinal: Option<usize>,
    ) {
        let y = y_top - row.height;

        for (cell, column) in row.cells.iter().zip(&self.columns.columns) {
            if let Some(color) = cell.style.background {
                page.push(DrawCommand::FillRect {
                    x: column.x,
                    y,
                    width: column.width,
                    height: row.height,
                    color,
                });
            }
        }

        let even = ordinal.is_some_and(|i| i % 2 == 0);
        if !row.is_header && even && !row.has_explicit_background() {
            page.push(DrawCommand::FillRect {
                x: self.columns.left(),
                y,
                width: self.columns.table_width(),
                height: row.height,
                color: self.config.alternate_row_tint,
            });
        }
    }

    fn draw_content(&self, page: &mut Page, row: &PreparedRow, y_top: f32) {
        let cfg = self.config;

        for (cell, column) in row.cells.iter().zip(&self.columns.columns) {
            let color = cell.style.font_color.unwrap_or(cfg.text_color);
            let offset = (row.height - cell.lines.len() as f32 * cfg.line_height) / 2.0;

            for (i, line) in cell.lines.iter().enumerate() {
                let y = y_top - cfg.cell_padding_y - offset - i as f32 * cfg.line_height;
                if line.is_empty() || y <= 0.0 {
                    continue;
                }

                let x = match cell.alignment {
                    HorizontalAlign::Center => {
                        let width = self.wrapper.measure(line, cell.face, row.font_size);
                        column.x + (column.width - width) / 2.0
                    }
                    HorizontalAlign::Right => {
                        let width = self.wrapper.measure(line, cell.face, row.font_size);
                        column.x + column.width - width - cfg.cell_padding_x
                    }
                    HorizontalAlign::Left | HorizontalAlign::Inherit => {
                        column.x + cfg.cell_padding_x
                    }
                };

                page.push(DrawCommand::DrawText {
                    x: x.max(column.x + cfg.min_text_inset),
                    y,
                    text: line.clone(),
                    font: cell.face,
                    size: row.font_size,
                    color,
                });
            }
        }
    }

    /// Draw the table grid around the rows placed on one page.
    pub fn draw_borders(&self, page: &mut Page, rows: &[PageRowRecord]) {
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return;
        };
        let cfg = self.config;
        let top = first.y_top;
        let bottom = last.y_top - last.height;
        let left = self.columns.left();
        let right = self.columns.right_edge();

        for x in self.columns.edges() {
            page.push(DrawCommand::DrawLine {
                x1: x,
                y1: top,
                x2: x,
                y2: bottom,
                thickness: cfg.body_rule_thickness,
                color: cfg.border_color,
            });
        }

        for record in rows {
            let thickness = if record.is_header {
                cfg.header_rule_thickness
            } else {
                cfg.body_rule_thickness
            };
            page.push(horizontal_rule(left, right, record.y_top, thickness, cfg));
        }

        page.push(horizontal_rule(left, right, bottom, cfg.body_rule_thickness, cfg));
    }

    /// Draw caption rows centered on the page starting at baseline `y`.
    /// Returns the cursor position below the captions.
    pub fn draw_titles(&self, page: &mut Page, titles: &[TitleRow], mut y: f32) -> f32 {
        let cfg = self.config;

        for title in titles {
            let text = title.text.trim();
            if text.is_empty() {
                continue;
            }
            let width = self.wrapper.measure(text, FontFace::Bold, cfg.title_font_size);
            page.push(DrawCommand::DrawText {
                x: (cfg.page_width - width) / 2.0,
                y,
                text: text.to_string(),
                font: FontFace::Bold,
                size: cfg.title_font_size,
                color: cfg.text_color,
            });
            y -= cfg.title_line_advance;
        }

        if !titles.is_empty() {
            y -= cfg.title_gap;
        }
        y
    }
}

fn horizontal_rule(
    left: f32,
    right: f32,
    y: f32,
    thickness: f32,
    cfg: &LayoutConfig,
) -> DrawCommand {
    DrawCommand::DrawLine {
        x1: left,
        y1: y,
        x2: right,
        y2: y,
        thickness,
        color: cfg.border_color,
    }
}
