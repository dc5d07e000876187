//! Pagination and the layout entry point.
//!
//! [`Paginator`] is a small state machine. While a page is open it stacks
//! rows downward from the top margin. A row that would cross the break line
//! flushes the page: borders are drawn around the rows it holds, a new page
//! opens and the header is drawn again at its top. Closing the document
//! draws the borders of the final page.

use crate::columns::ColumnWidthSolver;
use crate::config::LayoutConfig;
use crate::draw::{Page, PageStream};
use crate::error::Result;
use crate::metrics::{FontMetrics, StandardFontMetrics};
use crate::render::{PreparedRow, RowRenderer};
use crate::structure::{StructureAnalyzer, TitleRow};
use crate::style::{Palette, StyleResolver, StyleSource};
use crate::value::Dataset;
use crate::wrap::TextWrapper;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Geometry of a row placed on the current page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageRowRecord {
    pub y_top: f32,
    pub height: f32,
    pub is_header: bool,
    pub source_row_index: usize,
}

/// Paginator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageState {
    /// Rows are being added to the current page.
    Open,
    /// A page break just happened: the new page holds only the repeated
    /// header and the row that caused the break is still pending.
    Flush,
    /// The last page has been finalized. Further rows are ignored.
    Closed,
}

/// Places prepared rows onto pages.
pub struct Paginator<'r, 'a> {
    config: &'a LayoutConfig,
    renderer: &'r RowRenderer<'a>,
    header: PreparedRow,
    pages: Vec<Page>,
    current: Page,
    rows: Vec<PageRowRecord>,
    y: f32,
    state: PageState,
}

impl<'r, 'a> Paginator<'r, 'a> {
    /// Open the first page. `header` is drawn at the top of every page.
    pub fn new(
        config: &'a LayoutConfig,
        renderer: &'r RowRenderer<'a>,
        header: PreparedRow,
    ) -> Self {
        Self {
            config,
            renderer,
            header,
            pages: Vec::new(),
            current: Page::new(1, config.page_width, config.page_height),
            rows: Vec::new(),
            y: config.content_top(),
            state: PageState::Open,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// Current cursor: the top edge of the next row.
    pub fn cursor(&self) -> f32 {
        self.y
    }

    /// Rows placed on the open page so far.
    pub fn page_rows(&self) -> &[PageRowRecord] {
        &self.rows
    }

    /// Draw captions at the cursor. Only meaningful before any row is placed.
    pub fn place_titles(&mut self, titles: &[TitleRow]) {
        self.y = self.renderer.draw_titles(&mut self.current, titles, self.y);
    }

    /// Draw the header row at the cursor.
    pub fn place_header(&mut self) {
        if self.state == PageState::Closed {
            warn!("Header placed after the document was closed");
            return;
        }
        self.renderer
            .draw_row(&mut self.current, &self.header, self.y, None);
        self.push_record(self.header.height, true, self.header.source_row_index);
    }

    /// Place a data row, flushing the page first when it would cross the
    /// break line. `ordinal` is the row's position among all data rows.
    pub fn place_row(&mut self, row: &PreparedRow, ordinal: usize) {
        if self.state == PageState::Closed {
            warn!(
                "Row {} placed after the document was closed",
                row.source_row_index
            );
            return;
        }
        if self.needs_break(row.height) {
            self.flush_page();
        }
        self.renderer
            .draw_row(&mut self.current, row, self.y, Some(ordinal));
        self.push_record(row.height, false, row.source_row_index);
        self.state = PageState::Open;
    }

    /// A break is needed when the row would cross the break line, unless the
    /// page holds no data rows yet and a fresh page would not help either.
    fn needs_break(&self, height: f32) -> bool {
        let break_line = self.config.break_line();
        if self.y - height >= break_line {
            return false;
        }
        let has_data = self.rows.iter().any(|r| !r.is_header);
        let fits_fresh = self.config.content_top() - self.header.height - height >= break_line;
        has_data || fits_fresh
    }

    fn push_record(&mut self, height: f32, is_header: bool, source_row_index: usize) {
        self.rows.push(PageRowRecord {
            y_top: self.y,
            height,
            is_header,
            source_row_index,
        });
        self.y -= height;
    }

    fn finalize_current(&mut self) {
        self.renderer.draw_borders(&mut self.current, &self.rows);
        debug!(
            "Page {} finalized with {} row(s)",
            self.current.number,
            self.rows.len()
        );
        self.rows.clear();
    }

    /// Finalize the open page and start a new one headed by the header row.
    /// The paginator stays in [`PageState::Flush`] until the next data row.
    pub fn flush_page(&mut self) {
        if self.state == PageState::Closed {
            return;
        }
        self.finalize_current();

        let next = Page::new(
            self.current.number + 1,
            self.config.page_width,
            self.config.page_height,
        );
        self.pages.push(std::mem::replace(&mut self.current, next));
        self.y = self.config.content_top();
        self.place_header();

        self.state = PageState::Flush;
    }

    /// Draw the borders of the last page and stop accepting rows.
    pub fn close(&mut self) {
        if self.state == PageState::Closed {
            return;
        }
        self.finalize_current();
        self.state = PageState::Closed;
    }

    /// Close the document and return every page.
    pub fn finish(mut self) -> Vec<Page> {
        self.close();
        self.pages.push(self.current);
        self.pages
    }
}

/// Lays out spreadsheet datasets into page streams.
pub struct TableLayoutEngine {
    config: LayoutConfig,
    metrics: Arc<dyn FontMetrics>,
    palette: Arc<Palette>,
}

impl TableLayoutEngine {
    /// Create an engine. Fails when `config` is invalid.
    pub fn new(
        config: LayoutConfig,
        metrics: Arc<dyn FontMetrics>,
        palette: Arc<Palette>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            metrics,
            palette,
        })
    }

    /// Engine with Helvetica metrics and the standard palette.
    pub fn standard(config: LayoutConfig) -> Result<Self> {
        Self::new(config, Arc::new(StandardFontMetrics::new()), Palette::standard())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out one dataset.
    ///
    /// Structural failures are returned before any page is produced; per-cell
    /// style or measurement problems only degrade that cell.
    pub fn layout(&self, data: &Dataset, styles: &dyn StyleSource) -> Result<PageStream> {
        let config = &self.config;
        let metrics = self.metrics.as_ref();

        let analysis = StructureAnalyzer::new(config).analyze(data)?;
        debug!(
            "Structure: {} title(s), header at row {}, {} data row(s), {} column(s)",
            analysis.title_rows.len(),
            analysis.header_row_index,
            analysis.data_rows.len(),
            analysis.column_count
        );

        let columns = ColumnWidthSolver::new(config, metrics).solve(data, &analysis);
        let renderer = RowRenderer::new(
            config,
            &columns,
            TextWrapper::new(config, metrics),
            StyleResolver::new(styles, Arc::clone(&self.palette)),
        );

        let header = renderer.prepare(data, analysis.header_row_index, true);
        let mut paginator = Paginator::new(config, &renderer, header);
        if analysis.has_titles() {
            paginator.place_titles(&analysis.title_rows);
        }
        paginator.place_header();

        for (ordinal, &source_row) in analysis.data_rows.iter().enumerate() {
            let row = renderer.prepare(data, source_row, false);
            paginator.place_row(&row, ordinal);
        }

        let pages = paginator.finish();
        info!(
            "Laid out {} data row(s) on {} page(s)",
            analysis.data_rows.len(),
            pages.len()
        );

        Ok(PageStream {
            page_width: config.page_width,
            page_height: config.page_height,
            pages,
        })
    }

    /// Lay out independent datasets in parallel. Results keep input order.
    pub fn layout_many(&self, jobs: &[(&Dataset, &dyn StyleSource)]) -> Vec<Result<PageStream>> {
        jobs.par_iter()
            .map(|(data, styles)| self.layout(data, *styles))
            .collect()
    }
}
