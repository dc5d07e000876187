//! # sheetflow-core
//!
//! Spreadsheet to paginated document layout.
//!
//! A worksheet is turned into a stream of pages, each a list of simple
//! drawing commands (filled rectangles, lines and text), which can be written
//! out as PDF or inspected as JSON:
//!
//! - **Structure detection** finds title rows, the header row and data rows
//! - **Column sizing** measures content and scales widths to the page
//! - **Text wrapping** tries whole text, sentences, words, then characters
//! - **Pagination** repeats the header on every page and keeps borders intact
//! - **Concurrent conversion** via tokio for files and rayon for layouts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sheetflow_core::{Converter, ConverterConfig, ConversionRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let converter = Converter::new(ConverterConfig::default())?;
//!
//!     let request = ConversionRequest::new("medals.xlsx", "./output");
//!     let result = converter.convert(request).await?;
//!
//!     println!("Laid out {} pages", result.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Laying Out In Memory
//!
//! ```rust
//! use sheetflow_core::{CellValue, Dataset, LayoutConfig, NoStyles, TableLayoutEngine};
//!
//! let dataset = Dataset::new(vec![
//!     vec![CellValue::text("Country"), CellValue::text("Rank"), CellValue::text("Total")],
//!     vec![CellValue::text("Norway"), CellValue::Number(1.0), CellValue::Number(37.0)],
//! ]);
//!
//! let engine = TableLayoutEngine::standard(LayoutConfig::default()).unwrap();
//! let stream = engine.layout(&dataset, &NoStyles).unwrap();
//! assert_eq!(stream.page_count(), 1);
//! ```
//!
//! ## Batch Processing with Progress
//!
//! ```rust,no_run
//! use sheetflow_core::{Converter, ConverterConfig, ConversionRequest, ConversionProgress};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let converter = Converter::new(ConverterConfig::default())?;
//!
//!     let requests = vec![
//!         ConversionRequest::new("q1.xlsx", "./output"),
//!         ConversionRequest::new("q2.xlsx", "./output"),
//!     ];
//!
//!     let result = converter.convert_batch_with_progress(
//!         requests,
//!         |progress: ConversionProgress| {
//!             println!("File {}/{}: {:?}",
//!                 progress.file_index + 1,
//!                 progress.total_files,
//!                 progress.stage
//!             );
//!         }
//!     ).await;
//!
//!     println!("Total: {} pages in {:?}", result.total_pages, result.total_duration);
//!     Ok(())
//! }
//! ```

pub mod columns;
pub mod config;
pub mod converter;
pub mod draw;
pub mod error;
pub mod format;
pub mod metrics;
pub mod paginate;
pub mod pdf;
pub mod render;
pub mod structure;
pub mod style;
pub mod value;
pub mod workbook;
pub mod wrap;

// Re-export main types for convenience
pub use columns::{ColumnLayout, ColumnWidthSolver};
pub use config::{
    BatchResult, ConversionProgress, ConversionRequest, ConversionStage, ConverterConfig,
    FailedFile, FileResult, LayoutConfig, OutputFormat,
};
pub use converter::{Converter, ConverterBuilder, EncodedDocument};
pub use draw::{DrawCommand, Page, PageStream};
pub use error::{CellError, ConversionError, Result};
pub use metrics::{FixedWidthMetrics, FontFace, FontMetrics, StandardFontMetrics};
pub use paginate::TableLayoutEngine;
pub use pdf::PdfEncoder;
pub use structure::{StructureAnalysis, StructureAnalyzer};
pub use style::{CellStyle, HorizontalAlign, NoStyles, Palette, RawCellStyle, Rgb, StyleSource};
pub use value::{CellValue, Dataset};
pub use workbook::{Sheet, Workbook};
pub use wrap::TextWrapper;

/// Supported spreadsheet file extensions.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

/// Check if a file extension is supported.
pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|&e| e.eq_ignore_ascii_case(ext))
}

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}
