//! Error types for spreadsheet-to-page conversion.
//!
//! Two tiers exist: [`ConversionError`] aborts a whole document, while
//! [`CellError`] describes a cosmetic problem with a single cell that the
//! engine logs and recovers from.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the sheetflow library.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Structure inference found no columns or no data rows.
    #[error("Could not find valid table data in the spreadsheet")]
    NoTabularData,

    /// The worksheet contains no rows at all.
    #[error("The provided spreadsheet is empty or has no data")]
    EmptyWorksheet,

    /// Requested sheet index does not exist in the workbook.
    #[error("Sheet {index} not found, workbook has {available} sheet(s)")]
    SheetNotFound { index: usize, available: usize },

    /// Input file not found.
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Unsupported file format.
    #[error("Unsupported file format: {extension}. Supported: .xlsx, .xlsm")]
    UnsupportedFormat { extension: String },

    /// The spreadsheet bytes could not be decoded.
    #[error("Failed to read spreadsheet: {0}")]
    SpreadsheetParse(String),

    /// PDF serialization failed.
    #[error("PDF encoding failed: {0}")]
    PdfEncoding(String),

    /// Output directory creation or output write failed.
    #[error("Failed to write output '{path}': {message}")]
    OutputDirError { path: PathBuf, message: String },

    /// Underlying I/O failure while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Page stream could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A blocking layout task panicked or was cancelled.
    #[error("Layout task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, ConversionError>;

impl From<tokio::task::JoinError> for ConversionError {
    fn from(err: tokio::task::JoinError) -> Self {
        ConversionError::TaskFailed(err.to_string())
    }
}

impl From<lopdf::Error> for ConversionError {
    fn from(err: lopdf::Error) -> Self {
        ConversionError::PdfEncoding(err.to_string())
    }
}

/// Per-cell failure. Never aborts a page; callers degrade to defaults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    /// Style data for the cell could not be read.
    #[error("style unavailable for cell ({row}, {col}): {reason}")]
    StyleUnavailable {
        row: usize,
        col: usize,
        reason: String,
    },

    /// The font has no width for this character.
    #[error("no glyph width for {ch:?}")]
    Unmeasurable { ch: char },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_no_tabular_data() {
        let msg = ConversionError::NoTabularData.to_string();
        assert!(msg.contains("valid table data"));
    }

    #[test]
    fn test_error_display_empty_worksheet() {
        let msg = ConversionError::EmptyWorksheet.to_string();
        assert!(msg.contains("empty"));
    }

    #[test]
    fn test_error_display_sheet_not_found() {
        let err = ConversionError::SheetNotFound {
            index: 3,
            available: 1,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Sheet 3"));
        assert!(msg.contains("1 sheet"));
    }

    #[test]
    fn test_error_display_unsupported_format() {
        let err = ConversionError::UnsupportedFormat {
            extension: "docx".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("docx"));
        assert!(msg.contains("Supported"));
    }

    #[test]
    fn test_error_display_output_dir() {
        let err = ConversionError::OutputDirError {
            path: PathBuf::from("/out/report.pdf"),
            message: "permission denied".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/out/report.pdf"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ConversionError = io_err.into();
        match err {
            ConversionError::Io(_) => (),
            _ => panic!("Expected Io"),
        }
    }

    #[test]
    fn test_cell_error_display() {
        let err = CellError::StyleUnavailable {
            row: 4,
            col: 2,
            reason: "corrupt fill".to_string(),
        };
        assert!(err.to_string().contains("(4, 2)"));
        assert!(CellError::Unmeasurable { ch: '\u{4e2d}' }
            .to_string()
            .contains("glyph"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);

        fn returns_error() -> Result<i32> {
            Err(ConversionError::NoTabularData)
        }
        assert!(returns_error().is_err());
    }
}
