//! Configuration types for spreadsheet layout and conversion.

use crate::error::{ConversionError, Result};
use crate::style::Rgb;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Page geometry, typography and heuristic thresholds for one layout run.
///
/// Every engine component receives this value at construction; nothing reads
/// layout constants from ambient state. All lengths are PDF points with the
/// origin at the bottom-left corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Page width (A4 landscape).
    pub page_width: f32,
    /// Page height (A4 landscape).
    pub page_height: f32,
    /// Margin applied on all four sides.
    pub margin: f32,

    pub title_font_size: f32,
    pub header_font_size: f32,
    pub data_font_size: f32,

    /// Rows never get shorter than this.
    pub min_row_height: f32,
    pub cell_padding_x: f32,
    pub cell_padding_y: f32,
    /// Vertical advance per wrapped line.
    pub line_height: f32,

    pub min_column_width: f32,
    pub max_column_width: f32,
    /// Extra room added to measured content when sizing a column.
    pub column_fit_slack: f32,
    /// Number of data rows sampled when sizing columns.
    pub width_sample_rows: usize,

    /// Vertical advance after each title line.
    pub title_line_advance: f32,
    /// Extra gap between the last title line and the table.
    pub title_gap: f32,
    /// Space kept free above the bottom margin before breaking a page.
    pub page_break_reserve: f32,

    /// Rows examined when looking for titles and the header.
    pub structure_scan_rows: usize,
    /// Rows examined by the most-populated-row header fallback.
    pub fallback_scan_rows: usize,
    /// Single-cell rows longer than this are treated as titles.
    pub title_min_length: usize,

    pub border_color: Rgb,
    pub alternate_row_tint: Rgb,
    pub text_color: Rgb,
    pub header_rule_thickness: f32,
    pub body_rule_thickness: f32,
    /// Text never starts closer than this to the cell's left edge.
    pub min_text_inset: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 841.89,
            page_height: 595.28,
            margin: 30.0,
            title_font_size: 14.0,
            header_font_size: 9.0,
            data_font_size: 8.0,
            min_row_height: 20.0,
            cell_padding_x: 5.0,
            cell_padding_y: 4.0,
            line_height: 10.0,
            min_column_width: 45.0,
            max_column_width: 120.0,
            column_fit_slack: 5.0,
            width_sample_rows: 50,
            title_line_advance: 30.0,
            title_gap: 15.0,
            page_break_reserve: 20.0,
            structure_scan_rows: 10,
            fallback_scan_rows: 5,
            title_min_length: 10,
            border_color: Rgb::gray(0.7),
            alternate_row_tint: Rgb::gray(0.98),
            text_color: Rgb::BLACK,
            header_rule_thickness: 1.0,
            body_rule_thickness: 0.5,
            min_text_inset: 2.0,
        }
    }
}

impl LayoutConfig {
    /// Set the page size.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the page margin.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set title, header and data font sizes.
    pub fn with_fonts(mut self, title: f32, header: f32, data: f32) -> Self {
        self.title_font_size = title;
        self.header_font_size = header;
        self.data_font_size = data;
        self
    }

    /// Set the column width bounds.
    pub fn with_column_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_column_width = min;
        self.max_column_width = max;
        self
    }

    /// Width between the left and right margins.
    pub fn printable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Y coordinate of the first row on a fresh page.
    pub fn content_top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// A row whose bottom would fall below this line forces a page break.
    pub fn break_line(&self) -> f32 {
        self.margin + self.page_break_reserve
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("title_font_size", self.title_font_size),
            ("header_font_size", self.header_font_size),
            ("data_font_size", self.data_font_size),
            ("line_height", self.line_height),
            ("min_column_width", self.min_column_width),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConversionError::InvalidConfig(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }
        if self.margin < 0.0 || self.cell_padding_x < 0.0 || self.cell_padding_y < 0.0 {
            return Err(ConversionError::InvalidConfig(
                "margin and cell padding must not be negative".to_string(),
            ));
        }
        if self.min_column_width > self.max_column_width {
            return Err(ConversionError::InvalidConfig(
                "min_column_width must not exceed max_column_width".to_string(),
            ));
        }
        if self.printable_width() < self.min_column_width {
            return Err(ConversionError::InvalidConfig(
                "printable width must hold at least one column".to_string(),
            ));
        }
        if self.content_top() <= self.break_line() {
            return Err(ConversionError::InvalidConfig(
                "page height leaves no room for rows".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serialization target for a laid-out document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// A PDF file.
    #[default]
    Pdf,
    /// The raw page stream as JSON draw commands.
    PageStreamJson,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::PageStreamJson => "json",
        }
    }
}

/// Combined configuration for the converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Layout configuration shared by every document.
    pub layout: LayoutConfig,

    /// Default output format.
    pub output_format: OutputFormat,

    /// Worksheet to convert (0-based).
    /// Default: 0 (the first sheet).
    pub sheet_index: usize,

    /// Upper bound on documents laid out at the same time.
    /// Default: number of CPU cores.
    pub max_concurrent_documents: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            output_format: OutputFormat::default(),
            sheet_index: 0,
            max_concurrent_documents: num_cpus::get(),
        }
    }
}

impl ConverterConfig {
    /// Create a converter config with the given layout and output format.
    pub fn new(layout: LayoutConfig, output_format: OutputFormat) -> Self {
        Self {
            layout,
            output_format,
            ..Default::default()
        }
    }

    /// Select the worksheet to convert.
    pub fn sheet_index(mut self, index: usize) -> Self {
        self.sheet_index = index;
        self
    }

    /// Set the concurrency limit for batch conversion.
    pub fn max_concurrent_documents(mut self, limit: usize) -> Self {
        self.max_concurrent_documents = limit;
        self
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if self.max_concurrent_documents == 0 {
            return Err(ConversionError::InvalidConfig(
                "max_concurrent_documents must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single conversion request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Path to the input spreadsheet.
    pub input_path: PathBuf,

    /// Directory to write the output file into.
    pub output_dir: PathBuf,

    /// Optional output filename stem.
    /// Default: input filename without extension.
    pub output_prefix: Option<String>,

    /// Override the output format for this specific conversion.
    pub format_override: Option<OutputFormat>,
}

impl ConversionRequest {
    /// Create a new conversion request.
    pub fn new(input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            output_prefix: None,
            format_override: None,
        }
    }

    /// Set a custom output prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = Some(prefix.into());
        self
    }

    /// Override the output format for this conversion.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format_override = Some(format);
        self
    }

    /// Get the output prefix, defaulting to the input filename.
    pub fn get_output_prefix(&self) -> String {
        self.output_prefix.clone().unwrap_or_else(|| {
            self.input_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output")
                .to_string()
        })
    }
}

/// Progress information for a batch conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionProgress {
    /// Index of the current file being processed.
    pub file_index: usize,

    /// Total number of files to process.
    pub total_files: usize,

    /// Name of the current file.
    pub current_file: String,

    /// Pages produced for the current file, once known.
    pub page_count: Option<usize>,

    /// Current stage of processing.
    pub stage: ConversionStage,
}

/// Stage of the conversion process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionStage {
    /// Queued, waiting to start.
    Queued,
    /// Reading and decoding the spreadsheet.
    Reading,
    /// Running structure analysis and pagination.
    LayingOut,
    /// Serializing the page stream.
    Encoding,
    /// Completed successfully.
    Completed,
    /// Failed with error.
    Failed,
}

/// Result of a batch conversion operation.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Successfully converted files.
    pub successful: Vec<FileResult>,

    /// Failed conversions.
    pub failed: Vec<FailedFile>,

    /// Total processing time.
    pub total_duration: Duration,

    /// Total pages produced.
    pub total_pages: usize,
}

/// Result for a single successfully converted file.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Original input path.
    pub input_path: PathBuf,

    /// Written output file.
    pub output_path: PathBuf,

    /// Number of pages.
    pub page_count: usize,

    /// Processing time for this file.
    pub duration: Duration,
}

/// Information about a failed conversion.
#[derive(Debug, Clone)]
pub struct FailedFile {
    /// Original input path.
    pub input_path: PathBuf,

    /// Error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_config_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.page_width, 841.89);
        assert_eq!(config.page_height, 595.28);
        assert_eq!(config.margin, 30.0);
        assert_eq!(config.title_font_size, 14.0);
        assert_eq!(config.header_font_size, 9.0);
        assert_eq!(config.data_font_size, 8.0);
        assert_eq!(config.min_row_height, 20.0);
        assert_eq!(config.cell_padding_x, 5.0);
        assert_eq!(config.cell_padding_y, 4.0);
        assert_eq!(config.line_height, 10.0);
        assert_eq!(config.min_column_width, 45.0);
        assert_eq!(config.max_column_width, 120.0);
    }

    #[test]
    fn test_layout_config_derived_geometry() {
        let config = LayoutConfig::default();
        assert!((config.printable_width() - 781.89).abs() < 1e-3);
        assert!((config.content_top() - 565.28).abs() < 1e-3);
        assert_eq!(config.break_line(), 50.0);
    }

    #[test]
    fn test_layout_config_builder_pattern() {
        let config = LayoutConfig::default()
            .with_page_size(595.28, 841.89)
            .with_margin(20.0)
            .with_fonts(16.0, 10.0, 9.0)
            .with_column_bounds(40.0, 150.0);

        assert_eq!(config.page_width, 595.28);
        assert_eq!(config.margin, 20.0);
        assert_eq!(config.header_font_size, 10.0);
        assert_eq!(config.max_column_width, 150.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layout_config_validation_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_layout_config_validation_zero_font() {
        let config = LayoutConfig::default().with_fonts(14.0, 0.0, 8.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_config_validation_inverted_bounds() {
        let config = LayoutConfig::default().with_column_bounds(130.0, 120.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_config_validation_page_too_small() {
        let config = LayoutConfig::default().with_page_size(100.0, 60.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_config_partial_json_uses_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{"margin": 12.0}"#).unwrap();
        assert_eq!(config.margin, 12.0);
        assert_eq!(config.page_width, 841.89);
    }

    #[test]
    fn test_converter_config_validate_propagates() {
        let mut config = ConverterConfig::default();
        config.layout.line_height = 0.0;
        assert!(config.validate().is_err());

        let config2 = ConverterConfig::default().max_concurrent_documents(0);
        assert!(config2.validate().is_err());
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Pdf.extension(), "pdf");
        assert_eq!(OutputFormat::PageStreamJson.extension(), "json");
        assert_eq!(OutputFormat::default(), OutputFormat::Pdf);
    }

    #[test]
    fn test_conversion_request_with_prefix() {
        let request = ConversionRequest::new("input.xlsx", "/output").with_prefix("custom_prefix");
        assert_eq!(request.get_output_prefix(), "custom_prefix");
    }

    #[test]
    fn test_conversion_request_get_output_prefix_from_filename() {
        let request = ConversionRequest::new("path/to/sales.xlsx", "/output");
        assert_eq!(request.get_output_prefix(), "sales");
    }

    #[test]
    fn test_conversion_request_with_format() {
        let request =
            ConversionRequest::new("a.xlsx", "/output").with_format(OutputFormat::PageStreamJson);
        assert_eq!(request.format_override, Some(OutputFormat::PageStreamJson));
    }
}
