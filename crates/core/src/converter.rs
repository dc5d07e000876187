//! Async converter that ties together workbook decoding, layout and encoding.
//!
//! Layout is pure CPU work and runs on tokio's blocking pool; only file reads
//! and writes are awaited directly. Several documents can be converted at the
//! same time since each conversion owns its own layout state.

use crate::config::{
    BatchResult, ConversionProgress, ConversionRequest, ConversionStage, ConverterConfig,
    FailedFile, FileResult, LayoutConfig, OutputFormat,
};
use crate::draw::PageStream;
use crate::error::{ConversionError, Result};
use crate::is_supported_extension;
use crate::paginate::TableLayoutEngine;
use crate::pdf::PdfEncoder;
use crate::workbook::Workbook;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// An encoded document held in memory.
#[derive(Debug, Clone)]
pub struct EncodedDocument {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub page_count: usize,
}

/// Main converter for spreadsheets to paginated documents.
pub struct Converter {
    engine: Arc<TableLayoutEngine>,
    pdf: PdfEncoder,
    config: ConverterConfig,
    processed: AtomicUsize,
}

impl Converter {
    /// Create a new converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        let engine = TableLayoutEngine::standard(config.layout.clone())?;

        info!(
            "Initializing converter with output_format={:?}, max_concurrent_documents={}",
            config.output_format, config.max_concurrent_documents
        );

        Ok(Self::with_engine(config, engine))
    }

    /// Create a converter around an existing engine.
    pub fn with_engine(config: ConverterConfig, engine: TableLayoutEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            pdf: PdfEncoder::new(),
            config,
            processed: AtomicUsize::new(0),
        }
    }

    /// Convert a single spreadsheet file and write the result to disk.
    pub async fn convert(&self, request: ConversionRequest) -> Result<FileResult> {
        self.convert_with_stages(&request, |_, _| {}).await
    }

    /// Convert spreadsheet bytes in memory.
    pub async fn convert_bytes(
        &self,
        data: Vec<u8>,
        format: OutputFormat,
    ) -> Result<EncodedDocument> {
        let stream = self.layout_bytes(data).await?;
        let page_count = stream.page_count();
        let bytes = self.encode(stream, format).await?;
        self.processed.fetch_add(1, Ordering::Relaxed);

        Ok(EncodedDocument {
            bytes,
            format,
            page_count,
        })
    }

    /// Decode spreadsheet bytes and lay out the configured sheet.
    pub async fn layout_bytes(&self, data: Vec<u8>) -> Result<PageStream> {
        let engine = Arc::clone(&self.engine);
        let sheet_index = self.config.sheet_index;

        tokio::task::spawn_blocking(move || {
            let workbook = Workbook::from_bytes(&data)?;
            let sheet = workbook.sheet(sheet_index)?;
            debug!("Laying out sheet '{}'", sheet.name);
            engine.layout(&sheet.dataset, &sheet.styles)
        })
        .await?
    }

    async fn encode(&self, stream: PageStream, format: OutputFormat) -> Result<Vec<u8>> {
        let pdf = self.pdf.clone();
        tokio::task::spawn_blocking(move || match format {
            OutputFormat::Pdf => pdf.encode(&stream),
            OutputFormat::PageStreamJson => Ok(stream.to_json()?),
        })
        .await?
    }

    async fn convert_with_stages<F>(
        &self,
        request: &ConversionRequest,
        on_stage: F,
    ) -> Result<FileResult>
    where
        F: Fn(ConversionStage, Option<usize>),
    {
        let start = Instant::now();
        let input_path = request.input_path.clone();
        info!("Converting {:?}", input_path);

        check_input(&input_path)?;

        on_stage(ConversionStage::Reading, None);
        let data = tokio::fs::read(&input_path).await?;

        on_stage(ConversionStage::LayingOut, None);
        let stream = self.layout_bytes(data).await?;
        let page_count = stream.page_count();

        on_stage(ConversionStage::Encoding, Some(page_count));
        let format = request.format_override.unwrap_or(self.config.output_format);
        let bytes = self.encode(stream, format).await?;

        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| ConversionError::OutputDirError {
                path: request.output_dir.clone(),
                message: e.to_string(),
            })?;

        let filename = format!("{}.{}", request.get_output_prefix(), format.extension());
        let output_path = request.output_dir.join(filename);
        tokio::fs::write(&output_path, &bytes)
            .await
            .map_err(|e| ConversionError::OutputDirError {
                path: output_path.clone(),
                message: e.to_string(),
            })?;

        self.processed.fetch_add(1, Ordering::Relaxed);
        info!(
            "Converted {:?} to {} page(s) in {:?}",
            input_path,
            page_count,
            start.elapsed()
        );

        Ok(FileResult {
            input_path,
            output_path,
            page_count,
            duration: start.elapsed(),
        })
    }

    /// Convert multiple documents one after another.
    pub async fn convert_batch(&self, requests: Vec<ConversionRequest>) -> BatchResult {
        self.convert_batch_with_progress(requests, |_| {}).await
    }

    /// Convert multiple documents one after another with a progress callback.
    pub async fn convert_batch_with_progress<F>(
        &self,
        requests: Vec<ConversionRequest>,
        progress_callback: F,
    ) -> BatchResult
    where
        F: Fn(ConversionProgress) + Send + Sync,
    {
        let start = Instant::now();
        let total_files = requests.len();
        let mut collector = BatchCollector::default();

        for (file_index, request) in requests.into_iter().enumerate() {
            let current_file = request
                .input_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();
            let report = |stage: ConversionStage, page_count: Option<usize>| {
                progress_callback(ConversionProgress {
                    file_index,
                    total_files,
                    current_file: current_file.clone(),
                    page_count,
                    stage,
                });
            };

            report(ConversionStage::Queued, None);

            let result = self.convert_with_stages(&request, &report).await;
            match &result {
                Ok(file) => report(ConversionStage::Completed, Some(file.page_count)),
                Err(_) => report(ConversionStage::Failed, None),
            }
            collector.record(&request.input_path, result);
        }

        collector.finish(start)
    }

    /// Convert documents concurrently, at most `concurrency` at a time.
    pub async fn convert_parallel(
        &self,
        requests: Vec<ConversionRequest>,
        concurrency: usize,
    ) -> BatchResult {
        let start = Instant::now();

        let results: Vec<(ConversionRequest, Result<FileResult>)> = stream::iter(requests)
            .map(|request| async move {
                let result = self.convert(request.clone()).await;
                (request, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut collector = BatchCollector::default();
        for (request, result) in results {
            collector.record(&request.input_path, result);
        }
        collector.finish(start)
    }

    /// Convert documents concurrently using the configured concurrency limit.
    pub async fn convert_all(&self, requests: Vec<ConversionRequest>) -> BatchResult {
        self.convert_parallel(requests, self.config.max_concurrent_documents)
            .await
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// The layout engine used for every document.
    pub fn engine(&self) -> &TableLayoutEngine {
        &self.engine
    }

    /// Get statistics about processing.
    pub fn stats(&self) -> ConverterStats {
        ConverterStats {
            total_documents_processed: self.processed.load(Ordering::Relaxed),
            max_concurrent_documents: self.config.max_concurrent_documents,
            output_format: self.config.output_format,
        }
    }
}

fn check_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ConversionError::InputNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !is_supported_extension(extension) {
        return Err(ConversionError::UnsupportedFormat {
            extension: extension.to_string(),
        });
    }
    Ok(())
}

#[derive(Default)]
struct BatchCollector {
    successful: Vec<FileResult>,
    failed: Vec<FailedFile>,
    total_pages: usize,
}

impl BatchCollector {
    fn record(&mut self, input_path: &Path, result: Result<FileResult>) {
        match result {
            Ok(file_result) => {
                self.total_pages += file_result.page_count;
                self.successful.push(file_result);
            }
            Err(e) => {
                error!("Failed to convert {:?}: {}", input_path, e);
                self.failed.push(FailedFile {
                    input_path: input_path.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }
    }

    fn finish(self, start: Instant) -> BatchResult {
        BatchResult {
            successful: self.successful,
            failed: self.failed,
            total_duration: start.elapsed(),
            total_pages: self.total_pages,
        }
    }
}

/// Statistics about the converter.
#[derive(Debug, Clone)]
pub struct ConverterStats {
    /// Total documents converted since creation.
    pub total_documents_processed: usize,
    /// Concurrency limit for `convert_all`.
    pub max_concurrent_documents: usize,
    /// Default output format.
    pub output_format: OutputFormat,
}

/// Builder for creating a Converter with custom settings.
pub struct ConverterBuilder {
    config: ConverterConfig,
}

impl ConverterBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ConverterConfig::default(),
        }
    }

    /// Set the layout configuration.
    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    /// Set the default output format.
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Select the worksheet to convert.
    pub fn sheet_index(mut self, index: usize) -> Self {
        self.config.sheet_index = index;
        self
    }

    /// Set the concurrency limit used by `convert_all`.
    pub fn max_concurrent_documents(mut self, limit: usize) -> Self {
        self.config.max_concurrent_documents = limit;
        self
    }

    /// Build the converter.
    pub fn build(self) -> Result<Converter> {
        Converter::new(self.config)
    }
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
