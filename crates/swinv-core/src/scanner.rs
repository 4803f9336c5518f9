//! End-to-end invoice scanning: PDF bytes in, extraction result out.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::invoice::{ExtractionResult, InvoiceParser, SwissInvoiceParser};
use crate::models::config::ScanConfig;
use crate::pdf::{LineReconstructor, PdfExtractor, TextLine};

/// Reads supplier invoices and extracts their fields.
///
/// Cheap to clone; clones share the same configuration. Each scan is
/// independent, so one scanner can serve any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct InvoiceScanner {
    inner: Arc<ScannerInner>,
}

#[derive(Debug, Default)]
struct ScannerInner {
    extractor: PdfExtractor,
    reconstructor: LineReconstructor,
    parser: SwissInvoiceParser,
}

impl InvoiceScanner {
    /// Create a scanner from configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            inner: Arc::new(ScannerInner {
                extractor: PdfExtractor::new(),
                reconstructor: LineReconstructor::new(config.pdf),
                parser: SwissInvoiceParser::new(config.extraction),
            }),
        }
    }

    /// Scan an in-memory PDF.
    ///
    /// Fails only when the document cannot be read or has no text layer;
    /// unrecoverable fields are left unset on the result.
    pub fn scan_bytes(&self, data: &[u8]) -> Result<ExtractionResult> {
        debug!("Scanning {} bytes", data.len());
        let lines = self
            .inner
            .reconstructor
            .read(&self.inner.extractor, data)?;
        Ok(self.scan_lines(&lines))
    }

    /// Run field extraction over already reconstructed lines.
    pub fn scan_lines(&self, lines: &[TextLine]) -> ExtractionResult {
        self.inner.parser.parse(lines)
    }

    /// Read and scan a PDF file.
    ///
    /// The file is read asynchronously and the CPU-bound extraction runs on
    /// the blocking pool.
    pub async fn scan_file(&self, path: impl AsRef<Path>) -> Result<ExtractionResult> {
        let path = path.as_ref();
        info!("Scanning file: {}", path.display());

        let data = tokio::fs::read(path).await?;
        let scanner = self.clone();
        let result = tokio::task::spawn_blocking(move || scanner.scan_bytes(&data)).await??;

        debug!(
            "Scanned {} in {}ms with {} warning(s)",
            path.display(),
            result.processing_time_ms,
            result.warnings.len()
        );
        Ok(result)
    }
}
