//! Error types for the swinv-core library.

use thiserror::Error;

/// Main error type for the swinv library.
///
/// Fields that could not be recovered from an invoice are never reported
/// here; they are simply left unset on [`crate::ExtractedInvoiceData`].
#[derive(Error, Debug)]
pub enum SwinvError {
    /// The byte stream is not a readable PDF or exposes no text.
    #[error("document unreadable: {0}")]
    DocumentUnreadable(#[from] PdfError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors raised while reading the PDF text layer.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to walk the page content streams.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// None of the processed pages carries a text layer.
    #[error("PDF has no extractable text on the first {0} page(s)")]
    NoText(usize),
}

impl SwinvError {
    /// Whether this error means the input document itself could not be read.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, SwinvError::DocumentUnreadable(_))
    }
}

/// Result type for the swinv library.
pub type Result<T> = std::result::Result<T, SwinvError>;
