//! PDF text-layer access and line reconstruction.

mod extractor;
mod lines;

pub use extractor::PdfExtractor;
pub use lines::{full_text, LineReconstructor, TextLine};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A run of text the PDF layer placed at one baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// Fragment text as emitted by the PDF layer.
    pub text: String,
    /// Baseline y in PDF user space (origin bottom-left).
    pub y: f64,
    /// Page number (1-indexed).
    pub page: u32,
}

/// The text fragments of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// Page number (1-indexed).
    pub number: u32,
    /// Page height in user-space units.
    pub height: f64,
    /// Fragments in emission order.
    pub fragments: Vec<TextFragment>,
}

impl PageText {
    /// Create an empty page.
    pub fn new(number: u32, height: f64) -> Self {
        Self {
            number,
            height,
            fragments: Vec::new(),
        }
    }

    /// Append a fragment at baseline `y`.
    pub fn push(&mut self, text: impl Into<String>, y: f64) {
        self.fragments.push(TextFragment {
            text: text.into(),
            y,
            page: self.number,
        });
    }
}

/// Access to the positioned text layer of a PDF.
pub trait TextLayer {
    /// Read at most `max_pages` leading pages from `data`.
    ///
    /// Pages without any text are returned with no fragments rather than
    /// failing; only an unparsable document is an error.
    fn pages(&self, data: &[u8], max_pages: usize) -> Result<Vec<PageText>>;
}
