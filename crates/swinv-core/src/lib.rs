//! Core library for Swiss supplier-invoice PDF extraction.
//!
//! This crate provides:
//! - PDF text-layer access with positioned glyph runs
//! - Line reconstruction by vertical clustering, page-aware
//! - Heuristic extraction of Swiss invoice fields (UID, dates, CHF amounts,
//!   VAT, IBAN, line items)
//!
//! No OCR is performed: documents without a text layer are rejected.

pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod scanner;

pub use error::{PdfError, Result, SwinvError};
pub use invoice::{ExtractionResult, InvoiceParser, SwissInvoiceParser};
pub use models::config::{ExtractionConfig, PdfConfig, ScanConfig};
pub use models::invoice::{ExtractedInvoiceData, ExtractedPosition, VatRateSource};
pub use pdf::{LineReconstructor, PdfExtractor, TextLayer, TextLine};
pub use scanner::InvoiceScanner;
