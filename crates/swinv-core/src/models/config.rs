//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwinvError};

/// Main configuration for the swinv pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// PDF text-layer and line reconstruction configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// PDF text-layer and line reconstruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum number of leading pages to read.
    pub max_pages: usize,

    /// Height of the vertical buckets fragments are grouped into.
    pub line_bucket: f64,

    /// Gap inserted between consecutive pages in the global line ordering.
    pub page_padding: f64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 5,
            line_bucket: 2.0,
            page_padding: 1000.0,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of leading lines searched for the supplier name.
    pub supplier_scan_lines: usize,

    /// Lines below this vertical position belong to the QR-bill slip.
    pub qr_region_max_y: f64,

    /// Unanchored dates before this year are ignored.
    pub min_invoice_year: i32,

    /// VAT rate (percent) assumed when the document states none.
    pub default_vat_rate: Decimal,

    /// Skip IBAN candidates failing the mod-97 check.
    pub validate_iban: bool,

    /// Description of the synthesized position when no item table is found.
    pub fallback_description: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            supplier_scan_lines: 10,
            qr_region_max_y: 200.0,
            min_invoice_year: 2020,
            default_vat_rate: Decimal::new(81, 1),
            validate_iban: false,
            fallback_description: "Leistung gemäss Rechnung".to_string(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    ///
    /// A file that is not valid configuration JSON is a [`SwinvError::Config`].
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SwinvError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SwinvError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.pdf.max_pages, 5);
        assert_eq!(config.pdf.line_bucket, 2.0);
        assert_eq!(config.extraction.default_vat_rate.to_string(), "8.1");
        assert!(!config.extraction.validate_iban);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{"pdf": {"max_pages": 2}}"#).unwrap();
        assert_eq!(config.pdf.max_pages, 2);
        assert_eq!(config.pdf.page_padding, 1000.0);
        assert_eq!(config.extraction.supplier_scan_lines, 10);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"pdf": {"max_pages": "many"}}"#).unwrap();

        let err = ScanConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, SwinvError::Config(_)));
        assert!(err.to_string().starts_with("configuration error: "));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ScanConfig::from_file(std::path::Path::new("/nonexistent/swinv.json")).unwrap_err();
        assert!(matches!(err, SwinvError::Io(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ScanConfig::default();
        config.extraction.validate_iban = true;
        config.save(&path).unwrap();

        let loaded = ScanConfig::from_file(&path).unwrap();
        assert!(loaded.extraction.validate_iban);
        assert_eq!(loaded.extraction.default_vat_rate, config.extraction.default_vat_rate);
    }
}
