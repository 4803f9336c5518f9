//! Field and table extraction over reconstructed lines.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{ExtractedInvoiceData, ExtractedPosition, VatRateSource};
use crate::pdf::{full_text, TextLine};

use super::rules::{
    anchored_due_date, anchored_invoice_date, derive_net_and_vat, detect_vat_rate,
    external_number, extract_iban, fallback_dates, fallback_position, gross_amount,
    parse_positions, supplier_name, vat_number,
};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub data: ExtractedInvoiceData,
    /// Fields that were left unset or defaulted.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Derive invoice fields from reconstructed lines.
    fn parse(&self, lines: &[TextLine]) -> ExtractionResult;
}

/// Heuristic parser tuned to Swiss supplier invoices.
#[derive(Debug, Clone, Default)]
pub struct SwissInvoiceParser {
    config: ExtractionConfig,
}

impl SwissInvoiceParser {
    /// Create a parser with the given extraction settings.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

/// Field slots filled at most once.
///
/// Rules run in precedence order; a slot set by an earlier rule is never
/// touched again, and a rule whose slot is already set is not evaluated.
#[derive(Debug, Default)]
struct InvoiceDraft {
    external_number: Option<String>,
    supplier_name: Option<String>,
    vat_number: Option<String>,
    invoice_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    gross_amount: Option<Decimal>,
    net_amount: Option<Decimal>,
    vat_amount: Option<Decimal>,
    vat_rate: Option<Decimal>,
    vat_rate_source: Option<VatRateSource>,
    iban: Option<String>,
    positions: Option<Vec<ExtractedPosition>>,
}

/// Run `derive` only if `slot` is empty; returns whether it filled the slot.
fn fill<T>(slot: &mut Option<T>, derive: impl FnOnce() -> Option<T>) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = derive();
    slot.is_some()
}

impl InvoiceDraft {
    fn finish(self, raw_text: String) -> ExtractedInvoiceData {
        ExtractedInvoiceData {
            external_number: self.external_number,
            supplier_name: self.supplier_name,
            vat_number: self.vat_number,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            gross_amount: self.gross_amount,
            net_amount: self.net_amount,
            vat_amount: self.vat_amount,
            vat_rate: self.vat_rate,
            vat_rate_source: self.vat_rate_source,
            iban: self.iban,
            positions: self.positions.unwrap_or_default(),
            raw_text,
        }
    }
}

impl InvoiceParser for SwissInvoiceParser {
    fn parse(&self, lines: &[TextLine]) -> ExtractionResult {
        let start = Instant::now();
        let text = full_text(lines);
        let config = &self.config;

        info!(
            "Parsing invoice from {} lines ({} characters)",
            lines.len(),
            text.len()
        );

        let mut draft = InvoiceDraft::default();

        fill(&mut draft.external_number, || external_number(&text));
        fill(&mut draft.vat_number, || vat_number(&text));
        fill(&mut draft.supplier_name, || {
            supplier_name(lines, config.supplier_scan_lines)
        });

        // Keyword-anchored dates take precedence over the unanchored list.
        fill(&mut draft.invoice_date, || anchored_invoice_date(&text));
        fill(&mut draft.due_date, || anchored_due_date(&text));
        if draft.invoice_date.is_none() {
            let dates = fallback_dates(&text, config.min_invoice_year);
            debug!("Falling back to {} unanchored date(s)", dates.len());
            fill(&mut draft.invoice_date, || dates.first().copied());
            fill(&mut draft.due_date, || dates.last().copied());
        }

        let (rate, source) = detect_vat_rate(&text, config.default_vat_rate);
        debug!("VAT rate {}% ({:?})", rate, source);
        fill(&mut draft.vat_rate, || Some(rate));
        fill(&mut draft.vat_rate_source, || Some(source));

        fill(&mut draft.gross_amount, || {
            gross_amount(lines, config.qr_region_max_y)
        });
        if let (Some(gross), Some(rate)) = (draft.gross_amount, draft.vat_rate) {
            let (net, vat) = derive_net_and_vat(gross, rate);
            fill(&mut draft.net_amount, || Some(net));
            fill(&mut draft.vat_amount, || Some(vat));
        }

        fill(&mut draft.iban, || extract_iban(&text, config.validate_iban));

        let positions = parse_positions(lines);
        debug!("Parsed {} table position(s)", positions.len());
        fill(&mut draft.positions, || Some(positions).filter(|p| !p.is_empty()));
        fill(&mut draft.positions, || {
            fallback_position(&text, draft.gross_amount, &config.fallback_description)
                .map(|p| vec![p])
        });

        let data = draft.finish(text);

        let mut warnings: Vec<String> = data
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();
        if data.vat_rate_source == Some(VatRateSource::Default) {
            warnings.push(format!(
                "No VAT rate found, assumed {}%",
                config.default_vat_rate
            ));
        }
        if data.positions.is_empty() {
            warnings.push("Could not extract positions".to_string());
        }

        debug!(
            "Extracted invoice {:?} from {:?} with {} warning(s)",
            data.external_number,
            data.supplier_name,
            warnings.len()
        );

        ExtractionResult {
            data,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Lines laid out top-down on one A4 page, 14 units apart.
    fn page(texts: &[&str]) -> Vec<TextLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextLine::new(800.0 - i as f64 * 14.0, 1, *t))
            .collect()
    }

    fn parse(lines: &[TextLine]) -> ExtractedInvoiceData {
        SwissInvoiceParser::default().parse(lines).data
    }

    #[test]
    fn test_fill_never_overwrites() {
        let mut slot = Some(1);
        assert!(!fill(&mut slot, || Some(2)));
        assert_eq!(slot, Some(1));

        let mut empty: Option<i32> = None;
        assert!(!fill(&mut empty, || None));
        assert!(fill(&mut empty, || Some(3)));
        assert_eq!(empty, Some(3));
    }

    #[test]
    fn test_parse_full_invoice() {
        let lines = page(&[
            "Muster AG",
            "Musterstrasse 1",
            "8000 Zürich",
            "Tel. 044 123 45 67",
            "CHE-123.456.789 MWST",
            "Rechnungsnummer: RE-2024-017",
            "Rechnungsdatum: 15.03.2024",
            "Zahlbar bis 14.04.2024",
            "Beschreibung Menge Einheit Preis Total",
            "Beratung 4 Std 150.00 600.00",
            "Material 3 Stk 45.00",
            "Total CHF 698.55",
            "inkl. 8.1% MWST",
            "IBAN CH93 0076 2011 6238 5295 7",
        ]);

        let data = parse(&lines);

        assert_eq!(data.supplier_name.as_deref(), Some("Muster AG"));
        assert_eq!(data.vat_number.as_deref(), Some("CHE-123.456.789 MWST"));
        assert_eq!(data.external_number.as_deref(), Some("RE-2024-017"));
        assert_eq!(data.invoice_date, Some(date(2024, 3, 15)));
        assert_eq!(data.due_date, Some(date(2024, 4, 14)));
        assert_eq!(data.gross_amount.unwrap().to_string(), "698.55");
        assert_eq!(data.vat_rate, Some(dec("8.1")));
        assert_eq!(data.vat_rate_source, Some(VatRateSource::Detected));
        assert_eq!(data.net_amount.unwrap().to_string(), "646.21");
        assert_eq!(data.vat_amount.unwrap().to_string(), "52.34");
        assert_eq!(data.iban.as_deref(), Some("CH9300762011623852957"));
        assert_eq!(data.positions.len(), 2);
        assert_eq!(data.positions[0].description, "Beratung");
        assert!(data.raw_text.starts_with("Muster AG\nMusterstrasse 1"));
    }

    #[test]
    fn test_date_fallback_scenario() {
        let lines = page(&["Beispiel GmbH", "15.03.2024", "Lieferung bis 14.04.2024"]);
        let data = parse(&lines);
        assert_eq!(data.invoice_date, Some(date(2024, 3, 15)));
        assert_eq!(data.due_date, Some(date(2024, 4, 14)));
    }

    #[test]
    fn test_anchored_invoice_date_blocks_fallback_due_date() {
        let lines = page(&["Beispiel GmbH", "Datum: 01.02.2024", "Leistung vom 20.03.2024"]);
        let data = parse(&lines);
        assert_eq!(data.invoice_date, Some(date(2024, 2, 1)));
        assert_eq!(data.due_date, None);
    }

    #[test]
    fn test_anchored_due_date_survives_fallback() {
        let lines = page(&["Beispiel GmbH", "10.01.2024 20.02.2024", "Zahlbar bis 31.01.2024"]);
        let data = parse(&lines);
        assert_eq!(data.invoice_date, Some(date(2024, 1, 10)));
        assert_eq!(data.due_date, Some(date(2024, 1, 31)));
    }

    #[test]
    fn test_fallback_position_guarantee() {
        let lines = page(&["Muster AG", "Besten Dank", "Total CHF 150.00"]);
        let data = parse(&lines);

        assert_eq!(data.positions.len(), 1);
        assert_eq!(data.positions[0].total, dec("150.00"));
        assert_eq!(data.positions[0].unit, "Pauschal");
        assert_eq!(data.positions[0].description, "Leistung gemäss Rechnung");
    }

    #[test]
    fn test_zero_vat_invariant() {
        let lines = page(&["Verein Muster", "Keine MwSt", "Total CHF 320.00"]);
        let data = parse(&lines);

        assert_eq!(data.vat_rate, Some(Decimal::ZERO));
        assert_eq!(data.vat_rate_source, Some(VatRateSource::Exempt));
        assert_eq!(data.net_amount, data.gross_amount);
        assert_eq!(data.vat_amount.unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_default_rate_is_flagged() {
        let lines = page(&["Muster AG", "Total CHF 108.10"]);
        let result = SwissInvoiceParser::default().parse(&lines);

        assert_eq!(result.data.vat_rate_source, Some(VatRateSource::Default));
        assert_eq!(result.data.net_amount.unwrap().to_string(), "100.00");
        assert!(result.warnings.iter().any(|w| w.contains("assumed 8.1%")));
    }

    #[test]
    fn test_qr_slip_amount() {
        let mut lines = page(&["Muster AG", "Zahlteil"]);
        lines.push(TextLine::new(150.0, 1, "Währung Betrag"));
        lines.push(TextLine::new(136.0, 1, "CHF 1'234.50"));

        let data = parse(&lines);
        assert_eq!(data.gross_amount.unwrap().to_string(), "1234.50");
    }

    #[test]
    fn test_no_amount_leaves_amounts_and_positions_empty() {
        let lines = page(&["Muster AG", "Lieferschein"]);
        let result = SwissInvoiceParser::default().parse(&lines);

        assert!(result.data.gross_amount.is_none());
        assert!(result.data.net_amount.is_none());
        assert!(result.data.vat_amount.is_none());
        assert!(result.data.positions.is_empty());
        assert!(result.warnings.contains(&"Could not extract grossAmount".to_string()));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let lines = page(&["Muster AG", "Rechnung 123456", "12.05.2024", "Total CHF 99.95"]);
        assert_eq!(parse(&lines), parse(&lines));
    }
}
