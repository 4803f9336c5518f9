//! Common regex patterns for Swiss invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number, in precedence order
    pub static ref NUMBER_RECHNUNG_DIGITS: Regex = Regex::new(
        r"(?i)\bRechnung\s+(\d{4,12})\b"
    ).unwrap();

    pub static ref NUMBER_RECHNUNGSNUMMER: Regex = Regex::new(
        r"(?i)\bRechnung(?:snummer)?\s*[:#]+\s*([A-Za-z0-9][A-Za-z0-9\-/_.]{2,29})"
    ).unwrap();

    pub static ref NUMBER_RG_NR: Regex = Regex::new(
        r"(?i)\bRg\.?\s*-?\s*Nr\.?[:\s]+([A-Za-z0-9][A-Za-z0-9\-/_.]{2,29})"
    ).unwrap();

    pub static ref NUMBER_INVOICE: Regex = Regex::new(
        r"(?i)\bInvoice\s*[:#]+\s*([A-Za-z0-9][A-Za-z0-9\-/_.]{2,29})"
    ).unwrap();

    pub static ref NUMBER_NR: Regex = Regex::new(
        r"(?i)\bNr\.?[:\s]+([A-Za-z0-9][A-Za-z0-9\-/_.]{2,29})"
    ).unwrap();

    // Swiss UID (CHE-123.456.789 MWST)
    pub static ref UID: Regex = Regex::new(
        r"\bCHE[- ]?(\d{3})[. ]?(\d{3})[. ]?(\d{3})\b"
    ).unwrap();

    // Dates (DD.MM.YYYY, DD/MM/YY, DD-MM-YYYY)
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref INVOICE_DATE: Regex = Regex::new(
        r"(?i)(?:RG-Datum|Rechnungsdatum|\bDatum)\s*:?\s*(\d{1,2}[./\-]\d{1,2}[./\-](?:\d{4}|\d{2}))\b"
    ).unwrap();

    pub static ref DUE_DATE: Regex = Regex::new(
        r"(?i)(?:Zahlbar\s+bis|F[äa]llig(?:keitsdatum)?|\bDue(?:\s*Date)?)\s*:?\s*(\d{1,2}[./\-]\d{1,2}[./\-](?:\d{4}|\d{2}))\b"
    ).unwrap();

    // VAT
    pub static ref VAT_EXEMPT: Regex = Regex::new(
        r"(?im)keine\s+MwSt|MwSt\.?[-\s]?befreit|\bno\s+VAT\b|\bVAT[-\s]?exempt|(?:^|[^\d.,])0(?:[.,]0+)?\s*%\s*(?:MwSt|VAT)"
    ).unwrap();

    pub static ref VAT_RATE: Regex = Regex::new(
        r"(?i)(\d+[.,]\d+)\s*%\s*(?:MwSt|VAT)"
    ).unwrap();

    pub static ref VAT_RATE_REVERSED: Regex = Regex::new(
        r"(?i)(?:MwSt|VAT)\.?\s*:?\s*(\d+[.,]\d+)\s*%"
    ).unwrap();

    // Amounts (1'234.50, 1234,50, 150)
    pub static ref GROSS_TOTAL: Regex = Regex::new(
        r"(?i)\b(?:Total|Gesamtbetrag|Rechnungsbetrag)\s*:?\s*CHF\s*(\d[\d'’]*(?:[.,]\d{1,2})?)"
    ).unwrap();

    pub static ref CHF_AMOUNT: Regex = Regex::new(
        r"\bCHF\s*(\d[\d'’]*(?:[.,]\d{1,2})?)"
    ).unwrap();

    // IBAN
    pub static ref IBAN: Regex = Regex::new(
        r"\b[A-Z]{2}\d{2}[\d ]{10,34}"
    ).unwrap();

    // Item table
    pub static ref TABLE_HEADER: Regex = Regex::new(
        r"(?i)Position|Anzahl|Einheit|Preis|Menge|Beschreibung"
    ).unwrap();

    pub static ref TABLE_HEADER_AMOUNT: Regex = Regex::new(
        r"(?i)Total|Preis"
    ).unwrap();

    pub static ref TABLE_END: Regex = Regex::new(
        r"(?i)^\s*(?:Total|Gesamt|Zwischensumme)"
    ).unwrap();

    pub static ref ROW_AMOUNT: Regex = Regex::new(
        r"(\d[\d'.,]+)\s*$"
    ).unwrap();

    pub static ref QUANTITY_UNIT: Regex = Regex::new(
        r"(?i)\b(\d+)\s+(Stk|Stück|Std|Stunden|Tage|Tag|Mt|Monate|Monat|Pauschal|Psch|kg|m2|m|L)\b"
    ).unwrap();

    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"\d[\d'.,]*"
    ).unwrap();

    // Supplier block
    pub static ref CONTACT_PREFIX: Regex = Regex::new(
        r"(?i)^(?:Tel|Fax|www|http|info|mail|@)"
    ).unwrap();

    pub static ref NUMERIC_LINE: Regex = Regex::new(
        r"^[\d\s.,'’/\-+]+$"
    ).unwrap();
}
