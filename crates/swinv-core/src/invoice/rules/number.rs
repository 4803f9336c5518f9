//! Supplier invoice number.

use super::first_capture;
use super::patterns::{
    NUMBER_INVOICE, NUMBER_NR, NUMBER_RECHNUNGSNUMMER, NUMBER_RECHNUNG_DIGITS, NUMBER_RG_NR,
};

/// Extract the supplier's own invoice number; the first matching label wins.
pub fn external_number(text: &str) -> Option<String> {
    first_capture(
        text,
        &[
            &NUMBER_RECHNUNG_DIGITS,
            &NUMBER_RECHNUNGSNUMMER,
            &NUMBER_RG_NR,
            &NUMBER_INVOICE,
            &NUMBER_NR,
        ],
    )
    .map(|token| token.trim_end_matches('.').to_string())
    .filter(|token| token.len() >= 3)
}
