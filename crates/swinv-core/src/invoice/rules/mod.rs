//! Rule-based field extractors for Swiss supplier invoices.
//!
//! Each rule is a pure function returning `None` when nothing matched.

pub mod amounts;
pub mod dates;
pub mod iban;
pub mod number;
pub mod patterns;
pub mod positions;
pub mod supplier;
pub mod uid;
pub mod vat;

pub use amounts::{format_amount, gross_amount, parse_swiss_amount};
pub use dates::{anchored_due_date, anchored_invoice_date, fallback_dates, parse_date};
pub use iban::{extract_iban, format_iban, validate_iban};
pub use number::external_number;
pub use positions::{fallback_position, parse_positions};
pub use supplier::supplier_name;
pub use uid::vat_number;
pub use vat::{derive_net_and_vat, detect_vat_rate};

use regex::Regex;

/// First capture group of the first pattern that matches, in order.
pub fn first_capture(text: &str, patterns: &[&Regex]) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_capture_respects_order() {
        let a = Regex::new(r"A(\d)").unwrap();
        let b = Regex::new(r"B(\d)").unwrap();

        assert_eq!(first_capture("B2 A1", &[&a, &b]), Some("1".to_string()));
        assert_eq!(first_capture("B2 A1", &[&b, &a]), Some("2".to_string()));
        assert_eq!(first_capture("C3", &[&a, &b]), None);
    }
}
