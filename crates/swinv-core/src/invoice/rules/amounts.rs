//! CHF amount parsing and gross-amount detection.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::trace;

use super::first_capture;
use super::patterns::{CHF_AMOUNT, GROSS_TOTAL};
use crate::pdf::TextLine;

/// Parse a Swiss-formatted amount (e.g. "1'234.50", "1234,50", "150").
///
/// Apostrophes are thousands separators, a comma is read as the decimal
/// point. Anything that does not then parse as a number yields `None`.
pub fn parse_swiss_amount(s: &str) -> Option<Decimal> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| *c != '\'' && *c != '’')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    Decimal::from_str(&normalized).ok()
}

/// Round to exactly two fraction digits, halves away from zero.
pub fn format_amount(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Find the invoice total.
///
/// A labelled "Total/Gesamtbetrag/Rechnungsbetrag CHF x" wins; otherwise the
/// first "CHF x" on a line inside the QR-bill region (below `qr_region_max_y`)
/// is used. Unparsable or non-positive candidates are skipped.
pub fn gross_amount(lines: &[TextLine], qr_region_max_y: f64) -> Option<Decimal> {
    let labelled = lines
        .iter()
        .filter_map(|line| first_capture(&line.text, &[&GROSS_TOTAL]))
        .find_map(|token| positive_amount(&token));

    if let Some(amount) = labelled {
        trace!("Gross amount from total label: {}", amount);
        return Some(amount);
    }

    let slip = lines
        .iter()
        .filter(|line| line.y < qr_region_max_y)
        .flat_map(|line| CHF_AMOUNT.captures_iter(&line.text))
        .find_map(|caps| positive_amount(&caps[1]));

    if let Some(amount) = slip {
        trace!("Gross amount from payment slip: {}", amount);
    }
    slip
}

fn positive_amount(token: &str) -> Option<Decimal> {
    parse_swiss_amount(token)
        .filter(|a| *a > Decimal::ZERO)
        .map(format_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_swiss_amount() {
        assert_eq!(parse_swiss_amount("1'234.50"), Some(dec("1234.50")));
        assert_eq!(parse_swiss_amount("1’234.50"), Some(dec("1234.50")));
        assert_eq!(parse_swiss_amount("1234,50"), Some(dec("1234.50")));
        assert_eq!(parse_swiss_amount("150"), Some(dec("150")));
        assert_eq!(parse_swiss_amount("1.234,50"), None);
        assert_eq!(parse_swiss_amount("abc"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("150")).to_string(), "150.00");
        assert_eq!(format_amount(dec("10.005")).to_string(), "10.01");
        assert_eq!(format_amount(dec("99.994")).to_string(), "99.99");
    }

    #[test]
    fn test_labelled_total_wins_over_slip() {
        let lines = vec![
            TextLine::new(400.0, 1, "Total CHF 1'080.50"),
            TextLine::new(120.0, 1, "CHF 999.00"),
        ];
        assert_eq!(gross_amount(&lines, 200.0).unwrap().to_string(), "1080.50");
    }

    #[test]
    fn test_alternative_labels() {
        let lines = vec![TextLine::new(400.0, 1, "Rechnungsbetrag: CHF 75,5")];
        assert_eq!(gross_amount(&lines, 200.0).unwrap().to_string(), "75.50");

        let lines = vec![TextLine::new(400.0, 1, "Gesamtbetrag CHF 12")];
        assert_eq!(gross_amount(&lines, 200.0).unwrap().to_string(), "12.00");
    }

    #[test]
    fn test_payment_slip_fallback_only_below_region() {
        let lines = vec![
            TextLine::new(500.0, 1, "Anzahlung CHF 50.00"),
            TextLine::new(150.0, 1, "Währung Betrag"),
            TextLine::new(140.0, 1, "CHF 1'234.55"),
        ];
        assert_eq!(gross_amount(&lines, 200.0).unwrap().to_string(), "1234.55");

        let lines = vec![TextLine::new(500.0, 1, "Anzahlung CHF 50.00")];
        assert_eq!(gross_amount(&lines, 200.0), None);
    }

    #[test]
    fn test_subtotal_is_not_a_total() {
        let lines = vec![TextLine::new(400.0, 1, "Subtotal CHF 100.00")];
        assert_eq!(gross_amount(&lines, 200.0), None);
    }
}
