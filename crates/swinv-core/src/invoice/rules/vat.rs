//! VAT rate detection and net/VAT derivation.

use rust_decimal::Decimal;

use super::amounts::{format_amount, parse_swiss_amount};
use super::first_capture;
use super::patterns::{VAT_EXEMPT, VAT_RATE, VAT_RATE_REVERSED};
use crate::models::invoice::VatRateSource;

/// Determine the VAT rate in percent.
///
/// An explicit "no VAT" marker yields zero; a rate printed next to a
/// MwSt/VAT label is taken as is; otherwise `default_rate` is assumed.
pub fn detect_vat_rate(text: &str, default_rate: Decimal) -> (Decimal, VatRateSource) {
    if VAT_EXEMPT.is_match(text) {
        return (Decimal::ZERO, VatRateSource::Exempt);
    }

    first_capture(text, &[&VAT_RATE, &VAT_RATE_REVERSED])
        .and_then(|rate| parse_swiss_amount(&rate))
        .map(|rate| (rate.normalize(), VatRateSource::Detected))
        .unwrap_or((default_rate, VatRateSource::Default))
}

/// Split a gross amount into `(net, vat)`, both with two decimals.
///
/// `net = gross / (1 + rate/100)` and `vat = gross - net`, so the two always
/// add back up to the gross amount. A zero rate gives `(gross, 0.00)`.
pub fn derive_net_and_vat(gross: Decimal, rate: Decimal) -> (Decimal, Decimal) {
    let gross = format_amount(gross);
    if rate.is_zero() {
        return (gross, format_amount(Decimal::ZERO));
    }

    let divisor = Decimal::ONE + rate / Decimal::ONE_HUNDRED;
    if divisor.is_zero() {
        return (gross, format_amount(Decimal::ZERO));
    }

    let net = format_amount(gross / divisor);
    let vat = format_amount(gross - net);
    (net, vat)
}
