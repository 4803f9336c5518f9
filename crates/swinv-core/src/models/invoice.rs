//! Extracted supplier-invoice data.
//!
//! Every field is optional: extraction is heuristic and partial results are
//! the common case. Callers should treat each value as a suggestion that a
//! human confirms before it reaches the books.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured fields recovered from one supplier invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInvoiceData {
    /// Supplier's own invoice number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_number: Option<String>,

    /// Supplier name, taken from the sender block at the top of the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,

    /// Swiss UID in canonical `CHE-nnn.nnn.nnn MWST` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,

    /// Invoice date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Payment due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Total payable including VAT, CHF, 2 decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<Decimal>,

    /// Amount excluding VAT, derived from gross and rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_amount: Option<Decimal>,

    /// VAT amount, `gross - net`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<Decimal>,

    /// VAT rate in percent, e.g. `8.1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<Decimal>,

    /// Where the VAT rate came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate_source: Option<VatRateSource>,

    /// IBAN without spaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,

    /// Line items in document order.
    #[serde(default)]
    pub positions: Vec<ExtractedPosition>,

    /// The reconstructed document text.
    #[serde(default)]
    pub raw_text: String,
}

/// A single line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPosition {
    /// Item description.
    pub description: String,

    /// Quantity.
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,

    /// Unit of measure (Stk, Std, Pauschal, ...).
    pub unit: String,

    /// Price per unit.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Row total.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Origin of the VAT rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatRateSource {
    /// A rate printed next to a MwSt/VAT label.
    Detected,
    /// An explicit "no VAT" marker.
    Exempt,
    /// Nothing found; the configured default rate was assumed.
    Default,
}

impl ExtractedInvoiceData {
    /// Names of the scalar fields left unset.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.external_number.is_none() {
            missing.push("externalNumber");
        }
        if self.supplier_name.is_none() {
            missing.push("supplierName");
        }
        if self.vat_number.is_none() {
            missing.push("vatNumber");
        }
        if self.invoice_date.is_none() {
            missing.push("invoiceDate");
        }
        if self.due_date.is_none() {
            missing.push("dueDate");
        }
        if self.gross_amount.is_none() {
            missing.push("grossAmount");
        }
        if self.iban.is_none() {
            missing.push("iban");
        }
        missing
    }
}
