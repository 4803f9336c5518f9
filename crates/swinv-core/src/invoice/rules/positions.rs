//! Line-item table parsing.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use super::amounts::{format_amount, parse_swiss_amount};
use super::patterns::{
    NUMERIC_TOKEN, QUANTITY_UNIT, ROW_AMOUNT, TABLE_END, TABLE_HEADER, TABLE_HEADER_AMOUNT,
};
use crate::models::invoice::ExtractedPosition;
use crate::pdf::TextLine;

const DEFAULT_UNIT: &str = "Stk";
const FALLBACK_UNIT: &str = "Pauschal";
const MAX_RAW_DESCRIPTION: usize = 60;

/// Parse the item table between its header and the first total line.
///
/// Rows that do not end in a positive amount are treated as wrapped
/// description text and produce no position.
pub fn parse_positions(lines: &[TextLine]) -> Vec<ExtractedPosition> {
    let Some(header) = lines.iter().position(|line| is_table_header(&line.text)) else {
        return Vec::new();
    };
    trace!("Item table header: {:?}", lines[header].text);

    lines[header + 1..]
        .iter()
        .map(|line| line.text.trim())
        .take_while(|text| !TABLE_END.is_match(text))
        .filter_map(parse_row)
        .collect()
}

/// A single "Pauschal" position carrying the invoice total.
///
/// Used when no item row could be parsed but the document clearly states a
/// CHF amount.
pub fn fallback_position(
    text: &str,
    gross: Option<Decimal>,
    description: &str,
) -> Option<ExtractedPosition> {
    if !text.contains("CHF") {
        return None;
    }

    gross.map(|total| ExtractedPosition {
        description: description.to_string(),
        quantity: Decimal::ONE,
        unit: FALLBACK_UNIT.to_string(),
        unit_price: total,
        total,
    })
}

fn is_table_header(text: &str) -> bool {
    TABLE_HEADER.is_match(text) && TABLE_HEADER_AMOUNT.is_match(text)
}

fn parse_row(row: &str) -> Option<ExtractedPosition> {
    let caps = ROW_AMOUNT.captures(row)?;
    let total = parse_number(&caps[1]).filter(|t| *t > Decimal::ZERO)?;

    let numbers: Vec<Decimal> = NUMERIC_TOKEN
        .find_iter(row)
        .filter_map(|m| parse_number(m.as_str()))
        .collect();

    let (quantity, unit, unit_price) = if let Some(caps) = QUANTITY_UNIT.captures(row) {
        let quantity = Decimal::from_str(&caps[1]).unwrap_or(Decimal::ONE);
        let unit_price = if numbers.len() >= 3 {
            numbers[numbers.len() - 2]
        } else if quantity.is_zero() {
            total
        } else {
            total / quantity
        };
        (quantity, caps[2].to_string(), unit_price)
    } else if numbers.len() >= 2 {
        (numbers[0], DEFAULT_UNIT.to_string(), numbers[numbers.len() - 2])
    } else {
        (Decimal::ONE, DEFAULT_UNIT.to_string(), total)
    };

    Some(ExtractedPosition {
        description: describe(row),
        quantity,
        unit,
        unit_price: format_amount(unit_price),
        total: format_amount(total),
    })
}

/// Text before the first digit, or the truncated row when that is empty.
fn describe(row: &str) -> String {
    let head = row
        .find(|c: char| c.is_ascii_digit())
        .map(|idx| &row[..idx])
        .unwrap_or(row);

    let description = head.split_whitespace().collect::<Vec<_>>().join(" ");
    if description.is_empty() {
        row.chars().take(MAX_RAW_DESCRIPTION).collect()
    } else {
        description
    }
}

fn parse_number(token: &str) -> Option<Decimal> {
    parse_swiss_amount(token.trim_end_matches(['.', ',']))
}
