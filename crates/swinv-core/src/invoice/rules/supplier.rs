//! Supplier name from the sender block.

use super::patterns::{CONTACT_PREFIX, NUMERIC_LINE};
use crate::pdf::TextLine;

/// First plausible name among the first `scan_lines` lines.
///
/// Swiss invoices print the sender above the recipient, so the first line
/// that is not trivially short, purely numeric or a contact detail is taken.
pub fn supplier_name(lines: &[TextLine], scan_lines: usize) -> Option<String> {
    lines
        .iter()
        .take(scan_lines)
        .map(|line| line.text.trim())
        .find(|text| {
            text.chars().count() > 2 && !NUMERIC_LINE.is_match(text) && !CONTACT_PREFIX.is_match(text)
        })
        .map(str::to_string)
}
