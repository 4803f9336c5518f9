//! Swiss UID / VAT registration number.

use super::patterns::UID;

/// Extract the first `CHE` number, normalized to `CHE-nnn.nnn.nnn MWST`.
pub fn vat_number(text: &str) -> Option<String> {
    UID.captures(text)
        .map(|caps| format!("CHE-{}.{}.{} MWST", &caps[1], &caps[2], &caps[3]))
}
