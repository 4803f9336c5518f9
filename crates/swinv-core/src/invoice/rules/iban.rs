//! IBAN (International Bank Account Number) extraction and validation.

use super::patterns::IBAN;

/// Extract the first IBAN-shaped token with its spaces removed.
///
/// With `validate` set, candidates failing the mod-97 check are skipped and
/// the next one is tried.
pub fn extract_iban(text: &str, validate: bool) -> Option<String> {
    IBAN.find_iter(text)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .find(|iban| !validate || validate_iban(iban))
}

/// Validate an IBAN using the checksum algorithm.
///
/// Algorithm:
/// 1. Move first 4 characters to the end
/// 2. Replace letters with numbers (A=10, B=11, ..., Z=35)
/// 3. The resulting number mod 97 should equal 1
pub fn validate_iban(iban: &str) -> bool {
    let iban: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if iban.len() < 5 || !iban.is_ascii() {
        return false;
    }

    let (country_code, rest) = iban.split_at(2);
    if !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if !rest[..2].chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let rearranged = format!("{}{}", &iban[4..], &iban[..4]);

    // Fold digit by digit; the full number does not fit in a u64.
    let mut remainder: u32 = 0;
    for c in rearranged.chars() {
        let value = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'A'..='Z' => c as u32 - 'A' as u32 + 10,
            _ => return false,
        };
        let scale = if value >= 10 { 100 } else { 10 };
        remainder = (remainder * scale + value) % 97;
    }

    remainder == 1
}

/// Format IBAN in groups of 4 characters.
pub fn format_iban(iban: &str) -> String {
    let cleaned: Vec<char> = iban.chars().filter(|c| !c.is_whitespace()).collect();

    cleaned
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(" ")
}
