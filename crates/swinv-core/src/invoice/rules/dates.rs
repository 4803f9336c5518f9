//! Date extraction for Swiss invoices (DD.MM.YYYY and friends).

use chrono::{Datelike, NaiveDate};

use super::first_capture;
use super::patterns::{DATE_DMY, DUE_DATE, INVOICE_DATE};

/// Parse a single `D.M.Y` date; two-digit years are read as 20yy.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let caps = DATE_DMY.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year = parse_year(&caps[3])?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Date following "RG-Datum", "Rechnungsdatum" or a bare "Datum".
pub fn anchored_invoice_date(text: &str) -> Option<NaiveDate> {
    first_capture(text, &[&INVOICE_DATE]).and_then(|s| parse_date(&s))
}

/// Date following "Zahlbar bis", "Fällig(keitsdatum)" or "Due (Date)".
pub fn anchored_due_date(text: &str) -> Option<NaiveDate> {
    first_capture(text, &[&DUE_DATE]).and_then(|s| parse_date(&s))
}

/// Every valid date in `text` from `min_year` on, sorted ascending.
pub fn fallback_dates(text: &str, min_year: i32) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = DATE_DMY
        .find_iter(text)
        .filter_map(|m| parse_date(m.as_str()))
        .filter(|d| d.year() >= min_year)
        .collect();

    dates.sort();
    dates
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if year < 100 { Some(2000 + year) } else { Some(year) }
}
