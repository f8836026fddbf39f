//! # Message Normalization
//!
//! Canonicalizes raw user input before retrieval: trims the message, strips
//! zero-width characters that Thai IMEs and copy-paste tend to smuggle in,
//! and rewrites embedded date tokens to ISO `YYYY-MM-DD` with Buddhist-era
//! years converted to Common era. Nothing in here returns an error; a token
//! that cannot be parsed is simply left as it was.

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Thai month abbreviations in calendar order.
const THAI_MONTHS: [(&str, &str); 12] = [
    ("ม.ค.", "01"),
    ("ก.พ.", "02"),
    ("มี.ค.", "03"),
    ("เม.ย.", "04"),
    ("พ.ค.", "05"),
    ("มิ.ย.", "06"),
    ("ก.ค.", "07"),
    ("ส.ค.", "08"),
    ("ก.ย.", "09"),
    ("ต.ค.", "10"),
    ("พ.ย.", "11"),
    ("ธ.ค.", "12"),
];

/// Converts a Buddhist-era year (2400 to 3000 inclusive) to Common era.
/// Years outside that window pass through untouched.
pub fn normalize_year(year: i32) -> i32 {
    if (2400..=3000).contains(&year) {
        year - 543
    } else {
        year
    }
}

/// Removes zero-width characters (U+200B..U+200D, U+FEFF) and trims.
/// The filter runs first: a BOM is not whitespace, so trimming before
/// stripping it would leave the space that followed it in place.
fn clean_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parses a date-like string into ISO `YYYY-MM-DD`, or `None`.
///
/// Accepts three numeric groups separated by `/`, `-`, `.` or whitespace,
/// with Thai month abbreviations rewritten to month numbers first. The
/// year position is guessed from the first group: a value above 31 cannot
/// be a day, so the token is read year-first; otherwise day-first, which
/// is the common Thai ordering. Two-digit years are taken as 20xx, and
/// Buddhist-era years are shifted by 543. Validity comes from the calendar
/// construction itself, so `31/02/2568` parses to nothing.
pub fn to_iso_date(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    let mut text = clean_text(raw);
    for (abbrev, month) in THAI_MONTHS {
        text = text.replace(abbrev, &format!("/{month}/"));
    }

    let pattern = Regex::new(r"^(\d{1,4})[/\-.\s]+(\d{1,2})[/\-.\s]+(\d{1,4})").ok()?;
    if let Some(caps) = pattern.captures(&text) {
        let v1: i32 = caps[1].parse().ok()?;
        let v2: u32 = caps[2].parse().ok()?;
        let v3: i32 = caps[3].parse().ok()?;

        let (mut year, month, day) = if v1 > 31 {
            (v1, v2, v3 as u32)
        } else {
            (v3, v2, v1 as u32)
        };
        if year < 100 {
            year += 2000;
        }
        year = normalize_year(year);

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    parse_loose_date(&text)
}

/// Last-resort parse for formats the numeric pattern does not cover,
/// applying the same era conversion to whatever year comes out.
fn parse_loose_date(text: &str) -> Option<String> {
    let date = chrono::DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%d %B %Y"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%B %d, %Y"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%d %b %Y"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%b %d, %Y"))
        .ok()?;

    let year = normalize_year(date.year());
    let date = if year == date.year() {
        date
    } else {
        NaiveDate::from_ymd_opt(year, date.month(), date.day())?
    };
    Some(date.format("%Y-%m-%d").to_string())
}

/// Canonicalizes a raw chat message.
///
/// Trims, strips zero-width characters, and rewrites every embedded
/// date-like token (numeric triples and `<day> <Thai month> <year>` forms)
/// to ISO. Tokens that fail to parse stay verbatim.
pub fn normalize(raw: &str) -> String {
    let text = clean_text(raw);

    let numeric = match Regex::new(r"\d{1,4}\s*[/\-.]\s*\d{1,2}\s*[/\-.]\s*\d{1,4}") {
        Ok(re) => re,
        Err(_) => return text,
    };
    let text = numeric
        .replace_all(&text, |caps: &regex::Captures| {
            let token = &caps[0];
            to_iso_date(token).unwrap_or_else(|| token.to_string())
        })
        .into_owned();

    // Whitespace-only triples carry no separator glyph to mark intent, so the
    // year group must be exactly two or four digits and the triple may not
    // chain off a digit or a date that the pass above already rewrote. A bare
    // run like "1 2 3" is not a date.
    let spaced = match Regex::new(r"(^|[^\d/.\-])((?:\d{4}|\d{1,2})\s+\d{1,2}\s+(?:\d{4}|\d{2}))\b")
    {
        Ok(re) => re,
        Err(_) => return text,
    };
    let text = spaced
        .replace_all(&text, |caps: &regex::Captures| {
            let token = &caps[2];
            let rewritten = to_iso_date(token).unwrap_or_else(|| token.to_string());
            format!("{}{rewritten}", &caps[1])
        })
        .into_owned();

    let months = THAI_MONTHS
        .iter()
        .map(|(abbrev, _)| regex::escape(abbrev))
        .collect::<Vec<_>>()
        .join("|");
    let thai = match Regex::new(&format!(r"\d{{1,2}}\s*(?:{months})\s*\d{{2,4}}")) {
        Ok(re) => re,
        Err(_) => return text,
    };
    thai.replace_all(&text, |caps: &regex::Captures| {
        let token = &caps[0];
        to_iso_date(token).unwrap_or_else(|| token.to_string())
    })
    .into_owned()
}
