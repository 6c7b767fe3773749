//! Tolerant parsing of dates, odometer readings, and monetary amounts as
//! they appear in extracted document fields

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"];

/// Parse a date in any of the supported document formats
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    // Timestamps like "2026-06-15T10:30:00Z" carry the date up front
    if trimmed.len() > 10 && trimmed.is_char_boundary(10) {
        return NaiveDate::parse_from_str(&trimmed[..10], "%Y-%m-%d").ok();
    }
    None
}

/// Parse an odometer reading, accepting thousands separators and unit
/// suffixes ("74.359 km", "74,359", "74359km")
pub fn parse_odometer(text: &str) -> Option<u64> {
    let mut s = text.trim().to_lowercase();
    for unit in ["kilometers", "miles", "km", "mi"] {
        if let Some(stripped) = s.strip_suffix(unit) {
            s = stripped.trim().to_string();
            break;
        }
    }

    let digits: String = s
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | ' ' | '\u{a0}' | '\''))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse a monetary amount, accepting currency markers and both decimal
/// conventions ("1.234,56", "1,234.56", "€ 150,00")
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | ' ' | '\u{a0}'))
        .collect();
    let cleaned = cleaned
        .to_lowercase()
        .trim_end_matches("eur")
        .trim_end_matches("usd")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return None;
    }

    let has_dot = cleaned.contains('.');
    let has_comma = cleaned.contains(',');

    let normalized = if has_dot && has_comma {
        // The later separator is the decimal mark
        if cleaned.rfind('.') > cleaned.rfind(',') {
            cleaned.replace(',', "")
        } else {
            cleaned.replace('.', "").replace(',', ".")
        }
    } else if has_comma {
        // A lone comma followed by exactly two digits is a decimal mark
        let after = cleaned.rsplit(',').next().unwrap_or("");
        if cleaned.matches(',').count() == 1 && after.len() == 2 {
            cleaned.replace(',', ".")
        } else {
            cleaned.replace(',', "")
        }
    } else {
        cleaned
    };

    normalized.parse().ok().filter(|v: &f64| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(parse_date("2026-06-15"), Some(expected));
        assert_eq!(parse_date("15.06.2026"), Some(expected));
        assert_eq!(parse_date("15/06/2026"), Some(expected));
        assert_eq!(parse_date(" 2026-06-15 "), Some(expected));
        assert_eq!(parse_date("2026-06-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_date("June 15th"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_odometer_variants() {
        assert_eq!(parse_odometer("74359"), Some(74359));
        assert_eq!(parse_odometer("74.359 km"), Some(74359));
        assert_eq!(parse_odometer("74,359"), Some(74359));
        assert_eq!(parse_odometer("74359km"), Some(74359));
        assert_eq!(parse_odometer("150 000 km"), Some(150_000));
        assert_eq!(parse_odometer("unknown"), None);
        assert_eq!(parse_odometer(""), None);
    }

    #[test]
    fn test_parse_amount_conventions() {
        assert_eq!(parse_amount("250"), Some(250.0));
        assert_eq!(parse_amount("1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("€ 150,00"), Some(150.0));
        assert_eq!(parse_amount("500 EUR"), Some(500.0));
        assert_eq!(parse_amount("1,234"), Some(1234.0));
        assert_eq!(parse_amount("n/a"), None);
    }
}
