//! Date and amount normalization
//!
//! Turns matched date and money tokens into canonical values: dates become
//! zero-padded `YYYY-MM-DD` strings, amounts become plain numbers.

/// Shape hint for a matched date substring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `Month DD, YYYY`, `Month DD YYYY` or `DD Month YYYY`
    MonthName,

    /// Slash or dash delimited numbers
    Numeric,
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const MIN_YEAR: u32 = 2020;
const MAX_YEAR: u32 = 2050;

/// Normalize a date substring to `YYYY-MM-DD`
///
/// Returns `None` when the substring does not have the given shape or fails
/// range validation (day 1-31, month 1-12, year 2020-2050).
///
/// # Examples
///
/// ```
/// use rfpilot_extractor::{normalize_date, DateShape};
///
/// assert_eq!(
///     normalize_date("November 15, 2025", DateShape::MonthName).as_deref(),
///     Some("2025-11-15")
/// );
/// assert_eq!(
///     normalize_date("15/11/2025", DateShape::Numeric).as_deref(),
///     Some("2025-11-15")
/// );
/// ```
pub fn normalize_date(raw: &str, shape: DateShape) -> Option<String> {
    let (year, month, day) = match shape {
        DateShape::MonthName => split_month_name(raw)?,
        DateShape::Numeric => split_numeric(raw)?,
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }

    Some(format!("{:04}-{:02}-{:02}", year, month, day))
}

/// Look up a full English month name, case-insensitively
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
}

fn split_month_name(raw: &str) -> Option<(u32, u32, u32)> {
    let cleaned = raw.replace(',', " ");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.len() != 3 {
        return None;
    }

    let (month, day) = match month_number(tokens[0]) {
        Some(month) => (month, parse_day(tokens[1])?),
        None => (month_number(tokens[1])?, parse_day(tokens[0])?),
    };
    let year = parse_digits(tokens[2])?;

    Some((year, month, day))
}

fn split_numeric(raw: &str) -> Option<(u32, u32, u32)> {
    let tokens: Vec<&str> = raw.trim().split(['-', '/']).collect();
    if tokens.len() != 3 {
        return None;
    }

    let values = [
        parse_digits(tokens[0])?,
        parse_digits(tokens[1])?,
        parse_digits(tokens[2])?,
    ];

    // Day first whenever the year is written last
    let (year, month, day) = if tokens[2].len() == 4 {
        (values[2], values[1], values[0])
    } else {
        (values[0], values[1], values[2])
    };

    let year = if year < 100 { year + 2000 } else { year };
    Some((year, month, day))
}

fn parse_day(token: &str) -> Option<u32> {
    let digits = token
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .trim();
    parse_digits(digits)
}

fn parse_digits(token: &str) -> Option<u32> {
    if token.is_empty() || token.len() > 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Parse a money amount, ignoring thousands separators
///
/// ```
/// use rfpilot_extractor::parse_amount;
///
/// assert_eq!(parse_amount("200,000"), Some(200_000.0));
/// assert_eq!(parse_amount("1.5"), Some(1.5));
/// assert_eq!(parse_amount("n/a"), None);
/// ```
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Scale factor for a magnitude suffix (`M`/`million`, `B`/`bn`/`billion`)
///
/// Unknown or empty suffixes scale by 1.
pub fn magnitude_multiplier(suffix: &str) -> f64 {
    match suffix.trim().to_lowercase().as_str() {
        "m" | "million" => 1_000_000.0,
        "b" | "bn" | "billion" => 1_000_000_000.0,
        _ => 1.0,
    }
}

/// Map a currency symbol to its ISO code
pub fn currency_from_symbol(symbol: &str) -> Option<&'static str> {
    match symbol {
        "$" => Some("USD"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        "¥" => Some("JPY"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_month_name_forms() {
        for raw in ["November 15, 2025", "November 15 2025", "15 November 2025", "NOVEMBER 15, 2025"] {
            assert_eq!(
                normalize_date(raw, DateShape::MonthName).as_deref(),
                Some("2025-11-15"),
                "{}",
                raw
            );
        }
        assert_eq!(
            normalize_date("March 3rd, 2026", DateShape::MonthName).as_deref(),
            Some("2026-03-03")
        );
    }

    #[test]
    fn test_month_name_rejections() {
        assert_eq!(normalize_date("Nov 15, 2025", DateShape::MonthName), None);
        assert_eq!(normalize_date("November 32, 2025", DateShape::MonthName), None);
        assert_eq!(normalize_date("November 0, 2025", DateShape::MonthName), None);
        assert_eq!(normalize_date("November 15, 2019", DateShape::MonthName), None);
        assert_eq!(normalize_date("November 15, 2051", DateShape::MonthName), None);
        assert_eq!(normalize_date("November 2025", DateShape::MonthName), None);
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(normalize_date("15/11/2025", DateShape::Numeric).as_deref(), Some("2025-11-15"));
        assert_eq!(normalize_date("15-11-2025", DateShape::Numeric).as_deref(), Some("2025-11-15"));
        assert_eq!(normalize_date("2025-11-15", DateShape::Numeric).as_deref(), Some("2025-11-15"));
        assert_eq!(normalize_date("25/11/15", DateShape::Numeric).as_deref(), Some("2025-11-15"));
    }

    #[test]
    fn test_numeric_defaults_to_day_first() {
        // 03/04 is read as 3 April, never March 4
        assert_eq!(normalize_date("03/04/2026", DateShape::Numeric).as_deref(), Some("2026-04-03"));
        assert_eq!(normalize_date("11/15/2025", DateShape::Numeric), None);
    }

    #[test]
    fn test_numeric_rejections() {
        assert_eq!(normalize_date("15/13/2025", DateShape::Numeric), None);
        assert_eq!(normalize_date("15/11/2019", DateShape::Numeric), None);
        assert_eq!(normalize_date("15/11", DateShape::Numeric), None);
        assert_eq!(normalize_date("aa/11/2025", DateShape::Numeric), None);
        // Two-digit year in first position lands outside the accepted range
        assert_eq!(normalize_date("15/11/25", DateShape::Numeric), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,200,000"), Some(1_200_000.0));
        assert_eq!(parse_amount(" 3.2 "), Some(3.2));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("12abc"), None);
    }

    #[test]
    fn test_magnitude_multiplier() {
        assert_eq!(magnitude_multiplier("M"), 1_000_000.0);
        assert_eq!(magnitude_multiplier("million"), 1_000_000.0);
        assert_eq!(magnitude_multiplier("bn"), 1_000_000_000.0);
        assert_eq!(magnitude_multiplier("Billion"), 1_000_000_000.0);
        assert_eq!(magnitude_multiplier(""), 1.0);
        assert_eq!(magnitude_multiplier("k"), 1.0);
    }

    #[test]
    fn test_currency_from_symbol() {
        assert_eq!(currency_from_symbol("$"), Some("USD"));
        assert_eq!(currency_from_symbol("€"), Some("EUR"));
        assert_eq!(currency_from_symbol("£"), Some("GBP"));
        assert_eq!(currency_from_symbol("¥"), Some("JPY"));
        assert_eq!(currency_from_symbol("₹"), None);
    }

    proptest! {
        #[test]
        fn month_name_dates_normalize(
            month in 1u32..=12,
            day in 1u32..=31,
            year in 2020u32..=2050,
            upper in any::<bool>(),
            comma in any::<bool>(),
        ) {
            let name = MONTHS[(month - 1) as usize];
            let name = if upper { name.to_uppercase() } else { name.to_string() };
            let raw = if comma {
                format!("{} {}, {}", name, day, year)
            } else {
                format!("{} {} {}", name, day, year)
            };

            let expected = format!("{:04}-{:02}-{:02}", year, month, day);
            prop_assert_eq!(normalize_date(&raw, DateShape::MonthName), Some(expected));
        }

        #[test]
        fn year_last_numeric_dates_are_day_first(
            month in 1u32..=12,
            day in 1u32..=31,
            year in 2020u32..=2050,
            dash in any::<bool>(),
        ) {
            let sep = if dash { "-" } else { "/" };
            let raw = format!("{:02}{sep}{:02}{sep}{}", day, month, year);

            let expected = format!("{:04}-{:02}-{:02}", year, month, day);
            prop_assert_eq!(normalize_date(&raw, DateShape::Numeric), Some(expected));
        }

        #[test]
        fn two_digit_years_are_offset(month in 1u32..=12, day in 1u32..=31, yy in 20u32..=50) {
            let raw = format!("{:02}/{:02}/{:02}", yy, month, day);

            let expected = format!("{:04}-{:02}-{:02}", yy + 2000, month, day);
            prop_assert_eq!(normalize_date(&raw, DateShape::Numeric), Some(expected));
        }

        #[test]
        fn out_of_range_years_rejected(month in 1u32..=12, day in 1u32..=31, year in 1900u32..2020) {
            let raw = format!("{:02}/{:02}/{}", day, month, year);
            prop_assert_eq!(normalize_date(&raw, DateShape::Numeric), None);
        }
    }
}
