//! Article date parsing.

use chrono::NaiveDate;

/// Expected article date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date; anything else is the earliest representable
/// date so it sorts before every real one.
pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_valid() {
        assert_eq!(parse_date("2024-06-15"), NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(parse_date(" 2024-01-01 "), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_parse_date_invalid_is_min() {
        assert_eq!(parse_date("yesterday"), NaiveDate::MIN);
        assert_eq!(parse_date("2024-13-01"), NaiveDate::MIN);
        assert_eq!(parse_date(""), NaiveDate::MIN);
    }

    #[test]
    fn test_invalid_sorts_first() {
        assert!(parse_date("nope") < parse_date("0001-01-01"));
    }
}
