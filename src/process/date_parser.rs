use chrono::NaiveDate;

use crate::error::{HolidayError, Result};

/// Layouts accepted from the upstream feed, most specific first.
///
/// chrono accepts one or two digits for `%m`/`%d` when parsing, so the
/// padded and unpadded slash forms are covered by the first two entries.
/// The last entry matches dates exported with a midnight time suffix.
pub const EXTRACT_LAYOUTS: &[&str] = &["%Y/%-m/%-d", "%Y/%m/%d", "%Y-%m-%d", "%Y/%-m/%-d 0:00:00"];

/// Layouts accepted from the durable artifact: the canonical form plus the
/// slash form for hand-edited files.
pub const LOAD_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y/%-m/%-d"];

/// Canonical key format.
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Try each layout in order and return the first successful parse.
pub fn parse_date(text: &str, layouts: &[&str]) -> Result<NaiveDate> {
    let text = text.trim();
    layouts
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
        .ok_or_else(|| HolidayError::DateParse {
            input: text.to_string(),
        })
}

/// `YYYY-MM-DD`
pub fn to_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_upstream_forms() {
        assert_eq!(parse_date("2026/1/1", EXTRACT_LAYOUTS).unwrap(), ymd(2026, 1, 1));
        assert_eq!(parse_date("2026/01/12", EXTRACT_LAYOUTS).unwrap(), ymd(2026, 1, 12));
        assert_eq!(parse_date("2026-02-11", EXTRACT_LAYOUTS).unwrap(), ymd(2026, 2, 11));
        assert_eq!(
            parse_date("2026/3/20 0:00:00", EXTRACT_LAYOUTS).unwrap(),
            ymd(2026, 3, 20)
        );
    }

    #[test]
    fn rejects_headers_and_impossible_dates() {
        assert!(matches!(
            parse_date("国民の祝日・休日月日", EXTRACT_LAYOUTS),
            Err(HolidayError::DateParse { .. })
        ));
        assert!(parse_date("2026/2/30", EXTRACT_LAYOUTS).is_err());
        assert!(parse_date("", EXTRACT_LAYOUTS).is_err());
    }

    #[test]
    fn time_suffix_needs_its_own_layout() {
        assert!(parse_date("2026/5/3 0:00:00", &[]).is_err());
        assert!(parse_date("2026/5/3 0:00:00", LOAD_LAYOUTS).is_err());
    }

    #[test]
    fn load_layouts_accept_canonical_and_legacy_slash() {
        assert_eq!(parse_date("2026-05-04", LOAD_LAYOUTS).unwrap(), ymd(2026, 5, 4));
        assert_eq!(parse_date("2026/05/04", LOAD_LAYOUTS).unwrap(), ymd(2026, 5, 4));
        assert_eq!(parse_date("2026/5/4", LOAD_LAYOUTS).unwrap(), ymd(2026, 5, 4));
    }

    #[test]
    fn iso_is_zero_padded() {
        assert_eq!(to_iso(ymd(2026, 1, 1)), "2026-01-01");
    }
}
