//! Date parsing, formatting and window checks
//!
//! Collections describe their observation dates in several shapes: full
//! dates, year-month pairs, bare years, and datetimes coming back from a
//! feature service. Everything is reduced to a [`NaiveDate`] and rendered
//! again through the collection's strftime pattern.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveTime};

use crate::error::{Result, WltsError};

/// Parse a loosely formatted date string.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM` and `YYYY` (with `/` or `-` separators).
/// A time part (`T...`) or a trailing `Z` is ignored.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let normalized = value.trim().replace('/', "-");
    let normalized = normalized.trim_end_matches('Z');
    let date_part = normalized.split(['T', ' ']).next().unwrap_or_default();

    let candidates = [
        date_part.to_string(),
        format!("{}-01", date_part),
        format!("{}-01-01", date_part),
    ];

    candidates
        .iter()
        .find_map(|candidate| NaiveDate::parse_from_str(candidate, "%Y-%m-%d").ok())
        .ok_or_else(|| WltsError::InvalidDate {
            value: value.to_string(),
            reason: "expected YYYY-MM-DD, YYYY-MM or YYYY".to_string(),
        })
}

/// Check that a strftime pattern only contains recognised specifiers and
/// can render a calendar date
pub fn validate_format(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(WltsError::config_invalid("string_format", "format must not be empty"));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(WltsError::config_invalid(
            "string_format",
            format!("invalid strftime pattern '{}'", pattern),
        ));
    }
    // Offset specifiers (%z, %:z) have nothing to render from
    format_date(NaiveDate::default(), pattern)?;
    Ok(())
}

/// Render a date with a strftime pattern; time fields render as midnight
pub fn format_date(date: NaiveDate, pattern: &str) -> Result<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", date.and_time(NaiveTime::MIN).format(pattern)).map_err(|_| {
        WltsError::config_invalid("string_format", format!("cannot render with '{}'", pattern))
    })?;
    Ok(rendered)
}

/// Truncate a date to the granularity expressed by a pattern.
///
/// `2016-10-07` with `%Y` becomes `2016-01-01`. Patterns whose output cannot
/// be read back leave the date untouched.
pub fn truncate_to_format(date: NaiveDate, pattern: &str) -> NaiveDate {
    format_date(date, pattern).ok().and_then(|s| parse_date(&s).ok()).unwrap_or(date)
}

/// Optional, inclusive date bounds of a trajectory request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// Containment evaluated at the granularity of a strftime pattern
    pub fn contains_at_granularity(&self, date: NaiveDate, pattern: &str) -> bool {
        let date = truncate_to_format(date, pattern);
        let window = DateWindow {
            start: self.start.map(|d| truncate_to_format(d, pattern)),
            end: self.end.map(|d| truncate_to_format(d, pattern)),
        };
        window.contains(date)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_shapes() {
        assert_eq!(parse_date("2016-10-07").unwrap(), ymd(2016, 10, 7));
        assert_eq!(parse_date("2016/10/07").unwrap(), ymd(2016, 10, 7));
        assert_eq!(parse_date("2016-10").unwrap(), ymd(2016, 10, 1));
        assert_eq!(parse_date("2016").unwrap(), ymd(2016, 1, 1));
        assert_eq!(parse_date("2016-10-07Z").unwrap(), ymd(2016, 10, 7));
        assert_eq!(parse_date("2016-10-07T03:00:00Z").unwrap(), ymd(2016, 10, 7));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("").is_err());
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2016-13-01").is_err());
    }

    #[test]
    fn test_format_date() {
        let date = ymd(2019, 1, 1);
        assert_eq!(format_date(date, "%Y-%m-%d").unwrap(), "2019-01-01");
        assert_eq!(format_date(date, "%Y").unwrap(), "2019");
    }

    #[test]
    fn test_format_date_with_time_fields() {
        let pattern = "%Y-%m-%dT%H:%M:%S";
        assert!(validate_format(pattern).is_ok());
        assert_eq!(format_date(ymd(2019, 1, 1), pattern).unwrap(), "2019-01-01T00:00:00");
        // Rendered datetimes read back to the same day
        assert!(DateWindow::new(Some(ymd(2019, 1, 1)), Some(ymd(2019, 1, 1)))
            .contains_at_granularity(ymd(2019, 1, 1), pattern));
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("%Y-%m-%d").is_ok());
        assert!(validate_format("%Y").is_ok());
        assert!(validate_format("").is_err());
        assert!(validate_format("%Q").is_err());
        assert!(validate_format("%Y-%m-%d%z").is_err());
    }

    #[test]
    fn test_window_granularity() {
        let window = DateWindow::new(Some(ymd(2016, 10, 7)), None);
        // A yearly observation labelled 2016 is kept for a start inside 2016
        assert!(window.contains_at_granularity(ymd(2016, 1, 1), "%Y"));
        assert!(!window.contains_at_granularity(ymd(2015, 1, 1), "%Y"));
        // At day granularity the same observation falls outside
        assert!(!window.contains_at_granularity(ymd(2016, 1, 1), "%Y-%m-%d"));
    }

    proptest! {
        #[test]
        fn prop_window_bounds_are_inclusive(offset in 0i64..3650) {
            let start = ymd(2000, 1, 1) + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(30);
            let window = DateWindow::new(Some(start), Some(end));
            prop_assert!(window.contains(start));
            prop_assert!(window.contains(end));
            prop_assert!(!window.contains(start - chrono::Duration::days(1)));
            prop_assert!(!window.contains(end + chrono::Duration::days(1)));
        }
    }
}
