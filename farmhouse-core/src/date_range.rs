//! Date range for filtering remote listings.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Date range for filtering scheduling objects.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// A trailing window: everything from `days` ago onward.
    pub fn trailing(days: i64) -> Self {
        DateRange {
            from: Some(Utc::now() - Duration::days(days)),
            to: None,
        }
    }

    /// `from` as a CalDAV time-range stamp, using a very old date if unbounded.
    pub fn start_stamp(&self) -> String {
        stamp(self.from.unwrap_or_else(|| Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()))
    }

    /// `to` as a CalDAV time-range stamp, using a far future date if unbounded.
    pub fn end_stamp(&self) -> String {
        stamp(self.to.unwrap_or_else(|| Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap()))
    }
}

/// Format as the CalDAV time-range form: `YYYYMMDDTHHMMSSZ`.
fn stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_ends_use_sentinel_stamps() {
        let range = DateRange { from: None, to: None };
        assert_eq!(range.start_stamp(), "19700101T000000Z");
        assert_eq!(range.end_stamp(), "21000101T000000Z");
    }

    #[test]
    fn test_trailing_window_is_open_ended() {
        let range = DateRange::trailing(90);
        assert!(range.from.is_some());
        assert!(range.to.is_none());
    }
}
