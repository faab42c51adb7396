//! Calendar intervals and their date arithmetic

use std::fmt;
use std::ops::BitOr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::error::KeyError;

/// Calendar interval a counter key is bucketed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interval {
    Day,
    Week,
    Month,
}

impl Interval {
    /// All intervals, in tag order
    pub const ALL: [Interval; 3] = [Interval::Day, Interval::Week, Interval::Month];

    /// The key tag for this interval
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Day => "day",
            Interval::Week => "week",
            Interval::Month => "month",
        }
    }

    /// Parse a key tag back into an interval
    pub fn from_tag(tag: &str) -> Option<Interval> {
        match tag {
            "day" => Some(Interval::Day),
            "week" => Some(Interval::Week),
            "month" => Some(Interval::Month),
            _ => None,
        }
    }

    /// Date format of this interval's key segment
    pub fn date_format(&self) -> &'static str {
        match self {
            Interval::Day | Interval::Week => "%Y-%m-%d",
            Interval::Month => "%Y-%m",
        }
    }

    /// Maximum wall-clock window during which new events may still land in
    /// a key of this interval; drives the snapshotter's update/ignore split
    pub fn lifetime(&self) -> Duration {
        match self {
            Interval::Day => Duration::hours(24),
            Interval::Week => Duration::days(7),
            Interval::Month => Duration::days(31),
        }
    }

    /// Format the date segment for an event occurring at `date`.
    ///
    /// Day keys anchor at the event date, week keys at the Sunday on or
    /// before it, month keys at the month.
    pub fn date_label(&self, date: DateTime<Utc>) -> String {
        match self {
            Interval::Day => date.format("%Y-%m-%d").to_string(),
            Interval::Week => {
                let days = date.weekday().num_days_from_sunday();
                let sunday = date - Duration::days(i64::from(days));
                sunday.format("%Y-%m-%d").to_string()
            }
            Interval::Month => date.format("%Y-%m").to_string(),
        }
    }

    /// Parse a date segment into the key's anchor timestamp (midnight UTC;
    /// first of month for month keys)
    pub fn parse_date(&self, s: &str) -> Result<DateTime<Utc>, KeyError> {
        let date = match self {
            Interval::Day | Interval::Week => NaiveDate::parse_from_str(s, "%Y-%m-%d"),
            // NaiveDate needs a day component, so anchor at the first
            Interval::Month => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"),
        }
        .map_err(|_| KeyError::InvalidDate(s.to_string()))?;

        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| KeyError::InvalidDate(s.to_string()))?;
        Ok(midnight.and_utc())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of enabled intervals
///
/// Events fan out to one counter key per member. Defaults to all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSet(u8);

impl IntervalSet {
    /// The empty set
    pub const NONE: IntervalSet = IntervalSet(0);

    /// Day, week, and month
    pub const ALL: IntervalSet = IntervalSet(0b111);

    fn bit(interval: Interval) -> u8 {
        match interval {
            Interval::Day => 0b001,
            Interval::Week => 0b010,
            Interval::Month => 0b100,
        }
    }

    /// Set containing a single interval
    pub fn only(interval: Interval) -> IntervalSet {
        IntervalSet(Self::bit(interval))
    }

    /// Whether `interval` is enabled
    pub fn contains(&self, interval: Interval) -> bool {
        self.0 & Self::bit(interval) != 0
    }

    /// Format the date segment for every enabled interval
    pub fn date_labels(&self, date: DateTime<Utc>) -> Vec<(Interval, String)> {
        Interval::ALL
            .into_iter()
            .filter(|interval| self.contains(*interval))
            .map(|interval| (interval, interval.date_label(date)))
            .collect()
    }
}

impl Default for IntervalSet {
    fn default() -> Self {
        IntervalSet::ALL
    }
}

impl BitOr for IntervalSet {
    type Output = IntervalSet;

    fn bitor(self, rhs: IntervalSet) -> IntervalSet {
        IntervalSet(self.0 | rhs.0)
    }
}

impl From<Interval> for IntervalSet {
    fn from(interval: Interval) -> Self {
        IntervalSet::only(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tag_round_trip() {
        for interval in Interval::ALL {
            assert_eq!(Interval::from_tag(interval.as_str()), Some(interval));
        }
        assert_eq!(Interval::from_tag("foo"), None);
    }

    #[test]
    fn test_date_labels() {
        // 2006-01-09 is a Monday; the week anchors at Sunday the 8th
        let date = Utc.with_ymd_and_hms(2006, 1, 9, 15, 4, 5).unwrap();
        let labels = IntervalSet::ALL.date_labels(date);

        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0], (Interval::Day, "2006-01-09".to_string()));
        assert_eq!(labels[1], (Interval::Week, "2006-01-08".to_string()));
        assert_eq!(labels[2], (Interval::Month, "2006-01".to_string()));
    }

    #[test]
    fn test_week_label_on_sunday() {
        // A Sunday anchors at itself
        let date = Utc.with_ymd_and_hms(2006, 1, 8, 0, 0, 0).unwrap();
        assert_eq!(Interval::Week.date_label(date), "2006-01-08");
    }

    #[test]
    fn test_week_label_crosses_month() {
        // 2018-02-01 is a Thursday; its week started Sunday 2018-01-28
        let date = Utc.with_ymd_and_hms(2018, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(Interval::Week.date_label(date), "2018-01-28");
    }

    #[test]
    fn test_parse_date() {
        let parsed = Interval::Day.parse_date("2017-01-18").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2017, 1, 18, 0, 0, 0).unwrap());

        let parsed = Interval::Month.parse_date("2017-12").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2017, 12, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_wrong_format() {
        assert_eq!(
            Interval::Month.parse_date("2017"),
            Err(KeyError::InvalidDate("2017".to_string()))
        );
        assert_eq!(
            Interval::Day.parse_date("2017-01"),
            Err(KeyError::InvalidDate("2017-01".to_string()))
        );
    }

    #[test]
    fn test_interval_set() {
        let set = IntervalSet::only(Interval::Day) | IntervalSet::only(Interval::Month);
        assert!(set.contains(Interval::Day));
        assert!(!set.contains(Interval::Week));
        assert!(set.contains(Interval::Month));

        let date = Utc.with_ymd_and_hms(2018, 1, 27, 0, 0, 0).unwrap();
        let labels = set.date_labels(date);
        assert_eq!(labels.len(), 2);
    }
}
