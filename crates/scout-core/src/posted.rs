use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Age assumed for postings that only say "recently".
const RECENTLY_AGE_DAYS: i64 = 3;

/// When a job was posted, normalised to something sortable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostedDate {
    /// Absolute calendar date.
    Date(NaiveDate),
    /// Relative age in days; 0 is today.
    DaysAgo(u32),
    /// The source gave no usable date.
    Recently,
}

impl PostedDate {
    /// Normalise free-form posting text from a job board.
    ///
    /// Understands ISO dates, "today", "just posted", "N hours ago",
    /// "yesterday", "N days ago", "N weeks ago" and "N months ago"
    /// (capped at 30 days).
    pub fn parse_relative(text: &str) -> Self {
        let text = text.trim().to_lowercase();
        if let Some(date) = parse_iso_date(&text) {
            return PostedDate::Date(date);
        }

        let number = first_number(&text);
        if text.contains("today") || text.contains("just posted") || text.contains("hour") {
            PostedDate::DaysAgo(0)
        } else if text.contains("yesterday") {
            PostedDate::DaysAgo(1)
        } else if text.contains("month") {
            PostedDate::DaysAgo(30)
        } else if text.contains("week") {
            number.map_or(PostedDate::Recently, |n| PostedDate::DaysAgo(n.saturating_mul(7)))
        } else if text.contains("day") {
            number.map_or(PostedDate::Recently, PostedDate::DaysAgo)
        } else {
            PostedDate::Recently
        }
    }

    /// Convert an absolute timestamp into a posting date.
    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        PostedDate::Date(ts.date_naive())
    }

    /// Days between the posting and `today`; smaller is more recent.
    pub fn age_days(&self, today: NaiveDate) -> i64 {
        match self {
            PostedDate::Date(date) => (today - *date).num_days(),
            PostedDate::DaysAgo(days) => i64::from(*days),
            PostedDate::Recently => RECENTLY_AGE_DAYS,
        }
    }
}

impl fmt::Display for PostedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostedDate::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            PostedDate::DaysAgo(0) => f.write_str("Today"),
            PostedDate::DaysAgo(1) => f.write_str("Yesterday"),
            PostedDate::DaysAgo(days) => write!(f, "{days} days ago"),
            PostedDate::Recently => f.write_str("Recently"),
        }
    }
}

impl FromStr for PostedDate {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PostedDate::parse_relative(s))
    }
}

impl Serialize for PostedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PostedDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PostedDate::parse_relative(&raw))
    }
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }
    let head = text.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn first_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
