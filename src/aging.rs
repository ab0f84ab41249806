//! Aging: whole days elapsed since a status change, and the fixed day-range
//! buckets reports are grouped by.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// One of the 13 ordered aging ranges.
///
/// | Days   | Bucket       |
/// |--------|--------------|
/// | 0..=5  | `0` to `5`   |
/// | 6-7    | `6-7`        |
/// | 8-10   | `8-10`       |
/// | 11-15  | `11-15`      |
/// | 16-20  | `16-20`      |
/// | 21-25  | `21-25`      |
/// | 26-30  | `26-30`      |
/// | > 30   | `30+`        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgingBucket {
    Day0,
    Day1,
    Day2,
    Day3,
    Day4,
    Day5,
    Days6To7,
    Days8To10,
    Days11To15,
    Days16To20,
    Days21To25,
    Days26To30,
    Over30,
}

impl AgingBucket {
    /// Every bucket in report order.
    pub const ALL: [AgingBucket; 13] = [
        AgingBucket::Day0,
        AgingBucket::Day1,
        AgingBucket::Day2,
        AgingBucket::Day3,
        AgingBucket::Day4,
        AgingBucket::Day5,
        AgingBucket::Days6To7,
        AgingBucket::Days8To10,
        AgingBucket::Days11To15,
        AgingBucket::Days16To20,
        AgingBucket::Days21To25,
        AgingBucket::Days26To30,
        AgingBucket::Over30,
    ];

    /// Maps a day count to its bucket. Negative counts have none.
    pub fn from_days(days: i64) -> Option<Self> {
        let bucket = match days {
            d if d < 0 => return None,
            0 => AgingBucket::Day0,
            1 => AgingBucket::Day1,
            2 => AgingBucket::Day2,
            3 => AgingBucket::Day3,
            4 => AgingBucket::Day4,
            5 => AgingBucket::Day5,
            6..=7 => AgingBucket::Days6To7,
            8..=10 => AgingBucket::Days8To10,
            11..=15 => AgingBucket::Days11To15,
            16..=20 => AgingBucket::Days16To20,
            21..=25 => AgingBucket::Days21To25,
            26..=30 => AgingBucket::Days26To30,
            _ => AgingBucket::Over30,
        };
        Some(bucket)
    }

    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::Day0 => "0",
            AgingBucket::Day1 => "1",
            AgingBucket::Day2 => "2",
            AgingBucket::Day3 => "3",
            AgingBucket::Day4 => "4",
            AgingBucket::Day5 => "5",
            AgingBucket::Days6To7 => "6-7",
            AgingBucket::Days8To10 => "8-10",
            AgingBucket::Days11To15 => "11-15",
            AgingBucket::Days16To20 => "16-20",
            AgingBucket::Days21To25 => "21-25",
            AgingBucket::Days26To30 => "26-30",
            AgingBucket::Over30 => "30+",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|b| b.label() == label)
    }

    /// Position in [`AgingBucket::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AgingBucket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Whole days between `ts` and `now`, floored.
///
/// Unknown timestamps and timestamps after `now` have no age.
pub fn aging_days(ts: Option<NaiveDateTime>, now: NaiveDateTime) -> Option<i64> {
    let ts = ts?;
    if ts > now {
        return None;
    }
    Some((now - ts).num_days())
}

/// Buckets a timestamp relative to `now`; see [`aging_days`].
pub fn bucket(ts: Option<NaiveDateTime>, now: NaiveDateTime) -> Option<AgingBucket> {
    aging_days(ts, now).and_then(AgingBucket::from_days)
}
