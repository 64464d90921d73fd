//! Wall-clock times of day as minutes since midnight.
//!
//! Availability windows arrive as zero-padded 24-hour strings (`"09:30"`, or
//! `"09:30:00"` when read straight from a `time` column). They are parsed once
//! at the boundary into [`ClockTime`] so the sweep compares integers, never
//! strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NuttyError, Result};

/// Minutes in a day. `24:00` is a valid end-of-day bound.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute resolution, in `0..=1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(MINUTES_PER_DAY);

    /// Build from hour and minute. `24:00` is accepted; anything past it is not.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self> {
        if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(NuttyError::InvalidTime(format!(
                "{:02}:{:02} is outside 00:00-24:00",
                hour, minute
            )));
        }
        Ok(ClockTime(hour * 60 + minute))
    }

    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(NuttyError::InvalidTime(format!(
                "{} minutes is past the end of the day",
                minutes
            )));
        }
        Ok(ClockTime(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Minutes from `self` until `later`, or 0 if `later` is not after `self`.
    pub fn minutes_until(self, later: ClockTime) -> u16 {
        later.0.saturating_sub(self.0)
    }

    /// 12-hour rendering used for display, e.g. `9:05 AM`, `12:30 PM`.
    ///
    /// `24:00` renders as `12:00 AM` (midnight closing the day).
    pub fn format_12h(self) -> String {
        let hour = self.hour() % 24;
        let suffix = if hour >= 12 { "PM" } else { "AM" };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", hour12, self.minute(), suffix)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = NuttyError;

    /// Parse `HH:MM` or `HH:MM:SS`. Seconds, when present, must be `00`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || NuttyError::InvalidTime(format!("'{}' is not HH:MM", s));

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(invalid());
        }
        let fields = parts
            .iter()
            .map(|p| two_digits(p).ok_or_else(invalid))
            .collect::<Result<Vec<u16>>>()?;

        if fields.len() == 3 && fields[2] != 0 {
            return Err(NuttyError::InvalidTime(format!(
                "'{}' is not aligned to a whole minute",
                s
            )));
        }

        ClockTime::from_hm(fields[0], fields[1])
    }
}

fn two_digits(field: &str) -> Option<u16> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

