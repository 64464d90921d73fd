//! Availability records and the common slots computed from them.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::error::{NuttyError, Result};

/// Opaque identifier of a user, as issued by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId(id)
    }
}

/// Day of week with 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// A window of free time a user declared for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl AvailabilityRecord {
    /// Build a record, rejecting empty or inverted windows.
    pub fn new(
        user_id: impl Into<UserId>,
        date: NaiveDate,
        start_time: ClockTime,
        end_time: ClockTime,
    ) -> Result<Self> {
        let record = AvailabilityRecord {
            user_id: user_id.into(),
            date,
            start_time,
            end_time,
        };
        record.validate()?;
        Ok(record)
    }

    /// Check `start_time < end_time`.
    ///
    /// Deserialized records bypass [`AvailabilityRecord::new`], so anything
    /// that consumes foreign records calls this first.
    pub fn validate(&self) -> Result<()> {
        if self.start_time >= self.end_time {
            return Err(NuttyError::InvalidRecord(format!(
                "user '{}' on {}: start time {} must be before end time {}",
                self.user_id, self.date, self.start_time, self.end_time
            )));
        }
        Ok(())
    }

    pub fn day_of_week(&self) -> u8 {
        day_of_week(self.date)
    }

    pub fn duration_minutes(&self) -> u16 {
        self.start_time.minutes_until(self.end_time)
    }
}

/// A maximal window on one date during which every requested user is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonTimeSlot {
    pub date: NaiveDate,
    pub day_of_week: u8,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// The full requested group, in request order.
    pub users: Vec<UserId>,
}

impl CommonTimeSlot {
    pub fn duration_minutes(&self) -> u16 {
        self.start_time.minutes_until(self.end_time)
    }
}

/// Parse a JSON array of availability records and validate each one.
pub fn parse_records_json(json: &str) -> Result<Vec<AvailabilityRecord>> {
    let records: Vec<AvailabilityRecord> = serde_json::from_str(json)?;
    for record in &records {
        record.validate()?;
    }
    Ok(records)
}
