//! Turning a date range plus a daily window into per-date records.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::clock::ClockTime;
use crate::error::{NuttyError, Result};
use crate::record::{AvailabilityRecord, UserId};

/// One record per day in `from..=to`, each spanning `start..end`.
///
/// Dates `user_id` already has a record for in `existing` are skipped, so
/// re-adding an overlapping range only fills in the new days. Records of other
/// users in `existing` are ignored.
///
/// # Errors
/// Returns `NuttyError::InvalidDateRange` if `from` is after `to`, and
/// `NuttyError::InvalidRecord` if `start` is not before `end`.
pub fn expand_date_range(
    user_id: &UserId,
    from: NaiveDate,
    to: NaiveDate,
    start: ClockTime,
    end: ClockTime,
    existing: &[AvailabilityRecord],
) -> Result<Vec<AvailabilityRecord>> {
    if from > to {
        return Err(NuttyError::InvalidDateRange(format!(
            "{} is after {}",
            from, to
        )));
    }
    if start >= end {
        return Err(NuttyError::InvalidRecord(format!(
            "start time {} must be before end time {}",
            start, end
        )));
    }

    let taken: HashSet<NaiveDate> = existing
        .iter()
        .filter(|r| &r.user_id == user_id)
        .map(|r| r.date)
        .collect();

    Ok(from
        .iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| !taken.contains(d))
        .map(|date| AvailabilityRecord {
            user_id: user_id.clone(),
            date,
            start_time: start,
            end_time: end,
        })
        .collect())
}
