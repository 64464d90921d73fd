//! Sweep-line intersection of per-date availability.
//!
//! Every record contributes a start and an end boundary. Boundaries are sorted
//! by time, then swept left to right while tracking which users are currently
//! free. Whenever the whole group is free at once, a window opens; when anyone
//! drops out, it closes and becomes a [`CommonTimeSlot`].
//!
//! At equal times `End` sorts before `Start`, so a user free until 10:00 and
//! another free from 10:00 never share a slot: the single instant 10:00 has no
//! duration and is not emitted.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::clock::ClockTime;
use crate::error::{NuttyError, Result};
use crate::record::{day_of_week, AvailabilityRecord, CommonTimeSlot, UserId};

/// Which side of an availability window a boundary marks.
///
/// Variant order is the tie-break: `End` before `Start` at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    End,
    Start,
}

/// One boundary on a date's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEvent<'a> {
    pub time: ClockTime,
    pub kind: EventKind,
    pub user_id: &'a UserId,
}

/// Build the sorted timeline for a set of records on a single date.
pub fn build_timeline<'a>(records: &[&'a AvailabilityRecord]) -> Vec<TimelineEvent<'a>> {
    let mut timeline: Vec<TimelineEvent<'a>> = records
        .iter()
        .flat_map(|&r| {
            [
                TimelineEvent {
                    time: r.start_time,
                    kind: EventKind::Start,
                    user_id: &r.user_id,
                },
                TimelineEvent {
                    time: r.end_time,
                    kind: EventKind::End,
                    user_id: &r.user_id,
                },
            ]
        })
        .collect();

    timeline.sort_by_key(|e| (e.time, e.kind));
    timeline
}

/// Reject a request that names the same user twice.
pub fn ensure_unique(user_ids: &[UserId]) -> Result<()> {
    let mut seen = HashSet::with_capacity(user_ids.len());
    for id in user_ids {
        if !seen.insert(id) {
            return Err(NuttyError::DuplicateUser(id.clone()));
        }
    }
    Ok(())
}

/// Compute the common slots for one date.
///
/// Records belonging to users outside `user_ids` are ignored. Overlapping
/// records of the same user are fine: a user stays free until their last open
/// window closes. Slots that touch end-to-start are coalesced so every emitted
/// slot is maximal.
pub fn sweep_date(
    date: NaiveDate,
    user_ids: &[UserId],
    records: &[&AvailabilityRecord],
) -> Vec<CommonTimeSlot> {
    if user_ids.is_empty() {
        return Vec::new();
    }

    let requested: HashSet<&UserId> = user_ids.iter().collect();
    let relevant: Vec<&AvailabilityRecord> = records
        .iter()
        .copied()
        .filter(|r| requested.contains(&r.user_id))
        .collect();

    let required = requested.len();
    let mut open_windows: HashMap<&UserId, usize> = HashMap::new();
    let mut window_start: Option<ClockTime> = None;
    let mut intervals: Vec<(ClockTime, ClockTime)> = Vec::new();

    for event in build_timeline(&relevant) {
        match event.kind {
            EventKind::Start => *open_windows.entry(event.user_id).or_insert(0) += 1,
            EventKind::End => {
                if let Some(count) = open_windows.get_mut(event.user_id) {
                    *count -= 1;
                    if *count == 0 {
                        open_windows.remove(event.user_id);
                    }
                }
            }
        }

        let active = open_windows.len();
        if active == required {
            if window_start.is_none() {
                window_start = Some(event.time);
            }
        } else if let Some(start) = window_start.take() {
            if start < event.time {
                push_coalesced(&mut intervals, start, event.time);
            }
        }
    }

    let dow = day_of_week(date);
    intervals
        .into_iter()
        .map(|(start_time, end_time)| CommonTimeSlot {
            date,
            day_of_week: dow,
            start_time,
            end_time,
            users: user_ids.to_vec(),
        })
        .collect()
}

fn push_coalesced(
    intervals: &mut Vec<(ClockTime, ClockTime)>,
    start: ClockTime,
    end: ClockTime,
) {
    if let Some(last) = intervals.last_mut() {
        if last.1 == start {
            last.1 = end;
            return;
        }
    }
    intervals.push((start, end));
}

/// Intersect already-fetched records for a group, date by date.
///
/// Output is ordered by date, then by start time within a date. Dates where the
/// group never overlaps are simply absent.
///
/// # Errors
/// Returns `NuttyError::DuplicateUser` if `user_ids` repeats an identifier and
/// `NuttyError::InvalidRecord` for any record whose start is not before its end.
pub fn intersect_records(
    user_ids: &[UserId],
    records: &[AvailabilityRecord],
) -> Result<Vec<CommonTimeSlot>> {
    ensure_unique(user_ids)?;
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    for record in records {
        record.validate()?;
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<&AvailabilityRecord>> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date).or_default().push(record);
    }

    let mut slots = Vec::new();
    for (date, day_records) in &by_date {
        let found = sweep_date(*date, user_ids, day_records);
        tracing::debug!(
            %date,
            records = day_records.len(),
            slots = found.len(),
            "swept date"
        );
        slots.extend(found);
    }

    Ok(slots)
}
