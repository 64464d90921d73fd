//! Human-readable rendering of common slots.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::record::CommonTimeSlot;

/// Bucket slots by date. Within a date, slots keep their input order.
pub fn group_by_date(slots: &[CommonTimeSlot]) -> BTreeMap<NaiveDate, Vec<CommonTimeSlot>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<CommonTimeSlot>> = BTreeMap::new();
    for slot in slots {
        grouped.entry(slot.date).or_default().push(slot.clone());
    }
    grouped
}

/// `Thursday, May 1, 2025`
pub fn format_date_long(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `9:00 AM - 10:30 AM`
pub fn describe_slot(slot: &CommonTimeSlot) -> String {
    format!(
        "{} - {}",
        slot.start_time.format_12h(),
        slot.end_time.format_12h()
    )
}

/// Multi-line report: one heading per date, one indented line per slot.
pub fn render_report(slots: &[CommonTimeSlot]) -> String {
    if slots.is_empty() {
        return "No common free time found.\n".to_string();
    }

    let mut out = String::new();
    for (date, day_slots) in group_by_date(slots) {
        out.push_str(&format_date_long(date));
        out.push('\n');
        for slot in &day_slots {
            out.push_str("  ");
            out.push_str(&describe_slot(slot));
            out.push('\n');
        }
    }
    out
}
