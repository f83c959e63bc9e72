// libs/appointment-cell/src/services/formatting.rs
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Locale, NaiveDate, Utc};

use crate::models::{DaySlots, FormattedSlot, TimeSlot};

/// Fixed display timezone: UTC+7 (Asia/Ho_Chi_Minh, no DST).
pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).expect("UTC+7 is a valid offset")
}

/// Vietnamese date label, e.g. "Thứ hai, 15/09/2025".
pub fn format_date_label(time: DateTime<Utc>) -> String {
    time.with_timezone(&display_offset())
        .format_localized("%A, %d/%m/%Y", Locale::vi_VN)
        .to_string()
}

/// "HH:MM - HH:MM" in the display timezone.
pub fn format_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let offset = display_offset();
    format!(
        "{} - {}",
        start.with_timezone(&offset).format("%H:%M"),
        end.with_timezone(&offset).format("%H:%M")
    )
}

fn display_date(time: DateTime<Utc>) -> NaiveDate {
    time.with_timezone(&display_offset()).date_naive()
}

/// Project a raw slot into its display form. Pure function of the slot and
/// the supplied clock; recomputed on every render.
pub fn format_time_slot(slot: &TimeSlot, now: DateTime<Utc>) -> FormattedSlot {
    FormattedSlot {
        id: slot.id,
        consultant_id: slot.consultant_id,
        status: slot.status,
        start_time: slot.start_time,
        end_time: slot.end_time,
        formatted_date: format_date_label(slot.start_time),
        formatted_time_range: format_time_range(slot.start_time, slot.end_time),
        is_today: display_date(slot.start_time) == display_date(now),
        is_past: slot.start_time < now,
    }
}

/// Group slots by calendar date in the display timezone.
///
/// Groups come back in ascending date order and each group is sorted
/// ascending by start time, regardless of input order. Callers never have to
/// pre-sort.
pub fn group_slots_by_date(slots: &[TimeSlot], now: DateTime<Utc>) -> Vec<DaySlots> {
    let mut by_date: BTreeMap<NaiveDate, Vec<FormattedSlot>> = BTreeMap::new();

    for slot in slots {
        by_date
            .entry(display_date(slot.start_time))
            .or_default()
            .push(format_time_slot(slot, now));
    }

    by_date
        .into_iter()
        .map(|(date, mut group)| {
            group.sort_by(|a, b| a.start_time.cmp(&b.start_time));
            let label = group
                .first()
                .map(|s| s.formatted_date.clone())
                .unwrap_or_default();
            DaySlots {
                date,
                label,
                slots: group,
            }
        })
        .collect()
}
