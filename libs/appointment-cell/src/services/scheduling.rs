// libs/appointment-cell/src/services/scheduling.rs
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tracing::debug;

use crate::models::{SlotDraft, SlotError};
use crate::services::formatting::display_offset;

/// Generate contiguous, non-overlapping candidate slots for one working day.
///
/// The window runs from `start_hour:00` to `end_hour:00`, interpreted in the
/// platform display timezone, stepping by `duration_minutes`. The last slot
/// ends at or before the window end. Candidates are not deduplicated against
/// slots that already exist server-side; the server arbitrates at creation.
pub fn generate_day_slots(
    date: NaiveDate,
    start_hour: u32,
    end_hour: u32,
    duration_minutes: i64,
) -> Result<Vec<SlotDraft>, SlotError> {
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidTime(
            "slot duration must be positive".to_string(),
        ));
    }
    if start_hour >= end_hour {
        return Err(SlotError::InvalidTime(
            "start hour must be before end hour".to_string(),
        ));
    }
    if start_hour > 23 || end_hour > 24 {
        return Err(SlotError::InvalidTime(
            "working hours must fall within one day".to_string(),
        ));
    }

    let local_start = date.and_hms_opt(start_hour, 0, 0).ok_or_else(|| {
        SlotError::InvalidTime(format!("invalid start hour: {}", start_hour))
    })?;
    let window_start = display_offset()
        .from_local_datetime(&local_start)
        .single()
        .ok_or_else(|| SlotError::InvalidTime("ambiguous local start time".to_string()))?
        .with_timezone(&Utc);
    let window_end = window_start + Duration::hours(i64::from(end_hour - start_hour));

    let step = Duration::minutes(duration_minutes);
    let mut drafts = Vec::new();
    let mut current = window_start;

    while current + step <= window_end {
        drafts.push(SlotDraft {
            start_time: current,
            end_time: current + step,
        });
        current += step;
    }

    debug!(
        "Generated {} candidate slots for {} ({:02}:00-{:02}:00, {} min each)",
        drafts.len(),
        date,
        start_hour,
        end_hour,
        duration_minutes
    );

    Ok(drafts)
}
