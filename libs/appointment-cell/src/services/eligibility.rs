// libs/appointment-cell/src/services/eligibility.rs
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{AppointmentProfile, BanNotice};
use crate::services::formatting::format_date_label;

/// No-show strikes at which the server imposes a ban.
pub const MAX_STRIKES: u8 = 3;

/// Whether the member may book right now.
///
/// Only an active ban blocks booking; strikes alone never do. An absent
/// profile (the fetch failed) defaults to eligible so a transient error never
/// locks out a legitimate user.
pub fn can_book(profile: Option<&AppointmentProfile>, now: DateTime<Utc>) -> bool {
    let Some(profile) = profile else {
        debug!("No appointment profile available, assuming eligible");
        return true;
    };

    if !profile.is_banned {
        return true;
    }

    match profile.ban_until {
        Some(until) => until <= now,
        // Banned with no expiry on record reads as an expired ban.
        None => true,
    }
}

/// Restriction banner for an actively banned member, `None` otherwise.
pub fn ban_notice(profile: &AppointmentProfile, now: DateTime<Utc>) -> Option<BanNotice> {
    if can_book(Some(profile), now) {
        return None;
    }

    let until = profile.ban_until?;
    Some(BanNotice {
        message: format!(
            "Bạn đang bị tạm khóa tính năng đặt lịch đến {}.",
            format_date_label(until)
        ),
        until,
    })
}

/// Warning line once the member has accumulated strikes, `None` at zero.
pub fn strike_warning(profile: &AppointmentProfile) -> Option<String> {
    if profile.strikes == 0 {
        return None;
    }

    Some(format!(
        "Bạn đã vắng mặt {}/{} lần. Đủ {} lần sẽ bị tạm khóa đặt lịch.",
        profile.strikes, MAX_STRIKES, MAX_STRIKES
    ))
}
