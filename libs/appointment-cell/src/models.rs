// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::ApiError;

// ==============================================================================
// CORE SLOT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
    Completed,
    Cancelled,
    NoShow,
}

impl SlotStatus {
    /// Display label in the platform's locale.
    pub fn label_vi(&self) -> &'static str {
        match self {
            SlotStatus::Available => "Còn trống",
            SlotStatus::Booked => "Đã đặt",
            SlotStatus::Completed => "Hoàn thành",
            SlotStatus::Cancelled => "Đã hủy",
            SlotStatus::NoShow => "Vắng mặt",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Available => write!(f, "available"),
            SlotStatus::Booked => write!(f, "booked"),
            SlotStatus::Completed => write!(f, "completed"),
            SlotStatus::Cancelled => write!(f, "cancelled"),
            SlotStatus::NoShow => write!(f, "no_show"),
        }
    }
}

/// A consultant-defined time window. Owned by the remote service; the client
/// only ever holds transient copies fetched per screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SlotStatus,
    #[serde(default)]
    pub member: Option<MemberSummary>,
    #[serde(default)]
    pub consultant: Option<ConsultantSummary>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantSummary {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// A candidate slot before it exists server-side: generator output and the
/// element of a create-slots request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDraft {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSlotsRequest {
    pub slots: Vec<SlotDraft>,
}

/// Server-owned booking standing of a member. Read-only here: strikes and
/// bans are mutated exclusively by the server's no-show accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentProfile {
    pub strikes: u8,
    pub is_banned: bool,
    #[serde(default)]
    pub ban_until: Option<DateTime<Utc>>,
}

// ==============================================================================
// DISPLAY PROJECTIONS (client-only, recomputed every render, never persisted)
// ==============================================================================

#[derive(Debug, Clone)]
pub struct FormattedSlot {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub status: SlotStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub formatted_date: String,
    pub formatted_time_range: String,
    pub is_today: bool,
    pub is_past: bool,
}

/// One calendar day's worth of formatted slots, in the display timezone.
#[derive(Debug, Clone)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub label: String,
    pub slots: Vec<FormattedSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BanNotice {
    pub message: String,
    pub until: DateTime<Utc>,
}

// ==============================================================================
// BUSINESS-RULE REJECTIONS
// ==============================================================================

/// What a screen should do after a failed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Leave the current screen and re-fetch the slot list.
    ReturnToSlotList,
    NoAction,
}

/// Classified booking rejection. Prefers the server's structured `code`
/// field; the substring matching below is the legacy contract kept only as a
/// fallback for servers that do not send codes yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingRejection {
    SlotTaken,
    ActiveBan,
    CooldownActive,
    Other,
}

impl BookingRejection {
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        if let Some(code) = code {
            match code {
                "SLOT_ALREADY_BOOKED" | "BOOKING_CONFLICT" => return BookingRejection::SlotTaken,
                "BOOKING_BANNED" | "ACTIVE_BAN" => return BookingRejection::ActiveBan,
                "CANCEL_COOLDOWN" | "COOLDOWN_ACTIVE" => return BookingRejection::CooldownActive,
                _ => {}
            }
        }

        let message = message.to_lowercase();
        if message.contains("conflict") || message.contains("already booked") {
            BookingRejection::SlotTaken
        } else if message.contains("banned") {
            BookingRejection::ActiveBan
        } else if message.contains("cooldown") {
            BookingRejection::CooldownActive
        } else {
            BookingRejection::Other
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlotError {
    #[error("Slot not found")]
    NotFound,

    #[error("Slot already booked by someone else")]
    SlotTaken,

    #[error("Booking is temporarily banned: {0}")]
    ActiveBan(String),

    #[error("Cancellation cooldown has not elapsed: {0}")]
    CooldownActive(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid time range: {0}")]
    InvalidTime(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SlotError {
    /// Localized message suitable for showing to the user directly.
    pub fn user_message(&self) -> String {
        match self {
            SlotError::NotFound => "Không tìm thấy khung giờ này.".to_string(),
            SlotError::SlotTaken => {
                "Khung giờ này đã được đặt bởi người khác. Vui lòng chọn khung giờ khác."
                    .to_string()
            }
            SlotError::ActiveBan(_) => {
                "Bạn đang bị tạm khóa tính năng đặt lịch do vắng mặt nhiều lần.".to_string()
            }
            SlotError::CooldownActive(_) => {
                "Bạn vừa hủy lịch hẹn. Vui lòng đợi hết thời gian chờ trước khi đặt lại."
                    .to_string()
            }
            SlotError::Unauthorized(_) => {
                "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại.".to_string()
            }
            SlotError::Validation(msg) | SlotError::InvalidTime(msg) => msg.clone(),
            SlotError::Rejected(msg) => msg.clone(),
            SlotError::Server(_) | SlotError::Contract(_) | SlotError::Transport(_) => {
                "Không thể kết nối đến máy chủ. Vui lòng thử lại sau.".to_string()
            }
        }
    }

    /// What the calling screen should do next. A taken slot forces the user
    /// back to the list for fresh data; the same request is never retried.
    pub fn recovery(&self) -> RecoveryAction {
        match self {
            SlotError::SlotTaken => RecoveryAction::ReturnToSlotList,
            _ => RecoveryAction::NoAction,
        }
    }
}

impl From<ApiError> for SlotError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(msg) => SlotError::Unauthorized(msg),
            ApiError::NotFound(_) => SlotError::NotFound,
            // An HTTP conflict is a taken slot unless the code says otherwise.
            ApiError::Conflict { code, message } => {
                match BookingRejection::classify(code.as_deref(), &message) {
                    BookingRejection::ActiveBan => SlotError::ActiveBan(message),
                    BookingRejection::CooldownActive => SlotError::CooldownActive(message),
                    _ => SlotError::SlotTaken,
                }
            }
            ApiError::Rejected { code, message } => {
                match BookingRejection::classify(code.as_deref(), &message) {
                    BookingRejection::SlotTaken => SlotError::SlotTaken,
                    BookingRejection::ActiveBan => SlotError::ActiveBan(message),
                    BookingRejection::CooldownActive => SlotError::CooldownActive(message),
                    BookingRejection::Other => SlotError::Rejected(message),
                }
            }
            ApiError::Server(msg) => SlotError::Server(msg),
            ApiError::Contract(msg) => SlotError::Contract(msg),
            ApiError::Transport(msg) => SlotError::Transport(msg),
        }
    }
}
