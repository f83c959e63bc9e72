// libs/appointment-cell/src/services/validation.rs
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::models::SlotDraft;

/// Business rules for candidate slot time ranges.
#[derive(Debug, Clone)]
pub struct SlotValidationRules {
    pub min_duration_minutes: i64,
    pub max_duration_minutes: i64,
}

impl Default for SlotValidationRules {
    fn default() -> Self {
        Self {
            min_duration_minutes: 30,
            max_duration_minutes: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotValidationError {
    #[error("start time must be in the future")]
    StartNotInFuture,

    #[error("end time must be after start time")]
    EndNotAfterStart,

    #[error("slot must be at least {0} minutes long")]
    TooShort(i64),

    #[error("slot must be at most {0} minutes long")]
    TooLong(i64),
}

impl SlotValidationError {
    pub fn user_message(&self) -> String {
        match self {
            SlotValidationError::StartNotInFuture => {
                "Thời gian bắt đầu phải ở trong tương lai.".to_string()
            }
            SlotValidationError::EndNotAfterStart => {
                "Thời gian kết thúc phải sau thời gian bắt đầu.".to_string()
            }
            SlotValidationError::TooShort(min) => {
                format!("Khung giờ phải kéo dài ít nhất {} phút.", min)
            }
            SlotValidationError::TooLong(max) => {
                format!("Khung giờ không được vượt quá {} phút.", max)
            }
        }
    }
}

pub struct SlotValidator {
    rules: SlotValidationRules,
}

impl Default for SlotValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotValidator {
    pub fn new() -> Self {
        Self {
            rules: SlotValidationRules::default(),
        }
    }

    pub fn with_rules(rules: SlotValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &SlotValidationRules {
        &self.rules
    }

    /// Check a candidate slot against every rule independently and collect
    /// all violations. Pure function of the draft and the supplied clock.
    pub fn validate(&self, draft: &SlotDraft, now: DateTime<Utc>) -> Vec<SlotValidationError> {
        let mut errors = Vec::new();

        if draft.start_time <= now {
            errors.push(SlotValidationError::StartNotInFuture);
        }

        if draft.end_time <= draft.start_time {
            errors.push(SlotValidationError::EndNotAfterStart);
        }

        let duration = (draft.end_time - draft.start_time).num_minutes();
        if duration < self.rules.min_duration_minutes {
            errors.push(SlotValidationError::TooShort(self.rules.min_duration_minutes));
        }
        if duration > self.rules.max_duration_minutes {
            errors.push(SlotValidationError::TooLong(self.rules.max_duration_minutes));
        }

        if !errors.is_empty() {
            debug!("Slot draft failed validation with {} violation(s)", errors.len());
        }

        errors
    }
}
