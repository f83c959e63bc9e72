// libs/appointment-cell/src/services/slots.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_http::client::ApiClient;
use shared_models::auth::Session;

use crate::models::{
    AppointmentProfile, CreateSlotsRequest, SlotDraft, SlotError, SlotStatus, TimeSlot,
};
use crate::services::validation::SlotValidator;

/// Thin request wrapper over the appointment-slot endpoints.
///
/// The server owns all slot state, strike accounting, and conflict
/// arbitration. This service does not retry, does not cache, and keeps no
/// optimistic local state: callers re-fetch after every mutation.
pub struct SlotService {
    api: ApiClient,
    validator: SlotValidator,
}

impl SlotService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api: ApiClient::new(config),
            validator: SlotValidator::new(),
        }
    }

    /// Build against an existing client. Used by tests pointing at a mock
    /// server.
    pub fn with_client(api: ApiClient) -> Self {
        Self {
            api,
            validator: SlotValidator::new(),
        }
    }

    /// Create a batch of slots for the authenticated consultant.
    ///
    /// Every draft is validated locally first; the first violation rejects
    /// the whole batch without touching the network. Overlap with existing
    /// slots is the server's call.
    pub async fn create_slots(
        &self,
        drafts: Vec<SlotDraft>,
        session: &Session,
    ) -> Result<Vec<TimeSlot>, SlotError> {
        if drafts.is_empty() {
            return Err(SlotError::Validation(
                "Vui lòng chọn ít nhất một khung giờ.".to_string(),
            ));
        }

        let now = Utc::now();
        for draft in &drafts {
            let errors = self.validator.validate(draft, now);
            if let Some(first) = errors.first() {
                warn!(
                    "Rejecting slot batch: draft {} - {} failed validation ({})",
                    draft.start_time, draft.end_time, first
                );
                return Err(SlotError::Validation(first.user_message()));
            }
        }

        info!("Creating {} slots", drafts.len());
        let request = CreateSlotsRequest { slots: drafts };
        let created: Vec<TimeSlot> = self
            .api
            .request(
                Method::POST,
                "/appointment-slots/my-slots",
                Some(session),
                Some(json!(request)),
            )
            .await?;

        Ok(created)
    }

    /// List a consultant's slots, optionally filtered by status. Public
    /// listing; the session is optional.
    pub async fn consultant_slots(
        &self,
        consultant_id: Uuid,
        status: Option<SlotStatus>,
        session: Option<&Session>,
    ) -> Result<Vec<TimeSlot>, SlotError> {
        let mut path = format!("/appointment-slots/consultants/{}", consultant_id);
        if let Some(status) = status {
            path.push_str(&format!("?status={}", status));
        }
        debug!("Fetching slots for consultant {}", consultant_id);

        let slots = self.api.request(Method::GET, &path, session, None).await?;
        Ok(slots)
    }

    /// The authenticated consultant's own slots.
    pub async fn my_slots(
        &self,
        status: Option<SlotStatus>,
        session: &Session,
    ) -> Result<Vec<TimeSlot>, SlotError> {
        let mut path = "/appointment-slots/my-slots".to_string();
        if let Some(status) = status {
            path.push_str(&format!("?status={}", status));
        }

        let slots = self
            .api
            .request(Method::GET, &path, Some(session), None)
            .await?;
        Ok(slots)
    }

    /// The authenticated member's booked appointments.
    pub async fn my_bookings(&self, session: &Session) -> Result<Vec<TimeSlot>, SlotError> {
        let slots = self
            .api
            .request(
                Method::GET,
                "/appointment-slots/my-bookings",
                Some(session),
                None,
            )
            .await?;
        Ok(slots)
    }

    /// Fetch one slot with consultant details.
    pub async fn get_slot(
        &self,
        slot_id: Uuid,
        session: Option<&Session>,
    ) -> Result<TimeSlot, SlotError> {
        let path = format!("/appointment-slots/{}", slot_id);
        let slot = self.api.request(Method::GET, &path, session, None).await?;
        Ok(slot)
    }

    /// Book a slot for the authenticated member. A concurrent winner is
    /// surfaced as `SlotError::SlotTaken`; the caller returns to the list and
    /// re-fetches instead of retrying.
    pub async fn book_slot(&self, slot_id: Uuid, session: &Session) -> Result<TimeSlot, SlotError> {
        info!("Booking slot {}", slot_id);
        let path = format!("/appointment-slots/{}/book", slot_id);
        let slot: TimeSlot = self
            .api
            .request(Method::PATCH, &path, Some(session), None)
            .await?;

        info!("Slot {} booked", slot.id);
        Ok(slot)
    }

    /// Cancel a slot or booking owned by the caller.
    pub async fn cancel_slot(
        &self,
        slot_id: Uuid,
        session: &Session,
    ) -> Result<TimeSlot, SlotError> {
        info!("Cancelling slot {}", slot_id);
        let path = format!("/appointment-slots/{}/cancel", slot_id);
        let slot = self
            .api
            .request(Method::PATCH, &path, Some(session), None)
            .await?;
        Ok(slot)
    }

    /// Mark a booked slot as a no-show. Consultant only; the server does the
    /// strike accounting.
    pub async fn mark_no_show(
        &self,
        slot_id: Uuid,
        session: &Session,
    ) -> Result<TimeSlot, SlotError> {
        info!("Marking slot {} as no-show", slot_id);
        let path = format!("/appointment-slots/{}/mark-no-show", slot_id);
        let slot = self
            .api
            .request(Method::PATCH, &path, Some(session), None)
            .await?;
        Ok(slot)
    }

    /// The authenticated member's strike/ban standing.
    pub async fn my_booking_profile(
        &self,
        session: &Session,
    ) -> Result<AppointmentProfile, SlotError> {
        let profile = self
            .api
            .request(
                Method::GET,
                "/appointment-slots/my-profile",
                Some(session),
                None,
            )
            .await?;
        Ok(profile)
    }
}
