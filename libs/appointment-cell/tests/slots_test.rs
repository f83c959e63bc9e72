use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{RecoveryAction, SlotDraft, SlotError, SlotStatus};
use appointment_cell::services::eligibility::can_book;
use appointment_cell::services::slots::SlotService;
use shared_http::client::ApiClient;
use shared_models::auth::Session;

fn service(server: &MockServer) -> SlotService {
    SlotService::with_client(ApiClient::with_base_url(server.uri()))
}

fn slot_json(id: Uuid, consultant_id: Uuid, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "consultantId": consultant_id,
        "startTime": "2030-01-06T02:00:00Z",
        "endTime": "2030-01-06T03:00:00Z",
        "status": status,
        "createdAt": "2030-01-01T00:00:00Z",
        "updatedAt": "2030-01-01T00:00:00Z"
    })
}

fn future_draft(hours_ahead: i64) -> SlotDraft {
    let start = Utc::now() + Duration::hours(hours_ahead);
    SlotDraft {
        start_time: start,
        end_time: start + Duration::minutes(60),
    }
}

#[tokio::test]
async fn my_slots_sends_bearer_token_and_decodes_the_envelope() {
    let server = MockServer::start().await;
    let slot_id = Uuid::new_v4();
    let consultant_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/appointment-slots/my-slots"))
        .and(header("Authorization", "Bearer consultant-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": [slot_json(slot_id, consultant_id, "available")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::consultant("consultant-token");
    let slots = service(&server).my_slots(None, &session).await.unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].id, slot_id);
    assert_eq!(slots[0].status, SlotStatus::Available);
    assert_eq!(slots[0].duration_minutes(), 60);
}

#[tokio::test]
async fn consultant_listing_passes_the_status_filter() {
    let server = MockServer::start().await;
    let consultant_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!(
            "/appointment-slots/consultants/{}",
            consultant_id
        )))
        .and(query_param("status", "available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let slots = service(&server)
        .consultant_slots(consultant_id, Some(SlotStatus::Available), None)
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn create_slots_submits_the_validated_batch() {
    let server = MockServer::start().await;
    let consultant_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/appointment-slots/my-slots"))
        .and(header("Authorization", "Bearer consultant-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "success",
            "data": [
                slot_json(Uuid::new_v4(), consultant_id, "available"),
                slot_json(Uuid::new_v4(), consultant_id, "available")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::consultant("consultant-token");
    let created = service(&server)
        .create_slots(vec![future_draft(24), future_draft(48)], &session)
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
}

#[tokio::test]
async fn invalid_draft_rejects_the_batch_without_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/appointment-slots/my-slots"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session::consultant("consultant-token");
    let err = service(&server)
        .create_slots(vec![future_draft(24), future_draft(-2)], &session)
        .await
        .unwrap_err();

    assert_matches!(err, SlotError::Validation(_));
    assert_eq!(err.user_message(), "Thời gian bắt đầu phải ở trong tương lai.");
}

#[tokio::test]
async fn booking_conflict_maps_to_slot_taken_and_is_never_retried() {
    let server = MockServer::start().await;
    let slot_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/appointment-slots/{}/book", slot_id)))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "status": "fail",
            "message": "Booking conflict: slot was already booked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::member("member-token");
    let err = service(&server)
        .book_slot(slot_id, &session)
        .await
        .unwrap_err();

    assert_matches!(err, SlotError::SlotTaken);
    assert_eq!(
        err.user_message(),
        "Khung giờ này đã được đặt bởi người khác. Vui lòng chọn khung giờ khác."
    );
    assert_eq!(err.recovery(), RecoveryAction::ReturnToSlotList);
}

#[tokio::test]
async fn member_with_strikes_but_no_ban_books_normally() {
    let server = MockServer::start().await;
    let slot_id = Uuid::new_v4();
    let consultant_id = Uuid::new_v4();
    let session = Session::member("member-token");

    Mock::given(method("GET"))
        .and(path("/appointment-slots/my-profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "strikes": 2, "isBanned": false, "banUntil": null }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("/appointment-slots/{}/book", slot_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": slot_json(slot_id, consultant_id, "booked")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service(&server);
    let profile = svc.my_booking_profile(&session).await.unwrap();
    assert_eq!(profile.strikes, 2);
    assert!(can_book(Some(&profile), Utc::now()));

    let booked = svc.book_slot(slot_id, &session).await.unwrap();
    assert_eq!(booked.status, SlotStatus::Booked);
}

#[tokio::test]
async fn structured_error_codes_take_precedence_over_message_matching() {
    let server = MockServer::start().await;
    let slot_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/appointment-slots/{}/book", slot_id)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "fail",
            "code": "CANCEL_COOLDOWN",
            "message": "please wait before booking again"
        })))
        .mount(&server)
        .await;

    let session = Session::member("member-token");
    let err = service(&server)
        .book_slot(slot_id, &session)
        .await
        .unwrap_err();

    assert_matches!(err, SlotError::CooldownActive(_));
    assert!(err.user_message().contains("thời gian chờ"));
}

#[tokio::test]
async fn legacy_banned_message_still_classifies_without_a_code() {
    let server = MockServer::start().await;
    let slot_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/appointment-slots/{}/book", slot_id)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "fail",
            "message": "member is banned until 2030-01-01"
        })))
        .mount(&server)
        .await;

    let session = Session::member("member-token");
    let err = service(&server)
        .book_slot(slot_id, &session)
        .await
        .unwrap_err();

    // The server's message is carried verbatim inside the classified error.
    assert_matches!(err, SlotError::ActiveBan(msg) if msg.contains("banned until 2030-01-01"));
}

#[tokio::test]
async fn success_without_data_fails_loudly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointment-slots/my-bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .mount(&server)
        .await;

    let session = Session::member("member-token");
    let err = service(&server)
        .my_bookings(&session)
        .await
        .unwrap_err();

    assert_matches!(err, SlotError::Contract(_));
}

#[tokio::test]
async fn cancel_and_no_show_return_the_updated_slot() {
    let server = MockServer::start().await;
    let slot_id = Uuid::new_v4();
    let consultant_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/appointment-slots/{}/cancel", slot_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": slot_json(slot_id, consultant_id, "cancelled")
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("/appointment-slots/{}/mark-no-show", slot_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": slot_json(slot_id, consultant_id, "no_show")
        })))
        .mount(&server)
        .await;

    let svc = service(&server);
    let member = Session::member("member-token");
    let consultant = Session::consultant("consultant-token");

    let cancelled = svc.cancel_slot(slot_id, &member).await.unwrap();
    assert_eq!(cancelled.status, SlotStatus::Cancelled);

    let no_show = svc.mark_no_show(slot_id, &consultant).await.unwrap();
    assert_eq!(no_show.status, SlotStatus::NoShow);
}

#[tokio::test]
async fn missing_slot_maps_to_not_found() {
    let server = MockServer::start().await;
    let slot_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointment-slots/{}", slot_id)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "fail",
            "message": "slot not found"
        })))
        .mount(&server)
        .await;

    let err = service(&server)
        .get_slot(slot_id, None)
        .await
        .unwrap_err();
    assert_matches!(err, SlotError::NotFound);
}
