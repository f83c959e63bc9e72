use std::env;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use appointment_cell::models::{DaySlots, SlotError, SlotStatus, TimeSlot};
use appointment_cell::services::eligibility::{ban_notice, can_book, strike_warning};
use appointment_cell::services::formatting::{
    format_time_range, format_time_slot, group_slots_by_date,
};
use appointment_cell::services::scheduling::generate_day_slots;
use appointment_cell::services::slots::SlotService;
use shared_config::AppConfig;
use shared_models::auth::{Role, Session, SessionManager};

const USAGE: &str = "\
prevention-cli <command> [args]

Commands:
  generate <date> <start-hour> <end-hour> <minutes>   preview a day's candidate slots
  create <date> <start-hour> <end-hour> <minutes>     create slots (consultant)
  slots <consultant-id> [status]                      list a consultant's slots
  my-slots [status]                                   list own slots (consultant)
  my-bookings                                         list own bookings (member)
  book <slot-id>                                      book a slot (member)
  cancel <slot-id>                                    cancel a slot or booking
  no-show <slot-id>                                   mark a booking no-show (consultant)
  profile                                             show strike/ban standing (member)

Environment: PREVENTION_API_URL, PREVENTION_API_TOKEN, PREVENTION_API_ROLE";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    if !config.is_configured() {
        bail!("PREVENTION_API_URL is not set");
    }

    let mut sessions = SessionManager::new();
    if config.has_credentials() {
        let role = Role::parse(&config.api_role).map_err(|e| anyhow!(e.to_string()))?;
        sessions.login(Session::new(config.api_token.clone(), role));
        info!("Logged in as {}", role);
    }

    let service = SlotService::new(&config);
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    match command.as_str() {
        "generate" => {
            let (date, start, end, minutes) = parse_window(&args[1..])?;
            let drafts = generate_day_slots(date, start, end, minutes)
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("{} khung giờ:", drafts.len());
            for draft in drafts {
                println!("  {}", format_time_range(draft.start_time, draft.end_time));
            }
        }
        "create" => {
            let (date, start, end, minutes) = parse_window(&args[1..])?;
            let session = sessions.require().map_err(|e| anyhow!(e.to_string()))?;
            let drafts = generate_day_slots(date, start, end, minutes)
                .map_err(|e| anyhow!(e.user_message()))?;
            match service.create_slots(drafts, session).await {
                Ok(created) => println!("Đã tạo {} khung giờ.", created.len()),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        "slots" => {
            let consultant_id = parse_id(args.get(1))?;
            let status = parse_status(args.get(2))?;
            let slots = service
                .consultant_slots(consultant_id, status, sessions.current())
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            print_grouped(&slots);
        }
        "my-slots" => {
            let status = parse_status(args.get(1))?;
            let session = sessions.require().map_err(|e| anyhow!(e.to_string()))?;
            let slots = service
                .my_slots(status, session)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            print_grouped(&slots);
        }
        "my-bookings" => {
            let session = sessions.require().map_err(|e| anyhow!(e.to_string()))?;
            let slots = service
                .my_bookings(session)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            print_grouped(&slots);
        }
        "book" => {
            let slot_id = parse_id(args.get(1))?;
            let session = sessions.require().map_err(|e| anyhow!(e.to_string()))?;
            book(&service, slot_id, session).await?;
        }
        "cancel" => {
            let slot_id = parse_id(args.get(1))?;
            let session = sessions.require().map_err(|e| anyhow!(e.to_string()))?;
            match service.cancel_slot(slot_id, session).await {
                Ok(slot) => println!("Đã hủy khung giờ {}.", slot.id),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        "no-show" => {
            let slot_id = parse_id(args.get(1))?;
            let session = sessions.require().map_err(|e| anyhow!(e.to_string()))?;
            match service.mark_no_show(slot_id, session).await {
                Ok(slot) => println!("Đã đánh dấu vắng mặt cho khung giờ {}.", slot.id),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        "profile" => {
            let session = sessions.require().map_err(|e| anyhow!(e.to_string()))?;
            let profile = service
                .my_booking_profile(session)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Số lần vắng mặt: {}", profile.strikes);
            if let Some(warning) = strike_warning(&profile) {
                println!("{}", warning);
            }
            match ban_notice(&profile, Utc::now()) {
                Some(notice) => println!("{}", notice.message),
                None => println!("Bạn có thể đặt lịch bình thường."),
            }
        }
        _ => {
            println!("{}", USAGE);
        }
    }

    Ok(())
}

/// Booking flow as the booking screen runs it: check standing, book, and on a
/// taken slot fall back to the consultant's fresh list instead of retrying.
async fn book(service: &SlotService, slot_id: Uuid, session: &Session) -> Result<()> {
    let now = Utc::now();

    // A failed profile fetch must not block booking.
    let profile = service.my_booking_profile(session).await.ok();
    if !can_book(profile.as_ref(), now) {
        if let Some(profile) = profile.as_ref() {
            if let Some(notice) = ban_notice(profile, now) {
                println!("{}", notice.message);
                return Ok(());
            }
        }
    }

    let slot = service
        .get_slot(slot_id, Some(session))
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    match service.book_slot(slot_id, session).await {
        Ok(booked) => {
            let formatted = format_time_slot(&booked, now);
            println!(
                "Đặt lịch thành công: {} {}",
                formatted.formatted_date, formatted.formatted_time_range
            );
        }
        Err(e @ SlotError::SlotTaken) => {
            println!("{}", e.user_message());
            // Forced refresh: show the consultant's current availability.
            let fresh = service
                .consultant_slots(slot.consultant_id, Some(SlotStatus::Available), Some(session))
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Các khung giờ còn trống:");
            print_grouped(&fresh);
        }
        Err(e) => println!("{}", e.user_message()),
    }

    Ok(())
}

fn print_grouped(slots: &[TimeSlot]) {
    if slots.is_empty() {
        println!("Không có khung giờ nào.");
        return;
    }

    let groups: Vec<DaySlots> = group_slots_by_date(slots, Utc::now());
    for group in groups {
        println!("{}", group.label);
        for slot in group.slots {
            let mut line = format!("  {}  {}", slot.formatted_time_range, slot.status.label_vi());
            if slot.is_today {
                line.push_str("  (hôm nay)");
            }
            println!("{}  [{}]", line, slot.id);
        }
    }
}

fn parse_window(args: &[String]) -> Result<(NaiveDate, u32, u32, i64)> {
    let date: NaiveDate = args
        .first()
        .ok_or_else(|| anyhow!(USAGE))?
        .parse()
        .context("date must be YYYY-MM-DD")?;
    let start: u32 = args
        .get(1)
        .ok_or_else(|| anyhow!(USAGE))?
        .parse()
        .context("start hour must be a number")?;
    let end: u32 = args
        .get(2)
        .ok_or_else(|| anyhow!(USAGE))?
        .parse()
        .context("end hour must be a number")?;
    let minutes: i64 = args
        .get(3)
        .ok_or_else(|| anyhow!(USAGE))?
        .parse()
        .context("duration must be minutes")?;
    Ok((date, start, end, minutes))
}

fn parse_id(arg: Option<&String>) -> Result<Uuid> {
    arg.ok_or_else(|| anyhow!(USAGE))?
        .parse()
        .context("expected a UUID")
}

fn parse_status(arg: Option<&String>) -> Result<Option<SlotStatus>> {
    let Some(arg) = arg else {
        return Ok(None);
    };
    match arg.as_str() {
        "available" => Ok(Some(SlotStatus::Available)),
        "booked" => Ok(Some(SlotStatus::Booked)),
        "completed" => Ok(Some(SlotStatus::Completed)),
        "cancelled" => Ok(Some(SlotStatus::Cancelled)),
        "no_show" => Ok(Some(SlotStatus::NoShow)),
        other => bail!("unknown status filter: {}", other),
    }
}
