mod create_reminder;
mod delete_reminder;
pub mod dispatch_reminder;
mod get_reminder;
mod get_user_reminders;
pub mod process_due_reminders;
pub mod reschedule_reminder;
pub mod scan_due_reminders;
mod update_reminder;

use actix_web::web;
use chrono::{TimeZone, Utc};
use create_reminder::create_reminder_controller;
use delete_reminder::delete_reminder_controller;
use get_reminder::get_reminder_controller;
use get_user_reminders::get_user_reminders_controller;
use pillbox_domain::{date, Frequency, ReminderSchedule, TimeOfDay, Tz};
use update_reminder::update_reminder_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/reminder", web::post().to(create_reminder_controller));
    cfg.route("/reminder/{reminder_id}", web::get().to(get_reminder_controller));
    cfg.route(
        "/reminder/{reminder_id}",
        web::put().to(update_reminder_controller),
    );
    cfg.route(
        "/reminder/{reminder_id}",
        web::delete().to(delete_reminder_controller),
    );
    cfg.route(
        "/user/{user_id}/reminders",
        web::get().to(get_user_reminders_controller),
    );
}

/// Parses the schedule fields of a reminder request. A missing start date
/// means today in the given timezone.
fn parse_schedule(
    time_of_day: &str,
    frequency: &str,
    start_date: Option<&str>,
    tz: &Tz,
    now: i64,
) -> Result<ReminderSchedule, String> {
    let time_of_day = time_of_day
        .trim()
        .parse::<TimeOfDay>()
        .map_err(|e| e.to_string())?;
    let frequency = frequency
        .trim()
        .parse::<Frequency>()
        .map_err(|e| e.to_string())?;
    let start_date = match start_date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(datestr) => date::parse_date(datestr, tz)
            .map_err(|_| format!("Start date: {} is not a valid date", datestr))?,
        None => Utc
            .timestamp_millis_opt(now)
            .single()
            .ok_or_else(|| "The current time is out of range".to_string())?
            .with_timezone(tz)
            .date_naive(),
    };

    Ok(ReminderSchedule {
        start_date,
        time_of_day,
        frequency,
    })
}
