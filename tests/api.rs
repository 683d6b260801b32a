mod helpers;

use chrono::{TimeZone, Utc};
use helpers::setup::spawn_app;
use pillbox_sdk::{
    APIError, CreateReminderInput, CreateUserInput, Frequency, PillboxSDK, StatusCode,
    UpdateReminderInput, User, ID,
};

fn millis(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .timestamp_millis()
}

async fn create_user(sdk: &PillboxSDK) -> User {
    sdk.user
        .create(CreateUserInput {
            name: "Jane".into(),
            email: "jane@example.com".into(),
            push_token: None,
        })
        .await
        .expect("Expected to create user")
        .user
}

fn daily_aspirin(user_id: &ID) -> CreateReminderInput {
    CreateReminderInput {
        user_id: user_id.clone(),
        medicine: "Aspirin".into(),
        dosage: "1 tablet".into(),
        notes: Some("After breakfast".into()),
        time_of_day: "09:00".into(),
        frequency: "Daily".into(),
        start_date: Some("2030-01-01".into()),
        next_run_at: None,
    }
}

fn is_status<T>(res: &Result<T, APIError>, status: StatusCode) -> bool {
    matches!(res, Err(APIError::UnexpectedStatusCode(s)) if *s == status)
}

#[actix_web::test]
async fn test_status_ok() {
    let (app, sdk, _) = spawn_app().await;
    let res = sdk.status.check_health().await.expect("Expected to be up");
    assert_eq!(
        res.reminder_scan_interval_secs,
        app.config.reminder_scan_interval.as_secs()
    );
}

#[actix_web::test]
async fn test_user_lifecycle() {
    let (_, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;
    assert_eq!(user.name, "Jane");
    assert_eq!(user.push_token, None);

    let res = sdk
        .user
        .update_push_token(&user.id, Some("device-1".into()))
        .await
        .expect("Expected to register device");
    assert_eq!(res.user.push_token, Some("device-1".into()));

    let res = sdk.user.get(&user.id).await.expect("Expected to get user");
    assert_eq!(res.user.push_token, Some("device-1".into()));

    sdk.reminder
        .create(daily_aspirin(&user.id))
        .await
        .expect("Expected to create reminder");
    assert!(sdk.user.delete(&user.id).await.is_ok());
    assert!(is_status(
        &sdk.user.get(&user.id).await,
        StatusCode::NOT_FOUND
    ));
    assert!(is_status(
        &sdk.reminder.get_by_user(&user.id).await,
        StatusCode::NOT_FOUND
    ));
}

#[actix_web::test]
async fn test_create_user_with_invalid_email() {
    let (_, sdk, _) = spawn_app().await;
    let res = sdk
        .user
        .create(CreateUserInput {
            name: "Jane".into(),
            email: "not-an-email".into(),
            push_token: None,
        })
        .await;
    assert!(is_status(&res, StatusCode::BAD_REQUEST));
}

#[actix_web::test]
async fn test_reminder_lifecycle() {
    let (_, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;

    let reminder = sdk
        .reminder
        .create(daily_aspirin(&user.id))
        .await
        .expect("Expected to create reminder")
        .reminder;
    assert_eq!(reminder.user_id, user.id);
    assert_eq!(reminder.frequency, Frequency::Daily);
    assert_eq!(reminder.next_run_at, millis(2030, 1, 1, 9, 0));

    let res = sdk
        .reminder
        .get(&reminder.id)
        .await
        .expect("Expected to get reminder");
    assert_eq!(res.reminder.medicine, "Aspirin");
    assert_eq!(res.reminder.notes, Some("After breakfast".into()));

    let res = sdk
        .reminder
        .update(UpdateReminderInput {
            reminder_id: reminder.id.clone(),
            medicine: "Aspirin".into(),
            dosage: "2 tablets".into(),
            notes: None,
            time_of_day: "18:30".into(),
            frequency: "Monthly".into(),
            start_date: Some("2030-01-31".into()),
        })
        .await
        .expect("Expected to update reminder");
    assert_eq!(res.reminder.dosage, "2 tablets");
    assert_eq!(res.reminder.notes, None);
    assert_eq!(res.reminder.next_run_at, millis(2030, 1, 31, 18, 30));

    let res = sdk
        .reminder
        .get_by_user(&user.id)
        .await
        .expect("Expected to list reminders");
    assert_eq!(res.reminders.len(), 1);

    assert!(sdk.reminder.delete(&reminder.id).await.is_ok());
    assert!(is_status(
        &sdk.reminder.get(&reminder.id).await,
        StatusCode::NOT_FOUND
    ));
    assert!(is_status(
        &sdk.reminder.delete(&reminder.id).await,
        StatusCode::NOT_FOUND
    ));
}

#[actix_web::test]
async fn test_create_reminder_with_supplied_next_run_at() {
    let (_, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;

    let mut input = daily_aspirin(&user.id);
    input.next_run_at = Some(millis(2030, 1, 3, 9, 0));
    let res = sdk
        .reminder
        .create(input)
        .await
        .expect("Expected to accept an upcoming occurrence");
    assert_eq!(res.reminder.next_run_at, millis(2030, 1, 3, 9, 0));

    let mut input = daily_aspirin(&user.id);
    input.next_run_at = Some(millis(2030, 1, 3, 9, 30));
    assert!(is_status(
        &sdk.reminder.create(input).await,
        StatusCode::BAD_REQUEST
    ));
}

#[actix_web::test]
async fn test_create_reminder_validation() {
    let (_, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;

    let mut input = daily_aspirin(&user.id);
    input.time_of_day = "25:00".into();
    assert!(is_status(
        &sdk.reminder.create(input).await,
        StatusCode::BAD_REQUEST
    ));

    let mut input = daily_aspirin(&user.id);
    input.frequency = "Hourly".into();
    assert!(is_status(
        &sdk.reminder.create(input).await,
        StatusCode::BAD_REQUEST
    ));

    let mut input = daily_aspirin(&user.id);
    input.medicine = "a".repeat(51);
    assert!(is_status(
        &sdk.reminder.create(input).await,
        StatusCode::BAD_REQUEST
    ));

    let mut input = daily_aspirin(&user.id);
    input.start_date = Some("2030-02-30".into());
    assert!(is_status(
        &sdk.reminder.create(input).await,
        StatusCode::BAD_REQUEST
    ));

    let input = daily_aspirin(&ID::default());
    assert!(is_status(
        &sdk.reminder.create(input).await,
        StatusCode::NOT_FOUND
    ));
}
