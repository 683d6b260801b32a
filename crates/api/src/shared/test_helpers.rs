use chrono::{TimeZone, Utc};
use pillbox_domain::{
    Contact, Frequency, NaiveDate, Reminder, ReminderContent, ReminderNotification,
    ReminderSchedule, Tz, User, ID,
};
use pillbox_infra::{
    Config, IEmailSender, IPushSender, IReminderRepo, IUserRepo, InMemoryReminderRepo,
    InMemoryUserRepo, ManualSys, Notifications, PillboxContext, Repos,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

/// Email channel that records every attempted send
#[derive(Default)]
pub struct FakeEmailSender {
    attempts: Mutex<Vec<String>>,
    failing_medicine: Option<String>,
    panicking_medicine: Option<String>,
    delay: Option<Duration>,
}

impl FakeEmailSender {
    pub fn failing_for(medicine: &str) -> Self {
        Self {
            failing_medicine: Some(medicine.into()),
            ..Default::default()
        }
    }

    pub fn panicking_for(medicine: &str) -> Self {
        Self {
            panicking_medicine: Some(medicine.into()),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Medicine of every attempted send, in order
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IEmailSender for FakeEmailSender {
    async fn send_reminder(
        &self,
        _contact: &Contact,
        notification: &ReminderNotification,
    ) -> anyhow::Result<()> {
        self.attempts
            .lock()
            .unwrap()
            .push(notification.medicine.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panicking_medicine.as_ref() == Some(&notification.medicine) {
            panic!("Email provider blew up");
        }
        if self.failing_medicine.as_ref() == Some(&notification.medicine) {
            return Err(anyhow::Error::msg("Email provider rejected the message"));
        }
        Ok(())
    }
}

/// Push channel that records the device tokens it was asked to notify
#[derive(Default)]
pub struct FakePushSender {
    tokens: Mutex<Vec<String>>,
    failing: bool,
}

impl FakePushSender {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IPushSender for FakePushSender {
    async fn send_reminder(
        &self,
        push_token: &str,
        _notification: &ReminderNotification,
    ) -> anyhow::Result<()> {
        self.tokens.lock().unwrap().push(push_token.into());
        if self.failing {
            return Err(anyhow::Error::msg("Push provider is down"));
        }
        Ok(())
    }
}

/// Reminder store whose operations can be switched to fail
pub struct FlakyReminderRepo {
    inner: InMemoryReminderRepo,
    pub fail_scans: AtomicBool,
    pub fail_updates: AtomicBool,
    scan_delay: Mutex<Option<Duration>>,
}

impl FlakyReminderRepo {
    pub fn new() -> Self {
        Self {
            inner: InMemoryReminderRepo::new(),
            fail_scans: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            scan_delay: Mutex::new(None),
        }
    }

    pub fn set_scan_delay(&self, delay: Duration) {
        *self.scan_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait::async_trait]
impl IReminderRepo for FlakyReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        self.inner.insert(reminder).await
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        self.inner.save(reminder).await
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        self.inner.find(reminder_id).await
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Reminder> {
        self.inner.find_by_user(user_id).await
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        self.inner.delete(reminder_id).await
    }

    async fn find_due(&self, now: i64) -> anyhow::Result<Vec<Reminder>> {
        let delay = *self.scan_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_scans.load(Ordering::SeqCst) {
            return Err(anyhow::Error::msg("Connection reset"));
        }
        self.inner.find_due(now).await
    }

    async fn update_next_run(
        &self,
        snapshot: &Reminder,
        next_run_at: i64,
    ) -> anyhow::Result<bool> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(anyhow::Error::msg("Connection reset"));
        }
        self.inner.update_next_run(snapshot, next_run_at).await
    }
}

/// Owner directory whose contact lookups can be switched to fail or stall
pub struct FlakyUserRepo {
    inner: InMemoryUserRepo,
    pub fail_lookups: AtomicBool,
    lookup_delay: Mutex<Option<Duration>>,
}

impl FlakyUserRepo {
    pub fn new() -> Self {
        Self {
            inner: InMemoryUserRepo::new(),
            fail_lookups: AtomicBool::new(false),
            lookup_delay: Mutex::new(None),
        }
    }

    pub fn set_lookup_delay(&self, delay: Duration) {
        *self.lookup_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait::async_trait]
impl IUserRepo for FlakyUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        self.inner.insert(user).await
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        self.inner.save(user).await
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        self.inner.find(user_id).await
    }

    async fn delete(&self, user_id: &ID) -> Option<User> {
        self.inner.delete(user_id).await
    }

    async fn resolve_contact(&self, user_id: &ID) -> anyhow::Result<Option<Contact>> {
        let delay = *self.lookup_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(anyhow::Error::msg("Pool timed out"));
        }
        self.inner.resolve_contact(user_id).await
    }
}

pub struct TestContext {
    pub ctx: PillboxContext,
    pub sys: Arc<ManualSys>,
    pub email: Arc<FakeEmailSender>,
    pub push: Arc<FakePushSender>,
    pub reminders: Arc<FlakyReminderRepo>,
    pub users: Arc<FlakyUserRepo>,
}

/// 2024-01-15 10:00:00 UTC
pub fn default_now() -> i64 {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
        .unwrap()
        .timestamp_millis()
}

pub fn setup_with(email: FakeEmailSender, push: FakePushSender) -> TestContext {
    let sys = Arc::new(ManualSys::new(default_now()));
    let email = Arc::new(email);
    let push = Arc::new(push);
    let reminders = Arc::new(FlakyReminderRepo::new());
    let users = Arc::new(FlakyUserRepo::new());

    let mut config = Config::new();
    config.timezone = Tz::UTC;
    config.reminder_dispatch_concurrency = 4;
    config.notification_channel_timeout = Duration::from_millis(200);
    config.reminder_store_timeout = Duration::from_millis(200);
    config.reminder_scan_interval = Duration::from_millis(100);

    let mut repos = Repos::create_inmemory();
    repos.reminders = reminders.clone();
    repos.users = users.clone();

    let ctx = PillboxContext {
        repos,
        config,
        sys: sys.clone(),
        notifications: Notifications {
            email: email.clone(),
            push: push.clone(),
        },
    };

    TestContext {
        ctx,
        sys,
        email,
        push,
        reminders,
        users,
    }
}

pub fn setup() -> TestContext {
    setup_with(FakeEmailSender::default(), FakePushSender::default())
}

pub async fn insert_user(ctx: &PillboxContext, push_token: Option<&str>) -> User {
    let user = User::new(
        "Jane".into(),
        "jane@example.com".into(),
        push_token.map(String::from),
        0,
    );
    ctx.repos.users.insert(&user).await.unwrap();
    user
}

/// Inserts a daily 09:00 reminder that became due at `next_run_at`
pub async fn insert_reminder(
    ctx: &PillboxContext,
    user_id: &ID,
    medicine: &str,
    next_run_at: i64,
) -> Reminder {
    let schedule = ReminderSchedule {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        time_of_day: "09:00".parse().unwrap(),
        frequency: Frequency::Daily,
    };
    let content = ReminderContent::new(medicine, "1 tablet", None).unwrap();
    let reminder = Reminder::new(user_id.clone(), content, schedule, next_run_at, 0);
    ctx.repos.reminders.insert(&reminder).await.unwrap();
    reminder
}
