use chrono_tz::Tz;
use std::{fmt::Display, str::FromStr, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// How often the store is scanned for due `Reminder`s
    pub reminder_scan_interval: Duration,
    /// Maximum number of due `Reminder`s processed concurrently within a cycle
    pub reminder_dispatch_concurrency: usize,
    /// Upper bound for a single send on a notification channel. A slow
    /// email or push provider should not be able to stall a whole cycle.
    pub notification_channel_timeout: Duration,
    /// Upper bound for a single read or write against the reminder store
    /// made by the reminder cycle
    pub reminder_store_timeout: Duration,
    /// Timezone used to interpret the wall clock `time_of_day` and `start_date`
    /// of `Reminder`s
    pub timezone: Tz,
    pub email: Option<EmailSettings>,
    /// Google service account key (JSON) used for sending push notifications
    pub firebase_service_account: Option<String>,
}

#[derive(Clone)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
}

impl std::fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSettings")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("from_name", &self.from_name)
            .finish()
    }
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match std::env::var(key) {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default value: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn new() -> Self {
        let port = parse_env_or("PORT", 5000);

        let scan_interval_secs = match parse_env_or("REMINDER_SCAN_INTERVAL_SECS", 60u64) {
            0 => {
                warn!("REMINDER_SCAN_INTERVAL_SECS must be positive, falling back to 60 seconds.");
                60
            }
            secs => secs,
        };
        let reminder_dispatch_concurrency =
            parse_env_or("REMINDER_DISPATCH_CONCURRENCY", 16usize).max(1);
        let channel_timeout_secs = parse_env_or("REMINDER_CHANNEL_TIMEOUT_SECS", 10u64).max(1);
        let store_timeout_secs = parse_env_or("REMINDER_STORE_TIMEOUT_SECS", 5u64).max(1);

        let timezone = match std::env::var("REMINDER_TIMEZONE") {
            Ok(tz) => match tz.trim().parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given REMINDER_TIMEZONE: {} is not a valid IANA timezone, falling back to UTC.",
                        tz
                    );
                    Tz::UTC
                }
            },
            Err(_) => Tz::UTC,
        };

        let email = match (
            non_empty_env("EMAIL_USERNAME"),
            non_empty_env("EMAIL_APP_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(EmailSettings {
                smtp_host: non_empty_env("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".into()),
                smtp_port: parse_env_or("SMTP_PORT", 587),
                username,
                password,
                from_name: non_empty_env("EMAIL_FROM_NAME")
                    .unwrap_or_else(|| "Pillbox Reminders".into()),
            }),
            _ => {
                info!("EMAIL_USERNAME and EMAIL_APP_PASSWORD are not both set. Reminder emails will not be delivered.");
                None
            }
        };

        let firebase_service_account = non_empty_env("FIREBASE_SERVICE_ACCOUNT");
        if firebase_service_account.is_none() {
            info!("Did not find FIREBASE_SERVICE_ACCOUNT environment variable. Push notifications are disabled.");
        }

        Self {
            port,
            reminder_scan_interval: Duration::from_secs(scan_interval_secs),
            reminder_dispatch_concurrency,
            notification_channel_timeout: Duration::from_secs(channel_timeout_secs),
            reminder_store_timeout: Duration::from_secs(store_timeout_secs),
            timezone,
            email,
            firebase_service_account,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_on_invalid_values() {
        std::env::set_var("PILLBOX_TEST_INVALID_NUMBER", "sixty");
        assert_eq!(parse_env_or("PILLBOX_TEST_INVALID_NUMBER", 60u64), 60);

        std::env::set_var("PILLBOX_TEST_VALID_NUMBER", " 30 ");
        assert_eq!(parse_env_or("PILLBOX_TEST_VALID_NUMBER", 60u64), 30);

        assert_eq!(parse_env_or("PILLBOX_TEST_MISSING_NUMBER", 5usize), 5);
    }

    #[test]
    fn ignores_blank_values() {
        std::env::set_var("PILLBOX_TEST_BLANK", "   ");
        assert_eq!(non_empty_env("PILLBOX_TEST_BLANK"), None);
    }

    #[test]
    fn does_not_leak_email_password_in_debug_output() {
        let settings = EmailSettings {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            username: "reminders@example.com".into(),
            password: "super-secret".into(),
            from_name: "Pillbox Reminders".into(),
        };
        assert!(!format!("{:?}", settings).contains("super-secret"));
    }
}
