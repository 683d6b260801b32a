use crate::config::EmailSettings;
use askama::Template;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use pillbox_domain::{Contact, ReminderNotification};

/// Primary notification channel
#[async_trait::async_trait]
pub trait IEmailSender: Send + Sync {
    async fn send_reminder(
        &self,
        contact: &Contact,
        notification: &ReminderNotification,
    ) -> anyhow::Result<()>;
}

#[derive(Template)]
#[template(path = "reminder_email.html")]
struct ReminderEmail<'a> {
    notification: &'a ReminderNotification,
}

/// Html body of the reminder email, every value is escaped
fn render_reminder_email(notification: &ReminderNotification) -> anyhow::Result<String> {
    Ok(ReminderEmail { notification }.render()?)
}

pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(settings: &EmailSettings) -> anyhow::Result<Self> {
        let from: Mailbox =
            format!("{} <{}>", settings.from_name, settings.username).parse()?;
        let creds = Credentials::new(settings.username.clone(), settings.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
            .port(settings.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, from })
    }
}

#[async_trait::async_trait]
impl IEmailSender for SmtpEmailSender {
    async fn send_reminder(
        &self,
        contact: &Contact,
        notification: &ReminderNotification,
    ) -> anyhow::Result<()> {
        let to: Mailbox = contact.email.parse()?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.email_subject())
            .header(ContentType::TEXT_HTML)
            .body(render_reminder_email(notification)?)?;

        self.mailer.send(email).await?;
        Ok(())
    }
}

/// Used when no SMTP credentials are configured. Every send fails so that
/// the missing channel shows up in the logs of each cycle.
pub struct UnconfiguredEmailSender {}

#[async_trait::async_trait]
impl IEmailSender for UnconfiguredEmailSender {
    async fn send_reminder(
        &self,
        contact: &Contact,
        _notification: &ReminderNotification,
    ) -> anyhow::Result<()> {
        Err(anyhow::Error::msg(format!(
            "Email is not configured, unable to notify: {}",
            contact.email
        )))
    }
}
