use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{
    config::EmailConfig,
    models::NotificationMessage,
    notifier::{Notifier, NotifyError},
};

pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// STARTTLS relay with credentials. Connecting, handshaking and sending
    /// are all bounded by the configured timeout.
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(creds)
            .timeout(Some(config.timeout()))
            .build();

        tracing::info!(
            "SMTP relay configured for {}:{} with a {}s timeout",
            config.host,
            config.port,
            config.timeout_secs
        );

        Ok(Self { mailer })
    }
}

fn mailbox(name: &str, address: &str) -> Result<Mailbox, NotifyError> {
    Ok(Mailbox::new(Some(name.to_string()), address.parse::<Address>()?))
}

pub(crate) fn build_email(message: &NotificationMessage) -> Result<Message, NotifyError> {
    let email = Message::builder()
        .from(mailbox(&message.sender_name, &message.sender_address)?)
        .to(message.recipient.parse::<Mailbox>()?)
        .reply_to(mailbox(&message.reply_to_name, &message.reply_to_address)?)
        .subject(message.subject_line.clone())
        .multipart(MultiPart::alternative_plain_html(
            message.body_text.clone(),
            message.body_html.clone(),
        ))?;

    Ok(email)
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        let email = build_email(message)?;

        tracing::info!(
            "Sending notification to '{}' with subject '{}'",
            message.recipient,
            message.subject_line
        );

        self.mailer.send(email).await?;

        tracing::info!("Notification to {} sent successfully", message.recipient);

        Ok(())
    }
}
