mod smtp;

use async_trait::async_trait;

pub use smtp::SmtpNotifier;

use crate::models::NotificationMessage;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid email address format: {0}")]
    AddressFormat(#[from] lettre::address::AddressError),

    #[error("Failed to build email message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    SmtpTransport(#[from] lettre::transport::smtp::Error),
}

/// Delivers a finished notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError>;
}
