use serde_json::Value;

use std::sync::Arc;

use crate::{
    error::ContactError,
    models::{NotificationMessage, Submission},
    notifier::Notifier,
    validation,
};

pub const SENDER_NAME: &str = "Web Site";

#[derive(Clone)]
pub struct ContactService {
    notifier: Arc<dyn Notifier>,
    recipient: String,
}

impl ContactService {
    pub fn new(notifier: Arc<dyn Notifier>, recipient: impl Into<String>) -> Self {
        Self {
            notifier,
            recipient: recipient.into(),
        }
    }

    /// Validate a decoded request body and relay it. Nothing is sent unless
    /// every check passes.
    pub async fn submit(&self, payload: &Value) -> Result<(), ContactError> {
        let submission = validation::validate(payload)?;
        let message = self.build_message(&submission);

        tracing::info!(
            "Dispatching {} request with subject '{}'",
            submission.purpose,
            message.subject_line
        );

        self.notifier.send(&message).await?;

        Ok(())
    }

    pub fn build_message(&self, submission: &Submission) -> NotificationMessage {
        let label = submission.purpose.label();

        let phone_line = if submission.phone.is_empty() {
            "Telefon: Belirtilmemiş".to_string()
        } else {
            format!("Telefon: {}", submission.phone)
        };

        let body_text = format!(
            "{} {} isimli kişi {label} için talepte bulundu.\nMesaj: {}\n{phone_line}\nE-Posta: {}",
            submission.first_name, submission.last_name, submission.message, submission.email
        );

        NotificationMessage {
            recipient: self.recipient.clone(),
            sender_address: self.recipient.clone(),
            sender_name: SENDER_NAME.to_string(),
            reply_to_address: submission.email.clone(),
            reply_to_name: submission.full_name(),
            subject_line: format!("{label}: {}", submission.subject),
            body_html: body_text.replace('\n', "<br />\n"),
            body_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Purpose;

    struct Unused;

    #[async_trait::async_trait]
    impl Notifier for Unused {
        async fn send(
            &self,
            _message: &NotificationMessage,
        ) -> Result<(), crate::notifier::NotifyError> {
            unreachable!("message construction does not send")
        }
    }

    fn service() -> ContactService {
        ContactService::new(Arc::new(Unused), "forms@example.com")
    }

    fn submission(purpose: Purpose, phone: &str) -> Submission {
        Submission {
            purpose,
            first_name: "Ayşe".to_string(),
            last_name: "Yılmaz".to_string(),
            email: "ayse@example.com".to_string(),
            phone: phone.to_string(),
            subject: "A, B".to_string(),
            message: "Merhaba".to_string(),
        }
    }

    #[test]
    fn contact_message_layout() {
        let message = service().build_message(&submission(Purpose::Contact, "555 01 02"));

        assert_eq!(message.subject_line, "İletişim: A, B");
        assert_eq!(
            message.body_text,
            "Ayşe Yılmaz isimli kişi İletişim için talepte bulundu.\n\
             Mesaj: Merhaba\n\
             Telefon: 555 01 02\n\
             E-Posta: ayse@example.com"
        );
        assert_eq!(message.recipient, "forms@example.com");
        assert_eq!(message.sender_address, "forms@example.com");
        assert_eq!(message.sender_name, "Web Site");
        assert_eq!(message.reply_to_address, "ayse@example.com");
        assert_eq!(message.reply_to_name, "Ayşe Yılmaz");
    }

    #[test]
    fn appointment_without_phone() {
        let message = service().build_message(&submission(Purpose::Appointment, ""));

        assert_eq!(message.subject_line, "Randevu: A, B");
        assert!(message.body_text.contains("\nTelefon: Belirtilmemiş\n"));
        assert!(message.body_text.starts_with("Ayşe Yılmaz isimli kişi Randevu için"));
    }

    #[test]
    fn html_body_breaks_lines() {
        let message = service().build_message(&submission(Purpose::Contact, ""));

        assert_eq!(
            message.body_html,
            "Ayşe Yılmaz isimli kişi İletişim için talepte bulundu.<br />\n\
             Mesaj: Merhaba<br />\n\
             Telefon: Belirtilmemiş<br />\n\
             E-Posta: ayse@example.com"
        );
    }
}
