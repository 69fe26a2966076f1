use std::fmt;

/// What the submitter is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Contact,
    Appointment,
}

impl Purpose {
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Contact),
            1 => Some(Self::Appointment),
            _ => None,
        }
    }

    /// Label used in the outgoing subject and body.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contact => "İletişim",
            Self::Appointment => "Randevu",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A sanitized and validated form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub purpose: Purpose,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Empty when the submitter left it out
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl Submission {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub recipient: String,
    pub sender_address: String,
    pub sender_name: String,
    pub reply_to_address: String,
    pub reply_to_name: String,
    pub subject_line: String,
    pub body_text: String,
    pub body_html: String,
}
