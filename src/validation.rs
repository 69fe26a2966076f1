//! Turns the raw JSON payload into a [`Submission`].
//!
//! The checks run in a fixed order and the first failure wins: purpose,
//! email format, then required fields. A blank email is therefore reported
//! as a format error rather than a missing field.

use serde_json::Value;
use tracing::debug;
use validator::ValidateEmail;

use crate::{
    error::ContactError,
    models::{Purpose, Submission},
};

/// `purpose` must be the JSON integer 0 or 1. Strings, floats and booleans
/// are refused even when they look equivalent.
pub fn parse_purpose(payload: &Value) -> Result<Purpose, ContactError> {
    payload
        .get("purpose")
        .and_then(Value::as_u64)
        .and_then(Purpose::from_code)
        .ok_or(ContactError::InvalidPurpose)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn sanitize(text: &str) -> String {
    escape_html(text.trim())
}

/// Scalar field as text. Missing, `null` and structured values read as empty.
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "1".to_string(),
        _ => String::new(),
    }
}

/// `subject` may be a single string or a list that gets joined with ", ".
pub fn flatten_subject(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|part| scalar_text(Some(part)))
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

pub fn validate(payload: &Value) -> Result<Submission, ContactError> {
    let purpose = parse_purpose(payload)?;

    let field = |name: &str| sanitize(&scalar_text(payload.get(name)));

    let submission = Submission {
        purpose,
        first_name: field("firstName"),
        last_name: field("lastName"),
        email: field("email"),
        phone: field("phone"),
        subject: flatten_subject(payload.get("subject")),
        message: field("message"),
    };

    if !is_valid_email(&submission.email) {
        debug!(email = %submission.email, "Rejected submission with malformed email");
        return Err(ContactError::InvalidEmailFormat);
    }

    let required = [
        &submission.first_name,
        &submission.last_name,
        &submission.email,
        &submission.message,
    ];
    if required.iter().any(|value| value.is_empty()) || submission.subject.trim().is_empty() {
        debug!("Rejected submission with missing fields");
        return Err(ContactError::MissingRequiredField);
    }

    Ok(submission)
}
