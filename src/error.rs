use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use std::time::Duration;

use crate::{
    dto::{PrettyJson, StatusResponse},
    notifier::NotifyError,
};

/// Every way a submission can be turned away.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Only POST requests are allowed")]
    MethodNotAllowed,

    #[error("Too many requests. Please wait before trying again.")]
    RateLimited { retry_after: Duration },

    #[error("Invalid JSON")]
    MalformedJson,

    #[error("Invalid purpose value. Use 0 for contact and 1 for appointment")]
    InvalidPurpose,

    #[error("Invalid email format")]
    InvalidEmailFormat,

    #[error("All fields are required")]
    MissingRequiredField,

    #[error("Error sending email: {0}")]
    Dispatch(#[from] NotifyError),
}

impl ContactError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::MalformedJson
            | Self::InvalidPurpose
            | Self::InvalidEmailFormat
            | Self::MissingRequiredField => StatusCode::BAD_REQUEST,
            Self::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let body = PrettyJson(self.status_code(), StatusResponse::error(self.to_string()));

        match self {
            Self::RateLimited { retry_after } => (
                [(header::RETRY_AFTER, retry_after.as_secs().to_string())],
                body,
            )
                .into_response(),
            _ => body.into_response(),
        }
    }
}
