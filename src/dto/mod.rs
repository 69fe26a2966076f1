use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// JSON body rendered with a four space indent.
pub struct PrettyJson<T>(pub StatusCode, pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

        match self.1.serialize(&mut serializer) {
            Ok(()) => (
                self.0,
                [(header::CONTENT_TYPE, "application/json")],
                buf,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("failed to serialize response body: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render response").into_response()
            }
        }
    }
}
