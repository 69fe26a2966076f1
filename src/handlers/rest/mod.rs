use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use serde_json::Value;

use std::{net::SocketAddr, sync::Arc};

use crate::{
    AppState,
    dto::{PrettyJson, StatusResponse},
    error::ContactError,
    limiter::RateLimitResult,
};

pub const SUCCESS_MESSAGE: &str = "Email send successfully!";

#[debug_handler]
pub async fn submit(State(state): State<Arc<AppState>>, request: Request) -> Response {
    match handle_submission(&state, request).await {
        Ok(()) => {
            PrettyJson(StatusCode::OK, StatusResponse::success(SUCCESS_MESSAGE)).into_response()
        }
        Err(e) => {
            match &e {
                ContactError::Dispatch(source) => {
                    tracing::error!("failed to dispatch notification: {source}");
                }
                other => tracing::info!("rejected submission: {other}"),
            }
            e.into_response()
        }
    }
}

async fn handle_submission(state: &AppState, request: Request) -> Result<(), ContactError> {
    if request.method() != Method::POST {
        return Err(ContactError::MethodNotAllowed);
    }

    let key = client_key(&request, state.trust_forwarded_for);
    if let RateLimitResult::Limited { retry_after } = state.limiter.check(&key).await {
        return Err(ContactError::RateLimited { retry_after });
    }

    let body = axum::body::to_bytes(request.into_body(), state.max_body_bytes)
        .await
        .map_err(|e| {
            tracing::debug!("failed to read request body: {e}");
            ContactError::MalformedJson
        })?;
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("request body is not valid JSON: {e}");
        ContactError::MalformedJson
    })?;

    state.service.submit(&payload).await
}

/// Identity used for rate limiting.
fn client_key(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for && let Some(forwarded) = forwarded_client(request.headers()) {
        return forwarded;
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string())
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|entry| !entry.is_empty())
        .map(ToString::to_string)
}
