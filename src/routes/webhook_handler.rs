//! Push-event entry point.
//!
//! Every request lands here regardless of path. POSTs carrying a Gitea push
//! event are verified, matched against the Coolify application directory and
//! turned into a deployment; everything else is a plain 404.

use crate::app_state::AppState;
use crate::coolify::matcher::find_application;
use crate::coolify::platform::PlatformError;
use crate::gitea::models::extract_repo_info;
use crate::utils::{verify_signature, SignatureError};

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

const HEADER_SIGNATURE: &str = "x-gitea-signature";

/// Deployments are never forced.
const FORCE_DEPLOY: bool = false;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Content-Type must be application/json")]
    UnsupportedContentType,

    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Missing signature")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Missing repository name or branch")]
    MissingRepoInfo,

    #[error("No matching repository and branch")]
    NoMatch,

    #[error("fetching application directory: {0}")]
    DirectoryFetch(PlatformError),

    #[error("triggering deployment: {0}")]
    Trigger(PlatformError),
}

impl From<SignatureError> for WebhookError {
    fn from(_: SignatureError) -> Self {
        WebhookError::InvalidJson
    }
}

impl WebhookError {
    fn status(&self) -> StatusCode {
        match self {
            WebhookError::UnsupportedContentType
            | WebhookError::InvalidJson
            | WebhookError::MissingRepoInfo => StatusCode::BAD_REQUEST,
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::FORBIDDEN
            }
            WebhookError::NoMatch => StatusCode::NOT_FOUND,
            WebhookError::DirectoryFetch(_) | WebhookError::Trigger(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Upstream details stay in the log.
        let message = if status.is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Router fallback: non-POST requests get a plain-text 404.
///
/// The body is left unread until the method and content type have been
/// checked.
pub async fn dispatch(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    if req.method() != Method::POST {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    let span = info_span!("webhook", delivery = %Uuid::new_v4());
    match webhook_handler(&state, req).instrument(span).await {
        Ok(message) => (StatusCode::OK, Json(json!({ "message": message }))).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn webhook_handler(
    state: &AppState,
    req: Request<Body>,
) -> Result<&'static str, WebhookError> {
    let deadline = Instant::now() + state.request_timeout;
    let (parts, body) = req.into_parts();
    let headers = &parts.headers;

    // 1. Content type
    if !is_json_content_type(headers) {
        warn!("Rejected request with non-JSON content type");
        return Err(WebhookError::UnsupportedContentType);
    }

    // 2. Body
    let body_bytes = to_bytes(body, usize::MAX).await.map_err(|e| {
        warn!(error = %e, "Failed to read request body");
        WebhookError::InvalidJson
    })?;

    let payload = std::str::from_utf8(&body_bytes).map_err(|_| {
        warn!("Body is not valid UTF-8");
        WebhookError::InvalidJson
    })?;

    // 3. Signature
    // A header that is not valid text still counts as present.
    match headers
        .get(HEADER_SIGNATURE)
        .map(|v| v.to_str().unwrap_or_default())
    {
        Some(signature) => {
            let valid = verify_signature(payload, signature, &state.webhook_secret).map_err(|e| {
                warn!(error = %e, "Error parsing JSON");
                WebhookError::from(e)
            })?;
            if !valid {
                warn!("Invalid HMAC signature");
                return Err(WebhookError::InvalidSignature);
            }
        }
        None if state.require_signature => {
            warn!("Missing {} header", HEADER_SIGNATURE);
            return Err(WebhookError::MissingSignature);
        }
        None => {
            warn!("No signature header; processing unauthenticated request");
        }
    }

    // 4. Payload
    let parsed: serde_json::Value = serde_json::from_str(payload).map_err(|e| {
        warn!(error = %e, "Error parsing JSON");
        WebhookError::InvalidJson
    })?;

    let info = extract_repo_info(&parsed).ok_or_else(|| {
        warn!("Payload is missing repository name or branch");
        WebhookError::MissingRepoInfo
    })?;

    info!(repository = %info.repo_name, branch = %info.branch, "📦 Push event received");

    // 5. Directory lookup
    let apps = bounded(deadline, state.platform.list_applications())
        .await
        .map_err(|e| {
            error!(error = %e, "Error fetching application directory");
            WebhookError::DirectoryFetch(e)
        })?;

    let Some(app) = find_application(&apps, &info) else {
        info!(
            repository = %info.repo_name,
            branch = %info.branch,
            "No matching repository and branch found in the application list"
        );
        return Err(WebhookError::NoMatch);
    };

    info!(
        uuid = %app.uuid,
        app = app.name.as_deref().unwrap_or_default(),
        repository = app.git_repository.as_deref().unwrap_or_default(),
        branch = %info.branch,
        "✅ Match found"
    );

    // 6. Trigger
    let response = bounded(deadline, state.platform.trigger_deploy(&app.uuid, FORCE_DEPLOY))
        .await
        .map_err(|e| {
            error!(uuid = %app.uuid, error = %e, "Error triggering the deployment");
            WebhookError::Trigger(e)
        })?;

    info!(uuid = %app.uuid, response = %response, "🚀 Deployment triggered");
    Ok("Deployment triggered successfully")
}

/// Runs an outbound call against the request's deadline.
async fn bounded<T, F>(deadline: Instant, call: F) -> Result<T, PlatformError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    timeout_at(deadline, call)
        .await
        .unwrap_or(Err(PlatformError::Timeout))
}

/// The whole header, trimmed and lower-cased, must be `application/json`;
/// parameters such as `; charset=utf-8` are not accepted.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
