pub mod webhook_handler;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;

use crate::app_state::AppState;
use crate::routes::webhook_handler::dispatch;

/// Every method and path goes to the webhook dispatcher. Push payloads have
/// no size cap.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(DefaultBodyLimit::disable())
        .with_state(Arc::new(state))
}
