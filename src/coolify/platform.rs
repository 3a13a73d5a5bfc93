use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::coolify::models::Application;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("timed out waiting for the deployment platform")]
    Timeout,
}

/// The two operations the relay needs from the deployment platform.
#[async_trait]
pub trait DeploymentPlatform: Send + Sync {
    /// Fetches the full application directory. Never cached.
    async fn list_applications(&self) -> Result<Vec<Application>, PlatformError>;

    /// Starts a deployment of the application identified by `uuid` and
    /// returns the platform's response body.
    async fn trigger_deploy(&self, uuid: &str, force: bool) -> Result<Value, PlatformError>;
}
