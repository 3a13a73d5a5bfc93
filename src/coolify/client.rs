use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::coolify::models::Application;
use crate::coolify::platform::{DeploymentPlatform, PlatformError};

/// Coolify REST API client. `api_url` is the `/api/v1` root.
pub struct CoolifyClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl CoolifyClient {
    pub fn new(client: Client, api_url: &str, api_key: &str) -> Self {
        CoolifyClient {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn check(res: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        Err(PlatformError::Status { status, body })
    }
}

#[async_trait]
impl DeploymentPlatform for CoolifyClient {
    async fn list_applications(&self) -> Result<Vec<Application>, PlatformError> {
        let url = format!("{}/applications", self.api_url);

        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let apps: Vec<Application> = Self::check(res).await?.json().await?;
        debug!(count = apps.len(), "Fetched application directory");
        Ok(apps)
    }

    async fn trigger_deploy(&self, uuid: &str, force: bool) -> Result<Value, PlatformError> {
        let url = format!("{}/deploy", self.api_url);

        let res = self
            .client
            .post(&url)
            .query(&[("uuid", uuid.to_string()), ("force", force.to_string())])
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        Ok(Self::check(res).await?.json().await?)
    }
}
