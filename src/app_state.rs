use reqwest::Client;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::coolify::client::CoolifyClient;
use crate::coolify::platform::DeploymentPlatform;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Process-wide settings, read once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Coolify API root, already suffixed with `/api/v1`.
    pub api_url: String,
    pub api_key: String,
    pub webhook_secret: String,
    pub require_signature: bool,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let base_url = required("COOLIFY_API_URL")?;
        let api_key = required("COOLIFY_API_KEY")?;
        let webhook_secret = required("WEBHOOKS_SECRET")?;

        let require_signature = match lookup("REQUIRE_SIGNATURE") {
            Some(value) => parse_bool("REQUIRE_SIGNATURE", &value)?,
            None => false,
        };

        let host = lookup("HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "REQUEST_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(AppConfig {
            api_url: format!("{}/api/v1", base_url.trim_end_matches('/')),
            api_key,
            webhook_secret,
            require_signature,
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

pub struct AppState {
    pub platform: Arc<dyn DeploymentPlatform>,
    pub webhook_secret: String,
    pub require_signature: bool,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(config: &AppConfig, platform: Arc<dyn DeploymentPlatform>) -> Self {
        AppState {
            platform,
            webhook_secret: config.webhook_secret.clone(),
            require_signature: config.require_signature,
            request_timeout: config.request_timeout,
        }
    }
}

pub fn build_app_state(config: &AppConfig) -> Result<AppState, ConfigError> {
    let client = Client::builder().build()?;
    let platform = CoolifyClient::new(client, &config.api_url, &config.api_key);

    Ok(AppState::new(config, Arc::new(platform)))
}
