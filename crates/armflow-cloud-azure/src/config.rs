//! Connection configuration shared by every provider client

use armflow_cloud::{CloudError, RetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Azure Resource Manager connection settings
///
/// The host stores these as `url` (application identity), `user`
/// (subscription), `password` (secret) and `uuid` (tenant); the aliases
/// accept that attribute layout directly.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ArmConfig {
    #[serde(default, alias = "app_ident", alias = "url")]
    pub client_id: String,

    #[serde(default, alias = "secret_key", alias = "password")]
    pub client_secret: String,

    #[serde(default, alias = "tenant", alias = "uuid")]
    pub tenant_id: String,

    #[serde(default, alias = "sub_id", alias = "user")]
    pub subscription_id: String,

    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,

    #[serde(default = "default_authority_host")]
    pub authority_host: String,

    /// Seconds between long-running operation polls when the provider sends
    /// no `Retry-After`
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,

    /// Retries for throttled (429) and unavailable (5xx) responses
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_management_endpoint() -> String {
    DEFAULT_MANAGEMENT_ENDPOINT.to_string()
}

fn default_authority_host() -> String {
    DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_operation_timeout() -> u64 {
    1800
}

fn default_max_retries() -> u32 {
    3
}

impl ArmConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
            subscription_id: subscription_id.into(),
            management_endpoint: default_management_endpoint(),
            authority_host: default_authority_host(),
            poll_interval_secs: default_poll_interval(),
            operation_timeout_secs: default_operation_timeout(),
            max_retries: default_max_retries(),
        }
    }

    /// Create ArmConfig from environment variables
    pub fn from_env() -> Self {
        Self {
            management_endpoint: default_management_endpoint(),
            authority_host: default_authority_host(),
            poll_interval_secs: default_poll_interval(),
            operation_timeout_secs: default_operation_timeout(),
            max_retries: default_max_retries(),
            ..Default::default()
        }
        .with_env_overrides()
    }

    /// Overlay any `AZURE_*` environment variables that are set
    pub fn with_env_overrides(mut self) -> Self {
        let overrides: [(&str, &mut String); 6] = [
            ("AZURE_CLIENT_ID", &mut self.client_id),
            ("AZURE_CLIENT_SECRET", &mut self.client_secret),
            ("AZURE_TENANT_ID", &mut self.tenant_id),
            ("AZURE_SUBSCRIPTION_ID", &mut self.subscription_id),
            ("AZURE_MANAGEMENT_ENDPOINT", &mut self.management_endpoint),
            ("AZURE_AUTHORITY_HOST", &mut self.authority_host),
        ];
        for (key, field) in overrides {
            if let Ok(value) = std::env::var(key) {
                if !value.is_empty() {
                    *field = value;
                }
            }
        }
        self
    }

    /// Check every required connection attribute is present
    pub fn validate(&self) -> armflow_cloud::Result<()> {
        let missing: Vec<&str> = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("tenant_id", &self.tenant_id),
            ("subscription_id", &self.subscription_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(CloudError::Validation(format!(
                "missing connection attributes: {}",
                missing.join(", ")
            )));
        }

        for endpoint in [&self.management_endpoint, &self.authority_host] {
            reqwest::Url::parse(endpoint).map_err(|e| {
                CloudError::Validation(format!("invalid endpoint URL {}: {}", endpoint, e))
            })?;
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retries,
            ..RetryConfig::default()
        }
    }
}

impl std::fmt::Debug for ArmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("subscription_id", &self.subscription_id)
            .field("management_endpoint", &self.management_endpoint)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}
