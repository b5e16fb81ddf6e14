//! Compute resource trait definition

use crate::error::Result;
use crate::report::TeardownReport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Compute resource abstraction trait
///
/// The host plugs provider adapters in through this trait. Adapters own the
/// translation from these generic operations into ordered provider calls.
#[async_trait]
pub trait ComputeResource: Send + Sync {
    /// Provider-specific VM creation arguments
    type CreateArgs: Send + Sync;

    /// Provider-side VM handle
    type Vm: Send;

    /// Returns the provider name (e.g., "azure-rm")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Label shown for a configured compute resource
    fn to_label(&self, resource_name: &str) -> String {
        format!("{} ({})", resource_name, self.display_name())
    }

    fn capabilities(&self) -> &[Capability];

    /// Check that every required connection attribute is present
    fn validate_attributes(&self) -> Result<()>;

    /// Hook run by the host before a compute resource is saved
    async fn before_create(&self) -> Result<AuthStatus> {
        self.validate_attributes()?;
        self.test_connection().await
    }

    /// Verify credentials with a lightweight read
    async fn test_connection(&self) -> Result<AuthStatus>;

    /// Create a VM with all of its dependent resources
    async fn create_vm(&self, args: &Self::CreateArgs) -> Result<Self::Vm>;

    /// Destroy a VM and reclaim its dependent resources.
    /// Succeeds without side effects when the VM does not exist.
    async fn destroy_vm(&self, identifier: &str) -> Result<TeardownReport>;

    /// Resolve a host-level identifier to the provider's VM handle
    async fn find_vm_by_uuid(&self, identifier: &str) -> Result<Self::Vm>;

    fn locations(&self) -> Vec<String>;

    async fn available_resource_groups(&self) -> Result<Vec<NamedResource>>;

    async fn available_networks(&self) -> Result<Vec<NamedResource>>;

    async fn available_images(&self) -> Result<Vec<NamedResource>>;
}

/// Optional features a compute resource supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Image-based provisioning
    Image,
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
        }
    }
}

/// Name-bearing resource descriptor returned by "list available" queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,

    /// Provider resource ID, when the resource has one
    pub id: Option<String>,

    pub location: Option<String>,

    pub resource_group: Option<String>,
}

impl NamedResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            location: None,
            resource_group: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group = Some(resource_group.into());
        self
    }
}

/// Retry configuration for provider operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_delay: std::time::Duration,

    /// Maximum delay between retries
    pub max_delay: std::time::Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Delay before the given attempt (0-based), capped at `max_delay`
    pub fn delay_for(&self, attempt: u32) -> std::time::Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: std::time::Duration::from_secs(1),
            max_delay: std::time::Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}
