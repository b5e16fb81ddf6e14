//! Azure Resource Manager REST client
//!
//! Direct ARM API implementation. Authenticates with the OAuth2
//! client-credentials grant and implements every provider facet.

use crate::config::ArmConfig;
use crate::error::{ArmError, Result};
use crate::facets::{
    ComputeFacet, DiskFacet, ExtensionFacet, NetworkInterfaceFacet, PublicIpFacet,
    ResourceGroupFacet, StorageAccountFacet, SubnetFacet, SubscriptionFacet, VirtualNetworkFacet,
};
use crate::model::{
    Disk, Image, NetworkInterface, Page, PublicIpAddress, ResourceGroup, StorageAccount, Subnet,
    Subscription, VirtualMachine, VirtualMachineExtension, VirtualNetwork, VmSize,
};
use armflow_cloud::RetryConfig;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;

const COMPUTE_API_VERSION: &str = "2023-09-01";
const DISK_API_VERSION: &str = "2023-04-02";
const NETWORK_API_VERSION: &str = "2023-09-01";
const RESOURCES_API_VERSION: &str = "2022-09-01";
const STORAGE_API_VERSION: &str = "2023-01-01";
const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";

/// Refresh tokens this long before they expire
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// ARM REST client shared by all facets
pub struct ArmClient {
    http: reqwest::Client,
    config: ArmConfig,
    retry: RetryConfig,
    token: Mutex<Option<AccessToken>>,
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl ArmClient {
    pub fn new(config: ArmConfig) -> armflow_cloud::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("armflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ArmError::from)?;
        let retry = config.retry_config();
        Ok(Self {
            http,
            config,
            retry,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    fn url(&self, path: &str, api_version: &str) -> String {
        format!(
            "{}{}?api-version={}",
            self.config.management_endpoint.trim_end_matches('/'),
            path,
            api_version
        )
    }

    fn subscription_path(&self) -> String {
        format!("/subscriptions/{}", self.config.subscription_id)
    }

    fn resource_path(&self, resource_group: &str, resource_type: &str, name: &str) -> String {
        format!(
            "{}/resourceGroups/{}/providers/{}/{}",
            self.subscription_path(),
            resource_group,
            resource_type,
            name
        )
    }

    fn vm_path(&self, resource_group: &str, name: &str) -> String {
        self.resource_path(resource_group, "Microsoft.Compute/virtualMachines", name)
    }

    /// Bearer token for the management endpoint, reused until it nears expiry
    async fn token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() + ChronoDuration::seconds(TOKEN_EXPIRY_MARGIN_SECS) {
                return Ok(token.value.clone());
            }
        }

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.config.authority_host.trim_end_matches('/'),
            self.config.tenant_id
        );
        let scope = format!(
            "{}/.default",
            self.config.management_endpoint.trim_end_matches('/')
        );

        tracing::debug!("Requesting ARM token for tenant {}", self.config.tenant_id);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: TokenError = response.json().await.unwrap_or_default();
            return Err(ArmError::Token(format!(
                "{} ({}): {}",
                body.error.unwrap_or_else(|| "token_request_failed".to_string()),
                status.as_u16(),
                body.error_description.unwrap_or_default()
            )));
        }

        let body: TokenResponse = response.json().await?;
        let expires_in = body
            .expires_in
            .as_ref()
            .and_then(|v| v.as_i64().or_else(|| v.as_str()?.parse().ok()))
            .unwrap_or(3600);

        let value = body.access_token;
        *cached = Some(AccessToken {
            value: value.clone(),
            expires_at: Utc::now() + ChronoDuration::seconds(expires_in),
        });
        Ok(value)
    }

    /// Send an authenticated request, retrying throttled and unavailable
    /// responses. Non-2xx responses become `ArmError::Api`.
    async fn send(&self, method: Method, url: &str, body: Option<&serde_json::Value>) -> Result<Response> {
        let mut attempt = 0;
        loop {
            let token = self.token().await?;
            let mut request = self.http.request(method.clone(), url).bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!("ARM {} {}", method, url);
            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < self.retry.max_attempts {
                let delay = self.retry.delay_for(attempt);
                tracing::warn!(
                    "ARM {} {} returned {}, retrying in {:?}",
                    method,
                    url,
                    status,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(api_error(response).await);
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(Method::GET, url, None).await?;
        Ok(response.json().await?)
    }

    /// GET a collection, following `nextLink` until exhausted
    async fn list_paged<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url).await?;
            items.extend(page.value);
            next = page.next_link.filter(|l| !l.is_empty());
        }
        Ok(items)
    }

    /// PUT a resource and wait for provisioning to finish
    async fn put_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_value(body)?;
        let response = self.send(Method::PUT, url, Some(&payload)).await?;

        match async_operation_url(&response) {
            Some(operation) => {
                self.wait_for_operation(&operation, retry_after_header(&response))
                    .await?;
                self.get_json(url).await
            }
            None => Ok(response.json().await?),
        }
    }

    /// DELETE a resource and wait for the deletion to finish
    async fn delete_resource(&self, url: &str) -> Result<()> {
        let response = self.send(Method::DELETE, url, None).await?;

        // 204 means there was nothing to delete
        if response.status() == StatusCode::NO_CONTENT {
            return Err(ArmError::Api {
                status: 404,
                code: "ResourceNotFound".to_string(),
                message: format!("nothing to delete at {}", strip_query(url)),
            });
        }

        if let Some(operation) = async_operation_url(&response) {
            return self
                .wait_for_operation(&operation, retry_after_header(&response))
                .await;
        }
        if response.status() == StatusCode::ACCEPTED {
            if let Some(location) = header(&response, "location") {
                return self.wait_for_location(&location, retry_after_header(&response)).await;
            }
        }
        Ok(())
    }

    /// Poll an `Azure-AsyncOperation` status URL until it reaches a terminal state
    async fn wait_for_operation(&self, url: &str, retry_after: Option<Duration>) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.config.operation_timeout();
        let mut interval = retry_after.unwrap_or_else(|| self.config.poll_interval());

        loop {
            tokio::time::sleep(interval).await;

            let response = self.send(Method::GET, url, None).await?;
            if let Some(delay) = retry_after_header(&response) {
                interval = delay;
            }
            let status: OperationStatus = response.json().await?;

            match status.status.as_str() {
                "Succeeded" => return Ok(()),
                "Failed" | "Canceled" => {
                    let message = status
                        .error
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_else(|| "no error details".to_string());
                    return Err(ArmError::Operation {
                        status: status.status,
                        message,
                    });
                }
                other => {
                    tracing::debug!("Operation {} is {}", strip_query(url), other);
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ArmError::Timeout(self.config.operation_timeout_secs));
            }
        }
    }

    /// Poll a `Location` URL until it stops answering 202
    async fn wait_for_location(&self, url: &str, retry_after: Option<Duration>) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.config.operation_timeout();
        let mut interval = retry_after.unwrap_or_else(|| self.config.poll_interval());

        loop {
            tokio::time::sleep(interval).await;

            let response = self.send(Method::GET, url, None).await?;
            if response.status() != StatusCode::ACCEPTED {
                return Ok(());
            }
            if let Some(delay) = retry_after_header(&response) {
                interval = delay;
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ArmError::Timeout(self.config.operation_timeout_secs));
            }
        }
    }
}

fn header(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn async_operation_url(response: &Response) -> Option<String> {
    header(response, "azure-asyncoperation")
}

fn retry_after_header(response: &Response) -> Option<Duration> {
    header(response, "retry-after")?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

async fn api_error(response: Response) -> ArmError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => (body.error.code, body.error.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("Unknown").to_string(),
            text,
        ),
    };
    ArmError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenError {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

// ============ Facets ============

#[async_trait]
impl ComputeFacet for ArmClient {
    async fn list_all(&self) -> armflow_cloud::Result<Vec<VirtualMachine>> {
        let path = format!(
            "{}/providers/Microsoft.Compute/virtualMachines",
            self.subscription_path()
        );
        Ok(self.list_paged(&self.url(&path, COMPUTE_API_VERSION)).await?)
    }

    async fn get(&self, resource_group: &str, name: &str) -> armflow_cloud::Result<VirtualMachine> {
        let url = self.url(&self.vm_path(resource_group, name), COMPUTE_API_VERSION);
        Ok(self.get_json(&url).await?)
    }

    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        vm: &VirtualMachine,
    ) -> armflow_cloud::Result<VirtualMachine> {
        let url = self.url(&self.vm_path(resource_group, name), COMPUTE_API_VERSION);
        Ok(self.put_json(&url, vm).await?)
    }

    async fn delete(&self, resource_group: &str, name: &str) -> armflow_cloud::Result<()> {
        let url = self.url(&self.vm_path(resource_group, name), COMPUTE_API_VERSION);
        Ok(self.delete_resource(&url).await?)
    }

    async fn sizes(&self, location: &str) -> armflow_cloud::Result<Vec<VmSize>> {
        let path = format!(
            "{}/providers/Microsoft.Compute/locations/{}/vmSizes",
            self.subscription_path(),
            location
        );
        Ok(self.list_paged(&self.url(&path, COMPUTE_API_VERSION)).await?)
    }

    async fn list_images(&self) -> armflow_cloud::Result<Vec<Image>> {
        let path = format!("{}/providers/Microsoft.Compute/images", self.subscription_path());
        Ok(self.list_paged(&self.url(&path, COMPUTE_API_VERSION)).await?)
    }
}

#[async_trait]
impl NetworkInterfaceFacet for ArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> armflow_cloud::Result<NetworkInterface> {
        let path = self.resource_path(resource_group, "Microsoft.Network/networkInterfaces", name);
        Ok(self.get_json(&self.url(&path, NETWORK_API_VERSION)).await?)
    }

    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        nic: &NetworkInterface,
    ) -> armflow_cloud::Result<NetworkInterface> {
        let path = self.resource_path(resource_group, "Microsoft.Network/networkInterfaces", name);
        Ok(self.put_json(&self.url(&path, NETWORK_API_VERSION), nic).await?)
    }

    async fn delete(&self, resource_group: &str, name: &str) -> armflow_cloud::Result<()> {
        let path = self.resource_path(resource_group, "Microsoft.Network/networkInterfaces", name);
        Ok(self.delete_resource(&self.url(&path, NETWORK_API_VERSION)).await?)
    }
}

#[async_trait]
impl PublicIpFacet for ArmClient {
    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        ip: &PublicIpAddress,
    ) -> armflow_cloud::Result<PublicIpAddress> {
        let path = self.resource_path(resource_group, "Microsoft.Network/publicIPAddresses", name);
        Ok(self.put_json(&self.url(&path, NETWORK_API_VERSION), ip).await?)
    }

    async fn delete(&self, resource_group: &str, name: &str) -> armflow_cloud::Result<()> {
        let path = self.resource_path(resource_group, "Microsoft.Network/publicIPAddresses", name);
        Ok(self.delete_resource(&self.url(&path, NETWORK_API_VERSION)).await?)
    }
}

#[async_trait]
impl DiskFacet for ArmClient {
    async fn create(&self, resource_group: &str, name: &str, disk: &Disk) -> armflow_cloud::Result<Disk> {
        let path = self.resource_path(resource_group, "Microsoft.Compute/disks", name);
        Ok(self.put_json(&self.url(&path, DISK_API_VERSION), disk).await?)
    }

    async fn delete(&self, resource_group: &str, name: &str) -> armflow_cloud::Result<()> {
        let path = self.resource_path(resource_group, "Microsoft.Compute/disks", name);
        Ok(self.delete_resource(&self.url(&path, DISK_API_VERSION)).await?)
    }
}

#[async_trait]
impl ExtensionFacet for ArmClient {
    async fn create(
        &self,
        resource_group: &str,
        vm_name: &str,
        extension_name: &str,
        extension: &VirtualMachineExtension,
    ) -> armflow_cloud::Result<VirtualMachineExtension> {
        let path = format!(
            "{}/extensions/{}",
            self.vm_path(resource_group, vm_name),
            extension_name
        );
        Ok(self
            .put_json(&self.url(&path, COMPUTE_API_VERSION), extension)
            .await?)
    }
}

#[async_trait]
impl SubscriptionFacet for ArmClient {
    async fn list(&self) -> armflow_cloud::Result<Vec<Subscription>> {
        Ok(self
            .list_paged(&self.url("/subscriptions", SUBSCRIPTIONS_API_VERSION))
            .await?)
    }
}

#[async_trait]
impl ResourceGroupFacet for ArmClient {
    async fn list(&self) -> armflow_cloud::Result<Vec<ResourceGroup>> {
        let path = format!("{}/resourcegroups", self.subscription_path());
        Ok(self.list_paged(&self.url(&path, RESOURCES_API_VERSION)).await?)
    }
}

#[async_trait]
impl StorageAccountFacet for ArmClient {
    async fn list_all(&self) -> armflow_cloud::Result<Vec<StorageAccount>> {
        let path = format!(
            "{}/providers/Microsoft.Storage/storageAccounts",
            self.subscription_path()
        );
        Ok(self.list_paged(&self.url(&path, STORAGE_API_VERSION)).await?)
    }
}

#[async_trait]
impl VirtualNetworkFacet for ArmClient {
    async fn list_all(&self) -> armflow_cloud::Result<Vec<VirtualNetwork>> {
        let path = format!(
            "{}/providers/Microsoft.Network/virtualNetworks",
            self.subscription_path()
        );
        Ok(self.list_paged(&self.url(&path, NETWORK_API_VERSION)).await?)
    }
}

#[async_trait]
impl SubnetFacet for ArmClient {
    async fn list(
        &self,
        resource_group: &str,
        virtual_network: &str,
    ) -> armflow_cloud::Result<Vec<Subnet>> {
        let path = format!(
            "{}/subnets",
            self.resource_path(
                resource_group,
                "Microsoft.Network/virtualNetworks",
                virtual_network
            )
        );
        Ok(self.list_paged(&self.url(&path, NETWORK_API_VERSION)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let config = ArmConfig {
            management_endpoint: "https://management.azure.com/".to_string(),
            ..ArmConfig::new("app", "secret", "tenant", "sub-1")
        };
        let client = ArmClient::new(config).unwrap();

        assert_eq!(
            client.url(&client.vm_path("web-rg", "web01"), COMPUTE_API_VERSION),
            "https://management.azure.com/subscriptions/sub-1/resourceGroups/web-rg/providers/Microsoft.Compute/virtualMachines/web01?api-version=2023-09-01"
        );
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("https://x/ops/1?api-version=1"), "https://x/ops/1");
        assert_eq!(strip_query("https://x/ops/1"), "https://x/ops/1");
    }
}
