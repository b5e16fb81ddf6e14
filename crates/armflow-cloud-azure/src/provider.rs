//! Azure Resource Manager compute resource

use crate::config::ArmConfig;
use crate::facets::ProviderClients;
use crate::locator::find_by_identifier;
use crate::model::{Disk, NetworkInterface, Subnet, Subscription, VirtualMachine, VirtualNetwork, VmSize};
use crate::orchestrator::VmOrchestrator;
use crate::request::{HostVmAttributes, ProvisionRequest, normalize_location};
use crate::resource_id::ResourceId;
use crate::rest::ArmClient;
use armflow_cloud::{
    AuthStatus, Capability, CloudError, ComputeResource, NamedResource, Result, TeardownReport,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Regions offered to the host. Not queried from the provider.
pub const LOCATIONS: [&str; 8] = [
    "Central US",
    "South Central US",
    "North Central US",
    "West Central US",
    "East US",
    "East US 2",
    "West US",
    "West US 2",
];

const INSUFFICIENT_PERMISSIONS: &str = "Your permissions are insufficient";

/// Azure Resource Manager provider
pub struct AzureRmProvider {
    config: ArmConfig,
    clients: ProviderClients,
}

impl AzureRmProvider {
    /// Build REST-backed clients without checking the configuration
    ///
    /// Nothing is contacted until an operation runs; use
    /// `validate_attributes` or `connect` to check the settings first.
    pub fn new(config: ArmConfig) -> Result<Self> {
        let client = ArmClient::new(config.clone())?;
        Ok(Self {
            clients: ProviderClients::from_shared(Arc::new(client)),
            config,
        })
    }

    /// Validate the configuration, then build REST-backed clients
    pub fn connect(config: ArmConfig) -> Result<Self> {
        let clients = ProviderClients::connect(&config)?;
        Ok(Self { config, clients })
    }

    /// Use caller-supplied clients
    pub fn with_clients(config: ArmConfig, clients: ProviderClients) -> Self {
        Self { config, clients }
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    pub fn clients(&self) -> &ProviderClients {
        &self.clients
    }

    /// Create a VM from an already-validated request
    pub async fn provision(&self, request: &ProvisionRequest) -> Result<VirtualMachine> {
        VmOrchestrator::new(&self.clients).create(request).await
    }

    pub async fn resource_groups(&self) -> Result<Vec<String>> {
        let groups = self.clients.resource_groups.list().await?;
        Ok(groups.into_iter().map(|rg| rg.name).collect())
    }

    /// Storage account names, optionally limited to one location
    pub async fn storage_accounts(&self, location: Option<&str>) -> Result<Vec<String>> {
        let accounts = self.clients.storage_accounts.list_all().await?;
        let location = location.map(normalize_location);
        Ok(accounts
            .into_iter()
            .filter(|sa| location_matches(location.as_deref(), &sa.location))
            .map(|sa| sa.name)
            .collect())
    }

    pub async fn virtual_networks(&self, location: Option<&str>) -> Result<Vec<VirtualNetwork>> {
        let vnets = self.clients.virtual_networks.list_all().await?;
        let location = location.map(normalize_location);
        Ok(vnets
            .into_iter()
            .filter(|vnet| location_matches(location.as_deref(), &vnet.location))
            .collect())
    }

    /// Subnets of every virtual network, one listing call per network
    pub async fn subnets(&self, location: Option<&str>) -> Result<Vec<Subnet>> {
        let mut subnets = Vec::new();
        for vnet in self.virtual_networks(location).await? {
            let rg = vnet.resource_group()?;
            subnets.extend(self.clients.subnets.list(&rg, &vnet.name).await?);
        }
        Ok(subnets)
    }

    pub async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        self.clients.subscriptions.list().await
    }

    pub async fn vm_sizes(&self, location: &str) -> Result<Vec<VmSize>> {
        self.clients
            .compute
            .sizes(&normalize_location(location))
            .await
    }

    pub async fn vms(&self) -> Result<Vec<VirtualMachine>> {
        self.clients.compute.list_all().await
    }

    pub async fn new_interface(
        &self,
        resource_group: &str,
        name: &str,
        params: &NetworkInterface,
    ) -> Result<NetworkInterface> {
        tracing::info!("Creating network interface: {}", name);
        self.clients
            .network_interfaces
            .create(resource_group, name, params)
            .await
    }

    pub async fn new_volume(&self, resource_group: &str, name: &str, params: &Disk) -> Result<Disk> {
        tracing::info!("Creating disk: {}", name);
        self.clients.disks.create(resource_group, name, params).await
    }
}

/// Attach a resource ID and the resource group it names
fn with_owning_group(resource: NamedResource, id: String) -> NamedResource {
    let resource = match ResourceId::parse(&id) {
        Ok(parsed) => resource.with_resource_group(parsed.resource_group),
        Err(_) => resource,
    };
    resource.with_id(id)
}

fn location_matches(filter: Option<&str>, location: &str) -> bool {
    filter.is_none_or(|f| normalize_location(location) == f)
}

#[async_trait]
impl ComputeResource for AzureRmProvider {
    type CreateArgs = HostVmAttributes;
    type Vm = VirtualMachine;

    fn name(&self) -> &str {
        "azure-rm"
    }

    fn display_name(&self) -> &str {
        "Azure Resource Manager"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Image]
    }

    fn validate_attributes(&self) -> Result<()> {
        self.config.validate()
    }

    async fn test_connection(&self) -> Result<AuthStatus> {
        match self.clients.subscriptions.list().await {
            Ok(subscriptions) => {
                let account = subscriptions
                    .iter()
                    .find(|s| s.subscription_id == self.config.subscription_id)
                    .map(|s| format!("{} ({})", s.display_name, s.subscription_id))
                    .unwrap_or_else(|| self.config.subscription_id.clone());
                Ok(AuthStatus::ok(account))
            }
            Err(CloudError::NotFound(e)) | Err(CloudError::Permission(e)) => {
                tracing::warn!("Connection test failed: {}", e);
                Err(CloudError::Permission(INSUFFICIENT_PERMISSIONS.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn create_vm(&self, args: &HostVmAttributes) -> Result<VirtualMachine> {
        let request = ProvisionRequest::try_from(args.clone())?;
        self.provision(&request).await
    }

    async fn destroy_vm(&self, identifier: &str) -> Result<TeardownReport> {
        VmOrchestrator::new(&self.clients).destroy(identifier).await
    }

    async fn find_vm_by_uuid(&self, identifier: &str) -> Result<VirtualMachine> {
        find_by_identifier(&self.clients, identifier).await
    }

    fn locations(&self) -> Vec<String> {
        LOCATIONS.iter().map(|l| l.to_string()).collect()
    }

    async fn available_resource_groups(&self) -> Result<Vec<NamedResource>> {
        let groups = self.clients.resource_groups.list().await?;
        Ok(groups
            .into_iter()
            .map(|rg| {
                NamedResource::new(rg.name)
                    .with_id(rg.id)
                    .with_location(rg.location)
            })
            .collect())
    }

    async fn available_networks(&self) -> Result<Vec<NamedResource>> {
        let subnets = self.subnets(None).await?;
        Ok(subnets
            .into_iter()
            .map(|subnet| with_owning_group(NamedResource::new(subnet.name), subnet.id))
            .collect())
    }

    async fn available_images(&self) -> Result<Vec<NamedResource>> {
        let images = self.clients.compute.list_images().await?;
        Ok(images
            .into_iter()
            .map(|image| {
                with_owning_group(
                    NamedResource::new(image.name).with_location(image.location),
                    image.id,
                )
            })
            .collect())
    }
}
