//! Provider client facets
//!
//! One trait per resource kind. The orchestration code only ever talks to
//! the provider through these; `ArmClient` implements all of them over the
//! REST API, and tests substitute in-memory implementations.

use crate::config::ArmConfig;
use crate::model::{
    Disk, Image, NetworkInterface, PublicIpAddress, ResourceGroup, StorageAccount, Subnet,
    Subscription, VirtualMachine, VirtualMachineExtension, VirtualNetwork, VmSize,
};
use crate::rest::ArmClient;
use armflow_cloud::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ComputeFacet: Send + Sync {
    /// All VMs visible to the credential scope
    async fn list_all(&self) -> Result<Vec<VirtualMachine>>;

    async fn get(&self, resource_group: &str, name: &str) -> Result<VirtualMachine>;

    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        vm: &VirtualMachine,
    ) -> Result<VirtualMachine>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;

    async fn sizes(&self, location: &str) -> Result<Vec<VmSize>>;

    async fn list_images(&self) -> Result<Vec<Image>>;
}

#[async_trait]
pub trait NetworkInterfaceFacet: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<NetworkInterface>;

    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        nic: &NetworkInterface,
    ) -> Result<NetworkInterface>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;
}

#[async_trait]
pub trait PublicIpFacet: Send + Sync {
    async fn create(
        &self,
        resource_group: &str,
        name: &str,
        ip: &PublicIpAddress,
    ) -> Result<PublicIpAddress>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;
}

#[async_trait]
pub trait DiskFacet: Send + Sync {
    async fn create(&self, resource_group: &str, name: &str, disk: &Disk) -> Result<Disk>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;
}

#[async_trait]
pub trait ExtensionFacet: Send + Sync {
    async fn create(
        &self,
        resource_group: &str,
        vm_name: &str,
        extension_name: &str,
        extension: &VirtualMachineExtension,
    ) -> Result<VirtualMachineExtension>;
}

#[async_trait]
pub trait SubscriptionFacet: Send + Sync {
    async fn list(&self) -> Result<Vec<Subscription>>;
}

#[async_trait]
pub trait ResourceGroupFacet: Send + Sync {
    async fn list(&self) -> Result<Vec<ResourceGroup>>;
}

#[async_trait]
pub trait StorageAccountFacet: Send + Sync {
    async fn list_all(&self) -> Result<Vec<StorageAccount>>;
}

#[async_trait]
pub trait VirtualNetworkFacet: Send + Sync {
    async fn list_all(&self) -> Result<Vec<VirtualNetwork>>;
}

#[async_trait]
pub trait SubnetFacet: Send + Sync {
    async fn list(&self, resource_group: &str, virtual_network: &str) -> Result<Vec<Subnet>>;
}

/// One client handle per resource kind, all built from one configuration
///
/// Constructed once and passed by reference into every operation.
#[derive(Clone)]
pub struct ProviderClients {
    pub compute: Arc<dyn ComputeFacet>,
    pub network_interfaces: Arc<dyn NetworkInterfaceFacet>,
    pub public_ips: Arc<dyn PublicIpFacet>,
    pub disks: Arc<dyn DiskFacet>,
    pub extensions: Arc<dyn ExtensionFacet>,
    pub subscriptions: Arc<dyn SubscriptionFacet>,
    pub resource_groups: Arc<dyn ResourceGroupFacet>,
    pub storage_accounts: Arc<dyn StorageAccountFacet>,
    pub virtual_networks: Arc<dyn VirtualNetworkFacet>,
    pub subnets: Arc<dyn SubnetFacet>,
}

impl ProviderClients {
    /// Validate the configuration and build REST-backed clients
    pub fn connect(config: &ArmConfig) -> Result<Self> {
        config.validate()?;
        let client = ArmClient::new(config.clone())?;
        Ok(Self::from_shared(Arc::new(client)))
    }

    /// Use one value implementing every facet for all resource kinds
    pub fn from_shared<T>(facets: Arc<T>) -> Self
    where
        T: ComputeFacet
            + NetworkInterfaceFacet
            + PublicIpFacet
            + DiskFacet
            + ExtensionFacet
            + SubscriptionFacet
            + ResourceGroupFacet
            + StorageAccountFacet
            + VirtualNetworkFacet
            + SubnetFacet
            + 'static,
    {
        Self {
            compute: facets.clone(),
            network_interfaces: facets.clone(),
            public_ips: facets.clone(),
            disks: facets.clone(),
            extensions: facets.clone(),
            subscriptions: facets.clone(),
            resource_groups: facets.clone(),
            storage_accounts: facets.clone(),
            virtual_networks: facets.clone(),
            subnets: facets,
        }
    }
}

impl std::fmt::Debug for ProviderClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClients").finish_non_exhaustive()
    }
}
