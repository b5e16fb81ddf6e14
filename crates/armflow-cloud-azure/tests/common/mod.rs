//! In-memory provider used by the integration tests
//!
//! Implements every facet over a small resource store and records each call
//! in order, so tests can assert on the exact sequence of provider calls.

#![allow(dead_code)]

use armflow_cloud::{CloudError, Result};
use armflow_cloud_azure::facets::{
    ComputeFacet, DiskFacet, ExtensionFacet, NetworkInterfaceFacet, PublicIpFacet,
    ResourceGroupFacet, StorageAccountFacet, SubnetFacet, SubscriptionFacet, VirtualNetworkFacet,
};
use armflow_cloud_azure::model::{
    Disk, Image, ManagedDiskParameters, NetworkInterface, PublicIpAddress, ResourceGroup,
    StorageAccount, SubResource, Subnet, SubnetProperties, Subscription, VirtualMachine,
    VirtualMachineExtension, VirtualNetwork, VmSize,
};
use armflow_cloud_azure::{
    ArmConfig, AzureRmProvider, HostVmAttributes, ProviderClients,
};
use armflow_cloud_azure::request::HostInterfaceAttributes;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

pub fn resource_id(rg: &str, resource_type: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
        SUBSCRIPTION, rg, resource_type, name
    )
}

pub fn subnet_id(rg: &str, vnet: &str, subnet: &str) -> String {
    format!(
        "{}/subnets/{}",
        resource_id(rg, "Microsoft.Network/virtualNetworks", vnet),
        subnet
    )
}

/// Injected provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    NotFound,
    Permission,
    Provider,
    /// Apply the change, then report a provider error
    ProviderAfterApply,
}

impl Fault {
    fn error(self, op: &str, name: &str) -> CloudError {
        match self {
            Fault::NotFound => CloudError::NotFound(format!("{} {}", op, name)),
            Fault::Permission => CloudError::Permission(format!("{} {}", op, name)),
            Fault::Provider | Fault::ProviderAfterApply => CloudError::Provider {
                status: Some(500),
                code: "InternalServerError".to_string(),
                message: format!("{} {} failed", op, name),
            },
        }
    }
}

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub name: String,
}

#[derive(Default)]
struct Store {
    calls: Vec<Call>,
    faults: Vec<(&'static str, String, Fault)>,
    vm_provisioning_state: Option<String>,
    vms: Vec<VirtualMachine>,
    nics: BTreeMap<String, NetworkInterface>,
    public_ips: BTreeMap<String, PublicIpAddress>,
    disks: BTreeMap<String, Disk>,
    subscriptions: Vec<Subscription>,
    resource_groups: Vec<ResourceGroup>,
    storage_accounts: Vec<StorageAccount>,
    virtual_networks: Vec<VirtualNetwork>,
    subnets: Vec<(String, Subnet)>,
}

#[derive(Default)]
pub struct FakeArm {
    store: Mutex<Store>,
}

impl FakeArm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn clients(self: &Arc<Self>) -> ProviderClients {
        ProviderClients::from_shared(self.clone())
    }

    pub fn provider(self: &Arc<Self>) -> AzureRmProvider {
        AzureRmProvider::with_clients(
            ArmConfig::new("app-id", "secret", "tenant", SUBSCRIPTION),
            self.clients(),
        )
    }

    /// Make every `op` call on `name` fail
    pub fn fail(&self, op: &'static str, name: &str, fault: Fault) {
        self.lock().faults.push((op, name.to_string(), fault));
    }

    pub fn set_vm_provisioning_state(&self, state: &str) {
        self.lock().vm_provisioning_state = Some(state.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Recorded calls for one operation, in order
    pub fn calls_to(&self, op: &str) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Position of a call in the trace
    pub fn position(&self, op: &str, name: &str) -> Option<usize> {
        self.lock()
            .calls
            .iter()
            .position(|c| c.op == op && c.name == name)
    }

    pub fn delete_calls(&self) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.op.ends_with(".delete"))
            .cloned()
            .collect()
    }

    pub fn has_vm(&self, name: &str) -> bool {
        self.lock().vms.iter().any(|vm| vm.name == name)
    }

    pub fn has_nic(&self, name: &str) -> bool {
        self.lock().nics.contains_key(name)
    }

    pub fn has_public_ip(&self, name: &str) -> bool {
        self.lock().public_ips.contains_key(name)
    }

    pub fn has_disk(&self, name: &str) -> bool {
        self.lock().disks.contains_key(name)
    }

    pub fn disk_names(&self) -> Vec<String> {
        self.lock().disks.keys().cloned().collect()
    }

    /// Resource groups holding a VM with this name, in listing order
    pub fn vm_resource_groups(&self, name: &str) -> Vec<String> {
        self.lock()
            .vms
            .iter()
            .filter(|vm| vm.name == name)
            .filter_map(|vm| vm.resource_group().ok())
            .collect()
    }

    /// Point a NIC's first IP configuration at an arbitrary public IP ID
    pub fn set_nic_public_ip(&self, nic: &str, public_ip_id: &str) {
        if let Some(nic) = self.lock().nics.get_mut(nic) {
            if let Some(ipcfg) = nic.properties.ip_configurations.first_mut() {
                ipcfg.properties.public_ip_address = Some(SubResource::new(public_ip_id));
            }
        }
    }

    /// Delete a NIC behind the adapter's back
    pub fn remove_nic(&self, name: &str) {
        self.lock().nics.remove(name);
    }

    /// Insert a bare VM into the listing
    pub fn seed_vm(&self, rg: &str, name: &str) {
        self.lock().vms.push(VirtualMachine {
            id: resource_id(rg, "Microsoft.Compute/virtualMachines", name),
            name: name.to_string(),
            location: "eastus".to_string(),
            ..Default::default()
        });
    }

    pub fn seed_subscription(&self, id: &str, display_name: &str) {
        self.lock().subscriptions.push(Subscription {
            id: format!("/subscriptions/{}", id),
            subscription_id: id.to_string(),
            display_name: display_name.to_string(),
            state: Some("Enabled".to_string()),
        });
    }

    pub fn seed_resource_group(&self, name: &str, location: &str) {
        self.lock().resource_groups.push(ResourceGroup {
            id: format!("/subscriptions/{}/resourceGroups/{}", SUBSCRIPTION, name),
            name: name.to_string(),
            location: location.to_string(),
        });
    }

    pub fn seed_storage_account(&self, rg: &str, name: &str, location: &str) {
        self.lock().storage_accounts.push(StorageAccount {
            id: resource_id(rg, "Microsoft.Storage/storageAccounts", name),
            name: name.to_string(),
            location: location.to_string(),
            kind: Some("StorageV2".to_string()),
        });
    }

    pub fn seed_virtual_network(&self, rg: &str, name: &str, location: &str, subnets: &[&str]) {
        let mut store = self.lock();
        store.virtual_networks.push(VirtualNetwork {
            id: resource_id(rg, "Microsoft.Network/virtualNetworks", name),
            name: name.to_string(),
            location: location.to_string(),
        });
        for subnet in subnets {
            store.subnets.push((
                name.to_string(),
                Subnet {
                    id: subnet_id(rg, name, subnet),
                    name: subnet.to_string(),
                    properties: SubnetProperties {
                        address_prefix: Some("10.0.0.0/24".to_string()),
                    },
                },
            ));
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    /// Record the call and apply any injected fault other than
    /// `ProviderAfterApply`
    fn begin(&self, op: &'static str, name: &str) -> Result<()> {
        let mut store = self.lock();
        store.calls.push(Call {
            op,
            name: name.to_string(),
        });
        match store
            .faults
            .iter()
            .find(|(o, n, _)| *o == op && n == name)
        {
            Some((_, _, Fault::ProviderAfterApply)) | None => Ok(()),
            Some((_, _, fault)) => Err(fault.error(op, name)),
        }
    }

    fn fails_after_apply(&self, op: &str, name: &str) -> bool {
        self.lock()
            .faults
            .iter()
            .any(|(o, n, f)| *o == op && n == name && *f == Fault::ProviderAfterApply)
    }
}

#[async_trait]
impl ComputeFacet for FakeArm {
    async fn list_all(&self) -> Result<Vec<VirtualMachine>> {
        self.begin("vm.list", "")?;
        Ok(self.lock().vms.clone())
    }

    async fn get(&self, rg: &str, name: &str) -> Result<VirtualMachine> {
        self.begin("vm.get", name)?;
        self.lock()
            .vms
            .iter()
            .find(|vm| vm.name == name && vm.resource_group().ok().as_deref() == Some(rg))
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("virtual machine {}", name)))
    }

    async fn create(&self, rg: &str, name: &str, params: &VirtualMachine) -> Result<VirtualMachine> {
        self.begin("vm.create", name)?;

        let mut store = self.lock();
        let mut vm = params.clone();
        vm.id = resource_id(rg, "Microsoft.Compute/virtualMachines", name);
        vm.name = name.to_string();
        vm.properties.provisioning_state = Some(
            store
                .vm_provisioning_state
                .clone()
                .unwrap_or_else(|| "Succeeded".to_string()),
        );

        // Managed disks come into existence with the VM
        let mut disk_names = Vec::new();
        if let Some(storage) = vm.properties.storage_profile.as_mut() {
            if let Some(os_disk) = storage.os_disk.as_mut() {
                let disk_name = os_disk
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}_OsDisk", name));
                os_disk.name = Some(disk_name.clone());
                os_disk.managed_disk = Some(ManagedDiskParameters {
                    id: Some(resource_id(rg, "Microsoft.Compute/disks", &disk_name)),
                    storage_account_type: os_disk
                        .managed_disk
                        .as_ref()
                        .and_then(|m| m.storage_account_type),
                });
                disk_names.push(disk_name);
            }
            for data_disk in storage.data_disks.iter_mut() {
                let disk_name = data_disk
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}_disk{}", name, data_disk.lun));
                data_disk.name = Some(disk_name.clone());
                data_disk.managed_disk = Some(ManagedDiskParameters {
                    id: Some(resource_id(rg, "Microsoft.Compute/disks", &disk_name)),
                    storage_account_type: data_disk
                        .managed_disk
                        .as_ref()
                        .and_then(|m| m.storage_account_type),
                });
                disk_names.push(disk_name);
            }
        }
        for disk_name in disk_names {
            store.disks.insert(
                disk_name.clone(),
                Disk {
                    id: resource_id(rg, "Microsoft.Compute/disks", &disk_name),
                    name: disk_name,
                    location: vm.location.clone(),
                    ..Default::default()
                },
            );
        }
        store.vms.push(vm.clone());
        drop(store);

        if self.fails_after_apply("vm.create", name) {
            return Err(Fault::ProviderAfterApply.error("vm.create", name));
        }
        Ok(vm)
    }

    async fn delete(&self, rg: &str, name: &str) -> Result<()> {
        self.begin("vm.delete", name)?;
        let mut store = self.lock();
        match store
            .vms
            .iter()
            .position(|vm| vm.name == name && vm.resource_group().ok().as_deref() == Some(rg))
        {
            Some(idx) => {
                store.vms.remove(idx);
                Ok(())
            }
            None => Err(CloudError::NotFound(format!("virtual machine {}", name))),
        }
    }

    async fn sizes(&self, location: &str) -> Result<Vec<VmSize>> {
        self.begin("vm.sizes", location)?;
        Ok(vec![VmSize {
            name: "Standard_B2s".to_string(),
            number_of_cores: 2,
            memory_in_mb: 4096,
            max_data_disk_count: 4,
        }])
    }

    async fn list_images(&self) -> Result<Vec<Image>> {
        self.begin("image.list", "")?;
        Ok(vec![Image {
            id: resource_id("img-rg", "Microsoft.Compute/images", "golden"),
            name: "golden".to_string(),
            location: "eastus".to_string(),
        }])
    }
}

#[async_trait]
impl NetworkInterfaceFacet for FakeArm {
    async fn get(&self, _rg: &str, name: &str) -> Result<NetworkInterface> {
        self.begin("nic.get", name)?;
        self.lock()
            .nics
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("network interface {}", name)))
    }

    async fn create(&self, rg: &str, name: &str, params: &NetworkInterface) -> Result<NetworkInterface> {
        self.begin("nic.create", name)?;
        let mut nic = params.clone();
        nic.id = resource_id(rg, "Microsoft.Network/networkInterfaces", name);
        nic.name = name.to_string();
        self.lock().nics.insert(name.to_string(), nic.clone());
        Ok(nic)
    }

    async fn delete(&self, _rg: &str, name: &str) -> Result<()> {
        self.begin("nic.delete", name)?;
        self.lock()
            .nics
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| CloudError::NotFound(format!("network interface {}", name)))
    }
}

#[async_trait]
impl PublicIpFacet for FakeArm {
    async fn create(&self, rg: &str, name: &str, params: &PublicIpAddress) -> Result<PublicIpAddress> {
        self.begin("pip.create", name)?;
        let mut ip = params.clone();
        ip.id = resource_id(rg, "Microsoft.Network/publicIPAddresses", name);
        ip.name = name.to_string();
        self.lock().public_ips.insert(name.to_string(), ip.clone());
        Ok(ip)
    }

    async fn delete(&self, _rg: &str, name: &str) -> Result<()> {
        self.begin("pip.delete", name)?;
        self.lock()
            .public_ips
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| CloudError::NotFound(format!("public ip {}", name)))
    }
}

#[async_trait]
impl DiskFacet for FakeArm {
    async fn create(&self, rg: &str, name: &str, params: &Disk) -> Result<Disk> {
        self.begin("disk.create", name)?;
        let mut disk = params.clone();
        disk.id = resource_id(rg, "Microsoft.Compute/disks", name);
        disk.name = name.to_string();
        self.lock().disks.insert(name.to_string(), disk.clone());
        Ok(disk)
    }

    async fn delete(&self, _rg: &str, name: &str) -> Result<()> {
        self.begin("disk.delete", name)?;
        self.lock()
            .disks
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| CloudError::NotFound(format!("disk {}", name)))
    }
}

#[async_trait]
impl ExtensionFacet for FakeArm {
    async fn create(
        &self,
        _rg: &str,
        vm_name: &str,
        _extension_name: &str,
        extension: &VirtualMachineExtension,
    ) -> Result<VirtualMachineExtension> {
        self.begin("ext.create", vm_name)?;
        Ok(extension.clone())
    }
}

#[async_trait]
impl SubscriptionFacet for FakeArm {
    async fn list(&self) -> Result<Vec<Subscription>> {
        self.begin("sub.list", "")?;
        Ok(self.lock().subscriptions.clone())
    }
}

#[async_trait]
impl ResourceGroupFacet for FakeArm {
    async fn list(&self) -> Result<Vec<ResourceGroup>> {
        self.begin("rg.list", "")?;
        Ok(self.lock().resource_groups.clone())
    }
}

#[async_trait]
impl StorageAccountFacet for FakeArm {
    async fn list_all(&self) -> Result<Vec<StorageAccount>> {
        self.begin("sa.list", "")?;
        Ok(self.lock().storage_accounts.clone())
    }
}

#[async_trait]
impl VirtualNetworkFacet for FakeArm {
    async fn list_all(&self) -> Result<Vec<VirtualNetwork>> {
        self.begin("vnet.list", "")?;
        Ok(self.lock().virtual_networks.clone())
    }
}

#[async_trait]
impl SubnetFacet for FakeArm {
    async fn list(&self, _rg: &str, vnet: &str) -> Result<Vec<Subnet>> {
        self.begin("subnet.list", vnet)?;
        Ok(self
            .lock()
            .subnets
            .iter()
            .filter(|(v, _)| v == vnet)
            .map(|(_, s)| s.clone())
            .collect())
    }
}

/// Host attributes for a Linux VM with the given interface slots
pub fn linux_attributes(name: &str, interfaces: &[Option<&str>]) -> HostVmAttributes {
    HostVmAttributes {
        name: format!("{}.example.com", name),
        resource_group: "web-rg".to_string(),
        location: "East US".to_string(),
        vm_size: "Standard_B2s".to_string(),
        platform: "linux".to_string(),
        image_id: "Canonical:UbuntuServer:18.04-LTS:latest".to_string(),
        username: "azureuser".to_string(),
        password: Some("P@ssw0rd!".to_string()),
        interfaces_attributes: interfaces
            .iter()
            .map(|bridge| HostInterfaceAttributes {
                network: subnet_id("net-rg", "prod-vnet", "default"),
                bridge: bridge.map(str::to_string),
                static_private_ip: false,
            })
            .collect(),
        ..Default::default()
    }
}
