//! Azure Resource Manager wire models
//!
//! Only the fields this adapter reads or writes are modelled; everything
//! else the API returns is ignored on deserialization.

use crate::resource_id::ResourceId;
use serde::{Deserialize, Serialize};

// ============ Shared ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    pub id: String,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageAccountType {
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
    #[serde(rename = "StandardSSD_LRS")]
    StandardSsdLrs,
    #[serde(rename = "UltraSSD_LRS")]
    UltraSsdLrs,
}

impl StorageAccountType {
    pub fn for_tier(premium: bool) -> Self {
        if premium {
            StorageAccountType::PremiumLrs
        } else {
            StorageAccountType::StandardLrs
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachingType {
    None,
    ReadOnly,
    ReadWrite,
}

impl std::str::FromStr for CachingType {
    type Err = armflow_cloud::CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(CachingType::None),
            "readonly" => Ok(CachingType::ReadOnly),
            "readwrite" => Ok(CachingType::ReadWrite),
            _ => Err(armflow_cloud::CloudError::Validation(format!(
                "Invalid disk caching '{}'. Valid values: None, ReadOnly, ReadWrite",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskCreateOption {
    FromImage,
    Empty,
    Attach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpAllocationMethod {
    Static,
    Dynamic,
}

impl std::fmt::Display for IpAllocationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpAllocationMethod::Static => write!(f, "Static"),
            IpAllocationMethod::Dynamic => write!(f, "Dynamic"),
        }
    }
}

/// Paged list envelope
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

// ============ Virtual machines ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualMachine {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub location: String,

    #[serde(default)]
    pub properties: VirtualMachineProperties,
}

impl VirtualMachine {
    pub fn new(location: impl Into<String>, properties: VirtualMachineProperties) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            location: location.into(),
            properties,
        }
    }

    /// Resource group parsed from the VM's resource ID
    pub fn resource_group(&self) -> armflow_cloud::Result<String> {
        Ok(ResourceId::parse(&self.id)?.resource_group)
    }

    pub fn os_disk(&self) -> Option<&OsDisk> {
        self.properties.storage_profile.as_ref()?.os_disk.as_ref()
    }

    pub fn data_disks(&self) -> &[DataDisk] {
        self.properties
            .storage_profile
            .as_ref()
            .map(|s| s.data_disks.as_slice())
            .unwrap_or(&[])
    }

    pub fn network_interface_ids(&self) -> Vec<String> {
        self.properties
            .network_profile
            .as_ref()
            .map(|n| n.network_interfaces.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn is_failed(&self) -> bool {
        self.properties
            .provisioning_state
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("failed"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<HardwareProfile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_profile: Option<OsProfile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_profile: Option<StorageProfile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_profile: Option<NetworkProfile>,

    #[serde(skip_serializing)]
    pub provisioning_state: Option<String>,

    #[serde(rename = "vmId", skip_serializing)]
    pub vm_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    pub vm_size: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsProfile {
    pub computer_name: String,

    pub admin_username: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_configuration: Option<WindowsConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub linux_configuration: Option<LinuxConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsConfiguration {
    pub enable_automatic_updates: bool,

    #[serde(rename = "provisionVMAgent")]
    pub provision_vm_agent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinuxConfiguration {
    pub disable_password_authentication: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshConfiguration {
    #[serde(default)]
    pub public_keys: Vec<SshPublicKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshPublicKey {
    pub path: String,
    pub key_data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<ImageReferenceModel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_disk: Option<OsDisk>,

    #[serde(default)]
    pub data_disks: Vec<DataDisk>,
}

/// Image reference as sent to ARM: either a resource ID or a marketplace URN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReferenceModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsDisk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub caching: Option<CachingType>,

    pub create_option: DiskCreateOption,

    #[serde(rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_disk: Option<ManagedDiskParameters>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDisk {
    pub lun: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub caching: Option<CachingType>,

    pub create_option: DiskCreateOption,

    #[serde(rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_disk: Option<ManagedDiskParameters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDiskParameters {
    /// Set by the provider once the disk exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_account_type: Option<StorageAccountType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterfaceReference>,
}

impl NetworkProfile {
    pub fn primary(&self) -> impl Iterator<Item = &NetworkInterfaceReference> {
        self.network_interfaces.iter().filter(|r| r.is_primary())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterfaceReference {
    pub id: String,

    #[serde(default)]
    pub properties: Option<NetworkInterfaceReferenceProperties>,
}

impl NetworkInterfaceReference {
    pub fn is_primary(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| p.primary)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterfaceReferenceProperties {
    pub primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSize {
    pub name: String,
    #[serde(default)]
    pub number_of_cores: u32,
    #[serde(rename = "memoryInMB", default)]
    pub memory_in_mb: u64,
    #[serde(default)]
    pub max_data_disk_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub location: String,
}

// ============ Extensions ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualMachineExtension {
    pub location: String,
    pub properties: VirtualMachineExtensionProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineExtensionProperties {
    pub publisher: String,

    #[serde(rename = "type")]
    pub extension_type: String,

    pub type_handler_version: String,

    pub auto_upgrade_minor_version: bool,

    pub settings: serde_json::Value,
}

// ============ Network ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkInterface {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub location: String,

    #[serde(default)]
    pub properties: NetworkInterfaceProperties,
}

impl NetworkInterface {
    /// Public IP referenced by any of this NIC's IP configurations
    pub fn public_ip_address_id(&self) -> Option<&str> {
        self.properties
            .ip_configurations
            .iter()
            .find_map(|c| c.properties.public_ip_address.as_ref())
            .map(|p| p.id.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceProperties {
    #[serde(default)]
    pub ip_configurations: Vec<IpConfiguration>,

    #[serde(skip_serializing)]
    pub virtual_machine: Option<SubResource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpConfiguration {
    pub name: String,
    #[serde(default)]
    pub properties: IpConfigurationProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConfigurationProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubResource>,

    #[serde(rename = "publicIPAddress", skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<SubResource>,

    #[serde(rename = "privateIPAllocationMethod", skip_serializing_if = "Option::is_none")]
    pub private_ip_allocation_method: Option<IpAllocationMethod>,

    #[serde(rename = "privateIPAddress", skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicIpAddress {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub location: String,

    #[serde(default)]
    pub properties: PublicIpAddressProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicIpAddressProperties {
    #[serde(rename = "publicIPAllocationMethod", skip_serializing_if = "Option::is_none")]
    pub public_ip_allocation_method: Option<IpAllocationMethod>,

    #[serde(rename = "ipAddress", skip_serializing)]
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualNetwork {
    pub id: String,
    pub name: String,
    pub location: String,
}

impl VirtualNetwork {
    pub fn resource_group(&self) -> armflow_cloud::Result<String> {
        Ok(ResourceId::parse(&self.id)?.resource_group)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: SubnetProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    pub address_prefix: Option<String>,
}

// ============ Disks ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Disk {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<DiskSku>,

    #[serde(default)]
    pub properties: DiskProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSku {
    pub name: StorageAccountType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskProperties {
    #[serde(rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_data: Option<CreationData>,

    #[serde(skip_serializing)]
    pub disk_state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationData {
    pub create_option: DiskCreateOption,
}

// ============ Subscription / resources / storage ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub subscription_id: String,
    pub display_name: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageAccount {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub kind: Option<String>,
}
