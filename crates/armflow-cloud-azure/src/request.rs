//! VM provisioning request
//!
//! `ProvisionRequest` is the typed input to VM creation. Hosts hand over a
//! flat attribute set (`HostVmAttributes`); converting it validates platform,
//! image reference, caching modes and public IP allocation before any
//! provider call is made.

use crate::model::{CachingType, IpAllocationMethod};
use armflow_cloud::CloudError;
use serde::{Deserialize, Serialize};

/// Guest operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// OS type as ARM spells it on the OS disk
    pub fn os_type(&self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            _ => Err(CloudError::Validation(format!(
                "Invalid platform: {}. Valid platforms: linux, windows",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

/// Image to boot the OS disk from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Absolute resource ID of a custom or gallery image
    Id(String),
    /// Marketplace `publisher:offer:sku:version`
    Urn {
        publisher: String,
        offer: String,
        sku: String,
        version: String,
    },
}

impl std::str::FromStr for ImageReference {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('/') {
            return Ok(ImageReference::Id(s.to_string()));
        }

        let urn: Vec<&str> = s.split(':').collect();
        match urn.as_slice() {
            [publisher, offer, sku, version] => Ok(ImageReference::Urn {
                publisher: publisher.to_string(),
                offer: offer.to_string(),
                sku: sku.to_string(),
                version: version.to_string(),
            }),
            _ => Err(CloudError::Validation(format!(
                "Invalid image reference '{}': expected a resource ID or publisher:offer:sku:version",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsDiskSpec {
    pub caching: Option<CachingType>,
    pub size_gb: Option<u32>,
    pub premium: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDiskSpec {
    pub size_gb: u32,
    pub caching: Option<CachingType>,
    pub premium: bool,
}

/// One network interface slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub subnet_id: String,

    /// `None` when the slot gets no public IP
    pub public_ip: Option<IpAllocationMethod>,

    pub private_ip: IpAllocationMethod,
}

impl InterfaceSpec {
    pub fn new(subnet_id: impl Into<String>) -> Self {
        Self {
            subnet_id: subnet_id.into(),
            public_ip: None,
            private_ip: IpAllocationMethod::Dynamic,
        }
    }

    pub fn with_public_ip(mut self, allocation: IpAllocationMethod) -> Self {
        self.public_ip = Some(allocation);
        self
    }

    pub fn with_static_private_ip(mut self) -> Self {
        self.private_ip = IpAllocationMethod::Static;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: Option<String>,
    pub ssh_key_data: Option<String>,
    pub ssh_key_path: Option<String>,
}

/// Post-provision custom script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSpec {
    pub command: String,
    pub uris: Vec<String>,
}

/// Everything needed to create one VM and its dependent resources
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HostVmAttributes")]
pub struct ProvisionRequest {
    pub vm_name: String,
    pub resource_group: String,
    pub location: String,
    pub vm_size: String,
    pub platform: Platform,
    pub image: ImageReference,
    pub os_disk: OsDiskSpec,
    pub data_disks: Vec<DataDiskSpec>,
    pub interfaces: Vec<InterfaceSpec>,
    pub credentials: AdminCredentials,
    pub license_type: Option<String>,
    pub script: Option<ScriptSpec>,
}

impl ProvisionRequest {
    pub fn new(
        name: &str,
        resource_group: impl Into<String>,
        location: &str,
        vm_size: impl Into<String>,
        platform: Platform,
        image: ImageReference,
    ) -> Self {
        Self {
            vm_name: short_name(name),
            resource_group: resource_group.into(),
            location: normalize_location(location),
            vm_size: vm_size.into(),
            platform,
            image,
            os_disk: OsDiskSpec::default(),
            data_disks: Vec::new(),
            interfaces: Vec::new(),
            credentials: AdminCredentials::default(),
            license_type: None,
            script: None,
        }
    }

    pub fn with_interface(mut self, interface: InterfaceSpec) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_data_disk(mut self, disk: DataDiskSpec) -> Self {
        self.data_disks.push(disk);
        self
    }

    pub fn with_os_disk(mut self, os_disk: OsDiskSpec) -> Self {
        self.os_disk = os_disk;
        self
    }

    pub fn with_credentials(mut self, credentials: AdminCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_script(mut self, script: ScriptSpec) -> Self {
        self.script = Some(script);
        self
    }

    /// Checks that do not depend on provider state
    pub fn validate(&self) -> armflow_cloud::Result<()> {
        let required = [
            ("name", &self.vm_name),
            ("resource_group", &self.resource_group),
            ("location", &self.location),
            ("vm_size", &self.vm_size),
            ("username", &self.credentials.username),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CloudError::Validation(format!("{} is required", field)));
            }
        }
        if self.interfaces.is_empty() {
            return Err(CloudError::Validation(
                "at least one network interface is required".to_string(),
            ));
        }
        if let Some(iface) = self.interfaces.iter().find(|i| i.subnet_id.trim().is_empty()) {
            return Err(CloudError::Validation(format!(
                "interface {:?} has no subnet",
                iface
            )));
        }
        Ok(())
    }
}

/// Host short name: the first label of a fully-qualified host name
pub fn short_name(name: &str) -> String {
    name.split('.').next().unwrap_or(name).to_string()
}

/// Provider location form: whitespace stripped, lower-cased ("East US 2" -> "eastus2")
pub fn normalize_location(location: &str) -> String {
    location
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

// ============ Host attribute form ============

/// Flat VM attributes as the host submits them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostVmAttributes {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub vm_size: String,
    pub platform: String,
    pub image_id: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub ssh_key_data: Option<String>,
    #[serde(default)]
    pub ssh_key_path: Option<String>,
    #[serde(default)]
    pub license_type: Option<String>,
    #[serde(default)]
    pub os_disk_caching: Option<String>,
    #[serde(default)]
    pub os_disk_size: Option<u32>,
    #[serde(default)]
    pub premium_os_disk: bool,
    #[serde(default)]
    pub script_command: Option<String>,
    /// Comma-separated script URIs
    #[serde(default)]
    pub script_uris: Option<String>,
    #[serde(default)]
    pub interfaces_attributes: Vec<HostInterfaceAttributes>,
    #[serde(default)]
    pub volumes_attributes: Vec<HostVolumeAttributes>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostInterfaceAttributes {
    /// Subnet resource ID
    pub network: String,

    /// Public IP allocation: `None`, `Static` or `Dynamic`
    #[serde(default)]
    pub bridge: Option<String>,

    #[serde(default)]
    pub static_private_ip: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostVolumeAttributes {
    pub disk_size_gb: u32,
    #[serde(default)]
    pub data_disk_caching: Option<String>,
    /// Premium storage tier when set
    #[serde(default)]
    pub account_type: bool,
}

fn parse_public_ip(bridge: Option<&str>) -> armflow_cloud::Result<Option<IpAllocationMethod>> {
    match bridge.map(str::trim) {
        None | Some("") | Some("None") => Ok(None),
        Some("Static") => Ok(Some(IpAllocationMethod::Static)),
        Some("Dynamic") => Ok(Some(IpAllocationMethod::Dynamic)),
        Some(other) => Err(CloudError::Validation(format!(
            "Invalid public IP allocation '{}'. Valid values: None, Static, Dynamic",
            other
        ))),
    }
}

fn parse_caching(value: Option<&str>) -> armflow_cloud::Result<Option<CachingType>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<HostVmAttributes> for ProvisionRequest {
    type Error = CloudError;

    fn try_from(attrs: HostVmAttributes) -> Result<Self, Self::Error> {
        let platform: Platform = attrs.platform.parse()?;
        let image: ImageReference = attrs.image_id.parse()?;

        let interfaces = attrs
            .interfaces_attributes
            .iter()
            .map(|nic| -> armflow_cloud::Result<InterfaceSpec> {
                Ok(InterfaceSpec {
                    subnet_id: nic.network.clone(),
                    public_ip: parse_public_ip(nic.bridge.as_deref())?,
                    private_ip: if nic.static_private_ip {
                        IpAllocationMethod::Static
                    } else {
                        IpAllocationMethod::Dynamic
                    },
                })
            })
            .collect::<armflow_cloud::Result<Vec<_>>>()?;

        let data_disks = attrs
            .volumes_attributes
            .iter()
            .map(|disk| -> armflow_cloud::Result<DataDiskSpec> {
                Ok(DataDiskSpec {
                    size_gb: disk.disk_size_gb,
                    caching: parse_caching(disk.data_disk_caching.as_deref())?,
                    premium: disk.account_type,
                })
            })
            .collect::<armflow_cloud::Result<Vec<_>>>()?;

        let script = match (
            non_empty(attrs.script_command),
            non_empty(attrs.script_uris),
        ) {
            (Some(command), Some(uris)) => Some(ScriptSpec {
                command,
                uris: uris
                    .split(',')
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty())
                    .collect(),
            }),
            _ => None,
        };

        let request = ProvisionRequest {
            vm_name: short_name(&attrs.name),
            resource_group: attrs.resource_group,
            location: normalize_location(&attrs.location),
            vm_size: attrs.vm_size,
            platform,
            image,
            os_disk: OsDiskSpec {
                caching: parse_caching(attrs.os_disk_caching.as_deref())?,
                size_gb: attrs.os_disk_size,
                premium: attrs.premium_os_disk,
            },
            data_disks,
            interfaces,
            credentials: AdminCredentials {
                username: attrs.username,
                password: non_empty(attrs.password),
                ssh_key_data: non_empty(attrs.ssh_key_data),
                ssh_key_path: non_empty(attrs.ssh_key_path),
            },
            license_type: non_empty(attrs.license_type),
            script,
        };
        request.validate()?;
        Ok(request)
    }
}
