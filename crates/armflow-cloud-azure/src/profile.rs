//! Profile builders
//!
//! Pure functions assembling the OS, storage and network profiles of a VM
//! from a `ProvisionRequest`. No I/O happens here.

use crate::model::{
    DataDisk, DiskCreateOption, HardwareProfile, ImageReferenceModel, LinuxConfiguration,
    ManagedDiskParameters, NetworkInterface, NetworkInterfaceReference,
    NetworkInterfaceReferenceProperties, NetworkProfile, OsDisk, OsProfile, SshConfiguration,
    SshPublicKey, StorageAccountType, StorageProfile, VirtualMachineExtension,
    VirtualMachineExtensionProperties, VirtualMachineProperties, WindowsConfiguration,
};
use crate::request::{ImageReference, Platform, ProvisionRequest};

/// Name under which the post-provision script extension is attached
pub const SCRIPT_EXTENSION_NAME: &str = "CustomScript";

pub fn build_os_profile(request: &ProvisionRequest) -> OsProfile {
    let credentials = &request.credentials;
    let mut os_profile = OsProfile {
        computer_name: request.vm_name.clone(),
        admin_username: credentials.username.clone(),
        admin_password: credentials.password.clone(),
        windows_configuration: None,
        linux_configuration: None,
    };

    match request.platform {
        Platform::Windows => {
            os_profile.windows_configuration = Some(WindowsConfiguration {
                enable_automatic_updates: false,
                provision_vm_agent: true,
            });
        }
        Platform::Linux => {
            let ssh = credentials.ssh_key_data.as_ref().map(|key_data| {
                let path = credentials.ssh_key_path.clone().unwrap_or_else(|| {
                    format!("/home/{}/.ssh/authorized_keys", credentials.username)
                });
                SshConfiguration {
                    public_keys: vec![SshPublicKey {
                        path,
                        key_data: key_data.clone(),
                    }],
                }
            });
            os_profile.linux_configuration = Some(LinuxConfiguration {
                disable_password_authentication: ssh.is_some(),
                ssh,
            });
        }
    }

    os_profile
}

pub fn build_storage_profile(request: &ProvisionRequest) -> StorageProfile {
    let image_reference = match &request.image {
        ImageReference::Id(id) => ImageReferenceModel {
            id: Some(id.clone()),
            ..Default::default()
        },
        ImageReference::Urn {
            publisher,
            offer,
            sku,
            version,
        } => ImageReferenceModel {
            id: None,
            publisher: Some(publisher.clone()),
            offer: Some(offer.clone()),
            sku: Some(sku.clone()),
            version: Some(version.clone()),
        },
    };

    let os_disk = OsDisk {
        name: Some(format!("{}-osDisk", request.vm_name)),
        caching: request.os_disk.caching,
        create_option: DiskCreateOption::FromImage,
        disk_size_gb: request.os_disk.size_gb,
        managed_disk: Some(managed_disk(request.os_disk.premium)),
        os_type: Some(request.platform.os_type().to_string()),
    };

    // LUNs are 1-based and follow input order
    let data_disks = request
        .data_disks
        .iter()
        .enumerate()
        .map(|(idx, disk)| DataDisk {
            lun: idx as u32 + 1,
            name: None,
            caching: disk.caching,
            create_option: DiskCreateOption::Empty,
            disk_size_gb: Some(disk.size_gb),
            managed_disk: Some(managed_disk(disk.premium)),
        })
        .collect();

    StorageProfile {
        image_reference: Some(image_reference),
        os_disk: Some(os_disk),
        data_disks,
    }
}

fn managed_disk(premium: bool) -> ManagedDiskParameters {
    ManagedDiskParameters {
        id: None,
        storage_account_type: Some(StorageAccountType::for_tier(premium)),
    }
}

/// Network profile over already-created NICs; the first one is primary
pub fn build_network_profile(nics: &[NetworkInterface]) -> NetworkProfile {
    NetworkProfile {
        network_interfaces: nics
            .iter()
            .enumerate()
            .map(|(idx, nic)| NetworkInterfaceReference {
                id: nic.id.clone(),
                properties: Some(NetworkInterfaceReferenceProperties { primary: idx == 0 }),
            })
            .collect(),
    }
}

pub fn build_vm_properties(
    request: &ProvisionRequest,
    nics: &[NetworkInterface],
) -> VirtualMachineProperties {
    VirtualMachineProperties {
        hardware_profile: Some(HardwareProfile {
            vm_size: request.vm_size.clone(),
        }),
        license_type: request.license_type.clone(),
        os_profile: Some(build_os_profile(request)),
        storage_profile: Some(build_storage_profile(request)),
        network_profile: Some(build_network_profile(nics)),
        provisioning_state: None,
        vm_id: None,
    }
}

/// Custom script extension, when the request carries both a command and URIs
pub fn build_script_extension(request: &ProvisionRequest) -> Option<VirtualMachineExtension> {
    let script = request.script.as_ref()?;
    if script.command.trim().is_empty() || script.uris.is_empty() {
        return None;
    }

    let (publisher, extension_type, version) = match request.platform {
        Platform::Linux => ("Microsoft.Azure.Extensions", "CustomScript", "2.0"),
        Platform::Windows => ("Microsoft.Compute", "CustomScriptExtension", "1.7"),
    };

    Some(VirtualMachineExtension {
        location: request.location.clone(),
        properties: VirtualMachineExtensionProperties {
            publisher: publisher.to_string(),
            extension_type: extension_type.to_string(),
            type_handler_version: version.to_string(),
            auto_upgrade_minor_version: true,
            settings: serde_json::json!({
                "commandToExecute": script.command,
                "fileUris": script.uris,
            }),
        },
    })
}
