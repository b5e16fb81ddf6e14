//! Dependent-resource provisioner
//!
//! Creates the public IPs and network interfaces a VM needs, one interface
//! slot at a time. NIC creation needs the public IP's ID, so slots are
//! provisioned sequentially.

use crate::facets::ProviderClients;
use crate::model::{
    IpConfiguration, IpConfigurationProperties, NetworkInterface, NetworkInterfaceProperties,
    PublicIpAddress, PublicIpAddressProperties, SubResource,
};
use crate::request::{InterfaceSpec, ProvisionRequest};
use crate::resource_id::ResourceId;
use armflow_cloud::{CloudError, ResourceKind};

/// IP configuration name used on every NIC
pub const IP_CONFIGURATION_NAME: &str = "ipcfg01";

pub fn public_ip_name(vm_name: &str, slot: usize) -> String {
    format!("{}-pip{}", vm_name, slot)
}

pub fn nic_name(vm_name: &str, slot: usize) -> String {
    format!("{}-nic{}", vm_name, slot)
}

/// A resource created while provisioning, in creation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedResource {
    pub kind: ResourceKind,
    pub resource_group: String,
    pub name: String,
}

impl CreatedResource {
    fn new(kind: ResourceKind, resource_group: &str, name: &str) -> Self {
        Self {
            kind,
            resource_group: resource_group.to_string(),
            name: name.to_string(),
        }
    }

    /// Resources backing already-provisioned NICs: each public IP followed
    /// by the NIC referencing it
    pub fn from_interfaces(resource_group: &str, nics: &[NetworkInterface]) -> Vec<Self> {
        let mut created = Vec::new();
        for nic in nics {
            if let Some(pip) = nic
                .public_ip_address_id()
                .and_then(|id| ResourceId::parse(id).ok())
            {
                created.push(Self::new(ResourceKind::PublicIp, &pip.resource_group, &pip.name));
            }
            created.push(Self::new(
                ResourceKind::NetworkInterface,
                resource_group,
                &nic.name,
            ));
        }
        created
    }
}

/// Interface provisioning stopped part way
///
/// `created` lists what this call had already created so the caller can
/// reclaim it.
#[derive(Debug)]
pub struct ProvisionFailure {
    pub error: CloudError,
    pub created: Vec<CreatedResource>,
}

impl From<ProvisionFailure> for CloudError {
    fn from(failure: ProvisionFailure) -> Self {
        failure.error
    }
}

/// Create the public IPs and NICs for every interface slot
///
/// NICs are returned in slot order; the first one becomes the primary NIC.
pub async fn provision_interfaces(
    clients: &ProviderClients,
    request: &ProvisionRequest,
) -> Result<Vec<NetworkInterface>, ProvisionFailure> {
    let mut created = Vec::new();
    let mut nics = Vec::with_capacity(request.interfaces.len());

    for (slot, interface) in request.interfaces.iter().enumerate() {
        match provision_slot(clients, request, slot, interface, &mut created).await {
            Ok(nic) => nics.push(nic),
            Err(error) => return Err(ProvisionFailure { error, created }),
        }
    }

    Ok(nics)
}

async fn provision_slot(
    clients: &ProviderClients,
    request: &ProvisionRequest,
    slot: usize,
    interface: &InterfaceSpec,
    created: &mut Vec<CreatedResource>,
) -> armflow_cloud::Result<NetworkInterface> {
    let rg = &request.resource_group;

    let public_ip = match interface.public_ip {
        Some(allocation) => {
            let name = public_ip_name(&request.vm_name, slot);
            tracing::debug!("Creating public IP {} ({})", name, allocation);
            let params = PublicIpAddress {
                location: request.location.clone(),
                properties: PublicIpAddressProperties {
                    public_ip_allocation_method: Some(allocation),
                    ..Default::default()
                },
                ..Default::default()
            };
            let pip = clients.public_ips.create(rg, &name, &params).await?;
            created.push(CreatedResource::new(ResourceKind::PublicIp, rg, &name));
            Some(SubResource::new(pip.id))
        }
        None => None,
    };

    let name = nic_name(&request.vm_name, slot);
    tracing::debug!("Creating network interface {} on {}", name, interface.subnet_id);
    let params = NetworkInterface {
        location: request.location.clone(),
        properties: NetworkInterfaceProperties {
            ip_configurations: vec![IpConfiguration {
                name: IP_CONFIGURATION_NAME.to_string(),
                properties: IpConfigurationProperties {
                    subnet: Some(SubResource::new(interface.subnet_id.clone())),
                    public_ip_address: public_ip,
                    private_ip_allocation_method: Some(interface.private_ip),
                    private_ip_address: None,
                },
            }],
            virtual_machine: None,
        },
        ..Default::default()
    };
    let nic = clients.network_interfaces.create(rg, &name, &params).await?;
    created.push(CreatedResource::new(ResourceKind::NetworkInterface, rg, &name));

    Ok(nic)
}
