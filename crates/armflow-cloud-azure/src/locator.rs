//! VM lookup by host identifier

use crate::facets::ProviderClients;
use crate::model::VirtualMachine;
use armflow_cloud::{CloudError, Result};

/// Find a VM by name across the whole subscription
///
/// Lists every VM visible to the credentials and scans by name, so each
/// lookup costs one full listing. Names must be unique across resource
/// groups; when they are not, the first VM in listing order wins.
pub async fn find_by_identifier(
    clients: &ProviderClients,
    identifier: &str,
) -> Result<VirtualMachine> {
    let vms = clients.compute.list_all().await?;
    tracing::debug!("Scanning {} VMs for {}", vms.len(), identifier);

    vms.into_iter()
        .find(|vm| vm.name == identifier)
        .ok_or_else(|| CloudError::NotFound(format!("virtual machine {}", identifier)))
}
