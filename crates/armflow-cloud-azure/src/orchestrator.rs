//! VM lifecycle orchestration
//!
//! Drives creation and teardown of one VM together with its NICs, public
//! IPs and managed disks, in the order the provider requires.
//!
//! ```text
//! create:  Requested -> NicsProvisioned -> VmCreated -> [ExtensionAttached] -> Ready
//! destroy: Ready -> VmDeleted -> NicsReclaimed -> DisksReclaimed -> Gone
//! ```

use crate::facets::ProviderClients;
use crate::locator::find_by_identifier;
use crate::model::{ManagedDiskParameters, VirtualMachine};
use crate::profile::{SCRIPT_EXTENSION_NAME, build_script_extension, build_vm_properties};
use crate::provisioner::{CreatedResource, provision_interfaces};
use crate::request::ProvisionRequest;
use crate::resource_id::ResourceId;
use armflow_cloud::{CloudError, ResourceKind, Result, TeardownReport};
use std::time::{Duration, Instant};

/// Lifecycle state of a single VM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmLifecycle {
    Requested,
    NicsProvisioned,
    VmCreated,
    ExtensionAttached,
    Ready,
    VmDeleted,
    NicsReclaimed,
    DisksReclaimed,
    Gone,
}

impl std::fmt::Display for VmLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VmLifecycle::Requested => "requested",
            VmLifecycle::NicsProvisioned => "nics-provisioned",
            VmLifecycle::VmCreated => "vm-created",
            VmLifecycle::ExtensionAttached => "extension-attached",
            VmLifecycle::Ready => "ready",
            VmLifecycle::VmDeleted => "vm-deleted",
            VmLifecycle::NicsReclaimed => "nics-reclaimed",
            VmLifecycle::DisksReclaimed => "disks-reclaimed",
            VmLifecycle::Gone => "gone",
        };
        write!(f, "{}", s)
    }
}

pub struct VmOrchestrator<'a> {
    clients: &'a ProviderClients,
}

impl<'a> VmOrchestrator<'a> {
    pub fn new(clients: &'a ProviderClients) -> Self {
        Self { clients }
    }

    fn transition(&self, vm_name: &str, state: VmLifecycle) {
        tracing::info!("VM {}: {}", vm_name, state);
    }

    /// Create a VM and everything it depends on
    ///
    /// Either returns a provisioned VM or removes what this call created.
    /// Cleanup failures are logged and the original error is returned.
    pub async fn create(&self, request: &ProvisionRequest) -> Result<VirtualMachine> {
        request.validate()?;

        let vm_name = request.vm_name.as_str();
        let rg = request.resource_group.as_str();
        self.transition(vm_name, VmLifecycle::Requested);

        let nics = match provision_interfaces(self.clients, request).await {
            Ok(nics) => nics,
            Err(failure) => {
                tracing::warn!("Provisioning interfaces for {} failed: {}", vm_name, failure.error);
                self.reclaim(&failure.created).await;
                return Err(failure.error);
            }
        };
        self.transition(vm_name, VmLifecycle::NicsProvisioned);

        let params = VirtualMachine::new(&request.location, build_vm_properties(request, &nics));
        tracing::info!("Creating VM: {} ({})", vm_name, request.vm_size);

        let vm = match self.clients.compute.create(rg, vm_name, &params).await {
            Ok(vm) => vm,
            Err(err) => {
                tracing::warn!("Creating VM {} failed: {}", vm_name, err);
                // The create may have failed after the VM came into existence
                match self.clients.compute.get(rg, vm_name).await {
                    Err(e) if e.is_not_found() => {
                        self.reclaim(&CreatedResource::from_interfaces(rg, &nics))
                            .await
                    }
                    // The VM may still hold the NICs, so tear it down as a whole
                    _ => self.compensate(rg, vm_name).await,
                }
                return Err(err);
            }
        };

        if vm.is_failed() {
            let err = CloudError::provider(
                "ProvisioningFailed",
                format!("virtual machine {} ended in provisioning state Failed", vm_name),
            );
            tracing::warn!("{}", err);
            self.compensate(rg, vm_name).await;
            return Err(err);
        }
        self.transition(vm_name, VmLifecycle::VmCreated);

        if let Some(extension) = build_script_extension(request) {
            match self
                .clients
                .extensions
                .create(rg, vm_name, SCRIPT_EXTENSION_NAME, &extension)
                .await
            {
                Ok(_) => self.transition(vm_name, VmLifecycle::ExtensionAttached),
                Err(e) => {
                    tracing::warn!("Attaching script extension to {} failed: {}", vm_name, e)
                }
            }
        }

        self.transition(vm_name, VmLifecycle::Ready);
        Ok(vm)
    }

    /// Tear down a VM created during a failed `create`
    async fn compensate(&self, rg: &str, vm_name: &str) {
        tracing::info!("Rolling back VM {} in {}", vm_name, rg);
        match self.teardown(vm_name, rg, vm_name).await {
            Ok(report) => tracing::info!("Rolled back {}", report),
            Err(e) => tracing::error!(
                "Rollback of {} failed, resources may need manual cleanup: {}",
                vm_name,
                e
            ),
        }
    }

    /// Delete resources created before a VM existed, newest first
    async fn reclaim(&self, created: &[CreatedResource]) {
        for resource in created.iter().rev() {
            let result = match resource.kind {
                ResourceKind::NetworkInterface => {
                    self.clients
                        .network_interfaces
                        .delete(&resource.resource_group, &resource.name)
                        .await
                }
                ResourceKind::PublicIp => {
                    self.clients
                        .public_ips
                        .delete(&resource.resource_group, &resource.name)
                        .await
                }
                _ => continue,
            };
            match result {
                Ok(()) => tracing::info!("Reclaimed {} {}", resource.kind, resource.name),
                Err(e) if e.is_not_found() => {}
                Err(e) => tracing::error!(
                    "Failed to reclaim {} {}, manual cleanup required: {}",
                    resource.kind,
                    resource.name,
                    e
                ),
            }
        }
    }

    /// Delete a VM and then its NICs, public IPs and disks
    ///
    /// A VM that does not exist is not an error. Once the VM is deleted,
    /// teardown runs to the end; resources found missing are recorded as
    /// already gone and any other failure turns the result into
    /// `CloudError::PartialTeardown`.
    pub async fn destroy(&self, identifier: &str) -> Result<TeardownReport> {
        let located = match find_by_identifier(self.clients, identifier).await {
            Ok(vm) => vm,
            Err(e) if e.is_not_found() => {
                tracing::info!("VM {} not found, nothing to destroy", identifier);
                return Ok(TeardownReport::already_gone(identifier));
            }
            Err(e) => return Err(e),
        };
        let rg = located.resource_group()?;
        self.teardown(identifier, &rg, &located.name).await
    }

    /// Delete a VM at a known resource group and name, then its dependents
    async fn teardown(&self, identifier: &str, rg: &str, vm_name: &str) -> Result<TeardownReport> {
        let start = Instant::now();

        // Disk names and NIC references are not retrievable after the VM is gone
        let vm = match self.clients.compute.get(rg, vm_name).await {
            Ok(vm) => vm,
            Err(e) if e.is_not_found() => {
                tracing::info!("VM {} disappeared before teardown", identifier);
                return Ok(TeardownReport::already_gone(identifier));
            }
            Err(e) => return Err(e),
        };
        let nic_ids = vm.network_interface_ids();
        let os_disk = vm
            .os_disk()
            .and_then(|d| disk_target(d.name.as_deref(), d.managed_disk.as_ref(), rg));
        let data_disks: Vec<(String, String)> = vm
            .data_disks()
            .iter()
            .filter_map(|d| disk_target(d.name.as_deref(), d.managed_disk.as_ref(), rg))
            .collect();

        let mut report = TeardownReport::new(identifier);

        tracing::info!("Deleting VM: {}", vm.name);
        match self.clients.compute.delete(rg, &vm.name).await {
            Ok(()) => report.add_deleted(ResourceKind::VirtualMachine, &vm.name),
            Err(e) if e.is_not_found() => {
                report.add_already_gone(ResourceKind::VirtualMachine, &vm.name)
            }
            Err(e) => return Err(e),
        }
        self.transition(&vm.name, VmLifecycle::VmDeleted);

        for nic_id in &nic_ids {
            self.reclaim_interface(&mut report, nic_id).await;
        }
        self.transition(&vm.name, VmLifecycle::NicsReclaimed);

        if let Some((disk_rg, name)) = &os_disk {
            let result = self.clients.disks.delete(disk_rg, name).await;
            record(&mut report, ResourceKind::OsDisk, name, result);
        }
        for (disk_rg, name) in &data_disks {
            let result = self.clients.disks.delete(disk_rg, name).await;
            record(&mut report, ResourceKind::DataDisk, name, result);
        }
        self.transition(&vm.name, VmLifecycle::DisksReclaimed);

        report.duration_ms = saturating_millis(start.elapsed());

        if !report.is_success() {
            tracing::warn!("Teardown of {} incomplete: {}", identifier, report);
            return Err(CloudError::PartialTeardown(report));
        }
        self.transition(&vm.name, VmLifecycle::Gone);
        Ok(report)
    }

    /// Delete one NIC, then the public IP it referenced
    async fn reclaim_interface(&self, report: &mut TeardownReport, nic_id: &str) {
        let id = match ResourceId::parse(nic_id) {
            Ok(id) => id,
            Err(e) => {
                report.add_failure(ResourceKind::NetworkInterface, nic_id, e.to_string());
                return;
            }
        };

        let nic = match self
            .clients
            .network_interfaces
            .get(&id.resource_group, &id.name)
            .await
        {
            Ok(nic) => nic,
            Err(e) => {
                record(report, ResourceKind::NetworkInterface, &id.name, Err(e));
                return;
            }
        };
        let public_ip = nic
            .public_ip_address_id()
            .map(|raw| (raw.to_string(), ResourceId::parse(raw)));

        let result = self
            .clients
            .network_interfaces
            .delete(&id.resource_group, &id.name)
            .await;
        if !record(report, ResourceKind::NetworkInterface, &id.name, result) {
            // The public IP is still referenced by the NIC
            return;
        }

        match public_ip {
            Some((_, Ok(pip))) => {
                let result = self
                    .clients
                    .public_ips
                    .delete(&pip.resource_group, &pip.name)
                    .await;
                record(report, ResourceKind::PublicIp, &pip.name, result);
            }
            Some((raw, Err(e))) => {
                report.add_failure(ResourceKind::PublicIp, raw, e.to_string())
            }
            None => {}
        }
    }
}

/// Resource group and name of a managed disk, preferring its resource ID
fn disk_target(
    name: Option<&str>,
    managed_disk: Option<&ManagedDiskParameters>,
    default_rg: &str,
) -> Option<(String, String)> {
    if let Some(id) = managed_disk
        .and_then(|m| m.id.as_deref())
        .and_then(|id| ResourceId::parse(id).ok())
    {
        return Some((id.resource_group, id.name));
    }
    name.map(|n| (default_rg.to_string(), n.to_string()))
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Record a teardown step; returns whether the resource is gone
fn record(report: &mut TeardownReport, kind: ResourceKind, name: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => {
            tracing::info!("Deleted {}: {}", kind, name);
            report.add_deleted(kind, name);
            true
        }
        Err(e) if e.is_not_found() => {
            tracing::warn!("{} {} already gone", kind, name);
            report.add_already_gone(kind, name);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to delete {} {}: {}", kind, name, e);
            report.add_failure(kind, name, e.to_string());
            false
        }
    }
}
