//! Azure Resource Manager provider for armflow
//!
//! This crate implements the `ComputeResource` contract for Azure,
//! creating and destroying VMs together with the network interfaces,
//! public IPs and managed disks they depend on.
//!
//! # Features
//!
//! - VM creation with per-slot public IPs and NICs, managed OS/data disks
//!   and an optional custom script extension
//! - Ordered, idempotent teardown of a VM and its dependent resources
//! - Enumeration of resource groups, networks, subnets, storage accounts,
//!   subscriptions and VM sizes
//!
//! # Requirements
//!
//! - A service principal (client id + secret) in the target tenant
//! - Read/write access to the subscription
//!
//! # Example
//!
//! ```ignore
//! use armflow_cloud::ComputeResource;
//! use armflow_cloud_azure::{ArmConfig, AzureRmProvider};
//!
//! let provider = AzureRmProvider::connect(ArmConfig::from_env())?;
//!
//! // Check credentials
//! provider.test_connection().await?;
//!
//! // Tear down a VM and everything attached to it
//! let report = provider.destroy_vm("web01").await?;
//! println!("{}", report);
//! ```

pub mod config;
pub mod error;
pub mod facets;
pub mod locator;
pub mod model;
pub mod orchestrator;
pub mod profile;
pub mod provider;
pub mod provisioner;
pub mod request;
pub mod resource_id;
pub mod rest;

pub use config::ArmConfig;
pub use error::{ArmError, Result};
pub use facets::ProviderClients;
pub use orchestrator::{VmLifecycle, VmOrchestrator};
pub use provider::{AzureRmProvider, LOCATIONS};
pub use request::{HostVmAttributes, Platform, ProvisionRequest};
pub use resource_id::ResourceId;
pub use rest::ArmClient;
