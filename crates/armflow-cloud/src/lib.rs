//! armflow Cloud Compute Abstraction
//!
//! This crate defines the contract between the orchestration host and a
//! compute-resource provider adapter, along with the error taxonomy and
//! reporting types shared by every adapter.
//!
//! # Supported Providers
//!
//! - **Azure Resource Manager**: VMs, NICs, public IPs, managed disks
//!   (see `armflow-cloud-azure`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   armflow CLI                    │
//! │             (create / destroy / list)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 armflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        Compute Resource Contract          │   │
//! │  │  trait ComputeResource { ... }            │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────┐         │
//! │  │  CloudError  │  │  TeardownReport  │         │
//! │  └──────────────┘  └──────────────────┘         │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼────────────┐
//! │ azure-rm adapter   │
//! └────────────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod report;

// Re-exports
pub use error::{CloudError, Result};
pub use provider::{AuthStatus, Capability, ComputeResource, NamedResource, RetryConfig};
pub use report::{ResourceKind, StepOutcome, TeardownReport, TeardownStep, TeardownSummary};
