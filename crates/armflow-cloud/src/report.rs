//! Teardown reporting for dependent-resource cleanup

use serde::{Deserialize, Serialize};

/// Kind of provider-side resource touched during a VM lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    VirtualMachine,
    NetworkInterface,
    PublicIp,
    OsDisk,
    DataDisk,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::VirtualMachine => write!(f, "virtual machine"),
            ResourceKind::NetworkInterface => write!(f, "network interface"),
            ResourceKind::PublicIp => write!(f, "public ip"),
            ResourceKind::OsDisk => write!(f, "os disk"),
            ResourceKind::DataDisk => write!(f, "data disk"),
        }
    }
}

/// Outcome of a single teardown step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Deleted,
    /// The resource was already gone when teardown reached it
    AlreadyGone,
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownStep {
    pub kind: ResourceKind,

    /// Provider-side name or resource ID
    pub name: String,

    pub outcome: StepOutcome,
}

/// Result of tearing down a VM and its dependent resources
///
/// Steps are recorded in the order they were attempted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeardownReport {
    /// Identifier the teardown was requested for
    pub identifier: String,

    /// Whether the VM existed when teardown started
    pub found: bool,

    pub steps: Vec<TeardownStep>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl TeardownReport {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            found: true,
            steps: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Report for a VM that did not exist; nothing was deleted
    pub fn already_gone(identifier: impl Into<String>) -> Self {
        Self {
            found: false,
            ..Self::new(identifier)
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn add_deleted(&mut self, kind: ResourceKind, name: impl Into<String>) {
        self.push(kind, name, StepOutcome::Deleted);
    }

    pub fn add_already_gone(&mut self, kind: ResourceKind, name: impl Into<String>) {
        self.push(kind, name, StepOutcome::AlreadyGone);
    }

    pub fn add_failure(&mut self, kind: ResourceKind, name: impl Into<String>, error: String) {
        self.push(kind, name, StepOutcome::Failed(error));
    }

    fn push(&mut self, kind: ResourceKind, name: impl Into<String>, outcome: StepOutcome) {
        self.steps.push(TeardownStep {
            kind,
            name: name.into(),
            outcome,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &TeardownStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }

    pub fn summary(&self) -> TeardownSummary {
        let mut summary = TeardownSummary::default();
        for step in &self.steps {
            match step.outcome {
                StepOutcome::Deleted => summary.deleted += 1,
                StepOutcome::AlreadyGone => summary.already_gone += 1,
                StepOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

impl std::fmt::Display for TeardownReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.identifier, self.summary())?;
        for step in self.failures() {
            if let StepOutcome::Failed(ref error) = step.outcome {
                write!(f, "; {} {} ({})", step.kind, step.name, error)?;
            }
        }
        Ok(())
    }
}

/// Summary of teardown steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownSummary {
    pub deleted: usize,
    pub already_gone: usize,
    pub failed: usize,
}

impl std::fmt::Display for TeardownSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} deleted, {} already gone, {} failed",
            self.deleted, self.already_gone, self.failed
        )
    }
}
