//! Compute resource error types

use crate::report::TeardownReport;
use thiserror::Error;

/// Errors surfaced to the host by a compute resource adapter
///
/// Provider adapters translate whatever their transport raises into one of
/// these kinds at the client boundary.
#[derive(Error, Debug)]
pub enum CloudError {
    /// Missing connection attribute, unsupported platform, malformed image
    /// reference. Raised before any provider call.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Provider error{}: {code}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        code: String,
        message: String,
    },

    /// Teardown ran to the end but some steps failed; the report lists what
    /// was left behind.
    #[error("Teardown incomplete: {0}")]
    PartialTeardown(TeardownReport),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        CloudError::Provider {
            status: None,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
