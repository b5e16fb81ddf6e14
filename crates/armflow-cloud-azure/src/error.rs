//! Azure Resource Manager transport error types

use armflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token request failed: {0}")]
    Token(String),

    #[error("ARM API error ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Long-running operation {status}: {message}")]
    Operation { status: String, message: String },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArmError>;

impl From<ArmError> for CloudError {
    fn from(err: ArmError) -> Self {
        match err {
            ArmError::Api {
                status: 404,
                code,
                message,
            } => CloudError::NotFound(format!("{}: {}", code, message)),
            ArmError::Api {
                status: 401 | 403,
                code,
                message,
            } => CloudError::Permission(format!("{}: {}", code, message)),
            ArmError::Api {
                status,
                code,
                message,
            } => CloudError::Provider {
                status: Some(status),
                code,
                message,
            },
            ArmError::Token(message) => CloudError::Permission(message),
            ArmError::Operation { status, message } => CloudError::Provider {
                status: None,
                code: status,
                message,
            },
            ArmError::Timeout(secs) => {
                CloudError::provider("OperationTimeout", format!("timed out after {}s", secs))
            }
            ArmError::JsonError(e) => CloudError::Json(e),
            ArmError::Http(e) => CloudError::provider("HttpError", e.to_string()),
        }
    }
}
