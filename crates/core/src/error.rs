//! Error taxonomy shared by the stores and their adapters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures produced by store operations and the remote directory.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Registration attempted with an email the directory already knows.
    #[error("Email already registered")]
    ValidationConflict,

    /// No user record matched the supplied credentials.
    #[error("Invalid email or password")]
    AuthRejected,

    /// The directory refused to create a user record.
    #[error("Registration failed")]
    RegistrationRejected,

    /// Network-level failure talking to the remote directory.
    #[error("{0}")]
    Transport(String),

    /// The remote directory answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },

    /// Malformed JSON, remote or persisted.
    #[error("{0}")]
    Parse(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Parse(err.to_string())
    }
}

/// Result handed back to callers of every async store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the operation reached its success state.
    pub success: bool,
    /// Message describing the failure, if one should be shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    /// Successful outcome.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed outcome carrying a user-facing message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }

    /// Unsuccessful outcome with nothing to report.
    pub fn skipped() -> Self {
        Self {
            success: false,
            error: None,
        }
    }
}

impl From<&SyncError> for Outcome {
    fn from(err: &SyncError) -> Self {
        Outcome::failed(err.to_string())
    }
}
