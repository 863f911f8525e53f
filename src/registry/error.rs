//! Registry store errors.

use thiserror::Error;

use crate::registry::types::DeviceKey;

/// Errors returned by [`RegistryStore`](crate::registry::RegistryStore) operations.
///
/// These are local to the caller and never fatal to the process.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("device {0} already exists")]
    AlreadyExists(DeviceKey),

    #[error("device {0} not found")]
    NotFound(DeviceKey),

    #[error("invalid device key: {0}")]
    InvalidKey(String),

    #[error("invalid page token: {0}")]
    InvalidPageToken(String),
}

impl StoreError {
    /// Short label used for metrics and API error codes.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::AlreadyExists(_) => "already_exists",
            StoreError::NotFound(_) => "not_found",
            StoreError::InvalidKey(_) => "invalid_key",
            StoreError::InvalidPageToken(_) => "invalid_page_token",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
