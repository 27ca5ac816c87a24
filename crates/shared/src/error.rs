use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostErrorCode {
    Detached,
    SceneNotReady,
    UnknownItem,
    InteractionBusy,
    InteractionClosed,
    Internal,
}

/// Error record carried inside scene events, mirroring what a host
/// platform reports to its extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneError {
    pub code: HostErrorCode,
    pub message: String,
}

impl SceneError {
    pub fn new(code: HostErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct HostException {
    pub code: HostErrorCode,
    pub message: String,
}

impl HostException {
    pub fn new(code: HostErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<HostException> for SceneError {
    fn from(value: HostException) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}
