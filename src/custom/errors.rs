//! Hook registration errors

use thiserror::Error;

/// Result type for hook registration
pub type HookResult<T> = Result<T, HookError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("Hook already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid hook name: {0:?}")]
    InvalidName(String),
}

impl HookError {
    pub fn code(&self) -> &'static str {
        match self {
            HookError::AlreadyRegistered(_) => "CFGVAL_HOOK_ALREADY_REGISTERED",
            HookError::InvalidName(_) => "CFGVAL_HOOK_INVALID_NAME",
        }
    }
}
