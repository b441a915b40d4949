//! Store access errors

use thiserror::Error;

/// Result type for store reads
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a [`super::StoreClient`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid key pattern: {0}")]
    InvalidPattern(String),
}

impl StoreError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "CFGVAL_STORE_UNAVAILABLE",
            StoreError::InvalidPattern(_) => "CFGVAL_STORE_INVALID_PATTERN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            StoreError::Unavailable("down".into()).code(),
            "CFGVAL_STORE_UNAVAILABLE"
        );
        let err = StoreError::InvalidPattern("ACL_RULE|[".into());
        assert_eq!(err.code(), "CFGVAL_STORE_INVALID_PATTERN");
        assert_eq!(err.to_string(), "Invalid key pattern: ACL_RULE|[");
    }
}
