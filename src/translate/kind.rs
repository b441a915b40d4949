//! Error kinds reported to callers
//!
//! Codes are stable strings of the form `CFGVAL_<CATEGORY>_<NAME>`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::codes;

/// Broad class of an error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Success,
    Syntax,
    Semantic,
    Internal,
}

/// Structured error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorKind {
    #[default]
    Success,
    SyntaxMissingField,
    SyntaxInvalidField,
    SyntaxInvalidInputData,
    SyntaxMultipleInstance,
    SyntaxDuplicate,
    SyntaxEnumInvalid,
    SyntaxEnumInvalidName,
    SyntaxEnumWhitespace,
    SyntaxOutOfRange,
    SyntaxMinimumInvalid,
    SyntaxMaximumInvalid,
    SemanticDependentDataMissing,
    SemanticMandatoryDataMissing,
    SemanticKeyAlreadyExists,
    SemanticKeyNotExist,
    SemanticKeyDuplicate,
    SemanticKeyInvalid,
    InternalUnknown,
    /// Caller-level operation failed independent of engine codes
    Failure,
}

impl ErrorKind {
    /// Maps a raw engine code. Unmapped codes become `InternalUnknown`.
    pub fn from_raw(code: u32) -> Self {
        match code {
            codes::SUCCESS => ErrorKind::Success,
            codes::MISSING_ELEMENT => ErrorKind::SyntaxMissingField,
            codes::INVALID_ELEMENT => ErrorKind::SyntaxInvalidField,
            codes::INVALID_STATEMENT => ErrorKind::SyntaxInvalidInputData,
            codes::TOO_MANY => ErrorKind::SyntaxMultipleInstance,
            codes::DUPLICATE_ID => ErrorKind::SyntaxDuplicate,
            codes::ENUM_INVALID => ErrorKind::SyntaxEnumInvalid,
            codes::ENUM_INVALID_NAME => ErrorKind::SyntaxEnumInvalidName,
            codes::ENUM_WHITESPACE => ErrorKind::SyntaxEnumWhitespace,
            codes::OUT_OF_RANGE => ErrorKind::SyntaxOutOfRange,
            codes::MIN_ELEMENTS => ErrorKind::SyntaxMinimumInvalid,
            codes::MAX_ELEMENTS => ErrorKind::SyntaxMaximumInvalid,
            codes::NO_LEAFREF | codes::MUST_FAILED => ErrorKind::SemanticDependentDataMissing,
            codes::MANDATORY_MISSING => ErrorKind::SemanticMandatoryDataMissing,
            codes::ALREADY_EXISTS => ErrorKind::SemanticKeyAlreadyExists,
            codes::KEY_NOT_EXIST => ErrorKind::SemanticKeyNotExist,
            codes::DUPLICATE_KEY => ErrorKind::SemanticKeyDuplicate,
            codes::INVALID_KEY | codes::MISSING_KEY => ErrorKind::SemanticKeyInvalid,
            _ => ErrorKind::InternalUnknown,
        }
    }

    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Success => "CFGVAL_SUCCESS",
            ErrorKind::SyntaxMissingField => "CFGVAL_SYNTAX_MISSING_FIELD",
            ErrorKind::SyntaxInvalidField => "CFGVAL_SYNTAX_INVALID_FIELD",
            ErrorKind::SyntaxInvalidInputData => "CFGVAL_SYNTAX_INVALID_INPUT_DATA",
            ErrorKind::SyntaxMultipleInstance => "CFGVAL_SYNTAX_MULTIPLE_INSTANCE",
            ErrorKind::SyntaxDuplicate => "CFGVAL_SYNTAX_DUPLICATE",
            ErrorKind::SyntaxEnumInvalid => "CFGVAL_SYNTAX_ENUM_INVALID",
            ErrorKind::SyntaxEnumInvalidName => "CFGVAL_SYNTAX_ENUM_INVALID_NAME",
            ErrorKind::SyntaxEnumWhitespace => "CFGVAL_SYNTAX_ENUM_WHITESPACE",
            ErrorKind::SyntaxOutOfRange => "CFGVAL_SYNTAX_OUT_OF_RANGE",
            ErrorKind::SyntaxMinimumInvalid => "CFGVAL_SYNTAX_MINIMUM_INVALID",
            ErrorKind::SyntaxMaximumInvalid => "CFGVAL_SYNTAX_MAXIMUM_INVALID",
            ErrorKind::SemanticDependentDataMissing => "CFGVAL_SEMANTIC_DEPENDENT_DATA_MISSING",
            ErrorKind::SemanticMandatoryDataMissing => "CFGVAL_SEMANTIC_MANDATORY_DATA_MISSING",
            ErrorKind::SemanticKeyAlreadyExists => "CFGVAL_SEMANTIC_KEY_ALREADY_EXISTS",
            ErrorKind::SemanticKeyNotExist => "CFGVAL_SEMANTIC_KEY_NOT_EXIST",
            ErrorKind::SemanticKeyDuplicate => "CFGVAL_SEMANTIC_KEY_DUPLICATE",
            ErrorKind::SemanticKeyInvalid => "CFGVAL_SEMANTIC_KEY_INVALID",
            ErrorKind::InternalUnknown => "CFGVAL_INTERNAL_UNKNOWN",
            ErrorKind::Failure => "CFGVAL_FAILURE",
        }
    }

    /// Returns the category of this kind
    pub fn category(&self) -> Category {
        match self {
            ErrorKind::Success => Category::Success,
            ErrorKind::SyntaxMissingField
            | ErrorKind::SyntaxInvalidField
            | ErrorKind::SyntaxInvalidInputData
            | ErrorKind::SyntaxMultipleInstance
            | ErrorKind::SyntaxDuplicate
            | ErrorKind::SyntaxEnumInvalid
            | ErrorKind::SyntaxEnumInvalidName
            | ErrorKind::SyntaxEnumWhitespace
            | ErrorKind::SyntaxOutOfRange
            | ErrorKind::SyntaxMinimumInvalid
            | ErrorKind::SyntaxMaximumInvalid => Category::Syntax,
            ErrorKind::SemanticDependentDataMissing
            | ErrorKind::SemanticMandatoryDataMissing
            | ErrorKind::SemanticKeyAlreadyExists
            | ErrorKind::SemanticKeyNotExist
            | ErrorKind::SemanticKeyDuplicate
            | ErrorKind::SemanticKeyInvalid => Category::Semantic,
            ErrorKind::InternalUnknown | ErrorKind::Failure => Category::Internal,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == ErrorKind::Success
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_code_mapping() {
        assert_eq!(ErrorKind::from_raw(codes::SUCCESS), ErrorKind::Success);
        assert_eq!(ErrorKind::from_raw(codes::OUT_OF_RANGE), ErrorKind::SyntaxOutOfRange);
        assert_eq!(
            ErrorKind::from_raw(codes::MUST_FAILED),
            ErrorKind::SemanticDependentDataMissing
        );
        assert_eq!(ErrorKind::from_raw(codes::MISSING_KEY), ErrorKind::SemanticKeyInvalid);
        assert_eq!(ErrorKind::from_raw(9999), ErrorKind::InternalUnknown);
    }

    #[test]
    fn test_every_raw_code_is_classified() {
        for code in 1..=19 {
            assert_ne!(ErrorKind::from_raw(code), ErrorKind::InternalUnknown, "code {}", code);
        }
    }

    #[test]
    fn test_codes_and_categories() {
        assert_eq!(ErrorKind::SyntaxDuplicate.code(), "CFGVAL_SYNTAX_DUPLICATE");
        assert_eq!(ErrorKind::SyntaxDuplicate.category(), Category::Syntax);
        assert_eq!(ErrorKind::SemanticKeyNotExist.category(), Category::Semantic);
        assert_eq!(ErrorKind::Failure.category(), Category::Internal);
        assert!(ErrorKind::Success.is_success());
        assert_eq!(ErrorKind::InternalUnknown.to_string(), "CFGVAL_INTERNAL_UNKNOWN");
    }
}
