//! Two-phase validation of one request
//!
//! ```text
//! Built ──syntax──▶ SyntaxChecked ──semantics──▶ SemanticsChecked ──▶ Accepted
//!   │                    │
//!   └────────────────────┴──────── failure ──────────────────────────▶ Rejected
//! ```
//!
//! The syntax pass checks the tree in isolation. The semantic pass first
//! merges dependent data into the tree, then checks references, mandatory
//! fields and cardinality. A rejected request keeps its error and returns it
//! on every later call.

use std::fmt;

use tracing::{debug, trace};

use crate::engine::{SchemaEngine, ValidationMode};
use crate::translate::{translate_pending, ErrorKind, ErrorRecord, ValidationResult};
use crate::tree::DataTree;

/// Progress of one request through the passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    Built,
    SyntaxChecked,
    SemanticsChecked,
    Accepted,
    Rejected,
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationState::Built => "built",
            ValidationState::SyntaxChecked => "syntax_checked",
            ValidationState::SemanticsChecked => "semantics_checked",
            ValidationState::Accepted => "accepted",
            ValidationState::Rejected => "rejected",
        };
        write!(f, "{}", name)
    }
}

/// A tree under validation and where it stands
#[derive(Debug)]
pub struct ValidationRequest {
    tree: DataTree,
    state: ValidationState,
    error: Option<ErrorRecord>,
}

impl ValidationRequest {
    /// Wraps a freshly built tree
    pub fn new(tree: DataTree) -> Self {
        Self {
            tree,
            state: ValidationState::Built,
            error: None,
        }
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    /// The tree, including any dependent data merged by the semantic pass
    pub fn tree(&self) -> &DataTree {
        &self.tree
    }

    /// The failure that rejected the request
    pub fn error(&self) -> Option<&ErrorRecord> {
        self.error.as_ref()
    }

    pub fn into_tree(self) -> DataTree {
        self.tree
    }

    fn rejected(&self) -> ValidationResult<()> {
        match &self.error {
            Some(error) if self.state == ValidationState::Rejected => Err(error.clone()),
            _ => Ok(()),
        }
    }

    fn reject(&mut self, error: ErrorRecord) -> ValidationResult<()> {
        self.state = ValidationState::Rejected;
        self.error = Some(error.clone());
        Err(error)
    }
}

/// Drives validation passes against one schema engine
#[derive(Clone, Copy)]
pub struct Validator<'e> {
    engine: &'e dyn SchemaEngine,
}

impl<'e> Validator<'e> {
    pub fn new(engine: &'e dyn SchemaEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &'e dyn SchemaEngine {
        self.engine
    }

    /// Edit-mode pass over the request tree alone
    pub fn validate_syntax(&self, request: &mut ValidationRequest) -> ValidationResult<()> {
        request.rejected()?;

        match self.run(&request.tree, ValidationMode::Edit) {
            Ok(()) => {
                request.state = ValidationState::SyntaxChecked;
                Ok(())
            }
            Err(error) => request.reject(error),
        }
    }

    /// Full-mode pass. `dependent` and `other` are consumed into the request
    /// tree; the session's `cached` tree is merged without being consumed.
    ///
    /// On a key conflict the request's own entry wins, then `dependent`,
    /// then `cached`, then `other`.
    pub fn validate_semantics(
        &self,
        request: &mut ValidationRequest,
        dependent: Option<DataTree>,
        cached: Option<&DataTree>,
        other: Option<DataTree>,
    ) -> ValidationResult<()> {
        request.rejected()?;

        let mut merged = other.unwrap_or_default();
        if let Some(cached) = cached {
            merged.merge_ref(cached);
        }
        if let Some(dependent) = dependent {
            merged.merge(dependent);
        }
        merged.merge(std::mem::take(&mut request.tree));
        request.tree = merged;

        match self.run(&request.tree, ValidationMode::Full) {
            Ok(()) => {
                request.state = ValidationState::SemanticsChecked;
                trace!(entries = request.tree.entry_count(), "semantics checked");
                request.state = ValidationState::Accepted;
                Ok(())
            }
            Err(error) => request.reject(error),
        }
    }

    /// One full-mode pass over text inputs: `data` with `dep_data` and
    /// `other_dep_data` merged in. `data` wins on key conflicts.
    pub fn validate_all(
        &self,
        data: &str,
        dep_data: Option<&str>,
        other_dep_data: Option<&str>,
    ) -> ValidationResult<ValidationRequest> {
        let tree = self.parse_input(data)?;
        if tree.is_empty() {
            return Err(no_input_data());
        }

        // Later inputs win on key conflicts, so merge back to front
        let mut merged = DataTree::new();
        let dependents = [other_dep_data, dep_data]
            .into_iter()
            .flatten()
            .filter(|text| !text.trim().is_empty());
        for text in dependents {
            merged.merge(self.parse_input(text)?);
        }
        merged.merge(tree);
        let mut request = ValidationRequest::new(merged);

        match self.run(&request.tree, ValidationMode::Full) {
            Ok(()) => {
                request.state = ValidationState::Accepted;
                Ok(request)
            }
            Err(error) => {
                request.state = ValidationState::Rejected;
                Err(error)
            }
        }
    }

    fn parse_input(&self, text: &str) -> ValidationResult<DataTree> {
        if text.trim().is_empty() {
            return Err(no_input_data());
        }
        self.engine.parse(text).map_err(|e| {
            ErrorRecord::new(ErrorKind::SyntaxInvalidInputData, e.to_string())
        })
    }

    fn run(&self, tree: &DataTree, mode: ValidationMode) -> ValidationResult<()> {
        if self.engine.validate(tree, mode).is_ok() {
            debug!(%mode, "engine pass succeeded");
            return Ok(());
        }

        let record = translate_pending(self.engine);
        self.engine.clear_error();
        if record.is_success() {
            // The engine failed without telling us why
            return Err(ErrorRecord::new(
                ErrorKind::InternalUnknown,
                format!("{} validation failed without a pending error", mode),
            ));
        }

        debug!(%mode, kind = %record.kind, table = %record.table_name, "engine pass failed");
        Err(record)
    }
}

fn no_input_data() -> ErrorRecord {
    ErrorRecord::new(ErrorKind::SyntaxInvalidInputData, "no input data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineFailure, RawError};
    use crate::fixtures;
    use crate::schema::TableSchema;
    use crate::tree::{dump, EntryNode, TreeResult};

    fn rule(name: &str, leaves: &[(&str, &str)]) -> DataTree {
        let mut entry = EntryNode::new(vec![
            ("aclname".into(), "DATAACL".into()),
            ("rulename".into(), name.into()),
        ]);
        for (leaf, value) in leaves {
            entry.set_leaf(leaf, vec![value.to_string()], false);
        }
        let mut tree = DataTree::new();
        tree.push_entry("ACL_RULE", "sonic-acl", entry);
        tree
    }

    fn acl_table() -> DataTree {
        let mut entry = EntryNode::new(vec![("aclname".into(), "DATAACL".into())]);
        entry.set_leaf("type", vec!["L3".into()], false);
        let mut tree = DataTree::new();
        tree.push_entry("ACL_TABLE", "sonic-acl", entry);
        tree
    }

    #[test]
    fn test_syntax_then_semantics_accepted() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let mut request = ValidationRequest::new(rule("R1", &[("PRIORITY", "10")]));

        validator.validate_syntax(&mut request).unwrap();
        assert_eq!(request.state(), ValidationState::SyntaxChecked);

        validator
            .validate_semantics(&mut request, Some(acl_table()), None, None)
            .unwrap();
        assert_eq!(request.state(), ValidationState::Accepted);
        assert_eq!(request.tree().entry_count(), 2);
    }

    #[test]
    fn test_syntax_failure_rejects() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let mut request = ValidationRequest::new(rule("R1", &[("PRIORITY", "99999")]));

        let err = validator.validate_syntax(&mut request).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxOutOfRange);
        assert_eq!(err.field, "PRIORITY");
        assert_eq!(err.value, "99999");
        assert_eq!(request.state(), ValidationState::Rejected);
        assert_eq!(request.error(), Some(&err));

        // A rejected request replays its error without another pass
        let again = validator
            .validate_semantics(&mut request, Some(acl_table()), None, None)
            .unwrap_err();
        assert_eq!(again, err);
        assert_eq!(request.tree().entry_count(), 1);
    }

    #[test]
    fn test_syntax_pass_ignores_references() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let mut request = ValidationRequest::new(rule("R1", &[("PRIORITY", "10")]));

        validator.validate_syntax(&mut request).unwrap();
        let err = validator
            .validate_semantics(&mut request, None, None, None)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SemanticDependentDataMissing);
        assert_eq!(err.table_name, "ACL_RULE");
        assert_eq!(err.keys, vec!["DATAACL", "R1"]);
    }

    #[test]
    fn test_cached_tree_merged_without_consuming() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let cached = acl_table();

        for name in ["R1", "R2"] {
            let mut request = ValidationRequest::new(rule(name, &[("PRIORITY", "10")]));
            validator
                .validate_semantics(&mut request, None, Some(&cached), None)
                .unwrap();
        }
        assert_eq!(cached.entry_count(), 1);
    }

    #[test]
    fn test_request_entry_wins_over_dependent() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let mut request = ValidationRequest::new(rule("R1", &[("PRIORITY", "10")]));

        let mut dependent = acl_table();
        dependent.merge(rule("R1", &[("PRIORITY", "99999")]));

        validator
            .validate_semantics(&mut request, Some(dependent), None, None)
            .unwrap();
        let entry = request.tree().find_entry("ACL_RULE", &["DATAACL", "R1"]).unwrap();
        assert_eq!(entry.value_of("PRIORITY").as_deref(), Some("10"));
    }

    #[test]
    fn test_must_rule_surfaces_constraint_text() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let mut request =
            ValidationRequest::new(rule("R1", &[("PRIORITY", "10"), ("IP_PROTOCOL", "6")]));

        let err = validator
            .validate_semantics(&mut request, None, None, Some(acl_table()))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SemanticDependentDataMissing);
        assert_eq!(err.constraint_message, "IP_PROTOCOL requires a layer 4 port");
        assert_eq!(err.app_tag, "l4-port-required");
    }

    #[test]
    fn test_validate_all_text_inputs() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let data = dump(&rule("R1", &[("PRIORITY", "10")])).unwrap();
        let dep = dump(&acl_table()).unwrap();

        let request = validator.validate_all(&data, Some(&dep), None).unwrap();
        assert_eq!(request.state(), ValidationState::Accepted);

        let err = validator.validate_all(&data, None, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SemanticDependentDataMissing);
    }

    #[test]
    fn test_validate_all_no_input_data() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);

        for data in ["", "   ", r#"{"tables":[]}"#] {
            let err = validator.validate_all(data, None, None).unwrap_err();
            assert_eq!(err.kind, ErrorKind::SyntaxInvalidInputData);
            assert_eq!(err.message, "no input data");
        }
    }

    #[test]
    fn test_validate_all_unparseable_input() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let err = validator.validate_all("<config/>", None, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxInvalidInputData);
        assert_ne!(err.message, "no input data");
    }

    /// Fails every pass without recording an error
    struct SilentEngine;

    impl SchemaEngine for SilentEngine {
        fn table_schema(&self, _table: &str) -> Option<&TableSchema> {
            None
        }
        fn parse(&self, text: &str) -> TreeResult<DataTree> {
            DataTree::parse(text)
        }
        fn validate(&self, _tree: &DataTree, _mode: ValidationMode) -> Result<(), EngineFailure> {
            Err(EngineFailure)
        }
        fn first_error(&self) -> Option<RawError> {
            None
        }
        fn clear_error(&self) {}
    }

    #[test]
    fn test_failure_without_pending_error_is_internal_unknown() {
        let validator = Validator::new(&SilentEngine);
        let mut request = ValidationRequest::new(acl_table());
        let err = validator.validate_syntax(&mut request).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InternalUnknown);
    }

    #[test]
    fn test_pending_error_cleared_after_translation() {
        let engine = fixtures::engine();
        let validator = Validator::new(&engine);
        let mut request = ValidationRequest::new(rule("R1", &[("PRIORITY", "x")]));
        assert!(validator.validate_syntax(&mut request).is_err());
        assert!(engine.first_error().is_none());
    }
}
