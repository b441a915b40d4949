//! Data tree manager
//!
//! Builds, merges, dumps and releases the in-memory trees the schema engine
//! validates. A tree is an owned value:
//!
//! - a destructive merge takes the source by value, so the source can no
//!   longer be used once merged
//! - a non-destructive merge borrows the source and leaves it usable
//! - release is `Drop`, which runs on every exit path
//!
//! The text form of a tree is the JSON produced by [`dump`].

mod builder;
mod errors;
mod node;

pub use builder::{build_leaf, NULL_FIELD};
pub use errors::{TreeError, TreeResult};
pub use node::{DataTree, EntryNode, LeafNode, TableNode};

/// Merges `node` into the session's cumulative tree, creating it on first use.
pub fn cache(session_tree: &mut Option<DataTree>, node: DataTree) {
    match session_tree {
        Some(tree) => tree.merge(node),
        None => *session_tree = Some(node),
    }
}

/// Serializes a tree to its text form for diagnostics.
pub fn dump(tree: &DataTree) -> TreeResult<String> {
    serde_json::to_string_pretty(tree).map_err(|e| TreeError::Serialize(e.to_string()))
}

/// Frees a tree and all of its descendants.
pub fn release(tree: DataTree) {
    drop(tree);
}
