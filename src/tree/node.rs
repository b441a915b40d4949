//! Tree node types
//!
//! ```text
//! DataTree
//!  └─ TableNode (name, module)
//!      └─ EntryNode (ordered key leaves)
//!          └─ LeafNode (name, one value or a leaf-list)
//! ```

use serde::{Deserialize, Serialize};

use super::errors::{TreeError, TreeResult};

/// A single leaf or leaf-list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafNode {
    /// Field name without any multi-value suffix
    pub name: String,
    /// Values; exactly one unless `multi`
    pub values: Vec<String>,
    /// Whether this is a leaf-list
    #[serde(default)]
    pub multi: bool,
}

impl LeafNode {
    /// Values joined with `,`, the form hooks receive
    pub fn joined(&self) -> String {
        self.values.join(",")
    }
}

/// One table entry: ordered key leaves plus non-key leaves
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryNode {
    /// `(key leaf name, value)` in key order
    pub keys: Vec<(String, String)>,
    /// Non-key leaves in insertion order
    #[serde(default)]
    pub leaves: Vec<LeafNode>,
}

impl EntryNode {
    /// Create an entry with the given key leaves and no fields
    pub fn new(keys: Vec<(String, String)>) -> Self {
        Self {
            keys,
            leaves: Vec::new(),
        }
    }

    /// Sets a leaf, replacing any previous values
    pub fn set_leaf(&mut self, name: &str, values: Vec<String>, multi: bool) {
        match self.leaves.iter_mut().find(|l| l.name == name) {
            Some(leaf) => {
                leaf.values = values;
                leaf.multi = multi;
            }
            None => self.leaves.push(LeafNode {
                name: name.to_string(),
                values,
                multi,
            }),
        }
    }

    /// Looks up a leaf by name
    pub fn leaf(&self, name: &str) -> Option<&LeafNode> {
        self.leaves.iter().find(|l| l.name == name)
    }

    /// Value of a key leaf
    pub fn key_value(&self, name: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a leaf or key leaf, joining leaf-list values
    pub fn value_of(&self, name: &str) -> Option<String> {
        self.key_value(name)
            .map(str::to_string)
            .or_else(|| self.leaf(name).map(LeafNode::joined))
    }

    /// Returns whether the key values equal `other`'s
    pub fn same_key(&self, other: &EntryNode) -> bool {
        self.keys == other.keys
    }

    /// Key values only, in key order
    pub fn key_values(&self) -> Vec<String> {
        self.keys.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Engine-style path of the entry: `/module:TABLE[k='v']...`
    pub fn path(&self, module: &str, table: &str) -> String {
        let mut path = format!("/{}:{}", module, table);
        for (name, value) in &self.keys {
            path.push_str(&format!("[{}='{}']", name, value));
        }
        path
    }

    /// Engine-style path of one leaf of the entry
    pub fn leaf_path(&self, module: &str, table: &str, leaf: &str) -> String {
        format!("{}/{}", self.path(module, table), leaf)
    }

    /// Merges `other`'s leaves into this entry; `other` wins on conflicts
    fn absorb(&mut self, other: EntryNode) {
        for leaf in other.leaves {
            self.set_leaf(&leaf.name, leaf.values, leaf.multi);
        }
    }
}

/// All entries of one table present in a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    pub name: String,
    pub module: String,
    #[serde(default)]
    pub entries: Vec<EntryNode>,
}

/// An owned data tree
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataTree {
    #[serde(default)]
    tables: Vec<TableNode>,
}

impl DataTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the text form produced by [`super::dump`]
    pub fn parse(text: &str) -> TreeResult<Self> {
        serde_json::from_str(text).map_err(|e| TreeError::Parse(e.to_string()))
    }

    /// Returns true when the tree holds no entries
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.entries.is_empty())
    }

    /// Total number of entries across tables
    pub fn entry_count(&self) -> usize {
        self.tables.iter().map(|t| t.entries.len()).sum()
    }

    /// Tables in insertion order
    pub fn tables(&self) -> &[TableNode] {
        &self.tables
    }

    /// Looks up a table node
    pub fn table(&self, name: &str) -> Option<&TableNode> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Finds an entry of `table` whose key values equal `key_values`
    pub fn find_entry(&self, table: &str, key_values: &[&str]) -> Option<&EntryNode> {
        self.table(table)?.entries.iter().find(|e| {
            e.keys.len() == key_values.len()
                && e.keys.iter().zip(key_values).all(|((_, v), k)| v == k)
        })
    }

    /// Appends an entry without merging; duplicates are kept so the engine
    /// can report them
    pub fn push_entry(&mut self, table: &str, module: &str, entry: EntryNode) {
        self.table_mut(table, module).entries.push(entry);
    }

    /// Inserts an entry, merging with an existing entry of the same key
    pub fn insert_entry(&mut self, table: &str, module: &str, entry: EntryNode) {
        let node = self.table_mut(table, module);
        match node.entries.iter_mut().find(|e| e.same_key(&entry)) {
            Some(existing) => existing.absorb(entry),
            None => node.entries.push(entry),
        }
    }

    /// Removes the entry of `table` whose key values equal `key_values`
    pub fn remove_entry(&mut self, table: &str, key_values: &[&str]) -> Option<EntryNode> {
        let node = self.tables.iter_mut().find(|t| t.name == table)?;
        let idx = node.entries.iter().position(|e| {
            e.keys.len() == key_values.len()
                && e.keys.iter().zip(key_values).all(|((_, v), k)| v == k)
        })?;
        Some(node.entries.remove(idx))
    }

    fn table_mut(&mut self, table: &str, module: &str) -> &mut TableNode {
        let idx = match self.tables.iter().position(|t| t.name == table) {
            Some(idx) => idx,
            None => {
                self.tables.push(TableNode {
                    name: table.to_string(),
                    module: module.to_string(),
                    entries: Vec::new(),
                });
                self.tables.len() - 1
            }
        };
        &mut self.tables[idx]
    }

    /// Destructive merge: `source` is consumed
    pub fn merge(&mut self, source: DataTree) {
        for table in source.tables {
            for entry in table.entries {
                self.insert_entry(&table.name, &table.module, entry);
            }
        }
    }

    /// Non-destructive merge: `source` stays owned by the caller
    pub fn merge_ref(&mut self, source: &DataTree) {
        self.merge(source.clone());
    }

    /// Consumes the tree, merging `source` into it
    pub fn merged(mut self, source: DataTree) -> DataTree {
        self.merge(source);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, leaves: &[(&str, &str)]) -> EntryNode {
        let mut e = EntryNode::new(vec![("name".into(), name.into())]);
        for (leaf, value) in leaves {
            e.set_leaf(leaf, vec![value.to_string()], false);
        }
        e
    }

    #[test]
    fn test_insert_merges_same_key() {
        let mut tree = DataTree::new();
        tree.insert_entry("PORT", "sonic-port", entry("Ethernet0", &[("mtu", "1500")]));
        tree.insert_entry(
            "PORT",
            "sonic-port",
            entry("Ethernet0", &[("mtu", "9100"), ("speed", "100000")]),
        );

        assert_eq!(tree.entry_count(), 1);
        let e = tree.find_entry("PORT", &["Ethernet0"]).unwrap();
        assert_eq!(e.value_of("mtu").as_deref(), Some("9100"));
        assert_eq!(e.value_of("speed").as_deref(), Some("100000"));
    }

    #[test]
    fn test_push_keeps_duplicates() {
        let mut tree = DataTree::new();
        tree.push_entry("PORT", "sonic-port", entry("Ethernet0", &[]));
        tree.push_entry("PORT", "sonic-port", entry("Ethernet0", &[]));
        assert_eq!(tree.entry_count(), 2);
    }

    #[test]
    fn test_remove_entry() {
        let mut tree = DataTree::new();
        tree.insert_entry("VLAN", "sonic-vlan", entry("Vlan10", &[("vlanid", "10")]));
        tree.insert_entry("VLAN", "sonic-vlan", entry("Vlan20", &[("vlanid", "20")]));

        let removed = tree.remove_entry("VLAN", &["Vlan10"]).unwrap();
        assert_eq!(removed.value_of("vlanid").as_deref(), Some("10"));
        assert!(tree.find_entry("VLAN", &["Vlan10"]).is_none());
        assert_eq!(tree.entry_count(), 1);

        assert!(tree.remove_entry("VLAN", &["Vlan10"]).is_none());
        assert!(tree.remove_entry("PORT", &["Ethernet0"]).is_none());
    }

    #[test]
    fn test_destructive_merge_consumes_source() {
        let mut a = DataTree::new();
        a.insert_entry("PORT", "sonic-port", entry("Ethernet0", &[]));
        let mut b = DataTree::new();
        b.insert_entry("PORT", "sonic-port", entry("Ethernet4", &[]));

        a.merge(b);
        // `b` has been moved; using it here would not compile.
        assert_eq!(a.entry_count(), 2);
    }

    #[test]
    fn test_non_destructive_merge_leaves_source_usable() {
        let mut a = DataTree::new();
        let mut b = DataTree::new();
        b.insert_entry("VLAN", "sonic-vlan", entry("Vlan10", &[("vlanid", "10")]));

        a.merge_ref(&b);
        b.insert_entry("VLAN", "sonic-vlan", entry("Vlan20", &[("vlanid", "20")]));

        assert_eq!(a.entry_count(), 1);
        assert_eq!(b.entry_count(), 2);
    }

    #[test]
    fn test_paths() {
        let mut e = EntryNode::new(vec![
            ("aclname".into(), "DATAACL".into()),
            ("rulename".into(), "R1".into()),
        ]);
        e.set_leaf("PRIORITY", vec!["10".into()], false);

        assert_eq!(
            e.path("sonic-acl", "ACL_RULE"),
            "/sonic-acl:ACL_RULE[aclname='DATAACL'][rulename='R1']"
        );
        assert_eq!(
            e.leaf_path("sonic-acl", "ACL_RULE", "PRIORITY"),
            "/sonic-acl:ACL_RULE[aclname='DATAACL'][rulename='R1']/PRIORITY"
        );
    }

    #[test]
    fn test_value_of_joins_leaf_list() {
        let mut e = EntryNode::new(vec![("name".into(), "Vlan10".into())]);
        e.set_leaf("members", vec!["Ethernet0".into(), "Ethernet4".into()], true);
        assert_eq!(e.value_of("members").as_deref(), Some("Ethernet0,Ethernet4"));
        assert_eq!(e.value_of("name").as_deref(), Some("Vlan10"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(DataTree::parse("<xml/>"), Err(TreeError::Parse(_))));
    }
}
