//! Shared schema fixtures for unit tests

use std::collections::BTreeMap;

use crate::custom::hooks;
use crate::engine::ModelEngine;
use crate::schema::{FieldDef, MustRule, SchemaLoader, TableSchema};

pub fn port() -> TableSchema {
    let mut fields = BTreeMap::new();
    fields.insert("name".into(), FieldDef::pattern("Ethernet[0-9]+"));
    fields.insert("mtu".into(), FieldDef::integer(Some(68), Some(9216)));
    fields.insert("admin_status".into(), FieldDef::enumeration(&["up", "down"]));
    TableSchema::new("PORT", "sonic-port", &["name"], fields)
}

pub fn acl_table() -> TableSchema {
    let mut fields = BTreeMap::new();
    fields.insert("aclname".into(), FieldDef::string());
    fields.insert("type".into(), FieldDef::enumeration(&["L3", "L3V6", "MIRROR"]).mandatory());
    fields.insert("ports".into(), FieldDef::leafref("PORT").multi(None, None));
    TableSchema::new("ACL_TABLE", "sonic-acl", &["aclname"], fields)
}

pub fn acl_rule() -> TableSchema {
    let mut fields = BTreeMap::new();
    fields.insert("aclname".into(), FieldDef::leafref("ACL_TABLE"));
    fields.insert("rulename".into(), FieldDef::pattern("[A-Za-z0-9_]+"));
    fields.insert("PRIORITY".into(), FieldDef::integer(Some(1), Some(65535)).mandatory());
    fields.insert("PACKET_ACTION".into(), FieldDef::enumeration(&["FORWARD", "DROP"]));
    fields.insert(
        "IP_TYPE".into(),
        FieldDef::enumeration(&["ANY", "IP", "IPV4", "IPV4ANY", "IPV6", "IPV6ANY"])
            .with_custom_validation(hooks::ADDRESS_FAMILY),
    );
    for addr in ["SRC_IP", "DST_IP", "SRC_IPV6", "DST_IPV6"] {
        fields.insert(addr.into(), FieldDef::string());
    }
    fields.insert("L4_SRC_PORT".into(), FieldDef::integer(Some(0), Some(65535)));
    fields.insert(
        "IP_PROTOCOL".into(),
        FieldDef::integer(Some(0), Some(255)).with_must(MustRule {
            requires: vec!["L4_SRC_PORT".into()],
            message: "IP_PROTOCOL requires a layer 4 port".into(),
            app_tag: "l4-port-required".into(),
        }),
    );
    TableSchema::new("ACL_RULE", "sonic-acl", &["aclname", "rulename"], fields)
        .with_custom_validation(hooks::MAX_ENTRIES)
}

pub fn vlan() -> TableSchema {
    let mut fields = BTreeMap::new();
    fields.insert("name".into(), FieldDef::pattern("Vlan[0-9]+"));
    fields.insert("vlanid".into(), FieldDef::integer(Some(1), Some(4094)).mandatory());
    TableSchema::new("VLAN", "sonic-vlan", &["name"], fields)
}

pub fn vxlan_tunnel_map() -> TableSchema {
    let mut fields = BTreeMap::new();
    fields.insert("tunnel".into(), FieldDef::string());
    fields.insert("mapname".into(), FieldDef::string());
    fields.insert("vlan".into(), FieldDef::leafref("VLAN").mandatory());
    fields.insert("vni".into(), FieldDef::integer(Some(1), Some(16777215)).mandatory());
    TableSchema::new("VXLAN_TUNNEL_MAP", "sonic-vxlan", &["tunnel", "mapname"], fields)
        .with_custom_validation(hooks::UNIQUE_VALUE)
}

pub fn loader() -> SchemaLoader {
    let mut loader = SchemaLoader::in_memory();
    for schema in [port(), acl_table(), acl_rule(), vlan(), vxlan_tunnel_map()] {
        loader.register(schema).unwrap();
    }
    loader.check_references().unwrap();
    loader
}

pub fn engine() -> ModelEngine {
    ModelEngine::new(loader()).unwrap()
}
