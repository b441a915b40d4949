//! Shared setup for integration tests
//!
//! Schemas are written as JSON files into a temp directory and loaded
//! through the same path a deployment uses.

#![allow(dead_code)]

use std::fs;

use cfgval::engine::ModelEngine;
use cfgval::schema::SchemaLoader;
use serde_json::{json, Value};
use tempfile::TempDir;

fn schema_files() -> Vec<(&'static str, Value)> {
    vec![
        (
            "PORT",
            json!({
                "name": "PORT",
                "module": "sonic-port",
                "keys": ["name"],
                "fields": {
                    "name": { "type": "string", "pattern": "Ethernet[0-9]+" },
                    "mtu": { "type": "integer", "min": 68, "max": 9216 },
                    "admin_status": { "type": "enumeration", "values": ["up", "down"] }
                }
            }),
        ),
        (
            "ACL_TABLE",
            json!({
                "name": "ACL_TABLE",
                "module": "sonic-acl",
                "keys": ["aclname"],
                "fields": {
                    "aclname": { "type": "string" },
                    "type": { "type": "enumeration", "values": ["L3", "L3V6", "MIRROR"], "mandatory": true },
                    "ports": { "type": "leafref", "table": "PORT", "multi": true }
                }
            }),
        ),
        (
            "ACL_RULE",
            json!({
                "name": "ACL_RULE",
                "module": "sonic-acl",
                "keys": ["aclname", "rulename"],
                "custom_validation": "ValidateMaxEntries",
                "fields": {
                    "aclname": { "type": "leafref", "table": "ACL_TABLE" },
                    "rulename": { "type": "string", "pattern": "[A-Za-z0-9_]+" },
                    "PRIORITY": { "type": "integer", "min": 1, "max": 65535, "mandatory": true },
                    "PACKET_ACTION": { "type": "enumeration", "values": ["FORWARD", "DROP"] },
                    "IP_TYPE": {
                        "type": "enumeration",
                        "values": ["ANY", "IP", "IPV4", "IPV4ANY", "IPV6", "IPV6ANY"],
                        "custom_validation": "ValidateAddressFamily"
                    },
                    "SRC_IP": { "type": "string" },
                    "DST_IP": { "type": "string" },
                    "SRC_IPV6": { "type": "string" },
                    "DST_IPV6": { "type": "string" },
                    "L4_SRC_PORT": { "type": "integer", "min": 0, "max": 65535 },
                    "IP_PROTOCOL": {
                        "type": "integer", "min": 0, "max": 255,
                        "must": {
                            "requires": ["L4_SRC_PORT"],
                            "message": "IP_PROTOCOL requires a layer 4 port",
                            "app_tag": "l4-port-required"
                        }
                    }
                }
            }),
        ),
        (
            "VLAN",
            json!({
                "name": "VLAN",
                "module": "sonic-vlan",
                "keys": ["name"],
                "fields": {
                    "name": { "type": "string", "pattern": "Vlan[0-9]+" },
                    "vlanid": { "type": "integer", "min": 1, "max": 4094, "mandatory": true }
                }
            }),
        ),
        (
            "VXLAN_TUNNEL_MAP",
            json!({
                "name": "VXLAN_TUNNEL_MAP",
                "module": "sonic-vxlan",
                "keys": ["tunnel", "mapname"],
                "custom_validation": "ValidateUniqueValue",
                "fields": {
                    "tunnel": { "type": "string" },
                    "mapname": { "type": "string" },
                    "vlan": { "type": "leafref", "table": "VLAN", "mandatory": true },
                    "vni": { "type": "integer", "min": 1, "max": 16777215, "mandatory": true }
                }
            }),
        ),
    ]
}

/// Writes the schema files and loads them. The directory must outlive the
/// loader only while files are read, but is returned so tests can add more.
pub fn setup_loader() -> (TempDir, SchemaLoader) {
    let tmp = TempDir::new().unwrap();
    for (name, schema) in schema_files() {
        let path = tmp.path().join(format!("{}.json", name));
        fs::write(&path, serde_json::to_string_pretty(&schema).unwrap()).unwrap();
    }
    // Ignored by the loader
    fs::write(tmp.path().join("README.txt"), "not a schema").unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    loader.load_all().unwrap();
    (tmp, loader)
}

pub fn setup_engine() -> ModelEngine {
    let (_tmp, loader) = setup_loader();
    ModelEngine::new(loader).unwrap()
}
