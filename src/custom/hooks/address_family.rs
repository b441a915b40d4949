//! Address family companion fields

use crate::custom::ValidationContext;
use crate::translate::{ErrorKind, ErrorRecord};

const IPV4_FIELDS: &[&str] = &["SRC_IP", "DST_IP"];
const IPV6_FIELDS: &[&str] = &["SRC_IPV6", "DST_IPV6"];

fn companions(family: &str) -> Option<&'static [&'static str]> {
    match family.to_ascii_uppercase().as_str() {
        "IPV4" | "IPV4ANY" => Some(IPV4_FIELDS),
        "IPV6" | "IPV6ANY" => Some(IPV6_FIELDS),
        _ => None,
    }
}

/// Attached to the family field (e.g. `IP_TYPE`). An IPv4 family needs one
/// of `SRC_IP`/`DST_IP` in the entry, an IPv6 family one of
/// `SRC_IPV6`/`DST_IPV6`. Other families carry no requirement.
pub fn validate_address_family(ctx: &mut ValidationContext<'_>) -> ErrorRecord {
    let Some(required) = companions(ctx.node_value()) else {
        return ErrorRecord::success();
    };

    if required.iter().any(|field| ctx.field_value(field).is_some()) {
        return ErrorRecord::success();
    }

    ErrorRecord::new(
        ErrorKind::SemanticDependentDataMissing,
        format!(
            "{} {} requires one of {}",
            ctx.node_name(),
            ctx.node_value(),
            required.join(", ")
        ),
    )
    .with_table(ctx.table().unwrap_or_default())
    .with_keys(ctx.key_values())
    .with_field(ctx.node_name().to_string(), ctx.node_value().to_string())
}
