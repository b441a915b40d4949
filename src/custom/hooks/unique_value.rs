//! Table-wide value uniqueness

use tracing::{debug, warn};

use crate::cache::ClaimedValues;
use crate::config::ValidatorConfig;
use crate::custom::ValidationContext;
use crate::store::{StoreClient, StoreResult};
use crate::translate::{ErrorKind, ErrorRecord};

/// Loads the values already held in the store for every configured
/// uniqueness domain.
fn load_claims(store: &dyn StoreClient, config: &ValidatorConfig) -> StoreResult<ClaimedValues> {
    let mut claims = ClaimedValues::default();
    for (table, field) in &config.unique_fields {
        let keys = store.keys(&format!("{}{}*", table, config.key_separator))?;
        let groups = store.get_all_pipelined(&keys)?;
        for (key, group) in keys.iter().zip(groups) {
            if let Some(value) = group.get(field) {
                claims.preload(table, field, value, key);
            }
        }
        debug!(table = %table, field = %field, claimed = claims.claimed(table, field), "claimed values loaded");
    }
    Ok(claims)
}

/// Enforces that the configured field of the table (e.g. `vni` of
/// `VXLAN_TUNNEL_MAP`) is held by at most one key.
///
/// The first call of a session loads existing values from the store; each
/// call then checks and marks the value in the session cache, so later edits
/// of the batch see earlier claims. A delete releases the key's claim.
pub fn validate_unique_value(ctx: &mut ValidationContext<'_>) -> ErrorRecord {
    let (Some(edit), Some(table)) = (ctx.current_edit(), ctx.table()) else {
        return ErrorRecord::success();
    };
    let config = ctx.config();
    let Some(field) = config.unique_field_for(table) else {
        return ErrorRecord::success();
    };

    let value = if ctx.node_name() == field {
        Some(ctx.node_value().to_string())
    } else {
        ctx.field_value(field)
    };
    let keys = ctx.key_values();
    let store = ctx.store();

    let claims = match ctx.cache().get_or_init(|| load_claims(store, config)) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(table, error = %e, "claimed values unavailable, skipping uniqueness check");
            return ErrorRecord::success();
        }
    };

    if edit.operation.is_delete() {
        claims.release_owner(table, field, &edit.key);
        return ErrorRecord::success();
    }

    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return ErrorRecord::success();
    };

    match claims.claim(table, field, &value, &edit.key) {
        Ok(()) => ErrorRecord::success(),
        Err(holder) => ErrorRecord::new(
            ErrorKind::SemanticKeyDuplicate,
            format!("{} {} is already used by {}", field, value, holder),
        )
        .with_table(table)
        .with_keys(keys)
        .with_field(field, value),
    }
}
