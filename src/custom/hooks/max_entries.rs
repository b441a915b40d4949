//! Entry count limit per table

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cache::StoreKeyCounts;
use crate::custom::ValidationContext;
use crate::edit::EditRecord;
use crate::store::{StoreClient, StoreResult};
use crate::translate::{ErrorKind, ErrorRecord};

/// Fails a create when the table's store entries plus the batch's net
/// growth exceed the configured limit.
///
/// Growth counts creates of absent keys and subtracts deletes of present
/// keys, replaying the batch in order. The store count is read once per
/// table and session. A store failure passes the edit.
pub fn validate_max_entries(ctx: &mut ValidationContext<'_>) -> ErrorRecord {
    let Some(edit) = ctx.current_edit() else {
        return ErrorRecord::success();
    };
    if !edit.operation.is_create() {
        return ErrorRecord::success();
    }
    let Some(table) = ctx.table() else {
        return ErrorRecord::success();
    };

    let config = ctx.config();
    let store = ctx.store();
    let separator = config.key_separator.as_str();
    let limit = config.max_entries_for(table);
    let pattern = format!("{}{}*", table, separator);

    let existing = ctx
        .cache()
        .get_or_init(|| Ok(StoreKeyCounts::default()))
        .and_then(|counts| counts.get_or_load(table, || store.keys(&pattern).map(|keys| keys.len())));
    let existing = match existing {
        Ok(count) => count,
        Err(e) => {
            warn!(table, error = %e, "entry count unavailable, skipping limit check");
            return ErrorRecord::success();
        }
    };

    let growth = match batch_growth(ctx.all_edits(), table, separator, store) {
        Ok(growth) => growth,
        Err(e) => {
            warn!(table, error = %e, "key presence unavailable, skipping limit check");
            return ErrorRecord::success();
        }
    };

    let total = existing as i64 + growth;
    debug!(table, existing, growth, limit, "entry limit check");
    if total > limit as i64 {
        return ErrorRecord::new(
            ErrorKind::Failure,
            format!("Maximum number of entries ({}) exceeded for table {}", limit, table),
        )
        .with_table(table)
        .with_keys(ctx.key_values());
    }

    ErrorRecord::success()
}

/// Net change in the table's entry count if every edit of the batch lands.
fn batch_growth(
    edits: &[EditRecord],
    table: &str,
    separator: &str,
    store: &dyn StoreClient,
) -> StoreResult<i64> {
    let mut present: HashMap<&str, bool> = HashMap::new();
    let mut growth = 0i64;
    for edit in edits.iter().filter(|e| e.table(separator) == Some(table)) {
        let before = match present.get(edit.key.as_str()) {
            Some(known) => *known,
            None => store.exists(&edit.key)?,
        };
        let after = if edit.operation.is_delete() {
            false
        } else if edit.operation.is_create() {
            true
        } else {
            before
        };
        growth += i64::from(after) - i64::from(before);
        present.insert(edit.key.as_str(), after);
    }
    Ok(growth)
}
