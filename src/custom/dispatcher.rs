//! Hook dispatch by name

use tracing::{debug, trace};

use super::context::ValidationContext;
use super::registry::HookRegistry;
use crate::translate::ErrorRecord;

/// Runs the hook registered as `name`.
///
/// An unregistered name means no extra constraint was declared and yields
/// success, the same as a hook that ran and passed. The hook's record is
/// returned unchanged.
pub fn invoke(registry: &HookRegistry, name: &str, ctx: &mut ValidationContext<'_>) -> ErrorRecord {
    let Some(hook) = registry.get(name) else {
        trace!(hook = name, "no hook registered");
        return ErrorRecord::success();
    };

    let result = hook(ctx);
    debug!(
        hook = name,
        node = ctx.node_name(),
        kind = %result.kind,
        "hook dispatched"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SessionCache;
    use crate::config::ValidatorConfig;
    use crate::edit::EditRecord;
    use crate::store::MemoryStore;
    use crate::translate::ErrorKind;

    #[test]
    fn test_absent_hook_is_success_and_side_effect_free() {
        let registry = HookRegistry::new();
        let edits = vec![EditRecord::create("PORT|Ethernet0")];
        let store = MemoryStore::new();
        let config = ValidatorConfig::default();
        let mut cache = SessionCache::new();

        for _ in 0..2 {
            let mut ctx = ValidationContext::new(&edits, 0, &mut cache, &store, &config);
            assert_eq!(invoke(&registry, "NoSuchHook", &mut ctx), ErrorRecord::success());
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_absent_and_passing_hooks_are_indistinguishable() {
        let mut registry = HookRegistry::new();
        registry
            .register("Passes", |_ctx: &mut ValidationContext<'_>| ErrorRecord::success())
            .unwrap();

        let edits = vec![EditRecord::create("PORT|Ethernet0")];
        let store = MemoryStore::new();
        let config = ValidatorConfig::default();
        let mut cache = SessionCache::new();
        let mut ctx = ValidationContext::new(&edits, 0, &mut cache, &store, &config);

        // Both report plain success; callers cannot tell "no rule" from "rule passed"
        assert_eq!(
            invoke(&registry, "Passes", &mut ctx),
            invoke(&registry, "Absent", &mut ctx)
        );
    }

    #[test]
    fn test_hook_result_returned_unchanged() {
        let mut registry = HookRegistry::new();
        registry
            .register("Rejects", |ctx: &mut ValidationContext<'_>| {
                ErrorRecord::new(ErrorKind::Failure, "rejected")
                    .with_field(ctx.node_name().to_string(), ctx.node_value().to_string())
            })
            .unwrap();

        let edits = vec![EditRecord::create("PORT|Ethernet0").with_field("mtu", "9100")];
        let store = MemoryStore::new();
        let config = ValidatorConfig::default();
        let mut cache = SessionCache::new();
        let mut ctx =
            ValidationContext::new(&edits, 0, &mut cache, &store, &config).with_node("mtu", "9100");

        let result = invoke(&registry, "Rejects", &mut ctx);
        assert_eq!(result.kind, ErrorKind::Failure);
        assert_eq!(result.message, "rejected");
        assert_eq!(result.field, "mtu");
        assert_eq!(result.value, "9100");
    }
}
