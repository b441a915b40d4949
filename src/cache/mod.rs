//! Session cache
//!
//! Per-session state shared by custom hooks across the edits of one batch.
//! Each [`CacheKind`] owns exactly one typed slot, so hooks agree on payload
//! shape at compile time:
//! - [`ClaimedValues`]: values already claimed in a uniqueness domain
//! - [`StoreKeyCounts`]: number of store keys per table
//!
//! Slots start empty and are populated lazily by [`SessionCache::get_or_init`].
//! The cache is owned by one session and is never shared between threads.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

/// The fixed set of payload kinds a session can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKind {
    ClaimedValues,
    StoreKeyCounts,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKind::ClaimedValues => write!(f, "claimed_values"),
            CacheKind::StoreKeyCounts => write!(f, "store_key_counts"),
        }
    }
}

/// A payload type bound to one [`CacheKind`]
pub trait CachePayload: Sized {
    const KIND: CacheKind;

    /// The slot this payload lives in
    fn slot(cache: &mut SessionCache) -> &mut Option<Self>;
}

/// Values claimed per `(table, field)` domain, mapped to the owning key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedValues {
    domains: BTreeMap<(String, String), BTreeMap<String, String>>,
}

impl ClaimedValues {
    /// Records that `owner` held `value` before the batch started
    pub fn preload(&mut self, table: &str, field: &str, value: &str, owner: &str) {
        self.domain_mut(table, field)
            .insert(value.to_string(), owner.to_string());
    }

    /// Key currently holding `value`, if any
    pub fn owner(&self, table: &str, field: &str, value: &str) -> Option<&str> {
        self.domains
            .get(&(table.to_string(), field.to_string()))?
            .get(value)
            .map(String::as_str)
    }

    /// Check-then-mark. Fails with the current owner when another key holds
    /// `value`; otherwise `owner` gives up any previous value in the domain
    /// and takes this one.
    pub fn claim(&mut self, table: &str, field: &str, value: &str, owner: &str) -> Result<(), String> {
        let domain = self.domain_mut(table, field);
        if let Some(current) = domain.get(value) {
            if current != owner {
                return Err(current.clone());
            }
        }
        domain.retain(|_, o| o != owner);
        domain.insert(value.to_string(), owner.to_string());
        Ok(())
    }

    /// Drops every claim held by `owner` in the domain
    pub fn release_owner(&mut self, table: &str, field: &str, owner: &str) {
        if let Some(domain) = self.domains.get_mut(&(table.to_string(), field.to_string())) {
            domain.retain(|_, o| o != owner);
        }
    }

    /// Number of claimed values in a domain
    pub fn claimed(&self, table: &str, field: &str) -> usize {
        self.domains
            .get(&(table.to_string(), field.to_string()))
            .map_or(0, BTreeMap::len)
    }

    fn domain_mut(&mut self, table: &str, field: &str) -> &mut BTreeMap<String, String> {
        self.domains
            .entry((table.to_string(), field.to_string()))
            .or_default()
    }
}

impl CachePayload for ClaimedValues {
    const KIND: CacheKind = CacheKind::ClaimedValues;

    fn slot(cache: &mut SessionCache) -> &mut Option<Self> {
        &mut cache.claimed_values
    }
}

/// Store key counts per table, filled one table at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreKeyCounts {
    counts: BTreeMap<String, usize>,
}

impl StoreKeyCounts {
    pub fn get(&self, table: &str) -> Option<usize> {
        self.counts.get(table).copied()
    }

    /// Returns the cached count for `table`, running `load` on first use
    pub fn get_or_load<E>(&mut self, table: &str, load: impl FnOnce() -> Result<usize, E>) -> Result<usize, E> {
        if let Some(count) = self.get(table) {
            return Ok(count);
        }
        let count = load()?;
        self.counts.insert(table.to_string(), count);
        Ok(count)
    }
}

impl CachePayload for StoreKeyCounts {
    const KIND: CacheKind = CacheKind::StoreKeyCounts;

    fn slot(cache: &mut SessionCache) -> &mut Option<Self> {
        &mut cache.store_key_counts
    }
}

/// Per-session cache with one slot per [`CacheKind`]
#[derive(Debug, Default)]
pub struct SessionCache {
    claimed_values: Option<ClaimedValues>,
    store_key_counts: Option<StoreKeyCounts>,
}

impl SessionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload of kind `P::KIND`, running `init` only when the
    /// slot is empty. A failed `init` leaves the slot empty.
    pub fn get_or_init<P, E>(&mut self, init: impl FnOnce() -> Result<P, E>) -> Result<&mut P, E>
    where
        P: CachePayload,
    {
        let slot = P::slot(self);
        let payload = match slot.take() {
            Some(payload) => payload,
            None => {
                let payload = init()?;
                debug!(kind = %P::KIND, "session cache populated");
                payload
            }
        };
        Ok(slot.insert(payload))
    }

    /// Returns the payload of kind `P::KIND` if populated
    pub fn get<P: CachePayload>(&mut self) -> Option<&mut P> {
        P::slot(self).as_mut()
    }

    /// Kinds currently populated
    pub fn kinds(&self) -> Vec<CacheKind> {
        let mut kinds = Vec::new();
        if self.claimed_values.is_some() {
            kinds.push(CacheKind::ClaimedValues);
        }
        if self.store_key_counts.is_some() {
            kinds.push(CacheKind::StoreKeyCounts);
        }
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }

    /// Tears down every payload
    pub fn clear(&mut self) {
        self.claimed_values = None;
        self.store_key_counts = None;
    }
}
