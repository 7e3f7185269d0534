//! Closed-but-retained views, keyed by identifier and partitioned by scope.

use crate::meta::{CachePolicy, ViewMeta};
use crate::view::ViewId;
use std::collections::HashMap;

/// Lifetime of a retained view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetainScope {
    /// Evicted when the current scene is torn down.
    Scoped,
    /// Evicted only when destroyed explicitly.
    Shared,
}

impl RetainScope {
    /// Scope implied by a cache policy. `None` means the view is not
    /// retained at all.
    #[must_use]
    pub fn of(policy: CachePolicy) -> Option<Self> {
        match policy {
            CachePolicy::None => None,
            CachePolicy::ScopedRetain => Some(Self::Scoped),
            CachePolicy::SharedRetain => Some(Self::Shared),
        }
    }
}

#[derive(Debug)]
struct Retained {
    id: ViewId,
    scope: RetainScope,
}

/// The retain store.
///
/// At most one entry per identifier unless the meta allows multiple
/// instances. Only handles are stored; the registry owns the instances.
#[derive(Debug, Default)]
pub struct ViewCache {
    entries: HashMap<String, Vec<Retained>>,
}

impl ViewCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Retains `id` under `meta`.
    ///
    /// Returns the handles that must be destroyed: `id` itself when the
    /// policy is `None`, or the previously retained instance of a
    /// single-instance meta.
    pub fn insert(&mut self, meta: &ViewMeta, id: ViewId) -> Vec<ViewId> {
        let Some(scope) = RetainScope::of(meta.cache) else {
            return vec![id];
        };
        let list = self.entries.entry(meta.identifier.clone()).or_default();
        let evicted = if meta.multiple {
            Vec::new()
        } else {
            list.drain(..).map(|retained| retained.id).collect()
        };
        list.push(Retained { id, scope });
        evicted
    }

    /// Takes the most recently retained instance for `meta`.
    pub fn take(&mut self, meta: &ViewMeta) -> Option<ViewId> {
        let list = self.entries.get_mut(&meta.identifier)?;
        let retained = list.pop();
        if list.is_empty() {
            self.entries.remove(&meta.identifier);
        }
        retained.map(|retained| retained.id)
    }

    /// Removes `id` wherever it is retained.
    pub fn remove(&mut self, id: ViewId) -> bool {
        let mut removed = false;
        self.entries.retain(|_, list| {
            let before = list.len();
            list.retain(|retained| retained.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Removes and returns every entry retained under `scope`.
    pub fn drain_scope(&mut self, scope: RetainScope) -> Vec<ViewId> {
        let mut drained = Vec::new();
        self.entries.retain(|_, list| {
            list.retain(|retained| {
                if retained.scope == scope {
                    drained.push(retained.id);
                    false
                } else {
                    true
                }
            });
            !list.is_empty()
        });
        drained.sort_unstable();
        drained
    }

    /// Returns true if `id` is retained.
    #[must_use]
    pub fn contains(&self, id: ViewId) -> bool {
        self.entries
            .values()
            .any(|list| list.iter().any(|retained| retained.id == id))
    }

    /// Retained handles, in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<ViewId> {
        let mut ids: Vec<ViewId> = self
            .entries
            .values()
            .flat_map(|list| list.iter().map(|retained| retained.id))
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of retained instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns true if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
