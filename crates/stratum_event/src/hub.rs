//! The event hub and its proxy bookkeeping.

use crate::handler::{Args, Handler};
use crate::EventId;
use core::fmt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A single registration on a hub table.
struct Listener {
    seq: u64,
    handler: Handler,
    once: bool,
}

/// Listener lists indexed by event, in registration order.
#[derive(Default)]
struct ListenerTable {
    next_seq: u64,
    listeners: HashMap<EventId, Vec<Listener>>,
}

impl ListenerTable {
    fn insert(&mut self, id: EventId, handler: Handler, once: bool) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.listeners.entry(id).or_default().push(Listener { seq, handler, once });
        seq
    }

    fn contains(&self, id: EventId, seq: u64) -> bool {
        self.listeners
            .get(&id)
            .is_some_and(|list| list.iter().any(|listener| listener.seq == seq))
    }

    /// Removes exactly the registration `seq`, leaving other registrations
    /// of the same handler alone.
    fn remove_seq(&mut self, id: EventId, seq: u64) -> bool {
        let Some(list) = self.listeners.get_mut(&id) else {
            return false;
        };
        let Some(index) = list.iter().position(|listener| listener.seq == seq) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.listeners.remove(&id);
        }
        true
    }

    fn remove(&mut self, id: EventId, handler: Option<&Handler>) -> bool {
        let Some(list) = self.listeners.get_mut(&id) else {
            return false;
        };
        let before = list.len();
        match handler {
            Some(handler) => list.retain(|listener| !listener.handler.same(handler)),
            None => list.clear(),
        }
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&id);
        }
        removed
    }

    /// Claims a listener for invocation. Returns false if it is gone.
    ///
    /// Once-listeners are removed here, before their callback runs.
    fn claim(&mut self, id: EventId, seq: u64) -> bool {
        let Some(list) = self.listeners.get_mut(&id) else {
            return false;
        };
        let Some(index) = list.iter().position(|listener| listener.seq == seq) else {
            return false;
        };
        if list[index].once {
            list.remove(index);
            if list.is_empty() {
                self.listeners.remove(&id);
            }
        }
        true
    }

    fn count(&self, id: EventId) -> usize {
        self.listeners.get(&id).map_or(0, Vec::len)
    }
}

type SharedTable = Arc<Mutex<ListenerTable>>;

fn dispatch(table: &SharedTable, id: EventId, args: Args<'_>) {
    // The lock is never held while a callback runs, so callbacks may
    // register, unregister or notify re-entrantly.
    let snapshot: Vec<(u64, Handler)> = table
        .lock()
        .listeners
        .get(&id)
        .map(|list| {
            list.iter()
                .map(|listener| (listener.seq, listener.handler.clone()))
                .collect()
        })
        .unwrap_or_default();

    for (seq, handler) in snapshot {
        if table.lock().claim(id, seq) {
            handler.invoke(args);
        }
    }
}

/// Weak handle to a hub's listener table.
///
/// Modules hand these out so views can register on them without owning
/// the module's hub.
#[derive(Clone, Default)]
pub struct HubHandle(Weak<Mutex<ListenerTable>>);

impl HubHandle {
    /// Returns true while the hub behind this handle is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Notifies the hub behind this handle. No-op if it is gone.
    pub fn notify(&self, id: impl Into<EventId>, args: Args<'_>) {
        if let Some(table) = self.0.upgrade() {
            dispatch(&table, id.into(), args);
        }
    }

    /// Number of live listeners for `id` on the hub behind this handle.
    #[must_use]
    pub fn listener_count(&self, id: impl Into<EventId>) -> usize {
        self.0.upgrade().map_or(0, |table| table.lock().count(id.into()))
    }

    fn points_to(&self, table: &SharedTable) -> bool {
        Weak::ptr_eq(&self.0, &Arc::downgrade(table))
    }
}

impl fmt::Debug for HubHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A registration this hub made on another hub.
struct ProxyRecord {
    id: EventId,
    seq: u64,
    handler: Handler,
    target: HubHandle,
}

/// Publish/subscribe registry.
///
/// A plain hub owns its listeners. A proxy hub (see [`EventHub::proxy`])
/// registers on and notifies its source hub instead, keeping a record of
/// every registration it introduced; [`EventHub::clear`] and `Drop` replay
/// those as unregistrations.
pub struct EventHub {
    table: SharedTable,
    source: Option<HubHandle>,
    proxies: Mutex<Vec<ProxyRecord>>,
}

impl EventHub {
    /// Creates a standalone hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::default(),
            source: None,
            proxies: Mutex::new(Vec::new()),
        }
    }

    /// Creates a hub that proxies to `source`.
    #[must_use]
    pub fn proxy(source: &HubHandle) -> Self {
        Self {
            table: Arc::default(),
            source: Some(source.clone()),
            proxies: Mutex::new(Vec::new()),
        }
    }

    /// Returns a weak handle to this hub.
    #[must_use]
    pub fn handle(&self) -> HubHandle {
        HubHandle(Arc::downgrade(&self.table))
    }

    /// Returns true if this hub proxies to another hub.
    #[must_use]
    pub fn is_proxy(&self) -> bool {
        self.source.is_some()
    }

    /// Registers `handler` for `id` on this hub's context: the source hub
    /// for a proxy, this hub otherwise.
    ///
    /// Returns false (and logs) if the source hub has been dropped.
    pub fn register(&self, id: impl Into<EventId>, handler: &Handler, once: bool) -> bool {
        match &self.source {
            Some(source) => self.register_on(source, id, handler, once),
            None => {
                self.table.lock().insert(id.into(), handler.clone(), once);
                true
            }
        }
    }

    /// Registers `handler` for `id` on `target`, recording the registration
    /// so that [`EventHub::clear`] can revoke it.
    ///
    /// Returns false (and logs) if `target` has been dropped.
    pub fn register_on(
        &self,
        target: &HubHandle,
        id: impl Into<EventId>,
        handler: &Handler,
        once: bool,
    ) -> bool {
        let id = id.into();
        if target.points_to(&self.table) {
            self.table.lock().insert(id, handler.clone(), once);
            return true;
        }
        let Some(table) = target.0.upgrade() else {
            tracing::error!(
                "EventHub: register of event {} failed because the target hub is gone",
                id.raw()
            );
            return false;
        };
        let seq = table.lock().insert(id, handler.clone(), once);
        let mut proxies = self.proxies.lock();
        prune(&mut proxies);
        proxies.push(ProxyRecord {
            id,
            seq,
            handler: handler.clone(),
            target: target.clone(),
        });
        true
    }

    /// Unregisters `handler` for `id`, or every registration for `id` this
    /// hub is responsible for when `handler` is `None`.
    ///
    /// Registrations other holders made directly on a source hub are never
    /// touched. Returns true if anything was removed.
    pub fn unregister(&self, id: impl Into<EventId>, handler: Option<&Handler>) -> bool {
        let id = id.into();
        let mut removed = self.table.lock().remove(id, handler);

        let revoked: Vec<ProxyRecord> = {
            let mut proxies = self.proxies.lock();
            let (revoked, kept): (Vec<ProxyRecord>, Vec<ProxyRecord>) =
                proxies.drain(..).partition(|record| {
                    record.id == id
                        && handler.map_or(true, |handler| record.handler.same(handler))
                });
            *proxies = kept;
            revoked
        };
        for record in revoked {
            removed |= revoke(&record);
        }
        removed
    }

    /// Notifies every live listener for `id` on this hub's context, in
    /// registration order.
    pub fn notify(&self, id: impl Into<EventId>, args: Args<'_>) {
        let id = id.into();
        match &self.source {
            Some(source) => match source.0.upgrade() {
                Some(table) => dispatch(&table, id, args),
                None => tracing::warn!(
                    "EventHub: notify of event {} dropped because the source hub is gone",
                    id.raw()
                ),
            },
            None => dispatch(&self.table, id, args),
        }
    }

    /// Removes every registration this hub owns or introduced elsewhere.
    pub fn clear(&self) {
        let revoked: Vec<ProxyRecord> = self.proxies.lock().drain(..).collect();
        for record in &revoked {
            revoke(record);
        }
        self.table.lock().listeners.clear();
    }

    /// Number of live listeners for `id` on this hub's context.
    #[must_use]
    pub fn listener_count(&self, id: impl Into<EventId>) -> usize {
        let id = id.into();
        match &self.source {
            Some(source) => source.listener_count(id),
            None => self.table.lock().count(id),
        }
    }

    /// Number of registrations this hub introduced on other hubs.
    ///
    /// Registrations that are already gone from their target (fired
    /// once-listeners, dropped targets) are not counted.
    #[must_use]
    pub fn proxy_count(&self) -> usize {
        let mut proxies = self.proxies.lock();
        prune(&mut proxies);
        proxies.len()
    }
}

fn revoke(record: &ProxyRecord) -> bool {
    record
        .target
        .0
        .upgrade()
        .is_some_and(|table| table.lock().remove_seq(record.id, record.seq))
}

/// Drops records whose registration no longer exists on the target.
fn prune(proxies: &mut Vec<ProxyRecord>) {
    proxies.retain(|record| {
        record
            .target
            .0
            .upgrade()
            .is_some_and(|table| table.lock().contains(record.id, record.seq))
    });
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventHub {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("proxy", &self.is_proxy())
            .field("proxies", &self.proxy_count())
            .finish_non_exhaustive()
    }
}
