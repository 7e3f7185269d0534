//! # View Registry
//!
//! Owns every view instance and mediates load, open, close and destroy.
//!
//! ## Architecture
//!
//! ```text
//!             open(meta)
//!                 │
//!                 ▼
//!   ┌──────── find(meta) ────────┐ opened, single instance ──> reuse
//!   │             │              │
//!   │        cache.take(meta) ───┼──> reactivate under parent
//!   │             │              │
//!   │       host.load(meta) ─────┼──> bind elements, bind events
//!   │             │              │
//!   └──────> StackSorter ────────┘──> set_order / set_focus ──> on_open
//!
//!             close(view)
//!                 │
//!     stack.remove ──> on_close(done) ──> done? ──> cache.insert | destroy
//! ```
//!
//! Async loads hand the host a [`LoadCompletion`]. Completions are applied
//! on [`ViewRegistry::update`], and right after `open_async` so hosts that
//! complete inline finish within the call.

use crate::cache::{RetainScope, ViewCache};
use crate::config::StackConfig;
use crate::element::{ElementBinder, ElementDescriptor};
use crate::error::{ViewError, ViewResult};
use crate::host::{LoadCompletion, LoadMessage, LoadTicket, LoadedPanel, ViewHost};
use crate::meta::{FocusPolicy, ViewMeta};
use crate::sorter::{FocusChange, SortPass, StackEntry, StackSorter};
use crate::view::{
    downcast_mut, downcast_ref, CloseSignal, CloseWatch, PanelHandle, ParentHandle, View,
    ViewContext, ViewId, ViewState,
};
use core::fmt;
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashMap;
use std::sync::Arc;
use stratum_event::{Args, EventHub, OwnedArgs};
use stratum_module::{bind_events, ModuleRegistry};

/// Where an opened view goes.
///
/// `below` wins over `above`; without either the view goes on top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Place directly under this view.
    pub below: Option<ViewId>,
    /// Place directly over this view.
    pub above: Option<ViewId>,
    /// Host parent to attach the panel under.
    pub parent: Option<ParentHandle>,
}

impl OpenOptions {
    /// Creates options that put the view on top.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the view under `id`.
    #[must_use]
    pub fn below(mut self, id: ViewId) -> Self {
        self.below = Some(id);
        self
    }

    /// Places the view over `id`.
    #[must_use]
    pub fn above(mut self, id: ViewId) -> Self {
        self.above = Some(id);
        self
    }

    /// Attaches the panel under `parent`.
    #[must_use]
    pub fn parent(mut self, parent: ParentHandle) -> Self {
        self.parent = Some(parent);
        self
    }
}

type OpenCallback = Box<dyn FnOnce(ViewResult<ViewId>)>;

struct PendingLoad {
    id: ViewId,
    meta: ViewMeta,
    options: OpenOptions,
    args: OwnedArgs,
    on_open: OpenCallback,
}

struct ViewRecord {
    meta: ViewMeta,
    panel: PanelHandle,
    view: Box<dyn View>,
    event: EventHub,
    elements: Arc<[ElementDescriptor]>,
    state: ViewState,
}

impl ViewRecord {
    fn with_view<R>(&mut self, id: ViewId, f: impl FnOnce(&mut dyn View, &ViewContext<'_>) -> R) -> R {
        let ctx = ViewContext {
            id,
            meta: &self.meta,
            panel: self.panel,
            event: &self.event,
        };
        f(&mut *self.view, &ctx)
    }
}

/// The view stack.
pub struct ViewRegistry<H: ViewHost> {
    host: H,
    modules: Arc<ModuleRegistry>,
    binder: ElementBinder,
    stack: StackSorter,
    cache: ViewCache,
    records: HashMap<ViewId, ViewRecord>,
    pending: HashMap<LoadTicket, PendingLoad>,
    closing: Vec<(ViewId, CloseWatch)>,
    next_id: u64,
    next_ticket: u64,
    sender: Sender<LoadMessage>,
    receiver: Receiver<LoadMessage>,
}

impl<H: ViewHost> ViewRegistry<H> {
    /// Creates an empty registry over `host`.
    ///
    /// `modules` resolves module-qualified event bindings and module hubs.
    #[must_use]
    pub fn new(host: H, modules: Arc<ModuleRegistry>, config: StackConfig) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            host,
            modules,
            binder: ElementBinder::new(),
            stack: StackSorter::new(config),
            cache: ViewCache::new(),
            records: HashMap::new(),
            pending: HashMap::new(),
            closing: Vec::new(),
            next_id: 0,
            next_ticket: 0,
            sender,
            receiver,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The module registry views bind against.
    #[must_use]
    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.modules
    }

    /// The element binder.
    #[must_use]
    pub fn binder(&self) -> &ElementBinder {
        &self.binder
    }

    /// Open views, bottom to top.
    #[must_use]
    pub fn open_views(&self) -> Vec<ViewId> {
        self.stack.ids()
    }

    /// The retain store.
    #[must_use]
    pub fn retained(&self) -> &ViewCache {
        &self.cache
    }

    /// Lifecycle state of `id`. `None` if the handle was never issued.
    #[must_use]
    pub fn state(&self, id: ViewId) -> Option<ViewState> {
        if self.pending.values().any(|pending| pending.id == id) {
            return Some(ViewState::Loading);
        }
        if let Some(record) = self.records.get(&id) {
            return Some(record.state);
        }
        (id.0 > 0 && id.0 <= self.next_id).then_some(ViewState::Destroyed)
    }

    /// Host panel of `id`.
    #[must_use]
    pub fn panel(&self, id: ViewId) -> Option<PanelHandle> {
        self.records.get(&id).map(|record| record.panel)
    }

    /// Descriptor of `id`.
    #[must_use]
    pub fn meta(&self, id: ViewId) -> Option<&ViewMeta> {
        self.records.get(&id).map(|record| &record.meta)
    }

    /// Hub of `id`.
    #[must_use]
    pub fn event(&self, id: ViewId) -> Option<&EventHub> {
        self.records.get(&id).map(|record| &record.event)
    }

    /// Resolved element list of `id`.
    #[must_use]
    pub fn elements(&self, id: ViewId) -> Option<&[ElementDescriptor]> {
        self.records.get(&id).map(|record| &*record.elements)
    }

    /// The view object of `id`, if it is a `T`.
    #[must_use]
    pub fn target<T: View + 'static>(&self, id: ViewId) -> Option<&T> {
        self.records
            .get(&id)
            .and_then(|record| downcast_ref::<T>(&*record.view))
    }

    /// The view object of `id`, mutably, if it is a `T`.
    pub fn target_mut<T: View + 'static>(&mut self, id: ViewId) -> Option<&mut T> {
        self.records
            .get_mut(&id)
            .and_then(|record| downcast_mut::<T>(&mut *record.view))
    }

    /// Last-known focus flag of `id`.
    #[must_use]
    pub fn is_focused(&self, id: ViewId) -> bool {
        self.stack.is_focused(id)
    }

    /// Returns true while a load for `meta` is in flight.
    #[must_use]
    pub fn is_loading(&self, meta: &ViewMeta) -> bool {
        self.host.is_loading(meta) || self.pending.values().any(|pending| pending.meta == *meta)
    }

    /// Topmost open instance of `meta`.
    #[must_use]
    pub fn find(&self, meta: &ViewMeta) -> Option<ViewId> {
        self.stack
            .ids()
            .into_iter()
            .rev()
            .find(|id| self.meta(*id) == Some(meta))
    }

    // =========================================================================
    // Load / Open
    // =========================================================================

    /// Loads an instance of `meta` without opening it.
    ///
    /// A single-instance meta that is already open returns the open
    /// instance, or closes it first when `close_if_opened` is set. The closed
    /// instance follows its cache policy, and a fresh panel is created
    /// without consulting the retain store.
    ///
    /// # Errors
    ///
    /// [`ViewError::AlreadyLoading`] if an async load of a single-instance
    /// meta is in flight, [`ViewError::Host`] if the host fails.
    pub fn load(
        &mut self,
        meta: &ViewMeta,
        parent: Option<ParentHandle>,
        close_if_opened: bool,
    ) -> ViewResult<ViewId> {
        let mut reuse = true;
        if !meta.multiple {
            if let Some(id) = self.find(meta) {
                if !close_if_opened {
                    return Ok(id);
                }
                tracing::debug!("ViewRegistry: {} reloaded, closing {}", meta.identifier, id);
                self.close_view(id, false, false);
                reuse = false;
            }
        }
        if reuse {
            if let Some(id) = self.cache.take(meta) {
                self.reactivate(id, parent);
                return Ok(id);
            }
        }
        if !meta.multiple && self.is_loading(meta) {
            tracing::warn!("ViewRegistry: {} is already loading", meta.identifier);
            return Err(ViewError::AlreadyLoading {
                identifier: meta.identifier.clone(),
            });
        }

        let loaded = self.host.load(meta, parent).map_err(|e| {
            tracing::error!("ViewRegistry: load of {} failed: {}", meta.identifier, e);
            ViewError::from(e)
        })?;
        let id = self.issue_id();
        self.install(id, meta.clone(), loaded);
        Ok(id)
    }

    /// Loads (or reuses) an instance of `meta`, places it on the stack and
    /// calls its `on_open` with `args`.
    ///
    /// # Errors
    ///
    /// Any error of [`ViewRegistry::load`].
    pub fn open(
        &mut self,
        meta: &ViewMeta,
        options: OpenOptions,
        args: Args<'_>,
    ) -> ViewResult<ViewId> {
        let id = self.load(meta, options.parent, false)?;
        self.show(id, options, args);
        Ok(id)
    }

    /// Opens `meta`, instantiating asynchronously when no open or retained
    /// instance exists.
    ///
    /// Returns the handle right away; its state stays `Loading` until the
    /// host completes. `on_open` runs once the view is open, or with the
    /// host error. Closing the handle before completion cancels the open
    /// and `on_open` never runs.
    ///
    /// # Errors
    ///
    /// [`ViewError::AlreadyLoading`] if a load of a single-instance meta is
    /// in flight.
    pub fn open_async<F>(
        &mut self,
        meta: &ViewMeta,
        options: OpenOptions,
        args: OwnedArgs,
        on_open: F,
    ) -> ViewResult<ViewId>
    where
        F: FnOnce(ViewResult<ViewId>) + 'static,
    {
        if !meta.multiple {
            if self.is_loading(meta) {
                tracing::warn!("ViewRegistry: {} is already loading", meta.identifier);
                return Err(ViewError::AlreadyLoading {
                    identifier: meta.identifier.clone(),
                });
            }
            if let Some(id) = self.find(meta) {
                self.show(id, options, &args.as_refs());
                on_open(Ok(id));
                return Ok(id);
            }
        }
        if let Some(id) = self.cache.take(meta) {
            self.reactivate(id, options.parent);
            self.show(id, options, &args.as_refs());
            on_open(Ok(id));
            return Ok(id);
        }

        let id = self.issue_id();
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.pending.insert(
            ticket,
            PendingLoad {
                id,
                meta: meta.clone(),
                options,
                args,
                on_open: Box::new(on_open),
            },
        );
        tracing::debug!("ViewRegistry: {} loading async as {}", meta.identifier, id);
        self.host.load_async(
            meta,
            options.parent,
            LoadCompletion::new(ticket, self.sender.clone()),
        );
        self.drain_completions();
        Ok(id)
    }

    /// Applies finished async loads and completes closes whose signal has
    /// fired. Call once per host frame.
    pub fn update(&mut self) {
        self.drain_completions();

        let mut finished = Vec::new();
        self.closing.retain(|(id, watch)| {
            let done = watch.is_done();
            if done {
                finished.push(*id);
            }
            !done
        });
        for id in finished {
            self.finish_close(id);
        }
    }

    fn issue_id(&mut self) -> ViewId {
        self.next_id += 1;
        ViewId(self.next_id)
    }

    fn install(&mut self, id: ViewId, meta: ViewMeta, loaded: LoadedPanel) {
        let LoadedPanel { panel, view } = loaded;
        let event = match view.module() {
            Some(key) => match self.modules.hub(&key) {
                Some(source) => EventHub::proxy(&source),
                None => {
                    tracing::error!(
                        "ViewRegistry: {} names module {} which is not registered",
                        meta.identifier,
                        key.name()
                    );
                    EventHub::new()
                }
            },
            None => EventHub::new(),
        };
        let schema = view.schema();
        let elements = self.binder.resolve(schema.as_deref());
        self.host.set_binding(panel, id, &elements);

        tracing::info!("ViewRegistry: {} loaded as {}", meta.identifier, id);
        self.records.insert(
            id,
            ViewRecord {
                meta,
                panel,
                view,
                event,
                elements,
                state: ViewState::Loaded,
            },
        );
        self.bind(id);
    }

    fn reactivate(&mut self, id: ViewId, parent: Option<ParentHandle>) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        record.state = ViewState::Loaded;
        self.host.set_parent(record.panel, parent);
        self.host.set_active(record.panel, true);
        tracing::debug!("ViewRegistry: {} reactivated from cache", id);
        self.bind(id);
    }

    fn bind(&self, id: ViewId) {
        if let Some(record) = self.records.get(&id) {
            let bindings = record.view.event_bindings();
            bind_events(&record.event, &bindings, &self.modules, &record.meta.identifier);
        }
    }

    fn show(&mut self, id: ViewId, options: OpenOptions, args: Args<'_>) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        record.state = ViewState::Opened;
        self.host.set_active(record.panel, true);
        let entry = StackEntry {
            id,
            focus: record.meta.focus,
            fixed_order: record.meta.fixed_order,
        };
        self.sort_entry(entry, options.below, options.above);

        if let Some(record) = self.records.get_mut(&id) {
            record.with_view(id, |view, ctx| view.on_open(ctx, args));
            tracing::info!("ViewRegistry: {} opened as {}", record.meta.identifier, id);
        }
    }

    fn drain_completions(&mut self) {
        while let Ok((ticket, result)) = self.receiver.try_recv() {
            let Some(pending) = self.pending.remove(&ticket) else {
                if let Ok(loaded) = result {
                    self.host.release(loaded.panel);
                }
                tracing::debug!("ViewRegistry: cancelled load {} discarded", ticket.0);
                continue;
            };
            let PendingLoad {
                id,
                meta,
                options,
                args,
                on_open,
            } = pending;
            match result {
                Ok(loaded) => {
                    self.install(id, meta, loaded);
                    self.show(id, options, &args.as_refs());
                    on_open(Ok(id));
                }
                Err(e) => {
                    tracing::error!("ViewRegistry: async load of {} failed: {}", meta.identifier, e);
                    on_open(Err(e.into()));
                }
            }
        }
    }

    // =========================================================================
    // Stacking / Focus
    // =========================================================================

    /// Moves an open view before `below`, else after `above`, else to the
    /// top, then recomputes orders and applies its focus rule.
    ///
    /// A handle that no longer names a live open view is pruned and
    /// logged. Returns false in that case.
    pub fn sort(&mut self, id: ViewId, below: Option<ViewId>, above: Option<ViewId>) -> bool {
        let entry = match self.records.get(&id) {
            Some(record) if record.state == ViewState::Opened => StackEntry {
                id,
                focus: record.meta.focus,
                fixed_order: record.meta.fixed_order,
            },
            Some(record) => {
                tracing::warn!(
                    "ViewRegistry: {} ({}) is not open, sort ignored",
                    record.meta.identifier,
                    id
                );
                return false;
            }
            // Runs the pass anyway so stale members are pruned with it.
            None => StackEntry {
                id,
                focus: FocusPolicy::Silent,
                fixed_order: None,
            },
        };
        self.sort_entry(entry, below, above)
    }

    fn sort_entry(&mut self, entry: StackEntry, below: Option<ViewId>, above: Option<ViewId>) -> bool {
        let records = &self.records;
        let host = &self.host;
        let pass = self.stack.sort(entry, below, above, |id| {
            records
                .get(&id)
                .is_some_and(|record| host.is_alive(record.panel))
        });
        let sorted = !pass.pruned.contains(&entry.id);
        self.apply(pass);
        sorted
    }

    fn apply(&mut self, pass: SortPass) {
        for id in pass.pruned {
            if let Some(record) = self.records.get(&id) {
                tracing::error!(
                    "ViewRegistry: view {} ({}) has already been destroyed",
                    record.meta.identifier,
                    id
                );
            }
            self.destroy(id);
        }
        for (id, order) in pass.orders {
            if let Some(record) = self.records.get(&id) {
                self.host.set_order(record.panel, order);
            }
        }
        self.apply_focus(pass.focus);
    }

    fn apply_focus(&mut self, changes: Vec<FocusChange>) {
        for change in changes {
            match change {
                FocusChange::Focus(id) => {
                    if let Some(record) = self.records.get_mut(&id) {
                        record.with_view(id, |view, ctx| view.on_focus(ctx));
                        self.host.set_focus(record.panel, true);
                        tracing::debug!("ViewRegistry: {} focused", id);
                    }
                }
                FocusChange::Blur { id, host } => {
                    if let Some(record) = self.records.get_mut(&id) {
                        record.with_view(id, |view, ctx| view.on_blur(ctx));
                        if host {
                            self.host.set_focus(record.panel, false);
                        }
                        tracing::debug!("ViewRegistry: {} blurred", id);
                    }
                }
            }
        }
    }

    fn refocus(&mut self) {
        let changes = self.stack.refocus_top();
        self.apply_focus(changes);
    }

    /// Forces focus onto an open view, blurring the current holder.
    /// Silent views are left alone. Returns true if focus moved.
    pub fn focus(&mut self, id: ViewId) -> bool {
        match self.records.get(&id) {
            Some(record) if record.state == ViewState::Opened => {}
            Some(record) => {
                tracing::error!(
                    "ViewRegistry: {} ({}) is not open, focus ignored",
                    record.meta.identifier,
                    id
                );
                return false;
            }
            None => {
                tracing::error!("ViewRegistry: focus of stale {} ignored", id);
                return false;
            }
        }
        let changes = self.stack.focus(id);
        let moved = !changes.is_empty();
        self.apply_focus(changes);
        moved
    }

    /// Forces focus onto the topmost open instance of `meta`.
    pub fn focus_meta(&mut self, meta: &ViewMeta) -> bool {
        match self.find(meta) {
            Some(id) => self.focus(id),
            None => {
                tracing::warn!("ViewRegistry: {} is not open, focus ignored", meta.identifier);
                false
            }
        }
    }

    // =========================================================================
    // Close / Destroy
    // =========================================================================

    /// Closes a view. With `resume` the focus rule is re-applied to the
    /// new top.
    ///
    /// Closing a handle that is still loading cancels the load. Closing a
    /// view that is already closing or closed does nothing.
    ///
    /// # Errors
    ///
    /// [`ViewError::UnknownView`] if the handle names no live view.
    pub fn close(&mut self, id: ViewId, resume: bool) -> ViewResult<()> {
        if self.cancel_where(|pending| pending.id == id) > 0 {
            return Ok(());
        }
        let Some(state) = self.records.get(&id).map(|record| record.state) else {
            tracing::error!("ViewRegistry: close of unknown {}", id);
            return Err(ViewError::UnknownView(id));
        };
        if matches!(state, ViewState::Closing | ViewState::Closed) {
            tracing::debug!("ViewRegistry: {} is already closed", id);
            return Ok(());
        }
        self.close_view(id, resume, false);
        Ok(())
    }

    /// Closes every open instance of `meta` and cancels its pending loads.
    /// Returns true if anything was closed or cancelled.
    pub fn close_meta(&mut self, meta: &ViewMeta, resume: bool) -> bool {
        let cancelled = self.cancel_where(|pending| pending.meta == *meta);
        let ids: Vec<ViewId> = self
            .stack
            .ids()
            .into_iter()
            .rev()
            .filter(|id| self.meta(*id) == Some(meta))
            .collect();
        for id in &ids {
            self.close_view(*id, false, false);
        }
        if resume && !ids.is_empty() {
            self.refocus();
        }
        cancelled > 0 || !ids.is_empty()
    }

    /// Closes every open view whose meta is not in `exclude`, top first.
    pub fn close_all(&mut self, exclude: &[ViewMeta]) {
        let ids: Vec<ViewId> = self
            .stack
            .ids()
            .into_iter()
            .rev()
            .filter(|id| self.meta(*id).is_some_and(|meta| !exclude.contains(meta)))
            .collect();
        for id in ids {
            self.close_view(id, false, false);
        }
        self.refocus();
    }

    /// Destroys every instance (open, loaded, closing or retained) whose
    /// meta is not in `exclude`, and cancels their pending loads.
    pub fn destroy_all(&mut self, exclude: &[ViewMeta]) {
        self.cancel_where(|pending| !exclude.contains(&pending.meta));
        let mut ids: Vec<ViewId> = self
            .records
            .iter()
            .filter(|(_, record)| !exclude.contains(&record.meta))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        for id in ids {
            if self.stack.contains(id) {
                self.close_view(id, false, true);
            } else {
                self.destroy(id);
            }
        }
        self.refocus();
    }

    /// Destroys every scoped retained view. Shared retained views stay.
    pub fn release_scoped(&mut self) {
        let ids = self.cache.drain_scope(RetainScope::Scoped);
        tracing::info!("ViewRegistry: releasing {} scoped views", ids.len());
        for id in ids {
            self.destroy(id);
        }
    }

    fn cancel_where(&mut self, matches: impl Fn(&PendingLoad) -> bool) -> usize {
        let tickets: Vec<LoadTicket> = self
            .pending
            .iter()
            .filter(|(_, pending)| matches(pending))
            .map(|(ticket, _)| *ticket)
            .collect();
        for ticket in &tickets {
            if let Some(pending) = self.pending.remove(ticket) {
                tracing::debug!(
                    "ViewRegistry: pending load of {} ({}) cancelled",
                    pending.meta.identifier,
                    pending.id
                );
            }
        }
        tickets.len()
    }

    fn close_view(&mut self, id: ViewId, resume: bool, destroy: bool) {
        self.stack.remove(id);
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        record.state = ViewState::Closing;
        let (signal, watch) = CloseSignal::new();
        record.with_view(id, |view, ctx| view.on_close(ctx, signal));
        tracing::info!("ViewRegistry: {} ({}) closed", record.meta.identifier, id);

        if destroy {
            self.destroy(id);
        } else if watch.is_done() {
            self.finish_close(id);
        } else {
            self.closing.push((id, watch));
        }
        if resume {
            self.refocus();
        }
    }

    fn finish_close(&mut self, id: ViewId) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        if RetainScope::of(record.meta.cache).is_none() {
            self.destroy(id);
            return;
        }
        record.state = ViewState::Closed;
        record.event.clear();
        self.host.set_active(record.panel, false);
        let meta = record.meta.clone();
        for evicted in self.cache.insert(&meta, id) {
            tracing::debug!("ViewRegistry: {} evicted by {}", evicted, id);
            self.destroy(evicted);
        }
        tracing::debug!("ViewRegistry: {} ({}) retained", meta.identifier, id);
    }

    fn destroy(&mut self, id: ViewId) -> bool {
        self.stack.remove(id);
        self.cache.remove(id);
        self.closing.retain(|(closing, _)| *closing != id);
        let Some(record) = self.records.remove(&id) else {
            return false;
        };
        record.event.clear();
        if self.host.is_alive(record.panel) {
            self.host.release(record.panel);
        }
        tracing::info!("ViewRegistry: {} ({}) destroyed", record.meta.identifier, id);
        true
    }
}

impl<H: ViewHost> fmt::Debug for ViewRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("open", &self.stack.ids())
            .field("retained", &self.cache.len())
            .field("live", &self.records.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
