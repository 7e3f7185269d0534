//! # Headless Host
//!
//! An in-memory [`ViewHost`]: panels are bookkeeping records, view objects
//! come from registered factories. Async loads complete inline, or are
//! queued until [`HeadlessHost::complete_pending`] when deferred.

use std::collections::HashMap;
use stratum_view::{
    ElementDescriptor, HostError, LoadCompletion, LoadedPanel, PanelHandle, ParentHandle, View,
    ViewHost, ViewId, ViewMeta,
};

type ViewFactory = Box<dyn Fn() -> Box<dyn View> + Send>;

/// Host-side state of one panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelRecord {
    /// Identifier of the view the panel was created for.
    pub identifier: String,
    /// Whether the panel is shown.
    pub active: bool,
    /// Current parent.
    pub parent: Option<ParentHandle>,
    /// Last applied render order.
    pub order: Option<i32>,
    /// Whether the panel holds input focus.
    pub focused: bool,
    /// View bound to the panel.
    pub view: Option<ViewId>,
    /// Number of bound elements.
    pub elements: usize,
}

struct QueuedLoad {
    meta: ViewMeta,
    parent: Option<ParentHandle>,
    completion: LoadCompletion,
}

/// In-memory host.
#[derive(Default)]
pub struct HeadlessHost {
    factories: HashMap<String, ViewFactory>,
    panels: HashMap<PanelHandle, PanelRecord>,
    next_panel: u64,
    deferred: bool,
    queued: Vec<QueuedLoad>,
    focus_log: Vec<(PanelHandle, bool)>,
}

impl HeadlessHost {
    /// Creates a host with no factories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory used to create view objects for `identifier`.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn View> + Send + 'static,
    {
        self.factories.insert(identifier.into(), Box::new(factory));
    }

    /// Queues async loads until [`HeadlessHost::complete_pending`] instead
    /// of completing them inline.
    pub fn set_deferred(&mut self, deferred: bool) {
        self.deferred = deferred;
    }

    /// Completes every queued async load. Returns how many were completed.
    pub fn complete_pending(&mut self) -> usize {
        let queued = std::mem::take(&mut self.queued);
        let count = queued.len();
        for load in queued {
            let result = self.load(&load.meta, load.parent);
            load.completion.complete(result);
        }
        count
    }

    /// Number of queued async loads.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    /// Host-side state of `panel`.
    #[must_use]
    pub fn panel(&self, panel: PanelHandle) -> Option<&PanelRecord> {
        self.panels.get(&panel)
    }

    /// Number of live panels.
    #[must_use]
    pub fn live_panels(&self) -> usize {
        self.panels.len()
    }

    /// The panel currently holding focus.
    #[must_use]
    pub fn focused(&self) -> Option<PanelHandle> {
        self.panels
            .iter()
            .find(|(_, record)| record.focused)
            .map(|(panel, _)| *panel)
    }

    /// Every `set_focus` call, in order.
    #[must_use]
    pub fn focus_log(&self) -> &[(PanelHandle, bool)] {
        &self.focus_log
    }

    /// Destroys a panel without telling the registry, as a scene unload
    /// would. Returns false if it was already gone.
    pub fn kill(&mut self, panel: PanelHandle) -> bool {
        self.panels.remove(&panel).is_some()
    }
}

impl ViewHost for HeadlessHost {
    fn load(
        &mut self,
        meta: &ViewMeta,
        parent: Option<ParentHandle>,
    ) -> Result<LoadedPanel, HostError> {
        let factory = self
            .factories
            .get(&meta.identifier)
            .ok_or_else(|| HostError::Instantiate {
                identifier: meta.identifier.clone(),
                reason: "no factory registered".to_string(),
            })?;
        let view = factory();

        self.next_panel += 1;
        let panel = PanelHandle(self.next_panel);
        self.panels.insert(
            panel,
            PanelRecord {
                identifier: meta.identifier.clone(),
                active: true,
                parent,
                order: None,
                focused: false,
                view: None,
                elements: 0,
            },
        );
        tracing::trace!("HeadlessHost: panel {} created for {}", panel.0, meta.identifier);
        Ok(LoadedPanel::new(panel, view))
    }

    fn load_async(
        &mut self,
        meta: &ViewMeta,
        parent: Option<ParentHandle>,
        completion: LoadCompletion,
    ) {
        if self.deferred {
            self.queued.push(QueuedLoad {
                meta: meta.clone(),
                parent,
                completion,
            });
        } else {
            let result = self.load(meta, parent);
            completion.complete(result);
        }
    }

    fn is_loading(&self, meta: &ViewMeta) -> bool {
        self.queued.iter().any(|load| load.meta == *meta)
    }

    fn set_binding(&mut self, panel: PanelHandle, view: ViewId, elements: &[ElementDescriptor]) {
        if let Some(record) = self.panels.get_mut(&panel) {
            record.view = Some(view);
            record.elements = elements.len();
        }
    }

    fn set_order(&mut self, panel: PanelHandle, order: i32) {
        if let Some(record) = self.panels.get_mut(&panel) {
            record.order = Some(order);
        }
    }

    fn set_focus(&mut self, panel: PanelHandle, focus: bool) {
        self.focus_log.push((panel, focus));
        if focus {
            for record in self.panels.values_mut() {
                record.focused = false;
            }
        }
        if let Some(record) = self.panels.get_mut(&panel) {
            record.focused = focus;
        }
    }

    fn set_active(&mut self, panel: PanelHandle, active: bool) {
        if let Some(record) = self.panels.get_mut(&panel) {
            record.active = active;
        }
    }

    fn set_parent(&mut self, panel: PanelHandle, parent: Option<ParentHandle>) {
        if let Some(record) = self.panels.get_mut(&panel) {
            record.parent = parent;
        }
    }

    fn release(&mut self, panel: PanelHandle) {
        if self.panels.remove(&panel).is_some() {
            tracing::trace!("HeadlessHost: panel {} released", panel.0);
        }
    }

    fn is_alive(&self, panel: PanelHandle) -> bool {
        self.panels.contains_key(&panel)
    }
}
