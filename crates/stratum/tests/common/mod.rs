//! Shared fixtures: a journaling probe view and a populated host.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use stratum::view::{CloseSignal, StackConfig, ViewContext, ViewSchema};
use stratum::{HeadlessHost, ModuleRegistry, View, ViewRegistry};
use stratum::event::Args;

/// Ordered record of view callbacks.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Logs every callback as `callback:name`.
pub struct Probe {
    pub name: &'static str,
    pub journal: Journal,
    pub hold_close: bool,
    pub held: Option<CloseSignal>,
    pub schema: Option<Arc<ViewSchema>>,
}

impl Probe {
    pub fn new(name: &'static str, journal: Journal) -> Self {
        Self {
            name,
            journal,
            hold_close: false,
            held: None,
            schema: None,
        }
    }
}

impl View for Probe {
    fn on_open(&mut self, _ctx: &ViewContext<'_>, args: Args<'_>) {
        match args.first().and_then(|arg| arg.downcast_ref::<i32>()) {
            Some(value) => self.journal.push(format!("open:{}:{}", self.name, value)),
            None => self.journal.push(format!("open:{}", self.name)),
        }
    }

    fn on_focus(&mut self, _ctx: &ViewContext<'_>) {
        self.journal.push(format!("focus:{}", self.name));
    }

    fn on_blur(&mut self, _ctx: &ViewContext<'_>) {
        self.journal.push(format!("blur:{}", self.name));
    }

    fn on_close(&mut self, _ctx: &ViewContext<'_>, done: CloseSignal) {
        self.journal.push(format!("close:{}", self.name));
        if self.hold_close {
            self.held = Some(done);
        }
    }

    fn schema(&self) -> Option<Arc<ViewSchema>> {
        self.schema.clone()
    }
}

/// Identifiers every fixture host can instantiate.
pub const PROBES: [&str; 6] = ["A", "B", "X", "Y", "Hud", "Dialog"];

/// A host with a probe factory for each of [`PROBES`], plus "Slow",
/// whose close completes only when the test drops the held signal.
pub fn host(journal: &Journal) -> HeadlessHost {
    let mut host = HeadlessHost::new();
    for name in PROBES {
        let journal = journal.clone();
        host.register(name, move || Box::new(Probe::new(name, journal.clone())));
    }
    let slow = journal.clone();
    host.register("Slow", move || {
        let mut probe = Probe::new("Slow", slow.clone());
        probe.hold_close = true;
        Box::new(probe)
    });
    host
}

/// A registry over [`host`] with default stack parameters.
pub fn registry(journal: &Journal) -> ViewRegistry<HeadlessHost> {
    ViewRegistry::new(
        host(journal),
        Arc::new(ModuleRegistry::new()),
        StackConfig::default(),
    )
}
