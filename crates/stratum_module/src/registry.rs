//! Injectable per-type module registry.
//!
//! One instance per module type, created on first use. The registry is an
//! ordinary value: applications keep one in an `Arc`, tests build their own.

use crate::module::{bind_events, Module, ModuleKey};
use core::any::Any;
use core::fmt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use stratum_event::{Args, HubHandle};

struct Entry {
    module: Arc<dyn Module>,
    any: Arc<dyn Any + Send + Sync>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<ModuleKey, Entry>,
    order: Vec<ModuleKey>,
}

/// Holds at most one instance per module type.
#[derive(Default)]
pub struct ModuleRegistry {
    inner: Mutex<Inner>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the instance of `M`, creating and awaking it on first use.
    pub fn instance<M: Module + Default>(&self) -> Arc<M> {
        match self.get_as::<M>() {
            Some(module) => module,
            None => self.insert(Arc::new(M::default())),
        }
    }

    /// Installs `module` as the instance of `M`.
    ///
    /// An existing instance is stopped (if enabled) and replaced.
    pub fn register<M: Module>(&self, module: M) -> Arc<M> {
        if let Some(previous) = self.remove(&ModuleKey::of::<M>()) {
            tracing::warn!(
                "ModuleRegistry: replacing instance of {}",
                previous.base().name()
            );
        }
        self.insert(Arc::new(module))
    }

    fn insert<M: Module>(&self, module: Arc<M>) -> Arc<M> {
        let key = ModuleKey::of::<M>();
        {
            let mut inner = self.inner.lock();
            if let Some(existing) = inner.entries.get(&key) {
                // Created re-entrantly while this one was being built.
                if let Ok(existing) = Arc::clone(&existing.any).downcast::<M>() {
                    return existing;
                }
            }
            inner.entries.insert(
                key,
                Entry {
                    module: module.clone(),
                    any: module.clone(),
                },
            );
            inner.order.push(key);
        }
        module.on_awake();
        tracing::info!("ModuleRegistry: {} awake", module.base().name());
        module
    }

    /// Returns the instance registered under `key`.
    #[must_use]
    pub fn get(&self, key: &ModuleKey) -> Option<Arc<dyn Module>> {
        self.inner
            .lock()
            .entries
            .get(key)
            .map(|entry| Arc::clone(&entry.module))
    }

    /// Returns the instance of `M` if it exists.
    #[must_use]
    pub fn get_as<M: Module>(&self) -> Option<Arc<M>> {
        let any = self
            .inner
            .lock()
            .entries
            .get(&ModuleKey::of::<M>())
            .map(|entry| Arc::clone(&entry.any))?;
        any.downcast::<M>().ok()
    }

    /// Returns true if an instance is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Weak handle to the hub of the module registered under `key`.
    #[must_use]
    pub fn hub(&self, key: &ModuleKey) -> Option<HubHandle> {
        self.get(key).map(|module| module.base().event().handle())
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if no module is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates (if needed) and starts the instance of `M`.
    pub fn start<M: Module + Default>(&self, args: Args<'_>) -> Arc<M> {
        let module = self.instance::<M>();
        self.start_module(&*module, args);
        module
    }

    /// Establishes `module`'s event bindings, enables it and runs its
    /// start hook.
    pub fn start_module(&self, module: &dyn Module, args: Args<'_>) {
        let base = module.base();
        let bindings = module.event_bindings();
        bind_events(base.event(), &bindings, self, base.name());
        base.set_enabled(true);
        module.on_start(args);
        tracing::info!("ModuleRegistry: {} started", base.name());
    }

    /// Runs `module`'s reset hook.
    pub fn reset_module(&self, module: &dyn Module) {
        module.on_reset();
        tracing::info!("ModuleRegistry: {} reset", module.base().name());
    }

    /// Disables `module`, revokes every registration its hub holds or made,
    /// resets it and runs its stop hook.
    pub fn stop_module(&self, module: &dyn Module) {
        let base = module.base();
        base.set_enabled(false);
        base.event().clear();
        self.reset_module(module);
        module.on_stop();
        tracing::info!("ModuleRegistry: {} stopped", base.name());
    }

    /// Removes the instance registered under `key`, stopping it if enabled.
    pub fn remove(&self, key: &ModuleKey) -> Option<Arc<dyn Module>> {
        let removed = {
            let mut inner = self.inner.lock();
            inner.order.retain(|k| k != key);
            inner.entries.remove(key)
        }?;
        if removed.module.base().enabled() {
            self.stop_module(&*removed.module);
        }
        Some(removed.module)
    }

    /// Stops every enabled module, newest first, and empties the registry.
    pub fn teardown(&self) {
        let order: Vec<ModuleKey> = self.inner.lock().order.iter().rev().copied().collect();
        for key in order {
            self.remove(&key);
        }
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.inner.lock().order)
            .finish()
    }
}
