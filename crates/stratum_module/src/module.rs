//! Module trait, shared module state and event-binding descriptors.

use crate::registry::ModuleRegistry;
use core::any::{type_name, Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use stratum_event::{Args, EventHub, EventId, Handler};

/// Identity of a module type.
#[derive(Clone, Copy)]
pub struct ModuleKey {
    id: TypeId,
    name: &'static str,
}

impl ModuleKey {
    /// Returns the key of module type `M`.
    #[must_use]
    pub fn of<M: Module>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: type_name::<M>(),
        }
    }

    /// Full type name of the module.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ModuleKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModuleKey {}

impl Hash for ModuleKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// State every module carries.
pub struct ModuleBase {
    name: String,
    enabled: AtomicBool,
    event: EventHub,
}

impl ModuleBase {
    /// Creates module state with the given display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: AtomicBool::new(false),
            event: EventHub::new(),
        }
    }

    /// Creates module state named after type `M`.
    #[must_use]
    pub fn of<M: ?Sized>() -> Self {
        let full = type_name::<M>();
        Self::new(full.rsplit("::").next().unwrap_or(full))
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true between `start` and `stop`.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// The module's own event hub.
    #[must_use]
    pub fn event(&self) -> &EventHub {
        &self.event
    }
}

impl fmt::Debug for ModuleBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleBase")
            .field("name", &self.name)
            .field("enabled", &self.enabled())
            .finish_non_exhaustive()
    }
}

/// A long-lived event source.
///
/// Lifecycle is driven by [`ModuleRegistry`]; implementors only provide
/// state and hooks.
pub trait Module: Any + Send + Sync {
    /// Shared module state.
    fn base(&self) -> &ModuleBase;

    /// Event bindings to establish on start.
    fn event_bindings(&self) -> Vec<EventBinding> {
        Vec::new()
    }

    /// Called once, when the registry first creates the module.
    fn on_awake(&self) {}

    /// Called after bindings are established.
    fn on_start(&self, _args: Args<'_>) {}

    /// Called when the module is reset (also as part of stop).
    fn on_reset(&self) {}

    /// Called last when the module stops.
    fn on_stop(&self) {}
}

/// Declares that a callback listens to an event.
///
/// Without a module the binding targets the owner's default context; with
/// one it targets that module's hub, through the owner's proxy records.
#[derive(Clone, Debug)]
pub struct EventBinding {
    /// Event to listen to.
    pub id: EventId,
    /// Module whose hub carries the event.
    pub module: Option<ModuleKey>,
    /// Fire at most once.
    pub once: bool,
    /// Callback.
    pub handler: Handler,
}

impl EventBinding {
    /// Creates a binding on the owner's default context.
    #[must_use]
    pub fn new(id: impl Into<EventId>, handler: Handler) -> Self {
        Self {
            id: id.into(),
            module: None,
            once: false,
            handler,
        }
    }

    /// Targets module `M`'s hub.
    #[must_use]
    pub fn on_module<M: Module>(mut self) -> Self {
        self.module = Some(ModuleKey::of::<M>());
        self
    }

    /// Fires at most once.
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

/// Establishes `bindings` through `hub`.
///
/// A binding naming a module the registry does not hold is skipped and
/// logged; the remaining bindings are still attempted. Returns the number
/// of bindings established.
pub fn bind_events(
    hub: &EventHub,
    bindings: &[EventBinding],
    registry: &ModuleRegistry,
    owner: &str,
) -> usize {
    let mut bound = 0;
    for binding in bindings {
        let ok = match binding.module {
            Some(key) => match registry.hub(&key) {
                Some(target) => hub.register_on(&target, binding.id, &binding.handler, binding.once),
                None => {
                    tracing::error!(
                        "{}: binding event {} failed because module {} is not registered",
                        owner,
                        binding.id.raw(),
                        key.name()
                    );
                    false
                }
            },
            None => hub.register(binding.id, &binding.handler, binding.once),
        };
        if ok {
            bound += 1;
        }
    }
    tracing::debug!("{}: bound {}/{} events", owner, bound, bindings.len());
    bound
}
