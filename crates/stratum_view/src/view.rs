//! View handles, lifecycle states and the trait view targets implement.

use crate::element::ViewSchema;
use crate::meta::ViewMeta;
use core::any::Any;
use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stratum_event::{Args, EventHub};
use stratum_module::{EventBinding, ModuleKey};

/// Stable handle to a view instance. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Handle to a host-owned panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelHandle(pub u64);

/// Handle to a host-owned parent a panel is attached under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParentHandle(pub u64);

/// Lifecycle state of a view.
///
/// ```text
/// Loading ──> Loaded ──> Opened ──> Closing ──> Closed ──> (reactivated) Loaded
///                                      │
///                                      └──────> Destroyed
/// ```
///
/// Focus is a sub-state of `Opened`, see `ViewRegistry::is_focused`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// The host is instantiating the panel asynchronously.
    Loading,
    /// Instantiated and bound, not on the stack.
    Loaded,
    /// On the stack.
    Opened,
    /// Off the stack, waiting for the view's close signal.
    Closing,
    /// Closed and retained, panel inactive.
    Closed,
    /// Released. Terminal.
    Destroyed,
}

/// Object-safe access to the concrete view type.
pub trait AsAny {
    /// Upcasts to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Upcasts to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Callbacks the registry drives on the object bound to a panel.
pub trait View: AsAny + Send {
    /// Called after the view is placed on the stack.
    fn on_open(&mut self, _ctx: &ViewContext<'_>, _args: Args<'_>) {}

    /// Called when the view gains focus.
    fn on_focus(&mut self, _ctx: &ViewContext<'_>) {}

    /// Called when the view loses focus, or is sorted while silent.
    fn on_blur(&mut self, _ctx: &ViewContext<'_>) {}

    /// Called when the view leaves the stack. The close completes once
    /// `done` is signalled or dropped.
    fn on_close(&mut self, _ctx: &ViewContext<'_>, done: CloseSignal) {
        done.done();
    }

    /// Module whose hub this view's hub proxies to.
    fn module(&self) -> Option<ModuleKey> {
        None
    }

    /// Declared elements.
    fn schema(&self) -> Option<Arc<ViewSchema>> {
        None
    }

    /// Event bindings established whenever the view is activated.
    fn event_bindings(&self) -> Vec<EventBinding> {
        Vec::new()
    }
}

pub(crate) fn downcast_ref<T: View + 'static>(view: &dyn View) -> Option<&T> {
    <dyn View as AsAny>::as_any(view).downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: View + 'static>(view: &mut dyn View) -> Option<&mut T> {
    <dyn View as AsAny>::as_any_mut(view).downcast_mut::<T>()
}

/// What a view sees of itself during a callback.
pub struct ViewContext<'a> {
    pub(crate) id: ViewId,
    pub(crate) meta: &'a ViewMeta,
    pub(crate) panel: PanelHandle,
    pub(crate) event: &'a EventHub,
}

impl<'a> ViewContext<'a> {
    /// Handle of the view.
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Descriptor of the view.
    #[must_use]
    pub fn meta(&self) -> &'a ViewMeta {
        self.meta
    }

    /// Host panel of the view.
    #[must_use]
    pub fn panel(&self) -> PanelHandle {
        self.panel
    }

    /// The view's hub. Proxies to its module's hub when it has one.
    #[must_use]
    pub fn event(&self) -> &'a EventHub {
        self.event
    }
}

impl fmt::Debug for ViewContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewContext")
            .field("id", &self.id)
            .field("identifier", &self.meta.identifier)
            .field("panel", &self.panel)
            .finish_non_exhaustive()
    }
}

/// Completion signal handed to [`View::on_close`].
///
/// Signalled explicitly with [`CloseSignal::done`], or implicitly when
/// dropped, so every exit path completes the close.
#[derive(Debug)]
pub struct CloseSignal {
    flag: Arc<AtomicBool>,
}

impl CloseSignal {
    pub(crate) fn new() -> (Self, CloseWatch) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Self {
                flag: Arc::clone(&flag),
            },
            CloseWatch(flag),
        )
    }

    /// Completes the close.
    pub fn done(self) {}
}

impl Drop for CloseSignal {
    fn drop(&mut self) {
        self.flag.store(true, Ordering::Release);
    }
}

/// Registry side of a [`CloseSignal`].
#[derive(Debug)]
pub(crate) struct CloseWatch(Arc<AtomicBool>);

impl CloseWatch {
    pub(crate) fn is_done(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
