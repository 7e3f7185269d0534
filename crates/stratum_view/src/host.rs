//! # Host Contract
//!
//! The rendering host owns panels. The registry only asks it to create,
//! order, focus, activate, parent and release them.
//!
//! Asynchronous loads complete through a [`LoadCompletion`], which may be
//! sent from any thread; the registry applies completions on its own
//! thread during `update`.

use crate::element::ElementDescriptor;
use crate::error::HostError;
use crate::meta::ViewMeta;
use crate::view::{PanelHandle, ParentHandle, View, ViewId};
use crossbeam_channel::Sender;
use core::fmt;

/// Identifies an asynchronous load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub u64);

/// A freshly instantiated panel and the view object bound to it.
pub struct LoadedPanel {
    /// Host handle of the panel.
    pub panel: PanelHandle,
    /// The view target living on the panel.
    pub view: Box<dyn View>,
}

impl LoadedPanel {
    /// Creates a new loaded panel.
    #[must_use]
    pub fn new(panel: PanelHandle, view: Box<dyn View>) -> Self {
        Self { panel, view }
    }
}

impl fmt::Debug for LoadedPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPanel")
            .field("panel", &self.panel)
            .finish_non_exhaustive()
    }
}

pub(crate) type LoadMessage = (LoadTicket, Result<LoadedPanel, HostError>);

/// One-shot completion for [`ViewHost::load_async`].
#[derive(Debug)]
pub struct LoadCompletion {
    ticket: LoadTicket,
    sender: Sender<LoadMessage>,
}

impl LoadCompletion {
    pub(crate) fn new(ticket: LoadTicket, sender: Sender<LoadMessage>) -> Self {
        Self { ticket, sender }
    }

    /// Ticket of the request this completes.
    #[must_use]
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Delivers the load result. Dropped silently if the registry is gone.
    pub fn complete(self, result: Result<LoadedPanel, HostError>) {
        if self.sender.send((self.ticket, result)).is_err() {
            tracing::debug!(
                "LoadCompletion: registry is gone, ticket {} discarded",
                self.ticket.0
            );
        }
    }
}

/// What the registry needs from the rendering host.
pub trait ViewHost {
    /// Instantiates a panel for `meta` under `parent`.
    ///
    /// # Errors
    ///
    /// [`HostError`] if the panel cannot be created.
    fn load(
        &mut self,
        meta: &ViewMeta,
        parent: Option<ParentHandle>,
    ) -> Result<LoadedPanel, HostError>;

    /// Starts instantiating a panel. `completion` must eventually be
    /// completed, either from this call or later.
    fn load_async(
        &mut self,
        meta: &ViewMeta,
        parent: Option<ParentHandle>,
        completion: LoadCompletion,
    );

    /// Returns true while an asynchronous load for `meta` is in flight.
    fn is_loading(&self, meta: &ViewMeta) -> bool;

    /// Binds the resolved elements of `view` to `panel`.
    fn set_binding(&mut self, panel: PanelHandle, view: ViewId, elements: &[ElementDescriptor]);

    /// Applies a render order.
    fn set_order(&mut self, panel: PanelHandle, order: i32);

    /// Gives or takes input focus.
    fn set_focus(&mut self, panel: PanelHandle, focus: bool);

    /// Shows or hides a panel.
    fn set_active(&mut self, panel: PanelHandle, active: bool);

    /// Reattaches a panel.
    fn set_parent(&mut self, panel: PanelHandle, parent: Option<ParentHandle>);

    /// Destroys a panel.
    fn release(&mut self, panel: PanelHandle);

    /// Returns false once a panel has been destroyed, by the registry or
    /// behind its back.
    fn is_alive(&self, panel: PanelHandle) -> bool;
}
