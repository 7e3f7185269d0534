//! # STRATUM Event Hub
//!
//! Publish/subscribe registry used by every module and view.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  register_on   ┌──────────────┐
//! │  View Hub    │───────────────>│ Module Hub   │<── direct registrations
//! │  (proxy)     │  proxy records │ (source)     │    from other holders
//! └──────────────┘                └──────────────┘
//!        │ clear()                        │ notify(id, args)
//!        └── replays unregister ──────────┘
//! ```
//!
//! A proxy hub performs its registrations on another hub but remembers
//! exactly what it introduced. Clearing (or dropping) the proxy removes
//! those registrations and nothing else.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod handler;
mod hub;

pub use handler::{Args, Handler, OwnedArgs};
pub use hub::{EventHub, HubHandle};

/// Identifier of an event.
///
/// Event enums convert into this with `From`, usually through
/// [`event_ids!`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u32);

impl EventId {
    /// Creates a new event ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EventId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Implements `From<Enum> for EventId` for fieldless enums.
///
/// ```rust,ignore
/// #[derive(Clone, Copy)]
/// enum InventoryEvent { Opened, ItemMoved }
/// stratum_event::event_ids!(InventoryEvent);
/// ```
#[macro_export]
macro_rules! event_ids {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::core::convert::From<$ty> for $crate::EventId {
                fn from(value: $ty) -> Self {
                    $crate::EventId(value as u32)
                }
            }
        )+
    };
}
