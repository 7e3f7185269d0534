//! # STRATUM View Stack
//!
//! Tracks which panels exist, in what order they render, which one holds
//! input focus and whether a closed panel is retained or destroyed.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          ViewRegistry                             │
//! │                                                                   │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐    │
//! │  │ ElementBinder │   │   ViewCache   │   │    StackSorter    │    │
//! │  │ schema chain  │   │ scoped/shared │   │ orders + focus    │    │
//! │  └───────────────┘   └───────────────┘   └───────────────────┘    │
//! │                                                                   │
//! └──────────────┬────────────────────────────────────┬───────────────┘
//!                │ load / set_order / set_focus       │ on_open / on_close
//!                ▼                                    ▼
//!          ┌───────────┐                        ┌───────────┐
//!          │ ViewHost  │                        │   View    │
//!          └───────────┘                        └───────────┘
//! ```
//!
//! The host owns panels. Views own nothing but their hub, which may proxy
//! into a module's hub; closing or destroying a view severs exactly the
//! registrations it introduced.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod config;
pub mod element;
pub mod error;
pub mod host;
pub mod meta;
pub mod registry;
pub mod sorter;
pub mod view;

pub use cache::{RetainScope, ViewCache};
pub use config::{RegistryConfig, StackConfig};
pub use element::{ElementBinder, ElementDescriptor, ElementTarget, ViewSchema};
pub use error::{HostError, ViewError, ViewResult};
pub use host::{LoadCompletion, LoadTicket, LoadedPanel, ViewHost};
pub use meta::{CachePolicy, FocusPolicy, ViewMeta};
pub use registry::{OpenOptions, ViewRegistry};
pub use sorter::{FocusChange, SortPass, StackEntry, StackSorter};
pub use view::{
    AsAny, CloseSignal, PanelHandle, ParentHandle, View, ViewContext, ViewId, ViewState,
};
