//! # STRATUM Modules
//!
//! Long-lived event sources and the scenes that sequence them.
//!
//! ## Lifecycle
//!
//! ```text
//! registry.instance::<M>()  ──> on_awake        (first access only)
//! registry.start_module(m)  ──> bind events ──> enabled ──> on_start
//! registry.stop_module(m)   ──> disabled ──> clear hub ──> on_reset ──> on_stop
//! ```
//!
//! There are no hidden globals: every process-wide instance lives in a
//! [`ModuleRegistry`] the caller owns and can replace in tests.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod module;
pub mod registry;
pub mod scene;

pub use error::{SceneError, SceneResult};
pub use module::{bind_events, EventBinding, Module, ModuleBase, ModuleKey};
pub use registry::ModuleRegistry;
pub use scene::{Scene, SceneDirector, SceneProxy, SceneSwap};
