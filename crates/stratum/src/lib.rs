//! # STRATUM
//!
//! Declarative view stack over a host rendering engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Runtime                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────────┐   swap    ┌──────────────────────────┐    │
//! │  │  SceneDirector   │──────────>│      ViewRegistry        │    │
//! │  │  current / next  │  release  │  stack • cache • binder  │    │
//! │  └────────┬─────────┘  scoped   └────────────┬─────────────┘    │
//! │           │ start / stop                     │ proxy hubs       │
//! │           ▼                                  ▼                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                    ModuleRegistry                        │   │
//! │  │        one instance per module type, owns the hubs       │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Crates
//!
//! - `event`: publish/subscribe hub with proxy tracking
//! - `module`: modules, scenes and their registry
//! - `view`: view lifecycle, caching, stacking and focus

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod headless;

pub use stratum_event as event;
pub use stratum_module as module;
pub use stratum_view as view;

pub use headless::{HeadlessHost, PanelRecord};
pub use stratum_event::{EventHub, EventId, Handler, OwnedArgs};
pub use stratum_module::{Module, ModuleBase, ModuleRegistry, Scene, SceneDirector, SceneSwap};
pub use stratum_view::{
    OpenOptions, RegistryConfig, View, ViewError, ViewHost, ViewId, ViewMeta, ViewRegistry,
};

use std::sync::Arc;

/// Modules, scenes and views driven by one frame loop.
pub struct Runtime<H: ViewHost> {
    config: RegistryConfig,
    modules: Arc<ModuleRegistry>,
    scenes: SceneDirector,
    views: ViewRegistry<H>,
}

impl<H: ViewHost> Runtime<H> {
    /// Creates a runtime over `host`.
    #[must_use]
    pub fn new(host: H, config: RegistryConfig) -> Self {
        let modules = Arc::new(ModuleRegistry::new());
        let scenes = SceneDirector::new(Arc::clone(&modules));
        let views = ViewRegistry::new(host, Arc::clone(&modules), config.stack);
        tracing::info!(
            "Runtime: started with {} catalogued views",
            config.views.len()
        );
        Self {
            config,
            modules,
            scenes,
            views,
        }
    }

    /// Catalog entry for `identifier`.
    #[must_use]
    pub fn meta(&self, identifier: &str) -> Option<&ViewMeta> {
        self.config.meta(identifier)
    }

    /// The module registry.
    #[must_use]
    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.modules
    }

    /// The scene director.
    #[must_use]
    pub fn scenes(&self) -> &SceneDirector {
        &self.scenes
    }

    /// The scene director, mutably.
    pub fn scenes_mut(&mut self) -> &mut SceneDirector {
        &mut self.scenes
    }

    /// The view stack.
    #[must_use]
    pub fn views(&self) -> &ViewRegistry<H> {
        &self.views
    }

    /// The view stack, mutably.
    pub fn views_mut(&mut self) -> &mut ViewRegistry<H> {
        &mut self.views
    }

    /// Runs one frame: performs a scheduled scene swap (releasing scoped
    /// views when it happens), then applies view completions.
    pub fn update(&mut self) -> Option<SceneSwap> {
        let swap = self.scenes.update();
        if swap.is_some() {
            self.views.release_scoped();
        }
        self.views.update();
        swap
    }

    /// Destroys every view and stops every module.
    pub fn shutdown(&mut self) {
        self.views.destroy_all(&[]);
        self.modules.teardown();
        tracing::info!("Runtime: shut down");
    }
}

impl<H: ViewHost> std::fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("scenes", &self.scenes)
            .field("views", &self.views)
            .finish_non_exhaustive()
    }
}
