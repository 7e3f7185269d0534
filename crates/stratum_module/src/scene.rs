//! # Scene Director
//!
//! Scenes are modules that are active one at a time. A transition is
//! requested with [`SceneDirector::goto`] and performed on the next
//! [`SceneDirector::update`], so the outgoing scene finishes its frame.
//!
//! ```text
//! goto(B)   current=A  next=B
//! update()  stop(A) ──> start(B) ──> last=A current=B next=None ──> on_swap
//! ```

use crate::error::{SceneError, SceneResult};
use crate::module::Module;
use crate::registry::ModuleRegistry;
use core::any::Any;
use core::fmt;
use std::sync::Arc;
use stratum_event::OwnedArgs;

/// Marker for modules that can be made the current scene.
pub trait Scene: Module {}

/// Converts an arbitrary object routed through
/// [`SceneDirector::goto_object`] into a scene. Returning `None` declines.
pub type SceneProxy = Box<dyn Fn(Box<dyn Any + Send>) -> Option<Arc<dyn Module>> + Send + Sync>;

type SwapListener = Box<dyn Fn(&SceneSwap) + Send + Sync>;

/// A completed scene transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSwap {
    /// Name of the outgoing scene, if there was one.
    pub from: Option<String>,
    /// Name of the incoming scene.
    pub to: String,
}

/// Sequences scenes over a shared module registry.
pub struct SceneDirector {
    registry: Arc<ModuleRegistry>,
    current: Option<Arc<dyn Module>>,
    last: Option<Arc<dyn Module>>,
    next: Option<Arc<dyn Module>>,
    args: Option<OwnedArgs>,
    proxy: Option<SceneProxy>,
    listeners: Vec<SwapListener>,
}

impl SceneDirector {
    /// Creates a director with no current scene.
    #[must_use]
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self {
            registry,
            current: None,
            last: None,
            next: None,
            args: None,
            proxy: None,
            listeners: Vec::new(),
        }
    }

    /// Registry scenes are started and stopped through.
    #[must_use]
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// The active scene.
    #[must_use]
    pub fn current(&self) -> Option<&Arc<dyn Module>> {
        self.current.as_ref()
    }

    /// The scene that was active before the last swap.
    #[must_use]
    pub fn last(&self) -> Option<&Arc<dyn Module>> {
        self.last.as_ref()
    }

    /// The scene scheduled for the next update.
    #[must_use]
    pub fn next(&self) -> Option<&Arc<dyn Module>> {
        self.next.as_ref()
    }

    /// Arguments of the scheduled transition.
    #[must_use]
    pub fn args(&self) -> Option<&OwnedArgs> {
        self.args.as_ref()
    }

    /// Replaces the active scene without running any lifecycle hooks.
    pub fn set_current(&mut self, scene: Option<Arc<dyn Module>>) {
        self.current = scene;
    }

    /// Installs the conversion used by [`SceneDirector::goto_object`].
    pub fn set_proxy(&mut self, proxy: SceneProxy) {
        self.proxy = Some(proxy);
    }

    /// Adds a listener fired after every swap.
    pub fn on_swap<F>(&mut self, listener: F)
    where
        F: Fn(&SceneSwap) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Schedules `scene` for the next update.
    pub fn goto<S: Scene>(&mut self, scene: Arc<S>, args: OwnedArgs) {
        self.schedule(scene, args);
    }

    /// Schedules the registry's instance of `S`, creating it if needed.
    pub fn goto_scene<S: Scene + Default>(&mut self, args: OwnedArgs) -> Arc<S> {
        let scene = self.registry.instance::<S>();
        self.schedule(Arc::clone(&scene) as Arc<dyn Module>, args);
        scene
    }

    /// Schedules an arbitrary object.
    ///
    /// An `Arc<dyn Module>` is scheduled as is. Anything else goes through
    /// the proxy; a proxy that declines is logged and nothing is scheduled.
    ///
    /// # Errors
    ///
    /// [`SceneError::MissingProxy`] if a conversion is needed and no proxy
    /// is installed.
    pub fn goto_object(&mut self, object: Box<dyn Any + Send>, args: OwnedArgs) -> SceneResult<()> {
        let object = match object.downcast::<Arc<dyn Module>>() {
            Ok(scene) => {
                self.schedule(*scene, args);
                return Ok(());
            }
            Err(object) => object,
        };
        let proxy = self.proxy.as_ref().ok_or(SceneError::MissingProxy)?;
        match proxy(object) {
            Some(scene) => self.schedule(scene, args),
            None => tracing::warn!("SceneDirector: proxy declined the object, goto ignored"),
        }
        Ok(())
    }

    fn schedule(&mut self, scene: Arc<dyn Module>, args: OwnedArgs) {
        if let Some(pending) = &self.next {
            tracing::warn!(
                "SceneDirector: {} replaces pending scene {}",
                scene.base().name(),
                pending.base().name()
            );
        }
        tracing::debug!("SceneDirector: goto {}", scene.base().name());
        self.next = Some(scene);
        self.args = Some(args);
    }

    /// Performs a scheduled transition, if any.
    pub fn update(&mut self) -> Option<SceneSwap> {
        let incoming = self.next.take()?;
        let args = self.args.take().unwrap_or_default();

        let outgoing = self.current.take();
        if let Some(outgoing) = &outgoing {
            if outgoing.base().enabled() {
                self.registry.stop_module(&**outgoing);
            }
        }
        self.registry.start_module(&*incoming, &args.as_refs());

        let swap = SceneSwap {
            from: outgoing.as_ref().map(|scene| scene.base().name().to_owned()),
            to: incoming.base().name().to_owned(),
        };
        self.last = outgoing;
        self.current = Some(incoming);

        tracing::info!(
            "SceneDirector: swapped {} -> {}",
            swap.from.as_deref().unwrap_or("<none>"),
            swap.to
        );
        for listener in &self.listeners {
            listener(&swap);
        }
        Some(swap)
    }
}

impl fmt::Debug for SceneDirector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |scene: &Option<Arc<dyn Module>>| {
            scene.as_ref().map(|scene| scene.base().name().to_owned())
        };
        f.debug_struct("SceneDirector")
            .field("current", &name(&self.current))
            .field("last", &name(&self.last))
            .field("next", &name(&self.next))
            .finish_non_exhaustive()
    }
}
