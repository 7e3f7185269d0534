//! # Stratum Demo
//!
//! Walks a small game UI through its lifecycle on the headless host:
//!
//! Town → HUD + Inventory → Confirm dialog → Toasts → Dungeon
//!
//! Prints the stack after every step and the callback trace at the end.

use parking_lot::Mutex;
use std::sync::Arc;

use stratum::event::{event_ids, Args};
use stratum::module::{EventBinding, ModuleKey};
use stratum::view::{CloseSignal, ViewContext, ViewResult};
use stratum::{
    Handler, HeadlessHost, Module, ModuleBase, OpenOptions, OwnedArgs, RegistryConfig, Runtime,
    Scene, View, ViewError, ViewHost, ViewMeta,
};

const CATALOG: &str = include_str!("../../data/views.toml");

type Trace = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Copy)]
enum BackpackEvent {
    ItemAdded = 1,
}

event_ids!(BackpackEvent);

struct Backpack {
    base: ModuleBase,
}

impl Default for Backpack {
    fn default() -> Self {
        Self {
            base: ModuleBase::of::<Self>(),
        }
    }
}

impl Module for Backpack {
    fn base(&self) -> &ModuleBase {
        &self.base
    }
}

struct Town {
    base: ModuleBase,
}

impl Default for Town {
    fn default() -> Self {
        Self {
            base: ModuleBase::of::<Self>(),
        }
    }
}

impl Module for Town {
    fn base(&self) -> &ModuleBase {
        &self.base
    }
}

impl Scene for Town {}

struct Dungeon {
    base: ModuleBase,
}

impl Default for Dungeon {
    fn default() -> Self {
        Self {
            base: ModuleBase::of::<Self>(),
        }
    }
}

impl Module for Dungeon {
    fn base(&self) -> &ModuleBase {
        &self.base
    }
}

impl Scene for Dungeon {}

/// Traces every callback. Panels named "Inventory" also listen to the
/// backpack.
struct TracedView {
    name: &'static str,
    trace: Trace,
}

impl View for TracedView {
    fn on_open(&mut self, ctx: &ViewContext<'_>, args: Args<'_>) {
        let detail = args
            .first()
            .and_then(|arg| arg.downcast_ref::<&str>())
            .map_or_else(String::new, |text| format!(" \"{text}\""));
        self.trace
            .lock()
            .push(format!("{} open {}{}", ctx.id(), self.name, detail));
    }

    fn on_focus(&mut self, ctx: &ViewContext<'_>) {
        self.trace.lock().push(format!("{} focus {}", ctx.id(), self.name));
    }

    fn on_blur(&mut self, ctx: &ViewContext<'_>) {
        self.trace.lock().push(format!("{} blur {}", ctx.id(), self.name));
    }

    fn on_close(&mut self, ctx: &ViewContext<'_>, done: CloseSignal) {
        self.trace.lock().push(format!("{} close {}", ctx.id(), self.name));
        done.done();
    }

    fn module(&self) -> Option<ModuleKey> {
        (self.name == "Inventory").then(ModuleKey::of::<Backpack>)
    }

    fn event_bindings(&self) -> Vec<EventBinding> {
        if self.name != "Inventory" {
            return Vec::new();
        }
        let trace = Arc::clone(&self.trace);
        vec![EventBinding::new(
            BackpackEvent::ItemAdded,
            Handler::binary::<&'static str, u32, _>(move |item, count| {
                trace.lock().push(format!("Inventory shows {count} x {item}"));
            }),
        )]
    }
}

fn build_host(config: &RegistryConfig, trace: &Trace) -> HeadlessHost {
    let mut host = HeadlessHost::new();
    for meta in &config.views {
        let name: &'static str = match meta.identifier.as_str() {
            "Hud" => "Hud",
            "Inventory" => "Inventory",
            "Confirm" => "Confirm",
            "Toast" => "Toast",
            _ => continue,
        };
        let trace = Arc::clone(trace);
        host.register(name, move || {
            Box::new(TracedView {
                name,
                trace: Arc::clone(&trace),
            })
        });
    }
    host
}

fn catalog(runtime: &Runtime<HeadlessHost>, identifier: &str) -> ViewResult<ViewMeta> {
    runtime
        .meta(identifier)
        .cloned()
        .ok_or_else(|| ViewError::InvalidConfig(format!("{identifier} is not catalogued")))
}

fn print_stack(step: &str, runtime: &Runtime<HeadlessHost>) {
    let views = runtime.views();
    println!("── {step}");
    for id in views.open_views() {
        let Some(meta) = views.meta(id) else {
            continue;
        };
        let order = views
            .panel(id)
            .and_then(|panel| views.host().panel(panel))
            .and_then(|record| record.order);
        println!(
            "   {:<10} {:<8} order {:>5}  {}",
            meta.identifier,
            id.to_string(),
            order.map_or_else(|| "-".to_string(), |order| order.to_string()),
            if views.is_focused(id) { "◆ focused" } else { "" }
        );
    }
    println!(
        "   retained: {}  live panels: {}",
        views.retained().len(),
        views.host().live_panels()
    );
    println!();
}

fn main() -> Result<(), ViewError> {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("                     STRATUM VIEW STACK DEMO");
    println!("                         HEADLESS HOST");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    let config = RegistryConfig::from_toml_str(CATALOG)?;
    let trace: Trace = Arc::default();
    let host = build_host(&config, &trace);
    let mut runtime = Runtime::new(host, config);

    let hud = catalog(&runtime, "Hud")?;
    let inventory = catalog(&runtime, "Inventory")?;
    let confirm = catalog(&runtime, "Confirm")?;
    let toast = catalog(&runtime, "Toast")?;

    let backpack = runtime.modules().start::<Backpack>(&[]);
    runtime.scenes_mut().goto_scene::<Town>(OwnedArgs::new());
    runtime.update();

    // =========================================================================
    // Town: HUD and inventory
    // =========================================================================
    let views = runtime.views_mut();
    views.open(&hud, OpenOptions::new(), &[])?;
    let bag = views.open(&inventory, OpenOptions::new(), &[])?;
    backpack
        .base()
        .event()
        .notify(BackpackEvent::ItemAdded, &[&"Rope", &3_u32]);
    print_stack("Town: HUD + Inventory", &runtime);

    // =========================================================================
    // Modal confirm steals focus, closing it hands focus back
    // =========================================================================
    let views = runtime.views_mut();
    let dialog = views.open(&confirm, OpenOptions::new(), &[&"Drop the rope?"])?;
    print_stack("Confirm opened", &runtime);
    let views = runtime.views_mut();
    views.close(dialog, true)?;
    print_stack("Confirm closed", &runtime);

    // =========================================================================
    // Toasts stack below the inventory and never take focus
    // =========================================================================
    let views = runtime.views_mut();
    views.open(&toast, OpenOptions::new().below(bag), &[&"Saved"])?;
    views.open(&toast, OpenOptions::new().below(bag), &[&"Quest updated"])?;
    print_stack("Two toasts", &runtime);

    // =========================================================================
    // Leaving town: scoped views go, the shared HUD stays retained
    // =========================================================================
    let views = runtime.views_mut();
    views.close_all(&[]);
    print_stack("Everything closed", &runtime);

    runtime.scenes_mut().goto_scene::<Dungeon>(OwnedArgs::new());
    if let Some(swap) = runtime.update() {
        println!(
            "Scene swap: {} -> {}",
            swap.from.as_deref().unwrap_or("<none>"),
            swap.to
        );
    }
    print_stack("Dungeon", &runtime);

    let views = runtime.views_mut();
    let reopened = views.open(&hud, OpenOptions::new(), &[])?;
    let panel = views.panel(reopened);
    println!(
        "HUD reopened as {} on a {} panel",
        reopened,
        if panel.is_some_and(|panel| views.host().is_alive(panel)) {
            "reused"
        } else {
            "missing"
        }
    );
    println!();

    runtime.shutdown();
    println!("Trace:");
    for line in trace.lock().iter() {
        println!("   {line}");
    }
    Ok(())
}
