//! Views listening to module events through proxy hubs.

mod common;

use common::{host, Journal};
use std::sync::Arc;
use stratum::event::event_ids;
use stratum::module::{EventBinding, ModuleKey};
use stratum::view::StackConfig;
use stratum::{
    Handler, HeadlessHost, Module, ModuleBase, ModuleRegistry, OpenOptions, View, ViewMeta,
    ViewRegistry,
};

#[derive(Clone, Copy)]
enum ShopEvent {
    Purchased = 1,
    Restocked = 2,
}

event_ids!(ShopEvent);

struct Shop {
    base: ModuleBase,
}

impl Default for Shop {
    fn default() -> Self {
        Self {
            base: ModuleBase::of::<Self>(),
        }
    }
}

impl Module for Shop {
    fn base(&self) -> &ModuleBase {
        &self.base
    }
}

/// Counts purchases and records the first restock only.
struct Till {
    journal: Journal,
}

impl View for Till {
    fn module(&self) -> Option<ModuleKey> {
        Some(ModuleKey::of::<Shop>())
    }

    fn event_bindings(&self) -> Vec<EventBinding> {
        let purchases = self.journal.clone();
        let restocks = self.journal.clone();
        vec![
            EventBinding::new(
                ShopEvent::Purchased,
                Handler::unary(move |amount: &u32| purchases.push(format!("till:{amount}"))),
            ),
            EventBinding::new(
                ShopEvent::Restocked,
                Handler::nullary(move || restocks.push("till:restocked")),
            )
            .once(),
        ]
    }
}

fn till_registry(journal: &Journal, modules: &Arc<ModuleRegistry>) -> ViewRegistry<HeadlessHost> {
    let mut host = host(journal);
    let factory_journal = journal.clone();
    host.register("Till", move || {
        Box::new(Till {
            journal: factory_journal.clone(),
        })
    });
    ViewRegistry::new(host, Arc::clone(modules), StackConfig::default())
}

#[test]
fn test_view_bindings_land_on_module_hub() {
    let journal = Journal::default();
    let modules = Arc::new(ModuleRegistry::new());
    let shop = modules.start::<Shop>(&[]);
    let mut views = till_registry(&journal, &modules);

    let till = views
        .open(&ViewMeta::new("Till"), OpenOptions::new(), &[])
        .expect("open Till");
    let hub = views.event(till).expect("hub");
    assert!(hub.is_proxy());
    assert_eq!(hub.proxy_count(), 2);

    shop.base().event().notify(ShopEvent::Purchased, &[&5_u32]);
    shop.base().event().notify(ShopEvent::Restocked, &[]);
    shop.base().event().notify(ShopEvent::Restocked, &[]);
    hub.notify(ShopEvent::Purchased, &[&9_u32]);

    assert_eq!(journal.take(), vec!["till:5", "till:restocked", "till:9"]);
    assert_eq!(shop.base().event().listener_count(ShopEvent::Restocked), 0);
}

#[test]
fn test_closing_severs_only_view_registrations() {
    let journal = Journal::default();
    let modules = Arc::new(ModuleRegistry::new());
    let shop = modules.start::<Shop>(&[]);
    let mut views = till_registry(&journal, &modules);

    let direct_journal = journal.clone();
    let direct = Handler::unary(move |amount: &u32| direct_journal.push(format!("direct:{amount}")));
    assert!(shop.base().event().register(ShopEvent::Purchased, &direct, false));

    let till_meta = ViewMeta::new("Till");
    let till = views
        .open(&till_meta, OpenOptions::new(), &[])
        .expect("open Till");
    assert_eq!(shop.base().event().listener_count(ShopEvent::Purchased), 2);

    views.close(till, true).expect("close Till");
    assert_eq!(shop.base().event().listener_count(ShopEvent::Purchased), 1);
    shop.base().event().notify(ShopEvent::Purchased, &[&1_u32]);
    assert_eq!(journal.take(), vec!["direct:1"]);

    let again = views
        .open(&till_meta, OpenOptions::new(), &[])
        .expect("reopen Till");
    assert_eq!(again, till);
    assert_eq!(shop.base().event().listener_count(ShopEvent::Purchased), 2);

    views.destroy_all(&[]);
    assert_eq!(shop.base().event().listener_count(ShopEvent::Purchased), 1);
    assert_eq!(shop.base().event().listener_count(ShopEvent::Restocked), 0);
    shop.base().event().notify(ShopEvent::Purchased, &[&2_u32]);
    assert_eq!(journal.take(), vec!["direct:2"]);
}

#[test]
fn test_unregistered_module_falls_back_to_plain_hub() {
    let journal = Journal::default();
    let modules = Arc::new(ModuleRegistry::new());
    let mut views = till_registry(&journal, &modules);

    let till = views
        .open(&ViewMeta::new("Till"), OpenOptions::new(), &[])
        .expect("open Till");
    let hub = views.event(till).expect("hub");
    assert!(!hub.is_proxy());
    assert_eq!(hub.listener_count(ShopEvent::Purchased), 1);

    hub.notify(ShopEvent::Purchased, &[&3_u32]);
    assert_eq!(journal.take(), vec!["till:3"]);
}

#[test]
fn test_stopping_module_clears_its_hub() {
    let journal = Journal::default();
    let modules = Arc::new(ModuleRegistry::new());
    let shop = modules.start::<Shop>(&[]);
    let mut views = till_registry(&journal, &modules);

    let till = views
        .open(&ViewMeta::new("Till"), OpenOptions::new(), &[])
        .expect("open Till");
    modules.stop_module(&*shop);
    assert!(!shop.base().enabled());
    assert_eq!(shop.base().event().listener_count(ShopEvent::Purchased), 0);

    // Records outlive the registrations they describe until the view closes.
    views.close(till, true).expect("close Till");
    assert_eq!(views.event(till).expect("retained").proxy_count(), 0);
}
