//! View lifecycle against the headless host: caching, stacking, focus,
//! pruning, deferred closes and async opens.

mod common;

use common::{registry, Journal, Probe};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use stratum::view::{
    CachePolicy, ElementDescriptor, FocusPolicy, ViewHost, ViewSchema, ViewState,
};
use stratum::{OpenOptions, OwnedArgs, ViewError, ViewId, ViewMeta};

fn meta(identifier: &str) -> ViewMeta {
    ViewMeta::new(identifier)
}

#[test]
fn test_uncached_view_is_destroyed_on_close() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let a_meta = meta("A").with_cache(CachePolicy::None);

    let a = views.open(&a_meta, OpenOptions::new(), &[&7_i32]).expect("open A");
    let panel = views.panel(a).expect("panel");
    assert_eq!(views.state(a), Some(ViewState::Opened));

    views.close(a, true).expect("close A");
    assert!(!views.host().is_alive(panel));
    assert!(views.open_views().is_empty());
    assert!(views.retained().is_empty());
    assert_eq!(views.state(a), Some(ViewState::Destroyed));
    assert_eq!(journal.take(), vec!["focus:A", "open:A:7", "close:A"]);
}

#[test]
fn test_scoped_view_is_retained_and_reused() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let b_meta = meta("B");

    let b = views.open(&b_meta, OpenOptions::new(), &[]).expect("open B");
    let panel = views.panel(b).expect("panel");
    views.close(b, true).expect("close B");

    assert_eq!(views.state(b), Some(ViewState::Closed));
    assert_eq!(views.retained().ids(), vec![b]);
    assert!(!views.host().panel(panel).expect("kept").active);

    let again = views.open(&b_meta, OpenOptions::new(), &[]).expect("reopen B");
    assert_eq!(again, b);
    assert!(views.retained().is_empty());
    assert!(views.host().panel(panel).expect("kept").active);
    assert_eq!(views.host().live_panels(), 1);
}

#[test]
fn test_scoped_release_spares_shared_views() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let b_meta = meta("B").with_cache(CachePolicy::ScopedRetain);
    let hud_meta = meta("Hud").with_cache(CachePolicy::SharedRetain);

    let b = views.open(&b_meta, OpenOptions::new(), &[]).expect("open B");
    let hud = views.open(&hud_meta, OpenOptions::new(), &[]).expect("open Hud");
    views.close(b, false).expect("close B");
    views.close(hud, false).expect("close Hud");
    assert_eq!(views.retained().len(), 2);

    views.release_scoped();
    assert_eq!(views.retained().ids(), vec![hud]);
    assert_eq!(views.state(b), Some(ViewState::Destroyed));
    assert_eq!(views.state(hud), Some(ViewState::Closed));
    assert_eq!(views.host().live_panels(), 1);
}

#[test]
fn test_load_does_not_open() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let a = views.load(&meta("A"), None, false).expect("load A");
    assert_eq!(views.state(a), Some(ViewState::Loaded));
    assert!(views.open_views().is_empty());
    assert!(journal.take().is_empty());
}

#[test]
fn test_load_with_close_if_opened_replaces_instance() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let a_meta = meta("A");

    let first = views.open(&a_meta, OpenOptions::new(), &[]).expect("open A");
    assert_eq!(views.load(&a_meta, None, false).expect("load A"), first);

    let second = views.load(&a_meta, None, true).expect("reload A");
    assert_ne!(second, first);
    assert_eq!(views.state(first), Some(ViewState::Closed));
    assert_eq!(views.retained().ids(), vec![first]);
    assert_eq!(views.host().live_panels(), 2);
    assert_eq!(journal.take(), vec!["focus:A", "open:A", "close:A"]);
}

#[test]
fn test_multiple_instances_coexist() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let toast = meta("A").with_multiple(true).with_focus(FocusPolicy::Silent);

    let first = views.open(&toast, OpenOptions::new(), &[]).expect("first");
    let second = views.open(&toast, OpenOptions::new(), &[]).expect("second");
    assert_ne!(first, second);
    assert_eq!(views.open_views(), vec![first, second]);
    assert_eq!(views.find(&toast), Some(second));
}

#[test]
fn test_unknown_identifier_reports_host_error() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let result = views.open(&meta("Missing"), OpenOptions::new(), &[]);
    assert!(matches!(result, Err(ViewError::Host(_))));
    assert_eq!(views.host().live_panels(), 0);
}

#[test]
fn test_close_unknown_handle() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let result = views.close(ViewId(42), true);
    assert!(matches!(result, Err(ViewError::UnknownView(ViewId(42)))));
    assert_eq!(views.state(ViewId(42)), None);
}

#[test]
fn test_anchor_placement_and_orders() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let x = views.open(&meta("X"), OpenOptions::new(), &[]).expect("open X");
    let y = views
        .open(&meta("Y"), OpenOptions::new().below(x), &[])
        .expect("open Y");
    assert_eq!(views.open_views(), vec![y, x]);

    let order = |id| {
        let panel = views.panel(id).expect("panel");
        views.host().panel(panel).expect("alive").order
    };
    assert_eq!(order(y), Some(500));
    assert_eq!(order(x), Some(600));
}

#[test]
fn test_sort_is_idempotent() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let x = views.open(&meta("X"), OpenOptions::new(), &[]).expect("open X");
    let y = views.open(&meta("Y"), OpenOptions::new(), &[]).expect("open Y");
    assert!(views.sort(y, Some(x), None));
    let once = views.open_views();
    assert!(views.sort(y, Some(x), None));
    assert_eq!(views.open_views(), once);
    assert_eq!(once, vec![y, x]);
}

#[test]
fn test_fixed_order_wins_over_position() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let hud_meta = meta("Hud").with_fixed_order(9000);

    let hud = views.open(&hud_meta, OpenOptions::new(), &[]).expect("open Hud");
    let a = views.open(&meta("A"), OpenOptions::new(), &[]).expect("open A");

    let hud_panel = views.panel(hud).expect("panel");
    let a_panel = views.panel(a).expect("panel");
    assert_eq!(views.host().panel(hud_panel).expect("alive").order, Some(9000));
    assert_eq!(views.host().panel(a_panel).expect("alive").order, Some(600));
}

#[test]
fn test_focus_policies() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let dialog_meta = meta("Dialog").with_focus(FocusPolicy::Static);
    let hud_meta = meta("Hud").with_focus(FocusPolicy::Silent);

    let a = views.open(&meta("A"), OpenOptions::new(), &[]).expect("open A");
    assert!(views.is_focused(a));

    let hud = views.open(&hud_meta, OpenOptions::new(), &[]).expect("open Hud");
    assert!(!views.is_focused(hud));
    assert!(views.is_focused(a));
    let hud_panel = views.panel(hud).expect("panel");
    assert!(views
        .host()
        .focus_log()
        .iter()
        .all(|(panel, _)| *panel != hud_panel));

    let dialog = views
        .open(&dialog_meta, OpenOptions::new(), &[])
        .expect("open Dialog");
    assert!(views.is_focused(dialog));
    assert!(!views.is_focused(a));

    let b = views.open(&meta("B"), OpenOptions::new(), &[]).expect("open B");
    assert!(!views.is_focused(b));
    assert!(views.is_focused(dialog));

    let holders = views
        .open_views()
        .into_iter()
        .filter(|id| views.is_focused(*id))
        .count();
    assert_eq!(holders, 1);
    assert_eq!(
        views.host().focused(),
        Some(views.panel(dialog).expect("panel"))
    );

    let log = journal.take();
    assert!(log.contains(&"blur:Hud".to_string()));
    assert!(log.contains(&"blur:A".to_string()));
    assert!(!log.contains(&"focus:B".to_string()));
}

#[test]
fn test_close_with_resume_refocuses_top() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let dialog_meta = meta("Dialog").with_focus(FocusPolicy::Static);

    let a = views.open(&meta("A"), OpenOptions::new(), &[]).expect("open A");
    let dialog = views
        .open(&dialog_meta, OpenOptions::new(), &[])
        .expect("open Dialog");
    assert!(!views.is_focused(a));

    views.close(dialog, true).expect("close Dialog");
    assert!(views.is_focused(a));
    assert_eq!(views.host().focused(), views.panel(a));
}

#[test]
fn test_resume_leaves_settled_holder_alone() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let a = views.open(&meta("A"), OpenOptions::new(), &[]).expect("open A");
    let b = views
        .open(&meta("B"), OpenOptions::new().below(a), &[])
        .expect("open B");
    assert!(views.is_focused(a));
    journal.take();
    let calls = views.host().focus_log().len();

    views.close(b, true).expect("close B");
    assert_eq!(journal.take(), vec!["close:B"]);
    assert_eq!(views.host().focus_log().len(), calls);
    assert!(views.is_focused(a));
}

#[test]
fn test_focus_of_stale_handles_is_ignored() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let x_meta = meta("X").with_cache(CachePolicy::None);

    let a = views.open(&meta("A"), OpenOptions::new(), &[]).expect("open A");
    let b = views.open(&meta("B"), OpenOptions::new(), &[]).expect("open B");
    let x = views.open(&x_meta, OpenOptions::new(), &[]).expect("open X");
    views.close(b, false).expect("close B");
    views.close(x, false).expect("close X");
    assert_eq!(views.state(b), Some(ViewState::Closed));
    assert_eq!(views.state(x), Some(ViewState::Destroyed));
    journal.take();

    assert!(!views.focus(b));
    assert!(!views.focus(x));
    assert!(views.is_focused(a));
    assert!(journal.take().is_empty());
}

#[test]
fn test_close_without_resume_leaves_focus_alone() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let dialog_meta = meta("Dialog").with_focus(FocusPolicy::Static);

    let a = views.open(&meta("A"), OpenOptions::new(), &[]).expect("open A");
    let dialog = views
        .open(&dialog_meta, OpenOptions::new(), &[])
        .expect("open Dialog");
    views.close(dialog, false).expect("close Dialog");
    assert!(!views.is_focused(a));

    assert!(views.focus(a));
    assert!(views.is_focused(a));
}

#[test]
fn test_focus_meta() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let a_meta = meta("A");
    let dialog_meta = meta("Dialog").with_focus(FocusPolicy::Static);
    let hud_meta = meta("Hud").with_focus(FocusPolicy::Silent);

    let a = views.open(&a_meta, OpenOptions::new(), &[]).expect("open A");
    let dialog = views
        .open(&dialog_meta, OpenOptions::new(), &[])
        .expect("open Dialog");
    views.open(&hud_meta, OpenOptions::new(), &[]).expect("open Hud");

    assert!(views.focus_meta(&a_meta));
    assert!(views.is_focused(a));
    assert!(!views.is_focused(dialog));

    assert!(!views.focus_meta(&hud_meta));
    assert!(!views.focus_meta(&meta("B")));
    assert!(views.is_focused(a));
}

#[test]
fn test_dead_panel_is_pruned_on_next_sort() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let a = views.open(&meta("A"), OpenOptions::new(), &[]).expect("open A");
    let b = views.open(&meta("B"), OpenOptions::new(), &[]).expect("open B");
    let panel = views.panel(a).expect("panel");
    assert!(views.host_mut().kill(panel));

    let x = views.open(&meta("X"), OpenOptions::new(), &[]).expect("open X");
    assert_eq!(views.open_views(), vec![b, x]);
    assert_eq!(views.state(a), Some(ViewState::Destroyed));
    assert!(!views.sort(a, None, None));
}

#[test]
fn test_close_completes_when_signal_drops() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let slow_meta = meta("Slow");

    let slow = views.open(&slow_meta, OpenOptions::new(), &[]).expect("open Slow");
    views.close(slow, true).expect("close Slow");
    assert_eq!(views.state(slow), Some(ViewState::Closing));
    assert!(views.open_views().is_empty());
    assert!(views.retained().is_empty());

    views.update();
    assert_eq!(views.state(slow), Some(ViewState::Closing));

    let probe = views.target_mut::<Probe>(slow).expect("probe");
    drop(probe.held.take());
    views.update();
    assert_eq!(views.state(slow), Some(ViewState::Closed));
    assert_eq!(views.retained().ids(), vec![slow]);
}

#[test]
fn test_retaining_replaces_earlier_entry() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let slow_meta = meta("Slow");

    let first = views.open(&slow_meta, OpenOptions::new(), &[]).expect("first");
    views.close(first, false).expect("close first");
    let second = views.open(&slow_meta, OpenOptions::new(), &[]).expect("second");
    assert_ne!(first, second);
    views.close(second, false).expect("close second");

    for id in [second, first] {
        let probe = views.target_mut::<Probe>(id).expect("probe");
        drop(probe.held.take());
        views.update();
    }

    assert_eq!(views.retained().ids(), vec![first]);
    assert_eq!(views.state(second), Some(ViewState::Destroyed));
    assert_eq!(views.host().live_panels(), 1);
}

#[test]
fn test_async_open_completes_on_update() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let a_meta = meta("A");
    views.host_mut().set_deferred(true);

    let opened: Rc<RefCell<Vec<ViewId>>> = Rc::default();
    let sink = Rc::clone(&opened);
    let id = views
        .open_async(&a_meta, OpenOptions::new(), OwnedArgs::new().with(3_i32), move |result| {
            if let Ok(id) = result {
                sink.borrow_mut().push(id);
            }
        })
        .expect("open_async");
    assert_eq!(views.state(id), Some(ViewState::Loading));
    assert!(views.is_loading(&a_meta));

    let again = views.open_async(&a_meta, OpenOptions::new(), OwnedArgs::new(), |_| {});
    assert!(matches!(again, Err(ViewError::AlreadyLoading { .. })));
    assert!(matches!(
        views.load(&a_meta, None, false),
        Err(ViewError::AlreadyLoading { .. })
    ));

    assert_eq!(views.host_mut().complete_pending(), 1);
    assert!(opened.borrow().is_empty());
    views.update();

    assert_eq!(*opened.borrow(), vec![id]);
    assert_eq!(views.state(id), Some(ViewState::Opened));
    assert_eq!(views.open_views(), vec![id]);
    assert!(journal.take().contains(&"open:A:3".to_string()));
}

#[test]
fn test_async_open_inline_host() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let opened: Rc<RefCell<Option<ViewId>>> = Rc::default();
    let sink = Rc::clone(&opened);
    let id = views
        .open_async(&meta("X"), OpenOptions::new(), OwnedArgs::new(), move |result| {
            *sink.borrow_mut() = result.ok();
        })
        .expect("open_async");

    assert_eq!(*opened.borrow(), Some(id));
    assert_eq!(views.state(id), Some(ViewState::Opened));
}

#[test]
fn test_async_open_failure_reaches_callback() {
    let journal = Journal::default();
    let mut views = registry(&journal);

    let failed = Rc::new(RefCell::new(false));
    let sink = Rc::clone(&failed);
    views
        .open_async(&meta("Missing"), OpenOptions::new(), OwnedArgs::new(), move |result| {
            *sink.borrow_mut() = matches!(result, Err(ViewError::Host(_)));
        })
        .expect("open_async");
    assert!(*failed.borrow());
}

#[test]
fn test_closing_loading_handle_cancels_open() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    views.host_mut().set_deferred(true);

    let called = Rc::new(RefCell::new(false));
    let sink = Rc::clone(&called);
    let id = views
        .open_async(&meta("B"), OpenOptions::new(), OwnedArgs::new(), move |_| {
            *sink.borrow_mut() = true;
        })
        .expect("open_async");
    views.close(id, true).expect("cancel");

    views.host_mut().complete_pending();
    views.update();
    assert!(!*called.borrow());
    assert_eq!(views.state(id), Some(ViewState::Destroyed));
    assert_eq!(views.host().live_panels(), 0);
    assert!(views.open_views().is_empty());
}

#[test]
fn test_close_all_and_destroy_all_honour_exclusions() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let hud_meta = meta("Hud").with_cache(CachePolicy::SharedRetain);

    let a = views.open(&meta("A"), OpenOptions::new(), &[]).expect("open A");
    let b = views.open(&meta("B"), OpenOptions::new(), &[]).expect("open B");
    let hud = views.open(&hud_meta, OpenOptions::new(), &[]).expect("open Hud");

    views.close_all(&[hud_meta.clone()]);
    assert_eq!(views.open_views(), vec![hud]);
    assert_eq!(views.state(a), Some(ViewState::Closed));
    assert_eq!(views.state(b), Some(ViewState::Closed));

    views.destroy_all(&[hud_meta]);
    assert!(views.retained().is_empty());
    assert_eq!(views.state(a), Some(ViewState::Destroyed));
    assert_eq!(views.state(hud), Some(ViewState::Opened));

    views.destroy_all(&[]);
    assert_eq!(views.state(hud), Some(ViewState::Destroyed));
    assert_eq!(views.host().live_panels(), 0);
}

#[test]
fn test_close_meta_closes_every_instance() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let toast = meta("A").with_multiple(true).with_cache(CachePolicy::None);

    views.open(&toast, OpenOptions::new(), &[]).expect("first");
    views.open(&toast, OpenOptions::new(), &[]).expect("second");
    assert!(views.close_meta(&toast, true));
    assert!(views.open_views().is_empty());
    assert!(!views.close_meta(&toast, true));
}

#[test]
fn test_schema_elements_reach_host() {
    let journal = Journal::default();
    let mut views = registry(&journal);
    let base = Arc::new(
        ViewSchema::new("Panel")
            .element(ElementDescriptor::class("root"))
            .element(ElementDescriptor::member("close", "CloseButton")),
    );
    let form = Arc::new(
        ViewSchema::new("Form")
            .extends(base)
            .element(ElementDescriptor::member("submit", "SubmitButton")),
    );
    let factory_journal = journal.clone();
    let schema = Arc::clone(&form);
    views.host_mut().register("Form", move || {
        let mut probe = Probe::new("Form", factory_journal.clone());
        probe.schema = Some(Arc::clone(&schema));
        Box::new(probe)
    });

    let id = views.open(&meta("Form"), OpenOptions::new(), &[]).expect("open Form");
    let names: Vec<&str> = views
        .elements(id)
        .expect("elements")
        .iter()
        .map(|element| element.name.as_str())
        .collect();
    assert_eq!(names, vec!["root", "CloseButton", "SubmitButton"]);

    let panel = views.panel(id).expect("panel");
    let record = views.host().panel(panel).expect("alive");
    assert_eq!(record.elements, 3);
    assert_eq!(record.view, Some(id));
}
