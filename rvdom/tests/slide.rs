use std::sync::Arc;
use std::time::Duration;

use rvdom::{
    Display, DomError, Document, Edges, Element, ElementId, Host, SlideDirection, SlideEngine,
    TransitionOutcome,
};
use tokio::time::sleep;

const MS_500: Duration = Duration::from_millis(500);

fn setup(hidden: bool) -> (Arc<Document>, SlideEngine, ElementId) {
    let doc = Arc::new(Document::new(1024));
    let mut panel = Element::div()
        .id("panel")
        .content_height(100.0)
        .padding(Edges::all(10.0));
    if hidden {
        panel = panel.hidden();
    }
    let el = doc.mount(doc.body(), panel).unwrap();
    let engine = SlideEngine::new(doc.clone());
    (doc, engine, el)
}

// =============================================================================
// Collapse
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_collapse_animates_to_zero_and_hides() {
    let (doc, engine, el) = setup(false);
    assert_eq!(doc.offset_height(el).unwrap(), 120.0);

    let done = engine.collapse(el, MS_500).unwrap();
    assert_eq!(done.direction(), SlideDirection::Collapse);
    assert!(engine.is_pending(el));
    assert_eq!(doc.offset_height(el).unwrap(), 120.0);

    sleep(Duration::from_millis(250)).await;
    assert_eq!(doc.offset_height(el).unwrap(), 60.0);

    assert_eq!(done.await, TransitionOutcome::Completed);
    assert_eq!(doc.offset_height(el).unwrap(), 0.0);
    assert_eq!(doc.computed_display(el).unwrap(), Display::None);
    assert!(!engine.is_pending(el));

    let style = doc.inline_style(el).unwrap();
    assert_eq!(style.display, Some(Display::None));
    assert!(style.height.is_none());
    assert!(style.transition.is_none());
    assert!(style.overflow.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_collapse_restarts_from_partial_height() {
    let (doc, engine, el) = setup(false);

    let first = engine.collapse(el, MS_500).unwrap();
    sleep(Duration::from_millis(250)).await;
    assert_eq!(doc.offset_height(el).unwrap(), 60.0);

    let second = engine.collapse(el, MS_500).unwrap();
    assert_eq!(engine.pending_count(), 1);
    assert_eq!(first.await, TransitionOutcome::Superseded);
    assert_eq!(doc.offset_height(el).unwrap(), 60.0);

    sleep(Duration::from_millis(250)).await;
    assert_eq!(doc.offset_height(el).unwrap(), 30.0);

    assert_eq!(second.await, TransitionOutcome::Completed);
    assert_eq!(doc.computed_display(el).unwrap(), Display::None);
}

// =============================================================================
// Expand
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_expand_reveals_natural_height() {
    let (doc, engine, el) = setup(true);
    assert_eq!(doc.offset_height(el).unwrap(), 0.0);

    let done = engine.expand(el, MS_500).unwrap();
    assert_eq!(doc.computed_display(el).unwrap(), Display::Block);

    sleep(Duration::from_millis(250)).await;
    assert_eq!(doc.offset_height(el).unwrap(), 60.0);

    assert_eq!(done.await, TransitionOutcome::Completed);
    assert_eq!(doc.offset_height(el).unwrap(), 120.0);

    let style = doc.inline_style(el).unwrap();
    assert_eq!(style.display, Some(Display::Block));
    assert!(style.height.is_none());
    assert!(style.overflow.is_none());
    assert!(style.transition.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_expand_keeps_non_block_display() {
    let doc = Arc::new(Document::new(800));
    let el = doc
        .mount(
            doc.body(),
            Element::div().display(Display::Flex).content_height(40.0),
        )
        .unwrap();
    doc.set_style(el, rvdom::StylePatch::new().display(Display::None))
        .unwrap();
    let engine = SlideEngine::new(doc.clone());

    engine.expand(el, MS_500).unwrap().await;
    assert_eq!(doc.computed_display(el).unwrap(), Display::Flex);
    assert_eq!(doc.offset_height(el).unwrap(), 40.0);
}

// =============================================================================
// Superseding
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_collapse_then_expand_last_request_wins() {
    let (doc, engine, el) = setup(false);

    let collapse = engine.collapse(el, MS_500).unwrap();
    let expand = engine.expand(el, MS_500).unwrap();

    assert_eq!(engine.pending_count(), 1);
    assert_eq!(engine.pending_direction(el), Some(SlideDirection::Expand));

    assert_eq!(collapse.await, TransitionOutcome::Superseded);
    assert_eq!(expand.await, TransitionOutcome::Completed);

    assert_eq!(engine.pending_count(), 0);
    assert_eq!(doc.offset_height(el).unwrap(), 120.0);
    assert_eq!(doc.computed_display(el).unwrap(), Display::Block);
}

#[tokio::test(start_paused = true)]
async fn test_stale_timer_does_not_hide_expanded_element() {
    let (doc, engine, el) = setup(false);

    let _collapse = engine.collapse(el, Duration::from_millis(100)).unwrap();
    let expand = engine.expand(el, Duration::from_millis(300)).unwrap();

    // Past the collapse deadline: the aborted timer must not have fired.
    sleep(Duration::from_millis(150)).await;
    assert_eq!(doc.computed_display(el).unwrap(), Display::Block);
    assert!(engine.is_pending(el));

    assert_eq!(expand.await, TransitionOutcome::Completed);
    assert_eq!(doc.offset_height(el).unwrap(), 120.0);
}

#[tokio::test(start_paused = true)]
async fn test_independent_elements_run_side_by_side() {
    let doc = Arc::new(Document::new(1024));
    let a = doc
        .mount(doc.body(), Element::div().content_height(50.0))
        .unwrap();
    let b = doc
        .mount(doc.body(), Element::div().content_height(80.0).hidden())
        .unwrap();
    let engine = SlideEngine::new(doc.clone());

    let ta = engine.collapse(a, MS_500).unwrap();
    let tb = engine.expand(b, MS_500).unwrap();
    assert_eq!(engine.pending_count(), 2);

    let (ra, rb) = tokio::join!(ta, tb);
    assert_eq!(ra, TransitionOutcome::Completed);
    assert_eq!(rb, TransitionOutcome::Completed);
    assert_eq!(doc.offset_height(a).unwrap(), 0.0);
    assert_eq!(doc.offset_height(b).unwrap(), 80.0);
}

#[tokio::test(start_paused = true)]
async fn test_separate_engines_do_not_share_registry() {
    let (doc, engine, el) = setup(false);
    let other = SlideEngine::new(doc.clone());

    let _t = engine.collapse(el, MS_500).unwrap();
    assert_eq!(engine.pending_count(), 1);
    assert_eq!(other.pending_count(), 0);
}

// =============================================================================
// Toggle / cancel / errors
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_toggle_dispatches_on_display() {
    let (doc, engine, el) = setup(true);

    let t = engine.toggle(el, MS_500).unwrap();
    assert_eq!(t.direction(), SlideDirection::Expand);
    t.await;

    let t = engine.toggle(el, MS_500).unwrap();
    assert_eq!(t.direction(), SlideDirection::Collapse);
    t.await;
    assert!(doc.is_hidden(el).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_strips_transition_overrides() {
    let (doc, engine, el) = setup(false);

    let t = engine.collapse(el, MS_500).unwrap();
    assert!(engine.cancel(el).unwrap());
    assert_eq!(t.await, TransitionOutcome::Superseded);

    let style = doc.inline_style(el).unwrap();
    assert!(style.height.is_none());
    assert!(style.transition.is_none());
    assert_eq!(doc.offset_height(el).unwrap(), 120.0);

    assert!(!engine.cancel(el).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_detached_element_is_reported() {
    let (doc, engine, _) = setup(false);

    let err = engine.collapse(doc.body(), MS_500).unwrap_err();
    assert_eq!(err, DomError::DetachedElement(doc.body()));
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_removed_element_is_unknown() {
    let (doc, engine, el) = setup(false);
    doc.remove_element(el).unwrap();

    let err = engine.expand(el, MS_500).unwrap_err();
    assert_eq!(err, DomError::UnknownElement(el));
}

#[tokio::test(start_paused = true)]
async fn test_zero_duration_completes_immediately() {
    let (doc, engine, el) = setup(false);

    let t = engine.collapse(el, Duration::ZERO).unwrap();
    assert_eq!(t.await, TransitionOutcome::Completed);
    assert!(doc.is_hidden(el).unwrap());
}

#[test]
fn test_slides_without_runtime_leave_element_untouched() {
    let (doc, engine, el) = setup(false);

    assert_eq!(engine.collapse(el, MS_500).unwrap_err(), DomError::NoRuntime);
    assert_eq!(engine.expand(el, MS_500).unwrap_err(), DomError::NoRuntime);
    assert_eq!(engine.hide(el, MS_500).unwrap_err(), DomError::NoRuntime);

    assert!(doc.inline_style(el).unwrap().is_empty());
    assert_eq!(doc.parent(el).unwrap(), Some(doc.body()));
    assert_eq!(engine.pending_count(), 0);
}

// =============================================================================
// Wrapped slides
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_hide_animates_wrapper_and_keeps_own_box() {
    let (doc, engine, el) = setup(false);

    let done = engine.hide(el, MS_500).unwrap();
    let wrapper = engine.pending_wrapper(el).unwrap();
    assert_eq!(doc.parent(el).unwrap(), Some(wrapper));
    assert_eq!(doc.parent(wrapper).unwrap(), Some(doc.body()));

    sleep(Duration::from_millis(250)).await;
    assert_eq!(doc.offset_height(wrapper).unwrap(), 60.0);
    assert!(doc.inline_style(el).unwrap().is_empty());

    assert_eq!(done.await, TransitionOutcome::Completed);
    assert!(!doc.contains(wrapper));
    assert_eq!(doc.parent(el).unwrap(), Some(doc.body()));
    assert_eq!(doc.children(doc.body()).unwrap(), vec![el]);
    assert_eq!(doc.computed_display(el).unwrap(), Display::None);
    assert!(doc.inline_style(el).unwrap().padding.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_show_reveals_through_wrapper() {
    let (doc, engine, el) = setup(true);

    let done = engine.show(el, MS_500).unwrap();
    let wrapper = engine.pending_wrapper(el).unwrap();
    assert_eq!(doc.computed_display(el).unwrap(), Display::Block);

    sleep(Duration::from_millis(250)).await;
    assert_eq!(doc.offset_height(wrapper).unwrap(), 60.0);
    let style = doc.inline_style(el).unwrap();
    assert!(style.height.is_none());
    assert!(style.padding.is_none());

    assert_eq!(done.await, TransitionOutcome::Completed);
    assert!(!doc.contains(wrapper));
    assert_eq!(doc.parent(el).unwrap(), Some(doc.body()));
    assert_eq!(doc.offset_height(el).unwrap(), 120.0);
}

#[tokio::test(start_paused = true)]
async fn test_show_during_hide_reuses_wrapper() {
    let (doc, engine, el) = setup(false);

    let hiding = engine.hide(el, MS_500).unwrap();
    let wrapper = engine.pending_wrapper(el).unwrap();
    sleep(Duration::from_millis(250)).await;

    let showing = engine.show(el, MS_500).unwrap();
    assert_eq!(engine.pending_wrapper(el), Some(wrapper));
    assert_eq!(engine.pending_count(), 1);
    assert_eq!(hiding.await, TransitionOutcome::Superseded);

    assert_eq!(showing.await, TransitionOutcome::Completed);
    assert_eq!(doc.children(doc.body()).unwrap(), vec![el]);
    assert_eq!(doc.computed_display(el).unwrap(), Display::Block);
    assert_eq!(doc.offset_height(el).unwrap(), 120.0);
}

#[tokio::test(start_paused = true)]
async fn test_collapse_during_hide_drops_wrapper() {
    let (doc, engine, el) = setup(false);

    let hiding = engine.hide(el, MS_500).unwrap();
    let wrapper = engine.pending_wrapper(el).unwrap();

    let collapsing = engine.collapse(el, MS_500).unwrap();
    assert!(!doc.contains(wrapper));
    assert_eq!(doc.parent(el).unwrap(), Some(doc.body()));
    assert_eq!(engine.pending_wrapper(el), None);

    assert_eq!(hiding.await, TransitionOutcome::Superseded);
    assert_eq!(collapsing.await, TransitionOutcome::Completed);
    assert_eq!(doc.computed_display(el).unwrap(), Display::None);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_hide_unwraps_element() {
    let (doc, engine, el) = setup(false);

    let hiding = engine.hide(el, MS_500).unwrap();
    let wrapper = engine.pending_wrapper(el).unwrap();

    assert!(engine.cancel(el).unwrap());
    assert_eq!(hiding.await, TransitionOutcome::Superseded);
    assert!(!doc.contains(wrapper));
    assert_eq!(doc.parent(el).unwrap(), Some(doc.body()));
    assert_eq!(doc.computed_display(el).unwrap(), Display::Block);
}

#[tokio::test(start_paused = true)]
async fn test_unwrap_requires_matching_wrapper() {
    let (doc, _engine, el) = setup(false);
    let other = doc.mount(doc.body(), Element::div()).unwrap();

    let err = doc.unwrap_element(el, other).unwrap_err();
    assert_eq!(
        err,
        DomError::NotWrapped {
            element: el,
            wrapper: other
        }
    );
}
