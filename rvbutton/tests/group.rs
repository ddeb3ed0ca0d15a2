use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rvbutton::events::proceed;
use rvbutton::{Config, Gate, RvButton, RvGroup};
use rvdom::{Display, Document, Element, Host};
use tokio::time::sleep;

const SETTLE: Duration = Duration::from_millis(700);

struct Member {
    button: RvButton,
    closes: Arc<AtomicUsize>,
}

impl Member {
    fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

fn setup(names: &[&str]) -> (Arc<Document>, Vec<Member>) {
    let doc = Arc::new(Document::new(1024));
    let members = names
        .iter()
        .map(|name| {
            let trigger = doc
                .mount(doc.body(), Element::button().id(format!("{name}-trigger")))
                .unwrap();
            let panel = doc
                .mount(
                    doc.body(),
                    Element::div().id(format!("{name}-panel")).content_height(50.0),
                )
                .unwrap();
            let button = RvButton::new(doc.clone(), trigger, panel, Config::new()).unwrap();

            let closes = Arc::new(AtomicUsize::new(0));
            let counter = closes.clone();
            button.add_event_listener(Gate::BeforeClose, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                proceed()
            });
            Member { button, closes }
        })
        .collect();
    (doc, members)
}

fn group_of(members: &[Member]) -> RvGroup {
    RvGroup::new(members.iter().map(|m| m.button.clone()).collect())
}

// =============================================================================
// Exclusion
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_opening_one_closes_siblings() {
    let (_doc, members) = setup(&["a", "b", "c"]);
    let _group = group_of(&members);
    let (a, b, c) = (&members[0], &members[1], &members[2]);

    b.button.open().await.unwrap();
    sleep(SETTLE).await;

    assert_eq!(a.closes(), 1);
    assert_eq!(b.closes(), 0);
    assert_eq!(c.closes(), 1);
    assert!(b.button.is_open());

    a.button.open().await.unwrap();
    sleep(SETTLE).await;

    assert_eq!(a.closes(), 1);
    assert_eq!(b.closes(), 1);
    assert_eq!(c.closes(), 2);
    assert!(a.button.is_open());
    assert!(!b.button.is_open());
    assert!(!c.button.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_closed_sibling_content_is_hidden() {
    let (doc, members) = setup(&["a", "b"]);
    let _group = group_of(&members);

    members[0].button.open().await.unwrap();
    members[1].button.open().await.unwrap();
    sleep(SETTLE).await;

    let a_panel = members[0].button.contents()[0];
    let b_panel = members[1].button.contents()[0];
    assert_eq!(doc.computed_display(a_panel).unwrap(), Display::None);
    assert_eq!(doc.offset_height(b_panel).unwrap(), 50.0);
}

#[tokio::test(start_paused = true)]
async fn test_group_is_open_when_any_member_is() {
    let (_doc, members) = setup(&["a", "b"]);
    let group = group_of(&members);
    assert!(!group.is_open());

    members[1].button.open().await.unwrap();
    assert!(group.is_open());
    assert_eq!(group.buttons().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_group_stops_coordination() {
    let (_doc, members) = setup(&["a", "b"]);
    let group = group_of(&members);

    members[0].button.open().await.unwrap();
    drop(group);
    members[1].button.open().await.unwrap();
    sleep(SETTLE).await;

    assert!(members[0].button.is_open());
    assert!(members[1].button.is_open());
    assert_eq!(members[0].closes(), 0);
}

// =============================================================================
// Bulk operations
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_close_all_respects_exceptions() {
    let (_doc, members) = setup(&["a", "b", "c"]);
    let group = group_of(&members);

    group
        .close_all(&[members[2].button.clone()])
        .await
        .unwrap();

    assert_eq!(members[0].closes(), 1);
    assert_eq!(members[1].closes(), 1);
    assert_eq!(members[2].closes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_open_all_on_single_member() {
    let (_doc, members) = setup(&["a"]);
    let group = group_of(&members);

    group.open_all().await.unwrap();

    assert!(members[0].button.is_open());
    assert_eq!(members[0].closes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_open_all_members_close_each_other() {
    let (_doc, members) = setup(&["a", "b"]);
    let group = group_of(&members);

    group.open_all().await.unwrap();
    sleep(SETTLE).await;

    assert_eq!(members[0].closes(), 1);
    assert_eq!(members[1].closes(), 1);
    assert!(!group.is_open());
}
