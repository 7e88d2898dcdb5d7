//! DocumentSubscriber — lifecycle, identity, and staleness guards.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use classhub_client::{
    error::ClientError,
    live::{DocumentSubscriber, LiveState},
    query::DocumentPath,
    types::{Document, Record},
};

use super::support::{permission_denied, MockStore};

fn make_log() -> Arc<Mutex<Vec<LiveState<Document>>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn subscriber(
    store: &Arc<MockStore>,
    log: &Arc<Mutex<Vec<LiveState<Document>>>>,
) -> DocumentSubscriber {
    let log = Arc::clone(log);
    DocumentSubscriber::new(Arc::clone(store) as _, move |s| log.lock().push(s.clone()))
}

fn user_value() -> serde_json::Value {
    json!({ "kind": "user", "name": "Ada", "email": "ada@classhub.test", "role": "teacher" })
}

#[test]
fn null_target_yields_idle_and_never_contacts_the_store() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(None);

    assert_eq!(store.doc_sub_count(), 0, "no network activity");
    // A fresh subscriber already holds the idle state; setting None on it is
    // identity-unchanged and delivers nothing.
    assert!(log.lock().is_empty());
    let state = sub.state();
    assert!(state.data.is_none());
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}

#[test]
fn target_yields_loading_then_snapshot() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u1"))));

    {
        let entries = log.lock();
        assert_eq!(entries.len(), 1, "loading delivered synchronously");
        assert!(entries[0].is_loading);
        assert!(entries[0].data.is_none());
    }

    (store.last_doc_sub().on_snapshot)(Some(user_value()));

    let entries = log.lock();
    assert_eq!(entries.len(), 2);
    let state = &entries[1];
    assert!(!state.is_loading);
    let doc = state.data.as_ref().expect("decoded document");
    assert_eq!(doc.id, "u1");
    assert!(matches!(doc.record, Record::User(_)));
}

#[test]
fn absent_document_resolves_to_none_data() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u404"))));
    (store.last_doc_sub().on_snapshot)(None);

    let state = sub.state();
    assert!(state.data.is_none());
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}

#[test]
fn pointer_equal_target_never_resubscribes() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    let target = Arc::new(DocumentPath::new("users/u1"));
    sub.set_target(Some(Arc::clone(&target)));
    sub.set_target(Some(Arc::clone(&target)));
    sub.set_target(Some(target));

    assert_eq!(store.doc_sub_count(), 1);
    assert_eq!(store.events(), vec!["open:users/u1".to_string()]);
}

#[test]
fn changed_target_tears_down_before_reopening_exactly_once() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u1"))));
    sub.set_target(Some(Arc::new(DocumentPath::new("users/u2"))));

    assert_eq!(
        store.events(),
        vec![
            "open:users/u1".to_string(),
            "close:users/u1".to_string(),
            "open:users/u2".to_string(),
        ],
        "old subscription closes before the new one opens"
    );
}

#[test]
fn snapshot_for_a_replaced_target_is_dropped() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u1"))));
    let stale = store.last_doc_sub();

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u2"))));

    // The old subscription's snapshot arrives after the switch.
    (stale.on_snapshot)(Some(user_value()));

    let state = sub.state();
    assert!(state.is_loading, "still waiting on users/u2");
    assert!(state.data.is_none(), "stale snapshot must not land");
}

#[test]
fn late_snapshot_after_stop_is_dropped() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u1"))));
    let captured = store.last_doc_sub();

    sub.stop();
    let deliveries_at_stop = log.lock().len();

    (captured.on_snapshot)(Some(user_value()));
    (captured.on_error)(permission_denied());

    assert_eq!(log.lock().len(), deliveries_at_stop, "no post-teardown effects");
    assert!(sub.state().data.is_none());
}

#[test]
fn subscription_error_preserves_previous_data() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u1"))));
    let captured = store.last_doc_sub();
    (captured.on_snapshot)(Some(user_value()));
    (captured.on_error)(permission_denied());

    let state = sub.state();
    assert!(state.data.is_some(), "previous snapshot survives the error");
    assert!(!state.is_loading);
    assert!(matches!(state.error, Some(ClientError::Store { .. })));
    assert_eq!(store.doc_sub_count(), 1, "no automatic retry");
}

#[test]
fn malformed_record_surfaces_as_invalid_data() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u1"))));
    (store.last_doc_sub().on_snapshot)(Some(json!({ "kind": "starship", "name": 7 })));

    let state = sub.state();
    assert!(state.data.is_none());
    assert!(matches!(state.error, Some(ClientError::InvalidData { .. })));
}

#[test]
fn clearing_the_target_closes_the_subscription_and_goes_idle() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u1"))));
    (store.last_doc_sub().on_snapshot)(Some(user_value()));

    sub.set_target(None);

    assert_eq!(
        store.events(),
        vec!["open:users/u1".to_string(), "close:users/u1".to_string()]
    );
    let state = sub.state();
    assert!(state.data.is_none());
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}

#[test]
fn drop_tears_down_the_open_subscription() {
    let store = MockStore::new();
    let log = make_log();
    let sub = subscriber(&store, &log);

    sub.set_target(Some(Arc::new(DocumentPath::new("users/u1"))));
    drop(sub);

    assert_eq!(
        store.events(),
        vec!["open:users/u1".to_string(), "close:users/u1".to_string()]
    );
}
