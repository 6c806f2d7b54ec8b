mod common;

use std::sync::Arc;

use common::{tflow, tflow_sized};
use flowdeck_engine::adapter::{StreamAdapter, StreamMessage, SyncState};
use flowdeck_engine::error::EngineError;
use flowdeck_engine::filter::Predicate;
use flowdeck_engine::model::{Flow, flow_columns};
use flowdeck_engine::sort::SortSpec;
use flowdeck_engine::store::StoreError;

fn live_adapter(ids: &[&str]) -> StreamAdapter<Flow> {
    let mut adapter = StreamAdapter::new(flow_columns());
    adapter.transport_connected();
    adapter
        .apply(StreamMessage::Reset(ids.iter().map(|id| tflow(id)).collect()))
        .unwrap();
    adapter
}

#[test]
fn test_lifecycle_reaches_live_via_reset() {
    let mut adapter: StreamAdapter<Flow> = StreamAdapter::new(flow_columns());
    assert_eq!(adapter.state(), SyncState::Disconnected);

    adapter.transport_connected();
    assert_eq!(adapter.state(), SyncState::Syncing);

    // Mutations before the snapshot are discarded.
    let before = adapter.version();
    adapter.apply(StreamMessage::Add(tflow("early"))).unwrap();
    assert_eq!(adapter.version(), before);
    assert!(adapter.store().is_empty());

    adapter
        .apply(StreamMessage::Reset(vec![tflow("1"), tflow("2")]))
        .unwrap();
    assert_eq!(adapter.state(), SyncState::Live);
    assert_eq!(adapter.view().ids(), &["1", "2"]);
}

#[test]
fn test_selection_follows_removal() {
    // Scenario: ids 1..4 in arrival order, no filter or sort.
    let mut adapter = live_adapter(&[]);
    for id in ["1", "2", "3", "4"] {
        adapter.apply(StreamMessage::Add(tflow(id))).unwrap();
    }
    assert_eq!(adapter.view().ids(), &["1", "2", "3", "4"]);

    adapter.select(Some("2"));
    assert_eq!(adapter.selection().selected(), vec!["2"]);
    adapter.apply(StreamMessage::Remove("2".into())).unwrap();
    assert_eq!(adapter.selection().selected(), vec!["3"]);

    adapter.select(Some("4"));
    adapter.apply(StreamMessage::Remove("4".into())).unwrap();
    assert_eq!(adapter.selection().selected(), vec!["3"]);
}

#[test]
fn test_select_relative_defaults() {
    let mut adapter = live_adapter(&["1", "2", "3", "4"]);

    adapter.select_relative(1);
    assert_eq!(adapter.selection().selected(), vec!["1"]);

    adapter.clear_selection();
    adapter.select_relative(-1);
    assert_eq!(adapter.selection().selected(), vec!["4"]);
}

#[test]
fn test_select_rejects_non_members() {
    let mut adapter = live_adapter(&["1"]);
    let before = adapter.version();
    adapter.select(Some("ghost"));
    assert_eq!(adapter.version(), before);
    assert!(adapter.selection().is_empty());
}

#[test]
fn test_duplicate_add_is_applied_as_update() {
    let mut adapter = live_adapter(&["1"]);

    let mut replayed = tflow("1");
    replayed.request.path = "/replayed".into();
    adapter.apply(StreamMessage::Add(replayed)).unwrap();

    assert_eq!(adapter.store().len(), 1);
    assert_eq!(adapter.store().get("1").unwrap().request.path, "/replayed");
}

#[test]
fn test_unknown_id_forces_resync() {
    let mut adapter = live_adapter(&["1"]);
    adapter.select(Some("1"));

    let err = adapter
        .apply(StreamMessage::Remove("ghost".into()))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Desync(StoreError::NotFound("ghost".into()))
    );
    assert_eq!(adapter.state(), SyncState::Syncing);
    assert!(adapter.store().is_empty());
    assert!(adapter.view().is_empty());
    assert!(adapter.selection().is_empty());

    // The next snapshot recovers.
    adapter
        .apply(StreamMessage::Reset(vec![tflow("1")]))
        .unwrap();
    assert_eq!(adapter.state(), SyncState::Live);
    assert_eq!(adapter.view().ids(), &["1"]);
}

#[test]
fn test_transport_drop_clears_everything() {
    let mut adapter = live_adapter(&["1", "2"]);
    adapter.select(Some("1"));

    adapter.transport_dropped();
    assert_eq!(adapter.state(), SyncState::Syncing);
    assert!(adapter.store().is_empty());
    assert!(adapter.view().is_empty());
    assert!(adapter.selection().is_empty());
}

#[test]
fn test_reset_is_idempotent() {
    let mut adapter = live_adapter(&[]);
    let snapshot = vec![tflow("a"), tflow("b")];

    adapter.apply(StreamMessage::Reset(snapshot.clone())).unwrap();
    let first_ids: Vec<_> = adapter.view().ids().to_vec();

    adapter.apply(StreamMessage::Reset(snapshot)).unwrap();
    assert_eq!(adapter.view().ids(), first_ids.as_slice());
    assert_eq!(adapter.store().len(), 2);
}

#[test]
fn test_filter_prunes_selection_and_membership() {
    let mut adapter = live_adapter(&[]);
    let mut second = tflow("2");
    second.request.path = "/second".into();
    adapter.apply(StreamMessage::Add(tflow("1"))).unwrap();
    adapter.apply(StreamMessage::Add(second)).unwrap();
    adapter.select(Some("1"));

    let second_only: Predicate<Flow> = Arc::new(|flow| flow.request.path == "/second");
    adapter.set_filter(Some(second_only));

    assert_eq!(adapter.view().ids(), &["2"]);
    assert!(adapter.selection().is_empty());

    adapter.set_filter(None);
    assert_eq!(adapter.view().ids(), &["1", "2"]);
}

#[test]
fn test_sort_by_size_descending() {
    // Combined request+response sizes 1 and 2: the larger flow leads.
    let mut adapter = live_adapter(&[]);
    adapter
        .apply(StreamMessage::Add(tflow_sized("small", 1, None)))
        .unwrap();
    adapter
        .apply(StreamMessage::Add(tflow_sized("big", 1, Some(1))))
        .unwrap();

    adapter.set_sort(SortSpec::by("size", true));
    assert_eq!(adapter.view().ids(), &["big", "small"]);

    // Equal totals keep arrival order.
    adapter
        .apply(StreamMessage::Add(tflow_sized("tie", 2, None)))
        .unwrap();
    assert_eq!(adapter.view().ids(), &["big", "tie", "small"]);
}

#[test]
fn test_view_invariants_hold_under_churn() {
    let mut adapter = live_adapter(&[]);
    adapter.set_sort(SortSpec::by("size", false));
    let small_enough: Predicate<Flow> = Arc::new(|flow| flow.total_size() < 50);
    adapter.set_filter(Some(small_enough));

    for (id, size) in [("a", 10), ("b", 60), ("c", 30), ("d", 20)] {
        adapter
            .apply(StreamMessage::Add(tflow_sized(id, size, None)))
            .unwrap();
    }
    adapter
        .apply(StreamMessage::Update(tflow_sized("b", 5, None)))
        .unwrap();
    adapter.apply(StreamMessage::Remove("c".into())).unwrap();

    let view = adapter.view();
    assert_eq!(view.ids(), &["b", "a", "d"]);
    for (pos, id) in view.ids().iter().enumerate() {
        assert_eq!(view.index_of(id), Some(pos));
        assert!(adapter.store().get(id).unwrap().total_size() < 50);
    }
}
