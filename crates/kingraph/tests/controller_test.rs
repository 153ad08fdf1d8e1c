use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use kingraph::{
    GraphViewController, Layout, LayoutOrigin, MemoryCache, MemoryRemote, Person, Phase, Position,
    PositionSource, PositionStore, RelationType, RemoteLayoutStore, Resolution, SaveError,
    Selection, StoreError, TreeLayoutRecord, ViewEvent, ViewOptions,
};
use std::cell::RefCell;
use std::rc::Rc;

fn family() -> Vec<Person> {
    vec![
        Person::new(1, "Ada").with_relation(RelationType::Spouse, 2),
        Person::new(2, "Ben"),
    ]
}

fn controller(remote: MemoryRemote, cache: MemoryCache) -> GraphViewController {
    GraphViewController::new(PositionStore::new(remote, cache), ViewOptions::default())
}

fn remote_with(family_id: i64, positions: &[(&str, f64, f64)]) -> MemoryRemote {
    let remote = MemoryRemote::new();
    let layout = Layout::from_positions(
        positions
            .iter()
            .map(|&(id, x, y)| (id, Position::new(x, y))),
    );
    remote.insert_record(TreeLayoutRecord::new(Some(1), family_id, &layout).unwrap());
    remote
}

#[test]
fn positions_are_withheld_until_the_load_resolves() {
    let ctrl = controller(remote_with(4, &[("1", 10.0, 20.0)]), MemoryCache::new());
    assert_eq!(ctrl.current_state().phase, Phase::Idle);

    let token = ctrl.rebuild(&family(), Some(4));
    let pending = ctrl.current_state();
    assert_eq!(pending.phase, Phase::AwaitingStoredPositions);
    assert_eq!(pending.token, Some(token));
    assert!(pending.graph.is_none());

    let resolution = block_on(ctrl.resolve_stored_positions(token));
    assert_eq!(
        resolution,
        Resolution::Applied(PositionSource::Stored(LayoutOrigin::Remote))
    );
    let ready = ctrl.current_state();
    assert_eq!(ready.phase, Phase::Ready);
    assert_eq!(ready.position("1"), Some(Position::new(10.0, 20.0)));
    assert_eq!(ready.position("2"), Some(Position::new(380.0, 0.0)));
    assert_eq!(ready.graph.unwrap().edges.len(), 1);
}

#[test]
fn failed_load_settles_on_the_computed_layout() {
    let remote = MemoryRemote::new();
    remote.fail_fetches(Some(StoreError::Unavailable("offline".into())));
    let ctrl = controller(remote, MemoryCache::new());

    let token = ctrl.rebuild(&family(), Some(4));
    assert_eq!(
        block_on(ctrl.resolve_stored_positions(token)),
        Resolution::Applied(PositionSource::Computed)
    );
    assert_eq!(
        ctrl.current_state().position("1"),
        Some(Position::new(0.0, 0.0))
    );
}

#[test]
fn superseded_tokens_are_discarded() {
    let ctrl = controller(MemoryRemote::new(), MemoryCache::new());
    let old = ctrl.rebuild(&family(), None);
    let new = ctrl.rebuild(&family(), None);

    assert_eq!(block_on(ctrl.resolve_stored_positions(old)), Resolution::Stale);
    assert!(!ctrl.bypass_stored_positions(old));
    assert_eq!(ctrl.current_state().phase, Phase::AwaitingStoredPositions);
    assert!(ctrl.bypass_stored_positions(new));
    assert_eq!(ctrl.current_state().phase, Phase::Ready);
    assert_eq!(block_on(ctrl.resolve_stored_positions(new)), Resolution::Stale);
}

/// Remote whose fetches stay pending until the gate opens.
struct GatedRemote {
    inner: MemoryRemote,
    gate: Shared<oneshot::Receiver<()>>,
}

impl RemoteLayoutStore for GatedRemote {
    fn fetch_layout(
        &self,
        family_id: i64,
    ) -> LocalBoxFuture<'_, Result<Option<TreeLayoutRecord>, StoreError>> {
        let gate = self.gate.clone();
        async move {
            let _ = gate.await;
            self.inner.fetch_layout(family_id).await
        }
        .boxed_local()
    }

    fn save_layout(
        &self,
        family_id: i64,
        layout: Layout,
    ) -> LocalBoxFuture<'_, Result<TreeLayoutRecord, StoreError>> {
        self.inner.save_layout(family_id, layout)
    }
}

#[test]
fn a_load_finishing_after_a_newer_rebuild_is_discarded() {
    let (open, gate) = oneshot::channel::<()>();
    let remote = GatedRemote {
        inner: remote_with(4, &[("1", 10.0, 20.0)]),
        gate: gate.shared(),
    };
    let ctrl = GraphViewController::new(
        PositionStore::new(remote, MemoryCache::new()),
        ViewOptions::default(),
    );
    let open = RefCell::new(Some(open));

    let first = ctrl.rebuild(&family(), Some(4));
    let (old, new) = block_on(futures::future::join(
        ctrl.resolve_stored_positions(first),
        async {
            let mut persons = family();
            persons.push(Person::new(3, "Cy"));
            let second = ctrl.rebuild(&persons, Some(4));
            if let Some(open) = open.borrow_mut().take() {
                let _ = open.send(());
            }
            ctrl.resolve_stored_positions(second).await
        },
    ));

    assert_eq!(old, Resolution::Stale);
    assert_eq!(
        new,
        Resolution::Applied(PositionSource::Stored(LayoutOrigin::Remote))
    );
    let state = ctrl.current_state();
    assert_eq!(state.graph.as_ref().unwrap().nodes.len(), 3);
    assert_eq!(state.position("1"), Some(Position::new(10.0, 20.0)));
}

#[test]
fn moves_only_touch_the_dragged_node() {
    let ctrl = controller(MemoryRemote::new(), MemoryCache::new());
    assert!(!ctrl.move_node("1", Position::new(5.0, 5.0)));

    let token = ctrl.rebuild(&family(), None);
    assert!(!ctrl.move_node("1", Position::new(5.0, 5.0)));
    ctrl.bypass_stored_positions(token);

    assert!(ctrl.move_node("1", Position::new(5.0, 5.0)));
    assert!(!ctrl.move_node("42", Position::new(5.0, 5.0)));
    let state = ctrl.current_state();
    assert_eq!(state.position("1"), Some(Position::new(5.0, 5.0)));
    assert_eq!(state.position("2"), Some(Position::new(380.0, 0.0)));
    assert_eq!(state.phase, Phase::Ready);
}

#[test]
fn saved_layout_is_restored_on_the_next_rebuild() {
    let remote = MemoryRemote::new();
    let cache = MemoryCache::new();
    let ctrl = controller(remote.clone(), cache.clone());

    let token = ctrl.rebuild(&family(), Some(4));
    block_on(ctrl.resolve_stored_positions(token));
    ctrl.move_node("2", Position::new(-50.0, 75.0));
    let saved = block_on(ctrl.save_current_layout()).unwrap();
    assert_eq!(saved.get("2"), Some(Position::new(-50.0, 75.0)));
    assert_eq!(remote.save_count(), 1);
    assert!(cache.get("family-tree-layout-4").is_some());

    let token = ctrl.rebuild(&family(), Some(4));
    block_on(ctrl.resolve_stored_positions(token));
    assert_eq!(
        ctrl.current_state().position("2"),
        Some(Position::new(-50.0, 75.0))
    );
}

#[test]
fn concurrent_save_requests_share_one_store_call() {
    let remote = MemoryRemote::new();
    let ctrl = controller(remote.clone(), MemoryCache::new());
    let token = ctrl.rebuild(&family(), Some(4));
    ctrl.bypass_stored_positions(token);

    let first = ctrl.save_current_layout();
    let second = ctrl.save_current_layout();
    assert!(ctrl.is_saving());
    let (a, b) = block_on(futures::future::join(first, second));
    assert_eq!(a, b);
    assert!(a.is_ok());
    assert_eq!(remote.save_count(), 1);
    assert!(!ctrl.is_saving());

    block_on(ctrl.save_current_layout()).unwrap();
    assert_eq!(remote.save_count(), 2);
}

#[test]
fn abandoned_save_does_not_capture_later_saves() {
    let remote = MemoryRemote::new();
    let ctrl = controller(remote.clone(), MemoryCache::new());
    let token = ctrl.rebuild(&family(), Some(4));
    ctrl.bypass_stored_positions(token);

    drop(ctrl.save_current_layout());
    assert!(!ctrl.is_saving());
    assert_eq!(remote.save_count(), 0);

    ctrl.move_node("1", Position::new(555.0, 777.0));
    let saved = block_on(ctrl.save_current_layout()).unwrap();
    assert_eq!(saved.get("1"), Some(Position::new(555.0, 777.0)));
    assert_eq!(remote.save_count(), 1);
    assert!(!ctrl.is_saving());
}

#[test]
fn failed_save_is_surfaced_and_keeps_the_arrangement() {
    let remote = MemoryRemote::new();
    remote.fail_saves(Some(StoreError::Unavailable("503".into())));
    let ctrl = controller(remote, MemoryCache::new());
    let token = ctrl.rebuild(&family(), Some(4));
    ctrl.bypass_stored_positions(token);
    ctrl.move_node("1", Position::new(1.0, 2.0));

    let err = block_on(ctrl.save_current_layout()).unwrap_err();
    assert_eq!(err, SaveError::Store(StoreError::Unavailable("503".into())));
    assert_eq!(
        ctrl.current_state().position("1"),
        Some(Position::new(1.0, 2.0))
    );
    assert!(!ctrl.is_saving());
}

#[test]
fn saves_before_ready_or_without_nodes_are_rejected() {
    let ctrl = controller(MemoryRemote::new(), MemoryCache::new());
    assert_eq!(
        block_on(ctrl.save_current_layout()),
        Err(SaveError::NotReady)
    );

    let token = ctrl.rebuild(&[], None);
    assert_eq!(
        block_on(ctrl.save_current_layout()),
        Err(SaveError::NotReady)
    );
    ctrl.bypass_stored_positions(token);
    assert_eq!(
        block_on(ctrl.save_current_layout()),
        Err(SaveError::NothingToSave)
    );
}

#[test]
fn save_without_family_uses_the_person_id_key() {
    let remote = MemoryRemote::new();
    let cache = MemoryCache::new();
    let ctrl = controller(remote.clone(), cache.clone());
    let token = ctrl.rebuild(&family(), None);
    ctrl.bypass_stored_positions(token);

    block_on(ctrl.save_current_layout()).unwrap();
    assert_eq!(remote.save_count(), 0);
    assert!(cache.get("family-tree-layout-1,2").is_some());
}

#[test]
fn listeners_observe_events_until_unsubscribed() {
    let ctrl = controller(MemoryRemote::new(), MemoryCache::new());
    let seen: Rc<RefCell<Vec<ViewEvent>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let id = ctrl.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let token = ctrl.rebuild(&family(), None);
    ctrl.bypass_stored_positions(token);
    ctrl.move_node("2", Position::new(1.0, 1.0));
    ctrl.pick_person("2");
    block_on(ctrl.save_current_layout()).unwrap();
    assert!(ctrl.unsubscribe(id));
    ctrl.move_node("2", Position::new(2.0, 2.0));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 4);
    assert_eq!(
        seen[0],
        ViewEvent::Ready {
            token,
            source: PositionSource::Computed
        }
    );
    assert_eq!(
        seen[1],
        ViewEvent::NodeMoved {
            id: "2".into(),
            position: Position::new(1.0, 1.0)
        }
    );
    assert!(matches!(&seen[2], ViewEvent::SelectionChanged(s) if s.a.as_deref() == Some("2")));
    assert_eq!(
        seen[3],
        ViewEvent::Saved {
            layout_key: "family-tree-layout-1,2".into(),
            positions: 2
        }
    );
    assert!(!ctrl.unsubscribe(id));
}

#[test]
fn selection_updates_flags_without_relayout() {
    let ctrl = controller(MemoryRemote::new(), MemoryCache::new());
    let token = ctrl.rebuild(&family(), None);
    ctrl.bypass_stored_positions(token);
    ctrl.move_node("1", Position::new(9.0, 9.0));

    ctrl.set_selection(Selection {
        a: Some("1".into()),
        b: Some("2".into()),
        me: Some("2".into()),
    });
    let graph = ctrl.current_state().graph.unwrap();
    let (ada, ben) = (graph.node("1").unwrap(), graph.node("2").unwrap());
    assert!(ada.selected_a && !ada.selected_b && !ada.is_me);
    assert!(ben.selected_b && ben.is_me);
    assert_eq!(ada.position, Position::new(9.0, 9.0));

    // Selection carries over to the next rebuild.
    let token = ctrl.rebuild(&family(), None);
    ctrl.bypass_stored_positions(token);
    assert!(ctrl.current_state().graph.unwrap().node("1").unwrap().selected_a);
}

#[test]
fn reset_discards_drags_and_stored_overrides() {
    let ctrl = controller(remote_with(4, &[("1", 10.0, 20.0)]), MemoryCache::new());
    let token = ctrl.rebuild(&family(), Some(4));
    block_on(ctrl.resolve_stored_positions(token));
    ctrl.move_node("2", Position::new(3.0, 3.0));

    assert!(ctrl.reset_to_computed());
    let state = ctrl.current_state();
    assert_eq!(state.source, Some(PositionSource::Computed));
    assert_eq!(state.position("1"), Some(Position::new(0.0, 0.0)));
    assert_eq!(state.position("2"), Some(Position::new(380.0, 0.0)));
}
