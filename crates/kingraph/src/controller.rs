//! View controller: owns the node/edge/position set of one family view and sequences rebuilds,
//! stored-position loads, drags and saves.
//!
//! Lifecycle: `Idle -> Building -> AwaitingStoredPositions -> Ready`. Every rebuild hands out a
//! fresh [`RequestToken`]; a load that finishes after a newer rebuild started is discarded.
//! Everything here is single-threaded (`Rc`/`RefCell`) and runtime agnostic.

use crate::error::SaveError;
use crate::store::{Layout, LayoutOrigin, PositionStore, layout_key, merge_positions};
use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared, WeakShared};
use kingraph_core::{
    ComputedLayout, FamilyGraph, GlobalRelation, Person, Position, RelationIndex, Selection,
    ViewOptions, build_graph, compute_layout,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Building,
    AwaitingStoredPositions,
    Ready,
}

/// Where the positions of a ready view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    Computed,
    Stored(LayoutOrigin),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied(PositionSource),
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub phase: Phase,
    pub token: Option<RequestToken>,
    pub family_id: Option<i64>,
    pub layout_key: Option<String>,
    pub source: Option<PositionSource>,
    pub selection: Selection,
    /// Nodes with their final positions plus edges. `None` until the view is ready.
    pub graph: Option<FamilyGraph>,
}

impl ViewSnapshot {
    pub fn position(&self, id: &str) -> Option<Position> {
        self.graph.as_ref()?.node(id).map(|n| n.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Ready {
        token: RequestToken,
        source: PositionSource,
    },
    NodeMoved {
        id: String,
        position: Position,
    },
    SelectionChanged(Selection),
    PositionsReset,
    Saved {
        layout_key: String,
        positions: usize,
    },
    SaveFailed(SaveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of [`GraphViewController::save_current_layout`]. Cloning it (or asking for another
/// save while it is pending) waits on the same request.
pub type SaveFuture = Shared<LocalBoxFuture<'static, Result<Layout, SaveError>>>;

type Listener = Rc<dyn Fn(&ViewEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

struct ViewData {
    phase: Phase,
    token: u64,
    family_id: Option<i64>,
    layout_key: Option<String>,
    graph: FamilyGraph,
    computed: ComputedLayout,
    source: Option<PositionSource>,
    selection: Selection,
    global_relations: Option<Vec<GlobalRelation>>,
    /// Weak so a save nobody holds any more stops counting as pending.
    in_flight_save: Option<WeakShared<LocalBoxFuture<'static, Result<Layout, SaveError>>>>,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            token: 0,
            family_id: None,
            layout_key: None,
            graph: FamilyGraph::default(),
            computed: ComputedLayout::default(),
            source: None,
            selection: Selection::default(),
            global_relations: None,
            in_flight_save: None,
        }
    }
}

pub struct GraphViewController {
    store: Rc<PositionStore>,
    options: ViewOptions,
    data: Rc<RefCell<ViewData>>,
    listeners: Rc<RefCell<Listeners>>,
}

impl GraphViewController {
    pub fn new(store: PositionStore, options: ViewOptions) -> Self {
        Self {
            store: Rc::new(store),
            options,
            data: Rc::new(RefCell::new(ViewData::default())),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    /// Supplies a separately fetched relation list that later rebuilds merge into the embedded
    /// relation records. `None` goes back to embedded records only.
    pub fn set_global_relations(&self, relations: Option<Vec<GlobalRelation>>) {
        self.data.borrow_mut().global_relations = relations;
    }

    /// Rebuilds nodes, edges and the auto layout from scratch. Positions are withheld until
    /// [`Self::resolve_stored_positions`] or [`Self::bypass_stored_positions`] settles them.
    pub fn rebuild(&self, persons: &[Person], family_id: Option<i64>) -> RequestToken {
        let (selection, global) = {
            let mut data = self.data.borrow_mut();
            data.phase = Phase::Building;
            (data.selection.clone(), data.global_relations.clone())
        };

        let mut index = RelationIndex::build(persons);
        if let Some(global) = &global {
            index.merge_global(global);
        }
        let mut graph = build_graph(persons, &index, &selection);
        let computed = compute_layout(&graph, &self.options);
        computed.apply_to(&mut graph);
        let key = layout_key(family_id, persons.iter().filter_map(|p| p.id));

        let mut data = self.data.borrow_mut();
        data.token += 1;
        data.phase = Phase::AwaitingStoredPositions;
        data.family_id = family_id;
        data.layout_key = Some(key);
        data.graph = graph;
        data.computed = computed;
        data.source = None;
        tracing::debug!(
            token = data.token,
            person_count = persons.len(),
            node_count = data.graph.nodes.len(),
            edge_count = data.graph.edges.len(),
            family_id = ?family_id,
            "view rebuilt; awaiting stored positions"
        );
        RequestToken(data.token)
    }

    /// Loads stored positions for the rebuild identified by `token` and settles the view.
    ///
    /// Returns [`Resolution::Stale`] without touching the view when another rebuild started in
    /// the meantime or the view already settled.
    pub async fn resolve_stored_positions(&self, token: RequestToken) -> Resolution {
        let (family_id, key) = {
            let data = self.data.borrow();
            if !data.is_awaiting(token) {
                tracing::debug!(token = token.0, current = data.token, "stale load request");
                return Resolution::Stale;
            }
            (data.family_id, data.layout_key.clone().unwrap_or_default())
        };

        let stored = self.store.load_layout(family_id, &key).await;

        let source = {
            let mut data = self.data.borrow_mut();
            if !data.is_awaiting(token) {
                tracing::debug!(
                    token = token.0,
                    current = data.token,
                    "discarding superseded stored layout"
                );
                return Resolution::Stale;
            }
            let merged = merge_positions(&data.computed, stored.as_ref().map(|s| &s.layout));
            for node in &mut data.graph.nodes {
                if let Some(p) = merged.get(&node.id) {
                    node.position = *p;
                }
            }
            let source = match &stored {
                Some(s) => PositionSource::Stored(s.origin),
                None => PositionSource::Computed,
            };
            data.settle(source);
            source
        };

        self.notify(&ViewEvent::Ready { token, source });
        Resolution::Applied(source)
    }

    /// Settles the view identified by `token` on its computed layout without loading anything.
    pub fn bypass_stored_positions(&self, token: RequestToken) -> bool {
        {
            let mut data = self.data.borrow_mut();
            if !data.is_awaiting(token) {
                return false;
            }
            data.settle(PositionSource::Computed);
        }
        self.notify(&ViewEvent::Ready {
            token,
            source: PositionSource::Computed,
        });
        true
    }

    /// Moves one node of a ready view. Nothing is persisted until the next explicit save.
    pub fn move_node(&self, id: &str, position: Position) -> bool {
        {
            let mut data = self.data.borrow_mut();
            if data.phase != Phase::Ready {
                tracing::debug!(id, "ignoring move before the view is ready");
                return false;
            }
            let Some(node) = data.graph.node_mut(id) else {
                tracing::debug!(id, "ignoring move of unknown node");
                return false;
            };
            node.position = position;
        }
        self.notify(&ViewEvent::NodeMoved {
            id: id.to_string(),
            position,
        });
        true
    }

    /// Puts every node back on its computed position, dropping drags and stored overrides from
    /// the in-memory view. Stored layouts are left alone.
    pub fn reset_to_computed(&self) -> bool {
        {
            let mut data = self.data.borrow_mut();
            if data.phase != Phase::Ready {
                return false;
            }
            let ViewData {
                graph, computed, ..
            } = &mut *data;
            computed.apply_to(graph);
            data.source = Some(PositionSource::Computed);
        }
        self.notify(&ViewEvent::PositionsReset);
        true
    }

    pub fn set_selection(&self, selection: Selection) {
        {
            let mut data = self.data.borrow_mut();
            data.graph.apply_selection(&selection);
            data.selection = selection.clone();
        }
        self.notify(&ViewEvent::SelectionChanged(selection));
    }

    /// Feeds one click on a person into the two-slot picker.
    pub fn pick_person(&self, id: &str) -> Selection {
        let mut selection = self.data.borrow().selection.clone();
        selection.pick(id);
        self.set_selection(selection.clone());
        selection
    }

    /// Persists the positions as they are right now.
    ///
    /// While a save is pending, further calls return that same request instead of starting a
    /// new one. A failure leaves the on-screen arrangement untouched.
    pub fn save_current_layout(&self) -> SaveFuture {
        let mut data = self.data.borrow_mut();
        if let Some(pending) = data.pending_save() {
            tracing::debug!("save already in flight; joining it");
            return pending;
        }
        let key = match (&data.layout_key, data.phase) {
            (Some(key), Phase::Ready) => key.clone(),
            _ => return failed_save(SaveError::NotReady),
        };
        if data.graph.nodes.is_empty() {
            return failed_save(SaveError::NothingToSave);
        }

        let layout = Layout::from_positions(
            data.graph
                .nodes
                .iter()
                .map(|n| (n.id.as_str(), n.position)),
        );
        let family_id = data.family_id;
        let store = Rc::clone(&self.store);
        let view: Weak<RefCell<ViewData>> = Rc::downgrade(&self.data);
        let listeners = Rc::clone(&self.listeners);

        let save = async move {
            let saved = store.save_layout(family_id, &key, &layout).await;
            if let Some(view) = view.upgrade() {
                view.borrow_mut().in_flight_save = None;
            }
            match saved {
                Ok(()) => {
                    tracing::info!(layout_key = %key, positions = layout.len(), "layout saved");
                    notify(
                        &listeners,
                        &ViewEvent::Saved {
                            layout_key: key,
                            positions: layout.len(),
                        },
                    );
                    Ok(layout)
                }
                Err(err) => {
                    tracing::warn!(layout_key = %key, error = %err, "layout save failed");
                    let err = SaveError::from(err);
                    notify(&listeners, &ViewEvent::SaveFailed(err.clone()));
                    Err(err)
                }
            }
        }
        .boxed_local()
        .shared();

        data.in_flight_save = save.downgrade();
        save
    }

    pub fn is_saving(&self) -> bool {
        self.data.borrow_mut().pending_save().is_some()
    }

    pub fn current_state(&self) -> ViewSnapshot {
        let data = self.data.borrow();
        ViewSnapshot {
            phase: data.phase,
            token: (data.token > 0).then_some(RequestToken(data.token)),
            family_id: data.family_id,
            layout_key: data.layout_key.clone(),
            source: data.source,
            selection: data.selection.clone(),
            graph: (data.phase == Phase::Ready).then(|| data.graph.clone()),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&ViewEvent) + 'static) -> ListenerId {
        let mut listeners = self.listeners.borrow_mut();
        listeners.next_id += 1;
        let id = ListenerId(listeners.next_id);
        listeners.entries.push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    fn notify(&self, event: &ViewEvent) {
        notify(&self.listeners, event);
    }
}

impl ViewData {
    /// The outstanding save, if some caller still holds it. A dropped request is forgotten.
    fn pending_save(&mut self) -> Option<SaveFuture> {
        let pending = self.in_flight_save.as_ref().and_then(WeakShared::upgrade);
        if pending.is_none() {
            self.in_flight_save = None;
        }
        pending
    }

    fn is_awaiting(&self, token: RequestToken) -> bool {
        self.token == token.0 && self.phase == Phase::AwaitingStoredPositions
    }

    fn settle(&mut self, source: PositionSource) {
        self.phase = Phase::Ready;
        self.source = Some(source);
        tracing::debug!(token = self.token, source = ?source, "view ready");
    }
}

fn failed_save(err: SaveError) -> SaveFuture {
    tracing::debug!(error = %err, "save rejected");
    futures::future::ready(Err(err)).boxed_local().shared()
}

/// Calls every listener with `event`. Listeners may subscribe, unsubscribe or drive the
/// controller from inside the callback.
fn notify(listeners: &RefCell<Listeners>, event: &ViewEvent) {
    let entries: Vec<Listener> = listeners
        .borrow()
        .entries
        .iter()
        .map(|(_, l)| Rc::clone(l))
        .collect();
    for listener in entries {
        listener(event);
    }
}
