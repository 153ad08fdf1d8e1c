//! Graph construction: people plus relation indices in, deduplicated nodes and edges out.

use crate::index::RelationIndex;
use crate::model::{EdgeKind, GraphEdge, GraphNode, Person, Position, Selection};
use crate::relation::Relation;
use crate::style::EdgeStyle;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl FamilyGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn apply_selection(&mut self, selection: &Selection) {
        for node in &mut self.nodes {
            selection.apply(node);
        }
    }
}

/// Builds the node and edge lists.
///
/// Nodes follow input order (the first person wins when an id repeats). Edges are emitted per
/// person in input order: the PARENT edges into that person, then its SPOUSE edges, and finally
/// all SIBLING edges in a second pass. An edge is emitted only when both endpoints are nodes.
pub fn build_graph(persons: &[Person], index: &RelationIndex, selection: &Selection) -> FamilyGraph {
    let mut nodes = Vec::with_capacity(persons.len());
    let mut order: IndexSet<String> = IndexSet::with_capacity(persons.len());
    for person in persons {
        let Some(id) = person.id else {
            tracing::trace!(name = ?person.name, "skipping person without id");
            continue;
        };
        let id = id.to_string();
        if !order.insert(id.clone()) {
            tracing::debug!(id = %id, "duplicate person id; keeping the first record");
            continue;
        }
        let mut node = GraphNode {
            label: person
                .name
                .clone()
                .unwrap_or_else(|| format!("Person {id}")),
            gender: person.gender.unwrap_or_default(),
            position: Position::default(),
            selected_a: false,
            selected_b: false,
            is_me: false,
            id,
        };
        selection.apply(&mut node);
        nodes.push(node);
    }

    let mut edges = Vec::new();
    let mut emitted: IndexSet<String> = IndexSet::new();
    let mut push = |relation: Relation, edges: &mut Vec<GraphEdge>| {
        let (source, target) = relation.endpoints();
        if !order.contains(source) || !order.contains(target) {
            tracing::trace!(source, target, kind = %relation.kind(), "dropping edge to unknown person");
            return;
        }
        let id = relation.edge_id();
        if !emitted.insert(id.clone()) {
            return;
        }
        edges.push(GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind: relation.kind(),
            style: EdgeStyle::for_kind(relation.kind()),
            id,
        });
    };

    for pid in &order {
        for parent in index.parents(pid) {
            push(Relation::directed(parent, pid.as_str()), &mut edges);
        }
        for spouse in index.spouses(pid) {
            push(
                Relation::undirected(EdgeKind::Spouse, pid.as_str(), spouse),
                &mut edges,
            );
        }
    }
    for pid in &order {
        for sibling in index.siblings(pid) {
            push(
                Relation::undirected(EdgeKind::Sibling, pid.as_str(), sibling),
                &mut edges,
            );
        }
    }

    tracing::debug!(
        node_count = nodes.len(),
        edge_count = edges.len(),
        "family graph built"
    );
    FamilyGraph { nodes, edges }
}
