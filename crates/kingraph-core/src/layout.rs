//! Adapter between the family graph and the layered layout engine.

use crate::builder::FamilyGraph;
use crate::model::{EdgeKind, Position};
use crate::options::ViewOptions;
use indexmap::IndexMap;
use kingraph_layout::graphlib::{Graph, GraphOptions};
use kingraph_layout::{GraphLabel, LayoutGraph, NodeLabel};

/// Auto-layout result: one top-left position per node id, in node order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedLayout {
    pub positions: IndexMap<String, Position>,
}

impl ComputedLayout {
    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn apply_to(&self, graph: &mut FamilyGraph) {
        for node in &mut graph.nodes {
            if let Some(p) = self.get(&node.id) {
                node.position = p;
            }
        }
    }
}

/// Lays out `graph` with generations as ranks.
///
/// Only PARENT edges constrain the layout; spouses and siblings follow from the ordering of
/// their own parents. Positions are the cards' top-left corners.
pub fn compute_layout(graph: &FamilyGraph, options: &ViewOptions) -> ComputedLayout {
    let mut g: LayoutGraph = Graph::new(GraphOptions { multigraph: true });
    g.set_graph(GraphLabel::new(
        options.rankdir,
        options.nodesep,
        options.ranksep,
    ));
    for node in &graph.nodes {
        g.set_node(
            node.id.as_str(),
            NodeLabel::sized(options.node_width, options.node_height),
        );
    }
    for edge in graph.edges_of_kind(EdgeKind::Parent) {
        g.set_edge(edge.source.as_str(), edge.target.as_str());
    }

    kingraph_layout::layout(&mut g);

    let mut positions = IndexMap::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let Some(label) = g.node(&node.id) else {
            continue;
        };
        let (Some(x), Some(y)) = (label.x, label.y) else {
            continue;
        };
        positions.insert(
            node.id.clone(),
            Position::new(x - options.node_width / 2.0, y - options.node_height / 2.0),
        );
    }
    tracing::debug!(
        node_count = positions.len(),
        rankdir = ?options.rankdir,
        "auto layout computed"
    );
    ComputedLayout { positions }
}
