//! Normalize long edges by inserting dummy nodes.
//!
//! After ranking, an edge from rank `r` to rank `r + k` (`k > 1`) is replaced by a chain of
//! `k - 1` zero-sized dummy nodes so ordering and positioning only ever see rank-adjacent edges.
//! `undo` turns the dummy positions into the original edge's bend points.

use crate::LayoutGraph;
use crate::graphlib::EdgeKey;
use crate::model::DummyEdge;
use crate::{EdgeLabel, NodeLabel, Point};

pub fn run(g: &mut LayoutGraph) {
    g.graph_mut().dummy_chains.clear();
    let mut next_id: usize = 0;
    for e in g.edge_keys() {
        normalize_edge(g, e, &mut next_id);
    }
}

fn fresh_dummy_id(g: &LayoutGraph, next_id: &mut usize) -> String {
    loop {
        *next_id += 1;
        let id = format!("_d{next_id}");
        if !g.has_node(&id) {
            return id;
        }
    }
}

fn normalize_edge(g: &mut LayoutGraph, e: EdgeKey, next_id: &mut usize) {
    if e.is_self_loop() {
        return;
    }
    let v_rank = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0);
    let w_rank = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0);
    if w_rank <= v_rank + 1 {
        return;
    }
    let Some(mut label) = g.edge_by_key(&e).cloned() else {
        return;
    };
    let _ = g.remove_edge_key(&e);
    label.points.clear();
    let weight = label.weight;

    let mut prev = e.v.clone();
    for r in (v_rank + 1)..w_rank {
        let id = fresh_dummy_id(g, next_id);
        g.set_node(
            id.as_str(),
            NodeLabel {
                rank: Some(r),
                dummy: Some(DummyEdge {
                    edge: e.clone(),
                    label: label.clone(),
                }),
                ..Default::default()
            },
        );
        if r == v_rank + 1 {
            g.graph_mut().dummy_chains.push(id.clone());
        }
        g.set_edge_with_label(
            prev,
            id.as_str(),
            EdgeLabel {
                weight,
                ..Default::default()
            },
        );
        prev = id;
    }
    g.set_edge_with_label(
        prev,
        e.w.as_str(),
        EdgeLabel {
            weight,
            ..Default::default()
        },
    );
}

pub fn undo(g: &mut LayoutGraph) {
    let chains = std::mem::take(&mut g.graph_mut().dummy_chains);
    for start in chains {
        let Some(DummyEdge { edge, mut label }) = g.node(&start).and_then(|n| n.dummy.clone())
        else {
            continue;
        };

        let mut v = start;
        loop {
            let Some(node) = g.node(&v) else {
                break;
            };
            if !node.is_dummy() {
                break;
            }
            if let (Some(x), Some(y)) = (node.x, node.y) {
                label.points.push(Point { x, y });
            }
            let next = g.successors(&v).first().map(|w| w.to_string());
            let _ = g.remove_node(&v);
            match next {
                Some(w) => v = w,
                None => break,
            }
        }

        g.set_edge_named(edge.v, edge.w, edge.name, Some(label));
    }
}
