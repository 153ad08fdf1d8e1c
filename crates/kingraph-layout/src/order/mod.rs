//! Node ordering / crossing minimization.
//!
//! Starts from a DFS-based initial order, then alternates downward sweeps (barycenter of
//! predecessors) and upward sweeps (barycenter of successors), flipping the tie-break bias every
//! two sweeps. The layering with the lowest crossing count seen so far is kept; the loop stops
//! after four sweeps without improvement.

mod cross_count;

pub use cross_count::cross_count;

use crate::LayoutGraph;
use crate::rank::layers;
use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    InEdges,
    OutEdges,
}

const MAX_SWEEPS: usize = 32;

pub fn order(g: &mut LayoutGraph) {
    let layering = init_order(g);
    if layering.is_empty() {
        return;
    }
    assign_order(g, &layering);

    let mut best_cc = cross_count(g, &layering);
    let mut best_layering = layering;

    let max_rank = best_layering.len() - 1;
    let mut last_best: usize = 0;
    let mut i: usize = 0;
    while last_best < 4 && i < MAX_SWEEPS && best_cc > 0.0 {
        let bias_right = i % 4 >= 2;
        if i % 2 == 1 {
            for rank in 1..=max_rank {
                sweep_rank(g, rank, Relationship::InEdges, bias_right);
            }
        } else {
            for rank in (0..max_rank).rev() {
                sweep_rank(g, rank, Relationship::OutEdges, bias_right);
            }
        }

        let layering = layers(g);
        let cc = cross_count(g, &layering);
        if cc < best_cc {
            last_best = 0;
            best_cc = cc;
            best_layering = layering;
        }

        i += 1;
        last_best += 1;
    }

    assign_order(g, &best_layering);
}

/// Initial layering: nodes are visited depth first, starting from the lowest ranks and breaking
/// ties by insertion order, so connected nodes start out close to each other.
pub fn init_order(g: &LayoutGraph) -> Vec<Vec<String>> {
    let Some(max_rank) = g
        .nodes()
        .filter_map(|v| g.node(v).and_then(|n| n.rank))
        .max()
    else {
        return Vec::new();
    };
    let mut layers: Vec<Vec<String>> = vec![Vec::new(); (max_rank + 1).max(0) as usize];

    let mut start: Vec<(i32, usize, String)> = g
        .nodes()
        .enumerate()
        .filter_map(|(ix, v)| Some((g.node(v)?.rank?, ix, v.to_string())))
        .collect();
    start.sort();

    fn dfs(g: &LayoutGraph, v: &str, visited: &mut HashSet<String>, layers: &mut [Vec<String>]) {
        if !visited.insert(v.to_string()) {
            return;
        }
        let Some(rank) = g.node(v).and_then(|n| n.rank) else {
            return;
        };
        if let Some(layer) = layers.get_mut(rank.max(0) as usize) {
            layer.push(v.to_string());
        }
        for w in g.successors(v) {
            dfs(g, w, visited, layers);
        }
    }

    let mut visited: HashSet<String> = HashSet::default();
    for (_, _, v) in start {
        dfs(g, &v, &mut visited, &mut layers);
    }
    layers
}

fn assign_order(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    for layer in layering {
        for (i, v) in layer.iter().enumerate() {
            if let Some(n) = g.node_mut(v) {
                n.order = Some(i);
            }
        }
    }
}

/// Weighted mean order of the neighbours on the fixed adjacent layer, or `None` for a node with
/// no such neighbour.
pub fn barycenter(g: &LayoutGraph, v: &str, relationship: Relationship) -> Option<f64> {
    let edges = match relationship {
        Relationship::InEdges => g.in_edges(v),
        Relationship::OutEdges => g.out_edges(v),
    };
    let mut sum: f64 = 0.0;
    let mut weight: f64 = 0.0;
    for e in edges {
        if e.is_self_loop() {
            continue;
        }
        let other = match relationship {
            Relationship::InEdges => &e.v,
            Relationship::OutEdges => &e.w,
        };
        let Some(order) = g.node(other).and_then(|n| n.order) else {
            continue;
        };
        let w = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(1.0);
        sum += w * order as f64;
        weight += w;
    }
    (weight > 0.0).then(|| sum / weight)
}

fn sweep_rank(g: &mut LayoutGraph, rank: usize, relationship: Relationship, bias_right: bool) {
    let Some(layer) = layers(g).into_iter().nth(rank) else {
        return;
    };
    let sorted = sort_layer(g, &layer, relationship, bias_right);
    for (i, v) in sorted.iter().enumerate() {
        if let Some(n) = g.node_mut(v) {
            n.order = Some(i);
        }
    }
}

/// Reorders one layer by barycenter. Nodes without a barycenter keep their slot; the others fill
/// the remaining slots in barycenter order. Ties keep the current order, or reverse it when
/// `bias_right` is set.
pub fn sort_layer(
    g: &LayoutGraph,
    layer: &[String],
    relationship: Relationship,
    bias_right: bool,
) -> Vec<String> {
    let mut fixed: HashMap<usize, &String> = HashMap::default();
    let mut sortable: Vec<(f64, usize, &String)> = Vec::new();
    for (i, v) in layer.iter().enumerate() {
        match barycenter(g, v, relationship) {
            Some(bc) => sortable.push((bc, i, v)),
            None => {
                fixed.insert(i, v);
            }
        }
    }

    sortable.sort_by(|a, b| {
        a.0.total_cmp(&b.0).then_with(|| {
            if bias_right {
                b.1.cmp(&a.1)
            } else {
                a.1.cmp(&b.1)
            }
        })
    });

    let mut rest = sortable.into_iter().map(|(_, _, v)| v);
    (0..layer.len())
        .filter_map(|i| match fixed.get(&i) {
            Some(v) => Some((*v).clone()),
            None => rest.next().cloned(),
        })
        .collect()
}
