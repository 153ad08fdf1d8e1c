//! Rank assignment.
//!
//! Network simplex over each weakly connected component: the longest-path ranking seeds a tight
//! spanning tree, pivots then minimise the total weighted edge length, so a root whose only
//! children sit deep in the graph is pulled down next to them instead of staying at the top.
//! Each component is shifted so its highest node has rank 0; isolated nodes get rank 0.

mod feasible_tree;
mod network_simplex;
mod util;

use crate::LayoutGraph;
use crate::graphlib::alg;
use util::RankGraph;

pub fn assign(g: &mut LayoutGraph) {
    let mut rg = RankGraph::new(g);
    rg.longest_path();

    for component in alg::components(g) {
        let members: Vec<usize> = component
            .iter()
            .filter_map(|v| rg.index.get(v.as_str()).copied())
            .collect();
        network_simplex::network_simplex(&mut rg, &members);
        let top = members.iter().map(|&v| rg.rank[v]).min().unwrap_or(0);
        for &v in &members {
            rg.rank[v] -= top;
        }
    }

    for (v, rank) in rg.ids.iter().zip(&rg.rank) {
        if let Some(n) = g.node_mut(v) {
            n.rank = Some(*rank);
        }
    }
}

/// Ranks `0..=max_rank` with their member nodes in current `order` (insertion order for ties).
pub fn layers(g: &LayoutGraph) -> Vec<Vec<String>> {
    let max_rank = g
        .nodes()
        .filter_map(|v| g.node(v).and_then(|n| n.rank))
        .max()
        .unwrap_or(-1);
    let mut layers: Vec<Vec<(usize, usize, String)>> =
        vec![Vec::new(); (max_rank + 1).max(0) as usize];
    for (ix, v) in g.nodes().enumerate() {
        let Some(n) = g.node(v) else {
            continue;
        };
        let Some(rank) = n.rank else {
            continue;
        };
        if let Some(layer) = layers.get_mut(rank.max(0) as usize) {
            layer.push((n.order.unwrap_or(usize::MAX), ix, v.to_string()));
        }
    }
    layers
        .into_iter()
        .map(|mut layer| {
            layer.sort();
            layer.into_iter().map(|(_, _, v)| v).collect()
        })
        .collect()
}
