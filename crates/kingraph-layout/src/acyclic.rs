//! Break cycles by reversing a feedback arc set (FAS).
//!
//! The FAS comes from a depth-first walk started at every node in insertion order: an edge that
//! points back into the active DFS stack closes a cycle and is reversed.

use crate::LayoutGraph;
use crate::graphlib::EdgeKey;
use rustc_hash::FxHashSet as HashSet;

pub fn run(g: &mut LayoutGraph) {
    for e in dfs_fas(g) {
        let Some(mut label) = g.edge_by_key(&e).cloned() else {
            continue;
        };
        let _ = g.remove_edge_key(&e);
        label.reversed = true;
        label.forward_name = e.name.clone();

        if g.options().multigraph {
            let name = unique_rev_name(g, &e.w, &e.v);
            g.set_edge_named(e.w, e.v, Some(name), Some(label));
            continue;
        }

        // Without names an opposite edge `w -> v` would be overwritten; fold into it instead.
        if let Some(existing) = g.edge_mut_by_key(&e.reversed()) {
            existing.minlen = existing.minlen.max(label.minlen);
            existing.weight += label.weight;
            continue;
        }
        g.set_edge_named(e.w, e.v, None::<String>, Some(label));
    }
}

fn unique_rev_name(g: &LayoutGraph, v: &str, w: &str) -> String {
    (1usize..)
        .map(|i| format!("rev{i}"))
        .find(|candidate| !g.has_edge(v, w, Some(candidate.as_str())))
        .unwrap_or_default()
}

pub fn undo(g: &mut LayoutGraph) {
    for e in g.edge_keys() {
        let Some(label) = g.edge_by_key(&e).cloned() else {
            continue;
        };
        if !label.reversed {
            continue;
        }
        let _ = g.remove_edge_key(&e);

        let mut label = label;
        let forward_name = label.forward_name.take();
        label.reversed = false;
        label.points.reverse();
        g.set_edge_named(e.w, e.v, forward_name, Some(label));
    }
}

fn dfs_fas(g: &LayoutGraph) -> Vec<EdgeKey> {
    fn dfs(
        g: &LayoutGraph,
        v: &str,
        visited: &mut HashSet<String>,
        stack: &mut HashSet<String>,
        fas: &mut Vec<EdgeKey>,
    ) {
        if !visited.insert(v.to_string()) {
            return;
        }
        stack.insert(v.to_string());
        for e in g.out_edges(v) {
            if e.is_self_loop() {
                continue;
            }
            if stack.contains(&e.w) {
                fas.push(e);
            } else {
                dfs(g, &e.w, visited, stack, fas);
            }
        }
        stack.remove(v);
    }

    let mut fas: Vec<EdgeKey> = Vec::new();
    let mut stack: HashSet<String> = HashSet::default();
    let mut visited: HashSet<String> = HashSet::default();
    for v in g.nodes() {
        dfs(g, v, &mut visited, &mut stack, &mut fas);
    }
    fas
}
