//! Tight spanning tree construction for the network simplex ranker.

use super::util::RankGraph;

/// Grows a spanning tree of tight edges (slack 0) over one connected component, shifting the
/// ranks of the partial tree whenever no tight edge leaves it. Returns the tree edges as node
/// pairs; `members[0]` is the starting node.
pub(super) fn feasible_tree(rg: &mut RankGraph, members: &[usize]) -> Vec<(usize, usize)> {
    let mut tree_edges: Vec<(usize, usize)> = Vec::new();
    let Some(&start) = members.first() else {
        return tree_edges;
    };
    let mut in_tree = vec![false; rg.node_count()];
    let mut tree_nodes: Vec<usize> = vec![start];
    in_tree[start] = true;

    loop {
        tight_tree(rg, &mut tree_nodes, &mut in_tree, &mut tree_edges);
        if tree_nodes.len() >= members.len() {
            break;
        }
        let Some((edge, slack)) = min_slack_edge(rg, &in_tree) else {
            break;
        };
        let delta = if in_tree[rg.edges[edge].v] {
            slack
        } else {
            -slack
        };
        for &v in &tree_nodes {
            rg.rank[v] += delta;
        }
    }
    tree_edges
}

fn tight_tree(
    rg: &RankGraph,
    tree_nodes: &mut Vec<usize>,
    in_tree: &mut [bool],
    tree_edges: &mut Vec<(usize, usize)>,
) {
    let mut stack: Vec<usize> = tree_nodes.clone();
    while let Some(v) = stack.pop() {
        for &ix in &rg.incident[v] {
            let e = rg.edges[ix];
            let other = if e.v == v { e.w } else { e.v };
            if in_tree[other] || rg.slack(ix) != 0 {
                continue;
            }
            in_tree[other] = true;
            tree_nodes.push(other);
            tree_edges.push((v, other));
            stack.push(other);
        }
    }
}

/// First edge (in edge order) with the smallest slack among those with exactly one endpoint in
/// the tree.
fn min_slack_edge(rg: &RankGraph, in_tree: &[bool]) -> Option<(usize, i32)> {
    let mut best: Option<(usize, i32)> = None;
    for (ix, e) in rg.edges.iter().enumerate() {
        if in_tree[e.v] == in_tree[e.w] {
            continue;
        }
        let slack = rg.slack(ix);
        if best.is_none_or(|(_, s)| slack < s) {
            best = Some((ix, slack));
        }
    }
    best
}
