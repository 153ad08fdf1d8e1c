//! Network simplex ranking.
//!
//! Starting from a tight spanning tree, every tree edge carries a cut value: the weighted edge
//! length gained by lengthening it. While some tree edge has a negative cut value it leaves the
//! tree, the non-tree edge with the least slack across the same cut enters, and ranks are
//! recomputed along the new tree. The result minimises `sum(weight * (rank(w) - rank(v)))`.

use super::feasible_tree::feasible_tree;
use super::util::RankGraph;

/// Spanning tree over one component, rooted at the component's first node.
#[derive(Debug)]
struct SpanningTree {
    edges: Vec<(usize, usize)>,
    parent: Vec<Option<usize>>,
    low: Vec<i32>,
    lim: Vec<i32>,
    /// Cut value of the edge between a node and its parent.
    cut: Vec<f64>,
    preorder: Vec<usize>,
}

impl SpanningTree {
    fn new(node_count: usize, edges: Vec<(usize, usize)>) -> Self {
        Self {
            edges,
            parent: vec![None; node_count],
            low: vec![0; node_count],
            lim: vec![0; node_count],
            cut: vec![0.0; node_count],
            preorder: Vec::new(),
        }
    }

    /// Postorder numbering: `lim` is a node's own number and `low` the smallest number in its
    /// subtree, so `w` lies under `v` iff `low(v) <= lim(w) <= lim(v)`.
    fn init_low_lim(&mut self, root: usize) {
        let n = self.parent.len();
        let mut adjacent: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(a, b) in &self.edges {
            adjacent[a].push(b);
            adjacent[b].push(a);
        }
        self.parent.fill(None);
        self.low.fill(0);
        self.lim.fill(0);
        self.preorder.clear();

        let mut visited = vec![false; n];
        let mut next_lim: i32 = 1;
        // (node, next neighbour to look at, low)
        let mut stack: Vec<(usize, usize, i32)> = vec![(root, 0, next_lim)];
        visited[root] = true;
        self.preorder.push(root);
        while let Some(top) = stack.last_mut() {
            let (v, next, low) = *top;
            if let Some(&w) = adjacent[v].get(next) {
                top.1 += 1;
                if !visited[w] {
                    visited[w] = true;
                    self.parent[w] = Some(v);
                    self.preorder.push(w);
                    stack.push((w, 0, next_lim));
                }
                continue;
            }
            stack.pop();
            self.low[v] = low;
            self.lim[v] = next_lim;
            next_lim += 1;
        }
    }

    fn is_descendant(&self, v: usize, root: usize) -> bool {
        self.low[root] <= self.lim[v] && self.lim[v] <= self.lim[root]
    }

    fn compute_cut_values(&mut self, rg: &RankGraph) {
        self.cut.fill(0.0);
        // Children before parents.
        for ix in (0..self.preorder.len()).rev() {
            let child = self.preorder[ix];
            let Some(parent) = self.parent[child] else {
                continue;
            };
            self.cut[child] = self.cut_value(rg, child, parent);
        }
    }

    fn cut_value(&self, rg: &RankGraph, child: usize, parent: usize) -> f64 {
        let Some((tree_edge, child_is_tail)) = rg.edge_between(child, parent) else {
            return 0.0;
        };
        let mut cut = rg.edges[tree_edge].weight;
        for &ix in &rg.incident[child] {
            let e = rg.edges[ix];
            let is_out = e.v == child;
            let other = if is_out { e.w } else { e.v };
            if other == parent {
                continue;
            }
            let points_to_head = is_out == child_is_tail;
            cut += if points_to_head { e.weight } else { -e.weight };
            if self.parent[other] == Some(child) {
                let other_cut = self.cut[other];
                cut += if points_to_head { -other_cut } else { other_cut };
            }
        }
        cut
    }

    /// The first tree edge (by child, in preorder) with a negative cut value.
    fn leave_edge(&self) -> Option<usize> {
        self.preorder
            .iter()
            .copied()
            .find(|&v| self.parent[v].is_some() && self.cut[v] < 0.0)
    }

    fn exchange(&mut self, child: usize, parent: usize, entering: (usize, usize)) {
        self.edges
            .retain(|&(a, b)| !((a == child && b == parent) || (a == parent && b == child)));
        self.edges.push(entering);
    }
}

/// The non-tree edge with the least slack that reconnects the two halves left by removing the
/// tree edge above `child`.
fn enter_edge(rg: &RankGraph, tree: &SpanningTree, child: usize, parent: usize) -> Option<usize> {
    // `child` always has the smaller `lim`; flip when the graph edge points into its subtree.
    let flip = rg.edge_between(child, parent).is_some_and(|(_, child_is_tail)| !child_is_tail);
    let mut best: Option<(usize, i32)> = None;
    for (ix, e) in rg.edges.iter().enumerate() {
        if flip != tree.is_descendant(e.v, child) || flip == tree.is_descendant(e.w, child) {
            continue;
        }
        let slack = rg.slack(ix);
        if best.is_none_or(|(_, s)| slack < s) {
            best = Some((ix, slack));
        }
    }
    best.map(|(ix, _)| ix)
}

/// Re-derives ranks from the root so every tree edge is tight again.
fn update_ranks(rg: &mut RankGraph, tree: &SpanningTree) {
    for &v in tree.preorder.iter().skip(1) {
        let Some(parent) = tree.parent[v] else {
            continue;
        };
        let Some((ix, v_is_tail)) = rg.edge_between(v, parent) else {
            continue;
        };
        let minlen = rg.edges[ix].minlen;
        rg.rank[v] = if v_is_tail {
            rg.rank[parent] - minlen
        } else {
            rg.rank[parent] + minlen
        };
    }
}

/// Ranks one connected component. `rg.rank` must already be feasible (see
/// [`RankGraph::longest_path`]).
pub(super) fn network_simplex(rg: &mut RankGraph, members: &[usize]) {
    let Some(&root) = members.first() else {
        return;
    };
    if members.len() < 2 {
        return;
    }
    let edges = feasible_tree(rg, members);
    let mut tree = SpanningTree::new(rg.node_count(), edges);
    tree.init_low_lim(root);
    tree.compute_cut_values(rg);

    // Degenerate pivots can revisit a tree; the cap keeps that finite.
    let max_pivots = members.len() * rg.edges.len().max(1);
    let mut pivots = 0usize;
    while let Some(child) = tree.leave_edge() {
        if pivots >= max_pivots {
            break;
        }
        pivots += 1;
        let Some(parent) = tree.parent[child] else {
            break;
        };
        let Some(entering) = enter_edge(rg, &tree, child, parent) else {
            break;
        };
        let e = rg.edges[entering];
        tree.exchange(child, parent, (e.v, e.w));
        tree.init_low_lim(root);
        update_ranks(rg, &tree);
        tree.compute_cut_values(rg);
    }
}
