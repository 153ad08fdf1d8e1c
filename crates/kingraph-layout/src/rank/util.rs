//! Index-based view of the layout graph used while ranking.

use crate::LayoutGraph;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, Copy)]
pub(super) struct RankEdge {
    pub(super) v: usize,
    pub(super) w: usize,
    pub(super) minlen: i32,
    pub(super) weight: f64,
}

/// Nodes by insertion index with a simple edge list: self-loops dropped, parallel edges folded
/// into one (summed weight, largest `minlen`).
#[derive(Debug)]
pub(super) struct RankGraph {
    pub(super) ids: Vec<String>,
    pub(super) index: HashMap<String, usize>,
    pub(super) edges: Vec<RankEdge>,
    pub(super) by_ends: HashMap<(usize, usize), usize>,
    pub(super) incident: Vec<Vec<usize>>,
    pub(super) rank: Vec<i32>,
}

impl RankGraph {
    pub(super) fn new(g: &LayoutGraph) -> Self {
        let ids = g.node_ids();
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(ix, id)| (id.clone(), ix))
            .collect();

        let mut edges: Vec<RankEdge> = Vec::new();
        let mut by_ends: HashMap<(usize, usize), usize> = HashMap::default();
        for e in g.edges() {
            if e.is_self_loop() {
                continue;
            }
            let (Some(&v), Some(&w)) = (index.get(e.v.as_str()), index.get(e.w.as_str())) else {
                continue;
            };
            let label = g.edge_by_key(e);
            let minlen = label.map(|l| l.minlen.max(1)).unwrap_or(1) as i32;
            let weight = label.map(|l| l.weight).unwrap_or(1.0);
            match by_ends.get(&(v, w)) {
                Some(&ix) => {
                    let edge = &mut edges[ix];
                    edge.minlen = edge.minlen.max(minlen);
                    edge.weight += weight;
                }
                None => {
                    by_ends.insert((v, w), edges.len());
                    edges.push(RankEdge {
                        v,
                        w,
                        minlen,
                        weight,
                    });
                }
            }
        }

        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for (ix, e) in edges.iter().enumerate() {
            incident[e.v].push(ix);
            incident[e.w].push(ix);
        }

        let rank = vec![0; ids.len()];
        Self {
            ids,
            index,
            edges,
            by_ends,
            incident,
            rank,
        }
    }

    pub(super) fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Every node as high as its successors allow: sinks get 0, everything else
    /// `min(rank(w) - minlen)` over its out-edges. Edges closing a cycle are skipped.
    pub(super) fn longest_path(&mut self) {
        fn visit(
            rg: &RankGraph,
            v: usize,
            done: &mut [Option<i32>],
            on_stack: &mut [bool],
        ) -> i32 {
            if let Some(rank) = done[v] {
                return rank;
            }
            on_stack[v] = true;
            let mut rank: Option<i32> = None;
            for &ix in &rg.incident[v] {
                let e = rg.edges[ix];
                if e.v != v || on_stack[e.w] {
                    continue;
                }
                let candidate = visit(rg, e.w, done, on_stack) - e.minlen;
                rank = Some(rank.map_or(candidate, |r| r.min(candidate)));
            }
            on_stack[v] = false;
            let rank = rank.unwrap_or(0);
            done[v] = Some(rank);
            rank
        }

        let n = self.node_count();
        let mut done: Vec<Option<i32>> = vec![None; n];
        let mut on_stack = vec![false; n];
        for v in 0..n {
            visit(self, v, &mut done, &mut on_stack);
        }
        self.rank = done.into_iter().map(|r| r.unwrap_or(0)).collect();
    }

    pub(super) fn slack(&self, edge: usize) -> i32 {
        let e = self.edges[edge];
        self.rank[e.w] - self.rank[e.v] - e.minlen
    }

    /// The graph edge joining `a` and `b` in either direction, with `true` when it runs `a -> b`.
    pub(super) fn edge_between(&self, a: usize, b: usize) -> Option<(usize, bool)> {
        if let Some(&ix) = self.by_ends.get(&(a, b)) {
            return Some((ix, true));
        }
        self.by_ends.get(&(b, a)).map(|&ix| (ix, false))
    }
}
