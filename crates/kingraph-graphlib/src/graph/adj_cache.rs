//! CSR-style adjacency cache for [`Graph`](super::Graph).

#[derive(Debug, Clone)]
pub(in crate::graph) struct AdjCache {
    pub(in crate::graph) generation: u64,
    out_offsets: Vec<usize>,
    out_edges: Vec<usize>,
    in_offsets: Vec<usize>,
    in_edges: Vec<usize>,
}

impl AdjCache {
    pub(in crate::graph) fn empty(generation: u64, node_count: usize) -> Self {
        Self {
            generation,
            out_offsets: vec![0; node_count + 1],
            out_edges: Vec::new(),
            in_offsets: vec![0; node_count + 1],
            in_edges: Vec::new(),
        }
    }

    /// `endpoints` yields `(tail, head)` node indices in edge order; edge indices are implied by
    /// position. Buckets keep edge order so adjacency queries stay insertion ordered.
    pub(in crate::graph) fn build(
        generation: u64,
        node_count: usize,
        edge_count: usize,
        endpoints: impl Iterator<Item = (usize, usize)>,
    ) -> Self {
        let pairs: Vec<(usize, usize)> = endpoints.collect();
        debug_assert!(pairs.len() <= edge_count);

        let (out_offsets, out_edges) = bucket(node_count, pairs.iter().map(|&(v, _)| v));
        let (in_offsets, in_edges) = bucket(node_count, pairs.iter().map(|&(_, w)| w));
        Self {
            generation,
            out_offsets,
            out_edges,
            in_offsets,
            in_edges,
        }
    }

    pub(in crate::graph) fn out_edges(&self, v_ix: usize) -> &[usize] {
        &self.out_edges[self.out_offsets[v_ix]..self.out_offsets[v_ix + 1]]
    }

    pub(in crate::graph) fn in_edges(&self, v_ix: usize) -> &[usize] {
        &self.in_edges[self.in_offsets[v_ix]..self.in_offsets[v_ix + 1]]
    }
}

fn bucket(node_count: usize, owners: impl Iterator<Item = usize> + Clone) -> (Vec<usize>, Vec<usize>) {
    let mut offsets = vec![0usize; node_count + 1];
    for owner in owners.clone() {
        offsets[owner + 1] += 1;
    }
    for i in 0..node_count {
        offsets[i + 1] += offsets[i];
    }
    let mut cursor = offsets.clone();
    let mut slots = vec![0usize; offsets[node_count]];
    for (edge_ix, owner) in owners.enumerate() {
        slots[cursor[owner]] = edge_ix;
        cursor[owner] += 1;
    }
    (offsets, slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_keep_edge_order_per_node() {
        let cache = AdjCache::build(0, 3, 3, [(0, 1), (1, 2), (0, 2)].into_iter());
        assert_eq!(cache.out_edges(0), &[0, 2]);
        assert_eq!(cache.out_edges(1), &[1]);
        assert_eq!(cache.in_edges(2), &[1, 2]);
        assert!(cache.in_edges(0).is_empty());
    }
}
