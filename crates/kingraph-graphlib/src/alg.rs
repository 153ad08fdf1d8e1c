//! Graph algorithms shared by the layout passes.

use crate::Graph;
use rustc_hash::FxHashMap as HashMap;

/// Weakly connected components, each listed in insertion order; components are ordered by their
/// first node.
pub fn components<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let ids: Vec<&str> = g.nodes().collect();
    let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, v)| (*v, i)).collect();
    let mut component_of: Vec<Option<usize>> = vec![None; ids.len()];
    let mut out: Vec<Vec<usize>> = Vec::new();

    for start in 0..ids.len() {
        if component_of[start].is_some() {
            continue;
        }
        let cid = out.len();
        let mut members = Vec::new();
        let mut stack = vec![start];
        component_of[start] = Some(cid);
        while let Some(ix) = stack.pop() {
            members.push(ix);
            let v = ids[ix];
            for w in g.successors(v).into_iter().chain(g.predecessors(v)) {
                let Some(&wx) = index.get(w) else {
                    continue;
                };
                if component_of[wx].is_none() {
                    component_of[wx] = Some(cid);
                    stack.push(wx);
                }
            }
        }
        members.sort_unstable();
        out.push(members);
    }

    out.into_iter()
        .map(|members| members.into_iter().map(|ix| ids[ix].to_string()).collect())
        .collect()
}
