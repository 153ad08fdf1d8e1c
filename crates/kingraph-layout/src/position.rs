//! Coordinate assignment.
//!
//! `y` is fixed per rank: every node is centered on its rank's midline, ranks are stacked with
//! `ranksep` between the tallest nodes of consecutive ranks.
//!
//! `x` starts from each rank packed and centered on the widest rank, then a few alternating
//! passes pull every node toward the weighted mean `x` of its neighbours on the previous
//! (downward pass) or next (upward pass) rank. Each pass solves the separation constraints twice,
//! once packing left to right and once right to left, and averages both placements; the average
//! of two feasible placements is feasible, and it does not drift to either side.

use crate::LayoutGraph;
use crate::order::Relationship;
use crate::rank::layers;
use rustc_hash::FxHashMap as HashMap;

const REFINE_PASSES: usize = 4;

struct Slot {
    id: String,
    width: f64,
    height: f64,
    sep: f64,
}

pub fn position(g: &mut LayoutGraph) {
    let graph = g.graph().clone();
    let layering: Vec<Vec<Slot>> = layers(g)
        .into_iter()
        .map(|layer| {
            layer
                .into_iter()
                .map(|id| {
                    let (width, height, dummy) = g
                        .node(&id)
                        .map(|n| (n.width, n.height, n.is_dummy()))
                        .unwrap_or((0.0, 0.0, false));
                    let sep = if dummy { graph.edgesep } else { graph.nodesep };
                    Slot {
                        id,
                        width,
                        height,
                        sep,
                    }
                })
                .collect()
        })
        .collect();

    // y
    let mut y_cursor = graph.marginy;
    for layer in &layering {
        let rank_height = layer.iter().map(|s| s.height).fold(0.0_f64, f64::max);
        for slot in layer {
            if let Some(n) = g.node_mut(&slot.id) {
                n.y = Some(y_cursor + rank_height / 2.0);
            }
        }
        y_cursor += rank_height + graph.ranksep;
    }

    // x
    let mut xs: HashMap<String, f64> = HashMap::default();
    let widths: Vec<f64> = layering.iter().map(|layer| layer_width(layer)).collect();
    let widest = widths.iter().copied().fold(0.0_f64, f64::max);
    for (layer, width) in layering.iter().zip(&widths) {
        let mut cursor = (widest - width) / 2.0;
        for (i, slot) in layer.iter().enumerate() {
            if i > 0 {
                cursor += separation(&layer[i - 1], slot);
            }
            xs.insert(slot.id.clone(), cursor);
        }
    }

    for pass in 0..REFINE_PASSES {
        if pass % 2 == 0 {
            for layer in layering.iter().skip(1) {
                refine_layer(g, layer, Relationship::InEdges, &mut xs);
            }
        } else {
            for layer in layering.iter().rev().skip(1) {
                refine_layer(g, layer, Relationship::OutEdges, &mut xs);
            }
        }
    }

    let min_left = layering
        .iter()
        .flatten()
        .filter_map(|s| xs.get(&s.id).map(|x| x - s.width / 2.0))
        .fold(f64::INFINITY, f64::min);
    let shift = if min_left.is_finite() {
        graph.marginx - min_left
    } else {
        0.0
    };
    for slot in layering.iter().flatten() {
        let x = xs.get(&slot.id).copied().unwrap_or(0.0) + shift;
        if let Some(n) = g.node_mut(&slot.id) {
            n.x = Some(x);
        }
    }
}

/// Minimum distance between the centers of two neighbouring slots.
fn separation(left: &Slot, right: &Slot) -> f64 {
    left.width / 2.0 + (left.sep + right.sep) / 2.0 + right.width / 2.0
}

fn layer_width(layer: &[Slot]) -> f64 {
    let inner: f64 = layer.windows(2).map(|w| separation(&w[0], &w[1])).sum();
    match (layer.first(), layer.last()) {
        (Some(first), Some(last)) => inner + first.width / 2.0 + last.width / 2.0,
        _ => 0.0,
    }
}

fn refine_layer(
    g: &LayoutGraph,
    layer: &[Slot],
    relationship: Relationship,
    xs: &mut HashMap<String, f64>,
) {
    if layer.is_empty() {
        return;
    }
    let desired: Vec<f64> = layer
        .iter()
        .map(|slot| {
            neighbour_mean(g, &slot.id, relationship, xs)
                .or_else(|| xs.get(&slot.id).copied())
                .unwrap_or(0.0)
        })
        .collect();

    let n = layer.len();
    let mut forward = desired.clone();
    for i in 1..n {
        forward[i] = forward[i].max(forward[i - 1] + separation(&layer[i - 1], &layer[i]));
    }
    let mut backward = desired;
    for i in (0..n - 1).rev() {
        backward[i] = backward[i].min(backward[i + 1] - separation(&layer[i], &layer[i + 1]));
    }

    for (i, slot) in layer.iter().enumerate() {
        xs.insert(slot.id.clone(), (forward[i] + backward[i]) / 2.0);
    }
}

fn neighbour_mean(
    g: &LayoutGraph,
    v: &str,
    relationship: Relationship,
    xs: &HashMap<String, f64>,
) -> Option<f64> {
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
        let Some(&x) = xs.get(other) else {
            continue;
        };
        let w = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(1.0);
        sum += w * x;
        weight += w;
    }
    (weight > 0.0).then(|| sum / weight)
}
