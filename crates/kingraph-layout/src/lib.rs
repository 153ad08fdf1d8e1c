#![forbid(unsafe_code)]

//! Deterministic layered graph layout.
//!
//! The pipeline follows the classic Sugiyama steps:
//!
//! 1. [`acyclic`]: reverse a DFS feedback arc set so ranking sees a DAG
//! 2. [`rank`]: network simplex ranking (every edge points down, total edge length minimal)
//! 3. [`normalize`]: split edges spanning several ranks into dummy chains
//! 4. [`order`]: barycenter sweeps that keep the ordering with the fewest crossings
//! 5. [`position`]: y by rank, x by neighbour barycenters under a minimum separation
//!
//! No step consults a clock, a random source, or the iteration order of a hashed container, so
//! identical input graphs (node and edge insertion order included) produce identical output.

pub use kingraph_graphlib as graphlib;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod acyclic;
pub mod coordinate_system;
mod model;
pub mod normalize;
pub mod order;
pub mod position;
pub mod rank;

pub use model::{EdgeLabel, GraphLabel, NodeLabel, Point, RankDir};

pub type LayoutGraph = graphlib::Graph<NodeLabel, EdgeLabel, GraphLabel>;

/// Runs the full pipeline in place. Afterwards every node carries `rank`, `order`, `x` and `y`
/// (node centers) and every edge carries a polyline in `points`.
pub fn layout(g: &mut LayoutGraph) {
    coordinate_system::adjust(g);
    acyclic::run(g);
    rank::assign(g);
    normalize::run(g);
    order::order(g);
    position::position(g);
    normalize::undo(g);
    assign_edge_endpoints(g);
    acyclic::undo(g);
    coordinate_system::undo(g);
}

/// Prepends the tail border point and appends the head border point of every edge polyline.
fn assign_edge_endpoints(g: &mut LayoutGraph) {
    let mut centers: rustc_hash::FxHashMap<String, (Point, f64)> = Default::default();
    for v in g.node_ids() {
        if let Some(n) = g.node(&v) {
            if let (Some(x), Some(y)) = (n.x, n.y) {
                centers.insert(v, (Point { x, y }, n.height / 2.0));
            }
        }
    }

    g.for_each_edge_mut(|e, label| {
        let (Some(&(tail, tail_half)), Some(&(head, head_half))) =
            (centers.get(&e.v), centers.get(&e.w))
        else {
            return;
        };
        if e.is_self_loop() {
            label.points.clear();
            return;
        }
        // Ranks grow downwards here, so the tail leaves from its bottom border.
        let mut points = Vec::with_capacity(label.points.len() + 2);
        points.push(Point {
            x: tail.x,
            y: tail.y + tail_half,
        });
        points.append(&mut label.points);
        points.push(Point {
            x: head.x,
            y: head.y - head_half,
        });
        label.points = points;
    });
}
