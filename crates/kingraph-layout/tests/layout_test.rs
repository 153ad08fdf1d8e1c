use kingraph_layout::graphlib::{Graph, GraphOptions};
use kingraph_layout::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Point, RankDir, layout};
use std::collections::BTreeMap;

fn new_graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions { multigraph: true });
    g.set_graph(GraphLabel::default());
    g
}

fn coords(g: &LayoutGraph) -> BTreeMap<String, (f64, f64)> {
    g.nodes()
        .map(|id| {
            let n = g.node(id).unwrap();
            (id.to_string(), (n.x.unwrap(), n.y.unwrap()))
        })
        .collect()
}

#[test]
fn layout_can_layout_a_single_node() {
    let mut g = new_graph();
    g.set_node("a", NodeLabel::sized(50.0, 100.0));

    layout(&mut g);
    assert_eq!(coords(&g), [("a".to_string(), (25.0, 50.0))].into());
    assert_eq!(g.node("a").unwrap().rank, Some(0));
}

#[test]
fn layout_can_layout_two_nodes_on_the_same_rank() {
    let mut g = new_graph();
    g.graph_mut().nodesep = 200.0;
    g.set_node("a", NodeLabel::sized(50.0, 100.0));
    g.set_node("b", NodeLabel::sized(75.0, 200.0));

    layout(&mut g);
    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (25.0, 100.0)),
            ("b".to_string(), (50.0 + 200.0 + 75.0 / 2.0, 100.0)),
        ]
        .into()
    );
}

#[test]
fn layout_can_layout_two_nodes_connected_by_an_edge() {
    let mut g = new_graph();
    g.graph_mut().ranksep = 300.0;
    g.set_node("a", NodeLabel::sized(50.0, 100.0));
    g.set_node("b", NodeLabel::sized(75.0, 200.0));
    g.set_edge("a", "b");

    layout(&mut g);
    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (75.0 / 2.0, 50.0)),
            ("b".to_string(), (75.0 / 2.0, 100.0 + 300.0 + 100.0)),
        ]
        .into()
    );

    let points = &g.edge("a", "b", None).unwrap().points;
    assert_eq!(
        points,
        &vec![
            Point { x: 37.5, y: 100.0 },
            Point { x: 37.5, y: 400.0 }
        ]
    );
}

#[test]
fn layout_centers_two_children_under_their_parent() {
    let mut g = new_graph();
    g.graph_mut().nodesep = 20.0;
    for id in ["p", "c1", "c2"] {
        g.set_node(id, NodeLabel::sized(100.0, 40.0));
    }
    g.set_edge("p", "c1");
    g.set_edge("p", "c2");

    layout(&mut g);
    let c = coords(&g);
    let (px, _) = c["p"];
    let (c1x, c1y) = c["c1"];
    let (c2x, c2y) = c["c2"];
    assert_eq!(c1y, c2y);
    assert!(c1x < c2x);
    assert_eq!(c2x - c1x, 120.0);
    assert_eq!(px, (c1x + c2x) / 2.0);
}

#[test]
fn layout_respects_margins() {
    let mut g = new_graph();
    g.graph_mut().marginx = 30.0;
    g.graph_mut().marginy = 10.0;
    g.set_node("a", NodeLabel::sized(50.0, 100.0));

    layout(&mut g);
    assert_eq!(coords(&g)["a"], (55.0, 60.0));
}

#[test]
fn layout_puts_every_edge_head_on_a_lower_rank() {
    let mut g = new_graph();
    for id in ["gp", "p1", "p2", "c1", "c2", "c3", "x"] {
        g.set_node(id, NodeLabel::sized(60.0, 30.0));
    }
    g.set_edge("gp", "p1");
    g.set_edge("p1", "c1");
    g.set_edge("p2", "c1");
    g.set_edge("p1", "c2");
    g.set_edge("gp", "c3");

    layout(&mut g);
    for e in g.edge_keys() {
        let v = g.node(&e.v).unwrap();
        let w = g.node(&e.w).unwrap();
        assert!(w.rank.unwrap() > v.rank.unwrap(), "{e:?}");
        assert!(w.y.unwrap() > v.y.unwrap(), "{e:?}");
    }
    // `p2` only parents `c1`, so it sits directly above it.
    assert_eq!(g.node("p2").unwrap().rank, Some(1));
    assert_eq!(g.node("x").unwrap().rank, Some(0));
    assert_eq!(g.node("c3").unwrap().rank, Some(1));
}

#[test]
fn layout_routes_long_edges_through_bend_points_and_removes_dummies() {
    let mut g = new_graph();
    for id in ["a", "b", "c"] {
        g.set_node(id, NodeLabel::sized(10.0, 10.0));
    }
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("a", "c");

    layout(&mut g);
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 3);
    assert_eq!(g.node("c").unwrap().rank, Some(2));
    let points = &g.edge("a", "c", None).unwrap().points;
    assert_eq!(points.len(), 3);
    assert_eq!(points[1].y, g.node("b").unwrap().y.unwrap());
}

#[test]
fn layout_breaks_cycles_and_restores_edge_direction() {
    let mut g = new_graph();
    g.set_node("a", NodeLabel::sized(10.0, 10.0));
    g.set_node("b", NodeLabel::sized(10.0, 10.0));
    g.set_edge("a", "b");
    g.set_edge("b", "a");

    layout(&mut g);
    assert_eq!(g.edge_count(), 2);
    assert!(g.has_edge("a", "b", None));
    assert!(g.has_edge("b", "a", None));
    assert_eq!(g.node("a").unwrap().rank, Some(0));
    assert_eq!(g.node("b").unwrap().rank, Some(1));

    // The reversed edge still starts at its own tail.
    let back = &g.edge("b", "a", None).unwrap().points;
    assert_eq!(back.first().unwrap().y, 10.0 + 50.0);
    assert_eq!(back.last().unwrap().y, 10.0);
}

#[test]
fn layout_ignores_self_loops_for_ranking() {
    let mut g = new_graph();
    g.set_node("a", NodeLabel::sized(10.0, 10.0));
    g.set_edge("a", "a");

    layout(&mut g);
    assert_eq!(g.node("a").unwrap().rank, Some(0));
    assert!(g.edge("a", "a", None).unwrap().points.is_empty());
}

#[test]
fn layout_left_to_right_grows_along_x() {
    let mut g = new_graph();
    g.graph_mut().rankdir = RankDir::LR;
    g.set_node("a", NodeLabel::sized(100.0, 40.0));
    g.set_node("b", NodeLabel::sized(100.0, 40.0));
    g.set_edge("a", "b");

    layout(&mut g);
    let c = coords(&g);
    assert_eq!(c["a"], (50.0, 20.0));
    assert_eq!(c["b"], (200.0, 20.0));
    assert_eq!(g.node("a").unwrap().width, 100.0);
}

#[test]
fn layout_bottom_to_top_puts_roots_last() {
    let mut g = new_graph();
    g.graph_mut().rankdir = RankDir::BT;
    g.set_node("a", NodeLabel::sized(10.0, 10.0));
    g.set_node("b", NodeLabel::sized(10.0, 10.0));
    g.set_edge("a", "b");

    layout(&mut g);
    let c = coords(&g);
    assert_eq!(c["b"].1, 5.0);
    assert_eq!(c["a"].1, 65.0);
}

#[test]
fn layout_is_deterministic() {
    fn build() -> LayoutGraph {
        let mut g = new_graph();
        g.set_default_edge_label(EdgeLabel::default);
        for i in 0..40 {
            g.set_node(format!("n{i}"), NodeLabel::sized(180.0, 80.0));
        }
        for i in 1..40 {
            g.set_edge(format!("n{}", (i * 7) % i), format!("n{i}"));
            if i % 5 == 0 {
                g.set_edge(format!("n{}", i / 2), format!("n{i}"));
            }
        }
        g
    }

    let mut first = build();
    let mut second = build();
    layout(&mut first);
    layout(&mut second);
    assert_eq!(format!("{:?}", coords(&first)), format!("{:?}", coords(&second)));
}
