use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use kingraph_layout::graphlib::{Graph, GraphOptions};
use kingraph_layout::{GraphLabel, LayoutGraph, NodeLabel, RankDir, layout};
use std::hint::black_box;

/// A family-shaped forest: `generations` levels, every couple in a level has `children` kids,
/// and the kids pair up with partners from outside the tree.
fn family_forest(generations: usize, children: usize) -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions { multigraph: true });
    g.set_graph(GraphLabel::new(RankDir::TB, 200.0, 180.0));

    let mut next_id: usize = 0;
    let mut fresh = |g: &mut LayoutGraph| {
        next_id += 1;
        let id = format!("{next_id}");
        g.set_node(id.as_str(), NodeLabel::sized(180.0, 80.0));
        id
    };

    let mut couples: Vec<(String, String)> = vec![(fresh(&mut g), fresh(&mut g))];
    for _ in 0..generations {
        let mut next_couples = Vec::new();
        for (a, b) in &couples {
            for _ in 0..children {
                let child = fresh(&mut g);
                g.set_edge(a.as_str(), child.as_str());
                g.set_edge(b.as_str(), child.as_str());
                let partner = fresh(&mut g);
                next_couples.push((child, partner));
            }
        }
        couples = next_couples;
    }
    g
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layered_layout");
    for (generations, children) in [(3, 2), (4, 3)] {
        let template_nodes = family_forest(generations, children).node_count();
        group.bench_with_input(
            BenchmarkId::new("family_forest", template_nodes),
            &(generations, children),
            |b, &(generations, children)| {
                b.iter_batched(
                    || family_forest(generations, children),
                    |mut g| {
                        layout(&mut g);
                        black_box(g.node_count())
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
