use kingraph_core::{
    FamilyGraph, Person, Position, RelationIndex, RelationType, Selection, ViewOptions,
    build_graph, compute_layout,
};

fn build(persons: &[Person]) -> FamilyGraph {
    build_graph(persons, &RelationIndex::build(persons), &Selection::default())
}

#[test]
fn parent_sits_one_generation_above_child() {
    let g = build(&[
        Person::new(1, "Ada").with_relation(RelationType::Parent, 2),
        Person::new(2, "Ben"),
    ]);

    let layout = compute_layout(&g, &ViewOptions::default());
    assert_eq!(layout.get("1"), Some(Position::new(0.0, 0.0)));
    // 80 (card) + 180 (ranksep)
    assert_eq!(layout.get("2"), Some(Position::new(0.0, 260.0)));
}

#[test]
fn spouses_and_isolated_people_share_rank_zero() {
    let g = build(&[
        Person::new(1, "Ada").with_relation(RelationType::Spouse, 2),
        Person::new(2, "Ben"),
        Person::new(3, "Cy"),
    ]);

    let layout = compute_layout(&g, &ViewOptions::default());
    assert_eq!(layout.len(), 3);
    assert_eq!(layout.get("1"), Some(Position::new(0.0, 0.0)));
    assert_eq!(layout.get("2"), Some(Position::new(380.0, 0.0)));
    assert_eq!(layout.get("3"), Some(Position::new(760.0, 0.0)));
}

#[test]
fn child_is_ranked_below_every_parent() {
    let g = build(&[
        Person::new(1, "Grandma").with_relation(RelationType::Parent, 2),
        Person::new(2, "Mum").with_relation(RelationType::Parent, 4),
        Person::new(3, "Dad")
            .with_relation(RelationType::Parent, 4)
            .with_relation(RelationType::Spouse, 2),
        Person::new(4, "Kid").with_relation(RelationType::Sibling, 5),
        Person::new(5, "Other kid"),
    ]);

    let layout = compute_layout(&g, &ViewOptions::default());
    let y = |id: &str| layout.get(id).unwrap().y;
    assert_eq!(y("1"), 0.0);
    // Dad has no parents in the tree, so he stays next to Mum.
    assert_eq!(y("3"), 260.0);
    assert_eq!(y("2"), 260.0);
    assert_eq!(y("4"), 520.0);
    assert_eq!(y("5"), 0.0);
}

#[test]
fn married_in_parent_shares_the_generation_of_their_spouse() {
    let g = build(&[
        Person::new(5, "Great-grandpa").with_relation(RelationType::Parent, 1),
        Person::new(1, "Grandpa").with_relation(RelationType::Parent, 2),
        Person::new(2, "Mum")
            .with_relation(RelationType::Parent, 3)
            .with_relation(RelationType::Spouse, 4),
        Person::new(3, "Kid"),
        Person::new(4, "Dad").with_relation(RelationType::Parent, 3),
    ]);

    let layout = compute_layout(&g, &ViewOptions::default());
    let y = |id: &str| layout.get(id).unwrap().y;
    assert_eq!(y("5"), 0.0);
    assert_eq!(y("2"), 520.0);
    assert_eq!(y("4"), y("2"));
    assert_eq!(y("3"), 780.0);
}

#[test]
fn parent_cycles_still_produce_a_layout() {
    let g = build(&[
        Person::new(1, "A").with_relation(RelationType::Parent, 2),
        Person::new(2, "B").with_relation(RelationType::Parent, 3),
        Person::new(3, "C").with_relation(RelationType::Parent, 1),
    ]);

    let layout = compute_layout(&g, &ViewOptions::default());
    assert_eq!(layout.len(), 3);
    assert!(layout.positions.values().all(|p| p.x.is_finite() && p.y.is_finite()));
}

#[test]
fn layout_is_byte_identical_across_runs() {
    let persons: Vec<Person> = (1..=30)
        .map(|id| {
            let mut p = Person::new(id, format!("P{id}"));
            if id * 2 <= 30 {
                p = p.with_relation(RelationType::Parent, id * 2);
            }
            if id * 2 + 1 <= 30 {
                p = p.with_relation(RelationType::Parent, id * 2 + 1);
            }
            if id % 2 == 0 {
                p = p.with_relation(RelationType::Sibling, id + 1);
            }
            p
        })
        .collect();

    let g = build(&persons);
    let first = compute_layout(&g, &ViewOptions::default());
    let second = compute_layout(&build(&persons), &ViewOptions::default());
    assert_eq!(format!("{:?}", first), format!("{:?}", second));
}

#[test]
fn apply_to_writes_positions_into_nodes() {
    let mut g = build(&[Person::new(1, "Ada"), Person::new(2, "Ben")]);
    let layout = compute_layout(&g, &ViewOptions::default());
    layout.apply_to(&mut g);
    assert_eq!(g.node("2").unwrap().position, Position::new(380.0, 0.0));
}
