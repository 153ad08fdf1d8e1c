//! Relation adjacency indices built from people's embedded relation records.

use crate::model::{EdgeKind, GlobalRelation, Person};
use crate::relation::Relation;
use indexmap::{IndexMap, IndexSet};

/// Person id -> related person ids, both in first-insertion order.
pub type Adjacency = IndexMap<String, IndexSet<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationIndex {
    pub children_of: Adjacency,
    pub parents_of: Adjacency,
    pub spouses_of: Adjacency,
    pub siblings_of: Adjacency,
}

impl RelationIndex {
    /// Indexes every usable relation record held by `persons`.
    ///
    /// Holders without an id, records without a related id, records of an unrecognized type and
    /// self relations are skipped. Repeated or reciprocal records collapse into one entry; for a
    /// PARENT link recorded from both sides the first direction in input order is kept.
    pub fn build(persons: &[Person]) -> Self {
        let mut index = Self::default();
        for person in persons {
            let Some(holder) = person.id else {
                if person.relations.as_ref().is_some_and(|r| !r.is_empty()) {
                    tracing::trace!("skipping relations of a person without id");
                }
                continue;
            };
            for record in person.relations.iter().flatten() {
                match Relation::from_record(holder, record) {
                    Some(relation) => index.insert(relation),
                    None => tracing::trace!(
                        holder,
                        other = ?record.other_person_id,
                        relation_type = ?record.relation_type,
                        "skipping unusable relation record"
                    ),
                }
            }
        }
        tracing::debug!(
            person_count = persons.len(),
            parent_links = index.children_of.values().map(IndexSet::len).sum::<usize>(),
            "relation index built"
        );
        index
    }

    /// Merges a separately fetched relation list into the index. Embedded records stay as they
    /// are; relations from `global` are only ever added.
    pub fn merge_global(&mut self, global: &[GlobalRelation]) {
        for relation in global {
            match Relation::from_global(relation) {
                Some(relation) => self.insert(relation),
                None => tracing::trace!("skipping unusable global relation"),
            }
        }
    }

    pub fn insert(&mut self, relation: Relation) {
        if relation.is_self_relation() {
            tracing::trace!(id = relation.endpoints().0, "skipping self relation");
            return;
        }
        match relation {
            Relation::Directed { parent, child } => {
                // The child side may carry the same link with the holder as "parent"; the
                // direction seen first wins.
                if self.children_of.get(&child).is_some_and(|c| c.contains(&parent)) {
                    tracing::trace!(
                        parent = %parent,
                        child = %child,
                        "skipping reciprocal parent record"
                    );
                    return;
                }
                push_unique(&mut self.children_of, &parent, &child);
                push_unique(&mut self.parents_of, &child, &parent);
            }
            Relation::Undirected { kind, a, b } => {
                let map = match kind {
                    EdgeKind::Spouse => &mut self.spouses_of,
                    EdgeKind::Sibling => &mut self.siblings_of,
                    EdgeKind::Parent => {
                        tracing::trace!(a = %a, b = %b, "skipping undirected parent relation");
                        return;
                    }
                };
                push_unique(map, &a, &b);
                push_unique(map, &b, &a);
            }
        }
    }

    pub fn parents(&self, id: &str) -> impl Iterator<Item = &str> {
        related(&self.parents_of, id)
    }

    pub fn children(&self, id: &str) -> impl Iterator<Item = &str> {
        related(&self.children_of, id)
    }

    pub fn spouses(&self, id: &str) -> impl Iterator<Item = &str> {
        related(&self.spouses_of, id)
    }

    pub fn siblings(&self, id: &str) -> impl Iterator<Item = &str> {
        related(&self.siblings_of, id)
    }
}

fn push_unique(map: &mut Adjacency, key: &str, value: &str) {
    match map.get_mut(key) {
        Some(set) => {
            set.insert(value.to_string());
        }
        None => {
            map.insert(key.to_string(), IndexSet::from([value.to_string()]));
        }
    }
}

fn related<'a>(map: &'a Adjacency, id: &str) -> impl Iterator<Item = &'a str> {
    map.get(id)
        .into_iter()
        .flat_map(|set| set.iter().map(String::as_str))
}
