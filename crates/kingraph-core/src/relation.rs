//! Typed relations with canonical keys.
//!
//! Directed relations keep their orientation; undirected ones store their endpoints sorted so
//! that `a`/`b` and `b`/`a` compare, hash and print the same.

use crate::model::{EdgeKind, GlobalRelation, RelationRecord, RelationType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Relation {
    Directed { parent: String, child: String },
    Undirected { kind: EdgeKind, a: String, b: String },
}

impl Relation {
    pub fn directed(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::Directed {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Builds an undirected relation with its endpoints in lexicographic order.
    pub fn undirected(kind: EdgeKind, x: impl Into<String>, y: impl Into<String>) -> Self {
        let (x, y) = (x.into(), y.into());
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self::Undirected { kind, a, b }
    }

    /// Interprets `record` as held by `holder`. Returns `None` for records without a related id
    /// or with an unrecognized type.
    pub fn from_record(holder: i64, record: &RelationRecord) -> Option<Self> {
        Self::typed(holder, record.other_person_id?, record.relation_type)
    }

    pub fn from_global(relation: &GlobalRelation) -> Option<Self> {
        let from = relation.from_person.as_ref()?.id?;
        let to = relation.to_person.as_ref()?.id?;
        Self::typed(from, to, relation.relation_type?)
    }

    fn typed(holder: i64, other: i64, relation_type: RelationType) -> Option<Self> {
        let (holder, other) = (holder.to_string(), other.to_string());
        match relation_type.kind()? {
            EdgeKind::Parent => Some(Self::directed(holder, other)),
            kind => Some(Self::undirected(kind, holder, other)),
        }
    }

    pub fn kind(&self) -> EdgeKind {
        match self {
            Self::Directed { .. } => EdgeKind::Parent,
            Self::Undirected { kind, .. } => *kind,
        }
    }

    /// `(source, target)` of the emitted edge.
    pub fn endpoints(&self) -> (&str, &str) {
        match self {
            Self::Directed { parent, child } => (parent, child),
            Self::Undirected { a, b, .. } => (a, b),
        }
    }

    pub fn is_self_relation(&self) -> bool {
        let (s, t) = self.endpoints();
        s == t
    }

    /// Stable edge id: `"{source}-{target}-{KIND}"`.
    pub fn edge_id(&self) -> String {
        let (s, t) = self.endpoints();
        format!("{s}-{t}-{}", self.kind())
    }
}
