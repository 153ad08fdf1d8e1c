//! Input records (people and their relations) and the emitted graph types.

use crate::style::EdgeStyle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Relation type as found on the wire. Anything outside the three known kinds is kept as
/// `Unrecognized` and skipped by the indexer instead of failing the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationType {
    Parent,
    Sibling,
    Spouse,
    #[default]
    #[serde(other)]
    Unrecognized,
}

impl RelationType {
    pub fn kind(self) -> Option<EdgeKind> {
        match self {
            Self::Parent => Some(EdgeKind::Parent),
            Self::Sibling => Some(EdgeKind::Sibling),
            Self::Spouse => Some(EdgeKind::Spouse),
            Self::Unrecognized => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EdgeKind {
    Parent,
    Sibling,
    Spouse,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "PARENT",
            Self::Sibling => "SIBLING",
            Self::Spouse => "SPOUSE",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub relations: Option<Vec<RelationRecord>>,
}

impl Person {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_relation(mut self, relation_type: RelationType, other_person_id: i64) -> Self {
        self.relations
            .get_or_insert_with(Vec::new)
            .push(RelationRecord {
                other_person_id: Some(other_person_id),
                relation_type,
            });
        self
    }
}

/// Basic person reference embedded in relation payloads (`{ "id", "name", "gender" }`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// A relation attached to its holder. `Parent` means "holder is parent of other".
///
/// Reads both the nested form served by the person API
/// (`{ "person": { "id": 2 }, "relationType": "PARENT" }`) and the flat
/// `{ "otherPersonId": 2, "relationType": "PARENT" }` form; always writes the flat one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRelationRecord")]
pub struct RelationRecord {
    pub other_person_id: Option<i64>,
    pub relation_type: RelationType,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRelationRecord {
    #[serde(default)]
    other_person_id: Option<i64>,
    #[serde(default)]
    person: Option<PersonRef>,
    #[serde(default)]
    relation_type: Option<RelationType>,
}

impl From<RawRelationRecord> for RelationRecord {
    fn from(raw: RawRelationRecord) -> Self {
        Self {
            other_person_id: raw.other_person_id.or(raw.person.and_then(|p| p.id)),
            relation_type: raw.relation_type.unwrap_or_default(),
        }
    }
}

/// A standalone relation from the global relation list (`fromPerson` relates to `toPerson`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalRelation {
    #[serde(default)]
    pub from_person: Option<PersonRef>,
    #[serde(default)]
    pub to_person: Option<PersonRef>,
    #[serde(default)]
    pub relation_type: Option<RelationType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub gender: Gender,
    pub position: Position,
    pub selected_a: bool,
    pub selected_b: bool,
    pub is_me: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub style: EdgeStyle,
}

/// The two-slot person picker plus the "me" marker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub a: Option<String>,
    #[serde(default)]
    pub b: Option<String>,
    #[serde(default)]
    pub me: Option<String>,
}

impl Selection {
    /// Applies one click on a person.
    ///
    /// An empty slot A takes the pick, then slot B. Picking an id that already sits in a slot
    /// clears that slot. A third distinct pick starts over at A and clears B.
    pub fn pick(&mut self, id: &str) {
        if self.a.is_none() || self.a.as_deref() == Some(id) {
            self.a = if self.a.as_deref() == Some(id) {
                None
            } else {
                Some(id.to_string())
            };
            return;
        }
        if self.b.is_none() || self.b.as_deref() == Some(id) {
            self.b = if self.b.as_deref() == Some(id) {
                None
            } else {
                Some(id.to_string())
            };
            return;
        }
        self.a = Some(id.to_string());
        self.b = None;
    }

    pub fn apply(&self, node: &mut GraphNode) {
        node.selected_a = self.a.as_deref() == Some(node.id.as_str());
        node.selected_b = self.b.as_deref() == Some(node.id.as_str());
        node.is_me = self.me.as_deref() == Some(node.id.as_str());
    }
}
