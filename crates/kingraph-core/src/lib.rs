#![forbid(unsafe_code)]

//! Family relationship graph model (headless).
//!
//! Turns a flat list of people with embedded, possibly redundant relation records into a
//! deduplicated node/edge graph and computes a deterministic layered layout for it.
//!
//! Design goals:
//! - pure, synchronous construction (no I/O, no clocks)
//! - every emitted edge references an emitted node
//! - identical input produces identical output, edge order included

pub mod builder;
pub mod error;
pub mod index;
pub mod layout;
pub mod model;
pub mod options;
pub mod relation;
pub mod style;

pub use builder::{FamilyGraph, build_graph};
pub use error::{Error, Result};
pub use index::RelationIndex;
pub use layout::{ComputedLayout, compute_layout};
pub use model::{
    EdgeKind, Gender, GlobalRelation, GraphEdge, GraphNode, Person, PersonRef, Position,
    RelationRecord, RelationType, Selection,
};
pub use options::ViewOptions;
pub use relation::Relation;
pub use style::EdgeStyle;

/// Parses a JSON array of people as served by the person API.
pub fn parse_persons(text: &str) -> Result<Vec<Person>> {
    Ok(serde_json::from_str(text)?)
}
