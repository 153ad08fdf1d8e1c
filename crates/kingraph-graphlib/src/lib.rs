#![forbid(unsafe_code)]

//! Graph container APIs used by `kingraph-layout`.
//!
//! The container is directed and keeps nodes and edges in insertion order. Every query that
//! returns more than one item returns it in that order, which is what makes the layout pipeline
//! deterministic for a given input.

pub mod alg;
mod graph;

pub use graph::{EdgeKey, Graph, GraphOptions};
