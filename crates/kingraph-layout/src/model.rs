//! Label types carried by the layout graph.
//!
//! Callers fill in node sizes and graph options; the pipeline writes back `rank`, `order`, `x`
//! and `y` on nodes and `points` on edges.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphLabel {
    pub rankdir: RankDir,
    /// Gap between two real nodes on the same rank.
    pub nodesep: f64,
    /// Gap between two adjacent ranks.
    pub ranksep: f64,
    /// Gap used when at least one neighbour on the rank is a long-edge dummy.
    pub edgesep: f64,
    pub marginx: f64,
    pub marginy: f64,
    pub(crate) dummy_chains: Vec<String>,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 50.0,
            ranksep: 50.0,
            edgesep: 20.0,
            marginx: 0.0,
            marginy: 0.0,
            dummy_chains: Vec::new(),
        }
    }
}

impl GraphLabel {
    /// Label with the given direction and spacing; the remaining knobs keep their defaults.
    pub fn new(rankdir: RankDir, nodesep: f64, ranksep: f64) -> Self {
        Self {
            rankdir,
            nodesep,
            ranksep,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rank: Option<i32>,
    pub order: Option<usize>,
    pub(crate) dummy: Option<DummyEdge>,
}

impl NodeLabel {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    pub fn is_dummy(&self) -> bool {
        self.dummy.is_some()
    }
}

/// Bookkeeping for a node inserted in the middle of a long edge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DummyEdge {
    pub(crate) edge: crate::graphlib::EdgeKey,
    pub(crate) label: EdgeLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    /// Minimum number of ranks between tail and head.
    pub minlen: usize,
    /// Pull of this edge during crossing reduction and x placement.
    pub weight: f64,
    pub points: Vec<Point>,
    pub(crate) reversed: bool,
    pub(crate) forward_name: Option<String>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            weight: 1.0,
            points: Vec::new(),
            reversed: false,
            forward_name: None,
        }
    }
}

impl EdgeLabel {
    pub fn with_minlen(mut self, minlen: usize) -> Self {
        self.minlen = minlen;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}
