//! Per-kind edge presentation metadata handed to the renderer.

use crate::model::EdgeKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<String>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

const PARENT_STROKE: &str = "#10b981";
const SIBLING_STROKE: &str = "#6366f1";
const SPOUSE_STROKE: &str = "#ec4899";
const STROKE_WIDTH: f64 = 3.0;
const ARROW: &str = "arrowclosed";

impl EdgeStyle {
    pub fn for_kind(kind: EdgeKind) -> Self {
        let base = Self {
            stroke: String::new(),
            stroke_width: STROKE_WIDTH,
            stroke_dasharray: None,
            animated: false,
            marker_end: None,
            label: kind.as_str().to_string(),
            source_handle: None,
            target_handle: None,
        };
        match kind {
            EdgeKind::Parent => Self {
                stroke: PARENT_STROKE.to_string(),
                marker_end: Some(ARROW.to_string()),
                ..base
            },
            EdgeKind::Sibling => Self {
                stroke: SIBLING_STROKE.to_string(),
                stroke_dasharray: Some("6 6".to_string()),
                source_handle: Some("sibling-left".to_string()),
                target_handle: Some("sibling-right-target".to_string()),
                ..base
            },
            EdgeKind::Spouse => Self {
                stroke: SPOUSE_STROKE.to_string(),
                animated: true,
                marker_end: Some(ARROW.to_string()),
                source_handle: Some("spouse-right".to_string()),
                target_handle: Some("spouse-left".to_string()),
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_edges_are_dashed_without_arrow() {
        let s = EdgeStyle::for_kind(EdgeKind::Sibling);
        assert_eq!(s.stroke_dasharray.as_deref(), Some("6 6"));
        assert!(s.marker_end.is_none());
        assert!(!s.animated);
    }

    #[test]
    fn only_spouse_edges_are_animated() {
        assert!(EdgeStyle::for_kind(EdgeKind::Spouse).animated);
        assert!(!EdgeStyle::for_kind(EdgeKind::Parent).animated);
    }
}
