use crate::error::{Error, Result};
use kingraph_layout::RankDir;
use serde::{Deserialize, Serialize};

fn default_node_width() -> f64 {
    180.0
}

fn default_node_height() -> f64 {
    80.0
}

fn default_nodesep() -> f64 {
    200.0
}

fn default_ranksep() -> f64 {
    180.0
}

/// Layout knobs for the family view. Every field has a default, unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    /// Logical width of a person card.
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    #[serde(default = "default_node_height")]
    pub node_height: f64,
    /// Horizontal gap between cards on the same generation.
    #[serde(default = "default_nodesep")]
    pub nodesep: f64,
    /// Vertical gap between generations.
    #[serde(default = "default_ranksep")]
    pub ranksep: f64,
    #[serde(default)]
    pub rankdir: RankDir,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            node_width: default_node_width(),
            node_height: default_node_height(),
            nodesep: default_nodesep(),
            ranksep: default_ranksep(),
            rankdir: RankDir::default(),
        }
    }
}

impl ViewOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("nodeWidth", self.node_width),
            ("nodeHeight", self.node_height),
            ("nodesep", self.nodesep),
            ("ranksep", self.ranksep),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidOption {
                    field,
                    message: format!("expected a finite, non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options = ViewOptions::from_json(r#"{"ranksep": 20, "rankdir": "LR", "extra": 1}"#)
            .unwrap();
        assert_eq!(options.ranksep, 20.0);
        assert_eq!(options.rankdir, RankDir::LR);
        assert_eq!(options.node_width, 180.0);
        assert_eq!(options.nodesep, 200.0);
    }

    #[test]
    fn negative_sizes_are_rejected() {
        let err = ViewOptions::from_json(r#"{"nodeHeight": -1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { field: "nodeHeight", .. }));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let options = ViewOptions {
            nodesep: f64::INFINITY,
            ..ViewOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
