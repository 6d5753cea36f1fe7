//! Node and tree records, in the persisted `generic_state_machine` shape.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::Actions;
use crate::error::{TreeError, TreeResult};
use crate::position::Position;
use crate::state::StateSnapshot;

pub const TREE_VERSION: &str = "3.0.0";
pub const TREE_FORMAT: &str = "generic_state_machine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionNode {
    pub player: Position,
    pub state: StateSnapshot,
    pub actions: Actions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalTag {
    Terminal,
}

/// Outcome leaf: a win without showdown, a showdown, or a flop hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalNode {
    #[serde(rename = "type")]
    pub kind: TerminalTag,
    pub result: String,
}

impl TerminalNode {
    pub fn new(result: impl Into<String>) -> Self {
        TerminalNode {
            kind: TerminalTag::Terminal,
            result: result.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Decision(DecisionNode),
    Terminal(TerminalNode),
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal(_))
    }

    pub fn as_decision(&self) -> Option<&DecisionNode> {
        match self {
            Node::Decision(d) => Some(d),
            Node::Terminal(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingDefaults {
    pub rfi_sizes: Vec<f64>,
    #[serde(rename = "3bet_sizes")]
    pub three_bet_sizes: Vec<f64>,
    #[serde(rename = "4bet_sizes")]
    pub four_bet_sizes: Vec<f64>,
    /// Commitment threshold above which raising is disabled.
    pub allin_threshold: f64,
}

/// Echo of the generation parameters stored alongside the nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub seats: usize,
    pub stack: f64,
    pub sb: f64,
    pub bb: f64,
    pub positions: Vec<String>,
    pub defaults: SizingDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameTree {
    pub version: String,
    pub format: String,
    pub config: TreeConfig,
    /// Keyed by node name; the ordered map keeps output canonical.
    pub nodes: BTreeMap<String, Node>,
}

impl GameTree {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn decision(&self, name: &str) -> Option<&DecisionNode> {
        self.node(name).and_then(Node::as_decision)
    }

    pub fn decisions(&self) -> impl Iterator<Item = (&String, &DecisionNode)> {
        self.nodes
            .iter()
            .filter_map(|(name, node)| node.as_decision().map(|d| (name, d)))
    }

    pub fn decision_count(&self) -> usize {
        self.decisions().count()
    }

    pub fn terminal_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_terminal()).count()
    }

    pub fn to_json(&self, pretty: bool) -> TreeResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn to_value(&self) -> TreeResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>, pretty: bool) -> TreeResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TreeError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json(pretty)?).map_err(|e| TreeError::io(path, e))?;
        log::info!("{:<32}{}", "saved tree", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_shape() {
        let node = Node::Terminal(TerminalNode::new("showdown"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, serde_json::json!({"type": "terminal", "result": "showdown"}));
    }

    #[test]
    fn untagged_terminal_parses() {
        let node: Node = serde_json::from_str(r#"{"type": "terminal", "result": "bb_wins"}"#).unwrap();
        assert!(node.is_terminal());
        assert!(node.as_decision().is_none());
    }

    #[test]
    fn defaults_rename() {
        let d = SizingDefaults {
            rfi_sizes: vec![2.3],
            three_bet_sizes: vec![6.9],
            four_bet_sizes: vec![16.0, 17.0],
            allin_threshold: 0.3,
        };
        let json = serde_json::to_value(&d).unwrap();
        assert!(json.get("3bet_sizes").is_some());
        assert!(json.get("4bet_sizes").is_some());
    }
}
