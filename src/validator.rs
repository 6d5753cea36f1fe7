//! Structural and semantic checks over a persisted tree.
//!
//! The validator reads the raw JSON value rather than the typed [`GameTree`]
//! so that malformed input (a scalar where a list belongs, a null flag) is
//! reported as a finding instead of a parse failure. Passes never mutate the
//! tree. Errors fail the run; warnings and statistics never do.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::action::ActionKind;
use crate::error::{TreeError, TreeResult};
use crate::node::GameTree;

const DEFAULT_COMMIT_THRESHOLD: f64 = 0.30;
const DEFAULT_SB: f64 = 0.5;
const DEFAULT_BB: f64 = 1.0;
/// Pot may undershoot the posted blinds by this factor before it is flagged.
const POT_TOLERANCE: f64 = 0.9;
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    NodeNotAnObject { node: String },
    MissingPlayer { node: String },
    MissingActions { node: String },
    MissingActionKind { node: String, kind: ActionKind },
    UnknownActionKind { node: String, action: String },
    ActionNotAnObject { node: String, action: String },
    MissingEnabled { node: String, action: String },
    EnabledNotBoolean { node: String, action: String, found: &'static str },
    MissingSize { node: String, action: String },
    RaiseSizesMissing { node: String },
    RaiseSizesNotArray { node: String, found: &'static str },
    RaiseSizesEmpty { node: String },
    RaiseWhileCommitted { node: String, committed: f64, threshold: f64 },
    NegativeToCall { node: String, to_call: f64 },
    DanglingNext { node: String, action: String, target: String },
    DanglingRaiseNext { node: String, size: String, target: String },
    PotBelowBlinds { node: String, pot: f64, blinds: f64 },
    Orphan { node: String },
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Finding::MissingSize { .. }
            | Finding::RaiseSizesEmpty { .. }
            | Finding::DanglingNext { .. }
            | Finding::DanglingRaiseNext { .. }
            | Finding::PotBelowBlinds { .. }
            | Finding::Orphan { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::NodeNotAnObject { node } => write!(f, "Node '{}' is not an object", node),
            Finding::MissingPlayer { node } => write!(f, "Node '{}' missing 'player' field", node),
            Finding::MissingActions { node } => {
                write!(f, "Node '{}' missing 'actions' field", node)
            }
            Finding::MissingActionKind { node, kind } => {
                write!(f, "Node '{}' missing action type '{}'", node, kind)
            }
            Finding::UnknownActionKind { node, action } => {
                write!(f, "Node '{}' has unknown action type '{}'", node, action)
            }
            Finding::ActionNotAnObject { node, action } => {
                write!(f, "Node '{}' action '{}' is not an object", node, action)
            }
            Finding::MissingEnabled { node, action } => {
                write!(f, "Node '{}' action '{}' missing 'enabled' field", node, action)
            }
            Finding::EnabledNotBoolean {
                node,
                action,
                found,
            } => write!(
                f,
                "Node '{}' action '{}': enabled should be true/false, not {}",
                node, action, found
            ),
            Finding::MissingSize { node, action } => {
                write!(f, "Node '{}' action '{}' missing 'size'", node, action)
            }
            Finding::RaiseSizesMissing { node } => {
                write!(f, "Node '{}': raise enabled but 'sizes' is missing", node)
            }
            Finding::RaiseSizesNotArray { node, found } => {
                write!(f, "Node '{}': raise 'sizes' must be array, got {}", node, found)
            }
            Finding::RaiseSizesEmpty { node } => {
                write!(f, "Node '{}': raise enabled but 'sizes' is empty", node)
            }
            Finding::RaiseWhileCommitted {
                node,
                committed,
                threshold,
            } => write!(
                f,
                "Node '{}': raise should be disabled when committed ({:.2}% > {:.0}%)",
                node,
                committed * 100.0,
                threshold * 100.0
            ),
            Finding::NegativeToCall { node, to_call } => write!(
                f,
                "Node '{}': player has invested more than the bet faced (to_call {:.2})",
                node, to_call
            ),
            Finding::DanglingNext {
                node,
                action,
                target,
            } => write!(
                f,
                "Node '{}' action '{}': 'next' references non-existent node '{}'",
                node, action, target
            ),
            Finding::DanglingRaiseNext { node, size, target } => write!(
                f,
                "Node '{}' raise size {}: 'next_map' references non-existent node '{}'",
                node, size, target
            ),
            Finding::PotBelowBlinds { node, pot, blinds } => {
                write!(f, "Node '{}': pot ({}) is less than blinds ({})", node, pot, blinds)
            }
            Finding::Orphan { node } => write!(f, "Orphan node (never referenced): '{}'", node),
        }
    }
}

/// Enabled-action counts over all decision nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnabledCounts {
    pub fold: usize,
    pub check: usize,
    pub call: usize,
    pub raise: usize,
    pub allin: usize,
}

impl EnabledCounts {
    pub fn get(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::Fold => self.fold,
            ActionKind::Check => self.check,
            ActionKind::Call => self.call,
            ActionKind::Raise => self.raise,
            ActionKind::AllIn => self.allin,
        }
    }

    fn bump(&mut self, kind: ActionKind) {
        let slot = match kind {
            ActionKind::Fold => &mut self.fold,
            ActionKind::Check => &mut self.check,
            ActionKind::Call => &mut self.call,
            ActionKind::Raise => &mut self.raise,
            ActionKind::AllIn => &mut self.allin,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub action_nodes: usize,
    pub terminal_nodes: usize,
    pub enabled_actions: EnabledCounts,
    /// Every distinct raise size offered by an enabled raise, ascending.
    pub unique_raise_sizes: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub passed: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub stats: TreeStats,
}

impl ValidationReport {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }

    /// Process exit status: 0 on pass regardless of warnings.
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_terminal(node: &Value) -> bool {
    node.get("type").and_then(Value::as_str) == Some("terminal")
}

fn is_enabled(action: &Value) -> bool {
    action.get("enabled").and_then(Value::as_bool) == Some(true)
}

/// Openers are reached from outside the tree.
fn is_entry(name: &str) -> bool {
    name.starts_with("open_") || name == "sb_open"
}

fn state_field(node: &Map<String, Value>, field: &str) -> Option<f64> {
    node.get("state")?.get(field)?.as_f64()
}

pub struct Validator<'a> {
    nodes: &'a Map<String, Value>,
    commit_threshold: f64,
    sb: f64,
    bb: f64,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

impl<'a> Validator<'a> {
    /// Accepts any object with an object-valued `nodes` member.
    pub fn new(tree: &'a Value) -> TreeResult<Self> {
        let root = tree
            .as_object()
            .ok_or_else(|| TreeError::MalformedTree(format!("root is {}, expected object", json_type(tree))))?;
        let nodes = match root.get("nodes") {
            Some(Value::Object(nodes)) => nodes,
            Some(other) => {
                return Err(TreeError::MalformedTree(format!(
                    "'nodes' is {}, expected object",
                    json_type(other)
                )))
            }
            None => return Err(TreeError::MalformedTree("missing 'nodes'".to_string())),
        };

        let config = root.get("config");
        let read = |path: &[&str], default: f64| {
            config
                .and_then(|c| path.iter().try_fold(c, |v, key| v.get(*key)))
                .and_then(Value::as_f64)
                .unwrap_or(default)
        };

        Ok(Validator {
            nodes,
            commit_threshold: read(&["defaults", "allin_threshold"], DEFAULT_COMMIT_THRESHOLD),
            sb: read(&["sb"], DEFAULT_SB),
            bb: read(&["bb"], DEFAULT_BB),
            errors: Vec::new(),
            warnings: Vec::new(),
        })
    }

    fn report(&mut self, finding: Finding) {
        let bucket = match finding.severity() {
            Severity::Error => &mut self.errors,
            Severity::Warning => &mut self.warnings,
        };
        if !bucket.contains(&finding) {
            bucket.push(finding);
        }
    }

    /// Decision nodes that are objects, with their names.
    fn decisions(&self) -> impl Iterator<Item = (&'a String, &'a Map<String, Value>)> {
        let nodes: &'a Map<String, Value> = self.nodes;
        nodes
            .iter()
            .filter(|(_, node)| !is_terminal(node))
            .filter_map(|(name, node)| node.as_object().map(|obj| (name, obj)))
    }

    fn actions(node: &Map<String, Value>) -> Option<&Map<String, Value>> {
        node.get("actions").and_then(Value::as_object)
    }

    pub fn validate(mut self) -> ValidationReport {
        self.check_structure();
        self.check_action_properties();
        self.check_raise_sizes();
        self.check_commitment();
        self.check_enabled_flags();
        self.check_betting_state();
        self.check_next_references();
        self.check_pot_sanity();
        self.check_orphans();

        log::debug!(
            "{:<32}{} errors, {} warnings",
            "validation finished",
            self.errors.len(),
            self.warnings.len()
        );

        let stats = self.statistics();
        ValidationReport {
            passed: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            stats,
        }
    }

    /// Every decision node has a player and exactly the five action kinds.
    fn check_structure(&mut self) {
        let nodes = self.nodes;
        for (name, node) in nodes {
            if is_terminal(node) {
                continue;
            }
            let Some(obj) = node.as_object() else {
                self.report(Finding::NodeNotAnObject { node: name.clone() });
                continue;
            };
            if !obj.contains_key("player") {
                self.report(Finding::MissingPlayer { node: name.clone() });
            }
            let Some(actions) = Self::actions(obj) else {
                self.report(Finding::MissingActions { node: name.clone() });
                continue;
            };
            for kind in ActionKind::ALL {
                if !actions.contains_key(kind.as_str()) {
                    self.report(Finding::MissingActionKind {
                        node: name.clone(),
                        kind,
                    });
                }
            }
            for action in actions.keys() {
                if ActionKind::from_str(action).is_none() {
                    self.report(Finding::UnknownActionKind {
                        node: name.clone(),
                        action: action.clone(),
                    });
                }
            }
        }
    }

    fn raise_sizes_finding(name: &str, raise: &Value) -> Option<Finding> {
        match raise.get("sizes") {
            None | Some(Value::Null) => Some(Finding::RaiseSizesMissing {
                node: name.to_string(),
            }),
            Some(Value::Array(_)) => None,
            Some(other) => Some(Finding::RaiseSizesNotArray {
                node: name.to_string(),
                found: json_type(other),
            }),
        }
    }

    fn check_action_properties(&mut self) {
        for (name, node) in self.decisions() {
            let Some(actions) = Self::actions(node) else { continue };
            for (action, data) in actions {
                if !data.is_object() {
                    self.report(Finding::ActionNotAnObject {
                        node: name.clone(),
                        action: action.clone(),
                    });
                    continue;
                }
                if data.get("enabled").is_none() {
                    self.report(Finding::MissingEnabled {
                        node: name.clone(),
                        action: action.clone(),
                    });
                    continue;
                }
                if !is_enabled(data) {
                    continue;
                }
                match ActionKind::from_str(action) {
                    Some(ActionKind::Call | ActionKind::AllIn) if data.get("size").is_none() => {
                        self.report(Finding::MissingSize {
                            node: name.clone(),
                            action: action.clone(),
                        });
                    }
                    Some(ActionKind::Raise) => {
                        if let Some(finding) = Self::raise_sizes_finding(name, data) {
                            self.report(finding);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn check_raise_sizes(&mut self) {
        for (name, node) in self.decisions() {
            let Some(raise) = Self::actions(node).and_then(|a| a.get("raise")) else { continue };
            if !is_enabled(raise) {
                continue;
            }
            match Self::raise_sizes_finding(name, raise) {
                Some(finding) => self.report(finding),
                None => {
                    let empty = raise
                        .get("sizes")
                        .and_then(Value::as_array)
                        .map(Vec::is_empty)
                        .unwrap_or(false);
                    if empty {
                        self.report(Finding::RaiseSizesEmpty { node: name.clone() });
                    }
                }
            }
        }
    }

    /// A player committed beyond the threshold may not raise.
    fn check_commitment(&mut self) {
        let threshold = self.commit_threshold;
        for (name, node) in self.decisions() {
            let committed = state_field(node, "committed_ratio").unwrap_or(0.0);
            if committed <= threshold {
                continue;
            }
            let raise_enabled = Self::actions(node)
                .and_then(|a| a.get("raise"))
                .map(is_enabled)
                .unwrap_or(false);
            if raise_enabled {
                self.report(Finding::RaiseWhileCommitted {
                    node: name.clone(),
                    committed,
                    threshold,
                });
            }
        }
    }

    fn check_enabled_flags(&mut self) {
        for (name, node) in self.decisions() {
            let Some(actions) = Self::actions(node) else { continue };
            for (action, data) in actions {
                match data.get("enabled") {
                    None | Some(Value::Bool(_)) => {}
                    Some(other) => self.report(Finding::EnabledNotBoolean {
                        node: name.clone(),
                        action: action.clone(),
                        found: json_type(other),
                    }),
                }
            }
        }
    }

    fn check_betting_state(&mut self) {
        for (name, node) in self.decisions() {
            let (Some(facing), Some(invested)) = (
                state_field(node, "facing_bet"),
                state_field(node, "player_invested"),
            ) else {
                continue;
            };
            let to_call = facing - invested;
            if to_call < -EPSILON {
                self.report(Finding::NegativeToCall {
                    node: name.clone(),
                    to_call,
                });
            }
        }
    }

    /// Successors of enabled actions should exist. Some lines are left as
    /// forward stubs, so this only warns.
    fn check_next_references(&mut self) {
        let nodes = self.nodes;
        for (name, node) in self.decisions() {
            let Some(actions) = Self::actions(node) else { continue };
            for (action, data) in actions {
                if !is_enabled(data) {
                    continue;
                }
                if let Some(target) = data.get("next").and_then(Value::as_str) {
                    if !target.is_empty() && !nodes.contains_key(target) {
                        self.report(Finding::DanglingNext {
                            node: name.clone(),
                            action: action.clone(),
                            target: target.to_string(),
                        });
                    }
                }
                if action != ActionKind::Raise.as_str() {
                    continue;
                }
                let Some(next_map) = data.get("next_map").and_then(Value::as_object) else { continue };
                for (size, target) in next_map {
                    let Some(target) = target.as_str() else { continue };
                    if !nodes.contains_key(target) {
                        self.report(Finding::DanglingRaiseNext {
                            node: name.clone(),
                            size: size.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }
    }

    fn check_pot_sanity(&mut self) {
        let blinds = self.sb + self.bb;
        for (name, node) in self.decisions() {
            let pot = state_field(node, "pot").unwrap_or(0.0);
            if pot < blinds * POT_TOLERANCE {
                self.report(Finding::PotBelowBlinds {
                    node: name.clone(),
                    pot,
                    blinds,
                });
            }
        }
    }

    /// Nodes that no action of any decision node points at.
    fn check_orphans(&mut self) {
        let mut referenced: BTreeSet<&str> = self
            .nodes
            .keys()
            .map(String::as_str)
            .filter(|name| is_entry(name))
            .collect();

        for (_, node) in self.decisions() {
            let Some(actions) = Self::actions(node) else { continue };
            for data in actions.values() {
                if let Some(next) = data.get("next").and_then(Value::as_str) {
                    referenced.insert(next);
                }
                if let Some(next_map) = data.get("next_map").and_then(Value::as_object) {
                    referenced.extend(next_map.values().filter_map(Value::as_str));
                }
            }
        }

        let orphans: Vec<String> = self
            .nodes
            .keys()
            .filter(|name| !referenced.contains(name.as_str()))
            .cloned()
            .collect();
        for node in orphans {
            self.report(Finding::Orphan { node });
        }
    }

    pub fn statistics(&self) -> TreeStats {
        let terminal_nodes = self.nodes.values().filter(|n| is_terminal(n)).count();
        let mut enabled_actions = EnabledCounts::default();
        let mut raise_sizes: Vec<f64> = Vec::new();

        for (_, node) in self.decisions() {
            let Some(actions) = Self::actions(node) else { continue };
            for kind in ActionKind::ALL {
                let Some(data) = actions.get(kind.as_str()) else { continue };
                if !is_enabled(data) {
                    continue;
                }
                enabled_actions.bump(kind);
                if kind == ActionKind::Raise {
                    if let Some(sizes) = data.get("sizes").and_then(Value::as_array) {
                        raise_sizes.extend(sizes.iter().filter_map(Value::as_f64));
                    }
                }
            }
        }

        let unique_raise_sizes = raise_sizes
            .into_iter()
            .sorted_by(|a, b| a.total_cmp(b))
            .dedup()
            .collect();

        TreeStats {
            total_nodes: self.nodes.len(),
            action_nodes: self.nodes.len() - terminal_nodes,
            terminal_nodes,
            enabled_actions,
            unique_raise_sizes,
        }
    }
}

/// Validates a raw tree value.
pub fn validate_value(tree: &Value) -> TreeResult<ValidationReport> {
    Ok(Validator::new(tree)?.validate())
}

pub fn validate_tree(tree: &GameTree) -> TreeResult<ValidationReport> {
    validate_value(&tree.to_value()?)
}

/// Reads a tree file as raw JSON. Unreadable or unparsable input is fatal.
pub fn read_tree(path: impl AsRef<Path>) -> TreeResult<Value> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| TreeError::io(path, e))?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decision(raise: Value) -> Value {
        json!({
            "player": "UTG",
            "state": {
                "pot": 1.5, "facing_bet": 1.0, "player_invested": 0.0,
                "effective_stack": 50.0, "committed_ratio": 0.0
            },
            "actions": {
                "fold": {"enabled": true, "next": "bb_wins"},
                "check": {"enabled": false, "next": null},
                "call": {"enabled": false, "size": 1.0, "next": null},
                "raise": raise,
                "allin": {"enabled": true, "size": 50.0, "next": "bb_wins"}
            }
        })
    }

    fn tree_with(node: Value) -> Value {
        json!({
            "version": "3.0.0",
            "config": {"sb": 0.5, "bb": 1.0, "defaults": {"allin_threshold": 0.3}},
            "nodes": {
                "open_utg": node,
                "bb_wins": {"type": "terminal", "result": "bb_wins"}
            }
        })
    }

    #[test]
    fn clean_tree_passes() {
        let raise = json!({"enabled": true, "sizes": [2.3], "next_map": {"2.3": "bb_wins"}});
        let report = validate_value(&tree_with(decision(raise))).unwrap();
        assert!(report.passed, "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.stats.total_nodes, 2);
        assert_eq!(report.stats.action_nodes, 1);
        assert_eq!(report.stats.terminal_nodes, 1);
        assert_eq!(report.stats.enabled_actions.raise, 1);
        assert_eq!(report.stats.unique_raise_sizes, vec![2.3]);
    }

    #[test]
    fn missing_sizes_reported_once() {
        let raise = json!({"enabled": true, "next_map": {}});
        let report = validate_value(&tree_with(decision(raise))).unwrap();
        assert!(!report.passed);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], Finding::RaiseSizesMissing { .. }));
    }

    #[test]
    fn empty_sizes_is_a_warning() {
        let raise = json!({"enabled": true, "sizes": [], "next_map": {}});
        let report = validate_value(&tree_with(decision(raise))).unwrap();
        assert!(report.passed);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, Finding::RaiseSizesEmpty { .. })));
    }

    #[test]
    fn null_enabled_is_an_error() {
        let raise = json!({"enabled": null, "sizes": [], "next_map": {}});
        let report = validate_value(&tree_with(decision(raise))).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0],
            Finding::EnabledNotBoolean { found: "null", .. }
        ));
    }

    #[test]
    fn negative_to_call_is_an_error() {
        let mut node = decision(json!({"enabled": false, "sizes": [], "next_map": {}}));
        node["state"]["player_invested"] = json!(2.0);
        let report = validate_value(&tree_with(node)).unwrap();
        assert!(!report.passed);
        assert!(matches!(report.errors[0], Finding::NegativeToCall { .. }));
    }

    #[test]
    fn malformed_roots_are_fatal() {
        assert!(matches!(validate_value(&json!([1, 2])), Err(TreeError::MalformedTree(_))));
        assert!(matches!(validate_value(&json!({"version": "3"})), Err(TreeError::MalformedTree(_))));
        assert!(matches!(
            validate_value(&json!({"nodes": []})),
            Err(TreeError::MalformedTree(_))
        ));
    }

    #[test]
    fn thresholds_default_without_config() {
        let tree = json!({"nodes": {}});
        let validator = Validator::new(&tree).unwrap();
        assert_eq!(validator.commit_threshold, DEFAULT_COMMIT_THRESHOLD);
        assert_eq!(validator.sb + validator.bb, 1.5);
    }

    #[test]
    fn exit_codes() {
        let report = ValidationReport {
            passed: false,
            errors: vec![Finding::MissingPlayer { node: "x".into() }],
            warnings: vec![],
            stats: TreeStats::default(),
        };
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.error_messages(), vec!["Node 'x' missing 'player' field"]);
    }
}
