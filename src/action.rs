//! The five-action vocabulary and the generic action synthesizer.
//!
//! Every decision node carries all five kinds. An impossible action is
//! present with `enabled: false` rather than omitted.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::node_id::NodeId;
use crate::sizing::{Situation, SizingResolver};
use crate::state::{round_to, BettingState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Fold,
        ActionKind::Check,
        ActionKind::Call,
        ActionKind::Raise,
        ActionKind::AllIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Raise => "raise",
            ActionKind::AllIn => "allin",
        }
    }

    pub fn from_str(s: &str) -> Option<ActionKind> {
        ActionKind::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fold or check: no amount attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainAction {
    pub enabled: bool,
    pub next: Option<String>,
}

/// Call or all-in: a single amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedAction {
    pub enabled: bool,
    pub size: f64,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaiseAction {
    pub enabled: bool,
    pub sizes: Vec<f64>,
    /// Raise size (as its key string) to successor node.
    pub next_map: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    pub fold: PlainAction,
    pub check: PlainAction,
    pub call: SizedAction,
    pub raise: RaiseAction,
    pub allin: SizedAction,
}

impl Actions {
    pub fn is_enabled(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Fold => self.fold.enabled,
            ActionKind::Check => self.check.enabled,
            ActionKind::Call => self.call.enabled,
            ActionKind::Raise => self.raise.enabled,
            ActionKind::AllIn => self.allin.enabled,
        }
    }

    pub fn adjust(mut self, adjustment: Adjustment) -> Self {
        adjustment.apply(&mut self);
        self
    }
}

/// Successor of each action, as typed identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Successors {
    pub fold: Option<NodeId>,
    pub check: Option<NodeId>,
    pub call: Option<NodeId>,
    /// Every size of the situation's table raises into this node.
    pub raise: Option<NodeId>,
    pub allin: Option<NodeId>,
}

impl Successors {
    pub fn targets(&self) -> impl Iterator<Item = NodeId> {
        [self.fold, self.check, self.call, self.raise, self.allin]
            .into_iter()
            .flatten()
    }
}

/// Situation-specific overrides applied right after generic synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Unopened pot: folding passes the action on, nobody may check, and
    /// limping is not modeled.
    Opening,
    /// Facing a shove: only fold or call.
    FacingAllIn,
    /// Facing a 4-bet: the only re-raise is the all-in.
    FacingFourBet,
    /// Big blind after a small blind limp: check or raise only.
    LimpedBigBlind,
}

impl Adjustment {
    pub fn apply(&self, actions: &mut Actions) {
        match self {
            Adjustment::Opening => {
                actions.fold.enabled = true;
                actions.check.enabled = false;
                actions.call.enabled = false;
            }
            Adjustment::FacingAllIn => {
                actions.check.enabled = false;
                actions.raise.enabled = false;
                actions.raise.sizes.clear();
                actions.allin.enabled = false;
            }
            Adjustment::FacingFourBet => {
                actions.raise.enabled = false;
                actions.raise.sizes.clear();
            }
            Adjustment::LimpedBigBlind => {
                actions.fold.enabled = false;
                actions.check.enabled = true;
                actions.call.enabled = false;
            }
        }
    }
}

/// Key under which a raise size appears in `next_map`.
pub fn size_key(size: f64) -> String {
    format!("{:?}", size)
}

/// Builds the five generic action entries for a node.
pub struct ActionSynthesizer<'a> {
    config: &'a GeneratorConfig,
    sizing: SizingResolver<'a>,
}

impl<'a> ActionSynthesizer<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        ActionSynthesizer {
            config,
            sizing: SizingResolver::new(config),
        }
    }

    pub fn sizing(&self) -> &SizingResolver<'a> {
        &self.sizing
    }

    /// Smallest legal raise-to: a multiple of the bet faced, or two big
    /// blinds into an empty pot.
    pub fn min_raise(&self, state: &BettingState) -> f64 {
        if state.facing_bet > 0.0 {
            state.facing_bet * self.config.min_raise_multiplier()
        } else {
            self.config.bb() * 2.0
        }
    }

    pub fn can_raise(&self, state: &BettingState) -> bool {
        state.remaining() >= self.min_raise(state)
            && state.committed_ratio() < self.config.commit_threshold()
    }

    pub fn synthesize(
        &self,
        state: &BettingState,
        situation: Situation,
        next: &Successors,
    ) -> Actions {
        let name = |id: Option<NodeId>| id.map(|n| n.name());
        let to_call = state.to_call();

        let fold = PlainAction {
            enabled: state.facing_bet > state.player_invested,
            next: name(next.fold),
        };

        let check = PlainAction {
            enabled: state.facing_bet == state.player_invested,
            next: name(next.check),
        };

        let call = SizedAction {
            enabled: to_call > 0.0,
            size: if to_call > 0.0 { round_to(to_call, 2) } else { 0.0 },
            next: name(next.call),
        };

        let table = self.sizing.resolve(situation);
        let remaining = state.remaining();
        let permitted = self.can_raise(state);
        let affordable: Vec<f64> = table.iter().copied().filter(|s| *s <= remaining).collect();
        let next_map = match next.raise {
            Some(target) => table
                .iter()
                .map(|s| (size_key(*s), target.name()))
                .collect(),
            None => BTreeMap::new(),
        };
        let raise = RaiseAction {
            enabled: permitted && !affordable.is_empty(),
            sizes: if permitted { affordable } else { Vec::new() },
            next_map,
        };

        let allin_size = round_to(remaining, 2);
        let allin = SizedAction {
            enabled: allin_size > state.facing_bet,
            size: allin_size,
            next: name(next.allin),
        };

        Actions {
            fold,
            check,
            call,
            raise,
            allin,
        }
    }
}
