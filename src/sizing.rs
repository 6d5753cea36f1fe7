//! Raise-size tables and the situations that select them.
//!
//! Sizes are absolute chip amounts for the raise-to. A table missing from the
//! configuration falls back to a built-in default; resolution never fails.

use crate::config::GeneratorConfig;
use crate::position::{Position, PositionClass};

/// Fallback used for the open-raise table and for any situation without a
/// table of its own.
pub const DEFAULT_RFI_SIZES: &[f64] = &[2.3];

/// Named sizing tables recognised in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizingKey {
    Rfi,
    ThreeBetVsEp,
    ThreeBetVsLp,
    ThreeBetFromBlinds,
    FourBet,
    Squeeze,
    BbVsSbLimp,
    BbVsSbRaise,
    SbVsBb3Bet,
}

impl SizingKey {
    pub const ALL: [SizingKey; 9] = [
        SizingKey::Rfi,
        SizingKey::ThreeBetVsEp,
        SizingKey::ThreeBetVsLp,
        SizingKey::ThreeBetFromBlinds,
        SizingKey::FourBet,
        SizingKey::Squeeze,
        SizingKey::BbVsSbLimp,
        SizingKey::BbVsSbRaise,
        SizingKey::SbVsBb3Bet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizingKey::Rfi => "rfi",
            SizingKey::ThreeBetVsEp => "3bet_vs_ep",
            SizingKey::ThreeBetVsLp => "3bet_vs_lp",
            SizingKey::ThreeBetFromBlinds => "3bet_from_blinds",
            SizingKey::FourBet => "4bet",
            SizingKey::Squeeze => "squeeze",
            SizingKey::BbVsSbLimp => "bb_vs_sb_limp",
            SizingKey::BbVsSbRaise => "bb_vs_sb_raise",
            SizingKey::SbVsBb3Bet => "sb_vs_bb_3bet",
        }
    }

    pub fn from_str(s: &str) -> Option<SizingKey> {
        SizingKey::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn default_sizes(&self) -> &'static [f64] {
        match self {
            SizingKey::Rfi => DEFAULT_RFI_SIZES,
            SizingKey::ThreeBetVsEp => &[6.9],
            SizingKey::ThreeBetVsLp => &[6.9, 9.2],
            SizingKey::ThreeBetFromBlinds => &[9.2, 10.0],
            SizingKey::FourBet => &[16.0, 17.0],
            SizingKey::Squeeze => &[9.2, 10.0],
            SizingKey::BbVsSbLimp => &[3.5, 6.0],
            SizingKey::BbVsSbRaise => &[3.5, 4.0],
            SizingKey::SbVsBb3Bet => &[10.0, 14.0],
        }
    }
}

/// The betting situation a decision node is synthesized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Situation {
    /// First raise into an unopened pot.
    Rfi,
    /// Re-raise over an open; the table depends on who opened.
    ThreeBet { raiser: Position },
    FourBet,
    Squeeze,
    BbVsSbLimp,
    BbVsSbRaise,
    SbVsBb3Bet,
    /// Raising over a 4-bet. Only the all-in is modeled, so no table exists.
    FiveBet,
    FacingAllIn,
}

impl Situation {
    /// The configuration table this situation reads, if it has one.
    pub fn sizing_key(&self) -> Option<SizingKey> {
        match self {
            Situation::Rfi => Some(SizingKey::Rfi),
            Situation::ThreeBet { raiser } => Some(match raiser.class() {
                PositionClass::Early => SizingKey::ThreeBetVsEp,
                PositionClass::Late => SizingKey::ThreeBetVsLp,
                PositionClass::Middle | PositionClass::Blind => SizingKey::ThreeBetFromBlinds,
            }),
            Situation::FourBet => Some(SizingKey::FourBet),
            Situation::Squeeze => Some(SizingKey::Squeeze),
            Situation::BbVsSbLimp => Some(SizingKey::BbVsSbLimp),
            Situation::BbVsSbRaise => Some(SizingKey::BbVsSbRaise),
            Situation::SbVsBb3Bet => Some(SizingKey::SbVsBb3Bet),
            Situation::FiveBet | Situation::FacingAllIn => None,
        }
    }
}

/// Looks up raise sizes for a situation.
pub struct SizingResolver<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> SizingResolver<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        SizingResolver { config }
    }

    pub fn table(&self, key: SizingKey) -> Vec<f64> {
        self.config
            .sizing(key)
            .unwrap_or_else(|| key.default_sizes())
            .to_vec()
    }

    pub fn resolve(&self, situation: Situation) -> Vec<f64> {
        match situation.sizing_key() {
            Some(key) => self.table(key),
            None => DEFAULT_RFI_SIZES.to_vec(),
        }
    }

    /// Leading size of a situation's table, the one carried down the main line.
    pub fn primary(&self, situation: Situation) -> f64 {
        self.resolve(situation)
            .first()
            .copied()
            .unwrap_or(DEFAULT_RFI_SIZES[0])
    }
}
