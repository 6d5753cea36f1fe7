//! Typed node identifiers.
//!
//! Each betting line maps to exactly one identifier, and `Display` renders the
//! persisted node name. Names depend only on the line, so they stay stable
//! across regenerations.

use std::fmt;

use crate::position::Position;

/// Hand-enumerated spots of the small blind vs big blind subgame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlindSpot {
    SbOpen,
    BbVsSbOpen,
    SbVsBb3Bet,
    BbVsSb4Bet,
    SbLimpBbAction,
    SbVsBbRaiseAfterLimp,
    BbVsSb3BetAfterLimp,
}

impl BlindSpot {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlindSpot::SbOpen => "sb_open",
            BlindSpot::BbVsSbOpen => "bb_vs_sb_open",
            BlindSpot::SbVsBb3Bet => "sb_vs_bb_3bet",
            BlindSpot::BbVsSb4Bet => "bb_vs_sb_4bet",
            BlindSpot::SbLimpBbAction => "sb_limp_bb_action",
            BlindSpot::SbVsBbRaiseAfterLimp => "sb_vs_bb_raise_after_limp",
            BlindSpot::BbVsSb3BetAfterLimp => "bb_vs_sb_3bet_after_limp",
        }
    }
}

/// Betting round an all-in was made in, when the name needs to say so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Round {
    ThreeBet,
    FourBet,
    Limp,
    Raise,
}

impl Round {
    fn suffix(&self) -> &'static str {
        match self {
            Round::ThreeBet => "3bet",
            Round::FourBet => "4bet",
            Round::Limp => "limp",
            Round::Raise => "raise",
        }
    }
}

/// How a line reached the flop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlopLine {
    Call,
    ThreeBetCall,
    FourBetCall,
    Limp,
    RaiseCall,
}

impl FlopLine {
    fn label(&self) -> &'static str {
        match self {
            FlopLine::Call => "call",
            FlopLine::ThreeBetCall => "3bet_call",
            FlopLine::FourBetCall => "4bet_call",
            FlopLine::Limp => "limp",
            FlopLine::RaiseCall => "raise_call",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    /// Unopened pot, `opener` to act.
    Open(Position),
    /// Small blind facing the big blind after the button folds.
    SbCompletes,
    /// Seat `next` acting after `limper` limped.
    Limp { limper: Position, next: Position },
    VsOpen { opener: Position, responder: Position },
    /// The opener facing a 3-bet.
    Vs3Bet { opener: Position, three_bettor: Position },
    /// The 3-bettor facing a 4-bet.
    Vs4Bet { opener: Position, three_bettor: Position },
    Blind(BlindSpot),
    FacingAllIn {
        aggressor: Position,
        responder: Option<Position>,
        round: Option<Round>,
    },
    Wins(Position),
    Showdown,
    /// Hand-off to postflop play.
    Flop { first: Position, second: Position, line: FlopLine },
}

impl NodeId {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeId::Wins(_) | NodeId::Showdown | NodeId::Flop { .. })
    }

    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn facing_allin(aggressor: Position, responder: Position) -> NodeId {
        NodeId::FacingAllIn {
            aggressor,
            responder: Some(responder),
            round: None,
        }
    }

    pub fn facing_allin_in(aggressor: Position, responder: Position, round: Round) -> NodeId {
        NodeId::FacingAllIn {
            aggressor,
            responder: Some(responder),
            round: Some(round),
        }
    }

    pub fn flop(first: Position, second: Position, line: FlopLine) -> NodeId {
        NodeId::Flop { first, second, line }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Open(p) => write!(f, "open_{}", p.slug()),
            NodeId::SbCompletes => write!(f, "sb_completes_or_folds"),
            NodeId::Limp { limper, next } => write!(f, "vs_{}_limp_{}", limper.slug(), next.slug()),
            NodeId::VsOpen { opener, responder } => {
                write!(f, "vs_{}_open_{}", opener.slug(), responder.slug())
            }
            NodeId::Vs3Bet { opener, three_bettor } => {
                write!(f, "vs_{}_3bet_{}", three_bettor.slug(), opener.slug())
            }
            NodeId::Vs4Bet { opener, three_bettor } => {
                write!(f, "vs_{}_4bet_{}", opener.slug(), three_bettor.slug())
            }
            NodeId::Blind(spot) => write!(f, "{}", spot.as_str()),
            NodeId::FacingAllIn {
                aggressor,
                responder,
                round,
            } => {
                write!(f, "facing_{}_allin", aggressor.slug())?;
                if let Some(r) = responder {
                    write!(f, "_{}", r.slug())?;
                }
                if let Some(r) = round {
                    write!(f, "_{}", r.suffix())?;
                }
                Ok(())
            }
            NodeId::Wins(p) => write!(f, "{}_wins", p.slug()),
            NodeId::Showdown => write!(f, "showdown"),
            NodeId::Flop { first, second, line } => {
                write!(f, "{}_vs_{}_{}_flop", first.slug(), second.slug(), line.label())
            }
        }
    }
}
