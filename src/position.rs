//! The eight fixed seats of a full-ring preflop table, in acting order.

use serde::{Deserialize, Serialize};

/// Seats in preflop acting order. The ordinal is the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    UTG,
    UTG1,
    LJ,
    HJ,
    CO,
    BTN,
    SB,
    BB,
}

/// Coarse seat grouping used to pick 3-bet sizing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionClass {
    Early,
    Middle,
    Late,
    Blind,
}

impl Position {
    pub const ALL: [Position; 8] = [
        Position::UTG,
        Position::UTG1,
        Position::LJ,
        Position::HJ,
        Position::CO,
        Position::BTN,
        Position::SB,
        Position::BB,
    ];

    pub fn index(&self) -> usize {
        match self {
            Position::UTG => 0,
            Position::UTG1 => 1,
            Position::LJ => 2,
            Position::HJ => 3,
            Position::CO => 4,
            Position::BTN => 5,
            Position::SB => 6,
            Position::BB => 7,
        }
    }

    /// The seat acting directly after this one, `None` for the big blind.
    pub fn next(&self) -> Option<Position> {
        Position::ALL.get(self.index() + 1).copied()
    }

    /// Seats acting after this one, in order.
    pub fn later(&self) -> impl Iterator<Item = Position> {
        Position::ALL.into_iter().skip(self.index() + 1)
    }

    /// Every seat that may act first in an unopened pot (all but the big blind).
    pub fn openers() -> impl Iterator<Item = Position> {
        Position::ALL.into_iter().filter(|p| !p.closes_action())
    }

    /// The big blind closes an unraised round.
    pub fn closes_action(&self) -> bool {
        *self == Position::BB
    }

    pub fn class(&self) -> PositionClass {
        match self {
            Position::UTG | Position::UTG1 => PositionClass::Early,
            Position::LJ | Position::HJ => PositionClass::Middle,
            Position::CO | Position::BTN => PositionClass::Late,
            Position::SB | Position::BB => PositionClass::Blind,
        }
    }

    /// Returns the blind posted by this seat.
    pub fn posted_blind(&self, sb: f64, bb: f64) -> f64 {
        match self {
            Position::SB => sb,
            Position::BB => bb,
            _ => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::UTG => "UTG",
            Position::UTG1 => "UTG1",
            Position::LJ => "LJ",
            Position::HJ => "HJ",
            Position::CO => "CO",
            Position::BTN => "BTN",
            Position::SB => "SB",
            Position::BB => "BB",
        }
    }

    /// Lower-case form used inside node names.
    pub fn slug(&self) -> &'static str {
        match self {
            Position::UTG => "utg",
            Position::UTG1 => "utg1",
            Position::LJ => "lj",
            Position::HJ => "hj",
            Position::CO => "co",
            Position::BTN => "btn",
            Position::SB => "sb",
            Position::BB => "bb",
        }
    }

    pub fn from_str(s: &str) -> Option<Position> {
        Position::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
