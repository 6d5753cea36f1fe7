use serde::{Deserialize, Serialize};

/// Betting state at a decision node. Built once per node and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BettingState {
    pub pot: f64,
    /// Bet the acting player has to match.
    pub facing_bet: f64,
    /// Chips the acting player has already put in this round.
    pub player_invested: f64,
    pub effective_stack: f64,
}

impl BettingState {
    pub fn new(pot: f64, facing_bet: f64, player_invested: f64, effective_stack: f64) -> Self {
        BettingState {
            pot,
            facing_bet,
            player_invested,
            effective_stack,
        }
    }

    pub fn to_call(&self) -> f64 {
        self.facing_bet - self.player_invested
    }

    /// Share of the stack already invested; 1.0 for an empty stack.
    pub fn committed_ratio(&self) -> f64 {
        if self.effective_stack == 0.0 {
            return 1.0;
        }
        self.player_invested / self.effective_stack
    }

    /// Stack-to-pot ratio; infinite for an empty pot.
    pub fn stack_to_pot(&self) -> f64 {
        if self.pot == 0.0 {
            return f64::INFINITY;
        }
        self.effective_stack / self.pot
    }

    /// Chips still behind after what is already invested.
    pub fn remaining(&self) -> f64 {
        self.effective_stack - self.player_invested
    }

    /// Rounded copy persisted on the node.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            pot: round_to(self.pot, 2),
            facing_bet: round_to(self.facing_bet, 2),
            player_invested: round_to(self.player_invested, 2),
            effective_stack: round_to(self.effective_stack, 2),
            committed_ratio: round_to(self.committed_ratio(), 4),
        }
    }
}

/// Persisted form of a [`BettingState`]: chip amounts to 2 decimals, the
/// commitment ratio to 4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub pot: f64,
    pub facing_bet: f64,
    pub player_invested: f64,
    pub effective_stack: f64,
    pub committed_ratio: f64,
}

impl StateSnapshot {
    pub fn to_call(&self) -> f64 {
        self.facing_bet - self.player_invested
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_values() {
        let s = BettingState::new(10.0, 6.9, 2.3, 50.0);
        assert!((s.to_call() - 4.6).abs() < 1e-9);
        assert!((s.committed_ratio() - 0.046).abs() < 1e-9);
        assert!((s.stack_to_pot() - 5.0).abs() < 1e-9);
        assert!((s.remaining() - 47.7).abs() < 1e-9);
    }

    #[test]
    fn degenerate_denominators() {
        let s = BettingState::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(s.committed_ratio(), 1.0);
        assert!(s.stack_to_pot().is_infinite());
    }

    #[test]
    fn snapshot_rounds() {
        let s = BettingState::new(1.5 + 2.3 + 6.9, 6.9, 2.3, 50.0);
        let snap = s.snapshot();
        assert_eq!(snap.pot, 10.7);
        assert_eq!(snap.committed_ratio, 0.046);

        let s = BettingState::new(1.0 / 3.0, 0.0, 1.0, 3.0);
        let snap = s.snapshot();
        assert_eq!(snap.pot, 0.33);
        assert_eq!(snap.committed_ratio, 0.3333);
    }
}
