//! Preflop action-tree generation.
//!
//! The tree is assembled by a fixed sequence of passes, each enumerating one
//! family of betting lines:
//!
//! ```text
//! open_<p>            first in, p = UTG..SB
//!  └─ raise → vs_<opener>_open_<responder>
//!       └─ raise → vs_<3bettor>_3bet_<opener>
//!            └─ raise → vs_<opener>_4bet_<3bettor>   (no further raise map)
//! sb_open / bb_vs_sb_open / sb_vs_bb_3bet / bb_vs_sb_4bet
//! sb_limp_bb_action / sb_vs_bb_raise_after_limp
//! facing_<aggressor>_allin_<responder>[_<round>]   fold/call stubs
//! showdown, <p>_wins, <a>_vs_<b>_<line>_flop      terminals
//! ```
//!
//! Successors are recorded as [`NodeId`]s while building; names that no pass
//! produced are reported as forward references once the terminal pass ran.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::action::{ActionSynthesizer, Actions, Adjustment, Successors};
use crate::config::GeneratorConfig;
use crate::node::{
    DecisionNode, GameTree, Node, SizingDefaults, TerminalNode, TreeConfig, TREE_FORMAT,
    TREE_VERSION,
};
use crate::node_id::{BlindSpot, FlopLine, NodeId, Round};
use crate::position::Position;
use crate::sizing::{Situation, SizingKey};
use crate::state::BettingState;

/// Shove scenarios that get a fold/call stub: (aggressor, responder, round).
const ALLIN_STUBS: [(Position, Position, Option<Round>); 4] = [
    (Position::SB, Position::BB, None),
    (Position::BB, Position::SB, None),
    (Position::BB, Position::SB, Some(Round::ThreeBet)),
    (Position::SB, Position::BB, Some(Round::ThreeBet)),
];

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub tree: GameTree,
    /// Successor names with no node behind them, sorted.
    pub forward_refs: Vec<String>,
}

/// Owns the node map while the passes run.
struct TreeBuilder {
    nodes: BTreeMap<String, Node>,
    referenced: BTreeSet<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        TreeBuilder {
            nodes: BTreeMap::new(),
            referenced: BTreeSet::new(),
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn decision(
        &mut self,
        id: NodeId,
        player: Position,
        state: &BettingState,
        actions: Actions,
        next: &Successors,
    ) {
        self.referenced.extend(next.targets());
        self.nodes.insert(
            id.name(),
            Node::Decision(DecisionNode {
                player,
                state: state.snapshot(),
                actions,
            }),
        );
    }

    /// Inserts a terminal unless the name is already taken.
    fn terminal(&mut self, id: NodeId) -> bool {
        let name = id.name();
        if self.nodes.contains_key(&name) {
            return false;
        }
        self.nodes.insert(name.clone(), Node::Terminal(TerminalNode::new(name)));
        true
    }

    fn finish(self, config: TreeConfig) -> Generated {
        let forward_refs: Vec<String> = self
            .referenced
            .iter()
            .map(NodeId::name)
            .filter(|name| !self.nodes.contains_key(name))
            .sorted()
            .dedup()
            .collect();
        for name in &forward_refs {
            log::debug!("{:<32}{}", "forward reference", name);
        }
        Generated {
            tree: GameTree {
                version: TREE_VERSION.to_string(),
                format: TREE_FORMAT.to_string(),
                config,
                nodes: self.nodes,
            },
            forward_refs,
        }
    }
}

pub struct TreeGenerator<'a> {
    config: &'a GeneratorConfig,
    synth: ActionSynthesizer<'a>,
}

impl<'a> TreeGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        TreeGenerator {
            config,
            synth: ActionSynthesizer::new(config),
        }
    }

    pub fn generate(&self) -> Generated {
        let mut builder = TreeBuilder::new();

        let passes: [(&str, fn(&Self, &mut TreeBuilder)); 7] = [
            ("opening pass", Self::opening_pass),
            ("facing-open pass", Self::facing_open_pass),
            ("facing-3bet pass", Self::facing_3bet_pass),
            ("facing-4bet pass", Self::facing_4bet_pass),
            ("blind-battle pass", Self::blind_battle_pass),
            ("facing-allin pass", Self::facing_allin_pass),
            ("terminal pass", Self::terminal_pass),
        ];
        for (label, pass) in passes {
            let before = builder.len();
            pass(self, &mut builder);
            log::info!("{:<32}{:>4} nodes", label, builder.len() - before);
        }

        builder.finish(self.tree_config())
    }

    fn stack(&self) -> f64 {
        self.config.stack()
    }

    fn blinds(&self) -> f64 {
        self.config.sb() + self.config.bb()
    }

    fn primary(&self, situation: Situation) -> f64 {
        self.synth.sizing().primary(situation)
    }

    fn add(
        &self,
        builder: &mut TreeBuilder,
        id: NodeId,
        player: Position,
        state: BettingState,
        situation: Situation,
        next: Successors,
        adjustment: Option<Adjustment>,
    ) {
        let mut actions = self.synth.synthesize(&state, situation, &next);
        if let Some(adjustment) = adjustment {
            actions = actions.adjust(adjustment);
        }
        builder.decision(id, player, &state, actions, &next);
    }

    /// First-in decisions for every seat but the big blind.
    fn opening_pass(&self, builder: &mut TreeBuilder) {
        let (sb, bb) = (self.config.sb(), self.config.bb());
        for opener in Position::openers() {
            let Some(next) = opener.next() else { continue };
            let state = BettingState::new(self.blinds(), bb, opener.posted_blind(sb, bb), self.stack());

            let successors = Successors {
                fold: Some(if opener == Position::SB {
                    NodeId::SbCompletes
                } else {
                    NodeId::Open(next)
                }),
                check: None,
                call: (opener != Position::SB).then_some(NodeId::Limp { limper: opener, next }),
                raise: Some(NodeId::VsOpen {
                    opener,
                    responder: next,
                }),
                allin: Some(NodeId::FacingAllIn {
                    aggressor: opener,
                    responder: None,
                    round: None,
                }),
            };

            self.add(
                builder,
                NodeId::Open(opener),
                opener,
                state,
                Situation::Rfi,
                successors,
                Some(Adjustment::Opening),
            );
        }
    }

    /// Every later seat responding to a single open.
    fn facing_open_pass(&self, builder: &mut TreeBuilder) {
        let (sb, bb) = (self.config.sb(), self.config.bb());
        let rfi = self.primary(Situation::Rfi);

        for (opener, responder) in opener_pairs() {
            let state = BettingState::new(
                self.blinds() + rfi,
                rfi,
                responder.posted_blind(sb, bb),
                self.stack(),
            );

            let passed_to = responder.next().filter(|_| !responder.closes_action());
            let successors = Successors {
                fold: Some(match passed_to {
                    Some(next) => NodeId::VsOpen { opener, responder: next },
                    None => NodeId::Wins(opener),
                }),
                check: None,
                call: Some(match passed_to {
                    Some(next) => NodeId::VsOpen { opener, responder: next },
                    None => NodeId::flop(opener, responder, FlopLine::Call),
                }),
                raise: Some(NodeId::Vs3Bet {
                    opener,
                    three_bettor: responder,
                }),
                allin: Some(NodeId::facing_allin(responder, opener)),
            };

            self.add(
                builder,
                NodeId::VsOpen { opener, responder },
                responder,
                state,
                Situation::ThreeBet { raiser: opener },
                successors,
                None,
            );
        }
    }

    /// The opener facing a 3-bet.
    fn facing_3bet_pass(&self, builder: &mut TreeBuilder) {
        let rfi = self.primary(Situation::Rfi);

        for (opener, three_bettor) in opener_pairs() {
            let three_bet = self.primary(Situation::ThreeBet { raiser: opener });
            let state = BettingState::new(
                self.blinds() + rfi + three_bet,
                three_bet,
                rfi,
                self.stack(),
            );

            let successors = Successors {
                fold: Some(NodeId::Wins(three_bettor)),
                check: None,
                call: Some(NodeId::flop(opener, three_bettor, FlopLine::Call)),
                raise: Some(NodeId::Vs4Bet { opener, three_bettor }),
                allin: Some(NodeId::facing_allin(opener, three_bettor)),
            };

            self.add(
                builder,
                NodeId::Vs3Bet { opener, three_bettor },
                opener,
                state,
                Situation::FourBet,
                successors,
                None,
            );
        }
    }

    /// The 3-bettor facing a 4-bet. A fifth raise exists only as the all-in.
    fn facing_4bet_pass(&self, builder: &mut TreeBuilder) {
        let rfi = self.primary(Situation::Rfi);
        let four_bet = self.primary(Situation::FourBet);

        for (opener, three_bettor) in opener_pairs() {
            let three_bet = self.primary(Situation::ThreeBet { raiser: opener });
            let state = BettingState::new(
                self.blinds() + rfi + three_bet + four_bet,
                four_bet,
                three_bet,
                self.stack(),
            );

            let successors = Successors {
                fold: Some(NodeId::Wins(opener)),
                check: None,
                call: Some(NodeId::flop(opener, three_bettor, FlopLine::FourBetCall)),
                raise: None,
                allin: Some(NodeId::facing_allin_in(three_bettor, opener, Round::FourBet)),
            };

            self.add(
                builder,
                NodeId::Vs4Bet { opener, three_bettor },
                three_bettor,
                state,
                Situation::FiveBet,
                successors,
                Some(Adjustment::FacingFourBet),
            );
        }
    }

    /// Small blind vs big blind once everyone else folded.
    fn blind_battle_pass(&self, builder: &mut TreeBuilder) {
        use Position::{BB, SB};

        let (sb, bb) = (self.config.sb(), self.config.bb());
        let stack = self.stack();
        let blinds = self.blinds();

        let sb_raise = self.primary(Situation::Rfi);
        let bb_three_bet = self.primary(Situation::ThreeBet { raiser: SB });
        let sb_four_bet = self.primary(Situation::SbVsBb3Bet);
        let bb_raise_vs_limp = self.primary(Situation::BbVsSbLimp);

        self.add(
            builder,
            NodeId::Blind(BlindSpot::SbOpen),
            SB,
            BettingState::new(blinds, bb, sb, stack),
            Situation::Rfi,
            Successors {
                fold: Some(NodeId::Wins(BB)),
                check: None,
                call: Some(NodeId::Blind(BlindSpot::SbLimpBbAction)),
                raise: Some(NodeId::Blind(BlindSpot::BbVsSbOpen)),
                allin: Some(NodeId::facing_allin(SB, BB)),
            },
            None,
        );

        self.add(
            builder,
            NodeId::Blind(BlindSpot::BbVsSbOpen),
            BB,
            BettingState::new(blinds + sb_raise, sb_raise, bb, stack),
            Situation::ThreeBet { raiser: SB },
            Successors {
                fold: Some(NodeId::Wins(SB)),
                check: None,
                call: Some(NodeId::flop(SB, BB, FlopLine::Call)),
                raise: Some(NodeId::Blind(BlindSpot::SbVsBb3Bet)),
                allin: Some(NodeId::facing_allin(BB, SB)),
            },
            None,
        );

        self.add(
            builder,
            NodeId::Blind(BlindSpot::SbVsBb3Bet),
            SB,
            BettingState::new(blinds + sb_raise + bb_three_bet, bb_three_bet, sb_raise, stack),
            Situation::SbVsBb3Bet,
            Successors {
                fold: Some(NodeId::Wins(BB)),
                check: None,
                call: Some(NodeId::flop(SB, BB, FlopLine::ThreeBetCall)),
                raise: Some(NodeId::Blind(BlindSpot::BbVsSb4Bet)),
                allin: Some(NodeId::facing_allin_in(SB, BB, Round::ThreeBet)),
            },
            None,
        );

        self.add(
            builder,
            NodeId::Blind(BlindSpot::BbVsSb4Bet),
            BB,
            BettingState::new(
                blinds + sb_raise + bb_three_bet + sb_four_bet,
                sb_four_bet,
                bb_three_bet,
                stack,
            ),
            Situation::FiveBet,
            Successors {
                fold: Some(NodeId::Wins(SB)),
                check: None,
                call: Some(NodeId::flop(SB, BB, FlopLine::FourBetCall)),
                raise: None,
                allin: Some(NodeId::facing_allin_in(BB, SB, Round::FourBet)),
            },
            Some(Adjustment::FacingFourBet),
        );

        // Limped pot: nothing to call, the big blind checks or raises.
        self.add(
            builder,
            NodeId::Blind(BlindSpot::SbLimpBbAction),
            BB,
            BettingState::new(blinds, bb, bb, stack),
            Situation::BbVsSbLimp,
            Successors {
                fold: None,
                check: Some(NodeId::flop(SB, BB, FlopLine::Limp)),
                call: None,
                raise: Some(NodeId::Blind(BlindSpot::SbVsBbRaiseAfterLimp)),
                allin: Some(NodeId::facing_allin_in(BB, SB, Round::Limp)),
            },
            Some(Adjustment::LimpedBigBlind),
        );

        self.add(
            builder,
            NodeId::Blind(BlindSpot::SbVsBbRaiseAfterLimp),
            SB,
            BettingState::new(bb + bb + bb_raise_vs_limp, bb_raise_vs_limp, bb, stack),
            Situation::SbVsBb3Bet,
            Successors {
                fold: Some(NodeId::Wins(BB)),
                check: None,
                call: Some(NodeId::flop(SB, BB, FlopLine::RaiseCall)),
                raise: Some(NodeId::Blind(BlindSpot::BbVsSb3BetAfterLimp)),
                allin: Some(NodeId::facing_allin_in(SB, BB, Round::Raise)),
            },
            None,
        );
    }

    /// Fold/call stubs for a shove. The state is simplified: the responder is
    /// treated as having nothing invested and facing a full stack.
    fn facing_allin_pass(&self, builder: &mut TreeBuilder) {
        let stack = self.stack();
        for (aggressor, responder, round) in ALLIN_STUBS {
            let id = NodeId::FacingAllIn {
                aggressor,
                responder: Some(responder),
                round,
            };
            self.add(
                builder,
                id,
                responder,
                BettingState::new(stack + stack, stack, 0.0, stack),
                Situation::FacingAllIn,
                Successors {
                    fold: Some(NodeId::Wins(aggressor)),
                    call: Some(NodeId::Showdown),
                    ..Default::default()
                },
                Some(Adjustment::FacingAllIn),
            );
        }
    }

    /// Outcome leaves. Runs last so every referenced outcome is known.
    fn terminal_pass(&self, builder: &mut TreeBuilder) {
        let referenced: Vec<NodeId> = builder
            .referenced
            .iter()
            .copied()
            .filter(NodeId::is_terminal)
            .collect();

        let fixed = std::iter::once(NodeId::Showdown).chain(Position::ALL.into_iter().map(NodeId::Wins));
        for id in fixed.chain(referenced) {
            builder.terminal(id);
        }
    }

    fn tree_config(&self) -> TreeConfig {
        let sizing = self.synth.sizing();
        TreeConfig {
            seats: Position::ALL.len(),
            stack: self.config.stack(),
            sb: self.config.sb(),
            bb: self.config.bb(),
            positions: Position::ALL.iter().map(|p| p.as_str().to_string()).collect(),
            defaults: SizingDefaults {
                rfi_sizes: sizing.table(SizingKey::Rfi),
                three_bet_sizes: sizing.table(SizingKey::ThreeBetVsEp),
                four_bet_sizes: sizing.table(SizingKey::FourBet),
                allin_threshold: self.config.commit_threshold(),
            },
        }
    }
}

/// Every (opener, later seat) pair in acting order.
fn opener_pairs() -> impl Iterator<Item = (Position, Position)> {
    Position::openers().flat_map(|opener| opener.later().map(move |later| (opener, later)))
}

/// Generates the full tree for a configuration.
pub fn generate_tree(config: &GeneratorConfig) -> GameTree {
    TreeGenerator::new(config).generate().tree
}
