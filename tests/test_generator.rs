use approx::assert_relative_eq;
use preflop_tree::action::ActionKind;
use preflop_tree::node::Node;
use preflop_tree::node_id::NodeId;
use preflop_tree::position::Position;
use preflop_tree::sizing::SizingKey;
use preflop_tree::{generate_tree, GameTree, GeneratorConfig, TreeGenerator};

fn default_tree() -> GameTree {
    generate_tree(&GeneratorConfig::default())
}

fn short_stack_tree() -> GameTree {
    let mut config = GeneratorConfig::default();
    config.config.stack = 20.0;
    generate_tree(&config)
}

#[test]
fn test_every_decision_node_has_the_five_kinds() {
    let value = default_tree().to_value().unwrap();
    let nodes = value["nodes"].as_object().unwrap();
    for (name, node) in nodes {
        if node.get("type").is_some() {
            continue;
        }
        let actions = node["actions"].as_object().unwrap();
        assert_eq!(actions.len(), 5, "{}", name);
        for kind in ActionKind::ALL {
            assert!(actions.contains_key(kind.as_str()), "{} missing {}", name, kind);
        }
    }
}

#[test]
fn test_committed_players_cannot_raise() {
    for tree in [default_tree(), short_stack_tree()] {
        let threshold = tree.config.defaults.allin_threshold;
        for (name, node) in tree.decisions() {
            if node.state.committed_ratio > threshold {
                assert!(!node.actions.raise.enabled, "{}", name);
            }
        }
    }
}

#[test]
fn test_short_stack_disables_raises_facing_4bet() {
    let tree = short_stack_tree();
    let node = tree.decision("vs_utg_4bet_utg1").unwrap();
    assert_relative_eq!(node.state.committed_ratio, 0.345);
    assert!(!node.actions.raise.enabled);
    assert!(node.actions.raise.sizes.is_empty());
}

#[test]
fn test_enabled_raises_fit_the_stack() {
    for tree in [default_tree(), short_stack_tree()] {
        for (name, node) in tree.decisions() {
            let raise = &node.actions.raise;
            if !raise.enabled {
                continue;
            }
            assert!(!raise.sizes.is_empty(), "{}", name);
            let remaining = node.state.effective_stack - node.state.player_invested;
            assert!(raise.sizes.iter().all(|s| *s <= remaining + 1e-9), "{}", name);
        }
    }
}

#[test]
fn test_regeneration_is_identical() {
    let config = GeneratorConfig::default();
    let a = generate_tree(&config);
    let b = generate_tree(&config);
    assert_eq!(a, b);
    assert_eq!(a.to_json(false).unwrap(), b.to_json(false).unwrap());
}

#[test]
fn test_persisted_tree_parses_back() {
    let tree = default_tree();
    let json = tree.to_json(true).unwrap();
    let parsed: GameTree = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, tree);
}

#[test]
fn test_no_negative_to_call() {
    for (name, node) in default_tree().decisions() {
        assert!(node.state.to_call() >= 0.0, "{}", name);
    }
}

#[test]
fn test_utg_open_scenario() {
    let tree = default_tree();
    let node = tree.decision("open_utg").unwrap();
    assert_eq!(node.player, Position::UTG);
    assert_relative_eq!(node.state.pot, 1.5);
    assert_relative_eq!(node.state.facing_bet, 1.0);
    assert_relative_eq!(node.state.player_invested, 0.0);
    assert!(node.actions.fold.enabled);
    assert_eq!(node.actions.fold.next.as_deref(), Some("open_utg1"));
    assert!(!node.actions.check.enabled);
    assert!(!node.actions.call.enabled);
    assert!(node.actions.raise.enabled);
    assert_eq!(node.actions.raise.sizes, vec![2.3]);
    assert_eq!(
        node.actions.raise.next_map.get("2.3").map(String::as_str),
        Some("vs_utg_open_utg1")
    );
    assert!(node.actions.allin.enabled);
}

#[test]
fn test_small_blind_open_folds_to_completion_stub() {
    let tree = default_tree();
    let node = tree.decision("open_sb").unwrap();
    assert_relative_eq!(node.state.player_invested, 0.5);
    assert_eq!(node.actions.fold.next.as_deref(), Some("sb_completes_or_folds"));
    assert_eq!(node.actions.call.next, None);
    assert_eq!(
        tree.decision("open_btn").unwrap().actions.fold.next.as_deref(),
        Some("open_sb")
    );
}

#[test]
fn test_big_blind_closes_facing_open() {
    let tree = default_tree();
    let node = tree.decision("vs_utg_open_bb").unwrap();
    let call_next = node.actions.call.next.as_deref().unwrap();
    assert_eq!(call_next, "utg_vs_bb_call_flop");
    assert!(tree.node(call_next).map(Node::is_terminal).unwrap());
    assert_eq!(node.actions.fold.next.as_deref(), Some("utg_wins"));
    assert!(tree.node("utg_wins").map(Node::is_terminal).unwrap());
    assert_relative_eq!(node.state.player_invested, 1.0);
    assert_relative_eq!(node.state.pot, 3.8);
}

#[test]
fn test_facing_open_chains_to_next_seat() {
    let tree = default_tree();
    let node = tree.decision("vs_co_open_btn").unwrap();
    assert_eq!(node.actions.fold.next.as_deref(), Some("vs_co_open_sb"));
    assert_eq!(node.actions.call.next.as_deref(), Some("vs_co_open_sb"));
    assert_eq!(node.actions.raise.sizes, vec![6.9, 9.2]);
    assert_eq!(
        node.actions.raise.next_map.get("9.2").map(String::as_str),
        Some("vs_btn_3bet_co")
    );
    assert_eq!(node.actions.allin.next.as_deref(), Some("facing_btn_allin_co"));
}

#[test]
fn test_facing_3bet_state() {
    let tree = default_tree();
    let node = tree.decision("vs_btn_3bet_utg").unwrap();
    assert_eq!(node.player, Position::UTG);
    assert_relative_eq!(node.state.pot, 10.7);
    assert_relative_eq!(node.state.facing_bet, 6.9);
    assert_relative_eq!(node.state.player_invested, 2.3);
    assert_eq!(node.actions.raise.sizes, vec![16.0, 17.0]);
    assert_eq!(node.actions.fold.next.as_deref(), Some("btn_wins"));
    assert_eq!(node.actions.call.next.as_deref(), Some("utg_vs_btn_call_flop"));
}

#[test]
fn test_facing_4bet_has_no_raise_map() {
    let tree = default_tree();
    let mut seen = 0;
    for (name, node) in tree.decisions().filter(|(n, _)| n.contains("_4bet")) {
        seen += 1;
        assert!(node.actions.raise.next_map.is_empty(), "{}", name);
        // A fifth raise is only ever the all-in.
        assert!(!node.actions.raise.enabled, "{}", name);
        assert!(node.actions.raise.sizes.is_empty(), "{}", name);
        let remaining = node.state.effective_stack - node.state.player_invested;
        if remaining > node.state.facing_bet {
            assert!(node.actions.allin.enabled, "{}", name);
        }
    }
    // 28 position pairs plus the blind-battle 4-bet.
    assert_eq!(seen, 29);
}

#[test]
fn test_limped_big_blind_checks_or_raises() {
    let tree = default_tree();
    let node = tree.decision("sb_limp_bb_action").unwrap();
    let a = &node.actions;
    assert!(!a.fold.enabled);
    assert!(a.check.enabled);
    assert!(!a.call.enabled);
    assert!(a.raise.enabled);
    assert_eq!(a.raise.sizes, vec![3.5, 6.0]);
    assert_eq!(a.check.next.as_deref(), Some("sb_vs_bb_limp_flop"));
}

#[test]
fn test_blind_battle_three_bet_uses_blind_table() {
    let tree = default_tree();
    let bb = tree.decision("bb_vs_sb_open").unwrap();
    assert_eq!(bb.actions.raise.sizes, vec![9.2, 10.0]);
    assert_eq!(
        bb.actions.raise.next_map.get("10.0").map(String::as_str),
        Some("sb_vs_bb_3bet")
    );
    let sb = tree.decision("sb_vs_bb_3bet").unwrap();
    assert_relative_eq!(sb.state.facing_bet, 9.2);
    assert_relative_eq!(sb.state.player_invested, 2.3);
    assert_relative_eq!(sb.state.pot, 13.0);
}

#[test]
fn test_allin_stubs_only_fold_or_call() {
    let tree = default_tree();
    for name in [
        "facing_sb_allin_bb",
        "facing_bb_allin_sb",
        "facing_bb_allin_sb_3bet",
        "facing_sb_allin_bb_3bet",
    ] {
        let node = tree.decision(name).unwrap();
        let a = &node.actions;
        assert!(a.fold.enabled && a.call.enabled, "{}", name);
        assert!(!a.check.enabled && !a.raise.enabled && !a.allin.enabled, "{}", name);
        assert!(a.raise.sizes.is_empty());
        assert_eq!(a.call.next.as_deref(), Some("showdown"));
        assert_relative_eq!(node.state.player_invested, 0.0);
        assert_relative_eq!(node.state.pot, 100.0);
    }
}

#[test]
fn test_config_echo() {
    let tree = default_tree();
    assert_eq!(tree.version, "3.0.0");
    assert_eq!(tree.format, "generic_state_machine");
    assert_eq!(tree.config.seats, 8);
    assert_eq!(tree.config.positions.len(), 8);
    assert_eq!(tree.config.positions[0], "UTG");
    assert_eq!(tree.config.defaults.rfi_sizes, vec![2.3]);
    assert_eq!(tree.config.defaults.three_bet_sizes, vec![6.9]);
    assert_eq!(tree.config.defaults.four_bet_sizes, vec![16.0, 17.0]);
    assert_relative_eq!(tree.config.defaults.allin_threshold, 0.3);
}

#[test]
fn test_missing_tables_do_not_change_the_default_tree() {
    let bare = GeneratorConfig::default().without_sizing();
    assert_eq!(generate_tree(&bare).nodes, default_tree().nodes);
}

#[test]
fn test_custom_rfi_size_flows_into_keys_and_pots() {
    let config = GeneratorConfig::default().with_sizing(SizingKey::Rfi, vec![2.5, 3.0]);
    let tree = generate_tree(&config);
    let open = tree.decision("open_hj").unwrap();
    assert_eq!(open.actions.raise.sizes, vec![2.5, 3.0]);
    assert!(open.actions.raise.next_map.contains_key("3.0"));
    let vs = tree.decision("vs_hj_open_co").unwrap();
    assert_relative_eq!(vs.state.facing_bet, 2.5);
    assert_relative_eq!(vs.state.pot, 4.0);
}

#[test]
fn test_every_forward_ref_is_named_by_a_node_id() {
    let config = GeneratorConfig::default();
    let generated = TreeGenerator::new(&config).generate();
    let limp = NodeId::Limp {
        limper: Position::BTN,
        next: Position::SB,
    };
    assert!(generated.forward_refs.contains(&limp.name()));
    assert!(!generated.forward_refs.iter().any(|r| r.ends_with("_flop")));
}
