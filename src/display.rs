use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::action::ActionKind;
use crate::generator::Generated;
use crate::node::DecisionNode;
use crate::validator::ValidationReport;

const RULE_WIDTH: usize = 60;

pub fn styled_action(kind: ActionKind, enabled: bool) -> String {
    let label = kind.as_str().to_uppercase();
    if !enabled {
        return label.dimmed().to_string();
    }
    match kind {
        ActionKind::Raise | ActionKind::AllIn => label.red().bold().to_string(),
        ActionKind::Call => label.green().bold().to_string(),
        ActionKind::Check => label.yellow().bold().to_string(),
        ActionKind::Fold => label.bold().to_string(),
    }
}

fn format_sizes(sizes: &[f64]) -> String {
    sizes
        .iter()
        .map(|s| format!("{}", s))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn generation_summary(generated: &Generated, output: &str) -> String {
    let tree = &generated.tree;
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Metric".bold().to_string()),
        Cell::new("Value").set_alignment(CellAlignment::Right),
    ]);
    let rows = [
        ("Total nodes", tree.nodes.len()),
        ("Action nodes", tree.decision_count()),
        ("Terminal nodes", tree.terminal_count()),
        ("Forward references", generated.forward_refs.len()),
    ];
    for (label, count) in rows {
        table.add_row(vec![
            Cell::new(label.bold().to_string()),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    format!(
        "  Generated game tree v{} -> {}\n{}",
        tree.version,
        output.dimmed(),
        table
    )
}

pub fn node_table(name: &str, node: &DecisionNode) -> String {
    let s = &node.state;
    let mut out = format!(
        "  {} ({} to act)\n  pot {}  facing {}  invested {}  stack {}  committed {:.1}%\n",
        name.bold(),
        node.player.as_str().cyan().bold(),
        s.pot,
        s.facing_bet,
        s.player_invested,
        s.effective_stack,
        s.committed_ratio * 100.0
    );

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Action"),
        Cell::new("Size").set_alignment(CellAlignment::Right),
        Cell::new("Next"),
    ]);

    let a = &node.actions;
    let dash = || "-".to_string();
    let rows = [
        (ActionKind::Fold, dash(), a.fold.next.clone()),
        (ActionKind::Check, dash(), a.check.next.clone()),
        (ActionKind::Call, format!("{}", a.call.size), a.call.next.clone()),
        (
            ActionKind::Raise,
            format_sizes(&a.raise.sizes),
            Some(a.raise.next_map.values().cloned().collect::<Vec<_>>().join(", "))
                .filter(|s| !s.is_empty()),
        ),
        (ActionKind::AllIn, format!("{}", a.allin.size), a.allin.next.clone()),
    ];
    for (kind, size, next) in rows {
        table.add_row(vec![
            Cell::new(styled_action(kind, a.is_enabled(kind))),
            Cell::new(size).set_alignment(CellAlignment::Right),
            Cell::new(next.unwrap_or_else(dash)),
        ]);
    }

    out.push_str(&table.to_string());
    out
}

/// Text rendering of a validation report. Warnings are listed only when
/// `verbose` is set; their count is always shown.
pub fn render_report(report: &ValidationReport, source: &str, version: &str, verbose: bool) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let stats = &report.stats;
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", rule));
    out.push_str(&format!("{}\n", "Game Tree Validation Report".bold()));
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("File: {}\n", source));
    out.push_str(&format!("Version: {}\n\n", version));

    out.push_str(&format!("{}\n", "Statistics:".cyan().bold()));
    out.push_str(&format!("  Total nodes: {}\n", stats.total_nodes));
    out.push_str(&format!("  Action nodes: {}\n", stats.action_nodes));
    out.push_str(&format!("  Terminal nodes: {}\n", stats.terminal_nodes));
    out.push_str(&format!(
        "  Unique raise sizes: [{}]\n\n",
        format_sizes(&stats.unique_raise_sizes)
    ));

    out.push_str(&format!("{}\n", "Enabled actions per node type:".cyan().bold()));
    for kind in ActionKind::ALL {
        out.push_str(&format!("  {}: {}\n", kind, stats.enabled_actions.get(kind)));
    }
    out.push('\n');

    if !report.errors.is_empty() {
        out.push_str(&format!("{}\n", format!("ERRORS ({}):", report.errors.len()).red().bold()));
        for error in &report.errors {
            out.push_str(&format!("  {} {}\n", "x".red(), error));
        }
        out.push('\n');
    }

    if !report.warnings.is_empty() {
        let header = format!("WARNINGS ({}):", report.warnings.len());
        out.push_str(&format!("{}\n", header.yellow().bold()));
        if verbose {
            for warning in &report.warnings {
                out.push_str(&format!("  {} {}\n", "!".yellow(), warning));
            }
        } else {
            out.push_str(&format!("  {}\n", "(use --verbose to list)".dimmed()));
        }
        out.push('\n');
    }

    if report.passed {
        out.push_str(&format!("{}\n", "VALIDATION PASSED".green().bold()));
    } else {
        out.push_str(&format!("{}\n", "VALIDATION FAILED".red().bold()));
    }
    out
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
