use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::GeneratorConfig;
use crate::display::{generation_summary, node_table, print_error, print_success, render_report};
use crate::error::{TreeError, TreeResult};
use crate::generator::TreeGenerator;
use crate::node::GameTree;
use crate::validator::{read_tree, validate_value};

const DEFAULT_TREE_PATH: &str = "gametree_v3.json";

/// Exit status for input that could not be read or parsed.
const EXIT_FATAL: i32 = 2;

#[derive(Parser)]
#[command(name = "ptree", version, about = "Preflop action-tree generator and validator.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the action tree from a generator config
    Generate {
        /// Generator config (built-in defaults when omitted)
        #[arg(short, long)]
        config: Option<String>,
        /// Output file
        #[arg(short, long, default_value = DEFAULT_TREE_PATH)]
        output: String,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Check a generated tree for structural and rule violations
    Validate {
        /// Tree file to check
        #[arg(short, long, default_value = DEFAULT_TREE_PATH)]
        input: String,
        /// List every warning
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show a single decision node
    Node {
        /// Node name (e.g., open_utg, vs_utg_open_bb)
        name: String,
        /// Tree file to read
        #[arg(short, long, default_value = DEFAULT_TREE_PATH)]
        input: String,
    },
}

/// Parses the process arguments and runs the command. Returns the exit status.
pub fn run() -> i32 {
    let cli = Cli::parse();
    dispatch(cli)
}

pub fn run_with_args(args: Vec<String>) -> i32 {
    let cli = Cli::parse_from(args);
    dispatch(cli)
}

fn dispatch(cli: Cli) -> i32 {
    match cli.command {
        Commands::Generate {
            config,
            output,
            pretty,
        } => report_fatal(cmd_generate(config, &output, pretty)),
        Commands::Validate { input, verbose } => cmd_validate(&input, verbose),
        Commands::Node { name, input } => report_fatal(cmd_node(&name, &input)),
    }
}

fn report_fatal(result: TreeResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            print_error(&e.to_string());
            EXIT_FATAL
        }
    }
}

fn cmd_generate(config_path: Option<String>, output: &str, pretty: bool) -> TreeResult<()> {
    let config = match config_path {
        Some(path) => GeneratorConfig::from_file(&path)?,
        None => {
            log::info!("no config given, using built-in defaults");
            GeneratorConfig::default()
        }
    };

    let generated = TreeGenerator::new(&config).generate();
    generated.tree.save(output, pretty)?;

    println!();
    println!("{}", generation_summary(&generated, output));
    if !generated.forward_refs.is_empty() {
        println!(
            "  {} successor names are forward stubs (see `validate --verbose`).",
            generated.forward_refs.len().to_string().bold()
        );
    }
    println!();
    print_success("Done.");
    Ok(())
}

fn cmd_validate(input: &str, verbose: bool) -> i32 {
    let tree = match read_tree(input) {
        Ok(tree) => tree,
        Err(e) => {
            print_error(&e.to_string());
            return EXIT_FATAL;
        }
    };
    let report = match validate_value(&tree) {
        Ok(report) => report,
        Err(e) => {
            print_error(&e.to_string());
            return EXIT_FATAL;
        }
    };

    let version = tree
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    print!("{}", render_report(&report, input, version, verbose));
    report.exit_code()
}

fn cmd_node(name: &str, input: &str) -> TreeResult<()> {
    let tree: GameTree = serde_json::from_value(read_tree(input)?)?;
    match tree.node(name) {
        Some(node) => match node.as_decision() {
            Some(decision) => {
                println!();
                println!("{}", node_table(name, decision));
                println!();
            }
            None => println!("\n  {} is a terminal node.\n", name.bold()),
        },
        None => return Err(TreeError::UnknownNode(name.to_string())),
    }
    Ok(())
}
