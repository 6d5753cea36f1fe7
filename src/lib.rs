//! Preflop action-tree generation and validation.
//!
//! [`generator`] enumerates every modeled preflop betting line for an 8-seat
//! table into a name-keyed node map; [`validator`] re-checks any persisted
//! tree against the structural and commitment rules.

pub mod action;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod generator;
pub mod node;
pub mod node_id;
pub mod position;
pub mod sizing;
pub mod state;
pub mod validator;

pub use config::GeneratorConfig;
pub use error::{TreeError, TreeResult};
pub use generator::{generate_tree, Generated, TreeGenerator};
pub use node::GameTree;
pub use validator::{validate_tree, validate_value, ValidationReport};
