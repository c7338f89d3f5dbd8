//! # SPADE Code Generation
//!
//! Python code generation for agent graphs.

mod agent;
mod behaviour;
pub mod literal;
mod python_codegen;

pub use behaviour::{parse_iso_timestamp, start_time, StartTime};
pub use python_codegen::*;

use crate::config::GeneratorConfig;
use crate::graph::Node;
use crate::index::RelationshipIndex;
use serde::{Deserialize, Serialize};

/// One emitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

/// Everything one emission produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProject {
    /// The entry-point script.
    pub main: GeneratedFile,
    /// Reasoning programs, one per BDI agent that has one.
    pub auxiliary: Vec<GeneratedFile>,
}

/// Emit code for a graph that has already passed validation.
pub fn emit(nodes: &[Node], index: &RelationshipIndex, config: &GeneratorConfig) -> GeneratedProject {
    SpadeCodeGenerator::new(nodes, index, config).generate()
}
