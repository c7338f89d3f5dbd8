//! # SPADE Agent Graph Compiler (SAGC)
//!
//! Compiler for transforming visual multi-agent graphs into runnable SPADE
//! Python programs.
//!
//! SAGC takes the nodes and edges drawn in the agent editor and provides:
//! - A typed graph model with a connection policy for new edges
//! - Whole-graph naming validation before anything is emitted
//! - Python code generation for SPADE agents, behaviours, templates and messages
//! - Reasoning programs for BDI agents as separate `.asl` files
//! - Project file loading/saving and zip packaging of the generated files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sagc::{generate_project, GeneratorConfig, Project};
//!
//! let project = Project::load("agents.json")?;
//! match generate_project(&project, &GeneratorConfig::default()) {
//!     Ok(generated) => {
//!         std::fs::write("spade_project.zip", generated.to_archive()?)?;
//!     }
//!     Err(e) => eprintln!("Compilation failed: {}", e),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! SAGC follows a multi-phase compilation pipeline:
//!
//! 1. **Validation** - Check agent and behaviour names across the graph
//! 2. **Relationship Indexing** - Derive per-agent behaviours, friends, parents and templates
//! 3. **Code Generation** - Emit the Python program and BDI reasoning files
//! 4. **Packaging** - Bundle the documents into a zip archive (optional)

pub mod codegen;
pub mod compiler;
pub mod config;
pub mod connection;
pub mod error;
pub mod graph;
pub mod index;
pub mod package;
pub mod project;
pub mod validate;

// Re-export the main compilation API
pub use compiler::{generate, generate_project, generate_with_config};

pub use codegen::{emit, GeneratedFile, GeneratedProject, SpadeCodeGenerator, BASE_TEMPLATE};
pub use config::GeneratorConfig;
pub use connection::classify;
pub use error::{ConnectionRejected, Result, SagcError, ValidationFailure};
pub use graph::{
    AgentData, BdiAgentData, BehaviourData, BehaviourType, Edge, EdgeKind, Graph, HandleKey,
    LlmAgentData, MessageData, Node, NodeKind, Position, StartMode, StickyNoteData, TemplateData,
};
pub use index::{index, AgentIdentity, RelationshipIndex};
pub use package::package;
pub use project::{Project, PROJECT_VERSION};
pub use validate::{is_reserved_name, is_valid_identifier, validate};
