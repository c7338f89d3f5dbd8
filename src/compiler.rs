//! # Agent Graph Compiler
//!
//! Main entry points for compiling agent graphs to SPADE Python code.

use crate::codegen::{emit, GeneratedProject};
use crate::config::GeneratorConfig;
use crate::error::ValidationFailure;
use crate::graph::{Edge, Node};
use crate::index::RelationshipIndex;
use crate::project::Project;
use crate::validate::validate;

/// Compile an agent graph to SPADE source code
///
/// This is the main entry point for the compiler. It validates the graph,
/// indexes its relationships and emits the Python program together with one
/// reasoning file per BDI agent that has a program.
///
/// # Arguments
///
/// * `nodes` - The graph's nodes, in editor order
/// * `edges` - The graph's edges, in insertion order
///
/// # Returns
///
/// * `Ok(GeneratedProject)` - The generated documents
/// * `Err(ValidationFailure)` - Every naming violation found; nothing is emitted
///
/// # Examples
///
/// ```rust
/// use sagc::{generate, AgentData, Node, NodeKind};
///
/// let agent = NodeKind::Agent(AgentData {
///     instance_name: "agent1".into(),
///     ..Default::default()
/// });
/// let project = generate(&[Node::new("1", agent)], &[]).unwrap();
/// assert!(project.main.content.contains("agent1@localhost"));
/// ```
pub fn generate(nodes: &[Node], edges: &[Edge]) -> Result<GeneratedProject, ValidationFailure> {
    generate_with_config(nodes, edges, &GeneratorConfig::default())
}

/// Compile an agent graph with custom generator settings
///
/// # Arguments
///
/// * `nodes` - The graph's nodes, in editor order
/// * `edges` - The graph's edges, in insertion order
/// * `config` - File names and connection defaults used during emission
pub fn generate_with_config(
    nodes: &[Node],
    edges: &[Edge],
    config: &GeneratorConfig,
) -> Result<GeneratedProject, ValidationFailure> {
    tracing::info!("[SAGC] Starting agent graph compilation");
    tracing::info!("[SAGC] Graph: {} nodes, {} edges", nodes.len(), edges.len());

    // Phase 1: Validate names
    tracing::info!("[SAGC] Phase 1: Validating graph...");
    if let Err(violations) = validate(nodes) {
        tracing::warn!("[SAGC] Validation failed with {} violation(s)", violations.len());
        return Err(ValidationFailure::new(violations));
    }

    // Phase 2: Index relationships
    tracing::info!("[SAGC] Phase 2: Indexing relationships...");
    let index = RelationshipIndex::build(nodes, edges, config);
    tracing::info!(
        "[SAGC]   - {} agent(s), {} behaviour attachment(s)",
        index.agent_identity.len(),
        index.agent_behaviours.values().map(Vec::len).sum::<usize>()
    );

    // Phase 3: Emit code
    tracing::info!("[SAGC] Phase 3: Generating Python code...");
    let project = emit(nodes, &index, config);

    tracing::info!(
        "[SAGC] Code generation complete ({} bytes, {} auxiliary file(s))",
        project.main.content.len(),
        project.auxiliary.len()
    );

    Ok(project)
}

/// Compile a loaded project file
pub fn generate_project(
    project: &Project,
    config: &GeneratorConfig,
) -> Result<GeneratedProject, ValidationFailure> {
    tracing::debug!("[SAGC] Project version {} saved at {}", project.version, project.timestamp);
    generate_with_config(&project.nodes, &project.edges, config)
}
