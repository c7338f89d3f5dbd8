//! # Graph Validation
//!
//! Naming checks that must all pass before any code is emitted. A graph
//! with a single violation produces no output at all.

use crate::graph::{Node, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static PYTHON_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Names bound at module level in every generated program.
const GENERATED_NAMES: &[&str] = &[
    "spade", "datetime", "main", "wait_until_finished", "Agent", "BDIAgent", "Template",
    "Message", "CyclicBehaviour", "OneShotBehaviour", "TimeoutBehaviour", "PeriodicBehaviour",
    "FSMBehaviour",
];

/// Whether `name` is a valid (ASCII) Python identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    PYTHON_IDENTIFIER.is_match(name)
}

/// Whether `name` is a Python keyword or a name the generated program
/// already uses.
pub fn is_reserved_name(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name) || GENERATED_NAMES.contains(&name)
}

/// Validate agent and behaviour naming across the whole graph.
///
/// Returns `Ok(())` if the graph is valid, or `Err(Vec<String>)` with every
/// human-readable violation found. Empty names are not checked here; the
/// generator falls back to defaults for them.
pub fn validate(nodes: &[Node]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut agent_classes = HashSet::new();
    let mut agent_names = HashSet::new();
    let mut behaviour_classes = HashSet::new();

    // Agent instances are locals of `main()`, so they must not shadow a class.
    let all_classes: HashSet<&str> = nodes
        .iter()
        .filter_map(|node| match &node.kind {
            NodeKind::Behaviour(behaviour) => Some(behaviour.class_name.trim()),
            kind => kind.agent().map(|agent| agent.class_name.trim()),
        })
        .filter(|class_name| !class_name.is_empty())
        .collect();

    for node in nodes {
        if let Some(agent) = node.kind.agent() {
            let name = agent.instance_name.trim();
            if !name.is_empty() {
                if !is_valid_identifier(name) {
                    errors.push(format!(
                        "Agent name '{}' (node {}) is not a valid Python identifier",
                        name, node.id
                    ));
                } else if is_reserved_name(name) {
                    errors.push(format!(
                        "Agent name '{}' (node {}) is a reserved Python name",
                        name, node.id
                    ));
                } else if all_classes.contains(name) {
                    errors.push(format!(
                        "Agent name '{}' (node {}) clashes with a class of the same name",
                        name, node.id
                    ));
                }
                if !agent_names.insert(name) {
                    errors.push(format!("Each Agent node must have a unique Name: '{}'", name));
                }
            }

            let class_name = agent.class_name.trim();
            if is_reserved_name(class_name) {
                errors.push(format!(
                    "Agent class '{}' (node {}) is a reserved Python name",
                    class_name, node.id
                ));
            }
            if !class_name.is_empty() && !agent_classes.insert(class_name) {
                errors.push(format!(
                    "Each Agent node must have a unique Class name: '{}'",
                    class_name
                ));
            }
        } else if let NodeKind::Behaviour(behaviour) = &node.kind {
            let class_name = behaviour.class_name.trim();
            if class_name.is_empty() {
                continue;
            }
            if !is_valid_identifier(class_name) {
                errors.push(format!(
                    "Behaviour class '{}' (node {}) is not a valid Python identifier",
                    class_name, node.id
                ));
            } else if is_reserved_name(class_name) {
                errors.push(format!(
                    "Behaviour class '{}' (node {}) is a reserved Python name",
                    class_name, node.id
                ));
            }
            if !behaviour_classes.insert(class_name) {
                errors.push(format!(
                    "Each Behaviour node must have a unique Class name: '{}'",
                    class_name
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
