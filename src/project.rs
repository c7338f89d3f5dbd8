//! # Project Files
//!
//! The JSON document the editor saves and loads. Node and edge shapes are the
//! same ones the compiler consumes, so a saved project regenerates the same code.

use crate::error::{Result, SagcError};
use crate::graph::{Edge, Graph, Node};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Format version written by this crate.
pub const PROJECT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub version: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Project {
    /// Snapshot a graph, stamped with the current time.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            timestamp: Utc::now(),
            nodes,
            edges,
        }
    }

    pub fn from_graph(graph: Graph) -> Self {
        Self::new(graph.nodes, graph.edges)
    }

    pub fn graph(&self) -> Graph {
        Graph::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a saved project.
    ///
    /// Documents missing `version`, `nodes` or `edges` are rejected, as is
    /// any major version other than the one this crate writes.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut document: Value = serde_json::from_str(text)?;
        let Some(fields) = document.as_object_mut() else {
            return Err(SagcError::Project("expected a JSON object".into()));
        };

        for required in ["version", "nodes", "edges"] {
            if !fields.contains_key(required) {
                return Err(SagcError::Project(format!("missing field `{}`", required)));
            }
        }

        let version = match &fields["version"] {
            Value::String(version) => version.clone(),
            Value::Number(version) => version.to_string(),
            other => return Err(SagcError::Project(format!("invalid version: {}", other))),
        };
        if major(&version) != major(PROJECT_VERSION) {
            return Err(SagcError::UnsupportedVersion(version));
        }

        fields.insert("version".into(), Value::String(version));
        let project: Project = serde_json::from_value(document)?;
        tracing::debug!(
            "[SAGC] Loaded project: {} nodes, {} edges",
            project.nodes.len(),
            project.edges.len()
        );
        Ok(project)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn major(version: &str) -> &str {
    version.trim().split('.').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_edges_is_rejected() {
        let err = Project::from_json(r#"{"version": "1.0", "nodes": []}"#).unwrap_err();
        assert!(matches!(err, SagcError::Project(message) if message.contains("edges")));
    }

    #[test]
    fn unknown_major_version_is_rejected() {
        let err = Project::from_json(r#"{"version": "2.0", "nodes": [], "edges": []}"#).unwrap_err();
        assert!(matches!(err, SagcError::UnsupportedVersion(version) if version == "2.0"));
    }

    #[test]
    fn minor_versions_load() {
        let project = Project::from_json(
            r#"{"version": "1.3", "timestamp": "2025-03-01T10:00:00.000Z", "nodes": [], "edges": []}"#,
        )
        .unwrap();
        assert_eq!(project.version, "1.3");
        assert_eq!(project.timestamp.to_rfc3339(), "2025-03-01T10:00:00+00:00");
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(matches!(Project::from_json("[]"), Err(SagcError::Project(_))));
    }
}
