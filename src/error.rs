//! # Compiler Errors
//!
//! Error types shared by the SAGC pipeline and its front-ends.

use thiserror::Error;

/// The graph failed pre-flight validation; nothing was emitted.
///
/// Carries every violation found, in the order the checks ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("graph validation failed:\n  - {}", .violations.join("\n  - "))]
pub struct ValidationFailure {
    pub violations: Vec<String>,
}

impl ValidationFailure {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }
}

/// Why the connection policy refused a proposed edge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionRejected {
    #[error("node not found: {0}")]
    UnknownNode(String),
    #[error("an agent cannot be friends with itself: {0}")]
    SelfFriendship(String),
    #[error("agent {0} already has an outgoing inheritance edge")]
    DuplicateInheritance(String),
    #[error("behaviour {0} is already bound to a template")]
    DuplicateTemplate(String),
    #[error("edge {0} already exists")]
    AlreadyConnected(String),
    #[error("no edge type connects {source_id} ({source_handle}) to {target_id} ({target_handle})")]
    NoMatchingRule {
        source_id: String,
        target_id: String,
        source_handle: String,
        target_handle: String,
    },
}

/// Errors surfaced by project loading, configuration, packaging and the CLI.
#[derive(Debug, Error)]
pub enum SagcError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("invalid project file: {0}")]
    Project(String),

    #[error("unsupported project version: {0}")]
    UnsupportedVersion(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SagcError>;
