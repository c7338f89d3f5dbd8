//! # Graph Edges
//!
//! Typed, directed relationships between nodes. An edge's kind is always
//! derived by the connection policy from its endpoints and handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    #[serde(rename = "friendship")]
    Friendship,
    #[serde(rename = "agentBehaviour")]
    AgentUsesBehaviour,
    #[serde(rename = "inheritance")]
    Inherits,
    #[serde(rename = "template")]
    BehaviourUsesTemplate,
    #[serde(rename = "message")]
    BehaviourUsesMessage,
}

/// Named connection point on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKey {
    #[serde(rename = "friendship-source")]
    FriendshipSource,
    #[serde(rename = "friendship-target")]
    FriendshipTarget,
    #[serde(rename = "behaviour")]
    Behaviour,
    #[serde(rename = "inheritance-source")]
    InheritanceSource,
    #[serde(rename = "inheritance-target")]
    InheritanceTarget,
    #[serde(rename = "template")]
    Template,
    #[serde(rename = "message")]
    Message,
}

impl HandleKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKey::FriendshipSource => "friendship-source",
            HandleKey::FriendshipTarget => "friendship-target",
            HandleKey::Behaviour => "behaviour",
            HandleKey::InheritanceSource => "inheritance-source",
            HandleKey::InheritanceTarget => "inheritance-target",
            HandleKey::Template => "template",
            HandleKey::Message => "message",
        }
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<HandleKey>,
    #[serde(default)]
    pub target_handle: Option<HandleKey>,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl Edge {
    /// Edge id in the editor's `xy-edge__{source}{handle}-{target}{handle}` format.
    pub fn connection_id(
        source: &str,
        source_handle: HandleKey,
        target: &str,
        target_handle: HandleKey,
    ) -> String {
        format!("xy-edge__{}{}-{}{}", source, source_handle, target, target_handle)
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
