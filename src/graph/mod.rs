//! # Agent Graph Model
//!
//! Nodes and edges as drawn in the editor, plus the mutation layer that keeps
//! them consistent: edges are only created through the connection policy and
//! removing a node removes every edge touching it.

mod de;
mod edge;
mod node;

pub use edge::{Edge, EdgeKind, HandleKey};
pub use node::{
    AgentData, BdiAgentData, BehaviourData, BehaviourType, LlmAgentData, MessageData, Node,
    NodeKind, Position, StartMode, StickyNoteData, TemplateData,
};

use crate::connection::classify;
use crate::error::ConnectionRejected;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Applies `update` to the payload of node `id`. Returns `false` if the
    /// node does not exist.
    pub fn update_node(&mut self, id: &str, update: impl FnOnce(&mut NodeKind)) -> bool {
        match self.nodes.iter_mut().find(|node| node.id == id) {
            Some(node) => {
                update(&mut node.kind);
                true
            }
            None => false,
        }
    }

    /// Classifies and inserts an edge. An identical connection is refused
    /// rather than duplicated.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: HandleKey,
        target_handle: HandleKey,
    ) -> Result<&Edge, ConnectionRejected> {
        let kind = classify(
            &self.nodes,
            &self.edges,
            source,
            target,
            source_handle,
            target_handle,
        )?;

        let id = Edge::connection_id(source, source_handle, target, target_handle);
        if self.edges.iter().any(|edge| edge.id == id) {
            return Err(ConnectionRejected::AlreadyConnected(id));
        }

        tracing::debug!("[SAGC] Connected {} -> {} as {:?}", source, target, kind);
        let position = self.edges.len();
        self.edges.push(Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: Some(source_handle),
            target_handle: Some(target_handle),
            kind,
        });
        Ok(&self.edges[position])
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|edge| edge.id == id)?;
        Some(self.edges.remove(index))
    }

    /// Removes a node together with every edge where it is source or target.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|node| node.id == id)?;
        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        tracing::debug!(
            "[SAGC] Removed node {} and {} incident edge(s)",
            id,
            before - self.edges.len()
        );
        Some(self.nodes.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: &str, name: &str) -> Node {
        Node::new(
            id,
            NodeKind::Agent(AgentData {
                instance_name: name.to_string(),
                ..Default::default()
            }),
        )
    }

    fn behaviour(id: &str) -> Node {
        Node::new(id, NodeKind::Behaviour(BehaviourData::default()))
    }

    #[test]
    fn connect_assigns_kind_and_editor_id() {
        let mut graph = Graph::new(vec![agent("a", "alice"), behaviour("b")], vec![]);
        let edge = graph
            .connect("a", "b", HandleKey::Behaviour, HandleKey::Behaviour)
            .unwrap();
        assert_eq!(edge.kind, EdgeKind::AgentUsesBehaviour);
        assert_eq!(edge.id, "xy-edge__abehaviour-bbehaviour");
    }

    #[test]
    fn connect_returns_the_new_edge() {
        let mut graph = Graph::new(vec![agent("a", "alice"), agent("b", "bob"), behaviour("c")], vec![]);
        graph
            .connect("a", "b", HandleKey::FriendshipSource, HandleKey::FriendshipTarget)
            .unwrap();
        let edge = graph
            .connect("b", "c", HandleKey::Behaviour, HandleKey::Behaviour)
            .unwrap()
            .clone();
        assert_eq!(edge.source, "b");
        assert_eq!(edge.target, "c");
        assert_eq!(graph.edges.last(), Some(&edge));
    }

    #[test]
    fn identical_connection_is_refused() {
        let mut graph = Graph::new(vec![agent("a", "alice"), agent("b", "bob")], vec![]);
        graph
            .connect("a", "b", HandleKey::FriendshipSource, HandleKey::FriendshipTarget)
            .unwrap();
        let second = graph.connect("a", "b", HandleKey::FriendshipSource, HandleKey::FriendshipTarget);
        assert!(matches!(second, Err(ConnectionRejected::AlreadyConnected(_))));
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn removing_a_node_cascades_to_its_edges() {
        let mut graph = Graph::new(
            vec![agent("a", "alice"), agent("b", "bob"), behaviour("c")],
            vec![],
        );
        graph
            .connect("a", "b", HandleKey::FriendshipSource, HandleKey::FriendshipTarget)
            .unwrap();
        graph
            .connect("a", "c", HandleKey::Behaviour, HandleKey::Behaviour)
            .unwrap();
        graph
            .connect("b", "c", HandleKey::Behaviour, HandleKey::Behaviour)
            .unwrap();

        let removed = graph.remove_node("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.edges.iter().all(|edge| !edge.touches("a")));
        assert!(graph.remove_node("a").is_none());
    }

    #[test]
    fn update_node_mutates_in_place() {
        let mut graph = Graph::new(vec![agent("a", "alice")], vec![]);
        let updated = graph.update_node("a", |kind| {
            if let Some(agent) = kind.agent_mut() {
                agent.host = "example.org".to_string();
            }
        });
        assert!(updated);
        assert_eq!(graph.node("a").unwrap().kind.agent().unwrap().host, "example.org");
        assert!(!graph.update_node("missing", |_| {}));
    }
}
