//! # Connection Policy
//!
//! Decides whether a proposed edge is legal and which kind it receives.
//! Rules are checked in order; the first match wins.

use crate::error::ConnectionRejected;
use crate::graph::{Edge, EdgeKind, HandleKey, Node, NodeKind};

/// Classify a proposed edge from `source` to `target`.
///
/// Pure: the caller inserts the edge once it is accepted.
pub fn classify(
    nodes: &[Node],
    edges: &[Edge],
    source: &str,
    target: &str,
    source_handle: HandleKey,
    target_handle: HandleKey,
) -> Result<EdgeKind, ConnectionRejected> {
    let find = |id: &str| {
        nodes
            .iter()
            .find(|node| node.id == id)
            .ok_or_else(|| ConnectionRejected::UnknownNode(id.to_string()))
    };
    let source_node = find(source)?;
    let target_node = find(target)?;

    let both_agents = source_node.is_agent() && target_node.is_agent();
    let from_behaviour = matches!(source_node.kind, NodeKind::Behaviour(_));
    let handles = (source_handle, target_handle);

    // Friendship: agent to agent, never to itself.
    if both_agents && handles == (HandleKey::FriendshipSource, HandleKey::FriendshipTarget) {
        if source == target {
            return Err(ConnectionRejected::SelfFriendship(source.to_string()));
        }
        return Ok(EdgeKind::Friendship);
    }

    if source_node.is_agent()
        && matches!(target_node.kind, NodeKind::Behaviour(_))
        && handles == (HandleKey::Behaviour, HandleKey::Behaviour)
    {
        return Ok(EdgeKind::AgentUsesBehaviour);
    }

    // Inheritance: at most one outgoing edge per source.
    if both_agents && handles == (HandleKey::InheritanceSource, HandleKey::InheritanceTarget) {
        if has_outgoing(edges, source, HandleKey::InheritanceSource, EdgeKind::Inherits) {
            return Err(ConnectionRejected::DuplicateInheritance(source.to_string()));
        }
        return Ok(EdgeKind::Inherits);
    }

    // Template binding: at most one per behaviour.
    if from_behaviour
        && matches!(target_node.kind, NodeKind::Template(_))
        && handles == (HandleKey::Template, HandleKey::Template)
    {
        if has_outgoing(edges, source, HandleKey::Template, EdgeKind::BehaviourUsesTemplate) {
            return Err(ConnectionRejected::DuplicateTemplate(source.to_string()));
        }
        return Ok(EdgeKind::BehaviourUsesTemplate);
    }

    // Message binding has no uniqueness constraint.
    if from_behaviour
        && matches!(target_node.kind, NodeKind::Message(_))
        && handles == (HandleKey::Message, HandleKey::Message)
    {
        return Ok(EdgeKind::BehaviourUsesMessage);
    }

    Err(ConnectionRejected::NoMatchingRule {
        source_id: source.to_string(),
        target_id: target.to_string(),
        source_handle: source_handle.to_string(),
        target_handle: target_handle.to_string(),
    })
}

fn has_outgoing(edges: &[Edge], source: &str, handle: HandleKey, kind: EdgeKind) -> bool {
    edges
        .iter()
        .any(|edge| edge.source == source && edge.source_handle == Some(handle) && edge.kind == kind)
}
