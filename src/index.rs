//! # Relationship Index
//!
//! Per-agent views derived from the raw edge list: attached behaviours,
//! friends, parents, and the templates/messages bound to each behaviour.
//! Recomputed before every emission; never persisted.

use crate::config::GeneratorConfig;
use crate::graph::{Edge, EdgeKind, Node, NodeKind};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Resolved names of an agent, with fallbacks applied for empty fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity {
    pub instance_name: String,
    pub class_name: String,
    pub jid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipIndex {
    pub agent_identity: BTreeMap<String, AgentIdentity>,
    /// Behaviour ids per agent, in edge insertion order.
    pub agent_behaviours: BTreeMap<String, Vec<String>>,
    /// Friend JIDs per agent. Friendship is symmetric.
    pub agent_friends: BTreeMap<String, BTreeSet<String>>,
    /// Parent agent ids per child agent, in edge insertion order.
    pub agent_parents: BTreeMap<String, Vec<String>>,
    pub behaviour_template: BTreeMap<String, String>,
    pub behaviour_message: BTreeMap<String, String>,
    /// Templates reachable through an agent's behaviours, first use first.
    pub agent_templates: BTreeMap<String, Vec<String>>,
}

/// Build the index with default naming settings.
pub fn index(nodes: &[Node], edges: &[Edge]) -> RelationshipIndex {
    RelationshipIndex::build(nodes, edges, &GeneratorConfig::default())
}

impl RelationshipIndex {
    /// Single pass over `edges`. Edges whose endpoints are missing, or of
    /// the wrong kind for the edge type, are skipped.
    pub fn build(nodes: &[Node], edges: &[Edge], config: &GeneratorConfig) -> Self {
        let by_id: HashMap<&str, &Node> = nodes.iter().map(|node| (node.id.as_str(), node)).collect();
        let mut index = RelationshipIndex::default();

        // Fallback names must not collide with names the user chose.
        let mut taken_names: HashSet<String> = HashSet::new();
        let mut taken_classes: HashSet<String> = HashSet::new();
        for node in nodes {
            if let Some(agent) = node.kind.agent() {
                taken_names.insert(agent.instance_name.trim().to_string());
                taken_classes.insert(agent.class_name.trim().to_string());
            } else if let Some(behaviour) = node.kind.behaviour() {
                taken_classes.insert(behaviour.class_name.trim().to_string());
            }
        }

        for (ordinal, node) in nodes.iter().filter(|node| node.is_agent()).enumerate() {
            if let Some(agent) = node.kind.agent() {
                let number = ordinal + 1;
                let instance_name = non_empty_or(&agent.instance_name, || {
                    numbered_fallback("agent", number, &mut taken_names)
                });
                let class_name = non_empty_or(&agent.class_name, || {
                    numbered_fallback("MyAgent", number, &mut taken_classes)
                });
                let host = non_empty_or(&agent.host, || config.default_host.clone());
                let jid = format!("{}@{}", instance_name, host);

                index.agent_identity.insert(
                    node.id.clone(),
                    AgentIdentity {
                        instance_name,
                        class_name,
                        jid,
                    },
                );
                index.agent_behaviours.insert(node.id.clone(), Vec::new());
                index.agent_friends.insert(node.id.clone(), BTreeSet::new());
            }
        }

        for edge in edges {
            let (Some(source), Some(target)) = (
                by_id.get(edge.source.as_str()),
                by_id.get(edge.target.as_str()),
            ) else {
                tracing::debug!("[SAGC] Skipping dangling edge {}", edge.id);
                continue;
            };

            match edge.kind {
                EdgeKind::AgentUsesBehaviour
                    if source.is_agent() && matches!(target.kind, NodeKind::Behaviour(_)) =>
                {
                    index
                        .agent_behaviours
                        .entry(source.id.clone())
                        .or_default()
                        .push(target.id.clone());
                }
                EdgeKind::Friendship if source.is_agent() && target.is_agent() && source.id != target.id => {
                    let source_jid = index.jid_of(&source.id).map(str::to_string);
                    let target_jid = index.jid_of(&target.id).map(str::to_string);
                    if let (Some(source_jid), Some(target_jid)) = (source_jid, target_jid) {
                        index.agent_friends.entry(source.id.clone()).or_default().insert(target_jid);
                        index.agent_friends.entry(target.id.clone()).or_default().insert(source_jid);
                    }
                }
                EdgeKind::Inherits if source.is_agent() && target.is_agent() && source.id != target.id => {
                    let parents = index.agent_parents.entry(target.id.clone()).or_default();
                    if !parents.contains(&source.id) {
                        parents.push(source.id.clone());
                    }
                }
                EdgeKind::BehaviourUsesTemplate
                    if matches!(source.kind, NodeKind::Behaviour(_))
                        && matches!(target.kind, NodeKind::Template(_)) =>
                {
                    index.behaviour_template.insert(source.id.clone(), target.id.clone());
                }
                EdgeKind::BehaviourUsesMessage
                    if matches!(source.kind, NodeKind::Behaviour(_))
                        && matches!(target.kind, NodeKind::Message(_)) =>
                {
                    if let Some(previous) = index.behaviour_message.insert(source.id.clone(), target.id.clone()) {
                        tracing::warn!(
                            "[SAGC] Behaviour {} is bound to several messages; using {} instead of {}",
                            source.id,
                            target.id,
                            previous
                        );
                    }
                }
                _ => {
                    tracing::debug!(
                        "[SAGC] Skipping edge {}: {:?} does not fit {} -> {}",
                        edge.id,
                        edge.kind,
                        source.kind.type_tag(),
                        target.kind.type_tag()
                    );
                }
            }
        }

        for (agent_id, behaviours) in &index.agent_behaviours {
            let mut templates: Vec<String> = Vec::new();
            for behaviour_id in behaviours {
                if let Some(template_id) = index.behaviour_template.get(behaviour_id) {
                    if !templates.contains(template_id) {
                        templates.push(template_id.clone());
                    }
                }
            }
            index.agent_templates.insert(agent_id.clone(), templates);
        }

        index
    }

    pub fn identity(&self, agent_id: &str) -> Option<&AgentIdentity> {
        self.agent_identity.get(agent_id)
    }

    pub fn jid_of(&self, agent_id: &str) -> Option<&str> {
        self.identity(agent_id).map(|identity| identity.jid.as_str())
    }

    pub fn behaviours_of(&self, agent_id: &str) -> &[String] {
        self.agent_behaviours.get(agent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn friends_of(&self, agent_id: &str) -> impl Iterator<Item = &str> {
        self.agent_friends
            .get(agent_id)
            .into_iter()
            .flat_map(|friends| friends.iter().map(String::as_str))
    }

    pub fn parents_of(&self, agent_id: &str) -> &[String] {
        self.agent_parents.get(agent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn template_of(&self, behaviour_id: &str) -> Option<&str> {
        self.behaviour_template.get(behaviour_id).map(String::as_str)
    }

    pub fn message_of(&self, behaviour_id: &str) -> Option<&str> {
        self.behaviour_message.get(behaviour_id).map(String::as_str)
    }

    pub fn templates_of(&self, agent_id: &str) -> &[String] {
        self.agent_templates.get(agent_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// `{prefix}{n}` for the first `n >= start` that is not in `taken`. The
/// chosen name is added to `taken`.
pub(crate) fn numbered_fallback(prefix: &str, start: usize, taken: &mut HashSet<String>) -> String {
    let mut number = start;
    loop {
        let name = format!("{}{}", prefix, number);
        if taken.insert(name.clone()) {
            return name;
        }
        number += 1;
    }
}

fn non_empty_or(value: &str, fallback: impl FnOnce() -> String) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback()
    } else {
        value.to_string()
    }
}
