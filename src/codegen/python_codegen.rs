//! # SPADE Code Generator
//!
//! Generates the SPADE Python program (and per-agent reasoning files) from a
//! validated agent graph.

use super::agent::{agent_class_block, instantiation};
use super::behaviour::{behaviour_class_block, constructor_args, uses_datetime};
use super::literal::{python_string, user_value};
use super::{GeneratedFile, GeneratedProject};
use crate::config::GeneratorConfig;
use crate::graph::{BehaviourData, MessageData, Node, NodeKind, TemplateData};
use crate::index::{numbered_fallback, RelationshipIndex};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Document returned for a graph with nothing on it.
pub const BASE_TEMPLATE: &str = "# SPADE Base Template\n\n\
from spade.agent import Agent\n\n\
async def main():\n    while True:\n        pass\n";

/// Separator between top-level blocks: two blank lines.
const BLOCK_SEPARATOR: &str = "\n\n\n";

/// SPADE-specific Python code generator
pub struct SpadeCodeGenerator<'a> {
    nodes: &'a [Node],
    index: &'a RelationshipIndex,
    config: &'a GeneratorConfig,
    behaviour_classes: HashMap<&'a str, String>,
    template_numbers: HashMap<&'a str, usize>,
    message_numbers: HashMap<&'a str, usize>,
}

impl<'a> SpadeCodeGenerator<'a> {
    pub fn new(nodes: &'a [Node], index: &'a RelationshipIndex, config: &'a GeneratorConfig) -> Self {
        let mut behaviour_classes = HashMap::new();
        let mut template_numbers = HashMap::new();
        let mut message_numbers = HashMap::new();

        let mut taken_classes: HashSet<String> = index
            .agent_identity
            .values()
            .map(|identity| identity.class_name.clone())
            .chain(
                nodes
                    .iter()
                    .filter_map(|node| node.kind.behaviour())
                    .map(|behaviour| behaviour.class_name.trim().to_string()),
            )
            .collect();

        for node in nodes {
            match &node.kind {
                NodeKind::Behaviour(behaviour) => {
                    let number = behaviour_classes.len() + 1;
                    let class_name = match behaviour.class_name.trim() {
                        "" => numbered_fallback("MyBehaviour", number, &mut taken_classes),
                        name => name.to_string(),
                    };
                    behaviour_classes.insert(node.id.as_str(), class_name);
                }
                NodeKind::Template(_) => {
                    let number = template_numbers.len() + 1;
                    template_numbers.insert(node.id.as_str(), number);
                }
                NodeKind::Message(_) => {
                    let number = message_numbers.len() + 1;
                    message_numbers.insert(node.id.as_str(), number);
                }
                _ => {}
            }
        }

        Self {
            nodes,
            index,
            config,
            behaviour_classes,
            template_numbers,
            message_numbers,
        }
    }

    /// Generate the main document and every auxiliary document.
    pub fn generate(&self) -> GeneratedProject {
        GeneratedProject {
            main: GeneratedFile {
                name: self.config.entry_point.clone(),
                content: self.generate_program(),
            },
            auxiliary: self.auxiliary_documents(),
        }
    }

    /// Generate the complete Python program from the graph
    pub fn generate_program(&self) -> String {
        if self.nodes.is_empty() {
            return BASE_TEMPLATE.to_string();
        }

        let mut sections: Vec<String> = Vec::new();

        let imports = self.collect_imports().join("\n");
        if self.config.header {
            sections.push(format!("{}\n{}", header(), imports));
        } else {
            sections.push(imports);
        }

        sections.extend(self.behaviour_blocks());

        let agent_blocks = self.agent_blocks();
        tracing::debug!(
            "[CODEGEN] {} behaviour class(es), {} agent class(es)",
            self.behaviour_classes.len(),
            agent_blocks.len()
        );
        sections.extend(agent_blocks);

        sections.push(self.startup_sequence());
        sections.push("if __name__ == \"__main__\":\n    spade.run(main())".to_string());

        let mut code = sections.join(BLOCK_SEPARATOR);
        code.push('\n');
        code
    }

    /// One reasoning-program file per BDI agent with a non-empty program.
    pub fn auxiliary_documents(&self) -> Vec<GeneratedFile> {
        self.nodes
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::AgentBdi(bdi) if !bdi.program.trim().is_empty() => {
                    let identity = self.index.identity(&node.id)?;
                    Some(GeneratedFile {
                        name: self.config.reasoning_file_name(&identity.instance_name),
                        content: bdi.program.clone(),
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Sorted, de-duplicated import lines, each gated on what the graph uses.
    fn collect_imports(&self) -> Vec<String> {
        let mut imports: BTreeSet<String> = BTreeSet::new();
        imports.insert("import spade".to_string());

        let agents: Vec<&Node> = self.agents().collect();
        if !agents.is_empty() {
            imports.insert("from spade import wait_until_finished".to_string());
        }
        if agents.iter().any(|node| !matches!(node.kind, NodeKind::AgentBdi(_))) {
            imports.insert("from spade.agent import Agent".to_string());
        }
        if agents.iter().any(|node| matches!(node.kind, NodeKind::AgentBdi(_))) {
            imports.insert("from spade_bdi.bdi import BDIAgent".to_string());
        }

        let behaviours: Vec<&BehaviourData> = self.nodes.iter().filter_map(|node| node.kind.behaviour()).collect();
        let behaviour_types: BTreeSet<&str> = behaviours
            .iter()
            .map(|behaviour| behaviour.behaviour_type.as_str())
            .collect();
        if !behaviour_types.is_empty() {
            let types: Vec<&str> = behaviour_types.into_iter().collect();
            imports.insert(format!("from spade.behaviour import {}", types.join(", ")));
        }
        if behaviours.iter().any(|behaviour| uses_datetime(behaviour)) {
            imports.insert("import datetime".to_string());
        }

        if !self.template_numbers.is_empty() {
            imports.insert("from spade.template import Template".to_string());
        }
        if !self.message_numbers.is_empty() {
            imports.insert("from spade.message import Message".to_string());
        }

        imports.into_iter().collect()
    }

    fn agents(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.nodes.iter().filter(|node| node.is_agent())
    }

    fn behaviour_blocks(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter_map(|node| {
                let behaviour = node.kind.behaviour()?;
                let class_name = self.behaviour_classes.get(node.id.as_str())?;
                Some(behaviour_class_block(class_name, behaviour))
            })
            .collect()
    }

    /// Agent classes in node order, except that a parent class is always
    /// emitted before the classes inheriting from it.
    fn agent_blocks(&self) -> Vec<String> {
        self.agent_class_order()
            .into_iter()
            .filter_map(|(node, parents)| {
                let identity = self.index.identity(&node.id)?;
                let friends: Vec<&str> = self.index.friends_of(&node.id).collect();
                let bases: Vec<String> = parents
                    .iter()
                    .filter_map(|parent| self.index.identity(parent))
                    .map(|parent| parent.class_name.clone())
                    .collect();
                Some(agent_class_block(&node.kind, identity, &friends, &bases))
            })
            .collect()
    }

    fn agent_class_order(&self) -> Vec<(&'a Node, Vec<&'a str>)> {
        let mut remaining: Vec<&'a Node> = self.agents().collect();
        let mut emitted: HashSet<&str> = HashSet::new();
        let mut order = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready = remaining.iter().position(|node| {
                self.index
                    .parents_of(&node.id)
                    .iter()
                    .all(|parent| emitted.contains(parent.as_str()))
            });

            let node = match ready {
                Some(position) => remaining.remove(position),
                None => {
                    let node = remaining.remove(0);
                    tracing::warn!(
                        "[CODEGEN] Inheritance cycle through agent {}; dropping unresolved base classes",
                        node.id
                    );
                    node
                }
            };

            let parents: Vec<&'a str> = self
                .index
                .parents_of(&node.id)
                .iter()
                .map(String::as_str)
                .filter(|parent| emitted.contains(parent))
                .collect();

            emitted.insert(node.id.as_str());
            order.push((node, parents));
        }

        order
    }

    /// `async def main()`: instantiate every agent, then per agent build its
    /// templates, messages and behaviours, attach them and start it.
    fn startup_sequence(&self) -> String {
        let agents: Vec<&Node> = self.agents().collect();
        let mut lines: Vec<String> = vec!["async def main():".to_string()];

        if agents.is_empty() {
            lines.push("    pass".to_string());
            return lines.join("\n");
        }

        for node in &agents {
            if let (Some(agent), Some(identity)) = (node.kind.agent(), self.index.identity(&node.id)) {
                let asl_file = match &node.kind {
                    NodeKind::AgentBdi(bdi) if !bdi.program.trim().is_empty() => {
                        Some(self.config.reasoning_file_name(&identity.instance_name))
                    }
                    _ => None,
                };
                lines.push(instantiation(agent, identity, asl_file.as_deref(), self.config));
            }
        }

        let mut instance_names = Vec::with_capacity(agents.len());
        for node in &agents {
            let Some(identity) = self.index.identity(&node.id) else {
                continue;
            };
            let agent_var = identity.instance_name.as_str();

            for template_id in self.index.templates_of(&node.id) {
                if let Some(NodeKind::Template(template)) = self.node_kind(template_id) {
                    lines.extend(template_construction(&self.template_var(agent_var, template_id), template));
                }
            }

            for message_id in self.agent_messages(&node.id) {
                if let Some(NodeKind::Message(message)) = self.node_kind(message_id) {
                    lines.extend(message_construction(&self.message_var(agent_var, message_id), message));
                }
            }

            for (position, behaviour_id) in self.index.behaviours_of(&node.id).iter().enumerate() {
                let (Some(NodeKind::Behaviour(behaviour)), Some(class_name)) = (
                    self.node_kind(behaviour_id),
                    self.behaviour_classes.get(behaviour_id.as_str()),
                ) else {
                    continue;
                };

                let behaviour_var = format!("{}_behaviour_{}", agent_var, position + 1);
                let template_var = self
                    .index
                    .template_of(behaviour_id)
                    .filter(|template_id| self.template_numbers.contains_key(*template_id))
                    .map(|template_id| self.template_var(agent_var, template_id));

                lines.push(format!(
                    "    {} = {}({})",
                    behaviour_var,
                    class_name,
                    constructor_args(behaviour, template_var.as_deref()).join(", ")
                ));
                if let Some(message_id) = self.index.message_of(behaviour_id) {
                    if self.message_numbers.contains_key(message_id) {
                        lines.push(format!(
                            "    {}.message = {}",
                            behaviour_var,
                            self.message_var(agent_var, message_id)
                        ));
                    }
                }
                lines.push(format!("    {}.add_behaviour({})", agent_var, behaviour_var));
            }

            lines.push(format!("    await {}.start()", agent_var));
            instance_names.push(agent_var);
        }

        lines.push(format!("    await wait_until_finished([{}])", instance_names.join(", ")));
        lines.join("\n")
    }

    fn node_kind(&self, id: &str) -> Option<&'a NodeKind> {
        self.nodes.iter().find(|node| node.id == id).map(|node| &node.kind)
    }

    /// Messages bound to an agent's behaviours, first use first.
    fn agent_messages(&self, agent_id: &str) -> Vec<&'a str> {
        let mut messages: Vec<&'a str> = Vec::new();
        for behaviour_id in self.index.behaviours_of(agent_id) {
            let Some(message_id) = self.index.message_of(behaviour_id) else {
                continue;
            };
            if let Some((&id, _)) = self.message_numbers.get_key_value(message_id) {
                if !messages.contains(&id) {
                    messages.push(id);
                }
            }
        }
        messages
    }

    fn template_var(&self, agent_var: &str, template_id: &str) -> String {
        let number = self.template_numbers.get(template_id).copied().unwrap_or_default();
        format!("{}_template_{}", agent_var, number)
    }

    fn message_var(&self, agent_var: &str, message_id: &str) -> String {
        let number = self.message_numbers.get(message_id).copied().unwrap_or_default();
        format!("{}_message_{}", agent_var, number)
    }
}

fn header() -> &'static str {
    "# Auto-generated SPADE code from an agent graph\n\
# DO NOT EDIT - Changes will be overwritten\n\
# Compiled with SAGC (SPADE Agent Graph Compiler)\n"
}

fn template_construction(var: &str, template: &TemplateData) -> Vec<String> {
    let mut lines = vec![format!("    {} = Template()", var)];
    lines.extend(envelope_assignments(
        var,
        [
            ("sender", &template.sender),
            ("to", &template.to),
            ("body", &template.body),
            ("thread", &template.thread),
        ],
    ));
    lines.extend(metadata_statements(var, &template.metadata));
    lines
}

fn message_construction(var: &str, message: &MessageData) -> Vec<String> {
    let mut lines = vec![format!("    {} = Message()", var)];
    lines.extend(envelope_assignments(
        var,
        [
            ("sender", &message.sender),
            ("to", &message.to),
            ("body", &message.body),
            ("thread", &message.thread),
        ],
    ));
    lines.extend(metadata_statements(var, &message.metadata));
    lines
}

fn envelope_assignments<'f>(
    var: &'f str,
    fields: [(&'f str, &'f String); 4],
) -> impl Iterator<Item = String> + 'f {
    fields
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(move |(field, value)| format!("    {}.{} = {}", var, field, python_string(value)))
}

fn metadata_statements(var: &str, metadata: &BTreeMap<String, Value>) -> Vec<String> {
    metadata
        .iter()
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| {
            format!(
                "    {}.set_metadata({}, {})",
                var,
                python_string(key.trim()),
                user_value(value)
            )
        })
        .collect()
}
