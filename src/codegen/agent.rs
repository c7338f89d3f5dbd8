//! # Agent Emission
//!
//! Class blocks for agent nodes and their instantiation in `main()`.

use super::literal::{python_literal, python_string, user_text, user_value};
use crate::config::GeneratorConfig;
use crate::graph::{AgentData, NodeKind};
use crate::index::AgentIdentity;

const SETUP_INDENT: &str = "        ";
const METHOD_INDENT: &str = "    ";

/// Class definition for an agent node.
///
/// The setup body runs, in order: presence subscriptions, BDI beliefs,
/// knowledge entries, the LLM prompt, then the user's setup code. BDI helper
/// functions follow as sibling methods.
pub fn agent_class_block(
    kind: &NodeKind,
    identity: &AgentIdentity,
    friends: &[&str],
    bases: &[String],
) -> String {
    let Some(agent) = kind.agent() else {
        return String::new();
    };

    let base_list = if bases.is_empty() {
        default_base(kind).to_string()
    } else {
        bases.join(", ")
    };

    let mut code = format!("class {}({}):\n", identity.class_name, base_list);
    code.push_str("    async def setup(self):\n");

    if !bases.is_empty() {
        code.push_str(&format!("{}await super().setup()\n", SETUP_INDENT));
    }

    for friend in friends {
        code.push_str(&presence_subscription(friend));
    }

    if let NodeKind::AgentBdi(bdi) = kind {
        code.push_str(&belief_initialisation(&bdi.beliefs()));
    }

    code.push_str(&knowledge_statements(agent));

    if let NodeKind::AgentLlm(llm) = kind {
        if !llm.prompt.trim().is_empty() {
            code.push_str(&format!(
                "{}self.set(\"llm_prompt\", {})\n",
                SETUP_INDENT,
                python_string(&llm.prompt)
            ));
        }
    }

    code.push_str(&setup_body(&agent.setup_code));

    if let NodeKind::AgentBdi(bdi) = kind {
        for function in bdi.functions.iter().filter(|f| !f.trim().is_empty()) {
            code.push('\n');
            code.push_str(&indent_block(function.trim_end(), METHOD_INDENT));
        }
    }

    code.trim_end().to_string()
}

fn default_base(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::AgentBdi(_) => "BDIAgent",
        _ => "Agent",
    }
}

pub fn presence_subscription(jid: &str) -> String {
    format!("{}await self.presence.subscribe({})\n", SETUP_INDENT, python_string(jid))
}

fn belief_initialisation(beliefs: &std::collections::BTreeMap<String, Option<String>>) -> String {
    if beliefs.is_empty() {
        return String::new();
    }

    let entries: Vec<String> = beliefs
        .iter()
        .map(|(name, value)| {
            let value = match value {
                Some(value) => user_text(value),
                None => python_literal(&serde_json::Value::Null),
            };
            format!("{}: {}", python_string(name), value)
        })
        .collect();

    let mut code = format!("{}initial_beliefs = {{{}}}\n", SETUP_INDENT, entries.join(", "));
    code.push_str(&format!("{}for belief, value in initial_beliefs.items():\n", SETUP_INDENT));
    code.push_str(&format!("{}    if value is None:\n", SETUP_INDENT));
    code.push_str(&format!("{}        self.bdi.set_belief(belief)\n", SETUP_INDENT));
    code.push_str(&format!("{}    else:\n", SETUP_INDENT));
    code.push_str(&format!("{}        self.bdi.set_belief(belief, value)\n", SETUP_INDENT));
    code
}

fn knowledge_statements(agent: &AgentData) -> String {
    agent
        .knowledge
        .iter()
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| {
            format!(
                "{}self.set({}, {})\n",
                SETUP_INDENT,
                python_string(key.trim()),
                user_value(value)
            )
        })
        .collect()
}

fn setup_body(setup_code: &str) -> String {
    if setup_code.trim().is_empty() {
        return format!("{}pass\n", SETUP_INDENT);
    }
    let mut code = indent_block(setup_code.trim_end(), SETUP_INDENT);
    code.push('\n');
    code
}

/// Indents every non-blank line; blank lines stay empty.
pub fn indent_block(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `name = Class(jid, password, [asl,] port=..., verify_security=...)`
pub fn instantiation(
    agent: &AgentData,
    identity: &AgentIdentity,
    asl_file: Option<&str>,
    config: &GeneratorConfig,
) -> String {
    let password = if agent.password.is_empty() {
        config.default_password.as_str()
    } else {
        agent.password.as_str()
    };

    let mut args = vec![python_string(&identity.jid), python_string(password)];
    if let Some(asl_file) = asl_file {
        args.push(python_string(asl_file));
    }
    args.push(format!("port={}", agent.port.unwrap_or(config.default_port)));
    args.push(format!(
        "verify_security={}",
        if agent.verify_security { "True" } else { "False" }
    ));

    format!(
        "    {} = {}({})",
        identity.instance_name,
        identity.class_name,
        args.join(", ")
    )
}
