//! # Graph Nodes
//!
//! One record shape per node kind. The editor stores nodes as
//! `{"id", "type", "position", "data"}`; `RawNode` is that wire shape and
//! the typed [`Node`] is converted from it on load.

use super::de;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Canvas coordinates. Irrelevant to code generation but kept for round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single graph element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node {
    pub id: String,
    pub position: Option<Position>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            position: None,
            kind,
        }
    }

    pub fn is_agent(&self) -> bool {
        self.kind.agent().is_some()
    }
}

/// Node payload, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Agent(AgentData),
    AgentBdi(BdiAgentData),
    AgentLlm(LlmAgentData),
    Behaviour(BehaviourData),
    Template(TemplateData),
    Message(MessageData),
    StickyNote(StickyNoteData),
}

impl NodeKind {
    /// The `type` tag used in project files.
    pub fn type_tag(&self) -> &'static str {
        match self {
            NodeKind::Agent(_) => "agent",
            NodeKind::AgentBdi(_) => "agentBDI",
            NodeKind::AgentLlm(_) => "agentLLM",
            NodeKind::Behaviour(_) => "behaviour",
            NodeKind::Template(_) => "template",
            NodeKind::Message(_) => "message",
            NodeKind::StickyNote(_) => "stickyNote",
        }
    }

    /// Settings shared by every agent variant.
    pub fn agent(&self) -> Option<&AgentData> {
        match self {
            NodeKind::Agent(agent) => Some(agent),
            NodeKind::AgentBdi(bdi) => Some(&bdi.agent),
            NodeKind::AgentLlm(llm) => Some(&llm.agent),
            _ => None,
        }
    }

    pub fn agent_mut(&mut self) -> Option<&mut AgentData> {
        match self {
            NodeKind::Agent(agent) => Some(agent),
            NodeKind::AgentBdi(bdi) => Some(&mut bdi.agent),
            NodeKind::AgentLlm(llm) => Some(&mut llm.agent),
            _ => None,
        }
    }

    pub fn behaviour(&self) -> Option<&BehaviourData> {
        match self {
            NodeKind::Behaviour(behaviour) => Some(behaviour),
            _ => None,
        }
    }
}

/// Agent settings common to all agent variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentData {
    #[serde(rename = "class", deserialize_with = "de::text")]
    pub class_name: String,

    #[serde(rename = "name", deserialize_with = "de::text")]
    pub instance_name: String,

    #[serde(deserialize_with = "de::text")]
    pub host: String,

    #[serde(deserialize_with = "de::lenient_port", skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(deserialize_with = "de::text")]
    pub password: String,

    #[serde(deserialize_with = "de::lenient_bool")]
    pub verify_security: bool,

    /// Knowledge base entries, set on the agent during setup.
    #[serde(rename = "metadata")]
    pub knowledge: BTreeMap<String, Value>,

    #[serde(rename = "setupCode", deserialize_with = "de::text")]
    pub setup_code: String,
}

/// A reasoning (BDI) agent: an agent plus beliefs and an AgentSpeak program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BdiAgentData {
    #[serde(flatten)]
    pub agent: AgentData,

    #[serde(rename = "beliefsObj", skip_serializing_if = "Option::is_none")]
    pub belief_map: Option<BTreeMap<String, Option<String>>>,

    /// Older projects store beliefs as `"name"` or `"name:value"` strings.
    #[serde(rename = "beliefs", skip_serializing_if = "Vec::is_empty")]
    pub legacy_beliefs: Vec<String>,

    #[serde(rename = "bdiProgram", deserialize_with = "de::text")]
    pub program: String,

    /// Extra Python methods appended to the agent class.
    #[serde(rename = "bdiFunctions")]
    pub functions: Vec<String>,
}

impl BdiAgentData {
    /// Initial beliefs. Blank values mean "belief without arguments".
    pub fn beliefs(&self) -> BTreeMap<String, Option<String>> {
        match &self.belief_map {
            Some(map) => map
                .iter()
                .filter(|(name, _)| !name.trim().is_empty())
                .map(|(name, value)| {
                    let value = value.as_ref().filter(|v| !v.trim().is_empty()).cloned();
                    (name.trim().to_string(), value)
                })
                .collect(),
            None => parse_legacy_beliefs(&self.legacy_beliefs),
        }
    }
}

fn parse_legacy_beliefs(entries: &[String]) -> BTreeMap<String, Option<String>> {
    let mut beliefs = BTreeMap::new();
    for entry in entries {
        let (name, value) = match entry.split_once(':') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (entry.trim(), None),
        };
        if name.is_empty() {
            continue;
        }
        let value = value.filter(|v| !v.is_empty()).map(str::to_string);
        beliefs.insert(name.to_string(), value);
    }
    beliefs
}

/// An agent driven by a language model prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmAgentData {
    #[serde(flatten)]
    pub agent: AgentData,

    #[serde(rename = "llmPrompt", deserialize_with = "de::text")]
    pub prompt: String,
}

/// SPADE behaviour base classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BehaviourType {
    #[default]
    #[serde(rename = "CyclicBehaviour")]
    Cyclic,
    #[serde(rename = "OneShotBehaviour")]
    OneShot,
    #[serde(rename = "TimeoutBehaviour")]
    Timeout,
    #[serde(rename = "PeriodicBehaviour")]
    Periodic,
    #[serde(rename = "FSMBehaviour")]
    Fsm,
}

impl BehaviourType {
    /// Python class name of the SPADE base class.
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviourType::Cyclic => "CyclicBehaviour",
            BehaviourType::OneShot => "OneShotBehaviour",
            BehaviourType::Timeout => "TimeoutBehaviour",
            BehaviourType::Periodic => "PeriodicBehaviour",
            BehaviourType::Fsm => "FSMBehaviour",
        }
    }
}

impl fmt::Display for BehaviourType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a timed behaviour's `start_at` is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourData {
    #[serde(rename = "class", deserialize_with = "de::text")]
    pub class_name: String,

    #[serde(rename = "type")]
    pub behaviour_type: BehaviourType,

    #[serde(deserialize_with = "de::lenient_number", skip_serializing_if = "Option::is_none")]
    pub period: Option<f64>,

    /// Absent or blank means absolute.
    #[serde(
        rename = "start_at_mode",
        alias = "start_mode",
        deserialize_with = "de::lenient_enum",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_mode: Option<StartMode>,

    /// ISO-8601 timestamp in absolute mode.
    #[serde(deserialize_with = "de::lenient_string", skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,

    /// Seconds from "now" in relative mode.
    #[serde(
        rename = "start_at_offset_s",
        alias = "start_offset",
        deserialize_with = "de::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_offset: Option<f64>,

    /// User code per behaviour type, keyed by the SPADE class name.
    #[serde(rename = "configCode")]
    pub config_code: BTreeMap<String, String>,
}

impl BehaviourData {
    /// The user's class definition for the current behaviour type, if any.
    pub fn user_code(&self) -> Option<&str> {
        self.config_code
            .get(self.behaviour_type.as_str())
            .map(String::as_str)
            .filter(|code| !code.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateData {
    #[serde(deserialize_with = "de::text")]
    pub sender: String,
    #[serde(deserialize_with = "de::text")]
    pub to: String,
    #[serde(deserialize_with = "de::text")]
    pub body: String,
    #[serde(deserialize_with = "de::text")]
    pub thread: String,
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageData {
    #[serde(deserialize_with = "de::text")]
    pub sender: String,
    #[serde(deserialize_with = "de::text")]
    pub to: String,
    #[serde(deserialize_with = "de::text")]
    pub body: String,
    #[serde(deserialize_with = "de::text")]
    pub thread: String,
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickyNoteData {
    #[serde(deserialize_with = "de::text")]
    pub text: String,
}

/// Node as it appears in a project file.
#[derive(Serialize, Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawNode> for Node {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let data = match raw.data {
            Value::Null => Value::Object(Default::default()),
            data => data,
        };
        let decode_error = |e: serde_json::Error| format!("node '{}': {}", raw.id, e);

        let kind = match raw.node_type.as_str() {
            "agent" => NodeKind::Agent(serde_json::from_value(data).map_err(decode_error)?),
            "agentBDI" => NodeKind::AgentBdi(serde_json::from_value(data).map_err(decode_error)?),
            "agentLLM" => NodeKind::AgentLlm(serde_json::from_value(data).map_err(decode_error)?),
            "behaviour" => NodeKind::Behaviour(serde_json::from_value(data).map_err(decode_error)?),
            "template" => NodeKind::Template(serde_json::from_value(data).map_err(decode_error)?),
            "message" => NodeKind::Message(serde_json::from_value(data).map_err(decode_error)?),
            "stickyNote" => NodeKind::StickyNote(serde_json::from_value(data).map_err(decode_error)?),
            other => return Err(format!("node '{}': unknown node type '{}'", raw.id, other)),
        };

        Ok(Node {
            id: raw.id,
            position: raw.position,
            kind,
        })
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let node_type = node.kind.type_tag().to_string();
        // These records only hold strings, numbers and string-keyed maps, so
        // encoding them as a JSON value does not fail.
        let data = match &node.kind {
            NodeKind::Agent(d) => serde_json::to_value(d),
            NodeKind::AgentBdi(d) => serde_json::to_value(d),
            NodeKind::AgentLlm(d) => serde_json::to_value(d),
            NodeKind::Behaviour(d) => serde_json::to_value(d),
            NodeKind::Template(d) => serde_json::to_value(d),
            NodeKind::Message(d) => serde_json::to_value(d),
            NodeKind::StickyNote(d) => serde_json::to_value(d),
        }
        .unwrap_or_default();

        RawNode {
            id: node.id,
            node_type,
            position: node.position,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_editor_agent_node() {
        let node: Node = serde_json::from_value(json!({
            "id": "dndnode_0",
            "type": "agent",
            "position": {"x": 10.0, "y": 20.0},
            "data": {
                "class": "MyAgent1",
                "name": "agent1",
                "host": "localhost",
                "port": "5222",
                "password": "secret",
                "verify_security": true,
                "metadata": {"role": "seller"},
                "title": "Agent"
            }
        }))
        .unwrap();

        let agent = node.kind.agent().unwrap();
        assert_eq!(agent.class_name, "MyAgent1");
        assert_eq!(agent.instance_name, "agent1");
        assert_eq!(agent.port, Some(5222));
        assert!(agent.verify_security);
        assert_eq!(agent.knowledge.get("role"), Some(&json!("seller")));
        assert_eq!(node.position, Some(Position { x: 10.0, y: 20.0 }));
    }

    #[test]
    fn bdi_agent_keeps_shared_fields_and_beliefs() {
        let node: Node = serde_json::from_value(json!({
            "id": "n1",
            "type": "agentBDI",
            "data": {
                "class": "Thinker",
                "name": "thinker",
                "beliefsObj": {"location": "kitchen", "hungry": null, "tired": ""},
                "bdiProgram": "!start.",
                "bdiFunctions": ["def helper(self):\n    pass"]
            }
        }))
        .unwrap();

        let NodeKind::AgentBdi(bdi) = &node.kind else {
            panic!("expected a BDI agent");
        };
        assert_eq!(bdi.agent.class_name, "Thinker");
        assert_eq!(bdi.program, "!start.");
        let beliefs = bdi.beliefs();
        assert_eq!(beliefs.get("location"), Some(&Some("kitchen".to_string())));
        assert_eq!(beliefs.get("hungry"), Some(&None));
        assert_eq!(beliefs.get("tired"), Some(&None));
    }

    #[test]
    fn legacy_belief_strings_are_normalised() {
        let bdi = BdiAgentData {
            legacy_beliefs: vec!["location:kitchen".into(), "hungry".into(), " : x".into()],
            ..Default::default()
        };
        let beliefs = bdi.beliefs();
        assert_eq!(beliefs.len(), 2);
        assert_eq!(beliefs.get("location"), Some(&Some("kitchen".to_string())));
        assert_eq!(beliefs.get("hungry"), Some(&None));
    }

    #[test]
    fn behaviour_user_code_follows_selected_type() {
        let node: Node = serde_json::from_value(json!({
            "id": "b1",
            "type": "behaviour",
            "data": {
                "class": "Ticker",
                "type": "PeriodicBehaviour",
                "period": "5",
                "configCode": {
                    "CyclicBehaviour": "class Ticker(CyclicBehaviour): ...",
                    "PeriodicBehaviour": "class Ticker(PeriodicBehaviour): ..."
                }
            }
        }))
        .unwrap();

        let behaviour = node.kind.behaviour().unwrap();
        assert_eq!(behaviour.behaviour_type, BehaviourType::Periodic);
        assert_eq!(behaviour.period, Some(5.0));
        assert_eq!(behaviour.user_code(), Some("class Ticker(PeriodicBehaviour): ..."));
    }

    #[test]
    fn behaviour_start_fields_use_editor_keys() {
        let node: Node = serde_json::from_value(json!({
            "id": "b2",
            "type": "behaviour",
            "data": {
                "class": "Later",
                "type": "TimeoutBehaviour",
                "start_at_mode": "relative",
                "start_at_offset_s": "10",
                "start_at": ""
            }
        }))
        .unwrap();

        let behaviour = node.kind.behaviour().unwrap();
        assert_eq!(behaviour.start_mode, Some(StartMode::Relative));
        assert_eq!(behaviour.start_offset, Some(10.0));
        assert_eq!(behaviour.start_at, None);

        let encoded = serde_json::to_value(&node).unwrap();
        assert_eq!(encoded["data"]["start_at_mode"], "relative");
        assert_eq!(encoded["data"]["start_at_offset_s"], 10.0);
    }

    #[test]
    fn blank_start_mode_loads_as_absent() {
        let node: Node = serde_json::from_value(json!({
            "id": "b3",
            "type": "behaviour",
            "data": {"type": "TimeoutBehaviour", "start_at_mode": "", "start_at": "2025-03-01T09:30"}
        }))
        .unwrap();
        assert_eq!(node.kind.behaviour().unwrap().start_mode, None);
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let result: Result<Node, _> =
            serde_json::from_value(json!({"id": "x", "type": "robot", "data": {}}));
        assert!(result.unwrap_err().to_string().contains("unknown node type 'robot'"));
    }

    #[test]
    fn missing_data_loads_defaults() {
        let node: Node = serde_json::from_value(json!({"id": "s", "type": "stickyNote"})).unwrap();
        assert_eq!(node.kind, NodeKind::StickyNote(StickyNoteData::default()));
    }

    #[test]
    fn node_survives_encode_and_decode() {
        let node = Node::new(
            "t1",
            NodeKind::Template(TemplateData {
                sender: "a@localhost".into(),
                metadata: BTreeMap::from([("performative".to_string(), json!("inform"))]),
                ..Default::default()
            }),
        );
        let encoded = serde_json::to_value(&node).unwrap();
        assert_eq!(encoded["type"], "template");
        assert_eq!(encoded["data"]["sender"], "a@localhost");
        let decoded: Node = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, node);
    }
}
