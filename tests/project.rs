use sagc::{
    generate, generate_project, AgentData, BdiAgentData, BehaviourData, BehaviourType, Graph,
    GeneratorConfig, HandleKey, Node, NodeKind, Project, SagcError, StartMode,
};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const EDITOR_PROJECT: &str = r#"{
  "version": "1.0",
  "timestamp": "2025-03-01T10:00:00.000Z",
  "nodes": [
    {
      "id": "1",
      "type": "agent",
      "position": { "x": 120, "y": 80.5 },
      "data": {
        "class": "Pinger",
        "name": "pinger",
        "host": "localhost",
        "port": "5223",
        "password": "secret",
        "verify_security": false,
        "metadata": { "retries": "3", "peers": "[\"a\", true, null]" },
        "setupCode": ""
      }
    },
    {
      "id": "2",
      "type": "behaviour",
      "position": { "x": 400, "y": 80 },
      "data": {
        "class": "Ping",
        "type": "PeriodicBehaviour",
        "period": "10",
        "start_at_mode": "relative",
        "start_at_offset_s": "5",
        "start_at": "",
        "configCode": {}
      }
    },
    {
      "id": "3",
      "type": "stickyNote",
      "data": { "text": "ping every ten seconds" }
    }
  ],
  "edges": [
    {
      "id": "xy-edge__1behaviour-2behaviour",
      "source": "1",
      "target": "2",
      "sourceHandle": "behaviour",
      "targetHandle": "behaviour",
      "type": "agentBehaviour"
    }
  ]
}"#;

fn sample_graph() -> Graph {
    let mut graph = Graph::default();
    graph.add_node(Node::new(
        "a",
        NodeKind::Agent(AgentData {
            instance_name: "alice".into(),
            class_name: "Alice".into(),
            knowledge: [("greeting".to_string(), "hello".into())].into_iter().collect(),
            ..Default::default()
        }),
    ));
    graph.add_node(Node::new(
        "b",
        NodeKind::AgentBdi(BdiAgentData {
            agent: AgentData {
                instance_name: "bob".into(),
                class_name: "Bob".into(),
                port: Some(5223),
                ..Default::default()
            },
            belief_map: Some([("mood".to_string(), Some("calm".to_string()))].into_iter().collect()),
            program: "!greet.\n".into(),
            ..Default::default()
        }),
    ));
    graph.add_node(Node::new(
        "t",
        NodeKind::Behaviour(BehaviourData {
            class_name: "Greet".into(),
            behaviour_type: BehaviourType::Timeout,
            start_mode: Some(StartMode::Absolute),
            start_at: Some("2025-06-01T12:00:00Z".into()),
            ..Default::default()
        }),
    ));
    graph
        .connect("a", "t", HandleKey::Behaviour, HandleKey::Behaviour)
        .unwrap();
    graph
        .connect("a", "b", HandleKey::FriendshipSource, HandleKey::FriendshipTarget)
        .unwrap();
    graph
}

#[test]
fn saved_project_regenerates_identical_code() {
    let graph = sample_graph();
    let before = generate(&graph.nodes, &graph.edges).unwrap();

    let json = Project::from_graph(graph).to_json().unwrap();
    let loaded = Project::from_json(&json).unwrap();
    let after = generate_project(&loaded, &GeneratorConfig::default()).unwrap();

    assert_eq!(before, after);
}

#[test]
fn loads_editor_documents() {
    let project = Project::from_json(EDITOR_PROJECT).unwrap();
    assert_eq!(project.nodes.len(), 3);
    assert_eq!(project.edges.len(), 1);

    let code = generate_project(&project, &GeneratorConfig::default())
        .unwrap()
        .main
        .content;
    assert!(code.contains(
        "    pinger = Pinger(\"pinger@localhost\", \"secret\", port=5223, verify_security=False)\n"
    ));
    assert!(code.contains("        self.set(\"peers\", [\"a\", True, None])\n"));
    assert!(code.contains("        self.set(\"retries\", \"3\")\n"));
    assert!(code.contains(
        "    pinger_behaviour_1 = Ping(period=10, start_at=datetime.datetime.now() + datetime.timedelta(seconds=5))\n"
    ));
    assert!(!code.contains("ping every ten seconds"));
}

#[test]
fn relative_timeout_from_editor_keeps_start() {
    let json = r#"{
      "version": "1.0",
      "nodes": [
        {"id": "1", "type": "agent", "data": {"class": "Waiter", "name": "a"}},
        {"id": "2", "type": "behaviour", "data": {
          "class": "T",
          "type": "TimeoutBehaviour",
          "start_at_mode": "relative",
          "start_at_offset_s": "10"
        }}
      ],
      "edges": [
        {"id": "e", "source": "1", "target": "2", "sourceHandle": "behaviour", "targetHandle": "behaviour", "type": "agentBehaviour"}
      ]
    }"#;
    let project = Project::from_json(json).unwrap();
    let code = generate_project(&project, &GeneratorConfig::default())
        .unwrap()
        .main
        .content;
    assert!(code.contains(
        "    a_behaviour_1 = T(start_at=datetime.datetime.now() + datetime.timedelta(seconds=10))\n"
    ));
    assert!(code.contains("import datetime\n"));
}

#[test]
fn unknown_node_type_is_an_error() {
    let json = r#"{"version": "1.0", "nodes": [{"id": "1", "type": "robot", "data": {}}], "edges": []}"#;
    assert!(matches!(Project::from_json(json), Err(SagcError::Json(_))));
}

#[test]
fn archive_holds_main_and_reasoning_files() {
    let graph = sample_graph();
    let generated = generate(&graph.nodes, &graph.edges).unwrap();
    let bytes = generated.to_archive().unwrap();

    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);

    let mut main = String::new();
    archive
        .by_name("spade_code.py")
        .unwrap()
        .read_to_string(&mut main)
        .unwrap();
    assert_eq!(main, generated.main.content);

    let mut program = String::new();
    archive
        .by_name("bob_program.asl")
        .unwrap()
        .read_to_string(&mut program)
        .unwrap();
    assert_eq!(program, "!greet.\n");
}

#[test]
fn config_file_renames_outputs() {
    let config = GeneratorConfig::from_toml(
        "entry_point = \"agents.py\"\nreasoning_suffix = \"plan.asl\"\n",
    )
    .unwrap();
    let project = Project::from_graph(sample_graph());
    let generated = generate_project(&project, &config).unwrap();

    assert_eq!(generated.main.name, "agents.py");
    assert_eq!(generated.auxiliary[0].name, "bob_plan.asl");
    assert!(generated.main.content.contains("\"bob_plan.asl\", port=5223"));
}
