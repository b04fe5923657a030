//! An in-memory scripted narrative graph.
//!
//! [`ScriptGraph`] is a small [`FlowEngine`] loaded from JSON. Nodes carry a
//! line of text, metadata for effect batches and instructions that write
//! the variable bag on entry. Branches are guarded by [`Condition`]s read
//! from the bag.

mod condition;
mod node;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skein_core::VariableBag;
use tracing::{debug, warn};

pub use condition::Condition;
pub use node::{Branch, Instruction, Node};

use crate::error::{DialogueError, DialogueResult};
use crate::flow::{FlowBranch, FlowEngine, FlowEvent, FlowNode};

#[derive(Serialize, Deserialize)]
struct GraphFile {
    #[serde(default)]
    start: Option<String>,
    nodes: Vec<Node>,
}

/// A narrative graph held in memory.
#[derive(Debug, Clone, Default)]
pub struct ScriptGraph {
    nodes: BTreeMap<String, Node>,
    start: Option<String>,
    cursor: Option<String>,
    valid: Vec<usize>,
}

impl ScriptGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a graph from JSON: `{ "start": "id", "nodes": [ ... ] }`.
    ///
    /// A later node with an id already seen replaces the earlier one.
    pub fn from_json(json: &str) -> DialogueResult<Self> {
        let file: GraphFile = serde_json::from_str(json)?;
        let mut graph = Self::new();
        graph.start = file.start;
        for node in file.nodes {
            graph.insert(node);
        }
        Ok(graph)
    }

    /// Serialize the graph back to JSON.
    pub fn to_json(&self) -> DialogueResult<String> {
        let file = GraphFile {
            start: self.start.clone(),
            nodes: self.nodes.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Add a node.
    pub fn with_node(mut self, node: Node) -> Self {
        self.insert(node);
        self
    }

    /// Set the default start node.
    pub fn with_start(mut self, id: impl Into<String>) -> Self {
        self.start = Some(id.into());
        self
    }

    /// Insert or replace a node.
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Look up a node.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// The default start node, if one is set.
    pub fn start_node(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Describe every structural problem: a missing start node and branches
    /// pointing at unknown nodes. Empty when the graph is sound.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Some(start) = self.start.as_ref().filter(|s| !self.nodes.contains_key(*s)) {
            problems.push(format!("start node `{start}` does not exist"));
        }
        for node in self.nodes.values() {
            for (index, branch) in node.branches.iter().enumerate() {
                if !self.nodes.contains_key(&branch.target) {
                    problems.push(format!(
                        "node `{}` branch {index} targets unknown node `{}`",
                        node.id, branch.target
                    ));
                }
            }
        }
        problems
    }

    fn valid_branches(node: &Node, bag: &dyn VariableBag) -> Vec<FlowBranch> {
        node.branches
            .iter()
            .enumerate()
            .filter(|(_, branch)| branch.condition.evaluate(bag))
            .map(|(index, branch)| FlowBranch {
                index,
                target: branch.target.clone(),
                label: branch.label.clone(),
                text: branch.text.clone(),
                speaker: branch.speaker.clone(),
            })
            .collect()
    }
}

impl FlowEngine for ScriptGraph {
    fn start(&mut self, node: &str) -> DialogueResult<()> {
        if !self.nodes.contains_key(node) {
            return Err(DialogueError::UnknownNode(node.to_string()));
        }
        self.cursor = Some(node.to_string());
        self.valid.clear();
        Ok(())
    }

    fn play(&mut self, branch: usize) -> DialogueResult<()> {
        let node = self
            .cursor
            .as_ref()
            .and_then(|id| self.nodes.get(id))
            .ok_or(DialogueError::InvalidChoice(branch))?;
        if !self.valid.contains(&branch) {
            return Err(DialogueError::InvalidChoice(branch));
        }
        let target = node
            .branches
            .get(branch)
            .map(|b| b.target.clone())
            .ok_or(DialogueError::InvalidChoice(branch))?;
        if !self.nodes.contains_key(&target) {
            return Err(DialogueError::UnknownNode(target));
        }
        debug!(from = %node.id, to = %target, "following branch");
        self.cursor = Some(target);
        self.valid.clear();
        Ok(())
    }

    fn enter(&mut self, bag: &mut dyn VariableBag) -> Vec<FlowEvent> {
        let Some(node) = self.cursor.as_ref().and_then(|id| self.nodes.get(id)) else {
            return Vec::new();
        };
        let mut events = vec![FlowEvent::NodeEntered(FlowNode {
            id: node.id.clone(),
            speaker: node.speaker.clone(),
            text: node.text.clone(),
            metadata: node.metadata.clone(),
        })];

        for instruction in &node.instructions {
            let (set, name) = instruction.target();
            match instruction.execute(bag) {
                Ok(()) => events.push(FlowEvent::VariableChanged {
                    set: set.to_string(),
                    name: name.to_string(),
                }),
                Err(e) => warn!(node = %node.id, set, name, error = %e, "instruction failed"),
            }
        }

        let branches = Self::valid_branches(node, &*bag);
        self.valid = branches.iter().map(|b| b.index).collect();
        events.push(FlowEvent::BranchesUpdated(branches));
        events
    }

    fn stop(&mut self) {
        self.cursor = None;
        self.valid.clear();
    }

    fn current(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use skein_core::{MemoryBag, Value};

    use super::*;

    fn graph() -> ScriptGraph {
        ScriptGraph::new()
            .with_start("gate")
            .with_node(
                Node::new("gate", "Who goes there?")
                    .with_speaker("Guard")
                    .with_instruction(Instruction::Set {
                        set: "Flags".into(),
                        name: "met_guard".into(),
                        value: Value::Boolean(true),
                    })
                    .with_branch(
                        Branch::new("friend")
                            .with_speaker("Player")
                            .with_text("A friend."),
                    )
                    .with_branch(
                        Branch::new("secret")
                            .with_speaker("Player")
                            .with_condition(Condition::HasFlag {
                                set: "Flags".into(),
                                name: "knows_password".into(),
                            }),
                    ),
            )
            .with_node(Node::new("friend", "Pass, friend."))
            .with_node(Node::new("secret", "Ah, welcome back."))
    }

    fn bag() -> MemoryBag {
        MemoryBag::new()
            .with_var("Flags", "met_guard", false)
            .with_var("Flags", "knows_password", false)
    }

    #[test]
    fn enter_runs_instructions_and_filters_branches() {
        let mut graph = graph();
        let mut bag = bag();
        graph.start("gate").unwrap();
        let events = graph.enter(&mut bag);

        assert!(matches!(&events[0], FlowEvent::NodeEntered(node) if node.id == "gate"));
        assert_eq!(
            events[1],
            FlowEvent::VariableChanged {
                set: "Flags".into(),
                name: "met_guard".into()
            }
        );
        match &events[2] {
            FlowEvent::BranchesUpdated(branches) => {
                assert_eq!(branches.len(), 1);
                assert_eq!(branches[0].target, "friend");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(bag.get_bool("Flags", "met_guard").unwrap(), Some(true));
    }

    #[test]
    fn play_only_accepts_valid_branches() {
        let mut graph = graph();
        let mut bag = bag();
        graph.start("gate").unwrap();
        graph.enter(&mut bag);

        assert!(matches!(graph.play(1), Err(DialogueError::InvalidChoice(1))));
        graph.play(0).unwrap();
        assert_eq!(graph.current(), Some("friend"));
    }

    #[test]
    fn conditions_see_bag_at_entry_time() {
        let mut graph = graph();
        let mut bag = bag();
        bag.set("Flags", "knows_password", Value::Boolean(true)).unwrap();
        graph.start("gate").unwrap();
        graph.enter(&mut bag);
        graph.play(1).unwrap();
        assert_eq!(graph.current(), Some("secret"));
    }

    #[test]
    fn failed_instruction_is_skipped() {
        let mut graph = graph();
        let mut bag = MemoryBag::new().with_var("Flags", "knows_password", false);
        graph.start("gate").unwrap();
        let events = graph.enter(&mut bag);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn start_rejects_unknown_node() {
        let mut graph = graph();
        assert!(matches!(
            graph.start("nowhere"),
            Err(DialogueError::UnknownNode(id)) if id == "nowhere"
        ));
        assert_eq!(graph.current(), None);
    }

    #[test]
    fn validate_reports_dangling_targets() {
        let graph = graph()
            .with_start("missing")
            .with_node(Node::new("loop", "...").with_branch(Branch::new("void")));
        let problems = graph.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("missing"));
        assert!(problems[1].contains("void"));
        assert!(self::graph().validate().is_empty());
    }

    #[test]
    fn json_round_trip_preserves_structure() {
        let graph = graph();
        let loaded = ScriptGraph::from_json(&graph.to_json().unwrap()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.start_node(), Some("gate"));
        assert_eq!(loaded.node("gate"), graph.node("gate"));
    }

    #[test]
    fn stop_clears_cursor() {
        let mut graph = graph();
        graph.start("gate").unwrap();
        graph.stop();
        assert_eq!(graph.current(), None);
        assert!(graph.enter(&mut bag()).is_empty());
    }
}
