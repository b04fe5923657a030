//! Graph nodes, branches and entry instructions.

use serde::{Deserialize, Serialize};
use skein_core::{BagError, BagResult, Metadata, MetadataValue, Value, VariableBag};

use super::condition::Condition;

/// A variable write executed by the graph when a node is entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Assign a value.
    Set {
        /// Variable set.
        set: String,
        /// Variable name.
        name: String,
        /// New value.
        value: Value,
    },
    /// Add to an integer variable.
    Add {
        /// Variable set.
        set: String,
        /// Variable name.
        name: String,
        /// Amount to add; may be negative.
        amount: i64,
    },
}

impl Instruction {
    /// The `(set, name)` this instruction writes.
    pub fn target(&self) -> (&str, &str) {
        match self {
            Self::Set { set, name, .. } | Self::Add { set, name, .. } => {
                (set.as_str(), name.as_str())
            }
        }
    }

    /// Run the instruction against the bag.
    pub fn execute(&self, bag: &mut dyn VariableBag) -> BagResult<()> {
        match self {
            Self::Set { set, name, value } => bag.set(set, name, value.clone()),
            Self::Add { set, name, amount } => {
                let current = bag
                    .get_int(set, name)?
                    .ok_or_else(|| BagError::UnknownVariable {
                        set: set.clone(),
                        name: name.clone(),
                    })?;
                bag.set(set, name, Value::Integer(current.saturating_add(*amount)))
            }
        }
    }
}

/// An outgoing connection from a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Target node id.
    pub target: String,
    /// Raw authoring label, shown when no display text is set.
    #[serde(default)]
    pub label: Option<String>,
    /// Display text.
    #[serde(default)]
    pub text: Option<String>,
    /// Speaker of the branch's line.
    #[serde(default)]
    pub speaker: Option<String>,
    /// Guard evaluated when the source node is entered.
    #[serde(default)]
    pub condition: Condition,
}

impl Branch {
    /// An unconditional branch to `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            label: None,
            text: None,
            speaker: None,
            condition: Condition::Always,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the speaker.
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Set the guard.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }
}

/// A node in a scripted graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique id.
    pub id: String,
    /// Speaker of the node's line.
    #[serde(default)]
    pub speaker: Option<String>,
    /// The node's line.
    #[serde(default)]
    pub text: String,
    /// Authored metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Variable writes run on entry, in order.
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    /// Outgoing branches, in authoring order.
    #[serde(default)]
    pub branches: Vec<Branch>,
}

impl Node {
    /// Create a node with a line of text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            speaker: None,
            text: text.into(),
            metadata: Metadata::new(),
            instructions: Vec::new(),
            branches: Vec::new(),
        }
    }

    /// Set the speaker.
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Add an entry instruction.
    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Add a branch.
    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }
}
