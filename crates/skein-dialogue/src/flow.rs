//! The contract between the dialogue controller and a narrative engine.
//!
//! The engine owns graph traversal. The controller moves the engine's
//! cursor with [`FlowEngine::start`] and [`FlowEngine::play`], and asks it to
//! run a node's entry logic with [`FlowEngine::enter`] once local effects
//! have been applied and pushed. Everything the engine has to report comes
//! back as an ordered list of [`FlowEvent`]s.

use std::fmt;

use serde::{Deserialize, Serialize};
use skein_core::{Metadata, VariableBag};

use crate::error::DialogueResult;

/// A node as seen by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    /// Node id.
    pub id: String,
    /// Who speaks the node's line, if anyone.
    pub speaker: Option<String>,
    /// The node's line.
    pub text: String,
    /// Authored metadata; effect keys are read from here.
    pub metadata: Metadata,
}

/// An outgoing branch whose condition currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowBranch {
    /// Position of the branch in its node, used to play it.
    pub index: usize,
    /// Target node id.
    pub target: String,
    /// Raw authoring label.
    pub label: Option<String>,
    /// Display text, if authored.
    pub text: Option<String>,
    /// Speaker of the branch's line.
    pub speaker: Option<String>,
}

/// Something the engine reports while entering a node.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    /// The cursor arrived at a node.
    NodeEntered(FlowNode),
    /// The engine wrote a variable.
    VariableChanged {
        /// Variable set.
        set: String,
        /// Variable name.
        name: String,
    },
    /// The valid outgoing branches of the current node. Empty means the
    /// flow has ended.
    BranchesUpdated(Vec<FlowBranch>),
}

/// A narrative engine that can be driven by the dialogue controller.
pub trait FlowEngine: fmt::Debug {
    /// Place the cursor on a node without entering it.
    fn start(&mut self, node: &str) -> DialogueResult<()>;

    /// Follow a branch of the current node without entering its target.
    ///
    /// `branch` is a [`FlowBranch::index`] reported by the last
    /// [`FlowEvent::BranchesUpdated`].
    fn play(&mut self, branch: usize) -> DialogueResult<()>;

    /// Run the current node's entry logic against the bag.
    fn enter(&mut self, bag: &mut dyn VariableBag) -> Vec<FlowEvent>;

    /// Stop traversal. The cursor is cleared.
    fn stop(&mut self);

    /// Id of the node under the cursor.
    fn current(&self) -> Option<&str>;
}
