//! Dialogue flow for Skein.
//!
//! [`DialogueController`] walks a narrative graph through the [`FlowEngine`]
//! contract, defers each node's gameplay effects until the player confirms a
//! choice, and keeps [`skein_state::GameState`] synchronized with the
//! engine's variables along the way. [`ScriptGraph`] is a JSON-loadable
//! engine for tools and tests.

/// Dialogue and runtime configuration.
pub mod config;
/// The dialogue flow controller.
pub mod controller;
/// Deferred gameplay effects.
pub mod effect;
/// Error types for the dialogue layer.
pub mod error;
/// The narrative engine contract.
pub mod flow;
/// An in-memory scripted graph.
pub mod graph;
/// Choice presentation.
pub mod presenter;

pub use config::{DialogueConfig, RuntimeConfig};
pub use controller::{DialogueController, DialogueEvent, DialogueState};
pub use effect::{Effect, EffectBatch};
pub use error::{DialogueError, DialogueResult};
pub use flow::{FlowBranch, FlowEngine, FlowEvent, FlowNode};
pub use graph::{Branch, Condition, Instruction, Node, ScriptGraph};
pub use presenter::{ChoiceSet, ChoiceView, present_choices, resolve_choices};
