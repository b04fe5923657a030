//! Core types for Skein: values, records, and the variable-bag contract.
//!
//! This crate defines the data that flows between the local game-state
//! stores and the external narrative engine. It has no opinion about how the
//! stores are kept in sync; it only fixes the shapes: typed [`Value`]s, the
//! nested [`MetadataValue`]s found on graph nodes, the item/quest/knowledge
//! records, and the [`VariableBag`] trait through which the engine's variables
//! are reached.

/// The named-property contract with the narrative engine, plus an in-memory bag.
pub mod bag;
/// Error types used throughout the crate.
pub mod error;
/// Inventory item records.
pub mod item;
/// Knowledge fact records.
pub mod knowledge;
/// Nested metadata attached to narrative graph nodes.
pub mod metadata;
/// Variable naming conventions shared with the narrative engine.
pub mod naming;
/// Quest and objective records.
pub mod quest;
/// Typed scalar values stored in the variable bag.
pub mod value;

/// Re-export bag types.
pub use bag::{MemoryBag, VariableBag};
/// Re-export error types.
pub use error::{BagError, BagResult, CoreError, CoreResult};
/// Re-export record types.
pub use item::Item;
/// Re-export knowledge types.
pub use knowledge::KnowledgeFact;
/// Re-export metadata types.
pub use metadata::{Metadata, MetadataValue};
/// Re-export quest types.
pub use quest::{Objective, Quest, QuestState};
/// Re-export value types.
pub use value::{Value, VarType};
