//! Game-state stores for Skein and their bridge to the narrative engine.
//!
//! The inventory, quest log and knowledge log are plain in-memory stores.
//! [`VariableBridge`] maps them onto the engine's variable bag by naming
//! convention, and [`GameState`] ties everything together: every mutation
//! made through it is pushed to the bag and announced as a [`StateEvent`].

/// The variable synchronization bridge.
pub mod bridge;
/// In-game time.
pub mod clock;
/// Configuration for stores and the bridge.
pub mod config;
/// Error types for the state layer.
pub mod error;
/// Change notifications.
pub mod event;
/// The inventory store.
pub mod inventory;
/// The knowledge store.
pub mod knowledge;
/// Player attribute view.
pub mod player;
/// Per-quest behavior hooks.
pub mod policy;
/// The quest store.
pub mod quests;
/// The game-state hub.
pub mod state;

/// Re-export the bridge.
pub use bridge::VariableBridge;
/// Re-export the clock.
pub use clock::GameClock;
/// Re-export configuration types.
pub use config::{ItemDef, PlayerVars, QuestPolicyDef, StageRemap, StateConfig};
/// Re-export error types.
pub use error::{StateError, StateResult};
/// Re-export notification types.
pub use event::{Listener, StateEvent};
/// Re-export the inventory.
pub use inventory::{Inventory, ItemChange};
/// Re-export the knowledge log.
pub use knowledge::KnowledgeLog;
/// Re-export the player view.
pub use player::PlayerView;
/// Re-export policy types.
pub use policy::{PolicyRegistry, QuestPolicy, StagePolicy};
/// Re-export the quest log.
pub use quests::QuestLog;
/// Re-export the hub.
pub use state::GameState;
