//! Configuration for the state stores and the bridge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skein_core::QuestState;

use crate::error::StateResult;

/// Static description of an item kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Technical id.
    pub id: String,
    /// Unique items are held at most once.
    #[serde(default)]
    pub unique: bool,
    /// When set, the item is a clue: it has a presence flag in the clue set
    /// and contributes this weight to the clue score.
    #[serde(default)]
    pub clue_weight: Option<i64>,
}

impl ItemDef {
    /// A plain stackable item.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unique: false,
            clue_weight: None,
        }
    }

    /// Mark the item unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark the item as a clue with the given weight.
    pub fn clue(mut self, weight: i64) -> Self {
        self.clue_weight = Some(weight);
        self
    }
}

/// Rewrites an incoming stage number once the loop counter reaches a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRemap {
    /// Stage as written by the narrative engine.
    pub from: u32,
    /// Stage to record instead.
    pub to: u32,
    /// Minimum loop counter value for the remap to apply.
    #[serde(default = "default_min_loop")]
    pub min_loop: i64,
}

fn default_min_loop() -> i64 {
    1
}

/// Data-driven per-quest behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestPolicyDef {
    /// Quest name.
    pub name: String,
    /// Temporary quests are purged on a loop reset.
    pub temporary: bool,
    /// Stage number to journal description.
    pub stages: BTreeMap<u32, String>,
    /// Incoming stage corrections.
    pub remaps: Vec<StageRemap>,
    /// Terminal state forced on a loop reset while the quest sits at a stage.
    pub loop_reset: BTreeMap<u32, QuestState>,
}

/// Names of the player attribute variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerVars {
    /// Moral value variable.
    pub moral_value: String,
    /// Moral cap variable.
    pub moral_cap: String,
    /// Prefix shared by all skill variables.
    pub skill_prefix: String,
}

impl Default for PlayerVars {
    fn default() -> Self {
        Self {
            moral_value: "MoralValue".to_string(),
            moral_cap: "MoralCap".to_string(),
            skill_prefix: "Skill_".to_string(),
        }
    }
}

/// Configuration for the stores and the variable bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Set holding `item_<id>_delta` / `item_<id>_count`.
    pub inventory_set: String,
    /// Set holding quest variables.
    pub quest_set: String,
    /// Set holding one boolean per knowledge fact.
    pub knowledge_set: String,
    /// Set holding one boolean per clue item plus the score.
    pub clue_set: String,
    /// Name of the clue score variable inside the clue set.
    pub clue_score_variable: String,
    /// Set written by `SetFlag` effects.
    pub flag_set: String,
    /// Set holding player attributes.
    pub player_set: String,
    /// Set holding the game clock.
    pub time_set: String,
    /// Set holding session-scoped variables such as the loop counter.
    pub session_set: String,
    /// Loop counter variable inside the session set.
    pub loop_counter_variable: String,
    /// Sets reset to zero values on a loop reset.
    pub loop_reset_sets: Vec<String>,
    /// Player attribute variable names.
    pub player: PlayerVars,
    /// Known item kinds.
    pub items: Vec<ItemDef>,
    /// Per-quest policies.
    pub quests: Vec<QuestPolicyDef>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            inventory_set: "Inventory".to_string(),
            quest_set: "Quests".to_string(),
            knowledge_set: "Knowledge".to_string(),
            clue_set: "Clues".to_string(),
            clue_score_variable: "ClueScore".to_string(),
            flag_set: "Flags".to_string(),
            player_set: "Player".to_string(),
            time_set: "Time".to_string(),
            session_set: "Session".to_string(),
            loop_counter_variable: "LoopCount".to_string(),
            loop_reset_sets: Vec::new(),
            player: PlayerVars::default(),
            items: Vec::new(),
            quests: Vec::new(),
        }
    }
}

impl StateConfig {
    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> StateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Register an item kind.
    pub fn with_item(mut self, item: ItemDef) -> Self {
        self.items.push(item);
        self
    }

    /// Register a quest policy.
    pub fn with_quest(mut self, quest: QuestPolicyDef) -> Self {
        self.quests.push(quest);
        self
    }

    /// Add a set to reset on every loop reset.
    pub fn with_loop_reset_set(mut self, set: impl Into<String>) -> Self {
        self.loop_reset_sets.push(set.into());
        self
    }

    /// Look up an item kind (ASCII case-insensitive).
    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.id.eq_ignore_ascii_case(id))
    }

    /// All clue items with their weights, in declaration order.
    pub fn clues(&self) -> impl Iterator<Item = (&str, i64)> {
        self.items
            .iter()
            .filter_map(|i| i.clue_weight.map(|w| (i.id.as_str(), w)))
    }
}
