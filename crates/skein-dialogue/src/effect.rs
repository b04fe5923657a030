//! Deferred gameplay effects built from node metadata.
//!
//! When a node is entered its metadata is scanned for effect keys and the
//! result is held as the session's pending [`EffectBatch`]. The batch runs
//! only once the player confirms a choice, before the next node is entered.

use skein_core::metadata::{self, Metadata, MetadataValue};
use skein_core::VariableBag;
use skein_state::GameState;
use tracing::debug;

/// Metadata key: minutes to advance the game clock.
pub const DURATION_MINUTES: &str = "DurationMinutes";
/// Metadata key: knowledge fact(s) to learn.
pub const SET_KNOWLEDGE: &str = "SetKnowledge";
/// Metadata key: quest(s) to start.
pub const START_QUEST: &str = "StartQuest";
/// Metadata key: quest(s) to complete.
pub const COMPLETE_QUEST: &str = "CompleteQuest";
/// Metadata key: item(s) to give.
pub const GIVE_ITEM_ID: &str = "GiveItemId";
/// Metadata key: flag(s) to raise.
pub const SET_FLAG: &str = "SetFlag";

/// A single gameplay side-effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Advance the game clock.
    AdvanceClock(u64),
    /// Learn a knowledge fact.
    SetKnowledge(String),
    /// Start a quest.
    StartQuest(String),
    /// Complete a quest.
    CompleteQuest(String),
    /// Give one of an item.
    GiveItem(String),
    /// Raise a flag.
    SetFlag(String),
}

impl Effect {
    /// Apply the effect. Returns whether anything changed.
    pub fn apply<B: VariableBag>(&self, state: &mut GameState<B>) -> bool {
        let changed = match self {
            Effect::AdvanceClock(minutes) => {
                let before = state.clock().minutes();
                state.advance_clock(*minutes) != before
            }
            Effect::SetKnowledge(fact) => state.learn(fact),
            Effect::StartQuest(quest) => state.start_quest(quest),
            Effect::CompleteQuest(quest) => state.complete_quest(quest),
            Effect::GiveItem(item) => state.add_item(item, 1).is_some(),
            Effect::SetFlag(flag) => state.set_flag(flag),
        };
        debug!(effect = ?self, changed, "effect applied");
        changed
    }
}

/// Effects collected from one node, applied in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectBatch {
    effects: Vec<Effect>,
}

impl EffectBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch from node metadata.
    ///
    /// Keys are read in a fixed order: clock, knowledge, quest start, quest
    /// completion, items, flags. Each key may sit at the top level or inside
    /// a property sub-object, and string keys also accept a list of strings.
    /// Malformed values are skipped.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mut batch = Self::new();

        if let Some(value) = metadata::lookup(metadata, DURATION_MINUTES) {
            match value.as_int().and_then(|n| u64::try_from(n).ok()) {
                Some(0) => {}
                Some(minutes) => batch.push(Effect::AdvanceClock(minutes)),
                None => debug!(key = DURATION_MINUTES, %value, "malformed effect value skipped"),
            }
        }

        let keyed: [(&str, fn(String) -> Effect); 5] = [
            (SET_KNOWLEDGE, Effect::SetKnowledge),
            (START_QUEST, Effect::StartQuest),
            (COMPLETE_QUEST, Effect::CompleteQuest),
            (GIVE_ITEM_ID, Effect::GiveItem),
            (SET_FLAG, Effect::SetFlag),
        ];
        for (key, make) in keyed {
            if let Some(value) = metadata::lookup(metadata, key) {
                for name in names(key, value) {
                    batch.push(make(name));
                }
            }
        }
        batch
    }

    /// Add an effect.
    pub fn with(mut self, effect: Effect) -> Self {
        self.push(effect);
        self
    }

    /// Add an effect.
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// The effects, in application order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Number of effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Apply every effect in order. Returns how many changed something.
    pub fn apply<B: VariableBag>(&self, state: &mut GameState<B>) -> usize {
        self.effects.iter().filter(|e| e.apply(state)).count()
    }
}

fn names(key: &str, value: &MetadataValue) -> Vec<String> {
    let single = |value: &MetadataValue| -> Option<String> {
        let name = value.as_str()?.trim();
        (!name.is_empty()).then(|| name.to_string())
    };
    let names: Vec<String> = match value {
        MetadataValue::List(items) => items.iter().filter_map(single).collect(),
        other => single(other).into_iter().collect(),
    };
    if names.is_empty() {
        debug!(key, %value, "malformed effect value skipped");
    }
    names
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use skein_core::{MemoryBag, QuestState};
    use skein_state::StateConfig;

    use super::*;

    fn text(s: &str) -> MetadataValue {
        MetadataValue::String(s.to_string())
    }

    #[test]
    fn batch_from_flat_and_nested_keys() {
        let mut props = BTreeMap::new();
        props.insert(GIVE_ITEM_ID.to_string(), text("Torch"));
        props.insert(SET_KNOWLEDGE.to_string(), text("met_guard"));

        let mut meta = Metadata::new();
        meta.insert("Properties".to_string(), MetadataValue::Map(props));
        meta.insert(DURATION_MINUTES.to_string(), MetadataValue::Integer(15));
        meta.insert(START_QUEST.to_string(), text("findKey"));

        let batch = EffectBatch::from_metadata(&meta);
        assert_eq!(
            batch.effects(),
            &[
                Effect::AdvanceClock(15),
                Effect::SetKnowledge("met_guard".into()),
                Effect::StartQuest("findKey".into()),
                Effect::GiveItem("Torch".into()),
            ]
        );
    }

    #[test]
    fn malformed_values_are_skipped() {
        let mut meta = Metadata::new();
        meta.insert(DURATION_MINUTES.to_string(), text("soon"));
        meta.insert(GIVE_ITEM_ID.to_string(), MetadataValue::Integer(4));
        meta.insert(SET_FLAG.to_string(), text("  "));
        meta.insert(COMPLETE_QUEST.to_string(), text("findKey"));

        let batch = EffectBatch::from_metadata(&meta);
        assert_eq!(batch.effects(), &[Effect::CompleteQuest("findKey".into())]);
    }

    #[test]
    fn lists_expand_to_several_effects() {
        let mut meta = Metadata::new();
        meta.insert(
            SET_FLAG.to_string(),
            MetadataValue::List(vec![text("a"), MetadataValue::Boolean(true), text("b")]),
        );
        let batch = EffectBatch::from_metadata(&meta);
        assert_eq!(
            batch.effects(),
            &[Effect::SetFlag("a".into()), Effect::SetFlag("b".into())]
        );
    }

    #[test]
    fn numeric_string_duration_is_accepted() {
        let mut meta = Metadata::new();
        meta.insert(DURATION_MINUTES.to_string(), text("30"));
        assert_eq!(
            EffectBatch::from_metadata(&meta).effects(),
            &[Effect::AdvanceClock(30)]
        );
    }

    #[test]
    fn apply_runs_every_effect_even_if_one_fails() {
        let bag = MemoryBag::new()
            .with_var("Inventory", "item_Torch_count", 0_i64)
            .with_var("Flags", "gate_open", false);
        let mut state = GameState::new(bag, StateConfig::default());

        let batch = EffectBatch::new()
            .with(Effect::SetFlag("undeclared".into()))
            .with(Effect::GiveItem("Torch".into()))
            .with(Effect::StartQuest("findKey".into()))
            .with(Effect::SetKnowledge("met_guard".into()))
            .with(Effect::SetFlag("gate_open".into()));

        assert_eq!(batch.apply(&mut state), 4);
        assert_eq!(state.inventory().count("Torch"), 1);
        assert_eq!(state.quests().state("findKey"), QuestState::Active);
        assert!(state.knowledge().has("met_guard"));
        assert_eq!(state.bag().get_bool("Flags", "gate_open").unwrap(), Some(true));
    }
}
