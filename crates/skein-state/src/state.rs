//! The game-state hub.
//!
//! [`GameState`] owns every local store together with the bridge to the
//! narrative engine. All mutations go through it so that each one is
//! pushed to the bag and announced to listeners in a single place.

use skein_core::{MemoryBag, QuestState, VariableBag};
use tracing::{debug, info};

use crate::bridge::VariableBridge;
use crate::clock::GameClock;
use crate::config::StateConfig;
use crate::event::{Listeners, StateEvent};
use crate::inventory::{Inventory, ItemChange};
use crate::knowledge::KnowledgeLog;
use crate::player::PlayerView;
use crate::policy::PolicyRegistry;
use crate::quests::QuestLog;

/// Local game state kept consistent with a [`VariableBag`].
#[derive(Debug)]
pub struct GameState<B = MemoryBag> {
    bridge: VariableBridge<B>,
    inventory: Inventory,
    quests: QuestLog,
    knowledge: KnowledgeLog,
    policies: PolicyRegistry,
    clock: GameClock,
    listeners: Listeners,
    events: Vec<StateEvent>,
}

impl<B: VariableBag> GameState<B> {
    /// Create empty stores over a bag.
    ///
    /// Unique items, temporary quests and quest policies are taken from the
    /// configuration.
    pub fn new(bag: B, config: StateConfig) -> Self {
        let inventory = Inventory::with_unique_items(
            config.items.iter().filter(|i| i.unique).map(|i| i.id.as_str()),
        );
        let quests = QuestLog::with_temporary(
            config
                .quests
                .iter()
                .filter(|q| q.temporary)
                .map(|q| q.name.clone()),
        );
        let policies = PolicyRegistry::from_defs(&config.quests);
        Self {
            bridge: VariableBridge::new(bag, config),
            inventory,
            quests,
            knowledge: KnowledgeLog::new(),
            policies,
            clock: GameClock::new(),
            listeners: Listeners::default(),
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The bridge to the narrative engine.
    pub fn bridge(&self) -> &VariableBridge<B> {
        &self.bridge
    }

    /// The variable bag.
    pub fn bag(&self) -> &B {
        self.bridge.bag()
    }

    /// Mutable access to the variable bag.
    ///
    /// Writes made here bypass the stores; call [`pull_all`](Self::pull_all)
    /// to bring them in.
    pub fn bag_mut(&mut self) -> &mut B {
        self.bridge.bag_mut()
    }

    /// Consume the state, returning the bag.
    pub fn into_bag(self) -> B {
        self.bridge.into_bag()
    }

    /// The configuration in use.
    pub fn config(&self) -> &StateConfig {
        self.bridge.config()
    }

    /// The inventory.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The quest log.
    pub fn quests(&self) -> &QuestLog {
        &self.quests
    }

    /// The knowledge log.
    pub fn knowledge(&self) -> &KnowledgeLog {
        &self.knowledge
    }

    /// The quest policy registry.
    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    /// Mutable access to the quest policy registry.
    pub fn policies_mut(&mut self) -> &mut PolicyRegistry {
        &mut self.policies
    }

    /// The game clock.
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// A view over the player's attributes.
    pub fn player(&mut self) -> PlayerView<'_, B> {
        PlayerView::new(&mut self.bridge)
    }

    /// Journal text for a quest's current stage.
    pub fn stage_description(&self, quest: &str) -> Option<&str> {
        self.quests.stage_description(quest, &self.policies)
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// Register a callback for every state change.
    pub fn subscribe(&mut self, listener: impl FnMut(&StateEvent) + 'static) {
        self.listeners.subscribe(listener);
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<StateEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: StateEvent) {
        self.listeners.notify(&event);
        self.events.push(event);
    }

    fn emit_item(&mut self, change: ItemChange) {
        self.emit(StateEvent::ItemCountChanged {
            technical_id: change.technical_id,
            count: change.count,
        });
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// Add items and re-push the inventory.
    pub fn add_item(&mut self, technical_id: &str, count: u32) -> Option<ItemChange> {
        let change = self.inventory.add(technical_id, count)?;
        debug!(item = %change.technical_id, count = change.count, "item added");
        self.emit_item(change.clone());
        self.bridge.push_inventory(&self.inventory);
        Some(change)
    }

    /// Remove items and re-push the inventory.
    pub fn remove_item(&mut self, technical_id: &str, count: u32) -> Option<ItemChange> {
        let change = self.inventory.remove(technical_id, count)?;
        debug!(item = %change.technical_id, count = change.count, "item removed");
        self.emit_item(change.clone());
        self.bridge.push_inventory(&self.inventory);
        Some(change)
    }

    /// Empty the inventory. Every count variable is zeroed.
    pub fn clear_inventory(&mut self) -> Vec<String> {
        let removed = self.inventory.clear();
        self.emit(StateEvent::InventoryCleared);
        self.bridge.push_inventory(&self.inventory);
        removed
    }

    // -----------------------------------------------------------------------
    // Quests
    // -----------------------------------------------------------------------

    /// Start a quest.
    pub fn start_quest(&mut self, name: &str) -> bool {
        let changed = self.quests.start(name);
        self.after_quest_transition(name, changed)
    }

    /// Set a quest's stage, starting it if needed.
    pub fn set_quest_stage(&mut self, name: &str, stage: u32) -> bool {
        let changed = self.quests.set_stage(name, stage);
        self.after_quest_transition(name, changed)
    }

    /// Complete a quest.
    pub fn complete_quest(&mut self, name: &str) -> bool {
        let changed = self.quests.complete(name);
        self.after_quest_transition(name, changed)
    }

    /// Fail a quest.
    pub fn fail_quest(&mut self, name: &str) -> bool {
        let changed = self.quests.fail(name);
        self.after_quest_transition(name, changed)
    }

    /// Set an objective's state, starting its quest if needed.
    pub fn set_objective_state(&mut self, quest: &str, objective: &str, state: QuestState) -> bool {
        let changed = self.quests.set_objective_state(quest, objective, state);
        self.after_quest_transition(quest, changed)
    }

    fn after_quest_transition(&mut self, name: &str, changed: bool) -> bool {
        if changed {
            self.quest_changed(name);
        }
        changed
    }

    /// Push a quest and announce it. The push is dropped while suppressed.
    fn quest_changed(&mut self, name: &str) {
        let Some(quest) = self.quests.get(name) else {
            return;
        };
        self.bridge.push_quest(quest);
        let event = StateEvent::QuestChanged {
            name: quest.name.clone(),
            state: quest.state,
            stage: quest.stage,
        };
        debug!(quest = name, state = %quest.state, stage = quest.stage, "quest changed");
        self.emit(event);
    }

    /// Remove every quest and return its variables to not-started values.
    pub fn reset_quests(&mut self) -> Vec<String> {
        let removed = self.quests.reset_all();
        for name in &removed {
            self.quest_removed(name);
        }
        removed
    }

    fn quest_removed(&mut self, name: &str) {
        self.bridge.clear_quest(name);
        self.emit(StateEvent::QuestRemoved {
            name: name.to_string(),
        });
    }

    // -----------------------------------------------------------------------
    // Knowledge
    // -----------------------------------------------------------------------

    /// Learn a fact.
    pub fn learn(&mut self, fact: &str) -> bool {
        let added = self.knowledge.add(fact);
        if added {
            self.emit(StateEvent::KnowledgeChanged {
                name: fact.to_string(),
                known: true,
            });
        }
        added
    }

    /// Forget a fact.
    pub fn forget(&mut self, fact: &str) -> bool {
        let removed = self.knowledge.remove(fact);
        if removed {
            self.emit(StateEvent::KnowledgeChanged {
                name: fact.to_string(),
                known: false,
            });
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Clock and flags
    // -----------------------------------------------------------------------

    /// Advance the game clock and push it.
    pub fn advance_clock(&mut self, minutes: u64) -> u64 {
        if minutes == 0 {
            return self.clock.minutes();
        }
        let total = self.clock.advance(minutes);
        self.bridge.push_clock(total);
        self.emit(StateEvent::ClockAdvanced { minutes: total });
        total
    }

    /// Raise a flag in the flag set.
    pub fn set_flag(&mut self, flag: &str) -> bool {
        if flag.is_empty() {
            return false;
        }
        let written = self.bridge.push_flag(flag);
        if written {
            self.emit(StateEvent::FlagSet {
                name: flag.to_string(),
            });
        }
        written
    }

    // -----------------------------------------------------------------------
    // Synchronization
    // -----------------------------------------------------------------------

    /// Run `f` with every push suppressed. Nests.
    pub fn with_pushes_suppressed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.bridge.suppress();
        let result = f(self);
        self.bridge.release();
        result
    }

    /// Push every local store to the bag.
    pub fn push_all(&mut self) {
        if self.bridge.is_suppressed() {
            debug!("push_all skipped while suppressed");
            return;
        }
        self.bridge.push_inventory(&self.inventory);
        for quest in self.quests.iter() {
            self.bridge.push_quest(quest);
        }
        self.bridge.push_clock(self.clock.minutes());
    }

    /// Bring changes made by the narrative engine into the local stores.
    ///
    /// Inventory deltas and clue flags are consumed first, and their count
    /// mirrors are pushed as they change. Quests and knowledge are then
    /// pulled with every push suppressed.
    pub fn pull_all(&mut self) {
        let changes = self.bridge.apply_inventory_deltas(&mut self.inventory);
        let clues = self.bridge.pull_clue_flags(&mut self.inventory);
        for change in changes.into_iter().chain(clues) {
            self.emit_item(change);
        }

        self.with_pushes_suppressed(|state| {
            state.sync_quests_from_bag();
            state.sync_knowledge_from_bag();
        });
    }

    /// Pull quest variables into the quest log with pushes suppressed.
    pub fn sync_quests_from_bag(&mut self) -> Vec<String> {
        self.with_pushes_suppressed(|state| {
            let changed = state.bridge.pull_quests(&mut state.quests, &state.policies);
            for name in &changed {
                state.quest_changed(name);
            }
            changed
        })
    }

    /// Learn every fact raised in the knowledge set.
    pub fn sync_knowledge_from_bag(&mut self) -> Vec<String> {
        let learned = self.bridge.pull_knowledge(&mut self.knowledge);
        for name in &learned {
            self.emit(StateEvent::KnowledgeChanged {
                name: name.clone(),
                known: true,
            });
        }
        learned
    }

    // -----------------------------------------------------------------------
    // Loop reset
    // -----------------------------------------------------------------------

    /// End the current loop.
    ///
    /// Quest policies force their terminal outcomes, temporary quests are
    /// purged, the configured sets are reset to zero values, the loop
    /// counter is incremented and everything is pushed again.
    pub fn loop_reset(&mut self) {
        let forced = self.quests.apply_loop_reset(&self.policies);
        for name in &forced {
            self.quest_changed(name);
        }
        for name in self.quests.purge_temporary() {
            self.quest_removed(&name);
        }

        // Read before the reset: the counter may live in a reset set.
        let loop_count = self.bridge.loop_count().saturating_add(1);
        let sets = self.bridge.config().loop_reset_sets.clone();
        for set in &sets {
            self.bridge.reset_namespace(set, "");
        }

        let session = self.bridge.config().session_set.clone();
        let counter = self.bridge.config().loop_counter_variable.clone();
        self.bridge.write(&session, &counter, loop_count.into());

        self.push_all();
        info!(loop_count, forced = forced.len(), "loop reset");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;
    use skein_core::bag::testing::RecordingBag;
    use skein_core::{Value, VariableBag};

    use super::*;
    use crate::config::{ItemDef, QuestPolicyDef};

    fn bag() -> MemoryBag {
        MemoryBag::new()
            .with_var("Inventory", "item_Torch_delta", 0_i64)
            .with_var("Inventory", "item_Torch_count", 0_i64)
            .with_var("Inventory", "item_Artefact_delta", 0_i64)
            .with_var("Inventory", "item_Artefact_count", 0_i64)
            .with_var("Inventory", "item_Letter_count", 0_i64)
            .with_var("Clues", "Letter", false)
            .with_var("Clues", "ClueScore", 0_i64)
            .with_enum("Quests", "findKey_State", vec![0, 1, 2, 3], 0)
            .with_var("Quests", "findKey_Stage", 0_i64)
            .with_enum("Quests", "tempQuest_State", vec![0, 1, 2, 3], 0)
            .with_var("Quests", "tempQuest_Stage", 0_i64)
            .with_var("Knowledge", "met_guard", false)
            .with_var("Time", "MinutesElapsed", 0_i64)
            .with_var("Flags", "door_open", false)
            .with_var("Session", "LoopCount", 0_i64)
            .with_var("Session", "talked_today", true)
    }

    fn config() -> StateConfig {
        StateConfig::default()
            .with_item(ItemDef::new("Artefact").unique())
            .with_item(ItemDef::new("Letter").clue(3))
            .with_quest(QuestPolicyDef {
                name: "tempQuest".into(),
                temporary: true,
                ..Default::default()
            })
            .with_loop_reset_set("Session")
    }

    fn state() -> GameState {
        GameState::new(bag(), config())
    }

    fn int(state: &GameState<impl VariableBag>, set: &str, name: &str) -> Option<i64> {
        state.bag().get_int(set, name).unwrap()
    }

    #[test]
    fn torch_delta_is_consumed_into_inventory() {
        let mut state = state();
        state
            .bag_mut()
            .set("Inventory", "item_Torch_delta", Value::Integer(2))
            .unwrap();
        state.pull_all();

        assert_eq!(state.inventory().count("Torch"), 2);
        assert_eq!(int(&state, "Inventory", "item_Torch_count"), Some(2));
        assert_eq!(int(&state, "Inventory", "item_Torch_delta"), Some(0));
        assert_eq!(
            state.drain_events(),
            vec![StateEvent::ItemCountChanged {
                technical_id: "Torch".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn unique_artefact_never_exceeds_one() {
        let mut state = state();
        state.add_item("Artefact", 1);
        assert!(state.add_item("Artefact", 1).is_none());
        state
            .bag_mut()
            .set("Inventory", "item_Artefact_delta", Value::Integer(4))
            .unwrap();
        state.pull_all();
        assert_eq!(state.inventory().count("Artefact"), 1);
        assert_eq!(int(&state, "Inventory", "item_Artefact_count"), Some(1));
    }

    #[test]
    fn quest_transitions_are_pushed() {
        let mut state = state();
        state.start_quest("findKey");
        state.set_quest_stage("findKey", 3);
        assert_eq!(state.quests().state("findKey"), QuestState::Active);
        assert_eq!(int(&state, "Quests", "findKey_State"), Some(1));
        assert_eq!(int(&state, "Quests", "findKey_Stage"), Some(3));
    }

    #[test]
    fn clearing_zeroes_every_count() {
        let mut state = state();
        state.add_item("Torch", 3);
        state.add_item("Letter", 1);
        assert_eq!(int(&state, "Clues", "ClueScore"), Some(3));

        state.clear_inventory();
        assert!(state.inventory().is_empty());
        assert_eq!(int(&state, "Inventory", "item_Torch_count"), Some(0));
        assert_eq!(int(&state, "Inventory", "item_Letter_count"), Some(0));
        assert_eq!(int(&state, "Clues", "ClueScore"), Some(0));
        assert_eq!(state.bag().get_bool("Clues", "Letter").unwrap(), Some(false));
    }

    #[test]
    fn quest_pull_never_pushes() {
        let mut recording = RecordingBag::new(bag());
        recording
            .set("Quests", "findKey_State", Value::Integer(1))
            .unwrap();
        recording
            .set("Quests", "findKey_Stage", Value::Integer(3))
            .unwrap();
        let mut state = GameState::new(recording, config());
        let before = state.bag().write_count();

        let changed = state.sync_quests_from_bag();
        assert_eq!(changed, vec!["findKey".to_string()]);
        assert_eq!(state.bag().write_count(), before);
        assert_eq!(state.quests().stage("findKey"), 3);
        assert!(matches!(
            state.drain_events().as_slice(),
            [StateEvent::QuestChanged { stage: 3, .. }]
        ));
    }

    #[test]
    fn pull_learns_knowledge() {
        let mut state = state();
        state
            .bag_mut()
            .set("Knowledge", "met_guard", Value::Boolean(true))
            .unwrap();
        state.pull_all();
        assert!(state.knowledge().has("met_guard"));
    }

    #[test]
    fn listeners_see_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut state = state();
        let sink = Rc::clone(&seen);
        state.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        state.add_item("Torch", 1);
        state.learn("met_guard");
        state.set_flag("door_open");

        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(state.drain_events().len(), 3);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn clock_and_flags_are_pushed() {
        let mut state = state();
        state.advance_clock(45);
        assert_eq!(state.advance_clock(15), 60);
        assert_eq!(int(&state, "Time", "MinutesElapsed"), Some(60));
        assert!(state.set_flag("door_open"));
        assert_eq!(state.bag().get_bool("Flags", "door_open").unwrap(), Some(true));
        assert!(!state.set_flag("undeclared"));
    }

    #[test]
    fn loop_reset_purges_and_resets() {
        let mut state = state();
        state.start_quest("tempQuest");
        state.start_quest("findKey");
        state.loop_reset();

        assert!(state.quests().get("tempQuest").is_none());
        assert!(state.quests().get("findKey").is_some());
        assert_eq!(state.bag().get_bool("Session", "talked_today").unwrap(), Some(false));
        assert_eq!(int(&state, "Session", "LoopCount"), Some(1));
    }

    #[test]
    fn loop_counter_survives_session_reset() {
        let mut state = state();
        for _ in 0..3 {
            state.loop_reset();
        }
        assert_eq!(int(&state, "Session", "LoopCount"), Some(3));
        assert_eq!(state.bridge().loop_count(), 3);
    }

    #[test]
    fn purged_quest_stays_gone_after_pull() {
        let mut state = state();
        state.start_quest("tempQuest");
        state.set_quest_stage("tempQuest", 2);
        state.loop_reset();

        assert_eq!(int(&state, "Quests", "tempQuest_State"), Some(0));
        assert_eq!(int(&state, "Quests", "tempQuest_Stage"), Some(0));
        state.pull_all();
        assert!(state.quests().get("tempQuest").is_none());
    }

    #[test]
    fn reset_quests_clears_bag_before_pull() {
        let mut state = state();
        state.start_quest("findKey");
        state.set_quest_stage("findKey", 3);
        state.drain_events();

        assert_eq!(state.reset_quests(), vec!["findKey".to_string()]);
        assert_eq!(
            state.drain_events(),
            vec![StateEvent::QuestRemoved {
                name: "findKey".into()
            }]
        );
        assert_eq!(int(&state, "Quests", "findKey_State"), Some(0));
        assert_eq!(int(&state, "Quests", "findKey_Stage"), Some(0));

        state.pull_all();
        assert!(state.quests().get("findKey").is_none());
        assert_eq!(state.quests().state("findKey"), QuestState::NotStarted);
    }

    #[test]
    fn suppression_nests() {
        let mut state = GameState::new(RecordingBag::new(bag()), config());
        state.with_pushes_suppressed(|outer| {
            outer.with_pushes_suppressed(|inner| {
                inner.start_quest("findKey");
            });
            outer.add_item("Torch", 1);
        });
        assert_eq!(state.bag().write_count(), 0);
        state.push_all();
        assert_eq!(int(&state, "Quests", "findKey_State"), Some(1));
        assert_eq!(int(&state, "Inventory", "item_Torch_count"), Some(1));
    }

    proptest! {
        #[test]
        fn delta_consumption_is_idempotent(delta in -5_i64..=5, held in 0_u32..4) {
            let mut state = state();
            if held > 0 {
                state.add_item("Torch", held);
            }
            state
                .bag_mut()
                .set("Inventory", "item_Torch_delta", Value::Integer(delta))
                .unwrap();
            state.pull_all();
            let once = state.inventory().count("Torch");
            state.pull_all();
            prop_assert_eq!(state.inventory().count("Torch"), once);

            let expected = (i64::from(held) + delta).max(0);
            prop_assert_eq!(i64::from(once), expected);
            prop_assert_eq!(int(&state, "Inventory", "item_Torch_count"), Some(expected));
        }
    }
}
