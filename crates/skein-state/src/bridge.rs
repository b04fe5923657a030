//! The variable synchronization bridge.
//!
//! Translates between the strongly-typed local stores and the narrative
//! engine's flat, dynamically-named variable bag. No schema is assumed: the
//! bridge lists a set's variables and matches their names against the
//! conventions in [`skein_core::naming`].
//!
//! Every bag access is fault-tolerant per property. A missing variable, a
//! type mismatch or an engine error is logged and that single property is
//! skipped; the rest of the batch still runs.

use std::collections::BTreeMap;

use skein_core::naming::{self, ItemKey, QuestKey};
use skein_core::{BagError, Quest, QuestState, Value, VarType, VariableBag};
use tracing::{debug, trace, warn};

use crate::config::StateConfig;
use crate::inventory::{Inventory, ItemChange};
use crate::knowledge::KnowledgeLog;
use crate::policy::PolicyRegistry;
use crate::quests::QuestLog;

/// Variable in the time set holding elapsed minutes.
pub const MINUTES_ELAPSED: &str = "MinutesElapsed";

/// Bidirectional mapper between local stores and a [`VariableBag`].
#[derive(Debug)]
pub struct VariableBridge<B> {
    bag: B,
    config: StateConfig,
    suppress_depth: u32,
}

#[derive(Debug, Default)]
struct PulledQuest {
    state: Option<i64>,
    stage: Option<i64>,
    objectives: Vec<(String, i64)>,
    result: Option<i64>,
}

impl PulledQuest {
    /// Every variable still holds its not-started value.
    fn is_dormant(&self) -> bool {
        let idle = QuestState::NotStarted.code();
        self.state.is_none_or(|code| code == idle)
            && self.stage.is_none_or(|stage| stage == 0)
            && self.objectives.iter().all(|(_, code)| *code == idle)
            && self.result.is_none_or(|result| result == 0)
    }
}

impl<B: VariableBag> VariableBridge<B> {
    /// Create a bridge over a bag.
    pub fn new(bag: B, config: StateConfig) -> Self {
        Self {
            bag,
            config,
            suppress_depth: 0,
        }
    }

    /// The underlying bag.
    pub fn bag(&self) -> &B {
        &self.bag
    }

    /// Mutable access to the underlying bag.
    pub fn bag_mut(&mut self) -> &mut B {
        &mut self.bag
    }

    /// Consume the bridge, returning the bag.
    pub fn into_bag(self) -> B {
        self.bag
    }

    /// The configuration in use.
    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Push suppression
    // -----------------------------------------------------------------------

    /// Whether pushes are currently suppressed.
    pub fn is_suppressed(&self) -> bool {
        self.suppress_depth > 0
    }

    /// Suppress pushes until a matching [`release`](Self::release). Nests.
    pub fn suppress(&mut self) {
        self.suppress_depth += 1;
    }

    /// End one level of suppression.
    pub fn release(&mut self) {
        self.suppress_depth = self.suppress_depth.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Fault-tolerant property access
    // -----------------------------------------------------------------------

    /// Read a variable, logging and swallowing failures.
    pub fn read(&self, set: &str, name: &str) -> Option<Value> {
        match self.bag.get(set, name) {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                trace!(set, name, "variable not declared");
                None
            }
            Err(e) => {
                warn!(set, name, error = %e, "variable read failed");
                None
            }
        }
    }

    /// Read an integer variable, logging and swallowing failures.
    pub fn read_int(&self, set: &str, name: &str) -> Option<i64> {
        match self.read(set, name)? {
            Value::Integer(n) => Some(n),
            other => {
                warn!(set, name, found = %other.var_type(), "expected an integer variable");
                None
            }
        }
    }

    /// Read a boolean variable, logging and swallowing failures.
    pub fn read_bool(&self, set: &str, name: &str) -> Option<bool> {
        match self.read(set, name)? {
            Value::Boolean(b) => Some(b),
            other => {
                warn!(set, name, found = %other.var_type(), "expected a boolean variable");
                None
            }
        }
    }

    /// Write a variable. Returns `false` (after logging) on failure.
    pub fn write(&mut self, set: &str, name: &str, value: Value) -> bool {
        match self.bag.set(set, name, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(set, name, error = %e, "variable write failed");
                false
            }
        }
    }

    /// Write a variable that the engine is not required to declare.
    fn write_optional(&mut self, set: &str, name: &str, value: Value) -> bool {
        match self.bag.set(set, name, value) {
            Ok(()) => true,
            Err(BagError::UnknownVariable { .. }) => {
                trace!(set, name, "optional variable not declared");
                false
            }
            Err(e) => {
                warn!(set, name, error = %e, "variable write failed");
                false
            }
        }
    }

    /// List a set's variables, logging failures as an empty set.
    pub fn list(&self, set: &str) -> Vec<(String, VarType)> {
        self.bag.list(set).unwrap_or_else(|e| {
            warn!(set, error = %e, "listing variables failed");
            Vec::new()
        })
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// Consume every non-zero `item_<id>_delta` into the inventory.
    ///
    /// Each consumed delta is zeroed, so a second scan is a no-op. The full
    /// inventory is re-pushed after every applied change.
    pub fn apply_inventory_deltas(&mut self, inventory: &mut Inventory) -> Vec<ItemChange> {
        let set = self.config.inventory_set.clone();
        let mut changes = Vec::new();

        for (name, ty) in self.list(&set) {
            let Some(ItemKey::Delta(id)) = naming::parse_item_key(&name) else {
                continue;
            };
            if !ty.is_integral() {
                warn!(set = %set, name = %name, found = %ty, "delta variable is not an integer");
                continue;
            }
            let Some(delta) = self.read_int(&set, &name) else {
                continue;
            };
            if delta == 0 {
                continue;
            }

            let amount = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
            let change = if delta > 0 {
                inventory.add(id, amount)
            } else {
                inventory.remove(id, amount)
            };
            debug!(item = id, delta, "consumed inventory delta");

            if !self.write(&set, &name, Value::Integer(0)) {
                warn!(item = id, "delta could not be zeroed and may be applied again");
            }
            if let Some(change) = change {
                self.push_inventory(inventory);
                changes.push(change);
            }
        }
        changes
    }

    /// Push item counts, clue flags and the clue score.
    pub fn push_inventory(&mut self, inventory: &Inventory) {
        self.push_inventory_counts(inventory);
        self.push_clue_flags(inventory);
    }

    /// Mirror every held item's count, and zero count variables of items
    /// no longer held.
    pub fn push_inventory_counts(&mut self, inventory: &Inventory) {
        if self.is_suppressed() {
            trace!("inventory push suppressed");
            return;
        }
        let set = self.config.inventory_set.clone();

        for item in inventory.items() {
            let name = naming::item_count(&item.technical_id);
            self.write_optional(&set, &name, Value::Integer(i64::from(item.count)));
        }

        for (name, _) in self.list(&set) {
            let Some(ItemKey::Count(id)) = naming::parse_item_key(&name) else {
                continue;
            };
            if inventory.contains(id) {
                continue;
            }
            if self.read_int(&set, &name).is_some_and(|n| n != 0) {
                self.write(&set, &name, Value::Integer(0));
            }
        }
    }

    /// Sum of clue weights for clue items currently held.
    pub fn clue_score(&self, inventory: &Inventory) -> i64 {
        self.config
            .clues()
            .filter(|(id, _)| inventory.contains(id))
            .map(|(_, weight)| weight)
            .sum()
    }

    /// Mirror clue item presence into the clue set and push the score.
    pub fn push_clue_flags(&mut self, inventory: &Inventory) {
        if self.is_suppressed() {
            trace!("clue push suppressed");
            return;
        }
        let set = self.config.clue_set.clone();
        let clues: Vec<String> = self.config.clues().map(|(id, _)| id.to_string()).collect();
        if clues.is_empty() {
            return;
        }
        for id in &clues {
            self.write(&set, id, Value::Boolean(inventory.contains(id)));
        }
        self.push_clue_score(inventory);
    }

    fn push_clue_score(&mut self, inventory: &Inventory) {
        let score = self.clue_score(inventory);
        let set = self.config.clue_set.clone();
        let name = self.config.clue_score_variable.clone();
        self.write(&set, &name, Value::Integer(score));
    }

    /// Make clue item presence follow the clue flags.
    ///
    /// A raised flag adds the item once; a lowered flag removes every copy.
    pub fn pull_clue_flags(&mut self, inventory: &mut Inventory) -> Vec<ItemChange> {
        let set = self.config.clue_set.clone();
        let clues: Vec<String> = self.config.clues().map(|(id, _)| id.to_string()).collect();
        let mut changes = Vec::new();

        for id in &clues {
            let change = match self.read_bool(&set, id) {
                Some(true) if !inventory.contains(id) => inventory.add(id, 1),
                Some(false) if inventory.contains(id) => {
                    let count = inventory.count(id);
                    inventory.remove(id, count)
                }
                _ => None,
            };
            changes.extend(change);
        }

        if !changes.is_empty() {
            self.push_inventory_counts(inventory);
            if !self.is_suppressed() {
                self.push_clue_score(inventory);
            }
        }
        changes
    }

    // -----------------------------------------------------------------------
    // Quests
    // -----------------------------------------------------------------------

    /// Push a quest's state, stage, objectives and completed-objective count.
    pub fn push_quest(&mut self, quest: &Quest) {
        if self.is_suppressed() {
            debug!(quest = %quest.name, "quest push suppressed during pull");
            return;
        }
        let set = self.config.quest_set.clone();
        let name = &quest.name;

        self.write(
            &set,
            &naming::quest_state(name),
            Value::Integer(quest.state.code()),
        );
        self.write(
            &set,
            &naming::quest_stage(name),
            Value::Integer(i64::from(quest.stage)),
        );
        for objective in quest.objectives.values() {
            self.write(
                &set,
                &naming::quest_objective(name, &objective.id),
                Value::Integer(objective.state.code()),
            );
        }
        let completed = i64::try_from(quest.completed_objective_count()).unwrap_or(i64::MAX);
        self.write_optional(
            &set,
            &naming::quest_objectives_completed(name),
            Value::Integer(completed),
        );
        if let Some(result) = quest.result {
            self.write_optional(&set, &naming::quest_result(name), Value::Integer(result));
        }
    }

    /// Apply quest variables from the bag to the quest log.
    ///
    /// Incoming stages pass through the quest's policy first. Returns the
    /// names of quests that changed.
    pub fn pull_quests(&self, quests: &mut QuestLog, policies: &PolicyRegistry) -> Vec<String> {
        let set = &self.config.quest_set;
        let loop_count = self.loop_count();
        let mut pulled: BTreeMap<String, PulledQuest> = BTreeMap::new();

        for (name, ty) in self.list(set) {
            let Some(key) = naming::parse_quest_key(&name) else {
                continue;
            };
            if !ty.is_integral() {
                debug!(set = %set, name = %name, found = %ty, "quest variable is not an integer");
                continue;
            }
            let Some(value) = self.read_int(set, &name) else {
                continue;
            };
            let entry = pulled.entry(key.quest().to_string()).or_default();
            match key {
                QuestKey::State(_) => entry.state = Some(value),
                QuestKey::Stage(_) => entry.stage = Some(value),
                QuestKey::Objective { objective, .. } => {
                    entry.objectives.push((objective.to_string(), value))
                }
                QuestKey::Result(_) => entry.result = Some(value),
                QuestKey::ObjectivesCompleted(_) => {}
            }
        }

        let mut changed = Vec::new();
        for (name, incoming) in pulled {
            if quests.get(&name).is_none() && incoming.is_dormant() {
                continue;
            }
            let before = quests.ensure(&name).clone();
            let mut quest = before.clone();

            if let Some(code) = incoming.state {
                match QuestState::from_code(code) {
                    Some(state) => quest.state = state,
                    None => warn!(quest = %name, code, "unknown quest state code"),
                }
            }
            if let Some(raw) = incoming.stage {
                let raw = u32::try_from(raw.max(0)).unwrap_or(u32::MAX);
                quest.stage = policies.remap_stage(&name, raw, loop_count);
            }
            for (objective, code) in incoming.objectives {
                match QuestState::from_code(code) {
                    Some(state) => {
                        quest
                            .objectives
                            .entry(objective.clone())
                            .or_insert_with(|| skein_core::Objective::new(&objective, state))
                            .state = state;
                    }
                    None => warn!(
                        quest = %name,
                        objective = %objective,
                        code,
                        "unknown objective state code"
                    ),
                }
            }
            if incoming.result.is_some() {
                quest.result = incoming.result;
            }
            quest.normalize();

            if quest != before {
                quests.replace(quest);
                changed.push(name);
            }
        }
        changed
    }

    /// Return every variable of a removed quest to its not-started value.
    ///
    /// State and objective variables get the `NotStarted` code, counters
    /// get zero. Returns how many variables were written.
    pub fn clear_quest(&mut self, quest: &str) -> usize {
        if self.is_suppressed() {
            debug!(quest, "quest clear suppressed during pull");
            return 0;
        }
        let set = self.config.quest_set.clone();
        let not_started = QuestState::NotStarted.code();
        let mut cleared = 0;
        for (name, _) in self.list(&set) {
            let value = match naming::parse_quest_key(&name) {
                Some(key) if key.quest() == quest => match key {
                    QuestKey::State(_) | QuestKey::Objective { .. } => not_started,
                    _ => 0,
                },
                _ => continue,
            };
            if self.write(&set, &name, Value::Integer(value)) {
                cleared += 1;
            }
        }
        debug!(quest, cleared, "quest variables cleared");
        cleared
    }

    // -----------------------------------------------------------------------
    // Knowledge, flags, clock, session
    // -----------------------------------------------------------------------

    /// Learn every fact whose knowledge variable is `true`.
    ///
    /// Facts are never forgotten by a pull. Returns the newly learned names.
    pub fn pull_knowledge(&self, knowledge: &mut KnowledgeLog) -> Vec<String> {
        let set = &self.config.knowledge_set;
        let mut learned = Vec::new();
        for (name, ty) in self.list(set) {
            if ty != VarType::Boolean {
                debug!(
                    set = %set,
                    name = %name,
                    found = %ty,
                    "knowledge variable is not a boolean"
                );
                continue;
            }
            if self.read_bool(set, &name) == Some(true) && knowledge.add(&name) {
                learned.push(name);
            }
        }
        learned
    }

    /// Raise a flag in the flag set.
    pub fn push_flag(&mut self, flag: &str) -> bool {
        if self.is_suppressed() {
            trace!(flag, "flag push suppressed");
            return false;
        }
        let set = self.config.flag_set.clone();
        self.write(&set, flag, Value::Boolean(true))
    }

    /// Mirror the game clock.
    pub fn push_clock(&mut self, minutes: u64) {
        if self.is_suppressed() {
            trace!("clock push suppressed");
            return;
        }
        let set = self.config.time_set.clone();
        let minutes = i64::try_from(minutes).unwrap_or(i64::MAX);
        self.write_optional(&set, MINUTES_ELAPSED, Value::Integer(minutes));
    }

    /// Current loop counter, zero when not declared.
    pub fn loop_count(&self) -> i64 {
        let set = &self.config.session_set;
        let name = &self.config.loop_counter_variable;
        match self.bag.get(set, name) {
            Ok(Some(Value::Integer(n))) => n,
            _ => 0,
        }
    }

    /// Reset every variable in `set` whose name starts with `prefix` to its
    /// type's zero value. Returns how many were reset.
    pub fn reset_namespace(&mut self, set: &str, prefix: &str) -> usize {
        let mut reset = 0;
        for (name, ty) in self.list(set) {
            if !name.starts_with(prefix) {
                continue;
            }
            if self.write(set, &name, ty.zero_value()) {
                reset += 1;
            }
        }
        debug!(set, prefix, reset, "namespace reset");
        reset
    }
}

#[cfg(test)]
mod tests {
    use skein_core::MemoryBag;
    use skein_core::bag::testing::RecordingBag;

    use super::*;
    use crate::config::ItemDef;
    use crate::policy::StagePolicy;

    fn bag() -> MemoryBag {
        MemoryBag::new()
            .with_var("Inventory", "item_Torch_delta", 0_i64)
            .with_var("Inventory", "item_Torch_count", 0_i64)
            .with_var("Inventory", "item_Rope_delta", 0_i64)
            .with_var("Inventory", "item_Rope_count", 0_i64)
            .with_var("Inventory", "item_Letter_count", 0_i64)
            .with_var("Clues", "Letter", false)
            .with_var("Clues", "ClueScore", 0_i64)
            .with_enum("Quests", "findKey_State", vec![0, 1, 2, 3], 0)
            .with_var("Quests", "findKey_Stage", 0_i64)
            .with_enum("Quests", "findKey_Obj_askGuard", vec![0, 1, 2, 3], 0)
            .with_var("Quests", "findKey_ObjectivesCompleted", 0_i64)
            .with_var("Knowledge", "met_guard", false)
            .with_var("Knowledge", "saw_cellar", false)
            .with_var("Session", "LoopCount", 0_i64)
    }

    fn config() -> StateConfig {
        StateConfig::default().with_item(ItemDef::new("Letter").clue(5))
    }

    fn bridge() -> VariableBridge<MemoryBag> {
        VariableBridge::new(bag(), config())
    }

    fn int(bridge: &VariableBridge<impl VariableBag>, set: &str, name: &str) -> Option<i64> {
        bridge.bag().get_int(set, name).unwrap()
    }

    #[test]
    fn deltas_are_consumed_once() {
        let mut bridge = bridge();
        let mut inv = Inventory::new();
        bridge
            .bag_mut()
            .set("Inventory", "item_Torch_delta", Value::Integer(2))
            .unwrap();

        let changes = bridge.apply_inventory_deltas(&mut inv);
        assert_eq!(changes.len(), 1);
        assert_eq!(inv.count("Torch"), 2);
        assert_eq!(int(&bridge, "Inventory", "item_Torch_delta"), Some(0));
        assert_eq!(int(&bridge, "Inventory", "item_Torch_count"), Some(2));

        assert!(bridge.apply_inventory_deltas(&mut inv).is_empty());
        assert_eq!(inv.count("Torch"), 2);
    }

    #[test]
    fn negative_delta_removes() {
        let mut bridge = bridge();
        let mut inv = Inventory::new();
        inv.add("Rope", 3);
        bridge
            .bag_mut()
            .set("Inventory", "item_Rope_delta", Value::Integer(-5))
            .unwrap();
        bridge.apply_inventory_deltas(&mut inv);
        assert!(!inv.contains("Rope"));
        assert_eq!(int(&bridge, "Inventory", "item_Rope_count"), Some(0));
    }

    #[test]
    fn push_counts_round_trips_and_zeroes_stale_keys() {
        let mut bridge = bridge();
        let mut inv = Inventory::new();
        inv.add("Rope", 4);
        bridge.push_inventory_counts(&inv);
        assert_eq!(int(&bridge, "Inventory", "item_Rope_count"), Some(4));

        inv.remove("Rope", 4);
        inv.add("Torch", 1);
        bridge.push_inventory_counts(&inv);
        assert_eq!(int(&bridge, "Inventory", "item_Torch_count"), Some(1));
        assert_eq!(int(&bridge, "Inventory", "item_Rope_count"), Some(0));
        assert_eq!(int(&bridge, "Inventory", "item_Letter_count"), Some(0));
    }

    #[test]
    fn undeclared_count_does_not_abort_push() {
        let mut bridge = bridge();
        let mut inv = Inventory::new();
        inv.add("Lantern", 1);
        inv.add("Torch", 2);
        bridge.push_inventory_counts(&inv);
        assert_eq!(int(&bridge, "Inventory", "item_Torch_count"), Some(2));
    }

    #[test]
    fn engine_failure_on_one_property_skips_only_that_property() {
        let recording = RecordingBag::new(bag()).fail_on("Inventory", "item_Torch_count");
        let mut bridge = VariableBridge::new(recording, config());
        let mut inv = Inventory::new();
        inv.add("Torch", 1);
        inv.add("Rope", 2);
        bridge.push_inventory_counts(&inv);
        assert_eq!(int(&bridge, "Inventory", "item_Rope_count"), Some(2));
    }

    #[test]
    fn clue_flags_and_score() {
        let mut bridge = bridge();
        let mut inv = Inventory::new();
        inv.add("Letter", 1);
        bridge.push_clue_flags(&inv);
        assert_eq!(bridge.bag().get_bool("Clues", "Letter").unwrap(), Some(true));
        assert_eq!(int(&bridge, "Clues", "ClueScore"), Some(5));

        bridge
            .bag_mut()
            .set("Clues", "Letter", Value::Boolean(false))
            .unwrap();
        let changes = bridge.pull_clue_flags(&mut inv);
        assert_eq!(changes.len(), 1);
        assert!(!inv.contains("Letter"));
        assert_eq!(int(&bridge, "Clues", "ClueScore"), Some(0));
    }

    #[test]
    fn pull_clue_flag_adds_item() {
        let mut bridge = bridge();
        let mut inv = Inventory::new();
        bridge
            .bag_mut()
            .set("Clues", "Letter", Value::Boolean(true))
            .unwrap();
        bridge.pull_clue_flags(&mut inv);
        assert_eq!(inv.count("Letter"), 1);
        assert_eq!(int(&bridge, "Inventory", "item_Letter_count"), Some(1));
    }

    #[test]
    fn quest_push_writes_naming_convention() {
        let mut bridge = bridge();
        let mut log = QuestLog::new();
        log.set_stage("findKey", 3);
        log.set_objective_state("findKey", "askGuard", QuestState::Completed);
        bridge.push_quest(log.get("findKey").unwrap());

        assert_eq!(int(&bridge, "Quests", "findKey_State"), Some(1));
        assert_eq!(int(&bridge, "Quests", "findKey_Stage"), Some(3));
        assert_eq!(int(&bridge, "Quests", "findKey_Obj_askGuard"), Some(2));
        assert_eq!(int(&bridge, "Quests", "findKey_ObjectivesCompleted"), Some(1));
    }

    #[test]
    fn suppressed_pushes_never_reach_the_bag() {
        let mut bridge = VariableBridge::new(RecordingBag::new(bag()), config());
        let mut log = QuestLog::new();
        log.start("findKey");
        let mut inv = Inventory::new();
        inv.add("Torch", 1);

        bridge.suppress();
        bridge.push_quest(log.get("findKey").unwrap());
        bridge.push_inventory(&inv);
        bridge.push_clock(10);
        bridge.push_flag("door_open");
        bridge.release();
        assert_eq!(bridge.bag().write_count(), 0);

        bridge.push_quest(log.get("findKey").unwrap());
        assert!(bridge.bag().write_count() > 0);
    }

    #[test]
    fn pull_quests_applies_bag_state() {
        let mut bridge = bridge();
        for (name, value) in [
            ("findKey_State", 1),
            ("findKey_Stage", 2),
            ("findKey_Obj_askGuard", 2),
        ] {
            bridge
                .bag_mut()
                .set("Quests", name, Value::Integer(value))
                .unwrap();
        }
        let mut log = QuestLog::new();
        let changed = bridge.pull_quests(&mut log, &PolicyRegistry::new());
        assert_eq!(changed, vec!["findKey".to_string()]);

        let quest = log.get("findKey").unwrap();
        assert_eq!(quest.state, QuestState::Active);
        assert_eq!(quest.stage, 2);
        assert_eq!(quest.objectives["askGuard"].state, QuestState::Completed);

        assert!(bridge.pull_quests(&mut log, &PolicyRegistry::new()).is_empty());
    }

    #[test]
    fn pull_quests_remaps_stage_with_loop_counter() {
        let mut bridge = bridge();
        let bag = bridge.bag_mut();
        bag.set("Quests", "findKey_State", Value::Integer(1)).unwrap();
        bag.set("Quests", "findKey_Stage", Value::Integer(3)).unwrap();

        let mut policies = PolicyRegistry::new();
        policies.register("findKey", StagePolicy::new().with_remap(3, 4, 1));

        let mut log = QuestLog::new();
        bridge.pull_quests(&mut log, &policies);
        assert_eq!(log.stage("findKey"), 3);

        bridge
            .bag_mut()
            .set("Session", "LoopCount", Value::Integer(1))
            .unwrap();
        bridge.pull_quests(&mut log, &policies);
        assert_eq!(log.stage("findKey"), 4);
    }

    #[test]
    fn clear_quest_writes_not_started_values() {
        let mut bridge = bridge();
        let mut log = QuestLog::new();
        log.set_stage("findKey", 3);
        log.set_objective_state("findKey", "askGuard", QuestState::Completed);
        bridge.push_quest(log.get("findKey").unwrap());

        assert_eq!(bridge.clear_quest("findKey"), 4);
        assert_eq!(int(&bridge, "Quests", "findKey_State"), Some(0));
        assert_eq!(int(&bridge, "Quests", "findKey_Stage"), Some(0));
        assert_eq!(int(&bridge, "Quests", "findKey_Obj_askGuard"), Some(0));
        assert_eq!(int(&bridge, "Quests", "findKey_ObjectivesCompleted"), Some(0));
        assert_eq!(bridge.clear_quest("otherQuest"), 0);
    }

    #[test]
    fn clear_quest_is_suppressed_during_pull() {
        let mut bridge = VariableBridge::new(RecordingBag::new(bag()), config());
        bridge.suppress();
        assert_eq!(bridge.clear_quest("findKey"), 0);
        bridge.release();
        assert_eq!(bridge.bag().write_count(), 0);
    }

    #[test]
    fn pull_quests_skips_dormant_unknown_quests() {
        let bridge = bridge();
        let mut log = QuestLog::new();
        assert!(bridge.pull_quests(&mut log, &PolicyRegistry::new()).is_empty());
        assert!(log.get("findKey").is_none());
    }

    #[test]
    fn pull_knowledge_only_learns() {
        let mut bridge = bridge();
        bridge
            .bag_mut()
            .set("Knowledge", "met_guard", Value::Boolean(true))
            .unwrap();
        let mut knowledge = KnowledgeLog::new();
        knowledge.add("local_only");

        let learned = bridge.pull_knowledge(&mut knowledge);
        assert_eq!(learned, vec!["met_guard".to_string()]);
        assert!(knowledge.has("local_only"));
        assert!(!knowledge.has("saw_cellar"));
    }

    #[test]
    fn reset_namespace_uses_type_zero_values() {
        let mut bag = bag()
            .with_var("Session", "Visited", true)
            .with_var("Session", "LastSpeaker", "Guard")
            .with_enum("Session", "Mood", vec![2, 0, 1], 0);
        bag.set("Session", "LoopCount", Value::Integer(3)).unwrap();
        let mut bridge = VariableBridge::new(bag, config());

        assert_eq!(bridge.reset_namespace("Session", ""), 4);
        let bag = bridge.bag();
        assert_eq!(bag.get_int("Session", "LoopCount").unwrap(), Some(0));
        assert_eq!(bag.get_bool("Session", "Visited").unwrap(), Some(false));
        assert_eq!(
            bag.get("Session", "LastSpeaker").unwrap(),
            Some(Value::Text(String::new()))
        );
        assert_eq!(bag.get_int("Session", "Mood").unwrap(), Some(2));
    }

    #[test]
    fn reset_namespace_honours_prefix() {
        let bag = bag()
            .with_var("Session", "tmp_a", 4_i64)
            .with_var("Session", "keep", 4_i64);
        let mut bridge = VariableBridge::new(bag, config());
        assert_eq!(bridge.reset_namespace("Session", "tmp_"), 1);
        assert_eq!(int(&bridge, "Session", "keep"), Some(4));
    }

    #[test]
    fn unknown_set_is_not_fatal() {
        let mut bridge = VariableBridge::new(MemoryBag::new(), StateConfig::default());
        let mut inv = Inventory::new();
        assert!(bridge.apply_inventory_deltas(&mut inv).is_empty());
        assert_eq!(bridge.reset_namespace("Nowhere", ""), 0);
        assert_eq!(bridge.loop_count(), 0);
    }
}
