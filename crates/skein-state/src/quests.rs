//! The quest log: quest and objective state machines.

use std::collections::{BTreeMap, BTreeSet};

use skein_core::{Objective, Quest, QuestState};

use crate::policy::PolicyRegistry;

/// All quests referenced so far, keyed by name.
///
/// Quests are created lazily the first time they are referenced. Every
/// transition method returns `true` when the quest actually changed.
#[derive(Debug, Clone, Default)]
pub struct QuestLog {
    quests: BTreeMap<String, Quest>,
    temporary: BTreeSet<String>,
}

impl QuestLog {
    /// Create an empty quest log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty quest log that marks the given quests temporary.
    pub fn with_temporary<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            quests: BTreeMap::new(),
            temporary: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Get a quest, creating it in `NotStarted` if it is unknown.
    pub fn ensure(&mut self, name: &str) -> &mut Quest {
        let temporary = self.temporary.contains(name);
        self.quests.entry(name.to_string()).or_insert_with(|| {
            let quest = Quest::new(name);
            if temporary { quest.temporary() } else { quest }
        })
    }

    /// Look up a quest without creating it.
    pub fn get(&self, name: &str) -> Option<&Quest> {
        self.quests.get(name)
    }

    /// State of a quest, `NotStarted` when unknown.
    pub fn state(&self, name: &str) -> QuestState {
        self.get(name).map_or(QuestState::NotStarted, |q| q.state)
    }

    /// Stage of a quest, zero when unknown.
    pub fn stage(&self, name: &str) -> u32 {
        self.get(name).map_or(0, |q| q.stage)
    }

    /// `NotStarted`/`Active` → `Active`, stage 0 → 1. Terminal quests are untouched.
    pub fn start(&mut self, name: &str) -> bool {
        let quest = self.ensure(name);
        if quest.is_terminal() {
            return false;
        }
        let before = (quest.state, quest.stage);
        quest.state = QuestState::Active;
        if quest.stage == 0 {
            quest.stage = 1;
        }
        before != (quest.state, quest.stage)
    }

    /// Set the stage, starting the quest first if needed.
    ///
    /// A started quest never goes back to stage 0; a request for 0 is
    /// clamped to 1.
    pub fn set_stage(&mut self, name: &str, stage: u32) -> bool {
        let mut changed = false;
        if !self.ensure(name).is_started() {
            changed |= self.start(name);
        }
        let quest = self.ensure(name);
        let stage = stage.max(1);
        if quest.stage != stage {
            quest.stage = stage;
            changed = true;
        }
        changed
    }

    /// Force `Completed`.
    pub fn complete(&mut self, name: &str) -> bool {
        self.force(name, QuestState::Completed)
    }

    /// Force `Failed`.
    pub fn fail(&mut self, name: &str) -> bool {
        self.force(name, QuestState::Failed)
    }

    fn force(&mut self, name: &str, state: QuestState) -> bool {
        let quest = self.ensure(name);
        let before = (quest.state, quest.stage);
        quest.state = state;
        quest.normalize();
        before != (quest.state, quest.stage)
    }

    /// Upsert an objective, starting the quest first if needed.
    pub fn set_objective_state(&mut self, quest: &str, objective: &str, state: QuestState) -> bool {
        let mut changed = false;
        if !self.ensure(quest).is_started() {
            changed |= self.start(quest);
        }
        let entry = self
            .ensure(quest)
            .objectives
            .entry(objective.to_string())
            .or_insert_with(|| {
                changed = true;
                Objective::new(objective, state)
            });
        if entry.state != state {
            entry.state = state;
            changed = true;
        }
        changed
    }

    /// Journal text for a quest's current stage, from its policy.
    pub fn stage_description<'a>(
        &self,
        name: &str,
        policies: &'a PolicyRegistry,
    ) -> Option<&'a str> {
        let stage = self.stage(name);
        policies.get(name)?.stage_description(stage)
    }

    /// Apply loop-reset outcomes from policies to non-terminal quests.
    ///
    /// Returns the names of quests whose state changed.
    pub fn apply_loop_reset(&mut self, policies: &PolicyRegistry) -> Vec<String> {
        let mut changed = Vec::new();
        for quest in self.quests.values_mut() {
            if quest.is_terminal() {
                continue;
            }
            let outcome = policies
                .get(&quest.name)
                .and_then(|p| p.loop_reset_outcome(quest.stage));
            if let Some(state) = outcome.filter(|s| *s != quest.state) {
                quest.state = state;
                quest.normalize();
                changed.push(quest.name.clone());
            }
        }
        changed
    }

    /// Remove temporary quests. Returns their names.
    pub fn purge_temporary(&mut self) -> Vec<String> {
        let purged: Vec<String> = self
            .quests
            .values()
            .filter(|q| q.is_temporary)
            .map(|q| q.name.clone())
            .collect();
        for name in &purged {
            self.quests.remove(name);
        }
        purged
    }

    /// Remove every quest. Returns their names.
    pub fn reset_all(&mut self) -> Vec<String> {
        std::mem::take(&mut self.quests).into_keys().collect()
    }

    /// Replace a quest wholesale. Used by pull sync.
    pub fn replace(&mut self, quest: Quest) -> bool {
        match self.quests.get(&quest.name) {
            Some(existing) if *existing == quest => false,
            _ => {
                self.quests.insert(quest.name.clone(), quest);
                true
            }
        }
    }

    /// All quests, in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Quests currently `Active`.
    pub fn active(&self) -> Vec<&Quest> {
        self.iter().filter(|q| q.state == QuestState::Active).collect()
    }

    /// Number of known quests.
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Whether no quest has been referenced.
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}
