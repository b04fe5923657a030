//! Per-quest behavior hooks.
//!
//! Some quests use their stage number both as a progress counter and as a
//! proxy for state (stage 5 may mean different things depending on how the
//! player got there). That coupling is authoring-specific, so it lives in a
//! policy object looked up by quest name rather than in the quest log.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use skein_core::QuestState;

use crate::config::{QuestPolicyDef, StageRemap};

/// Behavior a single quest may customize.
pub trait QuestPolicy: fmt::Debug {
    /// Journal text for a stage.
    fn stage_description(&self, _stage: u32) -> Option<&str> {
        None
    }

    /// Correct a stage number arriving from the narrative engine.
    fn remap_stage(&self, raw: u32, _loop_count: i64) -> u32 {
        raw
    }

    /// State to force when a loop reset happens while the quest is at `stage`.
    fn loop_reset_outcome(&self, _stage: u32) -> Option<QuestState> {
        None
    }
}

/// A table-driven policy built from configuration.
#[derive(Debug, Clone, Default)]
pub struct StagePolicy {
    descriptions: BTreeMap<u32, String>,
    remaps: Vec<StageRemap>,
    loop_reset: BTreeMap<u32, QuestState>,
}

impl StagePolicy {
    /// Create an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe a stage.
    pub fn with_stage(mut self, stage: u32, description: impl Into<String>) -> Self {
        self.descriptions.insert(stage, description.into());
        self
    }

    /// Rewrite incoming stage `from` to `to` once the loop counter reaches `min_loop`.
    pub fn with_remap(mut self, from: u32, to: u32, min_loop: i64) -> Self {
        self.remaps.push(StageRemap { from, to, min_loop });
        self
    }

    /// Force `outcome` on a loop reset while at `stage`.
    pub fn with_loop_reset(mut self, stage: u32, outcome: QuestState) -> Self {
        self.loop_reset.insert(stage, outcome);
        self
    }
}

impl From<&QuestPolicyDef> for StagePolicy {
    fn from(def: &QuestPolicyDef) -> Self {
        Self {
            descriptions: def.stages.clone(),
            remaps: def.remaps.clone(),
            loop_reset: def.loop_reset.clone(),
        }
    }
}

impl QuestPolicy for StagePolicy {
    fn stage_description(&self, stage: u32) -> Option<&str> {
        self.descriptions.get(&stage).map(String::as_str)
    }

    fn remap_stage(&self, raw: u32, loop_count: i64) -> u32 {
        self.remaps
            .iter()
            .find(|r| r.from == raw && loop_count >= r.min_loop)
            .map_or(raw, |r| r.to)
    }

    fn loop_reset_outcome(&self, stage: u32) -> Option<QuestState> {
        self.loop_reset.get(&stage).copied()
    }
}

/// Policies keyed by quest name.
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Box<dyn QuestPolicy>>,
}

impl PolicyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured policy tables.
    pub fn from_defs(defs: &[QuestPolicyDef]) -> Self {
        let mut registry = Self::new();
        for def in defs {
            registry.register(def.name.clone(), StagePolicy::from(def));
        }
        registry
    }

    /// Register (or replace) the policy for a quest.
    pub fn register(&mut self, quest: impl Into<String>, policy: impl QuestPolicy + 'static) {
        self.policies.insert(quest.into(), Box::new(policy));
    }

    /// Look up the policy for a quest.
    pub fn get(&self, quest: &str) -> Option<&dyn QuestPolicy> {
        self.policies.get(quest).map(|p| p.as_ref())
    }

    /// Stage correction for a quest, identity when it has no policy.
    pub fn remap_stage(&self, quest: &str, raw: u32, loop_count: i64) -> u32 {
        self.get(quest)
            .map_or(raw, |p| p.remap_stage(raw, loop_count))
    }
}
