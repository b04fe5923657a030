//! Variable naming conventions.
//!
//! The narrative engine exposes no schema for inventory or quest state.
//! Instead, variables follow naming patterns that both sides agree on:
//!
//! | pattern                              | meaning                          |
//! |--------------------------------------|----------------------------------|
//! | `item_<id>_delta`                    | pending count change (consumed)  |
//! | `item_<id>_count`                    | mirrored count                   |
//! | `<quest>_State`                      | quest state code                 |
//! | `<quest>_Stage`                      | quest stage                      |
//! | `<quest>_Obj_<objective>`            | objective state code             |
//! | `<quest>_ObjectivesCompleted`        | completed objective count        |
//! | `<quest>_Result`                     | quest-specific outcome code      |

const ITEM_PREFIX: &str = "item_";
const DELTA_SUFFIX: &str = "_delta";
const COUNT_SUFFIX: &str = "_count";

const STATE_SUFFIX: &str = "_State";
const STAGE_SUFFIX: &str = "_Stage";
const RESULT_SUFFIX: &str = "_Result";
const OBJECTIVES_COMPLETED_SUFFIX: &str = "_ObjectivesCompleted";
const OBJECTIVE_INFIX: &str = "_Obj_";

/// Name of the delta variable for an item.
pub fn item_delta(technical_id: &str) -> String {
    format!("{ITEM_PREFIX}{technical_id}{DELTA_SUFFIX}")
}

/// Name of the count variable for an item.
pub fn item_count(technical_id: &str) -> String {
    format!("{ITEM_PREFIX}{technical_id}{COUNT_SUFFIX}")
}

/// A recognized inventory variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKey<'a> {
    /// `item_<id>_delta`
    Delta(&'a str),
    /// `item_<id>_count`
    Count(&'a str),
}

/// Classify an inventory variable name.
pub fn parse_item_key(name: &str) -> Option<ItemKey<'_>> {
    let rest = name.strip_prefix(ITEM_PREFIX)?;
    if let Some(id) = rest.strip_suffix(DELTA_SUFFIX) {
        return non_empty(id).map(ItemKey::Delta);
    }
    if let Some(id) = rest.strip_suffix(COUNT_SUFFIX) {
        return non_empty(id).map(ItemKey::Count);
    }
    None
}

/// Name of a quest's state variable.
pub fn quest_state(quest: &str) -> String {
    format!("{quest}{STATE_SUFFIX}")
}

/// Name of a quest's stage variable.
pub fn quest_stage(quest: &str) -> String {
    format!("{quest}{STAGE_SUFFIX}")
}

/// Name of a quest objective's state variable.
pub fn quest_objective(quest: &str, objective: &str) -> String {
    format!("{quest}{OBJECTIVE_INFIX}{objective}")
}

/// Name of a quest's completed-objective counter.
pub fn quest_objectives_completed(quest: &str) -> String {
    format!("{quest}{OBJECTIVES_COMPLETED_SUFFIX}")
}

/// Name of a quest's outcome variable.
pub fn quest_result(quest: &str) -> String {
    format!("{quest}{RESULT_SUFFIX}")
}

/// A recognized quest variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestKey<'a> {
    /// `<quest>_State`
    State(&'a str),
    /// `<quest>_Stage`
    Stage(&'a str),
    /// `<quest>_Obj_<objective>`
    Objective {
        /// Quest name.
        quest: &'a str,
        /// Objective id.
        objective: &'a str,
    },
    /// `<quest>_ObjectivesCompleted`
    ObjectivesCompleted(&'a str),
    /// `<quest>_Result`
    Result(&'a str),
}

impl<'a> QuestKey<'a> {
    /// The quest this variable belongs to.
    pub fn quest(&self) -> &'a str {
        match *self {
            Self::State(q)
            | Self::Stage(q)
            | Self::ObjectivesCompleted(q)
            | Self::Result(q)
            | Self::Objective { quest: q, .. } => q,
        }
    }
}

/// Classify a quest variable name.
///
/// The objective infix is matched before the `_State`/`_Stage`/`_Result`
/// suffixes, so an objective id ending in `_State` stays an objective.
pub fn parse_quest_key(name: &str) -> Option<QuestKey<'_>> {
    if let Some(q) = name.strip_suffix(OBJECTIVES_COMPLETED_SUFFIX) {
        return non_empty(q).map(QuestKey::ObjectivesCompleted);
    }
    if let Some((quest, objective)) = name.split_once(OBJECTIVE_INFIX) {
        if !quest.is_empty() && !objective.is_empty() {
            return Some(QuestKey::Objective { quest, objective });
        }
        return None;
    }
    if let Some(q) = name.strip_suffix(STATE_SUFFIX) {
        return non_empty(q).map(QuestKey::State);
    }
    if let Some(q) = name.strip_suffix(STAGE_SUFFIX) {
        return non_empty(q).map(QuestKey::Stage);
    }
    if let Some(q) = name.strip_suffix(RESULT_SUFFIX) {
        return non_empty(q).map(QuestKey::Result);
    }
    None
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}
