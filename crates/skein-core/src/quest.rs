use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Progress state shared by quests and their objectives.
///
/// The narrative engine stores this as an integer enum; [`QuestState::code`]
/// and [`QuestState::from_code`] are the wire mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestState {
    /// Not yet offered or accepted.
    #[default]
    NotStarted,
    /// In progress.
    Active,
    /// Finished successfully. Terminal.
    Completed,
    /// Finished unsuccessfully. Terminal.
    Failed,
}

impl QuestState {
    /// Every state, in wire order.
    pub const ALL: [QuestState; 4] = [
        QuestState::NotStarted,
        QuestState::Active,
        QuestState::Completed,
        QuestState::Failed,
    ];

    /// Integer code used in the variable bag.
    pub fn code(self) -> i64 {
        match self {
            Self::NotStarted => 0,
            Self::Active => 1,
            Self::Completed => 2,
            Self::Failed => 3,
        }
    }

    /// Decode a variable-bag integer. Unknown codes yield `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Whether this state only changes on an explicit reset.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for QuestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::Active => write!(f, "Active"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// A single objective within a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Objective identifier, unique within its quest.
    pub id: String,
    /// Current state.
    pub state: QuestState,
    /// Optional objectives do not block quest completion.
    pub optional: bool,
}

impl Objective {
    /// Create a required objective in the given state.
    pub fn new(id: impl Into<String>, state: QuestState) -> Self {
        Self {
            id: id.into(),
            state,
            optional: false,
        }
    }

    /// Mark the objective as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A quest tracked in the quest log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Quest name, the prefix of all of its bag variables.
    pub name: String,
    /// Current state.
    pub state: QuestState,
    /// Stage counter. Zero only while the quest is not started.
    pub stage: u32,
    /// Objectives keyed by id.
    pub objectives: BTreeMap<String, Objective>,
    /// Temporary quests are purged on a loop reset.
    pub is_temporary: bool,
    /// Quest-specific outcome code mirrored from the engine, if any.
    pub result: Option<i64>,
}

impl Quest {
    /// Create a quest that has not been started.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: QuestState::NotStarted,
            stage: 0,
            objectives: BTreeMap::new(),
            is_temporary: false,
            result: None,
        }
    }

    /// Mark the quest as temporary.
    pub fn temporary(mut self) -> Self {
        self.is_temporary = true;
        self
    }

    /// Whether the quest has left `NotStarted`.
    pub fn is_started(&self) -> bool {
        self.state != QuestState::NotStarted
    }

    /// Whether the quest is completed or failed.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of objectives in the `Completed` state.
    pub fn completed_objective_count(&self) -> usize {
        self.objectives
            .values()
            .filter(|o| o.state == QuestState::Completed)
            .count()
    }

    /// Restore `stage == 0 ⇔ NotStarted` after a raw assignment.
    pub fn normalize(&mut self) {
        if self.state == QuestState::NotStarted && self.stage > 0 {
            self.state = QuestState::Active;
        }
        if self.state != QuestState::NotStarted && self.stage == 0 {
            self.stage = 1;
        }
    }
}
