//! Branch conditions evaluated against the variable bag.

use serde::{Deserialize, Serialize};
use skein_core::{Value, VariableBag};
use tracing::debug;

/// A condition guarding a branch.
///
/// Conditions read the variable bag directly, so they see whatever local
/// state has been pushed before the node is entered. A variable that cannot
/// be read makes its comparison false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// A variable holds exactly this value.
    VarEquals {
        /// Variable set.
        set: String,
        /// Variable name.
        name: String,
        /// Expected value.
        value: Value,
    },
    /// An integer variable is at least this value.
    VarAtLeast {
        /// Variable set.
        set: String,
        /// Variable name.
        name: String,
        /// Lower bound, inclusive.
        value: i64,
    },
    /// A boolean variable is `true`.
    HasFlag {
        /// Variable set.
        set: String,
        /// Variable name.
        name: String,
    },
    /// Logical NOT.
    Not(Box<Condition>),
    /// Logical AND.
    And(Vec<Condition>),
    /// Logical OR.
    Or(Vec<Condition>),
    /// Always true.
    #[default]
    Always,
}

impl Condition {
    /// Evaluate the condition against the bag.
    pub fn evaluate(&self, bag: &dyn VariableBag) -> bool {
        match self {
            Condition::VarEquals { set, name, value } => {
                read(bag, set, name).is_some_and(|v| v == *value)
            }
            Condition::VarAtLeast { set, name, value } => {
                read(bag, set, name).and_then(|v| v.as_int()).is_some_and(|n| n >= *value)
            }
            Condition::HasFlag { set, name } => {
                read(bag, set, name).and_then(|v| v.as_bool()) == Some(true)
            }
            Condition::Not(inner) => !inner.evaluate(bag),
            Condition::And(conditions) => conditions.iter().all(|c| c.evaluate(bag)),
            Condition::Or(conditions) => conditions.iter().any(|c| c.evaluate(bag)),
            Condition::Always => true,
        }
    }
}

fn read(bag: &dyn VariableBag, set: &str, name: &str) -> Option<Value> {
    match bag.get(set, name) {
        Ok(value) => value,
        Err(e) => {
            debug!(set, name, error = %e, "condition variable unreadable");
            None
        }
    }
}
