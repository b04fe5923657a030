use serde::{Deserialize, Serialize};

/// A fact the player has learned. Presence is the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KnowledgeFact {
    /// Fact name, shared with the narrative engine's knowledge variables.
    pub name: String,
}

impl KnowledgeFact {
    /// Create a fact record.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
