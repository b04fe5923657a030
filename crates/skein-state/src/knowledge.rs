//! The knowledge log.

use std::collections::BTreeSet;

use skein_core::KnowledgeFact;

/// Facts the player has learned.
///
/// The narrative engine's knowledge variables feed this log through pull
/// sync; nothing is pushed back.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeLog {
    facts: BTreeSet<KnowledgeFact>,
}

impl KnowledgeLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn a fact. Returns `true` if it was new.
    pub fn add(&mut self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.facts.insert(KnowledgeFact::new(name))
    }

    /// Forget a fact. Returns `true` if it was known.
    pub fn remove(&mut self, name: &str) -> bool {
        self.facts.remove(&KnowledgeFact::new(name))
    }

    /// Whether a fact is known.
    pub fn has(&self, name: &str) -> bool {
        self.facts.contains(&KnowledgeFact::new(name))
    }

    /// All known facts, in name order.
    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeFact> {
        self.facts.iter()
    }

    /// Number of known facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether nothing is known.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.facts.clear();
    }
}
