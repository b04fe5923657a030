//! Dialogue and runtime configuration.

use serde::{Deserialize, Serialize};
use skein_state::StateConfig;

use crate::error::DialogueResult;

/// How branches are turned into choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Speaker id that marks a branch as a player line.
    pub player_speaker: String,
    /// Label of the single choice offered when the player only has to
    /// confirm to continue.
    pub continue_label: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            player_speaker: "Player".to_string(),
            continue_label: "Continue".to_string(),
        }
    }
}

impl DialogueConfig {
    /// Set the player speaker id.
    pub fn with_player_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.player_speaker = speaker.into();
        self
    }

    /// Set the continue label.
    pub fn with_continue_label(mut self, label: impl Into<String>) -> Self {
        self.continue_label = label.into();
        self
    }
}

/// Everything a host needs to configure a runtime, loadable from one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// State stores and bridge.
    pub state: StateConfig,
    /// Dialogue presentation.
    pub dialogue: DialogueConfig,
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> DialogueResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RuntimeConfig::from_json(
            r#"{
                "dialogue": { "player_speaker": "Hero" },
                "state": { "items": [{ "id": "Letter", "clue_weight": 2 }] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.dialogue.player_speaker, "Hero");
        assert_eq!(config.dialogue.continue_label, "Continue");
        assert_eq!(config.state.inventory_set, "Inventory");
        assert_eq!(config.state.clues().collect::<Vec<_>>(), vec![("Letter", 2)]);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(RuntimeConfig::from_json("{}").unwrap(), RuntimeConfig::default());
    }
}
