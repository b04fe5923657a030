//! Turning valid branches into a choice list.

use serde::{Deserialize, Serialize};

use crate::config::DialogueConfig;
use crate::flow::FlowBranch;

/// One entry in a presented choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceView {
    /// Branch to play when this choice is taken.
    pub branch: usize,
    /// Text to show.
    pub label: String,
    /// Speaker of the line, if any.
    pub speaker: Option<String>,
    /// Whether this is a bare "continue" confirmation.
    pub is_continue: bool,
}

/// What the player is offered after a node's branches arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceSet {
    /// Pick one of these.
    Choices(Vec<ChoiceView>),
    /// Confirm to follow the only branch.
    Continue(ChoiceView),
    /// Nothing to follow; the dialogue ends.
    End,
}

impl ChoiceSet {
    /// The choices to display, in order.
    pub fn views(&self) -> Vec<ChoiceView> {
        match self {
            ChoiceSet::Choices(views) => views.clone(),
            ChoiceSet::Continue(view) => vec![view.clone()],
            ChoiceSet::End => Vec::new(),
        }
    }
}

/// Map branches to choices, keeping source order.
///
/// With a speaker filter only that speaker's branches are kept. The label
/// is the branch's display text, falling back to its raw label and then its
/// target id.
pub fn present_choices(branches: &[FlowBranch], speaker_filter: Option<&str>) -> Vec<ChoiceView> {
    branches
        .iter()
        .filter(|b| speaker_filter.is_none_or(|s| speaks(b, s)))
        .map(|b| ChoiceView {
            branch: b.index,
            label: display_text(b),
            speaker: b.speaker.clone(),
            is_continue: false,
        })
        .collect()
}

/// Decide what to offer for a set of valid branches.
///
/// Player branches, when there are any, are offered on their own. Without
/// them a single branch becomes a "continue" confirmation, several are all
/// offered, and none ends the dialogue.
pub fn resolve_choices(branches: &[FlowBranch], config: &DialogueConfig) -> ChoiceSet {
    let player = present_choices(branches, Some(config.player_speaker.as_str()));
    if !player.is_empty() {
        return ChoiceSet::Choices(player);
    }
    match branches {
        [] => ChoiceSet::End,
        [only] => ChoiceSet::Continue(ChoiceView {
            branch: only.index,
            label: config.continue_label.clone(),
            speaker: only.speaker.clone(),
            is_continue: true,
        }),
        _ => ChoiceSet::Choices(present_choices(branches, None)),
    }
}

fn speaks(branch: &FlowBranch, speaker: &str) -> bool {
    branch
        .speaker
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case(speaker))
}

fn display_text(branch: &FlowBranch) -> String {
    [branch.text.as_deref(), branch.label.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(&branch.target)
        .to_string()
}
