//! The dialogue flow controller.
//!
//! Drives a [`FlowEngine`] through one dialogue at a time and keeps
//! [`GameState`] in step with it:
//!
//! - Opening pushes local state before the engine evaluates anything.
//! - Entering a node builds its [`EffectBatch`] from metadata but defers it.
//! - Selecting a choice follows the branch, applies the deferred batch,
//!   pushes local state and only then enters the next node.
//! - Variable writes reported by the engine trigger a pull.

use std::fmt;

use skein_core::{MemoryBag, VariableBag};
use skein_state::GameState;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::DialogueConfig;
use crate::effect::EffectBatch;
use crate::error::{DialogueError, DialogueResult};
use crate::flow::{FlowBranch, FlowEngine, FlowEvent, FlowNode};
use crate::presenter::{ChoiceSet, ChoiceView, resolve_choices};

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogueState {
    /// No dialogue is running.
    Idle,
    /// A dialogue is being started.
    Opening,
    /// Waiting for the player to pick a choice.
    Active,
    /// A choice was picked; the graph is advancing.
    Transition,
    /// The dialogue is shutting down.
    Closing,
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueState::Idle => write!(f, "idle"),
            DialogueState::Opening => write!(f, "opening"),
            DialogueState::Active => write!(f, "active"),
            DialogueState::Transition => write!(f, "in transition"),
            DialogueState::Closing => write!(f, "closing"),
        }
    }
}

/// Something the host should present or react to.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueEvent {
    /// The controller changed state.
    StateChanged {
        /// Previous state.
        from: DialogueState,
        /// New state.
        to: DialogueState,
    },
    /// A dialogue session began.
    Opened {
        /// Session id.
        session: Uuid,
        /// Start node id.
        start: String,
    },
    /// A node's line should be shown.
    NodeEntered {
        /// Node id.
        id: String,
        /// Speaker of the line.
        speaker: Option<String>,
        /// The line.
        text: String,
    },
    /// Choices should be shown and input enabled.
    ChoicesPresented(Vec<ChoiceView>),
    /// Choices should be hidden and input disabled.
    ChoicesHidden,
    /// The dialogue session ended.
    Closed {
        /// Session id.
        session: Uuid,
    },
}

/// Per-dialogue context, dropped when the dialogue closes.
#[derive(Debug)]
struct Session {
    id: Uuid,
    node: Option<String>,
    pending: EffectBatch,
    choices: Vec<ChoiceView>,
    needs_refresh: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            node: None,
            pending: EffectBatch::new(),
            choices: Vec::new(),
            needs_refresh: false,
        }
    }
}

/// State machine over narrative graph traversal.
#[derive(Debug)]
pub struct DialogueController<E, B = MemoryBag> {
    engine: E,
    state: GameState<B>,
    config: DialogueConfig,
    status: DialogueState,
    session: Option<Session>,
    events: Vec<DialogueEvent>,
}

impl<E: FlowEngine, B: VariableBag> DialogueController<E, B> {
    /// Create an idle controller.
    pub fn new(engine: E, state: GameState<B>, config: DialogueConfig) -> Self {
        Self {
            engine,
            state,
            config,
            status: DialogueState::Idle,
            session: None,
            events: Vec::new(),
        }
    }

    /// The flow engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The game state.
    pub fn state(&self) -> &GameState<B> {
        &self.state
    }

    /// Mutable access to the game state.
    pub fn state_mut(&mut self) -> &mut GameState<B> {
        &mut self.state
    }

    /// Split the controller into its engine and game state.
    pub fn into_parts(self) -> (E, GameState<B>) {
        (self.engine, self.state)
    }

    /// The dialogue configuration.
    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn dialogue_state(&self) -> DialogueState {
        self.status
    }

    /// Id of the running session.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Id of the node the dialogue is at.
    pub fn current_node(&self) -> Option<&str> {
        self.session.as_ref()?.node.as_deref()
    }

    /// Choices currently presented.
    pub fn choices(&self) -> &[ChoiceView] {
        self.session
            .as_ref()
            .map(|s| s.choices.as_slice())
            .unwrap_or(&[])
    }

    /// Effects waiting for the next choice.
    pub fn pending_effects(&self) -> Option<&EffectBatch> {
        self.session.as_ref().map(|s| &s.pending)
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<DialogueEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Start a dialogue at `start`. Only valid while idle.
    ///
    /// On failure the controller stays idle.
    pub fn open(&mut self, start: &str) -> DialogueResult<()> {
        if self.status != DialogueState::Idle {
            warn!(state = %self.status, "open ignored: a dialogue is running");
            return Err(DialogueError::NotIdle(self.status));
        }
        if start.trim().is_empty() {
            warn!("open ignored: no start node");
            return Err(DialogueError::MissingStartNode);
        }

        self.state.push_all();
        self.set_status(DialogueState::Opening);
        if let Err(e) = self.engine.start(start) {
            warn!(start, error = %e, "dialogue failed to open");
            self.set_status(DialogueState::Idle);
            return Err(e);
        }

        let session = Session::new();
        info!(session = %session.id, start, "dialogue opened");
        self.events.push(DialogueEvent::Opened {
            session: session.id,
            start: start.to_string(),
        });
        self.session = Some(session);
        self.set_status(DialogueState::Active);
        self.enter_node();
        Ok(())
    }

    /// Take a presented choice by its position in [`choices`](Self::choices).
    /// Only valid while active.
    pub fn select_choice(&mut self, choice: usize) -> DialogueResult<()> {
        if self.status != DialogueState::Active {
            warn!(state = %self.status, choice, "choice ignored: not awaiting a choice");
            return Err(DialogueError::NotActive(self.status));
        }
        let Some(session) = self.session.as_mut() else {
            return Err(DialogueError::NotActive(self.status));
        };
        let Some(view) = session.choices.get(choice).cloned() else {
            warn!(choice, offered = session.choices.len(), "choice out of range");
            return Err(DialogueError::InvalidChoice(choice));
        };

        self.set_status(DialogueState::Transition);
        let shown = self.hide_choices();
        if let Err(e) = self.engine.play(view.branch) {
            warn!(branch = view.branch, error = %e, "branch could not be followed");
            self.present(shown);
            self.set_status(DialogueState::Active);
            return Err(e);
        }
        debug!(branch = view.branch, label = %view.label, "choice taken");

        let batch = self
            .session
            .as_mut()
            .map(|s| std::mem::take(&mut s.pending))
            .unwrap_or_default();
        self.apply_batch(&batch);
        self.state.push_all();
        self.enter_node();

        if self.status == DialogueState::Transition {
            self.set_status(DialogueState::Active);
        }
        Ok(())
    }

    /// Close the running dialogue, discarding its pending effects.
    ///
    /// Returns `false` when there is nothing to close.
    pub fn close(&mut self) -> bool {
        match self.status {
            DialogueState::Idle | DialogueState::Closing => {
                debug!(state = %self.status, "close ignored");
                false
            }
            _ => {
                self.shutdown(false);
                true
            }
        }
    }

    // -----------------------------------------------------------------------
    // Engine events
    // -----------------------------------------------------------------------

    fn enter_node(&mut self) {
        let events = self.engine.enter(self.state.bag_mut());
        self.process(events);
    }

    fn process(&mut self, events: Vec<FlowEvent>) {
        for event in events {
            if self.session.is_none() {
                break;
            }
            match event {
                FlowEvent::NodeEntered(node) => self.on_node_entered(node),
                FlowEvent::VariableChanged { set, name } => {
                    trace!(set = %set, name = %name, "engine wrote a variable");
                    if let Some(session) = self.session.as_mut() {
                        session.needs_refresh = true;
                    }
                }
                FlowEvent::BranchesUpdated(branches) => {
                    self.refresh();
                    self.on_branches_updated(&branches);
                }
            }
        }
        self.refresh();
    }

    fn on_node_entered(&mut self, node: FlowNode) {
        let pending = EffectBatch::from_metadata(&node.metadata);
        debug!(node = %node.id, effects = pending.len(), "node entered");
        if let Some(session) = self.session.as_mut() {
            session.node = Some(node.id.clone());
            session.pending = pending;
        }
        self.events.push(DialogueEvent::NodeEntered {
            id: node.id,
            speaker: node.speaker,
            text: node.text,
        });
    }

    fn on_branches_updated(&mut self, branches: &[FlowBranch]) {
        match resolve_choices(branches, &self.config) {
            ChoiceSet::End => {
                debug!("no branch to follow; closing");
                self.shutdown(true);
            }
            set => self.present(set.views()),
        }
    }

    /// Pull engine-side changes if the engine wrote anything.
    fn refresh(&mut self) {
        let needed = self
            .session
            .as_mut()
            .is_some_and(|s| std::mem::take(&mut s.needs_refresh));
        if needed {
            self.state.pull_all();
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_status(&mut self, to: DialogueState) {
        let from = self.status;
        if from == to {
            return;
        }
        trace!(%from, %to, "dialogue state");
        self.status = to;
        self.events.push(DialogueEvent::StateChanged { from, to });
    }

    fn present(&mut self, views: Vec<ChoiceView>) {
        if views.is_empty() {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.choices = views.clone();
        }
        self.events.push(DialogueEvent::ChoicesPresented(views));
    }

    fn hide_choices(&mut self) -> Vec<ChoiceView> {
        let shown = self
            .session
            .as_mut()
            .map(|s| std::mem::take(&mut s.choices))
            .unwrap_or_default();
        if !shown.is_empty() {
            self.events.push(DialogueEvent::ChoicesHidden);
        }
        shown
    }

    fn apply_batch(&mut self, batch: &EffectBatch) {
        if batch.is_empty() {
            return;
        }
        let changed = batch.apply(&mut self.state);
        debug!(effects = batch.len(), changed, "effect batch applied");
    }

    fn shutdown(&mut self, apply_pending: bool) {
        self.set_status(DialogueState::Closing);
        self.engine.stop();
        self.hide_choices();
        if let Some(session) = self.session.take() {
            if apply_pending {
                self.apply_batch(&session.pending);
            } else if !session.pending.is_empty() {
                debug!(effects = session.pending.len(), "pending effects discarded");
            }
            self.state.push_all();
            info!(session = %session.id, "dialogue closed");
            self.events.push(DialogueEvent::Closed {
                session: session.id,
            });
        }
        self.set_status(DialogueState::Idle);
    }
}
