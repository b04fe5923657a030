pub mod check;
pub mod play;
pub mod run;

use std::fs;
use std::path::Path;

use colored::Colorize;
use skein_core::MemoryBag;
use skein_dialogue::{ChoiceView, DialogueController, DialogueEvent, RuntimeConfig, ScriptGraph};
use skein_state::{GameState, StateEvent};
use tracing::debug;

/// Everything a dialogue run needs, loaded from disk.
pub struct Setup {
    pub graph: ScriptGraph,
    pub bag: MemoryBag,
    pub config: RuntimeConfig,
}

impl Setup {
    /// Resolve the start node: the explicit one, else the graph's own.
    pub fn start_node(&self, start: Option<&str>) -> Result<String, String> {
        start
            .or_else(|| self.graph.start_node())
            .map(str::to_string)
            .ok_or_else(|| "graph has no start node; pass --start".to_string())
    }

    /// Build a controller over the loaded graph and variables.
    pub fn into_controller(self) -> DialogueController<ScriptGraph, MemoryBag> {
        let state = GameState::new(self.bag, self.config.state);
        DialogueController::new(self.graph, state, self.config.dialogue)
    }
}

/// Load a graph plus optional variables and configuration.
pub fn load(graph: &Path, vars: Option<&Path>, config: Option<&Path>) -> Result<Setup, String> {
    let graph = load_graph(graph)?;
    let bag = match vars {
        Some(path) => MemoryBag::from_json(&read(path)?)
            .map_err(|e| format!("{}: {e}", path.display()))?,
        None => MemoryBag::new(),
    };
    let config = match config {
        Some(path) => RuntimeConfig::from_json(&read(path)?)
            .map_err(|e| format!("{}: {e}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    debug!(nodes = graph.len(), "loaded dialogue setup");
    Ok(Setup { graph, bag, config })
}

fn load_graph(path: &Path) -> Result<ScriptGraph, String> {
    ScriptGraph::from_json(&read(path)?).map_err(|e| format!("{}: {e}", path.display()))
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Print what the host would show for each dialogue event.
pub fn print_dialogue_events(events: &[DialogueEvent]) {
    for event in events {
        match event {
            DialogueEvent::NodeEntered { speaker, text, .. } => match speaker {
                Some(speaker) => println!("{} {text}", format!("{speaker}:").cyan().bold()),
                None => println!("{text}"),
            },
            DialogueEvent::ChoicesPresented(views) => print_choices(views),
            DialogueEvent::Closed { .. } => println!("{}", "  (end of dialogue)".dimmed()),
            DialogueEvent::StateChanged { from, to } => debug!(%from, %to, "dialogue state"),
            DialogueEvent::Opened { session, start } => debug!(%session, start, "dialogue opened"),
            DialogueEvent::ChoicesHidden => {}
        }
    }
}

fn print_choices(views: &[ChoiceView]) {
    for (i, view) in views.iter().enumerate() {
        let number = format!("{}.", i + 1);
        match (&view.speaker, view.is_continue) {
            (Some(speaker), false) => {
                println!("  {} [{speaker}] {}", number.yellow(), view.label)
            }
            _ => println!("  {} {}", number.yellow(), view.label),
        }
    }
}

/// Print gameplay changes the dialogue caused.
pub fn print_state_events(events: &[StateEvent]) {
    for event in events {
        let line = match event {
            StateEvent::ItemCountChanged {
                technical_id,
                count,
            } => format!("item {technical_id} x{count}"),
            StateEvent::InventoryCleared => "inventory cleared".to_string(),
            StateEvent::QuestChanged { name, state, stage } => {
                format!("quest {name}: {state} (stage {stage})")
            }
            StateEvent::QuestRemoved { name } => format!("quest {name} removed"),
            StateEvent::KnowledgeChanged { name, known: true } => format!("learned {name}"),
            StateEvent::KnowledgeChanged { name, known: false } => format!("forgot {name}"),
            StateEvent::ClockAdvanced { minutes } => format!("clock at {minutes} min"),
            StateEvent::FlagSet { name } => format!("flag {name} set"),
        };
        println!("  {} {}", "+".green(), line.green());
    }
}

/// Parse a 1-based choice number against the current choice list.
pub fn choice_index(input: &str, available: usize) -> Result<usize, String> {
    let n: usize = input
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a choice number", input.trim()))?;
    if n == 0 || n > available {
        return Err(format!("choice {n} is out of range (1-{available})"));
    }
    Ok(n - 1)
}
