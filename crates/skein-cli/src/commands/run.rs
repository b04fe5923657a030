//! Non-interactive runs: follow scripted choices, then dump the state.

use comfy_table::{ContentArrangement, Table};
use skein_core::MemoryBag;
use skein_dialogue::{DialogueController, DialogueState, ScriptGraph};
use skein_state::GameState;
use tracing::info;

use super::{Setup, print_dialogue_events, print_state_events};

pub fn run(setup: Setup, start: Option<&str>, choices: &[usize], json: bool) -> Result<(), String> {
    let start = setup.start_node(start)?;
    let mut controller = setup.into_controller();
    controller.open(&start).map_err(|e| e.to_string())?;
    report(&mut controller, json);

    for (step, &choice) in choices.iter().enumerate() {
        if controller.dialogue_state() != DialogueState::Active {
            return Err(format!(
                "choice {} given at step {} but the dialogue has ended",
                choice,
                step + 1
            ));
        }
        let index = super::choice_index(&choice.to_string(), controller.choices().len())
            .map_err(|e| format!("step {}: {e}", step + 1))?;
        controller.select_choice(index).map_err(|e| e.to_string())?;
        report(&mut controller, json);
    }

    if controller.close() {
        info!("dialogue left open after the last choice; closed");
        report(&mut controller, json);
    }

    let (_, state) = controller.into_parts();
    if json {
        print_json(&state)
    } else {
        print_tables(&state);
        Ok(())
    }
}

fn report(controller: &mut DialogueController<ScriptGraph, MemoryBag>, json: bool) {
    let dialogue = controller.drain_events();
    let state = controller.state_mut().drain_events();
    if !json {
        print_dialogue_events(&dialogue);
        print_state_events(&state);
    }
}

fn print_tables(state: &GameState<MemoryBag>) {
    let bag = state.bag();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Set", "Variable", "Type", "Value"]);
    for set in bag.set_names() {
        for (name, var) in bag.variables(set) {
            table.add_row(vec![
                set.to_string(),
                name.to_string(),
                var.ty.to_string(),
                var.value.to_string(),
            ]);
        }
    }
    println!();
    println!("{table}");

    if !state.inventory().is_empty() {
        println!();
        let items: Vec<String> = state
            .inventory()
            .items()
            .iter()
            .map(|i| format!("{} x{}", i.technical_id, i.count))
            .collect();
        println!("  Inventory: {}", items.join(", "));
    }
    for quest in state.quests().iter() {
        println!("  Quest {}: {} (stage {})", quest.name, quest.state, quest.stage);
    }
    if !state.knowledge().is_empty() {
        let facts: Vec<&str> = state.knowledge().iter().map(|f| f.name.as_str()).collect();
        println!("  Knowledge: {}", facts.join(", "));
    }
    println!("  Clock: {} min", state.clock().minutes());
}

fn print_json(state: &GameState<MemoryBag>) -> Result<(), String> {
    let bag = state.bag().to_json().map_err(|e| e.to_string())?;
    let variables: serde_json::Value = serde_json::from_str(&bag).map_err(|e| e.to_string())?;
    let inventory: serde_json::Map<String, serde_json::Value> = state
        .inventory()
        .items()
        .iter()
        .map(|i| (i.technical_id.clone(), i.count.into()))
        .collect();
    let quests: serde_json::Map<String, serde_json::Value> = state
        .quests()
        .iter()
        .map(|q| {
            let entry = serde_json::json!({ "state": q.state.to_string(), "stage": q.stage });
            (q.name.clone(), entry)
        })
        .collect();
    let knowledge: Vec<&str> = state.knowledge().iter().map(|f| f.name.as_str()).collect();

    let out = serde_json::json!({
        "variables": variables,
        "inventory": inventory,
        "quests": quests,
        "knowledge": knowledge,
        "clock_minutes": state.clock().minutes(),
    });
    let text = serde_json::to_string_pretty(&out).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}
