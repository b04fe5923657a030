//! Interactive play on the terminal: one line of input per choice.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use skein_dialogue::DialogueState;

use super::{Setup, choice_index, print_dialogue_events, print_state_events};

pub fn run(setup: Setup, start: Option<&str>) -> Result<(), String> {
    let start = setup.start_node(start)?;
    let mut controller = setup.into_controller();
    controller.open(&start).map_err(|e| e.to_string())?;
    print_dialogue_events(&controller.drain_events());
    print_state_events(&controller.state_mut().drain_events());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while controller.dialogue_state() == DialogueState::Active {
        print!("{} ", ">".bold());
        io::stdout().flush().map_err(|e| e.to_string())?;

        let Some(line) = lines.next() else {
            controller.close();
            break;
        };
        let line = line.map_err(|e| format!("cannot read input: {e}"))?;
        if matches!(line.trim(), "q" | "quit") {
            controller.close();
            break;
        }

        match choice_index(&line, controller.choices().len()) {
            Ok(index) => {
                if let Err(e) = controller.select_choice(index) {
                    eprintln!("  {}", e.to_string().red());
                }
            }
            Err(e) => eprintln!("  {}", e.red()),
        }
        print_dialogue_events(&controller.drain_events());
        print_state_events(&controller.state_mut().drain_events());
    }

    print_dialogue_events(&controller.drain_events());
    Ok(())
}
