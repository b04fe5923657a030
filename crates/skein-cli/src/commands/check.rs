use std::path::Path;

use colored::Colorize;

pub fn run(graph: &Path) -> Result<(), String> {
    let graph = super::load_graph(graph)?;
    let problems = graph.validate();

    if problems.is_empty() {
        println!("  All checks passed.");
        println!(
            "  {} nodes, start node {}",
            graph.len(),
            graph.start_node().unwrap_or("(none)")
        );
        return Ok(());
    }

    for problem in &problems {
        eprintln!("  {} {problem}", "problem:".red().bold());
    }
    Err(format!(
        "{} problem{} found",
        problems.len(),
        if problems.len() == 1 { "" } else { "s" }
    ))
}
