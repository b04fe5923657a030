//! CLI frontend for the Skein dialogue runtime.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "skein",
    about = "Skein: run narrative dialogue graphs against game state",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log runtime decisions to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a dialogue graph and report dangling references
    Check {
        /// Graph file (JSON)
        graph: PathBuf,
    },

    /// Play a dialogue graph interactively on the terminal
    Play {
        /// Graph file (JSON)
        graph: PathBuf,

        /// Variable declarations (JSON)
        #[arg(long)]
        vars: Option<PathBuf>,

        /// Runtime configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Start node (default: the graph's start node)
        #[arg(short, long)]
        start: Option<String>,
    },

    /// Run a dialogue with scripted choices and print the resulting state
    Run {
        /// Graph file (JSON)
        graph: PathBuf,

        /// Variable declarations (JSON)
        #[arg(long)]
        vars: Option<PathBuf>,

        /// Runtime configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Start node (default: the graph's start node)
        #[arg(short, long)]
        start: Option<String>,

        /// Choices to pick, 1-based, in order (e.g. 1,2,1)
        #[arg(long, value_delimiter = ',')]
        choices: Vec<usize>,

        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check { graph } => commands::check::run(&graph),
        Commands::Play {
            graph,
            vars,
            config,
            start,
        } => commands::load(&graph, vars.as_deref(), config.as_deref())
            .and_then(|setup| commands::play::run(setup, start.as_deref())),
        Commands::Run {
            graph,
            vars,
            config,
            start,
            choices,
            json,
        } => commands::load(&graph, vars.as_deref(), config.as_deref())
            .and_then(|setup| commands::run::run(setup, start.as_deref(), &choices, json)),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
