mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::roadmap::RoadmapSubcommand;
use kforge_core::StateStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kforge",
    about = "Track progress through personalized learning roadmaps",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .knowledgeforge/ or .git/)
    #[arg(long, global = true, env = "KFORGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Keep state in memory only; nothing is written to disk
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a project from a generated phase list (JSON file)
    Init {
        /// JSON file holding an array of phases
        #[arg(long)]
        phases: PathBuf,

        /// Free-text experience description handed to the generator
        #[arg(long)]
        description: Option<String>,

        /// Replace any existing project state
        #[arg(long)]
        force: bool,
    },

    /// Show the active roadmap, current task, and progress
    Status,

    /// Complete the current task and advance
    Complete {
        /// Notes about the task
        #[arg(long)]
        feedback: Option<String>,

        /// XP to award (default: config default_task_xp)
        #[arg(long)]
        xp: Option<u64>,
    },

    /// Skip the current task without completing it
    Skip,

    /// Manage roadmaps
    Roadmap {
        #[command(subcommand)]
        subcommand: RoadmapSubcommand,
    },

    /// Show streaks and per-phase statistics
    Stats,

    /// Grant badges and XP to the active roadmap
    Award {
        #[arg(required = true)]
        badges: Vec<String>,

        #[arg(long, default_value = "0")]
        xp: u64,
    },

    /// Delete all project state
    Reset,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = if cli.no_persist {
        StateStore::ephemeral()
    } else {
        StateStore::open(root::resolve_root(cli.root.as_deref()))
    };

    let result = match cli.command {
        Commands::Init {
            phases,
            description,
            force,
        } => cmd::init::run(&store, &phases, description.as_deref(), force, cli.json),
        Commands::Status => cmd::status::run(&store, cli.json),
        Commands::Complete { feedback, xp } => cmd::task::complete(&store, feedback, xp, cli.json),
        Commands::Skip => cmd::task::skip(&store, cli.json),
        Commands::Roadmap { subcommand } => cmd::roadmap::run(&store, subcommand, cli.json),
        Commands::Stats => cmd::stats::run(&store, cli.json),
        Commands::Award { badges, xp } => cmd::task::award(&store, &badges, xp, cli.json),
        Commands::Reset => cmd::init::reset(&store, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
