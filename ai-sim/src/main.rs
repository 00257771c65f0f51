//! ai-sim CLI.
//!
//! - `ai-sim run <scenario>` - simulate a scenario and log statuses and animation events
//! - `ai-sim export <scenario>` - re-export the scenario's tree in canonical order
//! - `ai-sim inspect <scenario>` - print the tree, clips and track layout

use std::path::{Path, PathBuf};

use ai_anim::BindPoseSampler;
use ai_bt::{BehaviorTree, NodeIndex};
use ai_core::CharacterId;
use ai_sim::{Scenario, SimWorld, Simulation};
use ai_tools::TraceLog;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ai-sim")]
#[command(about = "Behavior tree and animation simulation harness", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a scenario
    Run {
        /// Scenario file (YAML)
        scenario: PathBuf,

        /// Override the scenario's frame count
        #[arg(long)]
        frames: Option<u32>,

        /// Override the scenario's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write every character's trace log to this file (JSON)
        #[arg(long)]
        trace_out: Option<PathBuf>,
    },

    /// Import the scenario's tree and print it back as a document
    Export {
        scenario: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the tree, clips and tracks of a scenario
    Inspect { scenario: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    if cli.json {
        fmt().json().with_env_filter(filter).with_target(false).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    match cli.command {
        Commands::Run {
            scenario,
            frames,
            seed,
            trace_out,
        } => run(&scenario, frames, seed, trace_out.as_deref()),
        Commands::Export { scenario, output } => export(&scenario, output.as_deref()),
        Commands::Inspect { scenario } => inspect(&scenario),
    }
}

fn run(path: &Path, frames: Option<u32>, seed: Option<u64>, trace_out: Option<&Path>) -> Result<()> {
    let mut scenario = Scenario::load(path)?;
    if let Some(seed) = seed {
        scenario.config.seed = seed;
    }
    if trace_out.is_some() {
        scenario.config.trace = true;
    }
    let frames = frames.unwrap_or(scenario.config.frames);
    let mut sim = Simulation::new(&scenario)?;

    tracing::info!(scenario = %path.display(), frames, "Starting simulation");
    let mut fired = 0usize;
    for _ in 0..frames {
        let report = sim.step();
        for character in &report.characters {
            tracing::debug!(
                tick = report.tick,
                character = %character.id,
                status = ?character.status,
                state = character.state.as_deref().unwrap_or("-"),
                "frame"
            );
        }
        for event in &report.events {
            tracing::info!(
                tick = report.tick,
                time = report.time,
                character = %event.character,
                track = event.track,
                state = %event.state,
                event = %event.name,
                "animation event"
            );
        }
        fired += report.events.len();
    }

    println!("Simulated {frames} frames, {fired} animation events");
    for id in sim.world().characters() {
        let state = sim
            .world()
            .machine(id)
            .and_then(|m| m.current_state(0))
            .map_or("-", |s| s.name());
        let finished = sim.context(id).is_some_and(|ctx| ctx.is_finished());
        println!(
            "  character {id}: state {state}, position {}, finished {finished}",
            sim.world().position(id)
        );
        if let Some(pose) = sim.pose(id, &BindPoseSampler) {
            if let Some(root) = pose.joints().first() {
                println!("    root joint at {}", root.translation);
            }
        }
    }

    if let Some(out) = trace_out {
        let traces: Vec<(CharacterId, &TraceLog)> = sim
            .world()
            .characters()
            .filter_map(|id| sim.trace(id).map(|log| (id, log)))
            .collect();
        let json = serde_json::to_string_pretty(&traces)?;
        std::fs::write(out, json)
            .with_context(|| format!("Failed to write trace to {}", out.display()))?;
        println!("Wrote trace to {}", out.display());
    }
    Ok(())
}

fn export(path: &Path, output: Option<&Path>) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let sim = Simulation::new(&scenario)?;
    let json = serde_json::to_string_pretty(&sim.tree().export())?;
    match output {
        Some(out) => std::fs::write(out, json)
            .with_context(|| format!("Failed to write tree to {}", out.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let sim = Simulation::new(&scenario)?;
    let tree = sim.tree();

    println!("Tree '{}' ({} nodes)", tree.name(), tree.len());
    if let Some(root) = tree.root() {
        print_subtree(tree, root, 1);
    }
    println!();
    println!("Clips: {}", sim.library().len());
    for name in sim.library().names() {
        if let Some(clip) = sim.library().get(name) {
            println!(
                "  {name}: {:.2}s, speed {}, {}, {} events",
                clip.duration,
                clip.speed,
                if clip.looping { "looping" } else { "once" },
                clip.events.len()
            );
        }
    }
    println!();
    println!("Skeleton: {} joints", sim.skeleton().len());
    println!("Tracks:");
    println!("  0: base");
    for (i, overlay) in scenario.config.animator.overlays.iter().enumerate() {
        println!("  {}: overlay at '{}'", i + 1, overlay.root_joint);
    }
    Ok(())
}

fn print_subtree(tree: &BehaviorTree<SimWorld>, node: NodeIndex, depth: usize) {
    let entry = tree.node(node);
    let attributes: Vec<String> = entry
        .kind()
        .attributes()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    println!(
        "{:indent$}{} {}{}{}",
        "",
        node,
        entry.type_name(),
        if attributes.is_empty() {
            String::new()
        } else {
            format!(" [{}]", attributes.join(", "))
        },
        if entry.has_breakpoint() { " (breakpoint)" } else { "" },
        indent = depth * 2
    );
    for &child in entry.children() {
        print_subtree(tree, child, depth + 1);
    }
}
