//! Headless Economy Runner
//!
//! Drives the full observe/decide/act loop against a generated sandbox world
//! and prints a summary, as JSON by default.

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hivemind::core::{load_economy_config, EconomyConfig, UnitTag};
use hivemind::economy::{
    EconomyView, EfficiencyReport, PassOutcome, ResourceAllocator, SandboxLayout, SandboxWorld,
};
use hivemind::intel::{IntelBlackboard, Observation};
use hivemind::strategy::{Classification, StrategyManager};

/// Headless Economy Runner - worker allocation on a generated map
#[derive(Parser, Debug)]
#[command(name = "economy_runner")]
#[command(about = "Run the resource allocator against a sandbox world and report the result")]
struct Args {
    /// Number of bases
    #[arg(long, default_value_t = 2)]
    bases: usize,

    /// Number of workers (all start idle at the first base)
    #[arg(long, default_value_t = 30)]
    workers: usize,

    /// Ready extractors per base
    #[arg(long, default_value_t = 1)]
    extractors_per_base: usize,

    /// Game ticks to simulate
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Game seconds per tick
    #[arg(long, default_value_t = 0.5)]
    dt: f64,

    /// Random seed for the map layout
    #[arg(long)]
    seed: Option<u64>,

    /// Economy config TOML (defaults built in)
    #[arg(long)]
    config: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(Serialize)]
struct BaseSummary {
    base: UnitTag,
    mineral_workers: u32,
    gas_workers: u32,
    target_mineral_workers: u32,
    target_gas_workers: u32,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    game_time: f64,
    passes_completed: u64,
    passes_throttled: u64,
    passes_failed: u64,
    commands_issued: usize,
    commands_rejected: usize,
    efficiency: EfficiencyReport,
    worker_headroom: usize,
    bases: Vec<BaseSummary>,
    strategy: Classification,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hivemind=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => load_economy_config(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load economy config '{}': {}", path, e);
            tracing::warn!("Using default economy config");
            EconomyConfig::default()
        }),
        None => EconomyConfig::default(),
    };

    let layout = SandboxLayout {
        bases: args.bases,
        workers: args.workers,
        extractors_per_base: args.extractors_per_base,
        ..SandboxLayout::default()
    };
    let mut world = SandboxWorld::generate(&layout, seed);
    let mut allocator = ResourceAllocator::new(config);
    let mut intel = IntelBlackboard::new();

    tracing::info!(
        seed,
        bases = args.bases,
        workers = args.workers,
        "Starting economy run"
    );

    let mut completed = 0;
    let mut throttled = 0;
    let mut failed = 0;
    let mut issued = 0;
    let mut rejected = 0;

    for _ in 0..args.ticks {
        world.advance(args.dt);
        intel.update(&observe(&world));

        match allocator.on_tick(&mut world) {
            PassOutcome::Throttled => throttled += 1,
            PassOutcome::Completed(report) => {
                completed += 1;
                issued += report.commands_issued();
                rejected += report.failures.len();
            }
            PassOutcome::Failed { partial, .. } => {
                failed += 1;
                issued += partial.commands_issued();
                rejected += partial.failures.len();
            }
        }
    }

    let bases = world
        .bases()
        .unwrap_or_default()
        .iter()
        .filter_map(|base| allocator.analyze(&world, base).ok())
        .map(|info| BaseSummary {
            base: info.base.tag,
            mineral_workers: info.mineral_workers,
            gas_workers: info.gas_workers,
            target_mineral_workers: info.target_mineral_workers,
            target_gas_workers: info.target_gas_workers,
        })
        .collect();

    let summary = RunSummary {
        seed,
        ticks: args.ticks,
        game_time: world.game_time(),
        passes_completed: completed,
        passes_throttled: throttled,
        passes_failed: failed,
        commands_issued: issued,
        commands_rejected: rejected,
        efficiency: allocator.efficiency(&world),
        worker_headroom: allocator.worker_headroom(&world).unwrap_or(0),
        bases,
        strategy: StrategyManager::new(&intel).classify(),
    };

    if args.format == "text" {
        print_text(&summary, &intel);
    } else {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize summary: {}", e),
        }
    }
}

/// What the game bridge would report this tick
fn observe(world: &SandboxWorld) -> Observation {
    let workers = world.workers().map(|w| w.len()).unwrap_or(0);
    let bases = world.bases().map(|b| b.len()).unwrap_or(0);

    Observation::new()
        .with("game_time", world.game_time())
        .with("base_count", bases)
        .with("food_used", workers)
        .with("food_cap", 15 + 8 * bases)
}

fn print_text(summary: &RunSummary, intel: &IntelBlackboard) {
    println!("=== ECONOMY RUN (seed {}) ===", summary.seed);
    println!(
        "Ticks: {}  Game time: {:.1}s",
        summary.ticks, summary.game_time
    );
    println!(
        "Passes: {} completed, {} throttled, {} failed",
        summary.passes_completed, summary.passes_throttled, summary.passes_failed
    );
    println!(
        "Commands: {} issued, {} rejected",
        summary.commands_issued, summary.commands_rejected
    );
    println!(
        "Efficiency: {:.2} ({:.1} workers/base), headroom {}",
        summary.efficiency.efficiency, summary.efficiency.workers_per_base, summary.worker_headroom
    );
    if let Some(ratio) = intel.facts().supply_ratio() {
        println!("Supply: {:.0}% used", ratio * 100.0);
    }
    for base in &summary.bases {
        println!(
            "  Base {}: minerals {}/{}  gas {}/{}",
            base.base,
            base.mineral_workers,
            base.target_mineral_workers,
            base.gas_workers,
            base.target_gas_workers
        );
    }
    println!(
        "Strategy: {} ({:?})",
        summary.strategy.decision, summary.strategy.rule
    );
}
