use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};

use tangram::{
    engine::{EngineBuilder, EngineSettings},
    logging,
    scenario::ScenarioLoader,
    systems::{BoundarySystem, CollisionSystem, MotionSystem},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "tangram arena runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/arena.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Override the scenario's log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<LevelFilter>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let level = match cli.log_level {
        Some(level) => level,
        None => scenario.log_level_filter()?,
    };
    logging::init(level)?;

    let mut world = scenario.build_world()?;
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        dt: scenario.dt,
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };

    let mut engine = EngineBuilder::new(settings)
        .with_system(MotionSystem::new())
        .with_system(CollisionSystem::new())
        .with_system(BoundarySystem::new(scenario.arena.half_extent()))
        .build();

    info!(
        "Scenario '{}': {} bodies, {} ticks",
        engine.scenario_name(),
        scenario.body_count(),
        ticks
    );
    if let Some(description) = &scenario.description {
        info!("{description}");
    }
    let mut total_collisions = 0;
    let mut total_despawned = 0;
    engine.run_with_hook(&mut world, ticks, |summary| {
        total_collisions += summary.collisions;
        total_despawned += summary.despawned;
    })?;

    world.registry().log_component_counts();
    info!(
        "Scenario '{}' completed for {} ticks: {} contacts, {} bodies left the arena",
        engine.scenario_name(),
        ticks,
        total_collisions,
        total_despawned
    );
    Ok(())
}
