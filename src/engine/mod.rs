use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use crate::{
    ecs::World,
    snapshot::SnapshotWriter,
    systems::CollisionLog,
};

pub struct EngineSettings {
    pub scenario_name: String,
    /// Seconds of simulated time per tick.
    pub dt: f32,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            collisions: CollisionLog::default(),
            tick: 0,
            settings: self.settings,
        }
    }
}

/// What happened during one tick, handed to `run_with_hook` callers.
#[derive(Debug, Clone)]
pub struct TickSummary {
    pub tick: u64,
    pub collisions: usize,
    pub despawned: usize,
    pub snapshot: Option<PathBuf>,
}

pub struct Engine {
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    collisions: CollisionLog,
    tick: u64,
    settings: EngineSettings,
}

impl Engine {
    pub fn run(&mut self, world: &mut World, ticks: u64) -> Result<()> {
        self.run_with_hook(world, ticks, |_| {})
    }

    pub fn run_with_hook<F>(&mut self, world: &mut World, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&TickSummary),
    {
        for _ in 0..ticks {
            let summary = self.step(world)?;
            hook(&summary);
        }
        Ok(())
    }

    /// Run every system once, then apply deferred despawns and maybe snapshot.
    pub fn step(&mut self, world: &mut World) -> Result<TickSummary> {
        self.tick += 1;
        self.collisions.clear();
        for system in &mut self.systems {
            let mut ctx = SystemContext {
                tick: self.tick,
                dt: self.settings.dt,
                collisions: &mut self.collisions,
            };
            let tick = self.tick;
            system
                .run(&mut ctx, world)
                .with_context(|| format!("system '{}' failed on tick {}", system.name(), tick))?;
        }
        let despawned = world.flush_despawns();
        let snapshot = self.snapshot_writer.maybe_write(
            world,
            &self.settings.scenario_name,
            self.tick,
            &self.collisions,
        )?;
        debug!(
            "tick {} finished: {} collisions, {} despawned",
            self.tick,
            self.collisions.len(),
            despawned
        );
        Ok(TickSummary {
            tick: self.tick,
            collisions: self.collisions.len(),
            despawned,
            snapshot,
        })
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Contacts recorded during the most recent tick.
    pub fn collisions(&self) -> &CollisionLog {
        &self.collisions
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub dt: f32,
    pub collisions: &'a mut CollisionLog,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &mut SystemContext, world: &mut World) -> Result<()>;
}
