//! Periodic diagnostics snapshots of the registry

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::collision::Contact;
use crate::ecs::{RegistryReport, World};
use crate::systems::CollisionLog;

#[derive(Debug, Serialize)]
pub struct TickSnapshot<'a> {
    pub scenario: &'a str,
    pub tick: u64,
    pub entities_issued: u64,
    pub registry: RegistryReport,
    pub collisions: BTreeMap<Contact, usize>,
}

pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    /// Write `<dir>/<scenario>/tick_NNNNNN.json` when `tick` lands on the
    /// interval. An interval of zero disables snapshots.
    pub fn maybe_write(
        &self,
        world: &World,
        scenario: &str,
        tick: u64,
        collisions: &CollisionLog,
    ) -> Result<Option<PathBuf>> {
        if self.interval_ticks == 0 || tick % self.interval_ticks != 0 {
            return Ok(None);
        }

        let dir = self.output_dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{tick:06}.json"));

        let snapshot = TickSnapshot {
            scenario,
            tick,
            entities_issued: world.entities_issued(),
            registry: world.registry().report(),
            collisions: collisions.counts_by_contact().into_iter().collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
