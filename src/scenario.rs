use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use log::LevelFilter;
use rand::Rng;
use serde::Deserialize;

use crate::{
    components::{Collider, CurrentScene, Motion, ShapeKind},
    ecs::{Registry, World},
    rng::RngManager,
};

fn default_dt() -> f32 {
    1.0 / 60.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_half_extent() -> f32 {
    100.0
}

fn default_max_speed() -> f32 {
    20.0
}

fn default_min_size() -> f32 {
    2.0
}

fn default_max_size() -> f32 {
    10.0
}

/// Engine settings plus the recipe for a generated arena of bodies.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    /// Seconds per tick.
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default)]
    pub snapshot_interval_ticks: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub arena: ArenaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArenaConfig {
    #[serde(default = "default_half_extent")]
    pub half_width: f32,
    #[serde(default = "default_half_extent")]
    pub half_height: f32,
    #[serde(default)]
    pub bodies: Vec<BodyGroup>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_width: default_half_extent(),
            half_height: default_half_extent(),
            bodies: Vec::new(),
        }
    }
}

impl ArenaConfig {
    pub fn half_extent(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }
}

/// `count` bodies of one shape with randomized placement and size.
#[derive(Debug, Clone, Deserialize)]
pub struct BodyGroup {
    pub shape: ShapeKind,
    pub count: u32,
    #[serde(default)]
    pub interaction_shape: Option<ShapeKind>,
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    #[serde(default = "default_min_size")]
    pub min_size: f32,
    #[serde(default = "default_max_size")]
    pub max_size: f32,
    #[serde(default)]
    pub stationary: bool,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            bail!("dt must be positive, got {}", self.dt);
        }
        let half = self.arena.half_extent();
        if !(half.is_finite() && half.x > 0.0 && half.y > 0.0) {
            bail!("arena extents must be positive, got {half}");
        }
        for group in &self.arena.bodies {
            if !(group.min_size.is_finite() && group.max_size.is_finite())
                || group.min_size <= 0.0
                || group.min_size > group.max_size
            {
                bail!(
                    "body sizes must satisfy 0 < min_size <= max_size, got {}..{}",
                    group.min_size,
                    group.max_size
                );
            }
            if !(group.max_speed.is_finite() && group.max_speed >= 0.0) {
                bail!("max_speed must be finite and not negative, got {}", group.max_speed);
            }
        }
        self.log_level_filter()?;
        Ok(())
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .with_context(|| format!("Unknown log level '{}'", self.log_level))
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(600)
    }

    pub fn body_count(&self) -> u64 {
        self.arena.bodies.iter().map(|g| g.count as u64).sum()
    }

    /// Registry with every store the runtime uses. The current scene marker
    /// is persistent so it survives a restart.
    pub fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register::<Motion>()
            .register::<Collider>()
            .register_persistent::<CurrentScene>();
        registry
    }

    /// Generate the arena deterministically from `seed`.
    pub fn build_world(&self) -> Result<World> {
        let mut world = World::new(Self::registry());
        let mut rng_manager = RngManager::new(self.seed);
        let mut rng = rng_manager.stream("arena");
        let half = self.arena.half_extent();

        if let Some(scene) = &self.scene {
            let marker = world.spawn();
            world.registry_mut().insert(
                marker,
                CurrentScene {
                    name: scene.clone(),
                },
            )?;
        }

        for group in &self.arena.bodies {
            for _ in 0..group.count {
                let position = Vec2::new(
                    rng.gen_range(-half.x..=half.x),
                    rng.gen_range(-half.y..=half.y),
                );
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let velocity = if group.stationary || group.max_speed == 0.0 {
                    Vec2::ZERO
                } else {
                    Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU))
                        * rng.gen_range(0.0..=group.max_speed)
                };
                let width = rng.gen_range(group.min_size..=group.max_size);
                let height = rng.gen_range(group.min_size..=group.max_size);

                let collider = match group.shape {
                    ShapeKind::Point => Collider::point(),
                    ShapeKind::Radial => Collider::radial(width),
                    ShapeKind::Rectangular => Collider::rectangle(width, height),
                };
                let collider = match group.interaction_shape {
                    Some(shape) => collider.with_interaction_shape(shape),
                    None => collider,
                };
                let motion = Motion::at(position)
                    .with_angle(angle)
                    .with_velocity(velocity)
                    .with_scale(Vec2::new(collider.width(), collider.height()));

                let entity = world.spawn();
                let registry = world.registry_mut();
                registry.insert(entity, motion)?;
                registry.insert(entity, collider)?;
            }
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARENA: &str = r#"
name: test_arena
seed: 3
arena:
  half_width: 50
  half_height: 25
  bodies:
    - shape: radial
      count: 4
    - shape: rectangular
      count: 3
      stationary: true
"#;

    #[test]
    fn test_defaults_are_applied() {
        let scenario: Scenario = serde_yaml::from_str(ARENA).unwrap();
        assert_eq!(scenario.dt, default_dt());
        assert_eq!(scenario.ticks(None), 600);
        assert_eq!(scenario.ticks(Some(5)), 5);
        assert_eq!(scenario.log_level_filter().unwrap(), LevelFilter::Info);
        assert_eq!(scenario.body_count(), 7);
        scenario.validate().unwrap();
    }

    #[test]
    fn test_build_world_is_deterministic() {
        let scenario: Scenario = serde_yaml::from_str(ARENA).unwrap();
        let a = scenario.build_world().unwrap();
        let b = scenario.build_world().unwrap();

        let motions_a = a.registry().store::<Motion>().unwrap();
        let motions_b = b.registry().store::<Motion>().unwrap();
        assert_eq!(motions_a.len(), 7);
        assert_eq!(motions_a.components(), motions_b.components());
        for motion in motions_a.components() {
            assert!(motion.position.x.abs() <= 50.0);
            assert!(motion.position.y.abs() <= 25.0);
        }
    }

    #[test]
    fn test_stationary_group_does_not_move() {
        let scenario: Scenario = serde_yaml::from_str(ARENA).unwrap();
        let world = scenario.build_world().unwrap();
        let registry = world.registry();
        let colliders = registry.store::<Collider>().unwrap();

        for (entity, collider) in colliders.iter() {
            if collider.shape == ShapeKind::Rectangular {
                assert!(!registry.get::<Motion>(entity).unwrap().is_moving());
            }
        }
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        for (field, value) in [
            ("half_width: 50", "half_width: .nan"),
            ("half_height: 25", "half_height: .inf"),
            ("count: 4", "count: 4\n      max_size: .inf"),
            ("count: 4", "count: 4\n      min_size: .nan"),
            ("count: 4", "count: 4\n      max_speed: .nan"),
            ("seed: 3", "seed: 3\ndt: .inf"),
        ] {
            let yaml = ARENA.replacen(field, value, 1);
            let scenario: Scenario = serde_yaml::from_str(&yaml).unwrap();
            assert!(scenario.validate().is_err(), "accepted {value}");
        }
    }

    #[test]
    fn test_invalid_sizes_are_rejected() {
        let mut scenario: Scenario = serde_yaml::from_str(ARENA).unwrap();
        scenario.arena.bodies[0].min_size = 20.0;
        assert!(scenario.validate().is_err());

        scenario.arena.bodies[0].min_size = 1.0;
        scenario.log_level = "loud".into();
        assert!(scenario.validate().is_err());
    }
}
