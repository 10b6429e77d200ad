use anyhow::Result;
use glam::Vec2;
use log::debug;

use crate::{
    components::Motion,
    ecs::{Entity, World},
    engine::{System, SystemContext},
};

/// Queues bodies that leave the arena for despawn at the end of the tick.
pub struct BoundarySystem {
    half_extent: Vec2,
}

impl BoundarySystem {
    /// Arena centred on the origin spanning `half_extent` in each direction.
    pub fn new(half_extent: Vec2) -> Self {
        Self { half_extent }
    }
}

impl System for BoundarySystem {
    fn name(&self) -> &str {
        "boundary"
    }

    fn run(&mut self, ctx: &mut SystemContext, world: &mut World) -> Result<()> {
        let escaped: Vec<Entity> = world
            .registry()
            .store::<Motion>()?
            .iter()
            .filter(|(_, motion)| {
                motion.position.x.abs() > self.half_extent.x
                    || motion.position.y.abs() > self.half_extent.y
            })
            .map(|(entity, _)| entity)
            .collect();
        for entity in escaped {
            debug!("tick {}: {entity} left the arena", ctx.tick);
            world.despawn(entity);
        }
        Ok(())
    }
}
