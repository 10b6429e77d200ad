use anyhow::Result;

use crate::{
    components::Motion,
    ecs::World,
    engine::{System, SystemContext},
};

/// Integrates velocity into position for every body.
pub struct MotionSystem;

impl MotionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MotionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MotionSystem {
    fn name(&self) -> &str {
        "motion"
    }

    fn run(&mut self, ctx: &mut SystemContext, world: &mut World) -> Result<()> {
        let motions = world.registry_mut().store_mut::<Motion>()?;
        for motion in motions.components_mut() {
            motion.position += motion.velocity * ctx.dt;
        }
        Ok(())
    }
}
