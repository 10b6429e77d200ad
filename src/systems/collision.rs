use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;

use crate::{
    collision::{CollisionDetector, Contact},
    components::{Collider, Motion},
    ecs::{Entity, World},
    engine::{System, SystemContext},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollisionEvent {
    pub a: Entity,
    pub b: Entity,
    pub contact: Contact,
}

/// Contacts found during the current tick.
#[derive(Debug, Default, Clone)]
pub struct CollisionLog {
    events: Vec<CollisionEvent>,
}

impl CollisionLog {
    pub fn record(&mut self, event: CollisionEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn involving(&self, entity: Entity) -> impl Iterator<Item = &CollisionEvent> {
        self.events
            .iter()
            .filter(move |event| event.a == entity || event.b == entity)
    }

    pub fn counts_by_contact(&self) -> HashMap<Contact, usize> {
        let mut counts = HashMap::new();
        for event in &self.events {
            *counts.entry(event.contact).or_insert(0) += 1;
        }
        counts
    }
}

/// Classifies every pair with at least one moving body, once per pair.
///
/// Must run after motion integration. Nothing is removed here; responses that
/// despawn bodies go through the world's deferred queue.
pub struct CollisionSystem {
    use_interaction_bounds: bool,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self {
            use_interaction_bounds: false,
        }
    }

    /// Classify with interaction shapes, as pointer hit-testing does.
    pub fn interaction() -> Self {
        Self {
            use_interaction_bounds: true,
        }
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &str {
        "collision"
    }

    fn run(&mut self, ctx: &mut SystemContext, world: &mut World) -> Result<()> {
        let (motions, colliders) = world.registry_mut().stores_mut::<Motion, Collider>()?;
        let bodies: Vec<(Entity, bool)> = motions
            .iter()
            .filter(|(entity, _)| colliders.has(*entity))
            .map(|(entity, motion)| (entity, motion.is_moving()))
            .collect();

        let mut detector = CollisionDetector::new(motions, colliders);
        for (i, &(a, a_moving)) in bodies.iter().enumerate() {
            for &(b, b_moving) in &bodies[i + 1..] {
                if !a_moving && !b_moving {
                    continue;
                }
                let contact = detector.classify(a, b, self.use_interaction_bounds);
                if contact.is_overlap() {
                    ctx.collisions.record(CollisionEvent { a, b, contact });
                }
            }
        }
        Ok(())
    }
}
