//! Two-phase overlap classification between colliders.
//!
//! A cheap distance test rejects far-apart pairs first. Pairs that survive go
//! to a shape-specific narrow phase: radius test for circles and points, a
//! local-frame bounds test for circle against rectangle, and a separating axis
//! test for two rectangles.

use glam::Vec2;
use log::trace;
use serde::Serialize;

use crate::components::{Collider, Motion, ShapeKind, POINT_EXTENT};
use crate::ecs::{ComponentStore, Entity, Registry, StoreError};

/// Outcome of [`CollisionDetector::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Contact {
    NoOverlap,
    Overlap,
    /// Circle against rectangle, where the circle sits within the rectangle's
    /// width but beyond its height, i.e. against one of its long faces.
    SideOverlap,
}

impl Contact {
    pub fn is_overlap(self) -> bool {
        !matches!(self, Contact::NoOverlap)
    }
}

/// Rotate `v` counter-clockwise by `angle` radians.
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Corners of a `width` x `height` box centred on the origin, rotated by
/// `angle`: top-right, bottom-right, bottom-left, top-left.
pub fn local_corners(width: f32, height: f32, angle: f32) -> [Vec2; 4] {
    let half = Vec2::new(width, height) / 2.0;
    [
        Vec2::new(half.x, half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(-half.x, -half.y),
        Vec2::new(-half.x, half.y),
    ]
    .map(|corner| rotate(corner, angle))
}

/// `[min, max]` of the corners projected onto `axis`.
pub fn project_interval(corners: &[Vec2], axis: Vec2) -> (f32, f32) {
    corners
        .iter()
        .map(|corner| corner.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), d| {
            (min.min(d), max.max(d))
        })
}

/// Squared-distance bound below which two colliders may touch.
fn broad_phase_bound(a: Vec2, b: Vec2) -> f32 {
    (a.length_squared() + b.length_squared()) / 2.0
}

/// Query view over the motion and collider stores.
///
/// Reads motions and writes colliders: classifying two rectangles refreshes
/// their cached corners when the angle has moved since the last query.
pub struct CollisionDetector<'a> {
    motions: &'a ComponentStore<Motion>,
    colliders: &'a mut ComponentStore<Collider>,
}

impl<'a> CollisionDetector<'a> {
    pub fn new(
        motions: &'a ComponentStore<Motion>,
        colliders: &'a mut ComponentStore<Collider>,
    ) -> Self {
        Self { motions, colliders }
    }

    pub fn from_registry(registry: &'a mut Registry) -> Result<Self, StoreError> {
        let (motions, colliders) = registry.stores_mut::<Motion, Collider>()?;
        Ok(Self::new(motions, colliders))
    }

    /// Classify the overlap between `a` and `b`.
    ///
    /// With `use_interaction_bounds` set, each collider's interaction shape is
    /// used instead of its physical shape.
    ///
    /// # Panics
    ///
    /// Panics if either entity lacks a [`Motion`] or a [`Collider`].
    pub fn classify(&mut self, a: Entity, b: Entity, use_interaction_bounds: bool) -> Contact {
        let motion_a = *self.motion(a);
        let motion_b = *self.motion(b);
        let (kind_a, size_a) = {
            let collider = self.collider(a);
            (
                collider.shape_for(use_interaction_bounds),
                Vec2::new(collider.width(), collider.height()),
            )
        };
        let (kind_b, size_b) = {
            let collider = self.collider(b);
            (
                collider.shape_for(use_interaction_bounds),
                Vec2::new(collider.width(), collider.height()),
            )
        };

        let distance_sq = motion_a.position.distance_squared(motion_b.position);
        if distance_sq >= broad_phase_bound(size_a, size_b) {
            return Contact::NoOverlap;
        }

        let size_a = narrow_phase_size(kind_a, size_a);
        let size_b = narrow_phase_size(kind_b, size_b);

        match (kind_a.is_radial(), kind_b.is_radial()) {
            (true, true) => {
                if distance_sq < broad_phase_bound(size_a, size_b) / 2.0 {
                    Contact::Overlap
                } else {
                    Contact::NoOverlap
                }
            }
            (true, false) => circle_against_rectangle(&motion_a, size_a, &motion_b, size_b),
            (false, true) => circle_against_rectangle(&motion_b, size_b, &motion_a, size_a),
            (false, false) => {
                let corners_a = self.world_corners(a, &motion_a);
                let corners_b = self.world_corners(b, &motion_b);
                separating_axis_test(&corners_a, motion_a.angle, &corners_b, motion_b.angle)
            }
        }
    }

    fn motion(&self, entity: Entity) -> &Motion {
        self.motions
            .get(entity)
            .unwrap_or_else(|err| panic!("collision query: {err}"))
    }

    fn collider(&self, entity: Entity) -> &Collider {
        self.colliders
            .get(entity)
            .unwrap_or_else(|err| panic!("collision query: {err}"))
    }

    /// World-space corners, refreshing the collider's cache first if its angle moved.
    fn world_corners(&mut self, entity: Entity, motion: &Motion) -> [Vec2; 4] {
        let collider = self
            .colliders
            .get_mut(entity)
            .unwrap_or_else(|err| panic!("collision query: {err}"));
        if !collider.corners_valid_for(motion.angle) {
            trace!("recomputing corners of {entity} at angle {}", motion.angle);
        }
        collider
            .refresh_corners(motion.angle)
            .map(|corner| corner + motion.position)
    }
}

/// Points take part in the narrow phase as tiny circles.
fn narrow_phase_size(kind: ShapeKind, size: Vec2) -> Vec2 {
    match kind {
        ShapeKind::Point => Vec2::splat(POINT_EXTENT),
        ShapeKind::Radial | ShapeKind::Rectangular => size,
    }
}

fn circle_against_rectangle(
    circle: &Motion,
    circle_size: Vec2,
    rect: &Motion,
    rect_size: Vec2,
) -> Contact {
    let local = rotate(circle.position - rect.position, -rect.angle).abs();
    let half = rect_size / 2.0;
    let reach = half + Vec2::splat(circle_size.x / 2.0);

    if local.x > reach.x || local.y > reach.y {
        Contact::NoOverlap
    } else if local.x < half.x && local.y > half.y {
        Contact::SideOverlap
    } else {
        Contact::Overlap
    }
}

fn separating_axis_test(
    corners_a: &[Vec2; 4],
    angle_a: f32,
    corners_b: &[Vec2; 4],
    angle_b: f32,
) -> Contact {
    let axis_a = Vec2::from_angle(angle_a);
    let axis_b = Vec2::from_angle(angle_b);
    for axis in [axis_a, axis_a.perp(), axis_b, axis_b.perp()] {
        let (min_a, max_a) = project_interval(corners_a, axis);
        let (min_b, max_b) = project_interval(corners_b, axis);
        if max_a < min_b || max_b < min_a {
            return Contact::NoOverlap;
        }
    }
    Contact::Overlap
}
