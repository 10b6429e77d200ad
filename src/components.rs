use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::local_corners;
use crate::ecs::Component;

/// Extent used for point colliders, which behave as tiny circles.
pub const POINT_EXTENT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub position: Vec2,
    /// Orientation in radians.
    pub angle: f32,
    pub velocity: Vec2,
    /// Untransformed bounding extents.
    pub scale: Vec2,
}

impl Motion {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
            velocity: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

impl Component for Motion {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Point,
    Radial,
    Rectangular,
}

impl ShapeKind {
    /// Points and circles share the radial code path.
    pub fn is_radial(self) -> bool {
        matches!(self, ShapeKind::Point | ShapeKind::Radial)
    }
}

/// Shape descriptor plus the memoized rotated corners of its bounding box.
///
/// The corner cache is valid only while it is clean and was computed for the
/// angle being asked about; see [`Collider::corners_valid_for`].
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: ShapeKind,
    /// Shape used for pointer hit-testing; may differ from `shape`.
    pub interaction_shape: ShapeKind,
    width: f32,
    height: f32,
    corners: [Vec2; 4],
    cached_angle: f32,
    dirty: bool,
}

impl Collider {
    pub fn new(shape: ShapeKind, width: f32, height: f32) -> Self {
        Self {
            shape,
            interaction_shape: shape,
            width,
            height,
            corners: [Vec2::ZERO; 4],
            cached_angle: 0.0,
            dirty: true,
        }
    }

    pub fn point() -> Self {
        Self::new(ShapeKind::Point, POINT_EXTENT, POINT_EXTENT)
    }

    /// Circle whose width and height are both `diameter`.
    pub fn radial(diameter: f32) -> Self {
        Self::new(ShapeKind::Radial, diameter, diameter)
    }

    pub fn rectangle(width: f32, height: f32) -> Self {
        Self::new(ShapeKind::Rectangular, width, height)
    }

    pub fn with_interaction_shape(mut self, shape: ShapeKind) -> Self {
        self.interaction_shape = shape;
        self
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.dirty = true;
    }

    pub fn shape_for(&self, interaction: bool) -> ShapeKind {
        if interaction {
            self.interaction_shape
        } else {
            self.shape
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn corners_valid_for(&self, angle: f32) -> bool {
        !self.dirty && self.cached_angle == angle
    }

    /// Cached local-space corners, or `None` when they are stale for `angle`.
    pub fn cached_corners(&self, angle: f32) -> Option<&[Vec2; 4]> {
        self.corners_valid_for(angle).then_some(&self.corners)
    }

    /// Recompute the corner cache if it is stale for `angle`, then return it.
    pub fn refresh_corners(&mut self, angle: f32) -> &[Vec2; 4] {
        if !self.corners_valid_for(angle) {
            self.corners = local_corners(self.width, self.height, angle);
            self.cached_angle = angle;
            self.dirty = false;
        }
        &self.corners
    }
}

impl Component for Collider {}

/// Marker for the scene currently selected; survives a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentScene {
    pub name: String,
}

impl Component for CurrentScene {}
