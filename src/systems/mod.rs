mod boundary;
mod collision;
mod motion;

pub use boundary::BoundarySystem;
pub use collision::{CollisionEvent, CollisionLog, CollisionSystem};
pub use motion::MotionSystem;
