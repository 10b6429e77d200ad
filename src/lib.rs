pub mod collision;
pub mod components;
pub mod ecs;
pub mod engine;
pub mod logging;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod systems;

pub use collision::{CollisionDetector, Contact};
pub use components::{Collider, CurrentScene, Motion, ShapeKind};
pub use ecs::{Entity, Registry, World};
pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use scenario::{Scenario, ScenarioLoader};
