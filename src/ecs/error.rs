use thiserror::Error;

use super::Entity;

/// Failures reported by component stores and the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entity {entity} already has a {component} component")]
    DuplicateEntity {
        entity: Entity,
        component: &'static str,
    },
    #[error("entity {entity} has no {component} component")]
    NotFound {
        entity: Entity,
        component: &'static str,
    },
    #[error("no store registered for {component}")]
    Unregistered { component: &'static str },
    #[error("cannot borrow the {component} store twice")]
    Aliased { component: &'static str },
}
