use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tangram::{
    components::{Collider, CurrentScene, Motion},
    ecs::{ComponentStore, Entity, StoreError, World},
    Scenario,
};

fn world() -> World {
    World::new(Scenario::registry())
}

#[test]
fn has_tracks_insert_and_remove() {
    let mut world = world();
    let entity = world.spawn();
    let registry = world.registry_mut();

    assert!(!registry.has::<Motion>(entity));
    registry.insert(entity, Motion::default()).unwrap();
    assert!(registry.has::<Motion>(entity));
    assert_eq!(registry.store::<Motion>().unwrap().len(), 1);

    registry.remove::<Motion>(entity);
    assert!(!registry.has::<Motion>(entity));
    assert_eq!(registry.store::<Motion>().unwrap().len(), 0);
}

#[test]
fn removal_preserves_every_other_association() {
    let mut world = world();
    let entities: Vec<Entity> = (0..200).map(|_| world.spawn()).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut store = ComponentStore::<Motion>::new();
    let mut expected: HashMap<Entity, Motion> = HashMap::new();

    for _ in 0..5_000 {
        let entity = entities[rng.gen_range(0..entities.len())];
        if rng.gen_bool(0.6) {
            let motion = Motion::at(glam::Vec2::new(rng.gen(), rng.gen()));
            if store.insert(entity, motion).is_ok() {
                expected.insert(entity, motion);
            }
        } else {
            store.remove(entity);
            expected.remove(&entity);

            assert_eq!(store.entities().len(), store.components().len());
            for (other, motion) in &expected {
                assert_eq!(store.get(*other).unwrap(), motion);
            }
        }
        assert_eq!(store.len(), expected.len());
    }
}

#[test]
fn duplicate_insert_reports_entity_and_type() {
    let mut world = world();
    let entity = world.spawn();
    let registry = world.registry_mut();
    registry.insert(entity, Collider::point()).unwrap();

    let err = registry.insert(entity, Collider::radial(2.0)).unwrap_err();
    match &err {
        StoreError::DuplicateEntity { entity: e, component } => {
            assert_eq!(*e, entity);
            assert!(component.ends_with("Collider"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("already has"));
}

#[test]
fn remove_all_components_of_touches_only_that_entity() {
    let mut world = world();
    let target = world.spawn();
    let bystander = world.spawn();
    for entity in [target, bystander] {
        let registry = world.registry_mut();
        registry.insert(entity, Motion::default()).unwrap();
        registry.insert(entity, Collider::rectangle(2.0, 2.0)).unwrap();
        registry
            .insert(
                entity,
                CurrentScene {
                    name: "garden".into(),
                },
            )
            .unwrap();
    }

    world.despawn_immediate(target);

    let registry = world.registry();
    assert!(!registry.has::<Motion>(target));
    assert!(!registry.has::<Collider>(target));
    assert!(!registry.has::<CurrentScene>(target));
    assert!(registry.has::<Motion>(bystander));
    assert!(registry.has::<Collider>(bystander));
    assert!(registry.has::<CurrentScene>(bystander));
    assert!(registry.components_of(target).is_empty());
}

#[test]
fn removing_unknown_entity_is_a_no_op() {
    let mut world = world();
    let ghost = world.spawn();

    world.despawn_immediate(ghost);
    world.despawn_immediate(ghost);
    assert!(world.registry().component_counts().is_empty());
}

#[test]
fn restart_keeps_scene_selection() {
    let mut world = world();
    let marker = world.spawn();
    let body = world.spawn();
    let registry = world.registry_mut();
    registry
        .insert(
            marker,
            CurrentScene {
                name: "cellar".into(),
            },
        )
        .unwrap();
    registry.insert(body, Motion::default()).unwrap();
    registry.insert(body, Collider::point()).unwrap();

    world.restart();

    let registry = world.registry();
    assert_eq!(
        registry.get::<CurrentScene>(marker).unwrap().name,
        "cellar"
    );
    assert!(registry.store::<Motion>().unwrap().is_empty());
    assert!(registry.store::<Collider>().unwrap().is_empty());
    assert_eq!(registry.report().total_components, 1);
}
