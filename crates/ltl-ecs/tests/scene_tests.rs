//! Integration tests for entity allocation and deferred command timing.

use ltl_ecs::prelude::*;
use proptest::prelude::*;

fn scene_with_capacity(capacity: usize) -> Scene {
    Scene::new(SceneConfig {
        capacity,
        ..SceneConfig::default()
    })
}

fn marker(x: f32) -> EntityBuilder {
    EntityBuilder::new()
        .with(CPosition {
            value: Vec2::new(x, 0.0),
        })
        .with(CFleeting {
            lifetime: 1.0,
            age: 0.0,
        })
}

// -- 1. Deferred deallocation timing --

#[test]
fn deferred_deallocation_stays_visible_for_the_rest_of_the_sweep() {
    let mut scene = Scene::default();
    let targets: Vec<Entity> = (0..4)
        .map(|i| scene.add_entity(&marker(i as f32)).unwrap())
        .collect();

    // The first "system" schedules removal of entity 2; later systems in the
    // same sweep must still see it.
    let mut visited_after_defer = Vec::new();
    for entity in scene.entities().collect::<Vec<_>>() {
        if entity == targets[0] {
            scene.defer_deallocate(targets[2]);
        }
        if scene.has_components(entity, TAG_POSITION | TAG_FLEETING) {
            visited_after_defer.push(entity);
        }
    }
    assert_eq!(visited_after_defer, targets);

    scene.apply_deferred();
    assert_eq!(scene.tags(targets[2]), TAG_NONE);
    assert!(!scene.is_allocated(targets[2]));
    assert!(scene.has_components(targets[3], TAG_POSITION));
}

#[test]
fn deallocated_slot_is_the_next_allocation() {
    let mut scene = Scene::default();
    for i in 0..10 {
        scene.add_entity(&marker(i as f32)).unwrap();
    }
    scene.defer_deallocate(Entity::new(3));
    scene.defer_deallocate(Entity::new(7));
    scene.apply_deferred();

    let reused = scene.add_entity(&marker(0.0)).unwrap();
    assert_eq!(reused, Entity::new(7));
    assert_eq!(scene.add_entity(&marker(0.0)).unwrap(), Entity::new(3));
    assert_eq!(scene.add_entity(&marker(0.0)).unwrap(), Entity::new(10));
}

#[test]
fn conflicting_commands_are_last_write_wins() {
    let mut scene = Scene::default();
    let entity = scene.add_entity(&marker(0.0)).unwrap();

    scene.defer_disable_tags(entity, TAG_FLEETING);
    scene.defer_enable_tags(entity, TAG_FLEETING);
    scene.apply_deferred();
    assert!(scene.has_components(entity, TAG_FLEETING));

    scene.defer_enable_tags(entity, TAG_COLOR);
    scene.defer_set_tags(entity, TAG_POSITION);
    scene.apply_deferred();
    assert_eq!(scene.tags(entity), TAG_POSITION);
}

// -- 2. Randomized allocation invariants --

#[derive(Debug, Clone)]
enum SlotOp {
    Allocate,
    Deallocate(usize),
    DeferDeallocate(usize),
    Apply,
}

fn slot_op_strategy() -> impl Strategy<Value = SlotOp> {
    prop_oneof![
        4 => Just(SlotOp::Allocate),
        2 => (0..64usize).prop_map(SlotOp::Deallocate),
        2 => (0..64usize).prop_map(SlotOp::DeferDeallocate),
        1 => Just(SlotOp::Apply),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1_000))]

    /// Live slots are unique, freed slots are reused most-recent first, and
    /// the high-water mark only grows when nothing is free.
    #[test]
    fn allocation_invariants_hold(ops in prop::collection::vec(slot_op_strategy(), 1..150)) {
        const CAPACITY: usize = 32;
        let mut scene = scene_with_capacity(CAPACITY);
        let mut live: Vec<Entity> = Vec::new();
        let mut free_stack: Vec<Entity> = Vec::new();
        let mut pending: Vec<Entity> = Vec::new();

        for op in &ops {
            match *op {
                SlotOp::Allocate => {
                    let before = scene.entity_count();
                    match scene.add_entity(&marker(0.0)) {
                        Ok(entity) => {
                            prop_assert!(!live.contains(&entity));
                            if let Some(expected) = free_stack.pop() {
                                prop_assert_eq!(entity, expected);
                                prop_assert_eq!(scene.entity_count(), before);
                            } else {
                                prop_assert_eq!(entity.index(), before);
                            }
                            live.push(entity);
                        }
                        Err(EcsError::EntityCapacityExceeded { capacity }) => {
                            prop_assert_eq!(capacity, CAPACITY);
                            prop_assert_eq!(live.len(), CAPACITY);
                        }
                        Err(other) => prop_assert!(false, "unexpected error {other}"),
                    }
                }
                SlotOp::Deallocate(index) => {
                    if live.is_empty() {
                        continue;
                    }
                    let entity = live.remove(index % live.len());
                    prop_assert!(scene.deallocate_entity(entity));
                    prop_assert_eq!(scene.tags(entity), TAG_NONE);
                    free_stack.push(entity);
                }
                SlotOp::DeferDeallocate(index) => {
                    if live.is_empty() {
                        continue;
                    }
                    let entity = live[index % live.len()];
                    scene.defer_deallocate(entity);
                    pending.push(entity);
                    prop_assert!(scene.has_components(entity, TAG_POSITION));
                }
                SlotOp::Apply => {
                    let report = scene.apply_deferred();
                    prop_assert_eq!(report.failed, 0);
                    prop_assert_eq!(report.applied, pending.len());

                    // Freeing an already-free slot is a no-op in the model too.
                    for entity in pending.drain(..) {
                        if let Some(position) = live.iter().position(|&e| e == entity) {
                            live.remove(position);
                            free_stack.push(entity);
                        }
                    }
                    for &entity in &free_stack {
                        prop_assert_eq!(scene.tags(entity), TAG_NONE);
                    }
                }
            }
        }

        for entity in &live {
            prop_assert!(scene.has_components(*entity, TAG_POSITION | TAG_FLEETING));
        }
    }
}
