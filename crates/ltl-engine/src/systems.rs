//! Generic per-entity systems: smoothing, kinematics, lifetimes and animation.
//!
//! Each system takes the scene, one entity and the fixed timestep, and
//! returns early when the entity lacks the tags it needs. Structural changes
//! go through the deferred command queue.

use ltl_ecs::prelude::*;

/// Remember the current position as the start of this tick's motion.
pub fn smooth_update(scene: &mut Scene, entity: Entity) {
    if !scene.has_components(entity, TAG_POSITION | TAG_SMOOTH) {
        return;
    }
    scene.components.smooths[entity].previous = scene.components.positions[entity].value;
}

/// Semi-implicit Euler: velocity first, then position.
pub fn kinetic_update(scene: &mut Scene, entity: Entity, dt: f32) {
    if !scene.has_components(entity, TAG_POSITION | TAG_KINETIC) {
        return;
    }
    let kinetic = &mut scene.components.kinetics[entity];
    kinetic.velocity += kinetic.acceleration * dt;
    let velocity = kinetic.velocity;
    scene.components.positions[entity].value += velocity * dt;
}

/// Age the entity and schedule its removal once its lifetime is spent.
pub fn fleeting_update(scene: &mut Scene, entity: Entity, dt: f32) {
    if !scene.has_components(entity, TAG_FLEETING) {
        return;
    }
    let fleeting = &mut scene.components.fleetings[entity];
    fleeting.age += dt;
    if fleeting.age >= fleeting.lifetime {
        scene.defer_deallocate(entity);
    }
}

/// Advance a looping animation.
pub fn animation_update(scene: &mut Scene, entity: Entity, dt: f32) {
    if !scene.has_components(entity, TAG_ANIMATION) {
        return;
    }
    let animation = &mut scene.components.animations[entity];
    animation.frame_timer += dt;
    if animation.frame_timer >= animation.frame_duration {
        animation.frame_timer = 0.0;
        animation.frame = (animation.frame + 1) % animation.length.max(1);
    }
}
