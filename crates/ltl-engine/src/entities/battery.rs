//! Health pickups that bob in place.

use ltl_ecs::prelude::*;

use super::{placed, sprites};

/// Bobbing angular speed in radians per second.
const BOB_FREQUENCY: f32 = 3.0;

/// Peak bobbing speed.
const BOB_AMPLITUDE: f32 = 10.0;

/// Hit points a battery restores.
pub const BATTERY_HEAL: i16 = 1;

/// Points a battery is worth.
pub const BATTERY_SCORE: u32 = 100;

pub fn battery_builder(x: f32, y: f32) -> EntityBuilder {
    let intramural = Aabb::new(1.0, 0.0, 14.0, 32.0);
    let position = Vec2::new(x, y);

    placed(EntityKind::Battery, position, intramural.width, intramural.height)
        .with(CSprite {
            sprite: sprites::BATTERY,
            intramural,
            reflection: Reflection::None,
        })
        .with(CCollider {
            resolution_schema: RESOLVE_NONE,
            layer: LAYER_INTERACTABLE,
            mask: LAYER_NONE,
            on_resolution: None,
            on_collision: None,
        })
        .with(CSmooth { previous: position })
        .with(CKinetic::default())
        .with_tags(TAG_BATTERY)
}

/// Drive the bob from the scene clock.
pub fn battery_update(scene: &mut Scene, entity: Entity) {
    if !scene.has_components(entity, TAG_BATTERY | TAG_KINETIC) {
        return;
    }
    let elapsed = scene.elapsed;
    scene.components.kinetics[entity].velocity.y = (elapsed * BOB_FREQUENCY).sin() * BOB_AMPLITUDE;
}
