//! The wall of fog that chases the player through a stage.
//!
//! The fog waits at the left edge until the player has travelled one
//! viewport width, then advances at a constant speed for the rest of the
//! stage. While moving it bobs vertically, sheds particles from its leading
//! edge, and cycles its lumps through the breathing phases tracked in the
//! scene's [`FogState`].

use ltl_ecs::prelude::*;
use tracing::warn;

use super::fog_particle::fog_particle_builder;
use super::{FIXED_DT, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Height of the fog body.
pub const FOG_HEIGHT: f32 = VIEWPORT_HEIGHT * 2.0;

/// Resting radius of each lump.
pub const FOG_BASE_RADIUS: f32 = FOG_HEIGHT / FOG_LUMP_TOTAL as f32 * 0.75;

/// Vertical distance between lump centers.
pub const FOG_LUMP_SPACING: f32 = FOG_HEIGHT / FOG_LUMP_TOTAL as f32;

const FOG_SPEED: f32 = 25.0;

pub fn fog_initial_position() -> Vec2 {
    Vec2::new(-VIEWPORT_WIDTH, -(FOG_HEIGHT - VIEWPORT_HEIGHT) * 0.5)
}

pub fn fog_builder() -> EntityBuilder {
    let position = fog_initial_position();

    EntityBuilder::new()
        .with(CIdentifier {
            kind: EntityKind::Fog,
        })
        .with(CPosition { value: position })
        .with(CColor {
            value: Color::BLACK,
        })
        .with(CKinetic::default())
        .with(CSmooth { previous: position })
        .with_tags(TAG_FOG)
}

/// Start, steer and animate the fog.
pub fn fog_update(scene: &mut Scene, entity: Entity) {
    if !scene.has_components(entity, TAG_FOG | TAG_POSITION | TAG_KINETIC) {
        return;
    }

    let player_x = scene
        .handles
        .player
        .filter(|&player| scene.has_components(player, TAG_POSITION))
        .map(|player| scene.components.positions[player].value.x);

    let has_not_moved = scene.components.kinetics[entity].velocity.x == 0.0;
    if has_not_moved && player_x.map_or(true, |x| x < VIEWPORT_WIDTH) {
        return;
    }

    let elapsed = scene.elapsed;
    scene.components.kinetics[entity].velocity = Vec2::new(FOG_SPEED, (elapsed * 0.5).cos() * 8.0);

    scene.fog.spawn_timer += FIXED_DT;
    if scene.fog.spawn_timer >= FOG_PARTICLE_SPAWN_DURATION {
        if scene.rng().next_inclusive(0, 9) != 0 {
            spawn_fog_particle(scene, entity);
        }
        scene.fog.spawn_timer = 0.0;
    }

    scene.fog.breathe(FIXED_DT);
}

fn spawn_fog_particle(scene: &mut Scene, fog: Entity) {
    let origin = scene.components.positions[fog].value;
    let fog_velocity = scene.components.kinetics[fog].velocity;
    let base_radius = scene.fog.base_radius;

    let rng = scene.rng();
    let offset_y = rng.next_inclusive(0, (FOG_HEIGHT * 0.5) as i32) as f32;
    let position = Vec2::new(
        origin.x + base_radius * 0.5,
        origin.y + FOG_HEIGHT * 0.25 + offset_y,
    );
    let velocity = Vec2::new(
        fog_velocity.x + rng.next_inclusive(30, 50) as f32,
        rng.next_inclusive(-3, 3) as f32,
    );
    let radius = rng.next_inclusive(3, 5) as f32;
    let lifetime = 0.1 * rng.next_inclusive(5, 8) as f32;

    let builder = fog_particle_builder(position, velocity, radius, lifetime);
    if let Err(error) = scene.defer_add_entity(&builder) {
        warn!(error = %error, "dropped fog particle");
    }
}
