//! Short-lived specks shed by the fog.

use ltl_ecs::prelude::*;

use super::placed;

pub fn fog_particle_builder(position: Vec2, velocity: Vec2, radius: f32, lifetime: f32) -> EntityBuilder {
    let size = radius * 2.0;

    placed(EntityKind::FogParticle, position, size, size)
        .with(CKinetic {
            velocity,
            acceleration: Vec2::ZERO,
        })
        .with(CSmooth { previous: position })
        .with(CFleeting { lifetime, age: 0.0 })
        .with_tags(TAG_FOG_PARTICLE)
}

/// Draw scale over a particle's life: 0 at birth and death, 1 halfway.
pub fn fog_particle_scale(fleeting: &CFleeting) -> f32 {
    if fleeting.lifetime <= 0.0 {
        return 0.0;
    }
    let progress = fleeting.age / fleeting.lifetime;
    -4.0 * (progress * progress - progress)
}
