//! Lethal spikes in four orientations.

use ltl_ecs::prelude::*;

use super::{placed, sprites};

/// Clockwise rotation of a spike tile. `Rotate0` points up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpikeRotation {
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

/// A spike occupying the 16x16 tile at (`x`, `y`). Only the thin strip of
/// points is solid.
pub fn spike_builder(x: f32, y: f32, rotation: SpikeRotation) -> EntityBuilder {
    let (intramural, sprite) = match rotation {
        SpikeRotation::Rotate0 => (Aabb::new(2.0, 13.0, 12.0, 3.0), sprites::SPIKE_0),
        SpikeRotation::Rotate90 => (Aabb::new(0.0, 2.0, 3.0, 12.0), sprites::SPIKE_90),
        SpikeRotation::Rotate180 => (Aabb::new(2.0, 0.0, 12.0, 3.0), sprites::SPIKE_180),
        SpikeRotation::Rotate270 => (Aabb::new(13.0, 2.0, 3.0, 12.0), sprites::SPIKE_270),
    };
    let position = Vec2::new(x, y) + intramural.position();

    placed(EntityKind::Spike, position, intramural.width, intramural.height)
        .with(CSprite {
            sprite,
            intramural,
            reflection: Reflection::None,
        })
        .with(CCollider {
            resolution_schema: RESOLVE_NONE,
            layer: LAYER_LETHAL,
            mask: LAYER_NONE,
            on_resolution: None,
            on_collision: None,
        })
        .with(CDamage { value: 1 })
}
