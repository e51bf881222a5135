//! The camera guide that drifts ahead through the stage.

use ltl_ecs::prelude::*;

use super::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

const LAKITU_SPEED: f32 = 100.0;

pub fn lakitu_builder() -> EntityBuilder {
    let position = Vec2::new(VIEWPORT_WIDTH * 0.5, VIEWPORT_HEIGHT * 0.5);

    EntityBuilder::new()
        .with(CIdentifier {
            kind: EntityKind::Lakitu,
        })
        .with(CPosition { value: position })
        .with(CKinetic {
            velocity: Vec2::new(LAKITU_SPEED, 0.0),
            acceleration: Vec2::ZERO,
        })
        .with(CSmooth { previous: position })
        .with_tags(TAG_LAKITU)
}
