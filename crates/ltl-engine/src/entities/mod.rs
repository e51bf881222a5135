//! Gameplay entity kinds.
//!
//! Every kind has a `*_builder` function returning an [`EntityBuilder`] and,
//! where the kind has behaviour, per-entity systems and collider callbacks.
//! Builders only describe an entity; callers decide whether to add it now,
//! defer it, or park it in the arena behind a callback.

pub mod battery;
pub mod block;
pub mod cloud_particle;
pub mod fog;
pub mod fog_particle;
pub mod lakitu;
pub mod player;
pub mod solar_panel;
pub mod spike;
pub mod walker;

use ltl_ecs::prelude::*;

/// Seconds per simulation tick.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Logical viewport width in world units.
pub const VIEWPORT_WIDTH: f32 = 320.0;

/// Logical viewport height in world units.
pub const VIEWPORT_HEIGHT: f32 = 180.0;

/// Size of one level tile.
pub const TILE_SIZE: f32 = 16.0;

// ---------------------------------------------------------------------------
// Atlas identifiers
// ---------------------------------------------------------------------------

/// Sprite identifiers the gameplay code refers to. The render collaborator
/// maps them to atlas regions.
pub mod sprites {
    use ltl_ecs::component::SpriteId;

    pub const SPIKE_0: SpriteId = SpriteId(0);
    pub const SPIKE_90: SpriteId = SpriteId(1);
    pub const SPIKE_180: SpriteId = SpriteId(2);
    pub const SPIKE_270: SpriteId = SpriteId(3);
    pub const BATTERY: SpriteId = SpriteId(4);
    pub const SOLAR_PANEL: SpriteId = SpriteId(5);
    pub const SOLAR_PANEL_CHARGED: SpriteId = SpriteId(6);
}

/// A looping animation and its timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub id: AnimationId,
    pub length: u16,
    pub frame_duration: f32,
}

impl AnimationSpec {
    /// A fresh [`CAnimation`] playing this animation from its first frame.
    pub fn component(&self, intramural: Aabb) -> CAnimation {
        CAnimation {
            frame_timer: 0.0,
            frame_duration: self.frame_duration,
            intramural,
            reflection: Reflection::None,
            animation: self.id,
            frame: 0,
            length: self.length,
        }
    }
}

pub mod animations {
    use super::AnimationSpec;
    use ltl_ecs::component::AnimationId;

    pub const PLAYER_STILL: AnimationSpec = AnimationSpec {
        id: AnimationId(0),
        length: 1,
        frame_duration: 1.0,
    };

    pub const PLAYER_RUN: AnimationSpec = AnimationSpec {
        id: AnimationId(1),
        length: 4,
        frame_duration: 0.18,
    };

    pub const PLAYER_JUMP: AnimationSpec = AnimationSpec {
        id: AnimationId(2),
        length: 5,
        frame_duration: 0.075,
    };

    pub const PLAYER_SPIN: AnimationSpec = AnimationSpec {
        id: AnimationId(3),
        length: 13,
        frame_duration: 0.1,
    };

    pub const WALKER_IDLE: AnimationSpec = AnimationSpec {
        id: AnimationId(4),
        length: 4,
        frame_duration: 0.2,
    };
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Whether `entity` was built as `kind`.
pub fn is_kind(scene: &Scene, entity: Entity, kind: EntityKind) -> bool {
    scene.has_components(entity, TAG_IDENTIFIER) && scene.components.identifiers[entity].kind == kind
}

/// `on_resolution` that snaps flush against the obstacle.
pub fn resolve_perfectly(_scene: &mut Scene, params: &ResolutionParams) -> Resolution {
    Resolution::Accepted(crate::collision::apply_resolution_perfectly(
        params.aabb,
        params.other_aabb,
        params.resolution,
    ))
}

/// Identifier, position and dimension shared by almost every kind.
fn placed(kind: EntityKind, position: Vec2, width: f32, height: f32) -> EntityBuilder {
    EntityBuilder::new()
        .with(CIdentifier { kind })
        .with(CPosition { value: position })
        .with(CDimension { width, height })
}
