//! Component records, tag bits and collider callback types.
//!
//! Every component type is assigned exactly one bit of an entity's 64-bit tag
//! word. A component is valid for a slot iff its bit is set; otherwise the
//! column entry is stale data and must not be read. A handful of tags carry
//! no data at all and only mark an entity's kind (walkers, batteries, fog).
//!
//! The closed [`Component`] enum is the payload of deferred `SetComponent`
//! commands and of [`EntityBuilder`](crate::builder::EntityBuilder) lists.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::geometry::{Aabb, Vec2};
use crate::scene::Scene;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// An entity's component membership word.
pub type Tags = u64;

pub const TAG_NONE: Tags = 0;
pub const TAG_IDENTIFIER: Tags = 1 << 0;
pub const TAG_POSITION: Tags = 1 << 1;
pub const TAG_DIMENSION: Tags = 1 << 2;
pub const TAG_COLOR: Tags = 1 << 3;
pub const TAG_SPRITE: Tags = 1 << 4;
pub const TAG_ANIMATION: Tags = 1 << 5;
pub const TAG_KINETIC: Tags = 1 << 6;
pub const TAG_SMOOTH: Tags = 1 << 7;
pub const TAG_COLLIDER: Tags = 1 << 8;
pub const TAG_MORTAL: Tags = 1 << 9;
pub const TAG_DAMAGE: Tags = 1 << 10;
pub const TAG_FLEETING: Tags = 1 << 11;
pub const TAG_PLAYER: Tags = 1 << 12;
pub const TAG_WALKER: Tags = 1 << 13;
pub const TAG_BATTERY: Tags = 1 << 14;
pub const TAG_SOLAR_PANEL: Tags = 1 << 15;
pub const TAG_FOG: Tags = 1 << 16;
pub const TAG_FOG_PARTICLE: Tags = 1 << 17;
pub const TAG_CLOUD_PARTICLE: Tags = 1 << 18;
pub const TAG_LAKITU: Tags = 1 << 19;

// ---------------------------------------------------------------------------
// Resolution schema and layers
// ---------------------------------------------------------------------------

/// Directions a collider is willing to push other entities out of.
pub type ResolutionSchema = u8;

pub const RESOLVE_NONE: ResolutionSchema = 0;
pub const RESOLVE_UP: ResolutionSchema = 1 << 0;
pub const RESOLVE_RIGHT: ResolutionSchema = 1 << 1;
pub const RESOLVE_DOWN: ResolutionSchema = 1 << 2;
pub const RESOLVE_LEFT: ResolutionSchema = 1 << 3;
pub const RESOLVE_ALL: ResolutionSchema = RESOLVE_UP | RESOLVE_RIGHT | RESOLVE_DOWN | RESOLVE_LEFT;

/// Broad-phase layer bits: `layer` is what a collider is, `mask` what it
/// collides with.
pub type Layer = u64;

pub const LAYER_NONE: Layer = 0;
pub const LAYER_TERRAIN: Layer = 1 << 0;
pub const LAYER_LETHAL: Layer = 1 << 1;
pub const LAYER_INTERACTABLE: Layer = 1 << 2;
pub const LAYER_INVISIBLE: Layer = 1 << 3;
pub const LAYER_ALL: Layer = LAYER_TERRAIN | LAYER_LETHAL | LAYER_INTERACTABLE | LAYER_INVISIBLE;

// ---------------------------------------------------------------------------
// Small value types
// ---------------------------------------------------------------------------

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// How a sprite is mirrored when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reflection {
    #[default]
    None,
    ReverseX,
    ReverseY,
    ReverseXY,
}

/// Opaque atlas sprite identifier, resolved by the render collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpriteId(pub u16);

/// Opaque atlas animation identifier, resolved by the render collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AnimationId(pub u16);

/// The gameplay kind an entity was built as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntityKind {
    #[default]
    None,
    Battery,
    Block,
    CloudParticle,
    Fog,
    FogParticle,
    Lakitu,
    Player,
    SolarPanel,
    Spike,
    Walker,
}

/// Horizontal facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    None,
    Left,
    Right,
}

/// Phase of the player's lateral movement curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SprintState {
    #[default]
    None,
    Accelerating,
    Terminal,
    Decelerating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerAnimationState {
    #[default]
    Still,
    Running,
    Jumping,
    Spinning,
    Dying,
}

// ---------------------------------------------------------------------------
// Data components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CIdentifier {
    pub kind: EntityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CPosition {
    pub value: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CDimension {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CColor {
    pub value: Color,
}

/// A static atlas image. `intramural` is the hitbox's placement inside the
/// sprite's source rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CSprite {
    pub sprite: SpriteId,
    pub intramural: Aabb,
    pub reflection: Reflection,
}

/// A looping atlas animation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CAnimation {
    pub frame_timer: f32,
    pub frame_duration: f32,
    pub intramural: Aabb,
    pub reflection: Reflection,
    pub animation: AnimationId,
    pub frame: u16,
    pub length: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CKinetic {
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

/// Position at the start of the current tick, used only to interpolate
/// rendering and as the sweep origin for the collision resolver.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CSmooth {
    pub previous: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CMortal {
    pub hp: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CDamage {
    pub value: i16,
}

/// Remaining-lifetime tracker; the entity is removed once `age >= lifetime`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CFleeting {
    pub lifetime: f32,
    pub age: f32,
}

/// Player controller state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CPlayer {
    pub grounded_last_frame: bool,
    pub grounded: bool,
    pub coyote_timer: f32,
    pub coyote_duration: f32,
    pub jumping: bool,
    pub dead: bool,
    pub gravity_force: Vec2,
    pub invulnerable_timer: f32,
    pub invulnerable_duration: f32,
    pub initial_direction: Direction,
    pub sprint_direction: Direction,
    pub sprint_state: SprintState,
    pub sprint_timer: f32,
    pub sprint_duration: f32,
    pub sprint_force: Vec2,
    pub animation_state: PlayerAnimationState,
}

impl CPlayer {
    pub fn is_vulnerable(&self) -> bool {
        self.invulnerable_timer >= self.invulnerable_duration
    }

    /// The direction the player is visibly facing.
    pub fn facing(&self) -> Direction {
        if self.sprint_direction != Direction::None {
            return self.sprint_direction;
        }
        self.initial_direction
    }
}

// ---------------------------------------------------------------------------
// Collider and its callbacks
// ---------------------------------------------------------------------------

/// Outcome of an `on_resolution` callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Move the swept box to this position.
    Accepted(Aabb),
    /// Leave the swept box where it is.
    Rejected,
}

/// Arguments of an `on_resolution` callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionParams {
    pub entity: Entity,
    /// The entity's simulated box at the current sweep step.
    pub aabb: Aabb,
    pub other_entity: Entity,
    pub other_aabb: Aabb,
    pub overlap: Aabb,
    /// Single-axis push direction: each component is -1, 0 or 1.
    pub resolution: Vec2,
}

/// Arguments of an `on_collision` callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionParams {
    pub entity: Entity,
    /// The entity's final, resolved box for this tick.
    pub aabb: Aabb,
    pub other_entity: Entity,
    pub other_aabb: Aabb,
    pub overlap: Aabb,
}

/// Authoritative push-out policy for a resolving entity.
pub type OnResolution = fn(&mut Scene, &ResolutionParams) -> Resolution;

/// Informational overlap notification.
pub type OnCollision = fn(&mut Scene, &CollisionParams);

/// Collision participation for an entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct CCollider {
    /// Directions other entities are pushed out of this one.
    pub resolution_schema: ResolutionSchema,
    /// What this collider is.
    pub layer: Layer,
    /// What this collider collides with.
    pub mask: Layer,
    /// Consulted by the sweep; `None` means the entity is never pushed out.
    pub on_resolution: Option<OnResolution>,
    /// Fired by the post-collision pass; `None` ignores overlaps.
    pub on_collision: Option<OnCollision>,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Any data component, tagged by the bit it occupies.
#[derive(Debug, Clone, Copy)]
pub enum Component {
    Identifier(CIdentifier),
    Position(CPosition),
    Dimension(CDimension),
    Color(CColor),
    Sprite(CSprite),
    Animation(CAnimation),
    Kinetic(CKinetic),
    Smooth(CSmooth),
    Collider(CCollider),
    Mortal(CMortal),
    Damage(CDamage),
    Fleeting(CFleeting),
    Player(CPlayer),
}

impl Component {
    /// The tag bit this component occupies.
    pub fn tag(&self) -> Tags {
        match self {
            Component::Identifier(_) => TAG_IDENTIFIER,
            Component::Position(_) => TAG_POSITION,
            Component::Dimension(_) => TAG_DIMENSION,
            Component::Color(_) => TAG_COLOR,
            Component::Sprite(_) => TAG_SPRITE,
            Component::Animation(_) => TAG_ANIMATION,
            Component::Kinetic(_) => TAG_KINETIC,
            Component::Smooth(_) => TAG_SMOOTH,
            Component::Collider(_) => TAG_COLLIDER,
            Component::Mortal(_) => TAG_MORTAL,
            Component::Damage(_) => TAG_DAMAGE,
            Component::Fleeting(_) => TAG_FLEETING,
            Component::Player(_) => TAG_PLAYER,
        }
    }
}

macro_rules! impl_from_component {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$variant(value)
                }
            }
        )*
    };
}

impl_from_component! {
    CIdentifier => Identifier,
    CPosition => Position,
    CDimension => Dimension,
    CColor => Color,
    CSprite => Sprite,
    CAnimation => Animation,
    CKinetic => Kinetic,
    CSmooth => Smooth,
    CCollider => Collider,
    CMortal => Mortal,
    CDamage => Damage,
    CFleeting => Fleeting,
    CPlayer => Player,
}
