//! LTL ECS -- fixed-capacity entity/component store for a 2D platformer.
//!
//! Entities are dense slot indices into struct-of-arrays component columns.
//! Each slot carries a 64-bit tag word naming which components it has.
//! Structural changes made while systems sweep the table are recorded as
//! deferred commands and applied once per tick.
//!
//! # Quick Start
//!
//! ```
//! use ltl_ecs::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default());
//!
//! let builder = EntityBuilder::new()
//!     .with(CPosition { value: Vec2::new(0.0, 0.0) })
//!     .with(CKinetic { velocity: Vec2::new(60.0, 0.0), acceleration: Vec2::ZERO });
//! let entity = scene.defer_add_entity(&builder).unwrap();
//!
//! // Nothing is visible until the queue is applied.
//! assert!(!scene.has_components(entity, TAG_KINETIC));
//! let report = scene.apply_deferred();
//! assert_eq!(report.failed, 0);
//! assert!(scene.has_components(entity, TAG_POSITION | TAG_KINETIC));
//! ```

#![deny(unsafe_code)]

pub mod arena;
pub mod bit_mask;
pub mod builder;
pub mod command;
pub mod component;
pub mod deque;
pub mod entity;
pub mod geometry;
pub mod quadtree;
pub mod resource;
pub mod rng;
pub mod scene;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by the entity store.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// Every entity slot is in use.
    #[error("maximum amount of entities reached ({capacity})")]
    EntityCapacityExceeded { capacity: usize },

    /// The per-tick payload arena is full.
    #[error("deferred payload arena exhausted ({capacity} payloads)")]
    ArenaExhausted { capacity: usize },

    /// A command targeted a slot beyond the table.
    #[error("entity {entity} is outside a table of {capacity} slots")]
    EntityOutOfRange {
        entity: entity::Entity,
        capacity: usize,
    },

    /// A callback's payload was released before the callback ran.
    #[error("deferred payload was released before its callback ran")]
    StalePayload,
}

/// Convenience re-exports for the most commonly used types.
pub mod prelude {
    pub use crate::arena::{Arena, ArenaHandle};
    pub use crate::bit_mask::BitMask;
    pub use crate::builder::EntityBuilder;
    pub use crate::command::{ApplyReport, Command, CommandQueue, DeferredFn};
    pub use crate::component::*;
    pub use crate::deque::Deque;
    pub use crate::entity::{Entity, EntityAllocator};
    pub use crate::geometry::{Aabb, Vec2};
    pub use crate::quadtree::{Quadtree, Region};
    pub use crate::resource::{
        FogState, SceneHandles, Score, StageRequests, FOG_BREATHING_PHASE_DURATION,
        FOG_LUMP_TOTAL, FOG_PARTICLE_SPAWN_DURATION, MAX_SCORE, SCORE_DRAIN_TICKS,
    };
    pub use crate::rng::Rng;
    pub use crate::scene::{materialize, Column, Components, Scene, SceneConfig};
    pub use crate::EcsError;
}
