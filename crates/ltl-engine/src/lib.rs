//! LTL Engine -- deterministic platformer simulation on top of [`ltl_ecs`].
//!
//! This crate provides the swept collision resolver, the per-entity systems
//! and gameplay kinds, the input and replay collaborators, an interpolated
//! render pass against abstract draw traits, and the fixed-timestep
//! [`TickLoop`](tick::TickLoop) that ties them together.
//!
//! # Quick Start
//!
//! ```
//! use ltl_engine::prelude::*;
//!
//! let scene = Scene::new(SceneConfig { seed: 42, ..Default::default() });
//! let mut tick_loop = TickLoop::new(scene, TickConfig::default())
//!     .with_stage(Box::new(SegmentStage::new()))
//!     .unwrap();
//!
//! let mut input = StreamInput::default();
//! for _ in 0..120 {
//!     input.record(&[Binding::Right]);
//!     tick_loop.tick(&mut input);
//! }
//! assert_eq!(tick_loop.tick_count(), 120);
//!
//! // The same seed and inputs reproduce the same state.
//! let replay = input.into_replay(42).unwrap();
//! let scene = Scene::new(SceneConfig { seed: 42, ..Default::default() });
//! let mut again = TickLoop::new(scene, TickConfig::default())
//!     .with_stage(Box::new(SegmentStage::new()))
//!     .unwrap();
//! let report = play_replay(&mut again, &replay).unwrap();
//! assert_eq!(report.final_hash, tick_loop.state_hash());
//! ```

#![deny(unsafe_code)]

pub mod collision;
pub mod entities;
pub mod input;
pub mod render;
pub mod replay;
pub mod stage;
pub mod systems;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use ltl_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use ltl_ecs::prelude::*;

    pub use crate::collision::{advanced_collision, collision_update, post_collision_update};
    pub use crate::entities::{FIXED_DT, TILE_SIZE, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
    pub use crate::input::{Binding, Input, NullInput, StreamInput};
    pub use crate::render::{
        camera_bounds, render_scene, Canvas, CommandCanvas, DrawCommand, SpriteAtlas,
        SpriteRegion,
    };
    pub use crate::replay::{InputStream, Replay, ReplayError};
    pub use crate::stage::{SegmentStage, Stage};
    pub use crate::tick::{play_replay, PlaybackReport, TickConfig, TickDiagnostics, TickLoop};
}
