//! Fixed-timestep tick loop for deterministic simulation.
//!
//! The [`TickLoop`] drives a [`Scene`] forward. Each tick:
//!
//! 1. Every slot below the scene's high-water mark is swept once. For each
//!    entity the systems run in a fixed order: fleeting, smoothing, player
//!    input, kinetic, collision, post-collision, player post-collision,
//!    player mortal, fog, battery, animation, player animation.
//! 2. The score drains and the fog end-condition is checked.
//! 3. The deferred command queue is applied (FIFO, deterministic).
//! 4. The simulated clock and tick counter advance.
//! 5. Pending stage requests rebuild the scene through the [`Stage`].
//!
//! System order is fixed, structural changes are deferred, and every random
//! draw comes from the scene's seeded stream, so the same seed, stage and
//! inputs produce the same [`TickLoop::state_hash`] after every tick.
//!
//! # Example
//!
//! ```
//! use ltl_engine::input::NullInput;
//! use ltl_engine::stage::SegmentStage;
//! use ltl_engine::tick::{TickConfig, TickLoop};
//! use ltl_ecs::prelude::*;
//!
//! let scene = Scene::new(SceneConfig { seed: 9, ..Default::default() });
//! let mut tick_loop = TickLoop::new(scene, TickConfig::default())
//!     .with_stage(Box::new(SegmentStage::new()))
//!     .unwrap();
//!
//! let mut input = NullInput;
//! for _ in 0..10 {
//!     tick_loop.tick(&mut input);
//! }
//!
//! assert_eq!(tick_loop.tick_count(), 10);
//! ```

use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use ltl_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collision::{collision_update, post_collision_update};
use crate::entities::battery::battery_update;
use crate::entities::fog::fog_update;
use crate::entities::player::{
    player_animation_update, player_input_update, player_mortal_update,
    player_post_collision_update,
};
use crate::entities::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::input::{Input, StreamInput};
use crate::replay::Replay;
use crate::stage::Stage;
use crate::systems::{animation_update, fleeting_update, kinetic_update, smooth_update};

/// Highest stage index an advance can reach.
pub const MAX_STAGE: u32 = 64;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-timestep tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Fixed time step in seconds per tick. Must be positive and finite.
    pub fixed_dt: f32,
    /// Most ticks a single [`TickLoop::advance`] call may run.
    pub max_frame_skip: u32,
    /// Size of the visible window in world units.
    pub viewport: Vec2,
}

impl Default for TickConfig {
    /// 60 Hz, at most 25 catch-up ticks, 320x180 viewport.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_frame_skip: 25,
            viewport: Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
        }
    }
}

impl TickConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed JSON or mistyped fields.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing and command counts for the last tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickDiagnostics {
    /// Total time for the tick, stage rebuilds included.
    pub total_time: Duration,
    /// Time spent applying deferred commands.
    pub command_apply_time: Duration,
    /// Outcome of the tick's command application.
    pub commands: ApplyReport,
    /// Whether the tick ended by rebuilding the stage.
    pub rebuilt: bool,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// The deterministic fixed-timestep tick loop.
pub struct TickLoop {
    scene: Scene,
    config: TickConfig,
    stage: Option<Box<dyn Stage>>,
    stage_index: u32,
    accumulator: f32,
    alpha: f32,
    tick_counter: u64,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// Wrap `scene` in a loop. The scene is used as-is until a stage is
    /// attached with [`TickLoop::with_stage`].
    ///
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite.
    pub fn new(scene: Scene, config: TickConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        Self {
            scene,
            config,
            stage: None,
            stage_index: 0,
            accumulator: 0.0,
            alpha: 0.0,
            tick_counter: 0,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Attach a stage and build stage 0 into a cleared scene.
    ///
    /// # Errors
    ///
    /// Fails if the stage cannot be populated.
    pub fn with_stage(mut self, stage: Box<dyn Stage>) -> anyhow::Result<Self> {
        self.stage = Some(stage);
        self.stage_index = 0;
        self.rebuild(None).context("building the first stage")?;
        Ok(self)
    }

    // -- Stepping --

    /// Run one fixed step.
    pub fn tick(&mut self, input: &mut dyn Input) {
        let tick_start = Instant::now();
        let dt = self.config.fixed_dt;

        let count = self.scene.entity_count();
        for index in 0..count {
            let entity = Entity::new(index as u32);
            let scene = &mut self.scene;
            fleeting_update(scene, entity, dt);
            smooth_update(scene, entity);
            player_input_update(scene, entity, input, dt);
            kinetic_update(scene, entity, dt);
            collision_update(scene, entity);
            post_collision_update(scene, entity);
            player_post_collision_update(scene, entity);
            player_mortal_update(scene, entity, dt);
            fog_update(scene, entity);
            battery_update(scene, entity);
            animation_update(scene, entity, dt);
            player_animation_update(scene, entity);
        }

        self.scene.score.update();
        self.check_fog_overtake();

        let apply_start = Instant::now();
        let commands = self.scene.apply_deferred();
        let command_apply_time = apply_start.elapsed();

        self.scene.elapsed += dt;
        self.tick_counter += 1;

        let rebuilt = self.handle_requests();

        self.last_diagnostics = TickDiagnostics {
            total_time: tick_start.elapsed(),
            command_apply_time,
            commands,
            rebuilt,
        };
    }

    /// Feed `frame_seconds` of wall time into the accumulator and run every
    /// whole tick it covers. Returns the number of ticks run.
    ///
    /// Frame time is clamped to `max_frame_skip` ticks so a stall never
    /// turns into a long catch-up burst.
    pub fn advance(&mut self, frame_seconds: f32, input: &mut dyn Input) -> u32 {
        let dt = self.config.fixed_dt;
        let ceiling = self.config.max_frame_skip as f32 * dt;
        let frame_seconds = if frame_seconds.is_finite() {
            frame_seconds.clamp(0.0, ceiling)
        } else {
            0.0
        };

        self.accumulator += frame_seconds;
        let mut ticks = 0;
        while self.accumulator >= dt && ticks < self.config.max_frame_skip {
            self.tick(input);
            self.accumulator -= dt;
            ticks += 1;
        }
        self.accumulator = self.accumulator.min(dt);
        self.alpha = (self.accumulator / dt).clamp(0.0, 1.0);
        ticks
    }

    // -- End of tick --

    /// The fog winning the race ends the run.
    fn check_fog_overtake(&mut self) {
        let (Some(fog), Some(player)) = (self.scene.handles.fog, self.scene.handles.player) else {
            return;
        };
        if !self.scene.has_components(fog, TAG_POSITION)
            || !self.scene.has_components(player, TAG_POSITION)
        {
            return;
        }

        let lead = self.scene.components.positions[fog].value.x
            - self.scene.components.positions[player].value.x;
        if lead > VIEWPORT_WIDTH * 0.5 {
            self.scene.requests.reset = true;
        }
    }

    /// A reset takes priority over an advance requested in the same tick.
    fn handle_requests(&mut self) -> bool {
        let requests = self.scene.requests;
        if !requests.any() {
            return false;
        }
        if self.stage.is_none() {
            warn!(
                reset = requests.reset,
                advance = requests.advance,
                "stage request without a stage; ignoring"
            );
            self.scene.requests.clear();
            return false;
        }

        let result = if requests.reset {
            debug!(stage = self.stage_index, tick = self.tick_counter, "resetting stage");
            self.scene.score.reset();
            self.rebuild(None)
        } else {
            let preserved = self.player_mortal();
            self.stage_index = (self.stage_index + 1).min(MAX_STAGE);
            debug!(stage = self.stage_index, tick = self.tick_counter, "advancing stage");
            self.rebuild(preserved)
        };

        if let Err(error) = result {
            warn!(stage = self.stage_index, error = ?error, "stage rebuild failed");
        }
        true
    }

    fn player_mortal(&self) -> Option<CMortal> {
        self.scene
            .handles
            .player
            .filter(|&player| self.scene.has_components(player, TAG_MORTAL))
            .map(|player| self.scene.components.mortals[player])
    }

    fn rebuild(&mut self, mortal: Option<CMortal>) -> anyhow::Result<()> {
        let Some(stage) = self.stage.as_mut() else {
            bail!("no stage attached");
        };

        self.scene.clear();
        stage.build(&mut self.scene, self.stage_index)?;
        let report = self.scene.apply_deferred();
        if report.failed > 0 {
            warn!(failed = report.failed, "stage population left failed commands");
        }

        if let Some(mortal) = mortal {
            if let Some(player) = self.scene.handles.player {
                self.scene.components.mortals[player] = mortal;
            }
        }
        Ok(())
    }

    // -- Accessors --

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[inline]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    #[inline]
    pub fn stage_index(&self) -> u32 {
        self.stage_index
    }

    #[inline]
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    /// BLAKE3 digest of the simulation state. See [`Scene::state_hash`].
    pub fn state_hash(&self) -> String {
        self.scene.state_hash()
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

/// Outcome of [`play_replay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackReport {
    /// Ticks run, one per recorded frame.
    pub ticks: u64,
    /// State hash after the last tick.
    pub final_hash: String,
}

/// Drive `tick_loop` with every frame of `replay`.
///
/// The loop must be fresh and seeded with the replay's seed; both are checked
/// before anything runs, so on error the loop is untouched.
///
/// # Errors
///
/// Fails if the seeds differ, the loop has already ticked, or the replay
/// carries bindings this engine does not know.
pub fn play_replay(tick_loop: &mut TickLoop, replay: &Replay) -> anyhow::Result<PlaybackReport> {
    let seed = tick_loop.scene().config().seed;
    if seed != u64::from(replay.seed()) {
        bail!(
            "replay was recorded with seed {} but the scene is seeded with {seed}",
            replay.seed()
        );
    }
    if tick_loop.tick_count() != 0 {
        bail!(
            "replay must start from a fresh loop, this one is at tick {}",
            tick_loop.tick_count()
        );
    }

    let mut input = StreamInput::from_replay(replay).with_context(|| {
        format!(
            "replay with {} bindings and {} frames does not fit this engine",
            replay.total_bindings(),
            replay.len()
        )
    })?;

    let mut ticks = 0;
    while input.has_frame() {
        tick_loop.tick(&mut input);
        input.step();
        ticks += 1;
    }

    debug!(ticks, seed, "replay finished");
    Ok(PlaybackReport {
        ticks,
        final_hash: tick_loop.state_hash(),
    })
}
