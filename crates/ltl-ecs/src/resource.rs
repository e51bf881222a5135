//! Scene singletons.
//!
//! State that belongs to the scene as a whole rather than to one entity: the
//! score and its pending buffer, stage transition requests, the handles of
//! the few entities other systems need to find, and the fog's breathing
//! cycle.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Largest displayable score.
pub const MAX_SCORE: u32 = 999_999;

/// Ticks between two score drains.
pub const SCORE_DRAIN_TICKS: u32 = 2;

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// Score with a buffer that drains into it a little at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    value: u32,
    buffer: u32,
    drain_ticks: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points already counted.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Points waiting to be drained into the score.
    #[inline]
    pub fn buffer(&self) -> u32 {
        self.buffer
    }

    /// Queue `points` for draining.
    pub fn increment(&mut self, points: u32) {
        self.buffer = self.buffer.saturating_add(points).min(MAX_SCORE);
    }

    /// Advance the drain by one tick. Every [`SCORE_DRAIN_TICKS`] ticks a
    /// tenth of the buffer, rounded up, moves into the score.
    pub fn update(&mut self) {
        if self.buffer == 0 {
            return;
        }

        self.drain_ticks += 1;
        if self.drain_ticks < SCORE_DRAIN_TICKS {
            return;
        }

        let take = self.buffer.div_ceil(10);
        self.value = (self.value + take).min(MAX_SCORE);
        self.buffer -= take;
        self.drain_ticks = 0;
    }

    /// Zero-padded six digit rendering of the counted score.
    pub fn digits(&self) -> String {
        format!("{:06}", self.value)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// StageRequests
// ---------------------------------------------------------------------------

/// Stage transitions requested by gameplay during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageRequests {
    pub reset: bool,
    pub advance: bool,
}

impl StageRequests {
    /// Whether any transition is pending.
    pub fn any(&self) -> bool {
        self.reset || self.advance
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// SceneHandles
// ---------------------------------------------------------------------------

/// Well-known entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneHandles {
    pub player: Option<Entity>,
    pub fog: Option<Entity>,
    /// The kinetic camera guide.
    pub lakitu: Option<Entity>,
}

// ---------------------------------------------------------------------------
// FogState
// ---------------------------------------------------------------------------

/// Number of lumps along the fog's leading edge.
pub const FOG_LUMP_TOTAL: usize = 8;

/// Seconds per breathing phase.
pub const FOG_BREATHING_PHASE_DURATION: f32 = 4.0;

/// Seconds between fog particle spawn attempts.
pub const FOG_PARTICLE_SPAWN_DURATION: f32 = 0.025;

/// The fog's breathing cycle and particle spawn timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FogState {
    pub base_radius: f32,
    pub spawn_timer: f32,
    pub breathing_phase: u8,
    pub breathing_timer: f32,
    pub lump_radii: [f32; FOG_LUMP_TOTAL],
    pub lump_target_radii: [f32; FOG_LUMP_TOTAL],
}

impl FogState {
    /// A fresh cycle with every lump at `base_radius`.
    pub fn new(base_radius: f32) -> Self {
        Self {
            base_radius,
            spawn_timer: FOG_PARTICLE_SPAWN_DURATION,
            breathing_phase: 0,
            breathing_timer: 0.0,
            lump_radii: [base_radius; FOG_LUMP_TOTAL],
            lump_target_radii: [base_radius; FOG_LUMP_TOTAL],
        }
    }

    /// Advance the breathing timer by `dt`, shifting phase when it elapses.
    pub fn breathe(&mut self, dt: f32) {
        self.breathing_timer += dt;
        if self.breathing_timer >= FOG_BREATHING_PHASE_DURATION {
            self.shift_breathing_phase();
            self.breathing_timer = 0.0;
        }
    }

    /// Settle the current targets and pick the next phase's targets.
    ///
    /// Phases 0 and 2 alternate even and odd lumps between full and three
    /// quarter radius; phases 1 and 3 return every lump to full radius.
    pub fn shift_breathing_phase(&mut self) {
        let full = self.base_radius;
        let shrunk = self.base_radius * 0.75;

        for index in 0..FOG_LUMP_TOTAL {
            self.lump_radii[index] = self.lump_target_radii[index];
            let even = index % 2 == 0;
            self.lump_target_radii[index] = match self.breathing_phase {
                0 if !even => shrunk,
                2 if even => shrunk,
                _ => full,
            };
        }

        self.breathing_phase = (self.breathing_phase + 1) % 4;
    }

    /// Interpolated radius of lump `index` within the current phase.
    pub fn lump_radius(&self, index: usize) -> f32 {
        let step = self.breathing_timer / FOG_BREATHING_PHASE_DURATION;
        let from = self.lump_radii[index];
        let to = self.lump_target_radii[index];
        from + (to - from) * step
    }
}

impl Default for FogState {
    fn default() -> Self {
        Self::new(0.0)
    }
}
