//! Stage population.
//!
//! A [`Stage`] fills a freshly cleared [`Scene`] with level geometry, pickups
//! and hazards, then adds the player, the fog and the camera guide. The tick
//! loop calls it at start-up and again whenever the scene requests a reset
//! or an advance.
//!
//! [`SegmentStage`] is the stock layout: a strip of viewport-wide segments
//! drawn from fixed templates. Every stage opens with a starter segment,
//! alternates three fillers with three battery segments, and closes on the
//! solar panel. Which templates are used, and in what order, comes from the
//! scene's random stream so a seed fully determines the level.

use anyhow::Context;
use ltl_ecs::prelude::*;
use tracing::debug;

use crate::entities::battery::battery_builder;
use crate::entities::block::block_builder;
use crate::entities::fog::{fog_builder, FOG_BASE_RADIUS};
use crate::entities::lakitu::lakitu_builder;
use crate::entities::player::player_builder;
use crate::entities::solar_panel::solar_panel_builder;
use crate::entities::spike::{spike_builder, SpikeRotation};
use crate::entities::walker::walker_builder;
use crate::entities::{TILE_SIZE, VIEWPORT_HEIGHT};

/// Populates a cleared scene.
pub trait Stage {
    /// Build stage number `index` into `scene`, which has just been cleared.
    /// Implementations must set `scene.bounds` and the scene handles.
    ///
    /// # Errors
    ///
    /// Fails if the scene runs out of entity slots.
    fn build(&mut self, scene: &mut Scene, index: u32) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Segment templates
// ---------------------------------------------------------------------------

/// One placement inside a segment, in tile units relative to the segment.
#[derive(Debug, Clone, Copy)]
enum Piece {
    Ground { x: u8, width: u8 },
    Platform { x: u8, y: u8, width: u8 },
    Wall { x: u8, y: u8, width: u8, height: u8 },
    Spike { x: u8, y: u8, rotation: SpikeRotation },
    Walker { x: u8, y: u8 },
    Battery { x: u8, y: u8 },
    SolarPanel { x: u8, y: u8 },
}

/// Width of every segment, in tiles.
const SEGMENT_TILES: u8 = 20;

/// Row of the ground surface.
const GROUND_ROW: u8 = 10;

/// Ground thickness in tiles. Deep enough to stand on without reaching the
/// bottom of the stage bounds.
const GROUND_DEPTH: u8 = 2;

static STARTERS: &[&[Piece]] = &[&[Piece::Ground { x: 0, width: 20 }]];

static FILLERS: &[&[Piece]] = &[
    &[
        Piece::Ground { x: 0, width: 8 },
        Piece::Platform { x: 7, y: 7, width: 6 },
        Piece::Ground { x: 12, width: 8 },
    ],
    &[
        Piece::Ground { x: 0, width: 20 },
        Piece::Walker { x: 9, y: 9 },
        Piece::Spike { x: 15, y: 9, rotation: SpikeRotation::Rotate0 },
    ],
    &[
        Piece::Ground { x: 0, width: 20 },
        Piece::Wall { x: 6, y: 8, width: 4, height: 2 },
        Piece::Spike { x: 10, y: 9, rotation: SpikeRotation::Rotate0 },
        Piece::Spike { x: 11, y: 9, rotation: SpikeRotation::Rotate0 },
        Piece::Walker { x: 14, y: 9 },
    ],
];

static BATTERIES: &[&[Piece]] = &[
    &[
        Piece::Ground { x: 0, width: 20 },
        Piece::Battery { x: 10, y: 7 },
    ],
    &[
        Piece::Ground { x: 0, width: 6 },
        Piece::Platform { x: 7, y: 6, width: 6 },
        Piece::Battery { x: 9, y: 4 },
        Piece::Ground { x: 14, width: 6 },
    ],
    &[
        Piece::Ground { x: 0, width: 20 },
        Piece::Wall { x: 8, y: 7, width: 4, height: 3 },
        Piece::Battery { x: 9, y: 5 },
        Piece::Walker { x: 15, y: 9 },
    ],
];

static SOLARS: &[&[Piece]] = &[&[
    Piece::Ground { x: 0, width: 20 },
    Piece::SolarPanel { x: 6, y: 7 },
]];

fn tiles(value: u8) -> f32 {
    f32::from(value) * TILE_SIZE
}

fn piece_builder(piece: Piece, offset_x: f32) -> EntityBuilder {
    match piece {
        Piece::Ground { x, width } => block_builder(
            Aabb::new(
                offset_x + tiles(x),
                tiles(GROUND_ROW),
                tiles(width),
                tiles(GROUND_DEPTH),
            ),
            RESOLVE_ALL,
            LAYER_TERRAIN,
        ),
        Piece::Platform { x, y, width } => block_builder(
            Aabb::new(offset_x + tiles(x), tiles(y), tiles(width), 4.0),
            RESOLVE_UP,
            LAYER_TERRAIN,
        ),
        Piece::Wall {
            x,
            y,
            width,
            height,
        } => block_builder(
            Aabb::new(offset_x + tiles(x), tiles(y), tiles(width), tiles(height)),
            RESOLVE_ALL,
            LAYER_TERRAIN,
        ),
        Piece::Spike { x, y, rotation } => spike_builder(offset_x + tiles(x), tiles(y), rotation),
        Piece::Walker { x, y } => walker_builder(offset_x + tiles(x), tiles(y)),
        Piece::Battery { x, y } => battery_builder(offset_x + tiles(x), tiles(y)),
        Piece::SolarPanel { x, y } => solar_panel_builder(offset_x + tiles(x), tiles(y)),
    }
}

/// Fisher-Yates over `0..length` driven by the scene's stream.
fn shuffled(rng: &mut Rng, length: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..length).collect();
    for i in (1..length).rev() {
        let j = rng.next_inclusive(0, i as i32) as usize;
        order.swap(i, j);
    }
    order
}

// ---------------------------------------------------------------------------
// SegmentStage
// ---------------------------------------------------------------------------

/// Number of filler and battery segments per stage.
const PAIRS_PER_STAGE: usize = 3;

/// Where the player drops in, above the first segment.
const PLAYER_SPAWN: Vec2 = Vec2::new(16.0, -64.0);

/// The stock procedurally assembled stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentStage;

impl SegmentStage {
    pub fn new() -> Self {
        Self
    }

    fn layout(rng: &mut Rng) -> Vec<&'static [Piece]> {
        let fillers = shuffled(rng, FILLERS.len());
        let batteries = shuffled(rng, BATTERIES.len());
        let starter = rng.next_range(0, STARTERS.len() as i32) as usize;

        let mut segments = Vec::with_capacity(2 + PAIRS_PER_STAGE * 2);
        segments.push(STARTERS[starter]);
        for pair in 0..PAIRS_PER_STAGE {
            segments.push(FILLERS[fillers[pair % fillers.len()]]);
            segments.push(BATTERIES[batteries[pair % batteries.len()]]);
        }
        let solar = rng.next_range(0, SOLARS.len() as i32) as usize;
        segments.push(SOLARS[solar]);
        segments
    }
}

impl Stage for SegmentStage {
    fn build(&mut self, scene: &mut Scene, index: u32) -> anyhow::Result<()> {
        let segments = Self::layout(scene.rng());
        let segment_width = tiles(SEGMENT_TILES);

        let mut offset_x = 0.0;
        for pieces in &segments {
            for piece in pieces.iter() {
                scene
                    .defer_add_entity(&piece_builder(*piece, offset_x))
                    .with_context(|| format!("populating stage {index}"))?;
            }
            offset_x += segment_width;
        }

        scene.bounds = Aabb::new(0.0, 0.0, offset_x, VIEWPORT_HEIGHT);

        // Run-off past the last segment so the player never visibly drops out.
        scene
            .defer_add_entity(&block_builder(
                Aabb::new(offset_x, tiles(GROUND_ROW), tiles(5), tiles(6)),
                RESOLVE_ALL,
                LAYER_TERRAIN,
            ))
            .context("adding stage run-off")?;

        let player = scene
            .defer_add_entity(&player_builder(PLAYER_SPAWN.x, PLAYER_SPAWN.y))
            .context("adding player")?;
        let fog = scene.defer_add_entity(&fog_builder()).context("adding fog")?;
        let lakitu = scene
            .defer_add_entity(&lakitu_builder())
            .context("adding camera guide")?;

        scene.handles.player = Some(player);
        scene.handles.fog = Some(fog);
        scene.handles.lakitu = Some(lakitu);
        scene.fog = FogState::new(FOG_BASE_RADIUS);

        debug!(
            stage = index,
            segments = segments.len(),
            width = offset_x,
            entities = scene.entity_count(),
            "stage built"
        );
        Ok(())
    }
}
