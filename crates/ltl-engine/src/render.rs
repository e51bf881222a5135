//! Interpolated scene drawing through collaborator traits.
//!
//! The simulation never touches a graphics API. [`render_scene`] walks the
//! live entities and issues draw primitives to a [`Canvas`], looking sprites
//! up through a [`SpriteAtlas`]. Positions are interpolated between the last
//! two ticks with the loop's alpha, so rendering may run at any rate.
//!
//! [`CommandCanvas`] records primitives as plain [`DrawCommand`]s. It backs
//! headless verification and is what a real backend can replay.
//!
//! ```
//! use ltl_engine::render::{render_scene, CommandCanvas, DrawCommand, SpriteAtlas, SpriteRegion};
//! use ltl_ecs::prelude::*;
//!
//! struct NoSprites;
//! impl SpriteAtlas for NoSprites {
//!     fn sprite_region(&self, _: SpriteId) -> Option<SpriteRegion> { None }
//!     fn animation_frame(&self, _: AnimationId, _: u16) -> Option<SpriteRegion> { None }
//! }
//!
//! let mut scene = Scene::default();
//! scene.add_entity(
//!     &EntityBuilder::new()
//!         .with(CPosition { value: Vec2::new(4.0, 8.0) })
//!         .with(CDimension { width: 2.0, height: 2.0 })
//!         .with(CColor { value: Color::WHITE }),
//! ).unwrap();
//!
//! let mut canvas = CommandCanvas::default();
//! render_scene(&scene, 1.0, &NoSprites, &mut canvas);
//! assert!(matches!(canvas.commands()[0], DrawCommand::Rectangle { .. }));
//! ```

use std::f32::consts::TAU;

use ltl_ecs::prelude::*;
use tracing::warn;

use crate::entities::fog::{FOG_HEIGHT, FOG_LUMP_SPACING};
use crate::entities::fog_particle::fog_particle_scale;
use crate::entities::VIEWPORT_WIDTH;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Where a sprite lives in the atlas and how it sits on its entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpriteRegion {
    /// Texel rectangle inside the atlas.
    pub source: Aabb,
    /// Draw rectangle relative to the sprite's top-left corner.
    pub destination: Aabb,
}

/// Read-only sprite lookup.
pub trait SpriteAtlas {
    fn sprite_region(&self, sprite: SpriteId) -> Option<SpriteRegion>;

    /// Region of frame `frame` of `animation`.
    fn animation_frame(&self, animation: AnimationId, frame: u16) -> Option<SpriteRegion>;
}

/// World-space draw primitives. Positions arrive already interpolated.
pub trait Canvas {
    fn rectangle(&mut self, aabb: Aabb, color: Color);

    fn sprite(&mut self, source: Aabb, destination: Aabb, reflection: Reflection);

    fn circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// A regular polygon. `rotation` is in degrees.
    fn polygon(&mut self, center: Vec2, sides: u32, radius: f32, rotation: f32, color: Color);
}

// ---------------------------------------------------------------------------
// DrawCommand / CommandCanvas
// ---------------------------------------------------------------------------

/// One recorded primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Rectangle {
        aabb: Aabb,
        color: Color,
    },
    Sprite {
        source: Aabb,
        destination: Aabb,
        reflection: Reflection,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Polygon {
        center: Vec2,
        sides: u32,
        radius: f32,
        rotation: f32,
        color: Color,
    },
}

/// A [`Canvas`] that records every call in order.
#[derive(Debug, Clone, Default)]
pub struct CommandCanvas {
    commands: Vec<DrawCommand>,
}

impl CommandCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for CommandCanvas {
    fn rectangle(&mut self, aabb: Aabb, color: Color) {
        self.commands.push(DrawCommand::Rectangle { aabb, color });
    }

    fn sprite(&mut self, source: Aabb, destination: Aabb, reflection: Reflection) {
        self.commands.push(DrawCommand::Sprite {
            source,
            destination,
            reflection,
        });
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn polygon(&mut self, center: Vec2, sides: u32, radius: f32, rotation: f32, color: Color) {
        self.commands.push(DrawCommand::Polygon {
            center,
            sides,
            radius,
            rotation,
            color,
        });
    }
}

// ---------------------------------------------------------------------------
// Render pass
// ---------------------------------------------------------------------------

/// Degrees per second a fog particle spins.
const FOG_PARTICLE_SPIN: f32 = 100.0;

/// Position of `entity` between the previous and current tick.
pub fn interpolated_position(scene: &Scene, entity: Entity, alpha: f32) -> Vec2 {
    let current = scene.components.positions[entity].value;
    if scene.has_components(entity, TAG_SMOOTH) {
        scene.components.smooths[entity].previous.lerp(current, alpha)
    } else {
        current
    }
}

fn dimension(scene: &Scene, entity: Entity) -> (f32, f32) {
    if scene.has_components(entity, TAG_DIMENSION) {
        let dimension = scene.components.dimensions[entity];
        (dimension.width, dimension.height)
    } else {
        (0.0, 0.0)
    }
}

/// Draw every live entity in slot order.
pub fn render_scene(scene: &Scene, alpha: f32, atlas: &dyn SpriteAtlas, canvas: &mut dyn Canvas) {
    for index in 0..scene.entity_count() {
        let entity = Entity::new(index as u32);
        if !scene.has_components(entity, TAG_POSITION) {
            continue;
        }
        let position = interpolated_position(scene, entity, alpha);

        if scene.has_components(entity, TAG_FOG) {
            draw_fog(scene, position, canvas);
            continue;
        }
        if scene.has_components(entity, TAG_CLOUD_PARTICLE | TAG_FLEETING) {
            draw_cloud_particle(scene, entity, position, canvas);
            continue;
        }
        if scene.has_components(entity, TAG_FOG_PARTICLE | TAG_FLEETING) {
            draw_fog_particle(scene, entity, position, canvas);
            continue;
        }

        if scene.has_components(entity, TAG_COLOR | TAG_DIMENSION) {
            let (width, height) = dimension(scene, entity);
            canvas.rectangle(
                Aabb::from_position(position, width, height),
                scene.components.colors[entity].value,
            );
        }

        if scene.has_components(entity, TAG_SPRITE) {
            let sprite = scene.components.sprites[entity];
            match atlas.sprite_region(sprite.sprite) {
                Some(region) => draw_region(canvas, position, sprite.intramural, region, sprite.reflection),
                None => warn!(entity = %entity, sprite = sprite.sprite.0, "sprite missing from atlas"),
            }
        }

        if scene.has_components(entity, TAG_ANIMATION) {
            let animation = scene.components.animations[entity];
            match atlas.animation_frame(animation.animation, animation.frame) {
                Some(region) => draw_region(
                    canvas,
                    position,
                    animation.intramural,
                    region,
                    animation.reflection,
                ),
                None => warn!(
                    entity = %entity,
                    animation = animation.animation.0,
                    frame = animation.frame,
                    "animation frame missing from atlas"
                ),
            }
        }
    }
}

/// The collider box sits at `intramural` inside the sprite, so the sprite's
/// corner is the entity position minus that offset.
fn draw_region(
    canvas: &mut dyn Canvas,
    position: Vec2,
    intramural: Aabb,
    region: SpriteRegion,
    reflection: Reflection,
) {
    let origin = position - intramural.position();
    let destination = Aabb::new(
        origin.x + region.destination.x,
        origin.y + region.destination.y,
        region.destination.width,
        region.destination.height,
    );
    canvas.sprite(region.source, destination, reflection);
}

fn draw_fog(scene: &Scene, position: Vec2, canvas: &mut dyn Canvas) {
    let backdrop_width = VIEWPORT_WIDTH * 2.0;
    canvas.rectangle(
        Aabb::new(position.x - backdrop_width, position.y, backdrop_width, FOG_HEIGHT),
        Color::BLACK,
    );

    // White outline first, then the body on top.
    for (color, scale) in [(Color::WHITE, 1.1), (Color::BLACK, 1.0)] {
        for index in 0..FOG_LUMP_TOTAL {
            let phase = index as f32 / FOG_LUMP_TOTAL as f32 * TAU + scene.elapsed * 2.0;
            let center = Vec2::new(
                position.x + phase.cos() * 10.0,
                position.y + FOG_LUMP_SPACING * index as f32,
            );
            canvas.circle(center, scene.fog.lump_radius(index) * scale, color);
        }
    }
}

fn draw_cloud_particle(scene: &Scene, entity: Entity, position: Vec2, canvas: &mut dyn Canvas) {
    let (width, height) = dimension(scene, entity);
    let fleeting = scene.components.fleetings[entity];
    let remaining = if fleeting.lifetime > 0.0 {
        ((fleeting.lifetime - fleeting.age) / fleeting.lifetime).max(0.0)
    } else {
        0.0
    };
    let center = position + Vec2::new(width * 0.5, height * 0.5);
    canvas.polygon(center, 6, width * remaining * 0.5, 0.0, Color::WHITE);
}

fn draw_fog_particle(scene: &Scene, entity: Entity, position: Vec2, canvas: &mut dyn Canvas) {
    let (width, height) = dimension(scene, entity);
    let scale = fog_particle_scale(&scene.components.fleetings[entity]);
    let sides = 4 + entity.to_raw() % 3;
    let mut rotation = scene.elapsed * FOG_PARTICLE_SPIN;
    if entity.to_raw() % 2 == 0 {
        rotation = -rotation;
    }
    let center = position + Vec2::new(width * 0.5, height * 0.5);
    canvas.polygon(center, sides, width * scale * 0.5, rotation, Color::BLACK);
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Viewport rectangle centered on `target` and kept inside the scene bounds.
///
/// When the bounds are narrower than the viewport the camera pins to the
/// left or top edge.
pub fn camera_bounds(scene: &Scene, target: Entity, alpha: f32, viewport: Vec2) -> Aabb {
    let half = viewport * 0.5;
    let center = if scene.has_components(target, TAG_POSITION) {
        let (width, height) = dimension(scene, target);
        interpolated_position(scene, target, alpha) + Vec2::new(width * 0.5, height * 0.5)
    } else {
        half
    };

    let bounds = scene.bounds;
    let x = center
        .x
        .min(bounds.right() - half.x)
        .max(bounds.left() + half.x);
    let y = center
        .y
        .min(bounds.bottom() - half.y)
        .max(bounds.top() + half.y);

    Aabb::new(x - half.x, y - half.y, viewport.x, viewport.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::battery::battery_builder;
    use crate::entities::fog::fog_builder;
    use crate::entities::fog_particle::fog_particle_builder;
    use crate::entities::sprites;

    struct Atlas;

    impl SpriteAtlas for Atlas {
        fn sprite_region(&self, sprite: SpriteId) -> Option<SpriteRegion> {
            (sprite == sprites::BATTERY).then(|| SpriteRegion {
                source: Aabb::new(0.0, 0.0, 16.0, 32.0),
                destination: Aabb::new(0.0, 0.0, 16.0, 32.0),
            })
        }

        fn animation_frame(&self, _: AnimationId, _: u16) -> Option<SpriteRegion> {
            None
        }
    }

    // -- 1. Interpolation --

    #[test]
    fn sprite_is_drawn_between_ticks() {
        let mut scene = Scene::default();
        let battery = scene.add_entity(&battery_builder(10.0, 0.0)).unwrap();
        scene.components.smooths[battery].previous = Vec2::new(0.0, 0.0);

        let mut canvas = CommandCanvas::new();
        render_scene(&scene, 0.5, &Atlas, &mut canvas);

        // Intramural x of 1 shifts the sprite left of the collider.
        assert_eq!(
            canvas.commands(),
            &[DrawCommand::Sprite {
                source: Aabb::new(0.0, 0.0, 16.0, 32.0),
                destination: Aabb::new(4.0, 0.0, 16.0, 32.0),
                reflection: Reflection::None,
            }]
        );
    }

    // -- 2. Missing data --

    #[test]
    fn missing_sprite_is_skipped() {
        let mut scene = Scene::default();
        scene
            .add_entity(&crate::entities::solar_panel::solar_panel_builder(0.0, 0.0))
            .unwrap();
        let mut canvas = CommandCanvas::new();
        render_scene(&scene, 1.0, &Atlas, &mut canvas);
        assert!(canvas.commands().is_empty());
    }

    // -- 3. Procedural shapes --

    #[test]
    fn fog_draws_backdrop_and_two_lump_layers() {
        let mut scene = Scene::default();
        scene.add_entity(&fog_builder()).unwrap();
        scene.fog = FogState::new(10.0);

        let mut canvas = CommandCanvas::new();
        render_scene(&scene, 1.0, &Atlas, &mut canvas);

        let commands = canvas.commands();
        assert_eq!(commands.len(), 1 + FOG_LUMP_TOTAL * 2);
        assert!(matches!(commands[0], DrawCommand::Rectangle { color: Color::BLACK, .. }));
        let outline = match commands[1] {
            DrawCommand::Circle { radius, color, .. } => {
                assert_eq!(color, Color::WHITE);
                radius
            }
            other => panic!("expected a circle, got {other:?}"),
        };
        match commands[1 + FOG_LUMP_TOTAL] {
            DrawCommand::Circle { radius, color, .. } => {
                assert_eq!(color, Color::BLACK);
                assert!(radius < outline);
            }
            other => panic!("expected a circle, got {other:?}"),
        }
    }

    #[test]
    fn fog_particle_sides_follow_slot() {
        let mut scene = Scene::default();
        scene.add_entity(&EntityBuilder::new()).unwrap();
        let particle = fog_particle_builder(Vec2::ZERO, Vec2::ZERO, 4.0, 1.0);
        let entity = scene.add_entity(&particle).unwrap();
        scene.components.fleetings[entity].age = 0.5;
        scene.elapsed = 1.0;

        let mut canvas = CommandCanvas::new();
        render_scene(&scene, 1.0, &Atlas, &mut canvas);
        assert_eq!(
            canvas.commands(),
            &[DrawCommand::Polygon {
                center: Vec2::new(4.0, 4.0),
                sides: 5,
                radius: 4.0,
                rotation: 100.0,
                color: Color::BLACK,
            }]
        );
    }

    // -- 4. Camera --

    #[test]
    fn camera_clamps_to_bounds() {
        let mut scene = Scene::default();
        scene.bounds = Aabb::new(0.0, 0.0, 1000.0, 180.0);
        let target = scene
            .add_entity(&EntityBuilder::new().with(CPosition {
                value: Vec2::new(20.0, 50.0),
            }))
            .unwrap();
        let viewport = Vec2::new(320.0, 180.0);

        assert_eq!(
            camera_bounds(&scene, target, 1.0, viewport),
            Aabb::new(0.0, 0.0, 320.0, 180.0)
        );

        scene.components.positions[target].value = Vec2::new(500.0, 90.0);
        assert_eq!(
            camera_bounds(&scene, target, 1.0, viewport),
            Aabb::new(340.0, 0.0, 320.0, 180.0)
        );

        scene.components.positions[target].value = Vec2::new(990.0, 90.0);
        assert_eq!(
            camera_bounds(&scene, target, 1.0, viewport),
            Aabb::new(680.0, 0.0, 320.0, 180.0)
        );
    }
}
