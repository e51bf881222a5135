//! The player: movement, jumping, damage and animation.
//!
//! Lateral movement is a small state machine. Pressing a direction computes
//! the constant force that reaches [`MOVE_SPEED`] in a fixed time from the
//! current velocity (`a = (vf - vo) / t`); releasing computes the force that
//! stops in proportionally less time. Jumps use a gravity tuned so that a
//! held jump peaks at [`JUMP_HEIGHT`] after [`JUMP_DURATION`] seconds;
//! releasing early caps the upward speed, and falling uses a heavier gravity.
//!
//! The player collides with terrain, lethal and interactable layers. Its
//! `on_resolution` callback adds corner leeway, one-way platform landing,
//! and ignores walkers (they hurt through `on_collision` instead).

use std::f32::consts::PI;

use ltl_ecs::prelude::*;

use super::battery::{BATTERY_HEAL, BATTERY_SCORE};
use super::cloud_particle::{spawn_cloud_particle, CloudParticle};
use super::solar_panel::charge_solar_panel;
use super::{animations, placed, AnimationSpec, FIXED_DT, VIEWPORT_HEIGHT};
use crate::collision::apply_resolution_perfectly;
use crate::input::{Binding, Input};

pub const MOVE_SPEED: f32 = 200.0;
pub const JUMP_HEIGHT: f32 = 16.0 * 3.0 + 6.0;
pub const JUMP_DURATION: f32 = 0.4;
pub const JUMP_GRAVITY: f32 = (2.0 * JUMP_HEIGHT) / (JUMP_DURATION * JUMP_DURATION);
pub const DEFAULT_GRAVITY: f32 = JUMP_GRAVITY * 1.5;
pub const JUMP_VELOCITY: f32 = JUMP_GRAVITY * JUMP_DURATION;
pub const TERMINAL_VELOCITY: f32 = 500.0;

const TIME_TO_SPRINT: f32 = FIXED_DT * 6.0;
const TIME_TO_STOP: f32 = FIXED_DT * 6.0;
const COYOTE_DURATION: f32 = FIXED_DT * 6.0;
const INVULNERABLE_DURATION: f32 = 1.5;
const TOTAL_FLASHES: u32 = 5;

/// Widest overlap a head bump may have and still slide past the corner.
const HEAD_BUMP_LEEWAY: f32 = 4.0;

/// Furthest below a one-way surface the player may be and still land on it.
const LANDING_TOLERANCE: f32 = 3.0;

pub const PLAYER_HIT_POINTS: i16 = 2;
pub const PLAYER_MAX_HIT_POINTS: i16 = 5;

/// Collision box within the player's animation frames.
pub const PLAYER_INTRAMURAL: Aabb = Aabb::new(24.0, 29.0, 15.0, 35.0);

pub fn player_builder(x: f32, y: f32) -> EntityBuilder {
    let position = Vec2::new(x, y);

    placed(
        EntityKind::Player,
        position,
        PLAYER_INTRAMURAL.width,
        PLAYER_INTRAMURAL.height,
    )
    .with(animations::PLAYER_STILL.component(PLAYER_INTRAMURAL))
    .with(CKinetic::default())
    .with(CSmooth { previous: position })
    .with(CCollider {
        resolution_schema: RESOLVE_NONE,
        layer: LAYER_NONE,
        mask: LAYER_TERRAIN | LAYER_LETHAL | LAYER_INTERACTABLE,
        on_resolution: Some(player_on_resolution),
        on_collision: Some(player_on_collision),
    })
    .with(CMortal {
        hp: PLAYER_HIT_POINTS,
    })
    .with(CPlayer {
        coyote_timer: COYOTE_DURATION,
        coyote_duration: COYOTE_DURATION,
        invulnerable_timer: INVULNERABLE_DURATION,
        invulnerable_duration: INVULNERABLE_DURATION,
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// Lateral movement
// ---------------------------------------------------------------------------

fn standstill(player: &mut CPlayer, kinetic: &mut CKinetic) {
    player.sprint_timer = 0.0;
    player.sprint_state = SprintState::None;
    player.sprint_force.x = 0.0;
    player.sprint_direction = Direction::None;
    kinetic.velocity.x = 0.0;
}

fn decelerate(player: &mut CPlayer, kinetic: &CKinetic) {
    if kinetic.velocity.x == 0.0 {
        player.sprint_timer = 0.0;
        player.sprint_state = SprintState::None;
        player.sprint_force.x = 0.0;
        player.sprint_direction = Direction::None;
        return;
    }

    let duration = kinetic.velocity.x.abs() * TIME_TO_STOP / MOVE_SPEED;

    player.sprint_timer = 0.0;
    player.sprint_duration = duration;
    player.sprint_state = SprintState::Decelerating;
    player.sprint_force.x = -kinetic.velocity.x / duration;
    player.sprint_direction = Direction::None;
}

fn accelerate(player: &mut CPlayer, kinetic: &CKinetic, direction: Direction) {
    let velocity = kinetic.velocity.x;
    let sign = if direction == Direction::Left { -1.0 } else { 1.0 };

    if velocity * sign >= MOVE_SPEED {
        player.sprint_timer = 0.0;
        player.sprint_state = SprintState::Terminal;
        player.sprint_force.x = 0.0;
        player.sprint_direction = direction;
        return;
    }

    // Distance in velocity space left to cover; reversing covers more.
    let delta = MOVE_SPEED - velocity * sign;
    let duration = delta * TIME_TO_SPRINT / MOVE_SPEED;

    player.sprint_timer = 0.0;
    player.sprint_duration = duration;
    player.sprint_state = SprintState::Accelerating;
    player.sprint_force.x = (MOVE_SPEED * sign - velocity) / duration;
    player.sprint_direction = direction;
}

fn is_reversal(current: Direction, strafe: Direction) -> bool {
    matches!(
        (current, strafe),
        (Direction::Left, Direction::Right) | (Direction::Right, Direction::Left)
    )
}

/// Which way the player wants to go. Holding both keys keeps the direction
/// pressed last.
fn strafe(player: &mut CPlayer, input: &dyn Input) -> Direction {
    let left = input.pressing(Binding::Left);
    let right = input.pressing(Binding::Right);

    match (left, right) {
        (true, false) => {
            player.initial_direction = Direction::Left;
            Direction::Left
        }
        (false, true) => {
            player.initial_direction = Direction::Right;
            Direction::Right
        }
        (true, true) => match player.initial_direction {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::None => Direction::None,
        },
        (false, false) => Direction::None,
    }
}

fn lateral_movement(player: &mut CPlayer, kinetic: &mut CKinetic, input: &dyn Input, dt: f32) {
    let strafe = strafe(player, input);

    match player.sprint_state {
        SprintState::None => {
            if strafe == Direction::None {
                player.sprint_force.x = 0.0;
            } else {
                accelerate(player, kinetic, strafe);
            }
        }
        SprintState::Accelerating => {
            if strafe == Direction::None {
                decelerate(player, kinetic);
            } else if is_reversal(player.sprint_direction, strafe) {
                accelerate(player, kinetic, strafe);
            } else {
                player.sprint_timer += dt;
                if player.sprint_timer >= player.sprint_duration {
                    player.sprint_timer = 0.0;
                    player.sprint_state = SprintState::Terminal;
                    player.sprint_force.x = 0.0;
                }
            }
        }
        SprintState::Terminal => {
            if is_reversal(player.sprint_direction, strafe) {
                accelerate(player, kinetic, strafe);
            } else if strafe == Direction::None {
                decelerate(player, kinetic);
            }
        }
        SprintState::Decelerating => {
            if strafe != Direction::None {
                accelerate(player, kinetic, strafe);
            } else {
                player.sprint_timer += dt;
                if player.sprint_timer >= player.sprint_duration {
                    standstill(player, kinetic);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Read input, run the movement state machines and set this tick's net
/// force. The player is assumed airborne until a resolution proves
/// otherwise.
pub fn player_input_update(scene: &mut Scene, entity: Entity, input: &mut dyn Input, dt: f32) {
    if !scene.has_components(entity, TAG_PLAYER | TAG_KINETIC) {
        return;
    }
    if scene.requests.advance {
        return;
    }

    let mut player = scene.components.players[entity];
    let mut kinetic = scene.components.kinetics[entity];
    if player.dead {
        return;
    }

    let coyote_active = player.coyote_timer < player.coyote_duration;

    player.grounded_last_frame = player.grounded;
    if player.grounded {
        kinetic.velocity.y = 0.0;
        player.jumping = false;
    }
    player.gravity_force.y = DEFAULT_GRAVITY;
    if player.jumping && kinetic.velocity.y < JUMP_VELOCITY {
        player.gravity_force.y = JUMP_GRAVITY;
    }
    if coyote_active {
        player.coyote_timer += dt;
    }

    lateral_movement(&mut player, &mut kinetic, input, dt);

    let mut jumped = false;
    if (player.grounded || coyote_active) && !player.jumping && input.pressed(Binding::Jump) {
        input.consume(Binding::Jump);
        player.grounded = false;
        player.jumping = true;
        kinetic.velocity.y = -JUMP_VELOCITY;
        jumped = true;
    }

    // Variable jump height.
    if input.released(Binding::Jump) && kinetic.velocity.y < 0.0 {
        input.consume(Binding::Jump);
        player.jumping = false;
        kinetic.velocity.y = kinetic.velocity.y.max(-JUMP_VELOCITY * 0.5);
    }

    player.grounded = false;
    kinetic.acceleration = player.gravity_force + player.sprint_force;

    scene.components.players[entity] = player;
    scene.components.kinetics[entity] = kinetic;

    if jumped {
        spawn_jump_particles(scene, entity);
    }
}

/// Clamp to the stage's left edge, request an advance past its right edge,
/// and open the coyote window after walking off a ledge.
pub fn player_post_collision_update(scene: &mut Scene, entity: Entity) {
    if !scene.has_components(entity, TAG_PLAYER | TAG_POSITION | TAG_KINETIC) {
        return;
    }

    let bounds = scene.bounds;
    let x = scene.components.positions[entity].value.x;
    if x < bounds.left() {
        scene.components.positions[entity].value.x = bounds.left();
        standstill(
            &mut scene.components.players[entity],
            &mut scene.components.kinetics[entity],
        );
    } else if x > bounds.right() {
        scene.components.kinetics[entity].velocity.x = MOVE_SPEED;
        scene.requests.advance = true;
    }

    let player = &mut scene.components.players[entity];
    if player.grounded_last_frame && !player.grounded {
        player.coyote_timer = 0.0;
    }
}

/// Death, falling out of the stage, and invulnerability flashing.
pub fn player_mortal_update(scene: &mut Scene, entity: Entity, dt: f32) {
    if !scene.has_components(entity, TAG_PLAYER | TAG_MORTAL | TAG_POSITION | TAG_KINETIC) {
        return;
    }

    let y = scene.components.positions[entity].value.y;
    if y > VIEWPORT_HEIGHT * 2.0 {
        scene.requests.reset = true;
        return;
    }

    if scene.components.players[entity].dead {
        return;
    }

    if y > scene.bounds.bottom() {
        scene.components.players[entity].dead = true;
        scene.defer_disable_tags(entity, TAG_COLLIDER);
        let kinetic = &mut scene.components.kinetics[entity];
        kinetic.velocity.x = 0.0;
        kinetic.acceleration.x = 0.0;
        return;
    }

    if scene.components.mortals[entity].hp <= 0 {
        scene.components.players[entity].dead = true;
        scene.defer_enable_tags(entity, TAG_ANIMATION);
        scene.defer_disable_tags(entity, TAG_COLLIDER);
        let kinetic = &mut scene.components.kinetics[entity];
        if kinetic.velocity.y >= 0.0 {
            kinetic.velocity.y = -JUMP_VELOCITY * 0.85;
        }
        kinetic.acceleration.x = 0.0;
        return;
    }

    flash(scene, entity, dt);
}

/// Blink the sprite while invulnerable by toggling the animation tag.
fn flash(scene: &mut Scene, entity: Entity, dt: f32) {
    let player = &mut scene.components.players[entity];
    player.invulnerable_timer += dt;

    let slice = player.invulnerable_duration / (TOTAL_FLASHES * 2) as f32;
    let visible = player.dead
        || player.is_vulnerable()
        || (player.invulnerable_timer / slice) as u32 % 2 == 1;

    if visible {
        scene.defer_enable_tags(entity, TAG_ANIMATION);
    } else {
        scene.defer_disable_tags(entity, TAG_ANIMATION);
    }
}

fn play(player: &mut CPlayer, spec: AnimationSpec, state: PlayerAnimationState) -> CAnimation {
    player.animation_state = state;
    spec.component(PLAYER_INTRAMURAL)
}

/// Pick the animation for the player's state and face it the right way.
pub fn player_animation_update(scene: &mut Scene, entity: Entity) {
    if !scene.has_components(entity, TAG_PLAYER) {
        return;
    }

    let mut player = scene.components.players[entity];
    let mut animation = scene.components.animations[entity];

    if player.dead && player.animation_state != PlayerAnimationState::Dying {
        animation = play(&mut player, animations::PLAYER_SPIN, PlayerAnimationState::Dying);
        animation.frame_duration = animations::PLAYER_SPIN.frame_duration * 0.5;
    }

    let frame_starting = animation.frame_timer == 0.0;

    match player.animation_state {
        PlayerAnimationState::Still => {
            if player.jumping {
                animation = play(&mut player, animations::PLAYER_JUMP, PlayerAnimationState::Jumping);
            } else if player.sprint_state != SprintState::None {
                animation = play(&mut player, animations::PLAYER_RUN, PlayerAnimationState::Running);
            }
        }
        PlayerAnimationState::Running => {
            if player.jumping {
                animation = play(&mut player, animations::PLAYER_JUMP, PlayerAnimationState::Jumping);
            } else if player.sprint_state == SprintState::None && frame_starting {
                animation = play(&mut player, animations::PLAYER_STILL, PlayerAnimationState::Still);
            }
        }
        PlayerAnimationState::Jumping => {
            if player.grounded {
                if player.sprint_direction == Direction::None {
                    animation = play(&mut player, animations::PLAYER_STILL, PlayerAnimationState::Still);
                } else if frame_starting {
                    animation = play(&mut player, animations::PLAYER_RUN, PlayerAnimationState::Running);
                }
            }
        }
        PlayerAnimationState::Spinning | PlayerAnimationState::Dying => {}
    }

    animation.reflection = match player.facing() {
        Direction::Left => Reflection::ReverseX,
        _ => Reflection::None,
    };

    scene.components.players[entity] = player;
    scene.components.animations[entity] = animation;
}

// ---------------------------------------------------------------------------
// Collider callbacks
// ---------------------------------------------------------------------------

pub fn player_on_resolution(scene: &mut Scene, params: &ResolutionParams) -> Resolution {
    if scene.has_components(params.other_entity, TAG_WALKER) {
        return Resolution::Rejected;
    }

    // Clipping a ceiling corner slides the player past it instead.
    if params.resolution.y > 0.0 && params.overlap.width.abs() <= HEAD_BUMP_LEEWAY {
        let mut resolved = params.aabb;
        resolved.x = if params.aabb.x < params.other_aabb.x {
            params.other_aabb.left() - params.aabb.width
        } else {
            params.other_aabb.right()
        };
        return Resolution::Accepted(resolved);
    }

    let velocity = scene.components.kinetics[params.entity].velocity;

    if velocity.y > 0.0 && params.resolution.y < 0.0 {
        let depth = (params.other_aabb.top() - params.aabb.bottom()).abs();
        if depth > LANDING_TOLERANCE {
            return Resolution::Rejected;
        }
    }

    let resolved = apply_resolution_perfectly(params.aabb, params.other_aabb, params.resolution);

    let player = &mut scene.components.players[params.entity];
    let kinetic = &mut scene.components.kinetics[params.entity];

    if (params.resolution.x < 0.0 && velocity.x > 0.0)
        || (params.resolution.x > 0.0 && velocity.x < 0.0)
    {
        standstill(player, kinetic);
    }

    let hard_landing = params.resolution.y < 0.0 && velocity.y > TERMINAL_VELOCITY * 0.75;
    if params.resolution.y < 0.0 {
        player.grounded = true;
    }

    if (params.resolution.y < 0.0 && velocity.y > 0.0)
        || (params.resolution.y > 0.0 && velocity.y < 0.0)
    {
        kinetic.velocity.y = 0.0;
    }

    if hard_landing {
        spawn_impact_particles(scene, params.entity, params.other_aabb.top());
    }

    Resolution::Accepted(resolved)
}

pub fn player_on_collision(scene: &mut Scene, params: &CollisionParams) {
    let entity = params.entity;
    let other = params.other_entity;

    if scene.has_components(other, TAG_DAMAGE) {
        take_damage(scene, entity, other);
    }

    if scene.has_components(other, TAG_BATTERY) {
        let mortal = &mut scene.components.mortals[entity];
        mortal.hp = (mortal.hp + BATTERY_HEAL).min(PLAYER_MAX_HIT_POINTS);
        scene.score.increment(BATTERY_SCORE);
        scene.defer_deallocate(other);
    }

    if scene.has_components(other, TAG_SOLAR_PANEL | TAG_SPRITE) {
        charge_solar_panel(scene, other);
    }
}

fn take_damage(scene: &mut Scene, entity: Entity, source: Entity) {
    if !scene.has_components(entity, TAG_PLAYER | TAG_MORTAL) {
        return;
    }
    let player = &mut scene.components.players[entity];
    if !player.is_vulnerable() {
        return;
    }
    scene.components.mortals[entity].hp -= scene.components.damages[source].value;
    player.invulnerable_timer = 0.0;
}

// ---------------------------------------------------------------------------
// Particles
// ---------------------------------------------------------------------------

fn puff(scene: &mut Scene, position: Vec2, radius: f32, angle: f32, speed: f32, lifetime: f32) {
    spawn_cloud_particle(
        scene,
        &CloudParticle::launched(position, radius, angle, speed, lifetime),
    );
}

/// Dust thrown sideways from both feet on a hard landing, plus a trail
/// behind a moving player.
fn spawn_impact_particles(scene: &mut Scene, entity: Entity, ground_y: f32) {
    let position = scene.components.positions[entity].value;
    let width = scene.components.dimensions[entity].width;
    let velocity_x = scene.components.kinetics[entity].velocity.x;

    let spawn_count = scene.rng().next_inclusive(10, 20) as usize;
    let spread = (width * 0.25) as i32;
    let left_anchor = Vec2::new(position.x, ground_y);
    let right_anchor = Vec2::new(position.x + width, ground_y);

    let increment = 25f32.to_radians() / spawn_count as f32;
    for i in 0..spawn_count {
        let rng = scene.rng();
        let radius = rng.next_inclusive(1, 4) as f32;
        let offset = rng.next_inclusive(0, spread) as f32;
        let speed = rng.next_inclusive(10, 30) as f32;
        let lifetime = 1.0 + 0.5 * rng.next_inclusive(0, 4) as f32;
        let turn = increment * i as f32;

        puff(
            scene,
            Vec2::new(left_anchor.x - offset - radius * 2.0, left_anchor.y - radius * 2.0),
            radius,
            PI + turn,
            speed,
            lifetime,
        );
        puff(
            scene,
            Vec2::new(right_anchor.x + offset, right_anchor.y - radius * 2.0),
            radius,
            -turn,
            speed,
            lifetime,
        );
    }

    if velocity_x == 0.0 {
        return;
    }

    let anchor_offset = width * 0.25;
    let total = spawn_count / 2;
    let increment = 20f32.to_radians() / total as f32;
    for i in 0..total {
        let rng = scene.rng();
        let radius = rng.next_inclusive(1, 3) as f32;
        let offset = rng.next_inclusive(0, spread) as f32;
        let speed = rng.next_inclusive(20, 35) as f32;
        let lifetime = 0.5 + 0.5 * rng.next_inclusive(0, 4) as f32;
        let turn = increment * i as f32;

        if velocity_x > 0.0 {
            let at = Vec2::new(
                left_anchor.x + anchor_offset - offset - radius * 2.0,
                left_anchor.y - radius * 2.0,
            );
            puff(scene, at, radius, 200f32.to_radians() + turn, speed, lifetime);
        } else {
            let at = Vec2::new(
                right_anchor.x - anchor_offset + offset,
                right_anchor.y - radius * 2.0,
            );
            puff(scene, at, radius, (-20f32).to_radians() - turn, speed, lifetime);
        }
    }
}

/// Dust fanned out from under the player's feet at take-off.
fn spawn_jump_particles(scene: &mut Scene, entity: Entity) {
    let position = scene.components.positions[entity].value;
    let dimension = scene.components.dimensions[entity];
    let velocity_x = scene.components.kinetics[entity].velocity.x;

    let spawn_count = scene.rng().next_inclusive(10, 30) as usize;
    let anchor = Vec2::new(
        position.x + dimension.width * 0.5,
        position.y + dimension.height,
    );

    let increment = 30f32.to_radians() / spawn_count as f32;
    for i in 0..spawn_count {
        let rng = scene.rng();
        let radius = rng.next_inclusive(1, 3) as f32;
        let speed = rng.next_inclusive(10, 15) as f32;
        let lifetime = 0.5 + 0.5 * rng.next_inclusive(0, 3) as f32;
        let turn = increment * i as f32;

        puff(
            scene,
            Vec2::new(anchor.x - radius * 2.0, anchor.y - radius * 2.0),
            radius,
            PI + turn,
            speed,
            lifetime,
        );
        puff(
            scene,
            Vec2::new(anchor.x, anchor.y - radius * 2.0),
            radius,
            -turn,
            speed,
            lifetime,
        );
    }

    // A middle plume, tilted away from the direction of travel.
    let base_angle = if velocity_x < 0.0 {
        -20.0
    } else if velocity_x > 0.0 {
        -160.0
    } else {
        -90.0
    };
    let angle = (base_angle - 10.0f32).to_radians();

    let total = spawn_count / 2;
    let increment = 20f32.to_radians() / total as f32;
    for i in 0..total {
        let rng = scene.rng();
        let radius = rng.next_inclusive(2, 3) as f32;
        let lifetime = 0.5 + 0.5 * rng.next_inclusive(0, 4) as f32;
        let mut speed = rng.next_inclusive(10, 15) as f32;
        if velocity_x != 0.0 {
            speed *= 1.75;
        }

        puff(
            scene,
            Vec2::new(anchor.x - radius, anchor.y - radius * 2.0),
            radius,
            angle + increment * i as f32,
            speed,
            lifetime,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::battery::battery_builder;
    use crate::input::{NullInput, StreamInput};

    const DT: f32 = FIXED_DT;

    fn scene_with_player() -> (Scene, Entity) {
        let mut scene = Scene::default();
        scene.bounds = Aabb::new(0.0, 0.0, 1000.0, 180.0);
        let player = scene.add_entity(&player_builder(100.0, 50.0)).unwrap();
        scene.handles.player = Some(player);
        (scene, player)
    }

    fn holding(bindings: &[Binding]) -> StreamInput {
        let mut input = StreamInput::new(64);
        input.record(&[]);
        input.record(bindings);
        input
    }

    // -- 1. Lateral movement --

    #[test]
    fn sprint_reaches_terminal() {
        let (mut scene, player) = scene_with_player();
        let mut input = holding(&[Binding::Right]);

        player_input_update(&mut scene, player, &mut input, DT);
        let state = scene.components.players[player];
        assert_eq!(state.sprint_state, SprintState::Accelerating);
        assert_eq!(state.sprint_direction, Direction::Right);
        let expected = MOVE_SPEED / TIME_TO_SPRINT;
        assert!((state.sprint_force.x - expected).abs() < 1e-2);

        for _ in 0..7 {
            input.record(&[Binding::Right]);
            player_input_update(&mut scene, player, &mut input, DT);
        }
        assert_eq!(scene.components.players[player].sprint_state, SprintState::Terminal);
        assert_eq!(scene.components.kinetics[player].acceleration.x, 0.0);
    }

    #[test]
    fn releasing_decelerates_to_a_stop() {
        let (mut scene, player) = scene_with_player();
        scene.components.kinetics[player].velocity.x = MOVE_SPEED;
        scene.components.players[player].sprint_state = SprintState::Terminal;
        scene.components.players[player].sprint_direction = Direction::Right;

        let mut input = NullInput;
        player_input_update(&mut scene, player, &mut input, DT);
        let state = scene.components.players[player];
        assert_eq!(state.sprint_state, SprintState::Decelerating);
        assert!(state.sprint_force.x < 0.0);

        for _ in 0..7 {
            player_input_update(&mut scene, player, &mut input, DT);
        }
        assert_eq!(scene.components.players[player].sprint_state, SprintState::None);
        assert_eq!(scene.components.kinetics[player].velocity.x, 0.0);
    }

    // -- 2. Jumping --

    #[test]
    fn grounded_jump_launches_and_spawns_dust() {
        let (mut scene, player) = scene_with_player();
        scene.components.players[player].grounded = true;
        let mut input = holding(&[Binding::Jump]);

        player_input_update(&mut scene, player, &mut input, DT);
        let state = scene.components.players[player];
        assert!(state.jumping);
        assert!(!state.grounded);
        assert_eq!(scene.components.kinetics[player].velocity.y, -JUMP_VELOCITY);
        assert!(scene.pending_commands() >= 20);
        assert!(!input.pressed(Binding::Jump));
    }

    #[test]
    fn airborne_without_coyote_cannot_jump() {
        let (mut scene, player) = scene_with_player();
        let mut input = holding(&[Binding::Jump]);
        player_input_update(&mut scene, player, &mut input, DT);
        assert!(!scene.components.players[player].jumping);
    }

    #[test]
    fn coyote_window_allows_a_late_jump() {
        let (mut scene, player) = scene_with_player();
        scene.components.players[player].grounded_last_frame = true;
        player_post_collision_update(&mut scene, player);
        assert_eq!(scene.components.players[player].coyote_timer, 0.0);

        let mut input = holding(&[Binding::Jump]);
        player_input_update(&mut scene, player, &mut input, DT);
        assert!(scene.components.players[player].jumping);
    }

    #[test]
    fn early_release_caps_rise() {
        let (mut scene, player) = scene_with_player();
        scene.components.players[player].jumping = true;
        scene.components.kinetics[player].velocity.y = -JUMP_VELOCITY;

        let mut input = StreamInput::new(8);
        input.record(&[Binding::Jump]);
        input.record(&[]);
        player_input_update(&mut scene, player, &mut input, DT);
        assert_eq!(scene.components.kinetics[player].velocity.y, -JUMP_VELOCITY * 0.5);
        assert!(!scene.components.players[player].jumping);
    }

    // -- 3. Resolution --

    fn params(player: Entity, other: Entity, aabb: Aabb, other_aabb: Aabb, resolution: Vec2) -> ResolutionParams {
        ResolutionParams {
            entity: player,
            aabb,
            other_entity: other,
            other_aabb,
            overlap: aabb.overlap(&other_aabb),
            resolution,
        }
    }

    #[test]
    fn head_bump_slides_past_corner() {
        let (mut scene, player) = scene_with_player();
        let result = player_on_resolution(
            &mut scene,
            &params(
                player,
                Entity::new(9),
                Aabb::new(97.0, 15.0, 15.0, 35.0),
                Aabb::new(0.0, 0.0, 100.0, 16.0),
                Vec2::new(0.0, 1.0),
            ),
        );
        assert_eq!(result, Resolution::Accepted(Aabb::new(100.0, 15.0, 15.0, 35.0)));
    }

    #[test]
    fn deep_landing_is_rejected() {
        let (mut scene, player) = scene_with_player();
        scene.components.kinetics[player].velocity.y = 100.0;
        let result = player_on_resolution(
            &mut scene,
            &params(
                player,
                Entity::new(9),
                Aabb::new(100.0, 20.0, 15.0, 35.0),
                Aabb::new(50.0, 50.0, 100.0, 8.0),
                Vec2::new(0.0, -1.0),
            ),
        );
        assert_eq!(result, Resolution::Rejected);
        assert!(!scene.components.players[player].grounded);
    }

    #[test]
    fn landing_grounds_and_stops_fall() {
        let (mut scene, player) = scene_with_player();
        scene.components.kinetics[player].velocity.y = 100.0;
        let result = player_on_resolution(
            &mut scene,
            &params(
                player,
                Entity::new(9),
                Aabb::new(100.0, 16.0, 15.0, 35.0),
                Aabb::new(50.0, 50.0, 100.0, 8.0),
                Vec2::new(0.0, -1.0),
            ),
        );
        assert_eq!(result, Resolution::Accepted(Aabb::new(100.0, 15.0, 15.0, 35.0)));
        assert!(scene.components.players[player].grounded);
        assert_eq!(scene.components.kinetics[player].velocity.y, 0.0);
        assert_eq!(scene.pending_commands(), 0);
    }

    #[test]
    fn hard_landing_kicks_up_dust() {
        let (mut scene, player) = scene_with_player();
        scene.components.kinetics[player].velocity.y = TERMINAL_VELOCITY;
        player_on_resolution(
            &mut scene,
            &params(
                player,
                Entity::new(9),
                Aabb::new(100.0, 16.0, 15.0, 35.0),
                Aabb::new(50.0, 50.0, 100.0, 8.0),
                Vec2::new(0.0, -1.0),
            ),
        );
        assert!(scene.pending_commands() >= 20);
    }

    // -- 4. Damage and pickups --

    #[test]
    fn damage_then_invulnerable() {
        let (mut scene, player) = scene_with_player();
        let spike = scene
            .add_entity(&crate::entities::spike::spike_builder(
                0.0,
                0.0,
                crate::entities::spike::SpikeRotation::Rotate0,
            ))
            .unwrap();
        let collision = CollisionParams {
            entity: player,
            aabb: scene.aabb(player),
            other_entity: spike,
            other_aabb: scene.aabb(spike),
            overlap: Aabb::default(),
        };

        player_on_collision(&mut scene, &collision);
        assert_eq!(scene.components.mortals[player].hp, PLAYER_HIT_POINTS - 1);
        player_on_collision(&mut scene, &collision);
        assert_eq!(scene.components.mortals[player].hp, PLAYER_HIT_POINTS - 1);
    }

    #[test]
    fn battery_heals_scores_and_vanishes() {
        let (mut scene, player) = scene_with_player();
        let battery = scene.add_entity(&battery_builder(0.0, 0.0)).unwrap();
        scene.components.mortals[player].hp = PLAYER_MAX_HIT_POINTS;

        let collision = CollisionParams {
            entity: player,
            aabb: scene.aabb(player),
            other_entity: battery,
            other_aabb: scene.aabb(battery),
            overlap: Aabb::default(),
        };
        player_on_collision(&mut scene, &collision);
        assert_eq!(scene.components.mortals[player].hp, PLAYER_MAX_HIT_POINTS);
        assert_eq!(scene.score.buffer(), BATTERY_SCORE);
        scene.apply_deferred();
        assert!(!scene.is_allocated(battery));
    }

    // -- 5. Mortality --

    #[test]
    fn zero_hp_dies_with_a_hop() {
        let (mut scene, player) = scene_with_player();
        scene.components.mortals[player].hp = 0;
        player_mortal_update(&mut scene, player, DT);
        assert!(scene.components.players[player].dead);
        assert_eq!(scene.components.kinetics[player].velocity.y, -JUMP_VELOCITY * 0.85);

        scene.apply_deferred();
        assert!(!scene.has_components(player, TAG_COLLIDER));

        player_animation_update(&mut scene, player);
        assert_eq!(
            scene.components.players[player].animation_state,
            PlayerAnimationState::Dying
        );
    }

    #[test]
    fn falling_far_requests_reset() {
        let (mut scene, player) = scene_with_player();
        scene.components.positions[player].value.y = 200.0;
        player_mortal_update(&mut scene, player, DT);
        assert!(scene.components.players[player].dead);
        assert!(!scene.requests.reset);

        scene.components.positions[player].value.y = VIEWPORT_HEIGHT * 2.0 + 1.0;
        player_mortal_update(&mut scene, player, DT);
        assert!(scene.requests.reset);
    }

    #[test]
    fn crossing_right_edge_requests_advance() {
        let (mut scene, player) = scene_with_player();
        scene.components.positions[player].value.x = 1001.0;
        player_post_collision_update(&mut scene, player);
        assert!(scene.requests.advance);
        assert_eq!(scene.components.kinetics[player].velocity.x, MOVE_SPEED);
    }

    // -- 6. Animation --

    #[test]
    fn animation_follows_movement_and_facing() {
        let (mut scene, player) = scene_with_player();
        scene.components.players[player].sprint_state = SprintState::Accelerating;
        scene.components.players[player].sprint_direction = Direction::Left;
        player_animation_update(&mut scene, player);

        assert_eq!(
            scene.components.players[player].animation_state,
            PlayerAnimationState::Running
        );
        let animation = scene.components.animations[player];
        assert_eq!(animation.animation, animations::PLAYER_RUN.id);
        assert_eq!(animation.reflection, Reflection::ReverseX);

        scene.components.players[player].jumping = true;
        player_animation_update(&mut scene, player);
        assert_eq!(
            scene.components.players[player].animation_state,
            PlayerAnimationState::Jumping
        );
    }
}
