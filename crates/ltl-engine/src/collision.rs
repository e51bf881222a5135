//! Swept axis-separated collision resolution.
//!
//! Each tick, every entity with a smooth, position, dimension and collider
//! moves from its previous position to its integrated position in two
//! independent sweeps: x first, then y. A sweep advances the entity's box one
//! unit at a time and, after each step, tests it against every other collider
//! the entity's mask selects. A penetrating obstacle yields a single-axis push
//! direction opposite the sweep, filtered by the obstacle's resolution schema.
//! The candidate survives only if it lies on the axis of least overlap and
//! points at the nearer edge of the obstacle. Survivors are handed to the
//! entity's `on_resolution` callback, which has the final say.
//!
//! An axis whose sweep produced no accepted resolution falls back to the
//! integrated position verbatim.
//!
//! After resolution, [`post_collision_update`] reports every remaining overlap
//! to the entity's `on_collision` callback. That pass never moves anything.

use ltl_ecs::prelude::*;

/// Distance the simulated box advances per sweep step.
pub const SWEEP_STEP: f32 = 1.0;

/// Tags an entity needs to take part in collision as an obstacle.
pub const COLLIDABLE: Tags = TAG_POSITION | TAG_DIMENSION | TAG_COLLIDER;

// ---------------------------------------------------------------------------
// Resolution helpers
// ---------------------------------------------------------------------------

/// Keep only the components of `raw` that `schema` allows.
pub fn extract_resolution(raw: Vec2, schema: ResolutionSchema) -> Vec2 {
    let mut result = Vec2::ZERO;

    if schema & RESOLVE_LEFT != 0 && raw.x < 0.0 {
        result.x = raw.x;
    }
    if schema & RESOLVE_RIGHT != 0 && raw.x > 0.0 {
        result.x = raw.x;
    }
    if schema & RESOLVE_UP != 0 && raw.y < 0.0 {
        result.y = raw.y;
    }
    if schema & RESOLVE_DOWN != 0 && raw.y > 0.0 {
        result.y = raw.y;
    }

    result
}

/// Snap `aabb` flush against the side of `other` that `resolution` points
/// toward.
pub fn apply_resolution_perfectly(aabb: Aabb, other: Aabb, resolution: Vec2) -> Aabb {
    let mut result = aabb;

    if resolution.x < 0.0 {
        result.x = other.left() - aabb.width;
    } else if resolution.x > 0.0 {
        result.x = other.right();
    }

    if resolution.y < 0.0 {
        result.y = other.top() - aabb.height;
    } else if resolution.y > 0.0 {
        result.y = other.bottom();
    }

    result
}

/// Whether `resolution` points at the nearer edge of `other`.
fn points_toward_nearest_edge(aabb: &Aabb, other: &Aabb, resolution: Vec2) -> bool {
    let offset_left = (other.left() - aabb.width) - aabb.left();
    let offset_right = other.right() - aabb.left();
    let offset_down = other.bottom() - aabb.top();
    let offset_up = (other.top() - aabb.height) - aabb.top();

    if resolution.x < 0.0 && offset_left.abs() > offset_right.abs() {
        return false;
    }
    if resolution.x > 0.0 && offset_right.abs() > offset_left.abs() {
        return false;
    }
    if resolution.y < 0.0 && offset_up.abs() > offset_down.abs() {
        return false;
    }
    if resolution.y > 0.0 && offset_down.abs() > offset_up.abs() {
        return false;
    }

    true
}

fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

/// Result of sweeping one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSweep {
    pub aabb: Aabb,
    pub x_modified: bool,
    pub y_modified: bool,
}

/// Sweep `aabb` along `delta`, which must be non-zero on at most one axis.
pub fn simulate_on_axis(
    scene: &mut Scene,
    entity: Entity,
    aabb: Aabb,
    delta: Vec2,
    on_resolution: OnResolution,
) -> AxisSweep {
    debug_assert!(delta.x == 0.0 || delta.y == 0.0, "sweep delta must be single-axis");

    let mask = scene.components.colliders[entity].mask;
    let direction = Vec2::new(sign(delta.x), sign(delta.y));
    let mut remainder = Vec2::new(delta.x.abs(), delta.y.abs());
    let mut simulated = aabb;
    let mut x_modified = false;
    let mut y_modified = false;

    while remainder.x > 0.0 || remainder.y > 0.0 {
        remainder.x -= SWEEP_STEP * direction.x.abs();
        remainder.y -= SWEEP_STEP * direction.y.abs();
        simulated.x += SWEEP_STEP * direction.x;
        simulated.y += SWEEP_STEP * direction.y;

        for index in 0..scene.entity_count() {
            let other = Entity::new(index as u32);
            if other == entity || !scene.has_components(other, COLLIDABLE) {
                continue;
            }

            let other_collider = scene.components.colliders[other];
            if mask & other_collider.layer == 0 {
                continue;
            }

            let other_aabb = scene.aabb(other);
            if !simulated.intersects(&other_aabb) {
                continue;
            }

            let resolution = extract_resolution(-direction, other_collider.resolution_schema);
            if resolution.x == 0.0 && resolution.y == 0.0 {
                continue;
            }

            // Only the axis of least overlap may resolve. Ties resolve neither.
            let overlap = simulated.overlap(&other_aabb);
            if resolution.x != 0.0 && overlap.width >= overlap.height {
                continue;
            }
            if resolution.y != 0.0 && overlap.height >= overlap.width {
                continue;
            }

            if !points_toward_nearest_edge(&simulated, &other_aabb, resolution) {
                continue;
            }

            let params = ResolutionParams {
                entity,
                aabb: simulated,
                other_entity: other,
                other_aabb,
                overlap,
                resolution,
            };

            if let Resolution::Accepted(resolved) = on_resolution(scene, &params) {
                x_modified |= resolved.x != simulated.x;
                y_modified |= resolved.y != simulated.y;
                simulated = resolved;
            }
        }

        if (direction.x != 0.0 && x_modified) || (direction.y != 0.0 && y_modified) {
            break;
        }
    }

    AxisSweep {
        aabb: simulated,
        x_modified,
        y_modified,
    }
}

/// Resolve a move from `previous` to `current` as an x sweep followed by a y
/// sweep. Unresolved axes keep the `current` coordinate.
pub fn advanced_collision(
    scene: &mut Scene,
    entity: Entity,
    previous: Aabb,
    current: Aabb,
    on_resolution: OnResolution,
) -> Aabb {
    let delta = current.position() - previous.position();
    let mut x_modified = false;
    let mut y_modified = false;

    let sweep = simulate_on_axis(
        scene,
        entity,
        previous,
        Vec2::new(delta.x, 0.0),
        on_resolution,
    );
    let mut simulated = sweep.aabb;
    x_modified |= sweep.x_modified;
    y_modified |= sweep.y_modified;
    if !x_modified {
        simulated.x = current.x;
    }

    let sweep = simulate_on_axis(
        scene,
        entity,
        simulated,
        Vec2::new(0.0, delta.y),
        on_resolution,
    );
    simulated = sweep.aabb;
    y_modified |= sweep.y_modified;
    if !y_modified {
        simulated.y = current.y;
    }

    simulated
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Resolve `entity`'s movement this tick and write the result back.
pub fn collision_update(scene: &mut Scene, entity: Entity) {
    if !scene.has_components(entity, TAG_SMOOTH | COLLIDABLE) {
        return;
    }
    let Some(on_resolution) = scene.components.colliders[entity].on_resolution else {
        return;
    };

    let dimension = scene.components.dimensions[entity];
    let previous = Aabb::from_position(
        scene.components.smooths[entity].previous,
        dimension.width,
        dimension.height,
    );
    let current = scene.aabb(entity);

    let resolved = advanced_collision(scene, entity, previous, current, on_resolution);
    scene.components.positions[entity].value = resolved.position();
}

/// Report every collider overlapping `entity`'s final box.
pub fn post_collision_update(scene: &mut Scene, entity: Entity) {
    if !scene.has_components(entity, COLLIDABLE) {
        return;
    }
    let collider = scene.components.colliders[entity];
    let Some(on_collision) = collider.on_collision else {
        return;
    };

    let aabb = scene.aabb(entity);

    for index in 0..scene.entity_count() {
        let other = Entity::new(index as u32);
        if other == entity || !scene.has_components(other, COLLIDABLE) {
            continue;
        }
        if collider.mask & scene.components.colliders[other].layer == 0 {
            continue;
        }

        let other_aabb = scene.aabb(other);
        if !aabb.intersects(&other_aabb) {
            continue;
        }

        let params = CollisionParams {
            entity,
            aabb,
            other_entity: other,
            other_aabb,
            overlap: aabb.overlap(&other_aabb),
        };
        on_collision(scene, &params);
    }
}
