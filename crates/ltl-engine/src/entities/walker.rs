//! Patrolling enemies that turn around at walls.

use ltl_ecs::prelude::*;

use super::{animations, placed};
use crate::collision::apply_resolution_perfectly;

const WALKER_SPEED: f32 = 50.0;
const WALKER_GRAVITY: f32 = 1000.0;

pub fn walker_builder(x: f32, y: f32) -> EntityBuilder {
    let position = Vec2::new(x, y);

    placed(EntityKind::Walker, position, 18.0, 16.0)
        .with(CColor {
            value: Color::WHITE,
        })
        .with(animations::WALKER_IDLE.component(Aabb::new(15.0, 0.0, 18.0, 16.0)))
        .with(CKinetic {
            velocity: Vec2::new(WALKER_SPEED, 0.0),
            acceleration: Vec2::new(0.0, WALKER_GRAVITY),
        })
        .with(CSmooth { previous: position })
        .with(CCollider {
            resolution_schema: RESOLVE_ALL,
            layer: LAYER_LETHAL,
            mask: LAYER_TERRAIN | LAYER_LETHAL,
            on_resolution: Some(walker_on_resolution),
            on_collision: None,
        })
        .with(CDamage { value: 1 })
        .with_tags(TAG_WALKER)
}

/// Snap flush, reverse on walls and stop falling on floors.
pub fn walker_on_resolution(scene: &mut Scene, params: &ResolutionParams) -> Resolution {
    let resolved = apply_resolution_perfectly(params.aabb, params.other_aabb, params.resolution);

    let kinetic = &mut scene.components.kinetics[params.entity];
    if params.resolution.x != 0.0 {
        kinetic.velocity.x = -kinetic.velocity.x;
    }
    if params.resolution.y != 0.0 {
        kinetic.velocity.y = 0.0;
    }

    Resolution::Accepted(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_reverses_and_lands() {
        let mut scene = Scene::default();
        let walker = scene.add_entity(&walker_builder(0.0, 0.0)).unwrap();
        scene.components.kinetics[walker].velocity = Vec2::new(50.0, 120.0);

        let wall = ResolutionParams {
            entity: walker,
            aabb: Aabb::new(1.0, 0.0, 18.0, 16.0),
            other_entity: Entity::new(1),
            other_aabb: Aabb::new(18.0, -10.0, 16.0, 40.0),
            overlap: Aabb::new(18.0, 0.0, 1.0, 16.0),
            resolution: Vec2::new(-1.0, 0.0),
        };
        let result = walker_on_resolution(&mut scene, &wall);
        assert_eq!(result, Resolution::Accepted(Aabb::new(0.0, 0.0, 18.0, 16.0)));
        assert_eq!(scene.components.kinetics[walker].velocity, Vec2::new(-50.0, 120.0));

        let floor = ResolutionParams {
            resolution: Vec2::new(0.0, -1.0),
            other_aabb: Aabb::new(-32.0, 15.0, 64.0, 16.0),
            ..wall
        };
        walker_on_resolution(&mut scene, &floor);
        assert_eq!(scene.components.kinetics[walker].velocity, Vec2::new(-50.0, 0.0));
    }
}
