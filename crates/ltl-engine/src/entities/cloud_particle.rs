//! Dust puffs kicked up by jumps and hard landings.

use ltl_ecs::prelude::*;
use tracing::warn;

use super::placed;

/// Downward pull on every cloud particle.
pub const CLOUD_GRAVITY: f32 = 9.8;

/// How one puff starts out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudParticle {
    pub position: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
    pub lifetime: f32,
}

impl CloudParticle {
    /// A puff of `radius` at `position` launched along `angle` (radians) at
    /// `speed`. Its horizontal drift decays to zero over its lifetime.
    pub fn launched(position: Vec2, radius: f32, angle: f32, speed: f32, lifetime: f32) -> Self {
        Self {
            position,
            radius,
            velocity: Vec2::from_angle(angle) * speed,
            lifetime,
        }
    }

    fn acceleration(&self) -> Vec2 {
        Vec2::new(-self.velocity.x / self.lifetime, CLOUD_GRAVITY)
    }
}

pub fn cloud_particle_builder(particle: &CloudParticle) -> EntityBuilder {
    let size = particle.radius * 2.0;

    placed(EntityKind::CloudParticle, particle.position, size, size)
        .with(CKinetic {
            velocity: particle.velocity,
            acceleration: particle.acceleration(),
        })
        .with(CSmooth {
            previous: particle.position,
        })
        .with(CCollider {
            resolution_schema: RESOLVE_NONE,
            layer: LAYER_NONE,
            mask: LAYER_TERRAIN,
            on_resolution: None,
            on_collision: Some(cloud_particle_on_collision),
        })
        .with(CFleeting {
            lifetime: particle.lifetime,
            age: 0.0,
        })
        .with_tags(TAG_CLOUD_PARTICLE)
}

/// Queue a puff to materialize when this tick's commands are applied.
pub fn spawn_cloud_particle(scene: &mut Scene, particle: &CloudParticle) {
    if let Err(error) = scene.defer_callback(materialize, cloud_particle_builder(particle)) {
        warn!(error = %error, "dropped cloud particle");
    }
}

/// Vanish once fully buried in terrain.
pub fn cloud_particle_on_collision(scene: &mut Scene, params: &CollisionParams) {
    if params.overlap.width >= params.aabb.width && params.overlap.height >= params.aabb.height {
        scene.defer_deallocate(params.entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::post_collision_update;
    use crate::entities::block::block_builder;

    #[test]
    fn drift_decays_over_lifetime() {
        let particle = CloudParticle::launched(Vec2::ZERO, 2.0, 0.0, 20.0, 2.0);
        let builder = cloud_particle_builder(&particle);
        let mut scene = Scene::default();
        let entity = scene.add_entity(&builder).unwrap();

        let kinetic = scene.components.kinetics[entity];
        assert!((kinetic.velocity.x - 20.0).abs() < 1e-4);
        assert!((kinetic.acceleration.x + 10.0).abs() < 1e-4);
        assert_eq!(kinetic.acceleration.y, CLOUD_GRAVITY);
        assert_eq!(scene.aabb(entity), Aabb::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn spawn_materializes_on_apply() {
        let mut scene = Scene::default();
        let particle = CloudParticle::launched(Vec2::new(5.0, 5.0), 1.0, 0.0, 0.0, 1.0);
        spawn_cloud_particle(&mut scene, &particle);
        let entity = Entity::new(0);
        assert!(scene.is_allocated(entity));
        assert_eq!(scene.tags(entity), TAG_NONE);

        scene.apply_deferred();
        assert!(scene.has_components(entity, TAG_FLEETING | TAG_COLLIDER));
    }

    #[test]
    fn buried_particle_is_removed() {
        let mut scene = Scene::default();
        scene
            .add_entity(&block_builder(
                Aabb::new(0.0, 0.0, 32.0, 32.0),
                RESOLVE_ALL,
                LAYER_TERRAIN,
            ))
            .unwrap();
        let grazing = scene
            .add_entity(&cloud_particle_builder(&CloudParticle::launched(
                Vec2::new(30.0, 10.0),
                2.0,
                0.0,
                0.0,
                1.0,
            )))
            .unwrap();
        let buried = scene
            .add_entity(&cloud_particle_builder(&CloudParticle::launched(
                Vec2::new(10.0, 10.0),
                2.0,
                0.0,
                0.0,
                1.0,
            )))
            .unwrap();

        post_collision_update(&mut scene, grazing);
        post_collision_update(&mut scene, buried);
        scene.apply_deferred();

        assert!(scene.is_allocated(grazing));
        assert!(!scene.is_allocated(buried));
    }
}
