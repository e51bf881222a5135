//! The end-of-stage solar panel.

use ltl_ecs::prelude::*;

use super::{placed, sprites};

pub fn solar_panel_builder(x: f32, y: f32) -> EntityBuilder {
    placed(EntityKind::SolarPanel, Vec2::new(x, y), 88.0, 40.0)
        .with(CSprite {
            sprite: sprites::SOLAR_PANEL,
            intramural: Aabb::new(0.0, 0.0, 88.0, 40.0),
            reflection: Reflection::None,
        })
        .with(CCollider {
            resolution_schema: RESOLVE_NONE,
            layer: LAYER_INTERACTABLE,
            mask: LAYER_NONE,
            on_resolution: None,
            on_collision: None,
        })
        .with_tags(TAG_SOLAR_PANEL)
}

/// Swap to the charged sprite and stop reacting to further touches.
pub fn charge_solar_panel(scene: &mut Scene, entity: Entity) {
    if !scene.has_components(entity, TAG_SOLAR_PANEL | TAG_SPRITE) {
        return;
    }
    scene.components.sprites[entity].sprite = sprites::SOLAR_PANEL_CHARGED;
    scene.defer_disable_tags(entity, TAG_SOLAR_PANEL);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charging_is_one_shot() {
        let mut scene = Scene::default();
        let entity = scene.add_entity(&solar_panel_builder(0.0, 0.0)).unwrap();

        charge_solar_panel(&mut scene, entity);
        assert_eq!(scene.components.sprites[entity].sprite, sprites::SOLAR_PANEL_CHARGED);
        assert!(scene.has_components(entity, TAG_SOLAR_PANEL));

        scene.apply_deferred();
        assert!(!scene.has_components(entity, TAG_SOLAR_PANEL));
        assert!(scene.has_components(entity, TAG_COLLIDER | TAG_SPRITE));
    }
}
