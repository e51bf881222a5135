//! Static level geometry.

use ltl_ecs::prelude::*;

use super::placed;

/// A static collider covering `aabb`. Blocks never collide themselves, so
/// their mask is empty.
pub fn block_builder(aabb: Aabb, schema: ResolutionSchema, layer: Layer) -> EntityBuilder {
    placed(EntityKind::Block, aabb.position(), aabb.width, aabb.height).with(CCollider {
        resolution_schema: schema,
        layer,
        mask: LAYER_NONE,
        on_resolution: None,
        on_collision: None,
    })
}
