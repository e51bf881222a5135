//! Entity blueprints.
//!
//! An [`EntityBuilder`] is a tag word plus an ordered list of components. It
//! is the payload of deferred spawns: gameplay code assembles a builder during
//! the system sweep and the scene materializes it when commands are applied.
//!
//! ```
//! use ltl_ecs::prelude::*;
//!
//! let builder = EntityBuilder::new()
//!     .with(CPosition { value: Vec2::new(4.0, 8.0) })
//!     .with(CDimension { width: 16.0, height: 16.0 })
//!     .with_tags(TAG_WALKER);
//!
//! assert_eq!(builder.tags(), TAG_POSITION | TAG_DIMENSION | TAG_WALKER);
//! assert_eq!(builder.len(), 2);
//! ```

use crate::component::{Component, Tags, TAG_NONE};
use crate::deque::Deque;

/// A tag word and the components that back it.
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    tags: Tags,
    components: Deque<Component>,
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self {
            tags: TAG_NONE,
            components: Deque::with_capacity(8),
        }
    }

    /// Append a component and set its tag bit.
    pub fn push(&mut self, component: impl Into<Component>) {
        let component = component.into();
        self.tags |= component.tag();
        self.components.push_back(component);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.push(component);
        self
    }

    /// Set data-less marker tags.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags |= tags;
        self
    }

    #[inline]
    pub fn tags(&self) -> Tags {
        self.tags
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components.iter()
    }
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{CDamage, CKinetic, TAG_DAMAGE, TAG_KINETIC, TAG_LAKITU};

    #[test]
    fn empty_builder_has_no_tags() {
        let builder = EntityBuilder::new();
        assert_eq!(builder.tags(), TAG_NONE);
        assert!(builder.is_empty());
    }

    #[test]
    fn components_keep_insertion_order() {
        let builder = EntityBuilder::new()
            .with(CDamage { value: 1 })
            .with(CKinetic::default())
            .with_tags(TAG_LAKITU);

        let tags: Vec<Tags> = builder.components().map(Component::tag).collect();
        assert_eq!(tags, vec![TAG_DAMAGE, TAG_KINETIC]);
        assert_eq!(builder.tags(), TAG_DAMAGE | TAG_KINETIC | TAG_LAKITU);
    }
}
