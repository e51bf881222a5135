//! The scene: a fixed-capacity entity table, its component columns, the
//! deferred command queue and the scene-wide resources.
//!
//! Components are stored struct-of-arrays: one [`Column`] per component type,
//! all indexed by the same dense [`Entity`] slot. A slot's tag word decides
//! which columns hold live data for it. Column access does not check tags;
//! callers test [`Scene::has_components`] first.
//!
//! ```
//! use ltl_ecs::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default());
//! let entity = scene
//!     .add_entity(
//!         &EntityBuilder::new()
//!             .with(CPosition { value: Vec2::new(1.0, 2.0) })
//!             .with(CKinetic::default()),
//!     )
//!     .unwrap();
//!
//! assert!(scene.has_components(entity, TAG_POSITION | TAG_KINETIC));
//! assert_eq!(scene.components.positions[entity].value, Vec2::new(1.0, 2.0));
//!
//! scene.defer_deallocate(entity);
//! assert!(scene.has_components(entity, TAG_POSITION));
//! scene.apply_deferred();
//! assert_eq!(scene.tags(entity), TAG_NONE);
//! ```

use std::ops::{Index, IndexMut};

use serde::Serialize;
use tracing::{debug, warn};

use crate::arena::{Arena, DEFAULT_ARENA_CAPACITY};
use crate::builder::EntityBuilder;
use crate::command::{ApplyReport, Command, CommandQueue, DeferredFn};
use crate::component::*;
use crate::entity::{Entity, EntityAllocator, DEFAULT_MAX_ENTITIES};
use crate::geometry::Aabb;
use crate::resource::{FogState, SceneHandles, Score, StageRequests};
use crate::rng::Rng;
use crate::EcsError;

// ---------------------------------------------------------------------------
// SceneConfig
// ---------------------------------------------------------------------------

/// Sizing and seeding for a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneConfig {
    /// Number of entity slots.
    pub capacity: usize,
    /// Deferred payloads per tick.
    pub arena_capacity: usize,
    /// Seed of the scene's random stream.
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_MAX_ENTITIES,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            seed: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Components
// ---------------------------------------------------------------------------

/// One component type's storage, indexed by entity slot.
#[derive(Debug, Clone)]
pub struct Column<T>(Vec<T>);

impl<T: Default + Clone> Column<T> {
    fn new(capacity: usize) -> Self {
        Self(vec![T::default(); capacity])
    }
}

impl<T> Column<T> {
    /// Bounds-checked access. Does not consult tags.
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.0.get(entity.index())
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.0.get_mut(entity.index())
    }
}

impl<T> Index<Entity> for Column<T> {
    type Output = T;

    fn index(&self, entity: Entity) -> &T {
        &self.0[entity.index()]
    }
}

impl<T> IndexMut<Entity> for Column<T> {
    fn index_mut(&mut self, entity: Entity) -> &mut T {
        &mut self.0[entity.index()]
    }
}

/// Every component column.
#[derive(Debug, Clone)]
pub struct Components {
    pub identifiers: Column<CIdentifier>,
    pub positions: Column<CPosition>,
    pub dimensions: Column<CDimension>,
    pub colors: Column<CColor>,
    pub sprites: Column<CSprite>,
    pub animations: Column<CAnimation>,
    pub kinetics: Column<CKinetic>,
    pub smooths: Column<CSmooth>,
    pub colliders: Column<CCollider>,
    pub mortals: Column<CMortal>,
    pub damages: Column<CDamage>,
    pub fleetings: Column<CFleeting>,
    pub players: Column<CPlayer>,
}

impl Components {
    fn new(capacity: usize) -> Self {
        Self {
            identifiers: Column::new(capacity),
            positions: Column::new(capacity),
            dimensions: Column::new(capacity),
            colors: Column::new(capacity),
            sprites: Column::new(capacity),
            animations: Column::new(capacity),
            kinetics: Column::new(capacity),
            smooths: Column::new(capacity),
            colliders: Column::new(capacity),
            mortals: Column::new(capacity),
            damages: Column::new(capacity),
            fleetings: Column::new(capacity),
            players: Column::new(capacity),
        }
    }

    /// Write `component` into its column. Tags are left alone.
    pub fn set(&mut self, entity: Entity, component: Component) {
        match component {
            Component::Identifier(value) => self.identifiers[entity] = value,
            Component::Position(value) => self.positions[entity] = value,
            Component::Dimension(value) => self.dimensions[entity] = value,
            Component::Color(value) => self.colors[entity] = value,
            Component::Sprite(value) => self.sprites[entity] = value,
            Component::Animation(value) => self.animations[entity] = value,
            Component::Kinetic(value) => self.kinetics[entity] = value,
            Component::Smooth(value) => self.smooths[entity] = value,
            Component::Collider(value) => self.colliders[entity] = value,
            Component::Mortal(value) => self.mortals[entity] = value,
            Component::Damage(value) => self.damages[entity] = value,
            Component::Fleeting(value) => self.fleetings[entity] = value,
            Component::Player(value) => self.players[entity] = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The entity table and everything a tick reads or writes.
#[derive(Debug)]
pub struct Scene {
    pub components: Components,
    pub bounds: Aabb,
    /// Simulated seconds since the scene was created.
    pub elapsed: f32,
    pub score: Score,
    pub requests: StageRequests,
    pub handles: SceneHandles,
    pub fog: FogState,
    config: SceneConfig,
    tags: Vec<Tags>,
    occupied: Vec<bool>,
    allocator: EntityAllocator,
    commands: CommandQueue,
    arena: Arena<EntityBuilder>,
    rng: Rng,
}

impl Scene {
    /// Create an empty scene.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    pub fn new(config: SceneConfig) -> Self {
        assert!(config.capacity > 0, "scene capacity must be positive");
        Self {
            components: Components::new(config.capacity),
            bounds: Aabb::default(),
            elapsed: 0.0,
            score: Score::new(),
            requests: StageRequests::default(),
            handles: SceneHandles::default(),
            fog: FogState::default(),
            config,
            tags: vec![TAG_NONE; config.capacity],
            occupied: vec![false; config.capacity],
            allocator: EntityAllocator::new(config.capacity),
            commands: CommandQueue::new(),
            arena: Arena::new(config.arena_capacity),
            rng: Rng::new(config.seed),
        }
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// The scene's random stream.
    #[inline]
    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    // -- Entity table --

    /// Reserve a slot with an empty tag word.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityCapacityExceeded`] when the table is full.
    pub fn allocate_entity(&mut self) -> Result<Entity, EcsError> {
        let entity = self.allocator.allocate()?;
        self.tags[entity.index()] = TAG_NONE;
        self.occupied[entity.index()] = true;
        Ok(entity)
    }

    /// Clear `entity`'s tags and recycle its slot. Returns `false` if the
    /// slot was already free.
    ///
    /// Must not be called during a system sweep; use
    /// [`defer_deallocate`](Self::defer_deallocate) there.
    pub fn deallocate_entity(&mut self, entity: Entity) -> bool {
        let Some(occupied) = self.occupied.get_mut(entity.index()) else {
            warn!(entity = %entity, "deallocating an entity outside the table");
            return false;
        };
        if !*occupied {
            warn!(entity = %entity, "deallocating an entity that is already free");
            return false;
        }
        *occupied = false;
        self.tags[entity.index()] = TAG_NONE;
        self.allocator.release(entity);
        true
    }

    /// Exact membership test: every bit of `mask` is set.
    #[inline]
    pub fn has_components(&self, entity: Entity, mask: Tags) -> bool {
        self.tags(entity) & mask == mask
    }

    /// The tag word of `entity`; [`TAG_NONE`] for slots outside the table.
    #[inline]
    pub fn tags(&self, entity: Entity) -> Tags {
        self.tags.get(entity.index()).copied().unwrap_or(TAG_NONE)
    }

    /// Whether the slot is currently allocated.
    pub fn is_allocated(&self, entity: Entity) -> bool {
        self.occupied.get(entity.index()).copied().unwrap_or(false)
    }

    /// High-water mark of the table. Systems sweep `0..entity_count()`.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.allocator.high_water_mark()
    }

    /// Every slot below the high-water mark, live or not.
    pub fn entities(&self) -> impl Iterator<Item = Entity> {
        (0..self.entity_count() as u32).map(Entity::new)
    }

    pub fn set_tags(&mut self, entity: Entity, tags: Tags) -> Result<(), EcsError> {
        let slot = self.slot(entity)?;
        self.tags[slot] = tags;
        Ok(())
    }

    pub fn enable_tags(&mut self, entity: Entity, tags: Tags) -> Result<(), EcsError> {
        let slot = self.slot(entity)?;
        self.tags[slot] |= tags;
        Ok(())
    }

    pub fn disable_tags(&mut self, entity: Entity, tags: Tags) -> Result<(), EcsError> {
        let slot = self.slot(entity)?;
        self.tags[slot] &= !tags;
        Ok(())
    }

    /// The box formed by `entity`'s position and dimension.
    pub fn aabb(&self, entity: Entity) -> Aabb {
        let position = self.components.positions[entity].value;
        let dimension = self.components.dimensions[entity];
        Aabb::from_position(position, dimension.width, dimension.height)
    }

    /// Allocate and fill an entity immediately. For stage population outside
    /// the system sweep.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityCapacityExceeded`] when the table is full.
    pub fn add_entity(&mut self, builder: &EntityBuilder) -> Result<Entity, EcsError> {
        let entity = self.allocate_entity()?;
        materialize(self, entity, builder);
        Ok(entity)
    }

    fn slot(&self, entity: Entity) -> Result<usize, EcsError> {
        if entity.index() >= self.config.capacity {
            return Err(EcsError::EntityOutOfRange {
                entity,
                capacity: self.config.capacity,
            });
        }
        Ok(entity.index())
    }

    // -- Deferred commands --

    /// Queue a command for the next [`apply_deferred`](Self::apply_deferred).
    pub fn defer(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn defer_set_tags(&mut self, entity: Entity, tags: Tags) {
        self.defer(Command::SetTags { entity, tags });
    }

    pub fn defer_set_component(&mut self, entity: Entity, component: impl Into<Component>) {
        self.defer(Command::SetComponent {
            entity,
            component: component.into(),
        });
    }

    pub fn defer_deallocate(&mut self, entity: Entity) {
        self.defer(Command::Deallocate { entity });
    }

    pub fn defer_enable_tags(&mut self, entity: Entity, tags: Tags) {
        self.defer(Command::EnableTags { entity, tags });
    }

    pub fn defer_disable_tags(&mut self, entity: Entity, tags: Tags) {
        self.defer(Command::DisableTags { entity, tags });
    }

    /// Allocate a slot now and queue its tags and components.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityCapacityExceeded`] when the table is full.
    pub fn defer_add_entity(&mut self, builder: &EntityBuilder) -> Result<Entity, EcsError> {
        let entity = self.allocate_entity()?;
        self.defer_set_tags(entity, builder.tags());
        for component in builder.components() {
            self.defer_set_component(entity, *component);
        }
        Ok(entity)
    }

    /// Allocate a slot now and queue `func` to run on it with `builder`,
    /// which is parked in the per-tick arena until then.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityCapacityExceeded`] when the table is full,
    /// or [`EcsError::ArenaExhausted`] when the payload does not fit. The
    /// slot is released again in the latter case.
    pub fn defer_callback(
        &mut self,
        func: DeferredFn,
        builder: EntityBuilder,
    ) -> Result<Entity, EcsError> {
        let entity = self.allocate_entity()?;
        let payload = match self.arena.alloc(builder) {
            Ok(payload) => payload,
            Err(error) => {
                self.deallocate_entity(entity);
                return Err(error);
            }
        };
        self.defer(Command::Callback {
            entity,
            func,
            payload,
        });
        Ok(entity)
    }

    /// Number of commands waiting for the next apply.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Apply every queued command in record order, then release the tick's
    /// payloads.
    ///
    /// Commands recorded by callbacks while applying are kept for the next
    /// call.
    pub fn apply_deferred(&mut self) -> ApplyReport {
        let mut queue = std::mem::take(&mut self.commands);
        let payloads = self.arena.rotate();
        let mut report = ApplyReport::default();

        while let Some(command) = queue.pop() {
            match self.apply_command(command, &payloads) {
                Ok(()) => report.applied += 1,
                Err(error) => {
                    warn!(entity = %command.entity(), error = %error, "deferred command failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn apply_command(
        &mut self,
        command: Command,
        payloads: &Arena<EntityBuilder>,
    ) -> Result<(), EcsError> {
        match command {
            Command::SetTags { entity, tags } => self.set_tags(entity, tags),
            Command::SetComponent { entity, component } => {
                self.slot(entity)?;
                self.components.set(entity, component);
                Ok(())
            }
            Command::Deallocate { entity } => {
                self.slot(entity)?;
                self.deallocate_entity(entity);
                Ok(())
            }
            Command::EnableTags { entity, tags } => self.enable_tags(entity, tags),
            Command::DisableTags { entity, tags } => self.disable_tags(entity, tags),
            Command::Callback {
                entity,
                func,
                payload,
            } => {
                self.slot(entity)?;
                let builder = payloads.get(payload).ok_or(EcsError::StalePayload)?;
                func(self, entity, builder);
                Ok(())
            }
        }
    }

    // -- Lifecycle --

    /// Forget every entity, command and payload so a stage can be rebuilt.
    /// The score, clock and random stream survive.
    pub fn clear(&mut self) {
        self.tags.fill(TAG_NONE);
        self.occupied.fill(false);
        self.allocator.reset();
        self.commands.clear();
        self.arena.flush();
        self.handles = SceneHandles::default();
        self.requests.clear();
        self.fog = FogState::default();
        debug!(capacity = self.config.capacity, "scene cleared");
    }

    /// BLAKE3 hex digest of every live entity's tags and simulation-relevant
    /// components plus the scene resources.
    pub fn state_hash(&self) -> String {
        #[derive(Serialize)]
        struct ColliderDigest {
            schema: ResolutionSchema,
            layer: Layer,
            mask: Layer,
        }

        #[derive(Serialize)]
        struct EntityDigest<'a> {
            entity: Entity,
            tags: Tags,
            identifier: Option<&'a CIdentifier>,
            position: Option<&'a CPosition>,
            dimension: Option<&'a CDimension>,
            animation: Option<&'a CAnimation>,
            kinetic: Option<&'a CKinetic>,
            collider: Option<ColliderDigest>,
            mortal: Option<&'a CMortal>,
            fleeting: Option<&'a CFleeting>,
            player: Option<&'a CPlayer>,
        }

        #[derive(Serialize)]
        struct SceneDigest<'a> {
            entity_count: usize,
            elapsed: f32,
            bounds: Aabb,
            score: &'a Score,
            requests: &'a StageRequests,
            fog: &'a FogState,
            entities: Vec<EntityDigest<'a>>,
        }

        let components = &self.components;
        let when = |entity: Entity, tag: Tags| self.has_components(entity, tag);

        let entities = self
            .entities()
            .filter(|&entity| self.tags(entity) != TAG_NONE)
            .map(|entity| EntityDigest {
                entity,
                tags: self.tags(entity),
                identifier: when(entity, TAG_IDENTIFIER).then(|| &components.identifiers[entity]),
                position: when(entity, TAG_POSITION).then(|| &components.positions[entity]),
                dimension: when(entity, TAG_DIMENSION).then(|| &components.dimensions[entity]),
                animation: when(entity, TAG_ANIMATION).then(|| &components.animations[entity]),
                kinetic: when(entity, TAG_KINETIC).then(|| &components.kinetics[entity]),
                collider: when(entity, TAG_COLLIDER).then(|| {
                    let collider = &components.colliders[entity];
                    ColliderDigest {
                        schema: collider.resolution_schema,
                        layer: collider.layer,
                        mask: collider.mask,
                    }
                }),
                mortal: when(entity, TAG_MORTAL).then(|| &components.mortals[entity]),
                fleeting: when(entity, TAG_FLEETING).then(|| &components.fleetings[entity]),
                player: when(entity, TAG_PLAYER).then(|| &components.players[entity]),
            })
            .collect();

        let digest = SceneDigest {
            entity_count: self.entity_count(),
            elapsed: self.elapsed,
            bounds: self.bounds,
            score: &self.score,
            requests: &self.requests,
            fog: &self.fog,
            entities,
        };

        // Plain numeric data has no failing serialization path.
        let bytes = serde_json::to_vec(&digest).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

/// Stock [`DeferredFn`]: write the builder's tags and components into
/// `entity`'s slot.
pub fn materialize(scene: &mut Scene, entity: Entity, builder: &EntityBuilder) {
    scene.tags[entity.index()] = builder.tags();
    for component in builder.components() {
        scene.components.set(entity, *component);
    }
}
