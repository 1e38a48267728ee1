//! # Component Store
//!
//! The packed container for all entities and components of one schema.
//!
//! ```text
//! id:        0      1      2      3         <- live range 0..entity_count()
//! masks:   [1011] [1111] [0101] [1111] ...
//! col 0:   [ V0 ] [ V1 ] [ V2 ] [ V3 ] ...  <- contiguous, drawable as-is
//! col 1:   [ D0 ] [ D1 ] [ D2 ] [ D3 ] ...
//! ```
//!
//! Entities form a dense stack. `create` pushes on top; `destroy` moves the
//! top entity into the freed slot and pops, so every column stays gap-free.
//!
//! ## Error tiers
//!
//! - Hot tier (`get`, `get_mut`, `has`, `add`, `remove`, `create_with`,
//!   `entity`): no validation beyond `debug_assert!`.
//! - Checked tier (`destroy`, `reserve_extra`): validates and no-ops on bad
//!   input. Every `try_*` method validates and returns a [`StoreError`].

use std::fmt::{self, Debug, Formatter};
use std::mem::size_of;

use bytemuck::Pod;
use tracing::{debug, trace, warn};

use super::entity::{Entity, StoreId};
use super::mask::{ComponentSet, Mask, MaskTable};
use super::schema::{ColumnAt, Schema};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Packed, fixed-schema entity/component store.
///
/// # Type Parameters
///
/// * `S` - The schema, a tuple of component types; tuple position is the
///   component index
/// * `M` - The per-entity mask type (`u8`, `u16`, `u32` or `u64`), which
///   bounds the schema size
///
/// # Example
///
/// ```rust
/// use blitz_ecs::{ComponentSet, ComponentStore};
///
/// const POSITION: usize = 0;
/// const ALPHA: usize = 1;
///
/// let mut store: ComponentStore<([f32; 2], f64)> = ComponentStore::new();
///
/// let particle = store.create();
/// *store.get_mut::<ALPHA>(particle) = 255.0;
/// store.get_mut::<POSITION>(particle)[0] = 4.0;
///
/// assert!(store.has(particle, ComponentSet::of(&[POSITION, ALPHA])));
/// assert_eq!(store.column::<POSITION>(), &[[4.0, 0.0]]);
///
/// store.destroy(particle);
/// assert!(store.is_empty());
/// ```
pub struct ComponentStore<S: Schema, M: Mask = u64> {
    /// Identity stamped into every issued handle.
    id: StoreId,
    /// One mask per live entity.
    masks: MaskTable<M>,
    /// One column per component type, each `masks.len()` long.
    columns: S::Columns,
    /// Slots every column and the mask table can hold without reallocating.
    capacity: usize,
    /// Growth and clear policy.
    config: StoreConfig,
}

/// Store with 8 component slots per entity.
pub type Store8<S> = ComponentStore<S, u8>;
/// Store with 16 component slots per entity.
pub type Store16<S> = ComponentStore<S, u16>;
/// Store with 32 component slots per entity.
pub type Store32<S> = ComponentStore<S, u32>;
/// Store with 64 component slots per entity.
pub type Store64<S> = ComponentStore<S, u64>;

impl<S: Schema, M: Mask> ComponentStore<S, M> {
    /// Evaluated on construction; a schema wider than `M` fails to compile.
    const SCHEMA_FITS: () = assert!(
        S::LEN <= M::BITS as usize,
        "component schema is wider than the entity bitmask"
    );

    /// Every component of the schema.
    pub const ALL: ComponentSet = ComponentSet::first_n(S::LEN);

    /// Creates an empty store with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    /// Creates an empty store with room for `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(StoreConfig {
            initial_capacity: capacity,
            ..StoreConfig::default()
        })
    }

    /// Creates an empty store from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the config fails validation.
    pub fn with_config(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        let () = Self::SCHEMA_FITS;

        let mut store = Self {
            id: StoreId::next(),
            masks: MaskTable::new(),
            columns: S::Columns::default(),
            capacity: 0,
            config,
        };
        if config.initial_capacity > 0 {
            store.grow_to(config.initial_capacity);
        }
        store
    }

    /// Identity stamped into the handles this store issues.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> StoreId {
        self.id
    }

    /// The config this store was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Creates an entity with every component attached.
    ///
    /// Grows the store first if it is full. New column slots hold
    /// `Default::default()`.
    #[inline]
    pub fn create(&mut self) -> Entity {
        self.create_with(Self::ALL)
    }

    /// Creates an entity with the components in `set` attached.
    ///
    /// Indices outside the schema are ignored (and trip a debug assertion).
    #[inline]
    pub fn create_with(&mut self, set: ComponentSet) -> Entity {
        debug_assert!(
            set.is_subset_of(Self::ALL),
            "component set {set:?} exceeds a schema of {} components",
            S::LEN
        );

        if self.masks.len() == self.capacity {
            let target = self.config.growth.next_capacity(self.capacity);
            self.grow_to(target);
        }

        let id = self.masks.push(set.intersection(Self::ALL).to_mask());
        S::push_default(&mut self.columns);
        Entity::new(self.id, id)
    }

    /// Checked [`create_with`](Self::create_with).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentOutOfSchema`] if `set` names an index
    /// beyond the schema.
    pub fn try_create_with(&mut self, set: ComponentSet) -> StoreResult<Entity> {
        self.check_set(set)?;
        Ok(self.create_with(set))
    }

    /// Destroys an entity by moving the top entity into its slot.
    ///
    /// After the call, slot `entity.id()` holds the former top entity's mask
    /// and component values, and the live count is one lower. Ordering is not
    /// preserved.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if the handle was invalid
    /// (out of range or issued by another store), in which case nothing
    /// changes.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.is_valid(entity) {
            trace!(store = %self.id, id = entity.id(), "ignoring destroy of invalid handle");
            return false;
        }

        self.masks.swap_remove(entity.id());
        S::swap_remove(&mut self.columns, entity.id());

        debug_assert!(S::columns_have_len(&self.columns, self.masks.len()));
        true
    }

    /// Checked [`destroy`](Self::destroy).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignHandle`] or [`StoreError::InvalidHandle`].
    pub fn try_destroy(&mut self, entity: Entity) -> StoreResult<()> {
        self.validate(entity)?;
        self.destroy(entity);
        Ok(())
    }

    /// Destroys every entity the closure rejects, front to back.
    ///
    /// When an entity is destroyed the top entity moves into its slot and is
    /// visited next, so every live entity is visited exactly once. This is
    /// the per-frame particle update: decay, then drop the invisible ones.
    ///
    /// # Returns
    ///
    /// The number of destroyed entities.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(EntityMut<'_, S, M>) -> bool,
    {
        let mut destroyed = 0;
        let mut id = 0;

        while id < self.masks.len() {
            let entity = Entity::new(self.id, id);
            if keep(EntityMut { store: &mut *self, entity }) {
                id += 1;
            } else {
                self.masks.swap_remove(id);
                S::swap_remove(&mut self.columns, id);
                destroyed += 1;
            }
        }

        destroyed
    }

    /// Removes every entity.
    ///
    /// Capacity is kept unless [`StoreConfig::shrink_on_clear`] is set, in
    /// which case all allocations are released and capacity drops to zero.
    pub fn clear(&mut self) {
        self.masks.clear();
        S::clear(&mut self.columns);

        if self.config.shrink_on_clear && self.capacity > 0 {
            self.masks.shrink_to_fit();
            S::shrink_to_fit(&mut self.columns);
            debug!(store = %self.id, from = self.capacity, "released component store");
            self.capacity = 0;
        }
    }

    // =========================================================================
    // Capacity
    // =========================================================================

    /// Ensures `additional` more entities can be created without reallocation.
    ///
    /// A no-op if the spare capacity already covers `additional`; otherwise
    /// grows every column and the mask table to exactly
    /// `entity_count() + additional`. A request that overflows is ignored.
    pub fn reserve_extra(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve_extra(additional) {
            warn!(store = %self.id, %err, "reservation refused");
        }
    }

    /// Checked [`reserve_extra`](Self::reserve_extra).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityOverflow`] if the target size cannot be
    /// allocated.
    pub fn try_reserve_extra(&mut self, additional: usize) -> StoreResult<()> {
        let live_count = self.masks.len();
        if self.spare_capacity() >= additional {
            return Ok(());
        }

        let overflow = StoreError::CapacityOverflow {
            live_count,
            requested: additional,
        };
        let target = live_count.checked_add(additional).ok_or_else(|| overflow.clone())?;
        let bytes = target
            .checked_mul(Self::slot_bytes())
            .ok_or_else(|| overflow.clone())?;
        if bytes > isize::MAX.unsigned_abs() {
            return Err(overflow);
        }

        self.grow_to(target);
        Ok(())
    }

    fn grow_to(&mut self, target: usize) {
        let additional = target - self.masks.len();
        self.masks.reserve_exact(additional);
        S::reserve_exact(&mut self.columns, additional);

        debug!(store = %self.id, from = self.capacity, to = target, "grew component store");
        self.capacity = target;

        debug_assert!(self.masks.capacity() >= target);
        debug_assert!(S::min_capacity(&self.columns) >= target);
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.masks.len()
    }

    /// Slots available before the next growth.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// `capacity() - entity_count()`.
    #[inline]
    #[must_use]
    pub fn spare_capacity(&self) -> usize {
        self.capacity - self.masks.len()
    }

    /// Checks whether there are no live entities.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Number of component types in the schema.
    #[inline]
    #[must_use]
    pub const fn component_count(&self) -> usize {
        S::LEN
    }

    /// Bytes per entity slot: column data plus the mask.
    #[inline]
    #[must_use]
    pub const fn slot_bytes() -> usize {
        S::ROW_BYTES + size_of::<M>()
    }

    /// Bytes reserved for column data and masks.
    #[inline]
    #[must_use]
    pub const fn heap_bytes(&self) -> usize {
        self.capacity * Self::slot_bytes()
    }

    /// Bytes of column data and masks in use by live entities.
    #[inline]
    #[must_use]
    pub fn live_bytes(&self) -> usize {
        self.masks.len() * Self::slot_bytes()
    }

    // =========================================================================
    // Handles
    // =========================================================================

    /// Checks whether `entity` was issued here and is inside the live range.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        entity.store() == self.id && entity.id() < self.masks.len()
    }

    /// Explains why `entity` is not valid.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignHandle`] or [`StoreError::InvalidHandle`].
    pub fn validate(&self, entity: Entity) -> StoreResult<()> {
        let result = if entity.store() != self.id {
            Err(StoreError::ForeignHandle {
                expected: self.id,
                found: entity.store(),
            })
        } else if entity.id() >= self.masks.len() {
            Err(StoreError::InvalidHandle {
                id: entity.id(),
                live_count: self.masks.len(),
            })
        } else {
            Ok(())
        };

        if let Err(err) = &result {
            trace!(store = %self.id, %err, "rejected entity handle");
        }
        result
    }

    fn check_set(&self, set: ComponentSet) -> StoreResult<()> {
        if set.is_subset_of(Self::ALL) {
            Ok(())
        } else {
            trace!(store = %self.id, ?set, "rejected component set");
            Err(StoreError::ComponentOutOfSchema {
                set,
                schema_len: S::LEN,
            })
        }
    }

    /// Handle for the entity at `id`, without validation.
    #[inline]
    #[must_use]
    pub fn entity(&self, id: usize) -> Entity {
        debug_assert!(id < self.masks.len(), "entity id {id} out of range");
        Entity::new(self.id, id)
    }

    /// Checked [`entity`](Self::entity).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidHandle`] if `id` is not live.
    pub fn try_entity(&self, id: usize) -> StoreResult<Entity> {
        let entity = Entity::new(self.id, id);
        self.validate(entity)?;
        Ok(entity)
    }

    /// Handles for the current live range, `0..entity_count()`.
    ///
    /// The iterator does not borrow the store; handles it yields after a
    /// destroy may be out of range.
    pub fn handles(&self) -> impl Iterator<Item = Entity> {
        let store = self.id;
        (0..self.masks.len()).map(move |id| Entity::new(store, id))
    }

    /// Borrowed view of one entity, for several accesses in a row.
    #[inline]
    pub fn entity_mut(&mut self, entity: Entity) -> EntityMut<'_, S, M> {
        debug_assert!(self.is_valid(entity), "stale or foreign entity handle {entity:?}");
        EntityMut {
            store: self,
            entity,
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Component `K` of an entity. No membership or handle check.
    ///
    /// # Panics
    ///
    /// Panics if the id is out of range (debug builds also reject foreign
    /// handles).
    #[inline]
    #[must_use]
    pub fn get<const K: usize>(&self, entity: Entity) -> &<S as ColumnAt<K>>::Component
    where
        S: ColumnAt<K>,
    {
        debug_assert!(self.is_valid(entity), "stale or foreign entity handle {entity:?}");
        &<S as ColumnAt<K>>::column(&self.columns)[entity.id()]
    }

    /// Mutable component `K` of an entity. No membership or handle check.
    ///
    /// # Panics
    ///
    /// Panics if the id is out of range (debug builds also reject foreign
    /// handles).
    #[inline]
    pub fn get_mut<const K: usize>(&mut self, entity: Entity) -> &mut <S as ColumnAt<K>>::Component
    where
        S: ColumnAt<K>,
    {
        debug_assert!(self.is_valid(entity), "stale or foreign entity handle {entity:?}");
        &mut <S as ColumnAt<K>>::column_mut(&mut self.columns)[entity.id()]
    }

    /// Checked [`get`](Self::get): validates the handle and the component bit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignHandle`], [`StoreError::InvalidHandle`]
    /// or [`StoreError::MissingComponent`].
    pub fn try_get<const K: usize>(&self, entity: Entity) -> StoreResult<&<S as ColumnAt<K>>::Component>
    where
        S: ColumnAt<K>,
    {
        self.check_component::<K>(entity)?;
        Ok(&<S as ColumnAt<K>>::column(&self.columns)[entity.id()])
    }

    /// Checked [`get_mut`](Self::get_mut).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignHandle`], [`StoreError::InvalidHandle`]
    /// or [`StoreError::MissingComponent`].
    pub fn try_get_mut<const K: usize>(
        &mut self,
        entity: Entity,
    ) -> StoreResult<&mut <S as ColumnAt<K>>::Component>
    where
        S: ColumnAt<K>,
    {
        self.check_component::<K>(entity)?;
        Ok(&mut <S as ColumnAt<K>>::column_mut(&mut self.columns)[entity.id()])
    }

    fn check_component<const K: usize>(&self, entity: Entity) -> StoreResult<()> {
        self.validate(entity)?;
        if self.masks.contains_all(entity.id(), ComponentSet::single(K)) {
            Ok(())
        } else {
            Err(StoreError::MissingComponent {
                id: entity.id(),
                component: K,
            })
        }
    }

    /// Column `K` for the live range, indexed by entity id.
    ///
    /// Slots of entities without component `K` hold stale or default values.
    #[inline]
    #[must_use]
    pub fn column<const K: usize>(&self) -> &[<S as ColumnAt<K>>::Component]
    where
        S: ColumnAt<K>,
    {
        <S as ColumnAt<K>>::column(&self.columns)
    }

    /// Mutable column `K` for the live range.
    #[inline]
    pub fn column_mut<const K: usize>(&mut self) -> &mut [<S as ColumnAt<K>>::Component]
    where
        S: ColumnAt<K>,
    {
        <S as ColumnAt<K>>::column_mut(&mut self.columns)
    }

    /// Column `K` as raw bytes, ready for a vertex buffer upload.
    #[inline]
    #[must_use]
    pub fn column_bytes<const K: usize>(&self) -> &[u8]
    where
        S: ColumnAt<K>,
        <S as ColumnAt<K>>::Component: Pod,
    {
        bytemuck::cast_slice(self.column::<K>())
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Checks whether the entity has every component in `set`.
    ///
    /// Indices outside the schema are never attached, so a set naming one
    /// answers `false`.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: Entity, set: ComponentSet) -> bool {
        debug_assert!(self.is_valid(entity), "stale or foreign entity handle {entity:?}");
        self.masks.contains_all(entity.id(), set)
    }

    /// Checks whether the entity has component `K`.
    #[inline]
    #[must_use]
    pub fn has_component<const K: usize>(&self, entity: Entity) -> bool
    where
        S: ColumnAt<K>,
    {
        self.has(entity, ComponentSet::single(K))
    }

    /// Attaches the components in `set`. Column values are left untouched.
    #[inline]
    pub fn add(&mut self, entity: Entity, set: ComponentSet) {
        debug_assert!(self.is_valid(entity), "stale or foreign entity handle {entity:?}");
        debug_assert!(set.is_subset_of(Self::ALL), "component set {set:?} exceeds the schema");
        self.masks.insert_bits(entity.id(), set.intersection(Self::ALL));
    }

    /// Detaches the components in `set`. Column values are left untouched.
    #[inline]
    pub fn remove(&mut self, entity: Entity, set: ComponentSet) {
        debug_assert!(self.is_valid(entity), "stale or foreign entity handle {entity:?}");
        debug_assert!(set.is_subset_of(Self::ALL), "component set {set:?} exceeds the schema");
        self.masks.clear_bits(entity.id(), set.intersection(Self::ALL));
    }

    /// Attaches component `K`.
    #[inline]
    pub fn add_component<const K: usize>(&mut self, entity: Entity)
    where
        S: ColumnAt<K>,
    {
        self.add(entity, ComponentSet::single(K));
    }

    /// Detaches component `K`.
    #[inline]
    pub fn remove_component<const K: usize>(&mut self, entity: Entity)
    where
        S: ColumnAt<K>,
    {
        self.remove(entity, ComponentSet::single(K));
    }

    /// Checked [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignHandle`], [`StoreError::InvalidHandle`]
    /// or [`StoreError::ComponentOutOfSchema`].
    pub fn try_add(&mut self, entity: Entity, set: ComponentSet) -> StoreResult<()> {
        self.validate(entity)?;
        self.check_set(set)?;
        self.masks.insert_bits(entity.id(), set);
        Ok(())
    }

    /// Checked [`remove`](Self::remove).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignHandle`], [`StoreError::InvalidHandle`]
    /// or [`StoreError::ComponentOutOfSchema`].
    pub fn try_remove(&mut self, entity: Entity, set: ComponentSet) -> StoreResult<()> {
        self.validate(entity)?;
        self.check_set(set)?;
        self.masks.clear_bits(entity.id(), set);
        Ok(())
    }

    /// Raw mask of an entity.
    #[inline]
    #[must_use]
    pub fn mask(&self, entity: Entity) -> M {
        debug_assert!(self.is_valid(entity), "stale or foreign entity handle {entity:?}");
        self.masks.as_slice()[entity.id()]
    }

    /// Components attached to an entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignHandle`] or [`StoreError::InvalidHandle`].
    pub fn try_components(&self, entity: Entity) -> StoreResult<ComponentSet> {
        self.validate(entity)?;
        Ok(ComponentSet::from_mask(self.masks.as_slice()[entity.id()]))
    }

    /// All masks, indexed by entity id.
    #[inline]
    #[must_use]
    pub fn masks(&self) -> &[M] {
        self.masks.as_slice()
    }

    /// All masks as raw bytes, for snapshotting alongside the columns.
    #[inline]
    #[must_use]
    pub fn masks_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.masks.as_slice())
    }

    /// Number of live entities holding every component in `set`.
    #[must_use]
    pub fn count_with(&self, set: ComponentSet) -> usize {
        self.masks.count_with(set)
    }
}

impl<S: Schema, M: Mask> Default for ComponentStore<S, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema, M: Mask> Debug for ComponentStore<S, M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore")
            .field("id", &self.id)
            .field("entities", &self.masks.len())
            .field("capacity", &self.capacity)
            .field("components", &S::LEN)
            .field("mask_bits", &M::BITS)
            .finish()
    }
}

/// Mutable view of one live entity.
///
/// Mirrors the store's hot-tier accessors without repeating the handle.
pub struct EntityMut<'a, S: Schema, M: Mask = u64> {
    store: &'a mut ComponentStore<S, M>,
    entity: Entity,
}

impl<S: Schema, M: Mask> EntityMut<'_, S, M> {
    /// The viewed entity's handle.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> Entity {
        self.entity
    }

    /// The viewed entity's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> usize {
        self.entity.id()
    }

    /// Raw mask.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> M {
        self.store.mask(self.entity)
    }

    /// Attached components.
    #[inline]
    #[must_use]
    pub fn components(&self) -> ComponentSet {
        ComponentSet::from_mask(self.mask())
    }

    /// Component `K`.
    #[inline]
    #[must_use]
    pub fn get<const K: usize>(&self) -> &<S as ColumnAt<K>>::Component
    where
        S: ColumnAt<K>,
    {
        self.store.get::<K>(self.entity)
    }

    /// Mutable component `K`.
    #[inline]
    pub fn get_mut<const K: usize>(&mut self) -> &mut <S as ColumnAt<K>>::Component
    where
        S: ColumnAt<K>,
    {
        self.store.get_mut::<K>(self.entity)
    }

    /// Checks whether every component in `set` is attached.
    #[inline]
    #[must_use]
    pub fn has(&self, set: ComponentSet) -> bool {
        self.store.has(self.entity, set)
    }

    /// Attaches the components in `set`.
    #[inline]
    pub fn add(&mut self, set: ComponentSet) {
        self.store.add(self.entity, set);
    }

    /// Detaches the components in `set`.
    #[inline]
    pub fn remove(&mut self, set: ComponentSet) {
        self.store.remove(self.entity, set);
    }
}

impl<S: Schema, M: Mask> Debug for EntityMut<'_, S, M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMut")
            .field("entity", &self.entity)
            .field("components", &self.components())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrowthPolicy;

    const VERTEX: usize = 0;
    const DALPHA: usize = 1;
    const ALPHA: usize = 2;
    const VELOCITY: usize = 3;

    /// Vertex position, fade rate, alpha, velocity.
    type Particle = ([f32; 2], f64, f64, [f32; 2]);

    #[test]
    fn test_store_creation() {
        let store: ComponentStore<Particle> = ComponentStore::new();
        assert_eq!(store.entity_count(), 0);
        assert_eq!(store.capacity(), 0);
        assert_eq!(store.component_count(), 4);
        assert!(store.is_empty());

        let store: ComponentStore<Particle> = ComponentStore::with_capacity(100);
        assert_eq!(store.capacity(), 100);
        assert_eq!(store.spare_capacity(), 100);
    }

    #[test]
    fn test_create_attaches_everything() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let e = store.create();

        assert_eq!(e.id(), 0);
        assert_eq!(e.store(), store.id());
        assert_eq!(store.entity_count(), 1);
        assert!(store.has(e, ComponentStore::<Particle>::ALL));
        assert_eq!(store.mask(e), 0b1111);
        assert_eq!(*store.get::<ALPHA>(e), 0.0);
    }

    #[test]
    fn test_create_with_subset() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let e = store.create_with(ComponentSet::of(&[0, 2]));

        assert!(store.has_component::<0>(e));
        assert!(!store.has_component::<1>(e));
        assert!(store.has_component::<2>(e));
        assert!(!store.has_component::<3>(e));
        assert!(store.has(e, ComponentSet::of(&[0, 2])));
        assert!(!store.has(e, ComponentSet::of(&[0, 1])));
    }

    #[test]
    fn test_swap_remove_scenario() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let ids: Vec<Entity> = (0..3).map(|_| store.create()).collect();
        assert_eq!(ids.iter().map(|e| e.id()).collect::<Vec<_>>(), vec![0, 1, 2]);

        for (e, x) in ids.iter().zip([1.0, 2.0, 3.0]) {
            *store.get_mut::<VERTEX>(*e) = [x, -x];
            *store.get_mut::<ALPHA>(*e) = f64::from(x) * 10.0;
        }
        store.remove_component::<VELOCITY>(ids[2]);

        assert!(store.destroy(ids[0]));

        assert_eq!(store.entity_count(), 2);
        assert_eq!(store.column::<VERTEX>(), &[[3.0, -3.0], [2.0, -2.0]]);
        assert_eq!(store.column::<ALPHA>(), &[30.0, 20.0]);
        // Mask moved along with the values
        assert!(!store.has_component::<VELOCITY>(ids[0]));
        assert!(store.has_component::<VELOCITY>(ids[1]));
    }

    #[test]
    fn test_destroy_top() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let a = store.create();
        let b = store.create();
        *store.get_mut::<DALPHA>(a) = 1.5;

        assert!(store.destroy(b));
        assert_eq!(store.entity_count(), 1);
        assert_eq!(*store.get::<DALPHA>(a), 1.5);
        assert!(!store.is_valid(b));
    }

    #[test]
    fn test_destroy_invalid_is_noop() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let e = store.create();
        assert!(store.destroy(e));

        // Stale: id 0 is no longer live
        assert!(!store.destroy(e));
        assert_eq!(store.entity_count(), 0);

        let mut other: ComponentStore<Particle> = ComponentStore::new();
        let foreign = other.create();
        store.create();
        assert!(!store.destroy(foreign));
        assert_eq!(store.entity_count(), 1);
    }

    #[test]
    fn test_membership_roundtrip() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let e = store.create_with(ComponentSet::single(VERTEX));

        store.add(e, ComponentSet::of(&[ALPHA, VELOCITY]));
        assert!(store.has(e, ComponentSet::of(&[VERTEX, ALPHA, VELOCITY])));
        assert!(!store.has_component::<DALPHA>(e));

        store.remove(e, ComponentSet::single(ALPHA));
        assert!(!store.has_component::<ALPHA>(e));
        assert!(store.has(e, ComponentSet::of(&[VERTEX, VELOCITY])));

        store.add_component::<DALPHA>(e);
        store.remove_component::<VERTEX>(e);
        assert_eq!(store.try_components(e), Ok(ComponentSet::of(&[DALPHA, VELOCITY])));
    }

    #[test]
    fn test_remove_keeps_column_value() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let e = store.create();
        *store.get_mut::<ALPHA>(e) = 42.0;

        store.remove_component::<ALPHA>(e);
        assert_eq!(*store.get::<ALPHA>(e), 42.0);
        assert_eq!(
            store.try_get::<ALPHA>(e),
            Err(StoreError::MissingComponent { id: 0, component: ALPHA })
        );
    }

    #[test]
    fn test_reserve_extra_no_reallocation() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        store.reserve_extra(5);
        let capacity = store.capacity();
        assert!(capacity >= 5);

        let first = store.create();
        let base = store.column::<VERTEX>().as_ptr();
        for _ in 1..5 {
            store.create();
        }

        assert_eq!(store.capacity(), capacity);
        assert_eq!(store.column::<VERTEX>().as_ptr(), base);
        assert_eq!(store.entity_count(), 5);
        assert!(store.is_valid(first));
    }

    #[test]
    fn test_reserve_extra_monotonic() {
        let mut store: ComponentStore<Particle> = ComponentStore::with_capacity(10);
        for _ in 0..4 {
            store.create();
        }

        store.reserve_extra(3);
        assert_eq!(store.capacity(), 10);

        store.reserve_extra(20);
        assert_eq!(store.capacity(), 24);
        assert!(store.capacity() - store.entity_count() >= 20);

        store.reserve_extra(0);
        assert_eq!(store.capacity(), 24);
    }

    #[test]
    fn test_reserve_overflow_is_refused() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        store.create();

        let err = store.try_reserve_extra(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            StoreError::CapacityOverflow { live_count: 1, requested: usize::MAX }
        );
        assert!(store.try_reserve_extra(usize::MAX / 2).is_err());

        let capacity = store.capacity();
        store.reserve_extra(usize::MAX);
        assert_eq!(store.capacity(), capacity);
    }

    #[test]
    fn test_doubling_growth() {
        let mut store: ComponentStore<(u32,)> = ComponentStore::new();
        store.create();
        assert_eq!(store.capacity(), crate::config::MIN_DOUBLING_CAPACITY);

        for _ in 0..crate::config::MIN_DOUBLING_CAPACITY {
            store.create();
        }
        assert_eq!(store.capacity(), 2 * crate::config::MIN_DOUBLING_CAPACITY);
    }

    #[test]
    fn test_increment_growth() {
        let config = StoreConfig {
            initial_capacity: 4,
            growth: GrowthPolicy::Increment { step: 3 },
            ..StoreConfig::default()
        };
        let mut store: ComponentStore<(u32,)> = ComponentStore::with_config(config).unwrap();
        assert_eq!(store.capacity(), 4);

        for _ in 0..5 {
            store.create();
        }
        assert_eq!(store.capacity(), 7);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StoreConfig {
            growth: GrowthPolicy::Increment { step: 0 },
            ..StoreConfig::default()
        };
        assert!(ComponentStore::<Particle>::with_config(config).is_err());
    }

    #[test]
    fn test_clear_idempotent_keeps_capacity() {
        let mut store: ComponentStore<Particle> = ComponentStore::with_capacity(32);
        for _ in 0..10 {
            store.create();
        }

        store.clear();
        assert_eq!(store.entity_count(), 0);
        assert!(store.is_empty());
        assert_eq!(store.column::<VERTEX>().len(), 0);

        store.clear();
        assert_eq!(store.entity_count(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 32);
    }

    #[test]
    fn test_clear_shrink_policy() {
        let config = StoreConfig {
            initial_capacity: 32,
            shrink_on_clear: true,
            ..StoreConfig::default()
        };
        let mut store: ComponentStore<Particle> = ComponentStore::with_config(config).unwrap();
        store.create();

        store.clear();
        assert_eq!(store.capacity(), 0);
        assert!(store.is_empty());

        let e = store.create();
        assert_eq!(e.id(), 0);
        assert!(store.capacity() > 0);
    }

    #[test]
    fn test_checked_tier() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let e = store.create_with(ComponentSet::single(VERTEX));

        assert!(store.try_get::<VERTEX>(e).is_ok());
        *store.try_get_mut::<VERTEX>(e).unwrap() = [1.0, 1.0];
        assert_eq!(*store.get::<VERTEX>(e), [1.0, 1.0]);

        assert_eq!(
            store.try_create_with(ComponentSet::single(4)),
            Err(StoreError::ComponentOutOfSchema {
                set: ComponentSet::single(4),
                schema_len: 4,
            })
        );
        assert_eq!(store.entity_count(), 1);

        assert!(store.try_add(e, ComponentSet::single(9)).is_err());
        assert!(store.try_add(e, ComponentSet::single(ALPHA)).is_ok());
        assert!(store.try_remove(e, ComponentSet::single(VERTEX)).is_ok());
        assert_eq!(store.try_components(e), Ok(ComponentSet::single(ALPHA)));

        assert_eq!(
            store.try_entity(3),
            Err(StoreError::InvalidHandle { id: 3, live_count: 1 })
        );

        store.try_destroy(e).unwrap();
        assert_eq!(
            store.try_destroy(e),
            Err(StoreError::InvalidHandle { id: 0, live_count: 0 })
        );
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut a: ComponentStore<Particle> = ComponentStore::new();
        let mut b: ComponentStore<Particle> = ComponentStore::new();
        a.create();
        let from_b = b.create();

        assert!(!a.is_valid(from_b));
        assert_eq!(
            a.validate(from_b),
            Err(StoreError::ForeignHandle { expected: a.id(), found: b.id() })
        );
        assert!(a.try_get::<ALPHA>(from_b).is_err());
    }

    #[test]
    #[should_panic]
    fn test_unchecked_get_on_dead_slot_panics() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let e = store.create();
        store.destroy(e);
        let _ = store.get::<ALPHA>(e);
    }

    #[test]
    fn test_entity_view() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        store.create();
        let e = store.entity(0);

        let mut view = store.entity_mut(e);
        *view.get_mut::<ALPHA>() = 255.0;
        view.remove(ComponentSet::single(DALPHA));
        assert_eq!(view.id(), 0);
        assert_eq!(view.handle(), e);
        assert!(!view.has(ComponentSet::single(DALPHA)));
        assert_eq!(view.components(), ComponentSet::of(&[VERTEX, ALPHA, VELOCITY]));
        assert_eq!(*view.get::<ALPHA>(), 255.0);
        view.add(ComponentSet::single(DALPHA));
        assert_eq!(view.mask(), 0b1111);
    }

    #[test]
    fn test_retain_visits_swapped_entities() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        for alpha in [0.0, 10.0, -1.0, 0.0, 5.0] {
            let e = store.create();
            *store.get_mut::<ALPHA>(e) = alpha;
        }

        let destroyed = store.retain(|p| *p.get::<ALPHA>() > 0.0);

        assert_eq!(destroyed, 3);
        assert_eq!(store.entity_count(), 2);
        let mut alive = store.column::<ALPHA>().to_vec();
        alive.sort_by(f64::total_cmp);
        assert_eq!(alive, vec![5.0, 10.0]);
    }

    #[test]
    fn test_column_bytes_and_accounting() {
        let mut store: ComponentStore<Particle, u8> = ComponentStore::with_capacity(8);
        for _ in 0..3 {
            store.create();
        }

        assert_eq!(store.column_bytes::<VERTEX>().len(), 3 * 8);
        assert_eq!(store.column_bytes::<ALPHA>().len(), 3 * 8);

        let slot = 8 + 8 + 8 + 8 + 1;
        assert_eq!(ComponentStore::<Particle, u8>::slot_bytes(), slot);
        assert_eq!(store.heap_bytes(), 8 * slot);
        assert_eq!(store.live_bytes(), 3 * slot);
    }

    #[test]
    fn test_narrow_mask_full_schema() {
        type Eight = (u8, u8, u8, u8, u8, u8, u8, u8);
        let mut store: Store8<Eight> = Store8::new();
        let e = store.create();
        assert_eq!(store.mask(e), u8::MAX);

        store.remove_component::<7>(e);
        assert_eq!(store.mask(e), 0b0111_1111);
        assert_eq!(store.count_with(ComponentSet::single(7)), 0);
        assert_eq!(store.count_with(ComponentSet::single(6)), 1);
    }

    #[test]
    fn test_handles_cover_live_range() {
        let mut store: Store16<(u16, u16)> = Store16::new();
        for _ in 0..4 {
            store.create();
        }
        let ids: Vec<usize> = store.handles().map(Entity::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(store.handles().all(|e| store.is_valid(e)));
        assert_eq!(store.masks().len(), 4);
    }

    #[test]
    fn test_has_beyond_mask_width() {
        let mut store: Store8<(u8, u8, u8, u8)> = Store8::new();
        let e = store.create_with(ComponentSet::single(0));

        assert!(store.has(e, ComponentSet::single(0)));
        assert!(!store.has(e, ComponentSet::single(9)));
        assert!(!store.has(e, ComponentSet::of(&[0, 9])));
        assert!(!store.has(e, ComponentSet::single(63)));
        assert_eq!(store.count_with(ComponentSet::single(9)), 0);
        assert_eq!(store.count_with(ComponentSet::of(&[0, 9])), 0);
        assert_eq!(store.count_with(ComponentSet::single(0)), 1);
    }

    #[test]
    fn test_has_beyond_schema() {
        let mut store: Store64<Particle> = Store64::new();
        let e = store.create();

        assert!(store.has(e, ComponentStore::<Particle>::ALL));
        assert!(!store.has(e, ComponentSet::single(4)));
        assert!(!store.has(e, ComponentSet::of(&[VERTEX, 40])));
        assert!(!store.entity_mut(e).has(ComponentSet::single(5)));
        assert_eq!(store.count_with(ComponentSet::single(4)), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeds the schema")]
    fn test_remove_out_of_schema_asserts() {
        let mut store: ComponentStore<Particle> = ComponentStore::new();
        let e = store.create();
        store.remove(e, ComponentSet::single(6));
    }

    #[test]
    fn test_masks_bytes() {
        let mut store: Store16<(u8, u8, u8)> = Store16::new();
        store.create();
        let e = store.create_with(ComponentSet::single(1));

        let bytes = store.masks_bytes();
        assert_eq!(bytes.len(), 2 * 2);
        assert_eq!(bytemuck::cast_slice::<u8, u16>(bytes), &[0b111, 0b010]);
        assert_eq!(u16::from_ne_bytes([bytes[2], bytes[3]]), store.mask(e));
    }

    #[test]
    fn test_debug_output() {
        let store: Store32<(u8,)> = Store32::with_capacity(2);
        let text = format!("{store:?}");
        assert!(text.starts_with("ComponentStore"));
        assert!(text.contains("capacity: 2"));
        assert!(text.contains("mask_bits: 32"));
    }
}
