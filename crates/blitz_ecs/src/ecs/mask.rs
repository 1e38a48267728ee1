//! # Bitmask Registry
//!
//! Membership tracking for the component store.
//!
//! Every live entity owns one fixed-width mask. Bit `k` set means component
//! `k` of the schema is attached. The mask width bounds the schema size:
//!
//! ```text
//! u8  ->  8 components    (Store8)
//! u16 -> 16 components    (Store16)
//! u32 -> 32 components    (Store32)
//! u64 -> 64 components    (Store64, default)
//! ```
//!
//! Requests name components through [`ComponentSet`], a width-independent
//! 64-bit set that can be built in `const` context and is narrowed to the
//! store's mask type on use.

use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;
use std::ops::{BitAnd, BitOr, Not};

use bytemuck::Pod;

/// Fixed-width integer used as a per-entity component bitmask.
///
/// Implemented for `u8`, `u16`, `u32` and `u64`.
pub trait Mask:
    Copy
    + Eq
    + Hash
    + Default
    + Debug
    + Pod
    + Send
    + Sync
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + 'static
{
    /// Number of component slots this mask can describe.
    const BITS: u32;

    /// Mask with no component attached.
    const EMPTY: Self;

    /// Narrows a 64-bit component set to this width, dropping high bits.
    fn from_bits(bits: u64) -> Self;

    /// Widens this mask to 64 bits.
    fn to_bits(self) -> u64;

    /// Number of attached components.
    #[inline]
    fn count(self) -> u32 {
        self.to_bits().count_ones()
    }
}

macro_rules! impl_mask {
    ($($t:ty),+ $(,)?) => {
        $(
            impl Mask for $t {
                const BITS: u32 = <$t>::BITS;
                const EMPTY: Self = 0;

                #[inline]
                #[allow(clippy::cast_possible_truncation)]
                fn from_bits(bits: u64) -> Self {
                    bits as $t
                }

                #[inline]
                fn to_bits(self) -> u64 {
                    u64::from(self)
                }
            }
        )+
    };
}

impl_mask!(u8, u16, u32, u64);

/// A set of component indices (0-63).
///
/// All constructors are `const fn`, so a set can be named once next to the
/// component indices and reused in hot loops:
///
/// ```rust
/// use blitz_ecs::ComponentSet;
///
/// const VERTEX: usize = 0;
/// const VELOCITY: usize = 3;
/// const MOVING: ComponentSet = ComponentSet::of(&[VERTEX, VELOCITY]);
///
/// assert!(MOVING.contains(VELOCITY));
/// assert_eq!(MOVING.len(), 2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct ComponentSet(u64);

impl ComponentSet {
    /// Maximum number of component indices a set can hold.
    pub const CAPACITY: usize = 64;

    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Creates a set from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Creates a set holding one component index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 64` (a compile error in const context).
    #[inline]
    #[must_use]
    pub const fn single(index: usize) -> Self {
        assert!(index < Self::CAPACITY, "component index out of range");
        Self(1u64 << index)
    }

    /// Creates a set from a list of component indices.
    ///
    /// # Panics
    ///
    /// Panics if any index is `>= 64`.
    #[must_use]
    pub const fn of(indices: &[usize]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < indices.len() {
            bits |= Self::single(indices[i]).0;
            i += 1;
        }
        Self(bits)
    }

    /// The set `{0, 1, .., n - 1}`, i.e. every component of an `n`-wide schema.
    ///
    /// # Panics
    ///
    /// Panics if `n > 64`.
    #[inline]
    #[must_use]
    pub const fn first_n(n: usize) -> Self {
        assert!(n <= Self::CAPACITY, "component count out of range");
        if n == Self::CAPACITY {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    /// Returns this set with `index` added.
    #[inline]
    #[must_use]
    pub const fn with(self, index: usize) -> Self {
        Self(self.0 | Self::single(index).0)
    }

    /// Returns this set with `index` removed.
    #[inline]
    #[must_use]
    pub const fn without(self, index: usize) -> Self {
        Self(self.0 & !Self::single(index).0)
    }

    /// Set union.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set intersection.
    #[inline]
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Components in `self` but not in `other`.
    #[inline]
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Checks whether `index` is in the set. Indices `>= 64` are never present.
    #[inline]
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index < Self::CAPACITY && (self.0 >> index) & 1 == 1
    }

    /// Checks whether every index of `self` is also in `other`.
    #[inline]
    #[must_use]
    pub const fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Number of indices in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Checks whether the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Narrows the set to a store mask.
    #[inline]
    #[must_use]
    pub fn to_mask<M: Mask>(self) -> M {
        M::from_bits(self.0)
    }

    /// Widens a store mask back into a set.
    #[inline]
    #[must_use]
    pub fn from_mask<M: Mask>(mask: M) -> Self {
        Self(mask.to_bits())
    }

    /// Iterates the component indices in ascending order.
    #[inline]
    pub fn iter(self) -> ComponentSetIter {
        ComponentSetIter { bits: self.0 }
    }
}

impl Debug for ComponentSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOr for ComponentSet {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitAnd for ComponentSet {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl IntoIterator for ComponentSet {
    type Item = usize;
    type IntoIter = ComponentSetIter;

    fn into_iter(self) -> ComponentSetIter {
        self.iter()
    }
}

impl FromIterator<usize> for ComponentSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Iterator over the indices of a [`ComponentSet`].
///
/// Uses `trailing_zeros` to skip clear bits.
#[derive(Clone, Debug)]
pub struct ComponentSetIter {
    bits: u64,
}

impl Iterator for ComponentSetIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            return None;
        }
        let index = self.bits.trailing_zeros() as usize;
        // Clear lowest set bit
        self.bits &= self.bits - 1;
        Some(index)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for ComponentSetIter {}

/// Dense table of entity masks, parallel to the component columns.
///
/// Slot `i` is the mask of the entity with id `i`. The table only ever grows
/// at the top and shrinks by swap-remove, so it never contains gaps.
pub struct MaskTable<M: Mask> {
    masks: Vec<M>,
}

impl<M: Mask> MaskTable<M> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { masks: Vec::new() }
    }

    /// Number of masks (live entities).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Checks whether the table is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Allocated slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.masks.capacity()
    }

    /// Appends a mask at the top, returning its index.
    #[inline]
    pub fn push(&mut self, mask: M) -> usize {
        let index = self.masks.len();
        self.masks.push(mask);
        index
    }

    /// Moves the top mask into `index` and drops the top slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn swap_remove(&mut self, index: usize) -> M {
        self.masks.swap_remove(index)
    }

    /// Returns the mask at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<M> {
        self.masks.get(index).copied()
    }

    /// Sets every bit of `set` on the mask at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn insert_bits(&mut self, index: usize, set: ComponentSet) {
        let mask = &mut self.masks[index];
        *mask = *mask | set.to_mask::<M>();
    }

    /// Clears every bit of `set` on the mask at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn clear_bits(&mut self, index: usize, set: ComponentSet) {
        let mask = &mut self.masks[index];
        *mask = *mask & !set.to_mask::<M>();
    }

    /// Checks whether the mask at `index` holds every bit of `set`.
    ///
    /// Compared at full width: an index the mask cannot hold is never held.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn contains_all(&self, index: usize, set: ComponentSet) -> bool {
        set.is_subset_of(ComponentSet::from_mask(self.masks[index]))
    }

    /// Number of entities whose mask holds every bit of `set`.
    #[must_use]
    pub fn count_with(&self, set: ComponentSet) -> usize {
        self.masks
            .iter()
            .filter(|&&m| set.is_subset_of(ComponentSet::from_mask(m)))
            .count()
    }

    /// All masks, indexed by entity id.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[M] {
        &self.masks
    }

    /// Ensures room for `additional` more masks without reallocation.
    #[inline]
    pub fn reserve_exact(&mut self, additional: usize) {
        self.masks.reserve_exact(additional);
    }

    /// Drops every mask, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.masks.clear();
    }

    /// Releases unused allocation.
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.masks.shrink_to_fit();
    }
}

impl<M: Mask> Default for MaskTable<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Mask> Debug for MaskTable<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.masks.iter().map(|&m| ComponentSet::from_mask(m)))
            .finish()
    }
}
