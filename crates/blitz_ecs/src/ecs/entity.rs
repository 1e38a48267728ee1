//! # Entity Handles
//!
//! Entities are lightweight handles consisting of:
//! - The identity of the store that issued them
//! - An index into the mask table and every component column
//!
//! A handle owns nothing. It stays valid while its index is below the
//! store's live count; a destroy issued elsewhere can move a different
//! entity into the slot, so ids must not be cached across destroys.

use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

/// Process-unique identity of a component store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StoreId(u32);

static NEXT_STORE_ID: AtomicU32 = AtomicU32::new(0);

impl StoreId {
    /// Allocates a fresh identity.
    pub(crate) fn next() -> Self {
        Self(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identity value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Display for StoreId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to an entity slot in a [`ComponentStore`](crate::ComponentStore).
///
/// `Copy` and two words wide; pass it by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    store: StoreId,
    id: usize,
}

impl Entity {
    #[inline]
    pub(crate) const fn new(store: StoreId, id: usize) -> Self {
        Self { store, id }
    }

    /// Index into the mask table and component columns.
    #[inline]
    #[must_use]
    pub const fn id(self) -> usize {
        self.id
    }

    /// The store that issued this handle.
    #[inline]
    #[must_use]
    pub const fn store(self) -> StoreId {
        self.store
    }
}
