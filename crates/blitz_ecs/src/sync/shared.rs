//! # Shared Component Store
//!
//! Lock-guarded store for the update/render split.
//!
//! ```text
//!   Update thread                    Render thread
//!   ─────────────                    ─────────────
//!   write()  create/retain/...       read()  column_bytes::<VERTEX>()
//!   end_frame() ──── frame N+1 ────► frame_count() says what it drew
//! ```
//!
//! The store itself has no internal synchronization; this wrapper is the
//! host's. Readers share the lock, the writer holds it exclusively.

use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

use crate::ecs::{ComponentStore, Mask, Schema};

/// Cloneable handle to one [`ComponentStore`] behind a reader-writer lock.
///
/// Clones share the same store and frame counter.
///
/// ```rust
/// use blitz_ecs::sync::SharedStore;
/// use blitz_ecs::ComponentStore;
///
/// let shared = SharedStore::new(ComponentStore::<(f32,)>::new());
/// let render = shared.clone();
///
/// shared.write().create();
/// shared.end_frame();
///
/// assert_eq!(render.read().entity_count(), 1);
/// assert_eq!(render.frame_count(), 1);
/// ```
pub struct SharedStore<S: Schema, M: Mask = u64> {
    store: Arc<RwLock<ComponentStore<S, M>>>,
    frames: Arc<AtomicU64>,
}

impl<S: Schema, M: Mask> SharedStore<S, M> {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: ComponentStore<S, M>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            frames: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared access, blocking while a writer holds the lock.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, ComponentStore<S, M>> {
        self.store.read()
    }

    /// Exclusive access, blocking while any reader or writer holds the lock.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, ComponentStore<S, M>> {
        self.store.write()
    }

    /// Shared access if no writer holds the lock.
    #[inline]
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, ComponentStore<S, M>>> {
        self.store.try_read()
    }

    /// Exclusive access if the lock is free.
    #[inline]
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, ComponentStore<S, M>>> {
        self.store.try_write()
    }

    /// Marks the end of an update frame.
    ///
    /// # Returns
    ///
    /// The number of completed frames, including this one.
    pub fn end_frame(&self) -> u64 {
        let frame = self.frames.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(frame, "frame complete");
        frame
    }

    /// Number of completed frames.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Unwraps the store if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged while other clones are alive.
    pub fn into_inner(self) -> Result<ComponentStore<S, M>, Self> {
        match Arc::try_unwrap(self.store) {
            Ok(lock) => Ok(lock.into_inner()),
            Err(store) => Err(Self {
                store,
                frames: self.frames,
            }),
        }
    }
}

impl<S: Schema, M: Mask> Clone for SharedStore<S, M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            frames: Arc::clone(&self.frames),
        }
    }
}

impl<S: Schema, M: Mask> Debug for SharedStore<S, M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStore")
            .field("frames", &self.frame_count())
            .field("handles", &Arc::strong_count(&self.store))
            .finish_non_exhaustive()
    }
}

impl<S: Schema, M: Mask> Default for SharedStore<S, M> {
    fn default() -> Self {
        Self::new(ComponentStore::new())
    }
}
