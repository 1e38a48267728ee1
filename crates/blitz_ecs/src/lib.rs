//! # Byte Blitz Component Store
//!
//! Packed Entity Component System storage for particle-heavy 2D effects:
//! - Thousands of short-lived entities created and destroyed every frame
//! - O(1) create and destroy, no per-entity allocation
//! - Component columns laid out to hand straight to a vertex buffer
//!
//! ## Architecture Rules
//!
//! 1. **Fixed schema** - Component types are a tuple chosen at compile time
//! 2. **Dense storage** - Live entities always occupy ids `0..entity_count()`
//! 3. **Swap-remove** - Destroy moves the top entity into the freed slot
//!
//! ## Example
//!
//! ```rust
//! use blitz_ecs::{ComponentStore, StoreConfig};
//!
//! const VERTEX: usize = 0;
//! const DALPHA: usize = 1;
//! const ALPHA: usize = 2;
//!
//! type Exhaust = ([f32; 2], f32, f32);
//!
//! let mut smoke: ComponentStore<Exhaust> =
//!     ComponentStore::with_config(StoreConfig::particles(1_000))?;
//!
//! for _ in 0..10 {
//!     let puff = smoke.create();
//!     *smoke.get_mut::<ALPHA>(puff) = 1.0;
//!     *smoke.get_mut::<DALPHA>(puff) = 4.0;
//! }
//!
//! // One frame: fade, then drop what is invisible.
//! let dt = 0.5;
//! smoke.retain(|mut p| {
//!     let fade = *p.get::<DALPHA>() * dt;
//!     *p.get_mut::<ALPHA>() -= fade;
//!     *p.get::<ALPHA>() > 0.0
//! });
//!
//! assert!(smoke.is_empty());
//! assert_eq!(smoke.column_bytes::<VERTEX>().len(), 0);
//! # Ok::<(), blitz_ecs::StoreError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod sync;

pub use config::{GrowthPolicy, StoreConfig};
pub use ecs::{
    ColumnAt, Component, ComponentSet, ComponentSetIter, ComponentStore, Entity, EntityMut, Mask,
    MaskTable, Schema, Store16, Store32, Store64, Store8, StoreId,
};
pub use error::{StoreError, StoreResult};
pub use sync::SharedStore;
