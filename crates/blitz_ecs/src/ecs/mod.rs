//! # Entity Component System
//!
//! A packed, fixed-schema component store for short-lived entities.
//!
//! ## Design Philosophy
//!
//! - The component types are fixed at compile time by a tuple schema
//! - Each component type lives in its own contiguous column
//! - Entity IDs are dense indices; destroy swaps the top entity into the hole
//! - Membership is a per-entity bitmask; no dynamic dispatch in hot paths

mod entity;
mod mask;
mod schema;
mod store;

pub use entity::{Entity, StoreId};
pub use mask::{ComponentSet, ComponentSetIter, Mask, MaskTable};
pub use schema::{ColumnAt, Component, Schema};
pub use store::{ComponentStore, EntityMut, Store16, Store32, Store64, Store8};
