//! # Store Error Types
//!
//! Errors reported by the checked (`try_*`) tier of the component store.
//! The unchecked tier never returns these; it relies on debug assertions.

use thiserror::Error;

use crate::ecs::{ComponentSet, StoreId};

/// Errors that can occur in checked store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The handle's id is outside the live range.
    #[error("invalid entity handle: id {id} is outside the live range 0..{live_count}")]
    InvalidHandle {
        /// The rejected id.
        id: usize,
        /// Live entity count at the time of the call.
        live_count: usize,
    },

    /// The handle was issued by a different store.
    #[error("entity handle belongs to store {found}, not {expected}")]
    ForeignHandle {
        /// The store the call was made on.
        expected: StoreId,
        /// The store that issued the handle.
        found: StoreId,
    },

    /// The entity's mask does not have the requested component bit.
    #[error("entity {id} does not have component {component}")]
    MissingComponent {
        /// Entity id.
        id: usize,
        /// Component index.
        component: usize,
    },

    /// A component set names an index beyond the store's schema.
    #[error("component set {set:?} exceeds a schema of {schema_len} components")]
    ComponentOutOfSchema {
        /// The rejected set.
        set: ComponentSet,
        /// Number of components in the schema.
        schema_len: usize,
    },

    /// `live_count + requested` does not fit in `usize`.
    #[error("capacity overflow: cannot reserve {requested} entities on top of {live_count}")]
    CapacityOverflow {
        /// Live entity count.
        live_count: usize,
        /// Requested extra entities.
        requested: usize,
    },

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for checked store operations.
pub type StoreResult<T> = Result<T, StoreError>;
