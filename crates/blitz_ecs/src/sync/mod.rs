//! # Synchronization for Multi-threaded Hosts
//!
//! ## The Problem
//!
//! ```text
//! Thread 1 (Update):  create/destroy particles, write columns
//! Thread 2 (Render):  read the VERTEX column
//!
//! Without synchronization: data race on every column
//! ```
//!
//! ## The Solution
//!
//! The store stays single-threaded. [`SharedStore`] puts it behind a
//! `parking_lot` reader-writer lock and counts finished frames, so the
//! render thread can tell which update it is drawing.

mod shared;

pub use shared::SharedStore;
