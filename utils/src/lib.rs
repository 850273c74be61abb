//! Shared infrastructure utilities for Tally.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename), used for
//!   the config file and saved sessions.

pub mod atomic_write;

pub use atomic_write::{AtomicWriteOptions, Durability, Placement, atomic_write};
