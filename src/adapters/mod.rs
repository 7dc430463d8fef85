//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `forest`: random-forest classifier (rayon, rand_chacha)
//! - `sqlite`: SQLite patient storage
//! - `sanitize`: identifier filtering for logs

pub mod forest;
pub mod sanitize;
pub mod sqlite;

// Re-export storage error for lib.rs
pub use sqlite::StorageError;
