//! Hologram persistence: the store contract and its backends.

pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryHologramStore;
pub use r#trait::{HologramStore, StoreError};
pub use sqlite::SqliteHologramStore;
