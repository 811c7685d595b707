//! Infrastructure layer: hologram stores (in-memory, SQLite), the
//! application service and configuration.

pub mod config;
pub mod service;
pub mod store;

mod integration_tests;

pub use config::AppConfig;
pub use service::{HologramService, IssueOrder};
pub use store::{HologramStore, InMemoryHologramStore, SqliteHologramStore, StoreError};
