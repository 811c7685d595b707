//! Process configuration read from the environment.

use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hologram_management.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Use the SQLite store instead of the in-memory one.
    pub use_persistent_stores: bool,
    pub database_url: String,
}

impl AppConfig {
    /// Read `HOLOTRACK_BIND_ADDR`, `USE_PERSISTENT_STORES` and `DATABASE_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup("HOLOTRACK_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("HOLOTRACK_BIND_ADDR is not a socket address: {bind_addr}"))?;

        // Anything that is not a boolean counts as "off".
        let use_persistent_stores = lookup("USE_PERSISTENT_STORES")
            .and_then(|v| v.trim().to_ascii_lowercase().parse::<bool>().ok())
            .unwrap_or(false);

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Ok(Self {
            bind_addr,
            use_persistent_stores,
            database_url,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            use_persistent_stores: false,
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}
