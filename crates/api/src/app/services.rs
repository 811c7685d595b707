use std::sync::Arc;

use anyhow::Context;

use holotrack_infra::{AppConfig, HologramService, HologramStore, InMemoryHologramStore, SqliteHologramStore};

/// Store behind the service, chosen at startup.
pub type SharedStore = Arc<dyn HologramStore>;

/// Shared application services handed to every handler.
pub struct AppServices {
    pub holograms: HologramService<SharedStore>,
    /// `"in_memory"` or `"sqlite"`.
    pub backend: &'static str,
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self {
            holograms: HologramService::new(Arc::new(InMemoryHologramStore::new()) as SharedStore),
            backend: "in_memory",
        }
    }

    pub async fn sqlite(database_url: &str) -> anyhow::Result<Self> {
        let store = SqliteHologramStore::connect(database_url)
            .await
            .with_context(|| format!("failed to open hologram database at {database_url}"))?;

        Ok(Self {
            holograms: HologramService::new(Arc::new(store) as SharedStore),
            backend: "sqlite",
        })
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    if config.use_persistent_stores {
        tracing::info!(database_url = %config.database_url, "using sqlite hologram store");
        return AppServices::sqlite(&config.database_url).await;
    }

    tracing::warn!("USE_PERSISTENT_STORES not set; data lives in memory only");
    Ok(AppServices::in_memory())
}
