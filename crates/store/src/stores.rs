use deadpool_sqlite::{Config, Hook, Object, Pool, Runtime};
use tracing::{info, instrument};

use crate::{db, Settings, StoreError};

/// Handles to the two logical partitions of the tracker's data: the live
/// store (actively edited, recent runs) and the append-mostly archive store.
#[derive(Debug, Clone)]
pub struct Stores {
    live: Pool,
    archive: Pool,
}

impl Stores {
    /// Migrates both databases to the latest schema, then opens a pool per
    /// store
    #[instrument(skip(settings))]
    pub fn open(settings: &Settings) -> Result<Self, StoreError> {
        let ran = db::run_migrations(&settings.live_connection_string)?;
        info!("Ran {ran} migrations on the live store");
        let ran = db::run_migrations(&settings.archive_connection_string)?;
        info!("Ran {ran} migrations on the archive store");

        Ok(Self {
            live: Self::create_pool(&settings.live_connection_string)?,
            archive: Self::create_pool(&settings.archive_connection_string)?,
        })
    }

    fn create_pool(connection_string: &str) -> Result<Pool, StoreError> {
        let pool = Config::new(connection_string)
            .builder(Runtime::Tokio1)
            .map_err(|e| StoreError::Unavailable(format!("{connection_string}: {e}")))?
            .post_create(Hook::async_fn(|object, _| {
                Box::pin(async move {
                    object
                        .interact(|conn| db::configure_new_connection(conn))
                        .await
                        .map_err(StoreError::from)?
                        .map_err(StoreError::from)?;
                    Ok(())
                })
            }))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("{connection_string}: {e}")))?;
        Ok(pool)
    }

    pub fn live(&self) -> &Pool {
        &self.live
    }

    pub fn archive(&self) -> &Pool {
        &self.archive
    }

    pub async fn live_conn(&self) -> Result<Object, StoreError> {
        Ok(self.live.get().await?)
    }

    pub async fn archive_conn(&self) -> Result<Object, StoreError> {
        Ok(self.archive.get().await?)
    }
}
