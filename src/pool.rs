use deadpool::managed::{self, Pool, RecycleError, RecycleResult};
use libsql::{Connection, Database, Error as LibsqlError};

/// Deadpool manager for libsql connections
pub struct StoreManager {
    database: Database,
}

impl StoreManager {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl managed::Manager for StoreManager {
    type Type = Connection;
    type Error = LibsqlError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        self.database.connect()
    }

    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> RecycleResult<Self::Error> {
        // Liveness check before handing the connection back out
        conn.query("SELECT 1", ())
            .await
            .map_err(RecycleError::Backend)?
            .next()
            .await
            .map_err(RecycleError::Backend)?;
        Ok(())
    }
}

pub type StorePool = Pool<StoreManager>;
