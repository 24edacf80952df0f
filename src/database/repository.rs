use anyhow::Result;
use async_trait::async_trait;
use libsql::{Row, params};
use uuid::Uuid;

use super::models::MonitoredTarget;
use crate::monitoring::types::{CheckOutcome, TargetStatus};
use crate::pool::{StoreManager, StorePool};

const TARGET_COLUMNS: &str = "id, uuid, owner_id, endpoint, interval_seconds, status, \
     last_checked_at, last_status_code, last_response_time_ms, total_checks, \
     successful_checks, notifications_enabled, created_at";

/// Persistence contract the monitoring engine depends on
///
/// Lookups return `Ok(None)` and mutations return `Ok(false)` for missing
/// targets; `Err` is reserved for storage failures. `update_after_check`
/// must be atomic with respect to concurrent calls for the same target.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Persist a new target, seeded with its initial status and counters
    async fn create(&self, target: &MonitoredTarget) -> Result<i64>;

    /// Get a target by UUID
    async fn get(&self, uuid: Uuid) -> Result<Option<MonitoredTarget>>;

    /// Get a target by UUID, scoped to its owner
    async fn get_for_owner(&self, uuid: Uuid, owner_id: i64) -> Result<Option<MonitoredTarget>>;

    /// Find an owner's target by endpoint (duplicate detection)
    async fn find_by_endpoint(&self, owner_id: i64, endpoint: &str)
    -> Result<Option<MonitoredTarget>>;

    /// Get all persisted targets (startup resume)
    async fn list_all(&self) -> Result<Vec<MonitoredTarget>>;

    /// Get all targets belonging to one owner
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<MonitoredTarget>>;

    /// Fold one check outcome into a target's record
    ///
    /// Counters are incremented inside the store in a single statement so
    /// concurrent cycles and manual checks never lose an update.
    async fn update_after_check(&self, uuid: Uuid, outcome: &CheckOutcome) -> Result<bool>;

    /// Update owner-mutable settings (interval, notifications flag)
    ///
    /// At least one field must be provided: with neither, nothing is
    /// written and the call reports `Ok(false)`, indistinguishable from a
    /// missing target. [`MonitorSupervisor::update_target_settings`]
    /// rejects empty updates before they reach the store.
    ///
    /// [`MonitorSupervisor::update_target_settings`]:
    /// crate::monitoring::MonitorSupervisor::update_target_settings
    async fn update_settings(
        &self,
        uuid: Uuid,
        owner_id: i64,
        interval_seconds: Option<u64>,
        notifications_enabled: Option<bool>,
    ) -> Result<bool>;

    /// Delete an owner's target
    async fn delete(&self, uuid: Uuid, owner_id: i64) -> Result<bool>;
}

/// LibSQL-backed target store
pub struct LibsqlTargetStore {
    pool: StorePool,
}

impl LibsqlTargetStore {
    pub fn new_from_pool(pool: StorePool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<StoreManager>> {
        Ok(self.pool.get().await?)
    }
}

fn row_to_target(row: &Row) -> Result<MonitoredTarget> {
    let uuid_str: String = row.get(1)?;
    let status_str: String = row.get(5)?;
    let last_checked_at: i64 = row.get(6)?;
    let created_at: i64 = row.get(12)?;

    Ok(MonitoredTarget {
        id: Some(row.get(0)?),
        uuid: Uuid::parse_str(&uuid_str)?,
        owner_id: row.get(2)?,
        endpoint: row.get(3)?,
        interval_seconds: row.get::<i64>(4)? as u64,
        status: TargetStatus::from_db(&status_str),
        last_checked_at: MonitoredTarget::i64_to_timestamp(last_checked_at),
        last_status_code: row.get::<i64>(7)? as u16,
        last_response_time_ms: row.get::<i64>(8)? as u64,
        total_checks: row.get::<i64>(9)? as u64,
        successful_checks: row.get::<i64>(10)? as u64,
        notifications_enabled: row.get::<i64>(11)? != 0,
        created_at: MonitoredTarget::i64_to_timestamp(created_at),
    })
}

#[async_trait]
impl TargetStore for LibsqlTargetStore {
    async fn create(&self, target: &MonitoredTarget) -> Result<i64> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO targets (uuid, owner_id, endpoint, interval_seconds, status, \
             last_checked_at, last_status_code, last_response_time_ms, total_checks, \
             successful_checks, notifications_enabled, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                target.uuid.to_string(),
                target.owner_id,
                target.endpoint.clone(),
                target.interval_seconds as i64,
                target.status.as_str(),
                MonitoredTarget::timestamp_to_i64(target.last_checked_at),
                target.last_status_code as i64,
                target.last_response_time_ms as i64,
                target.total_checks as i64,
                target.successful_checks as i64,
                if target.notifications_enabled { 1 } else { 0 },
                MonitoredTarget::timestamp_to_i64(target.created_at)
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<MonitoredTarget>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {TARGET_COLUMNS} FROM targets WHERE uuid = ?"),
                params![uuid.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_target(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_for_owner(&self, uuid: Uuid, owner_id: i64) -> Result<Option<MonitoredTarget>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {TARGET_COLUMNS} FROM targets WHERE uuid = ? AND owner_id = ?"),
                params![uuid.to_string(), owner_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_target(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_endpoint(
        &self,
        owner_id: i64,
        endpoint: &str,
    ) -> Result<Option<MonitoredTarget>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {TARGET_COLUMNS} FROM targets WHERE owner_id = ? AND endpoint = ?"),
                params![owner_id, endpoint],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_target(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<MonitoredTarget>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(&format!("SELECT {TARGET_COLUMNS} FROM targets"), ())
            .await?;

        let mut targets = Vec::new();
        while let Some(row) = rows.next().await? {
            targets.push(row_to_target(&row)?);
        }
        Ok(targets)
    }

    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<MonitoredTarget>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {TARGET_COLUMNS} FROM targets WHERE owner_id = ?"),
                params![owner_id],
            )
            .await?;

        let mut targets = Vec::new();
        while let Some(row) = rows.next().await? {
            targets.push(row_to_target(&row)?);
        }
        Ok(targets)
    }

    async fn update_after_check(&self, uuid: Uuid, outcome: &CheckOutcome) -> Result<bool> {
        let conn = self.get_conn().await?;

        // Single-statement increment: the read-modify-write happens inside
        // the database, so a manual check racing a periodic cycle cannot
        // lose an update.
        let affected = conn
            .execute(
                "UPDATE targets SET \
                 status = ?, \
                 last_checked_at = ?, \
                 last_status_code = ?, \
                 last_response_time_ms = ?, \
                 total_checks = total_checks + 1, \
                 successful_checks = successful_checks + ? \
                 WHERE uuid = ?",
                params![
                    outcome.status.as_str(),
                    MonitoredTarget::timestamp_to_i64(outcome.checked_at),
                    outcome.status_code as i64,
                    outcome.response_time_ms as i64,
                    i64::from(outcome.is_up()),
                    uuid.to_string()
                ],
            )
            .await?;

        Ok(affected > 0)
    }

    async fn update_settings(
        &self,
        uuid: Uuid,
        owner_id: i64,
        interval_seconds: Option<u64>,
        notifications_enabled: Option<bool>,
    ) -> Result<bool> {
        let conn = self.get_conn().await?;

        let affected = match (interval_seconds, notifications_enabled) {
            (Some(interval), Some(enabled)) => {
                conn.execute(
                    "UPDATE targets SET interval_seconds = ?, notifications_enabled = ? \
                     WHERE uuid = ? AND owner_id = ?",
                    params![
                        interval as i64,
                        if enabled { 1 } else { 0 },
                        uuid.to_string(),
                        owner_id
                    ],
                )
                .await?
            }
            (Some(interval), None) => {
                conn.execute(
                    "UPDATE targets SET interval_seconds = ? WHERE uuid = ? AND owner_id = ?",
                    params![interval as i64, uuid.to_string(), owner_id],
                )
                .await?
            }
            (None, Some(enabled)) => {
                conn.execute(
                    "UPDATE targets SET notifications_enabled = ? WHERE uuid = ? AND owner_id = ?",
                    params![if enabled { 1 } else { 0 }, uuid.to_string(), owner_id],
                )
                .await?
            }
            (None, None) => return Ok(false),
        };

        Ok(affected > 0)
    }

    async fn delete(&self, uuid: Uuid, owner_id: i64) -> Result<bool> {
        let conn = self.get_conn().await?;
        let affected = conn
            .execute(
                "DELETE FROM targets WHERE uuid = ? AND owner_id = ?",
                params![uuid.to_string(), owner_id],
            )
            .await?;
        Ok(affected > 0)
    }
}
