use anyhow::Result;
use libsql::Connection;

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 1;

/// Run database migrations
pub async fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        )",
        (),
    )
    .await?;

    let current_version = get_current_version(conn).await?;

    if current_version >= SCHEMA_VERSION {
        tracing::debug!("database schema is up to date (version {})", current_version);
        return Ok(());
    }

    tracing::info!(
        "running migrations from version {} to {}",
        current_version,
        SCHEMA_VERSION
    );

    if current_version < 1 {
        run_migration_v1(conn).await?;
        record_migration(conn, 1, "Initial targets schema").await?;
    }

    Ok(())
}

/// Get current schema version from database
async fn get_current_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query("SELECT MAX(version) FROM schema_migrations", ())
        .await?;

    if let Some(row) = rows.next().await? {
        let version: Option<i32> = row.get(0)?;
        Ok(version.unwrap_or(0))
    } else {
        Ok(0)
    }
}

/// Record that a migration was applied
async fn record_migration(conn: &Connection, version: i32, description: &str) -> Result<()> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?, ?, ?)",
        libsql::params![version, now, description],
    )
    .await?;

    tracing::info!("applied migration v{}: {}", version, description);
    Ok(())
}

/// Migration v1: monitored targets table
///
/// Counters are plain integers mutated only through atomic UPDATE
/// increments; uptime percentage is never stored, it derives from the
/// counter pair on read.
async fn run_migration_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS targets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            owner_id INTEGER NOT NULL,
            endpoint TEXT NOT NULL,
            interval_seconds INTEGER NOT NULL DEFAULT 300,
            status TEXT NOT NULL,
            last_checked_at INTEGER NOT NULL,
            last_status_code INTEGER NOT NULL DEFAULT 0,
            last_response_time_ms INTEGER NOT NULL DEFAULT 0,
            total_checks INTEGER NOT NULL DEFAULT 0,
            successful_checks INTEGER NOT NULL DEFAULT 0,
            notifications_enabled INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        )",
        (),
    )
    .await?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_targets_owner ON targets(owner_id)",
        (),
    )
    .await?;

    // One target per (owner, endpoint) pair
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_targets_owner_endpoint
         ON targets(owner_id, endpoint)",
        (),
    )
    .await?;

    Ok(())
}
