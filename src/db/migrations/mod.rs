//! Schema migrations for the ledger database.
//!
//! Each schema version has a pair of SQL files in this directory:
//! - `migration_NN_up.sql` brings the schema from version `NN-1` to `NN`
//! - `migration_NN_down.sql` brings it back from `NN` to `NN-1`
//!
//! The version the database is at is kept in the single-row `schema_version` table.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::Result;

/// The schema version this build of the program reads and writes.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// Creates the `schema_version` table at version 0 if it does not exist yet and returns the
/// version the database is at.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Result<i32> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;

    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;

    match row.0 {
        Some(version) => Ok(version),
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
                .execute(pool)
                .await
                .context("Failed to insert initial schema version")?;
            Ok(0)
        }
    }
}

/// Brings the database to `CURRENT_VERSION`. A database written by a newer build is refused
/// rather than downgraded.
pub(crate) async fn migrate(pool: &SqlitePool) -> Result<()> {
    let version = bootstrap(pool).await?;
    if version > CURRENT_VERSION {
        bail!(
            "The database is at schema version {version} but this program only understands up \
            to version {CURRENT_VERSION}"
        );
    }
    run(pool, version, CURRENT_VERSION).await
}

/// Runs the migrations between `current_ver` and `target_ver`, upwards or downwards. Each step
/// runs in its own transaction together with the `schema_version` update.
pub(crate) async fn run(pool: &SqlitePool, current_ver: i32, target_ver: i32) -> Result<()> {
    if current_ver == target_ver {
        debug!("Database already at schema version {target_ver}");
        return Ok(());
    }

    // Refuse to start if any step in the range is missing
    validate_migrations(current_ver, target_ver)?;

    if current_ver < target_ver {
        for version in (current_ver + 1)..=target_ver {
            debug!("Running migration {version:02} (up)");
            run_single_migration(pool, find(version)?.up_sql, version).await?;
        }
    } else {
        for version in (target_ver + 1..=current_ver).rev() {
            debug!("Running migration {version:02} (down)");
            run_single_migration(pool, find(version)?.down_sql, version - 1).await?;
        }
    }

    debug!("Schema now at version {target_ver}");
    Ok(())
}

fn find(version: i32) -> Result<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} not found"))
}

async fn run_single_migration(pool: &SqlitePool, sql: &str, new_version: i32) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    tx.execute(sql)
        .await
        .context("Failed to execute migration SQL")?;

    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;

    Ok(())
}

fn validate_migrations(current_version: i32, target_version: i32) -> Result<()> {
    let (start, end) = if current_version < target_version {
        (current_version + 1, target_version)
    } else {
        (target_version + 1, current_version)
    };

    for version in start..=end {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!(
                "Migration {version} is missing but required to migrate from version \
                {current_version} to {target_version}"
            );
        }
    }

    Ok(())
}
