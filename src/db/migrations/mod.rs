//! Schema bootstrapping.
//!
//! Schema files are stored in this directory with the naming convention `migration_NN_up.sql`,
//! each of which brings the schema from version `NN-1` to version `NN`. Only forward steps exist;
//! the store never moves its schema backwards.

use anyhow::{bail, Context};
use sqlx::{Connection, SqliteConnection};
use tracing::debug;

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

/// A forward schema step.
struct Migration {
    /// The version this migration brings the database to.
    version: i32,
    /// SQL to execute when upgrading to this version.
    up_sql: &'static str,
}

/// All available migrations in order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
}];

/// Creates the `schema_version` table if it is missing and returns the recorded version, which is
/// `0` for a brand-new database.
pub(crate) async fn schema_version(conn: &mut SqliteConnection) -> anyhow::Result<i32> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(&mut *conn)
        .await
        .context("Failed to create schema_version table")?;

    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(&mut *conn)
        .await
        .context("Failed to query schema version")?;
    Ok(row.0.unwrap_or(0))
}

/// Runs migrations to bring the database from `current_ver` up to `target_ver`.
///
/// Each migration is executed within a transaction that includes the schema_version update.
/// Validates all required migrations exist before running any of them.
pub(crate) async fn run(
    conn: &mut SqliteConnection,
    current_ver: i32,
    target_ver: i32,
) -> anyhow::Result<()> {
    if current_ver == target_ver {
        debug!("Database already at target version {target_ver}, no migrations needed");
        return Ok(());
    }
    if current_ver > target_ver {
        bail!(
            "The database schema is at version {current_ver}, which is newer than this program \
            supports ({target_ver}). Is a newer version of microsave available?"
        );
    }

    validate_migrations(current_ver, target_ver)?;

    for version in (current_ver + 1)..=target_ver {
        let migration = MIGRATIONS
            .iter()
            .find(|m| m.version == version)
            .with_context(|| format!("Migration {version} not found"))?;

        debug!("Running migration {version:02}");
        run_single_migration(conn, migration.up_sql, version).await?;
    }

    debug!("Migration complete, schema now at version {target_ver}");
    Ok(())
}

/// Executes a single migration's SQL and updates schema_version, all within a transaction.
async fn run_single_migration(
    conn: &mut SqliteConnection,
    sql: &'static str,
    new_version: i32,
) -> anyhow::Result<()> {
    let mut tx = conn
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    // Supports multiple statements
    sqlx::raw_sql(sql)
        .execute(&mut *tx)
        .await
        .context("Failed to execute migration SQL")?;

    sqlx::query("DELETE FROM schema_version")
        .execute(&mut *tx)
        .await
        .context("Failed to clear schema_version")?;

    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;

    Ok(())
}

/// Validates that migrations are available for every version between `current_version` and
/// `target_version`.
fn validate_migrations(current_version: i32, target_version: i32) -> anyhow::Result<()> {
    for version in (current_version + 1)..=target_version {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!(
                "Migration {version} is missing but required to migrate from version {current_version} to {target_version}"
            );
        }
    }
    Ok(())
}
