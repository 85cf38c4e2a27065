//! Embedded schema migrations.
//!
//! Before anything is applied the embedded chain is compared with the
//! versions recorded in `_sqlx_migrations`. An inconsistent chain aborts the
//! run without touching the schema.

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use thiserror::Error;
use tracing::{info, warn};

/// Migrations compiled into the binaries from `./migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] MigrateError),

    #[error(
        "migration {version} is applied in the database but missing from this build"
    )]
    UnknownApplied { version: i64 },

    #[error(
        "migration {pending} is pending but {latest_applied} is already applied; a prior step is missing"
    )]
    OutOfOrder { pending: i64, latest_applied: i64 },

    #[error("migration {version} previously failed; the schema needs manual repair")]
    Dirty { version: i64 },
}

/// A row of `_sqlx_migrations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub success: bool,
}

/// One embedded migration and whether it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Versions applied by this run, ascending.
    pub applied_now: Vec<i64>,
    /// Highest applied version after the run.
    pub head: Option<i64>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied_now.is_empty()
    }
}

/// Versions of the embedded up-migrations, ascending.
pub fn known_versions() -> Vec<i64> {
    let mut versions: Vec<i64> = MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| m.version)
        .collect();
    versions.sort_unstable();
    versions
}

/// Computes the pending versions, in the order they will be applied.
///
/// # Errors
///
/// Fails if an applied row is dirty, if an applied version is unknown to
/// `known`, or if a pending version sorts below the highest applied one.
pub fn plan(known: &[i64], applied: &[AppliedMigration]) -> Result<Vec<i64>, MigrationError> {
    if let Some(dirty) = applied.iter().find(|m| !m.success) {
        return Err(MigrationError::Dirty {
            version: dirty.version,
        });
    }

    if let Some(unknown) = applied.iter().find(|m| !known.contains(&m.version)) {
        return Err(MigrationError::UnknownApplied {
            version: unknown.version,
        });
    }

    let mut pending: Vec<i64> = known
        .iter()
        .copied()
        .filter(|v| !applied.iter().any(|m| m.version == *v))
        .collect();
    pending.sort_unstable();

    if let (Some(&first_pending), Some(latest_applied)) =
        (pending.first(), applied.iter().map(|m| m.version).max())
    {
        if first_pending < latest_applied {
            return Err(MigrationError::OutOfOrder {
                pending: first_pending,
                latest_applied,
            });
        }
    }

    Ok(pending)
}

/// Reads `_sqlx_migrations`; an absent table means nothing is applied.
pub async fn applied_migrations(pool: &PgPool) -> Result<Vec<AppliedMigration>, MigrationError> {
    let table_exists: bool =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;

    if !table_exists {
        return Ok(Vec::new());
    }

    let rows: Vec<AppliedMigration> =
        sqlx::query_as("SELECT version, success FROM _sqlx_migrations ORDER BY version")
            .fetch_all(pool)
            .await?;

    Ok(rows)
}

/// Applies every pending migration. Running at head is a no-op.
pub async fn run(pool: &PgPool) -> Result<MigrationReport, MigrationError> {
    let applied = applied_migrations(pool).await?;
    let pending = plan(&known_versions(), &applied).inspect_err(|e| {
        warn!(error = %e, "Refusing to migrate an inconsistent schema");
    })?;

    if pending.is_empty() {
        let head = applied.iter().map(|m| m.version).max();
        info!(head = ?head, "Schema already at head");
        return Ok(MigrationReport {
            applied_now: Vec::new(),
            head,
        });
    }

    info!(count = pending.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;

    let head = applied_migrations(pool)
        .await?
        .iter()
        .map(|m| m.version)
        .max();
    info!(head = ?head, applied = ?pending, "Migrations applied");

    Ok(MigrationReport {
        applied_now: pending,
        head,
    })
}

/// Lists every embedded migration with its applied state.
pub async fn status(pool: &PgPool) -> Result<Vec<MigrationStatus>, MigrationError> {
    let applied = applied_migrations(pool).await?;

    let mut statuses: Vec<MigrationStatus> = MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.iter().any(|a| a.version == m.version && a.success),
        })
        .collect();
    statuses.sort_by_key(|s| s.version);

    Ok(statuses)
}
