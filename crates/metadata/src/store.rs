//! Metadata store trait and the SQLite implementation.

use crate::error::MetadataResult;
use crate::repos::{BootstrapRepo, MilestoneRepo, StageRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: StageRepo + MilestoneRepo + BootstrapRepo + Send + Sync {
    /// Create tables and indexes if they do not exist.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) a SQLite database.
    ///
    /// The schema is not created here; call [`MetadataStore::migrate`].
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // SQLite leaves foreign keys off unless asked, per connection.
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single writer connection avoids "database is locked" under axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Implement all the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use hitos_core::DefaultStage;

    #[async_trait]
    impl StageRepo for SqliteStore {
        async fn list_stages(&self) -> MetadataResult<Vec<StageRow>> {
            let rows =
                sqlx::query_as::<_, StageRow>("SELECT id, name, color FROM stages ORDER BY id ASC")
                    .fetch_all(&self.pool)
                    .await?;
            Ok(rows)
        }

        async fn create_stage(&self, stage: &NewStage) -> MetadataResult<StageRow> {
            let row = sqlx::query_as::<_, StageRow>(
                "INSERT INTO stages (name, color) VALUES (?, ?) RETURNING id, name, color",
            )
            .bind(&stage.name)
            .bind(&stage.color)
            .fetch_one(&self.pool)
            .await?;
            Ok(row)
        }

        async fn delete_stage(&self, id: i64) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM stages WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        }

        async fn count_milestones_for_stage(&self, stage_id: i64) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM milestones WHERE stage_id = ?")
                .bind(stage_id)
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }
    }

    #[async_trait]
    impl MilestoneRepo for SqliteStore {
        async fn list_milestones(&self) -> MetadataResult<Vec<MilestoneWithStageRow>> {
            let rows = sqlx::query_as::<_, MilestoneWithStageRow>(
                r#"
                SELECT m.id, m.item, m.stage_id, m.start_date, m.location,
                       m.completion_date, m.comments, m.illustration,
                       s.name AS stage_name, s.color AS stage_color
                FROM milestones m
                JOIN stages s ON m.stage_id = s.id
                ORDER BY m.item ASC, m.id ASC
                "#,
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn create_milestone(&self, milestone: &NewMilestone) -> MetadataResult<i64> {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO milestones
                    (item, stage_id, start_date, location, completion_date, comments, illustration)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                RETURNING id
                "#,
            )
            .bind(milestone.item)
            .bind(milestone.stage_id)
            .bind(milestone.start_date)
            .bind(&milestone.location)
            .bind(milestone.completion_date)
            .bind(&milestone.comments)
            .bind(&milestone.illustration)
            .fetch_one(&self.pool)
            .await?;
            Ok(id)
        }

        async fn update_milestone(
            &self,
            id: i64,
            changes: &MilestoneChanges,
        ) -> MetadataResult<u64> {
            let result = sqlx::query(
                r#"
                UPDATE milestones
                SET stage_id = ?, start_date = ?, location = ?,
                    completion_date = ?, comments = ?, illustration = ?
                WHERE id = ?
                "#,
            )
            .bind(changes.stage_id)
            .bind(changes.start_date)
            .bind(&changes.location)
            .bind(changes.completion_date)
            .bind(&changes.comments)
            .bind(&changes.illustration)
            .bind(id)
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected())
        }

        async fn delete_milestone(&self, id: i64) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM milestones WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        }
    }

    #[async_trait]
    impl BootstrapRepo for SqliteStore {
        async fn seed_default_stages(&self, stages: &[DefaultStage]) -> MetadataResult<u64> {
            let mut tx = self.pool.begin().await?;

            let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stages")
                .fetch_one(&mut *tx)
                .await?;
            if existing > 0 {
                tx.commit().await?;
                return Ok(0);
            }

            for stage in stages {
                sqlx::query("INSERT INTO stages (name, color) VALUES (?, ?)")
                    .bind(stage.name)
                    .bind(stage.color)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;

            Ok(stages.len() as u64)
        }
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS stages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(name) > 0),
    color TEXT NOT NULL DEFAULT '#4f46e5' CHECK (length(color) <= 7)
);

-- Milestones reference a live stage; deleting a referenced stage is rejected
-- (no ON DELETE action).
CREATE TABLE IF NOT EXISTS milestones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item INTEGER NOT NULL,
    stage_id INTEGER NOT NULL REFERENCES stages(id),
    start_date DATE NOT NULL,
    location TEXT NOT NULL,
    completion_date DATE,
    comments TEXT,
    illustration TEXT
);
CREATE INDEX IF NOT EXISTS idx_milestones_stage ON milestones(stage_id);
CREATE INDEX IF NOT EXISTS idx_milestones_item ON milestones(item);
"#;
