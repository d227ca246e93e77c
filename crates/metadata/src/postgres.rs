//! PostgreSQL-based metadata store implementation.

use crate::error::MetadataResult;
use crate::models::*;
use crate::repos::{BootstrapRepo, MilestoneRepo, StageRepo};
use crate::store::MetadataStore;
use async_trait::async_trait;
use hitos_core::DefaultStage;
use hitos_core::config::PgSslMode;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode as SqlxPgSslMode};
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use std::time::Duration;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// PostgreSQL-based metadata store.
///
/// The pool connects lazily: construction never touches the network, so a
/// server can start while the database is still unreachable.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Create a store from a connection URL.
    pub fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Ok(Self::connect_lazy(opts, max_connections, statement_timeout_ms))
    }

    /// Create a store from individual connection parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        ssl_mode: Option<PgSslMode>,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        if let Some(mode) = ssl_mode {
            let sqlx_mode = match mode {
                PgSslMode::Disable => SqlxPgSslMode::Disable,
                PgSslMode::Prefer => SqlxPgSslMode::Prefer,
                PgSslMode::Require => SqlxPgSslMode::Require,
            };
            opts = opts.ssl_mode(sqlx_mode);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            ssl_mode = ?ssl_mode,
            "Using PostgreSQL with individual parameters"
        );

        Ok(Self::connect_lazy(opts, max_connections, statement_timeout_ms))
    }

    fn connect_lazy(
        mut opts: PgConnectOptions,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> Self {
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{timeout_ms}ms"))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_lazy_with(opts);

        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // Prepared statements hold one command each.
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StageRepo for PostgresStore {
    async fn list_stages(&self) -> MetadataResult<Vec<StageRow>> {
        let rows =
            sqlx::query_as::<_, StageRow>("SELECT id, name, color FROM stages ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    async fn create_stage(&self, stage: &NewStage) -> MetadataResult<StageRow> {
        let row = sqlx::query_as::<_, StageRow>(
            "INSERT INTO stages (name, color) VALUES ($1, $2) RETURNING id, name, color",
        )
        .bind(&stage.name)
        .bind(&stage.color)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_stage(&self, id: i64) -> MetadataResult<u64> {
        let result = sqlx::query("DELETE FROM stages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_milestones_for_stage(&self, stage_id: i64) -> MetadataResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM milestones WHERE stage_id = $1")
            .bind(stage_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl MilestoneRepo for PostgresStore {
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
            VALUES ($1, $2, $3, $4, $5, $6, $7)
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

    async fn update_milestone(&self, id: i64, changes: &MilestoneChanges) -> MetadataResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE milestones
            SET stage_id = $1, start_date = $2, location = $3,
                completion_date = $4, comments = $5, illustration = $6
            WHERE id = $7
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
        let result = sqlx::query("DELETE FROM milestones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BootstrapRepo for PostgresStore {
    async fn seed_default_stages(&self, stages: &[DefaultStage]) -> MetadataResult<u64> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent seeders (several replicas starting together).
        sqlx::query("LOCK TABLE stages IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stages")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.commit().await?;
            return Ok(0);
        }

        for stage in stages {
            sqlx::query("INSERT INTO stages (name, color) VALUES ($1, $2)")
                .bind(stage.name)
                .bind(stage.color)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(stages.len() as u64)
    }
}
