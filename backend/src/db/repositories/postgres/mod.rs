//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//! - Draws serialized per window through the `draws` marker table
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;
use tracing::warn;

use crate::db::repository::{
    plan_results, DrawRepository, ErrorContext, RegistrationRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{
    DrawCategory, DrawOutcome, DrawResult, DrawSelector, DrawSummary, DrawWindow, NewDrawResult,
    NewRegistrant, Registrant,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// See the module documentation for the variables read.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// The closure runs on a blocking thread. It may run more than once, so it
    /// must wrap any multi-statement write in a transaction.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new(operation)
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        warn!(operation, attempt = attempt + 1, error = %e, "retrying");
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e.with_operation(operation)),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// The draw itself, run inside one transaction.
fn draw_in_transaction(
    tx: &mut PgConnection,
    window: DrawWindow,
    drawn_at: DateTime<Utc>,
    selector: &DrawSelector,
) -> RepositoryResult<DrawOutcome> {
    let draw_time = window.epoch_seconds();

    let rows = registrations::table
        .filter(registrations::draw_time.eq(draw_time))
        .order(registrations::id.asc())
        .select(RegistrationRow::as_select())
        .load::<RegistrationRow>(tx)?;
    let pool = registrants_from_rows(rows)?;
    if pool.is_empty() {
        return Ok(DrawOutcome::NoRegistrations { window });
    }

    let existing: i64 = winners::table
        .filter(winners::draw_time.eq(draw_time))
        .count()
        .get_result(tx)?;
    if existing > 0 {
        return Ok(DrawOutcome::AlreadyDrawn { window });
    }

    // Claim the window. A concurrent claimant blocks here until the first
    // transaction finishes, then sees the conflict and inserts nothing.
    let claimed = diesel::insert_into(draws::table)
        .values(&NewDrawRow {
            draw_time,
            drawn_at: drawn_at.timestamp(),
        })
        .on_conflict_do_nothing()
        .execute(tx)?;
    if claimed == 0 {
        return Ok(DrawOutcome::AlreadyDrawn { window });
    }

    let selection = selector.select(pool.len());
    let planned = plan_results(&pool, &selection, window)?;

    let new_rows: Vec<NewWinnerRow> = planned.all().map(NewWinnerRow::from).collect();
    let inserted = if new_rows.is_empty() {
        Vec::new()
    } else {
        diesel::insert_into(winners::table)
            .values(&new_rows)
            .returning(WinnerRow::as_returning())
            .get_results::<WinnerRow>(tx)?
    };

    diesel::delete(registrations::table.filter(registrations::draw_time.eq(draw_time)))
        .execute(tx)?;

    let (winners, reserves): (Vec<DrawResult>, Vec<DrawResult>) = results_from_rows(inserted)?
        .into_iter()
        .partition(|r| r.category == DrawCategory::Winner);

    Ok(DrawOutcome::Drawn(DrawSummary {
        window,
        discarded: pool.len() - winners.len() - reserves.len(),
        winners,
        reserves,
    }))
}

#[async_trait]
impl RegistrationRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }

    async fn insert_registration(&self, registrant: &NewRegistrant) -> RepositoryResult<Registrant> {
        let row = NewRegistrationRow::from(registrant);
        self.with_conn("insert_registration", move |conn| {
            let inserted = diesel::insert_into(registrations::table)
                .values(&row)
                .returning(RegistrationRow::as_returning())
                .get_result::<RegistrationRow>(conn)?;
            Registrant::try_from(inserted)
        })
        .await
    }

    async fn count_registrations_for_window(&self, window: DrawWindow) -> RepositoryResult<u64> {
        let draw_time = window.epoch_seconds();
        self.with_conn("count_registrations_for_window", move |conn| {
            let count: i64 = registrations::table
                .filter(registrations::draw_time.eq(draw_time))
                .count()
                .get_result(conn)?;
            Ok(to_count(count))
        })
        .await
    }

    async fn fetch_registrations_for_window(
        &self,
        window: DrawWindow,
    ) -> RepositoryResult<Vec<Registrant>> {
        let draw_time = window.epoch_seconds();
        self.with_conn("fetch_registrations_for_window", move |conn| {
            let rows = registrations::table
                .filter(registrations::draw_time.eq(draw_time))
                .order((registrations::registered_at.desc(), registrations::id.desc()))
                .select(RegistrationRow::as_select())
                .load::<RegistrationRow>(conn)?;
            registrants_from_rows(rows)
        })
        .await
    }

    async fn fetch_all_registrations(&self) -> RepositoryResult<Vec<Registrant>> {
        self.with_conn("fetch_all_registrations", |conn| {
            let rows = registrations::table
                .order(registrations::id.asc())
                .select(RegistrationRow::as_select())
                .load::<RegistrationRow>(conn)?;
            registrants_from_rows(rows)
        })
        .await
    }

    async fn delete_registrations_for_window(&self, window: DrawWindow) -> RepositoryResult<u64> {
        let draw_time = window.epoch_seconds();
        self.with_conn("delete_registrations_for_window", move |conn| {
            let deleted =
                diesel::delete(registrations::table.filter(registrations::draw_time.eq(draw_time)))
                    .execute(conn)?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn delete_registrations(&self, ids: &[i64]) -> RepositoryResult<u64> {
        let ids = ids.to_vec();
        self.with_conn("delete_registrations", move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let deleted =
                    diesel::delete(registrations::table.filter(registrations::id.eq_any(&ids)))
                        .execute(tx)?;
                Ok(deleted as u64)
            })
        })
        .await
    }
}

#[async_trait]
impl DrawRepository for PostgresRepository {
    async fn insert_result(&self, result: &NewDrawResult) -> RepositoryResult<DrawResult> {
        let row = NewWinnerRow::from(result);
        self.with_conn("insert_result", move |conn| {
            let inserted = diesel::insert_into(winners::table)
                .values(&row)
                .returning(WinnerRow::as_returning())
                .get_result::<WinnerRow>(conn)?;
            DrawResult::try_from(inserted)
        })
        .await
    }

    async fn count_results_for_window(&self, window: DrawWindow) -> RepositoryResult<u64> {
        let draw_time = window.epoch_seconds();
        self.with_conn("count_results_for_window", move |conn| {
            let count: i64 = winners::table
                .filter(winners::draw_time.eq(draw_time))
                .count()
                .get_result(conn)?;
            Ok(to_count(count))
        })
        .await
    }

    async fn fetch_results_for_window(
        &self,
        window: DrawWindow,
        category: DrawCategory,
    ) -> RepositoryResult<Vec<DrawResult>> {
        let draw_time = window.epoch_seconds();
        self.with_conn("fetch_results_for_window", move |conn| {
            let rows = winners::table
                .filter(winners::draw_time.eq(draw_time))
                .filter(winners::category.eq(category.as_str()))
                .order(winners::id.asc())
                .select(WinnerRow::as_select())
                .load::<WinnerRow>(conn)?;
            results_from_rows(rows)
        })
        .await
    }

    async fn fetch_all_results(&self) -> RepositoryResult<Vec<DrawResult>> {
        self.with_conn("fetch_all_results", |conn| {
            let rows = winners::table
                .order(winners::id.asc())
                .select(WinnerRow::as_select())
                .load::<WinnerRow>(conn)?;
            results_from_rows(rows)
        })
        .await
    }

    async fn delete_result(&self, id: i64) -> RepositoryResult<u64> {
        self.with_conn("delete_result", move |conn| {
            let deleted = diesel::delete(winners::table.find(id)).execute(conn)?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn execute_draw(
        &self,
        window: DrawWindow,
        drawn_at: DateTime<Utc>,
        selector: DrawSelector,
    ) -> RepositoryResult<DrawOutcome> {
        self.with_conn("execute_draw", move |conn| {
            conn.transaction(|tx| draw_in_transaction(tx, window, drawn_at, &selector))
        })
        .await
    }
}
