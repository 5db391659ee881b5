//! PostgreSQL session repository (feature `postgres`).

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::Instrument;

use crate::{ConnectionManager, DurableSessionStore, SessionSchema, StoreError, redact_target};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Sessions stored in a PostgreSQL table.
///
/// Holds a pool handle plus the four statements derived from its
/// [`SessionSchema`]. Cloning is cheap (the pool is reference counted).
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
    schema: SessionSchema,
    create_sql: String,
    insert_sql: String,
    select_sql: String,
    delete_sql: String,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool, schema: SessionSchema) -> Self {
        Self {
            create_sql: schema.create_table_sql(),
            insert_sql: schema.insert_sql(),
            select_sql: schema.select_sql(),
            delete_sql: schema.delete_sql(),
            pool,
            schema,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &SessionSchema {
        &self.schema
    }
}

fn query_span(operation: &'static str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

impl DurableSessionStore for PgSessionRepository {
    type Error = sqlx::Error;

    async fn prepare_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(&self.create_sql)
            .execute(&self.pool)
            .instrument(query_span("CREATE", &self.create_sql))
            .await?;
        Ok(())
    }

    async fn insert_session(
        &self,
        session_id: &str,
        user_id: u64,
    ) -> Result<(), sqlx::Error> {
        let user_id =
            i64::try_from(user_id).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        sqlx::query(&self.insert_sql)
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .instrument(query_span("INSERT", &self.insert_sql))
            .await?;
        Ok(())
    }

    async fn find_session(
        &self,
        session_id: &str,
    ) -> Result<Option<u64>, sqlx::Error> {
        let user_id: Option<i64> = sqlx::query_scalar(&self.select_sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &self.select_sql))
            .await?;
        user_id
            .map(|id| u64::try_from(id).map_err(|e| sqlx::Error::Decode(Box::new(e))))
            .transpose()
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(&self.delete_sql)
            .bind(session_id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", &self.delete_sql))
            .await?;
        Ok(())
    }

    fn is_unique_violation(&self, error: &sqlx::Error) -> bool {
        is_unique_violation(error)
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().is_some_and(|code| code.as_ref() == UNIQUE_VIOLATION)
        }
        _ => false,
    }
}

impl ConnectionManager {
    /// Opens a PostgreSQL pool, retrying per the manager's policy.
    ///
    /// The DSN's credentials never reach the logs.
    ///
    /// # Errors
    /// [`StoreError::ConnectExhausted`] if every attempt failed.
    pub async fn connect_postgres(
        &self,
        dsn: &str,
        options: PgPoolOptions,
    ) -> Result<PgPool, StoreError> {
        let target = redact_target(dsn);
        self.connect(&target, || options.clone().connect(dsn)).await
    }
}
