//! Storage engine: the connection pool and session factory
//!
//! Construct one `Storage` at startup and pass it (or clones of it) to
//! whatever needs database access. Clones share the same pool.

use futures::future::BoxFuture;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::error::{DbError, Result};
use crate::schema;
use crate::session::Session;

/// Shared handle to the database
#[derive(Clone, Debug)]
pub struct Storage {
    pool: PgPool,
}

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Open connections, idle or in use
    pub size: u32,
    pub idle: usize,
    pub max_connections: u32,
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
}

impl Storage {
    /// Build the pool and open a first connection to verify the target.
    ///
    /// # Errors
    ///
    /// `DbError::Config` for an unparsable url, `DbError::Connect` if the
    /// server cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = pool_options(config)
            .connect_with(config.connect_options()?)
            .await
            .map_err(DbError::Connect)?;

        tracing::info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            "Database engine ready"
        );
        Ok(Self { pool })
    }

    /// Build the pool without connecting; the first session connects.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = pool_options(config).connect_lazy_with(config.connect_options()?);
        tracing::debug!(url = %config.redacted_url(), "Database engine created (lazy)");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes. Safe to run on every startup.
    pub async fn initialize(&self) -> Result<()> {
        schema::create_all(&self.pool).await
    }

    /// Open a new session.
    ///
    /// The caller owns the session; dropping it releases the connection.
    pub async fn session(&self) -> Result<Session> {
        Session::begin(self.pool.clone()).await
    }

    /// Run `f` with a fresh session and close the session afterwards,
    /// whatever `f` returned.
    ///
    /// Nothing is committed implicitly: `f` calls `session.commit()` when
    /// its work should persist.
    ///
    /// ```ignore
    /// let user = storage
    ///     .with_session(|s| Box::pin(async move {
    ///         let user = UserRepo::new(s).create(new_user).await?;
    ///         s.commit().await?;
    ///         Ok::<_, DbError>(user)
    ///     }))
    ///     .await?;
    /// ```
    pub async fn with_session<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, std::result::Result<T, E>>,
        E: From<DbError>,
    {
        let mut session = self.session().await?;
        let result = f(&mut session).await;
        session.close();
        result
    }

    pub fn pool_status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    /// Close the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database engine closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
