//! Unit-of-work sessions
//!
//! A session always works inside a transaction: nothing is committed until
//! the caller says so. After `commit` or `rollback` the next statement starts
//! a fresh transaction on a pooled connection.
//!
//! Rows are returned as owned values, so anything read before a commit stays
//! usable after it without another round trip.
//!
//! Closing (or dropping) a session discards uncommitted work and hands the
//! connection back to the pool. That happens on every exit path, including
//! `?` returns and panics.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::error::{DbError, Result};

/// One unit of work against the database
pub struct Session {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl Session {
    /// Acquire a connection and open a transaction on it.
    pub(crate) async fn begin(pool: PgPool) -> Result<Self> {
        let tx = pool.begin().await.map_err(DbError::Connect)?;
        tracing::debug!(pool_size = pool.size(), idle = pool.num_idle(), "session opened");
        Ok(Self { pool, tx: Some(tx) })
    }

    /// Connection for the current transaction, starting one if needed.
    ///
    /// Pass the result straight to sqlx:
    ///
    /// ```ignore
    /// sqlx::query("SELECT 1").execute(session.conn().await?).await?;
    /// ```
    pub async fn conn(&mut self) -> Result<&mut PgConnection> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => {
                tracing::trace!("session starting new transaction");
                self.pool.begin().await.map_err(DbError::Connect)?
            }
        };
        Ok(&mut **self.tx.insert(tx))
    }

    /// True while a transaction is open (begun and not yet committed or rolled back).
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Commit the open transaction, if any.
    ///
    /// Deferred constraint violations surface here.
    pub async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            tracing::debug!("session committed");
        }
        Ok(())
    }

    /// Roll back the open transaction, if any.
    pub async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            tracing::debug!("session rolled back");
        }
        Ok(())
    }

    /// Round trip to the server.
    pub async fn ping(&mut self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.conn().await?).await?;
        Ok(())
    }

    /// Release the session. Equivalent to dropping it.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // an open transaction rolls back when its connection returns to the pool
        tracing::debug!(
            discarded = self.tx.is_some(),
            "session closed"
        );
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("in_transaction", &self.in_transaction())
            .finish_non_exhaustive()
    }
}
