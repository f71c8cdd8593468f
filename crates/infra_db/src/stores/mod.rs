//! Transactional store sessions
//!
//! Each session is one unit of work: reads run against the pool, writes run
//! inside a lazily-begun transaction held by the session, and `commit`
//! applies the whole batch and reports how many rows it touched. A session
//! is built per logical operation and dropped afterwards; dropping an
//! uncommitted session rolls the transaction back.

mod catalog;
mod provider;

pub use catalog::PgCountryStore;
pub use provider::PgProviderStore;

use sqlx::postgres::{PgArguments, PgPool};
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;

use crate::error::DatabaseError;

struct SessionState {
    tx: Option<Transaction<'static, Postgres>>,
    affected: u64,
}

/// Shared write-side machinery for the Postgres store sessions
pub(crate) struct PgSession {
    pool: PgPool,
    state: Mutex<SessionState>,
}

impl PgSession {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self {
            pool,
            state: Mutex::new(SessionState {
                tx: None,
                affected: 0,
            }),
        }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs a write inside the session transaction, accumulating its
    /// affected-row count.
    pub(crate) async fn execute(
        &self,
        query: sqlx::query::Query<'_, Postgres, PgArguments>,
    ) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().await;
        if state.tx.is_none() {
            state.tx = Some(self.pool.begin().await?);
        }
        let Some(tx) = state.tx.as_mut() else {
            return Err(DatabaseError::TransactionFailed(
                "transaction unavailable".into(),
            ));
        };
        let done = query.execute(&mut **tx).await?;
        state.affected += done.rows_affected();
        Ok(())
    }

    /// Runs an `INSERT .. RETURNING id` inside the session transaction.
    /// The generated key is visible to later statements in the same
    /// transaction before commit.
    pub(crate) async fn insert_returning_id(
        &self,
        query: sqlx::query::QueryScalar<'_, Postgres, i32, PgArguments>,
    ) -> Result<i32, DatabaseError> {
        let mut state = self.state.lock().await;
        if state.tx.is_none() {
            state.tx = Some(self.pool.begin().await?);
        }
        let Some(tx) = state.tx.as_mut() else {
            return Err(DatabaseError::TransactionFailed(
                "transaction unavailable".into(),
            ));
        };
        let id = query.fetch_one(&mut **tx).await?;
        state.affected += 1;
        Ok(id)
    }

    /// Commits the transaction, if any writes opened one, and returns the
    /// accumulated affected-row count. A session with no staged writes
    /// commits nothing and reports zero.
    pub(crate) async fn commit(&self) -> Result<u64, DatabaseError> {
        let mut state = self.state.lock().await;
        let affected = std::mem::take(&mut state.affected);
        if let Some(tx) = state.tx.take() {
            tx.commit()
                .await
                .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        }
        Ok(affected)
    }
}
