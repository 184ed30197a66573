//! Transaction-per-request wrapper
//!
//! `db_task` begins a transaction on a pooled connection, hands the
//! connection to the task, then commits on `Ok` and rolls back on `Err`.
//! The connection goes back to the pool on every path: dropping an
//! uncommitted `Transaction` rolls it back, so early returns and panics
//! inside the task leave nothing behind.

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

/// Run `task` inside one transaction.
///
/// # Example
///
/// ```ignore
/// let members = db_task(&pool, |conn| {
///     Box::pin(async move { Ok::<_, PageError>(UserRepo::new(conn).list_members().await?) })
/// })
/// .await?;
/// ```
pub async fn db_task<T, E, F>(pool: &PgPool, task: F) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>>,
    E: From<sqlx::Error>,
{
    let mut tx = pool.begin().await?;

    match task(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(error = %rollback, "Transaction rollback failed");
            } else {
                tracing::debug!("Transaction rolled back");
            }
            Err(err)
        }
    }
}
