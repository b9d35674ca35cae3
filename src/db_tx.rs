use libsql::Connection;
use std::future::Future;
use std::pin::Pin;

use crate::Db;

/// Execute a function within a database transaction, returning handler-compatible errors
///
/// The write lock is held for the whole transaction, so concurrent readers never
/// observe a half-applied write. The closure must return a boxed future to handle
/// lifetime issues with async closures.
pub async fn with_transaction<F, T, E>(db: &Db, f: F) -> Result<T, E>
where
    F: for<'a> FnOnce(&'a Connection) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>,
    E: From<TransactionError>,
{
    let conn = db.write().await;

    conn.execute("BEGIN TRANSACTION", ())
        .await
        .map_err(|_| TransactionError::Begin)?;

    match f(&*conn).await {
        Ok(result) => {
            if let Err(e) = conn.execute("COMMIT", ()).await {
                tracing::error!("Commit failed, rolling back: {}", e);
                // A failed COMMIT can leave the transaction open on the shared connection.
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(TransactionError::Commit.into());
            }
            Ok(result)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", ()).await;
            Err(e)
        }
    }
}

/// Errors that can occur during transaction management
#[derive(Debug)]
pub enum TransactionError {
    Begin,
    Commit,
}
