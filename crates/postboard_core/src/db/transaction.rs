//! Scoped transaction wrappers around store calls.
//!
//! # Invariants
//! - The closure's `Ok` result is returned only after a successful commit.
//! - An `Err` (or unwinding) leaves the database untouched: the guard rolls
//!   back when dropped without commit.
//! - Read transactions are deferred and take no write lock up front.

use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `work` inside an `IMMEDIATE` transaction on `conn`.
///
/// Commits when `work` returns `Ok`, rolls back when it returns `Err`.
/// Repositories built over the provided `Transaction` join it, since it
/// dereferences to `Connection`.
///
/// # Errors
/// - Returns the closure error unchanged.
/// - Returns begin/commit failures converted through `From<rusqlite::Error>`.
pub fn with_transaction<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    run_in_transaction(conn, TransactionBehavior::Immediate, work)
}

/// Runs read-only `work` inside a `DEFERRED` transaction on `conn`.
///
/// Same commit/rollback contract as [`with_transaction`], but concurrent
/// readers are not blocked behind a reserved write lock.
pub fn with_read_transaction<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    run_in_transaction(conn, TransactionBehavior::Deferred, work)
}

fn run_in_transaction<T, E, F>(
    conn: &mut Connection,
    behavior: TransactionBehavior,
    work: F,
) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let tx = conn.transaction_with_behavior(behavior)?;
    match work(&tx) {
        Ok(value) => {
            tx.commit()?;
            debug!("event=tx_commit module=db status=ok");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!("event=tx_rollback module=db status=error error={rollback_err}");
            } else {
                debug!("event=tx_rollback module=db status=ok");
            }
            Err(err)
        }
    }
}
