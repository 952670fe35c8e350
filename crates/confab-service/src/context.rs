//! Shared dependencies for service operations.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};

use confab_db::error::{DbError, DbResult};
use confab_db::store::Store;

use crate::error::ServiceResult;

/// Per-command execution context: the store, the bounded store-call
/// timeout, and the instant the command is evaluated at.
///
/// `now` is injected rather than read from the system clock so that
/// past-start validation and blocked-slot "today" projection are
/// deterministic under test.
pub struct Context<'a> {
    pub store: &'a dyn Store,
    pub op_timeout: Duration,
    pub now: DateTime<Utc>,
}

impl<'a> Context<'a> {
    #[must_use]
    pub fn new(store: &'a dyn Store, op_timeout: Duration, now: DateTime<Utc>) -> Self {
        Self {
            store,
            op_timeout,
            now,
        }
    }

    /// ## Summary
    /// Runs a store future under the configured timeout.
    ///
    /// ## Errors
    /// Surfaces a retryable [`DbError::Timeout`] when the deadline expires,
    /// distinct from any domain error.
    pub async fn run<T>(&self, fut: impl Future<Output = DbResult<T>>) -> ServiceResult<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_elapsed) => {
                tracing::error!(timeout = ?self.op_timeout, "Store operation timed out");
                Err(DbError::Timeout(self.op_timeout).into())
            }
        }
    }

    /// The scheduling wall-clock instant for this command.
    #[must_use]
    pub fn wall_clock(&self) -> NaiveDateTime {
        self.now.naive_utc()
    }
}
