use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rand::Rng;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, warn};

use crate::config::engine::EngineConfig;
use crate::error::AppError;

/// Future returned by transactional closures; borrows the transaction.
pub type TxnFuture<'t, R> = Pin<Box<dyn Future<Output = Result<R, AppError>> + Send + 't>>;

/// Bounded retry for optimistic-lock conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

const MAX_BACKOFF: Duration = Duration::from_secs(1);

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Exponential delay after `attempt` failed (1-based), capped at one second.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

impl From<&EngineConfig> for RetryPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self::new(config.txn_max_attempts, config.txn_backoff)
    }
}

/// Runs `f` in a fresh transaction: commit on `Ok`, rollback on `Err`.
pub async fn with_txn<R, F>(db: &DatabaseConnection, f: F) -> Result<R, AppError>
where
    F: for<'t> FnOnce(&'t DatabaseTransaction) -> TxnFuture<'t, R>,
{
    let txn = db.begin().await?;
    match f(&txn).await {
        Ok(val) => {
            txn.commit().await?;
            Ok(val)
        }
        Err(err) => {
            // Best-effort rollback; preserve original error
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// [`with_txn`] retried while it fails with an optimistic-lock conflict.
///
/// Each attempt re-reads inside a new transaction, so `f` must build its
/// future from owned inputs. After `max_attempts` the conflict surfaces as
/// `CONCURRENT_MODIFICATION`; every other error is returned at once.
pub async fn with_txn_retry<R, F>(
    db: &DatabaseConnection,
    policy: RetryPolicy,
    operation: &'static str,
    mut f: F,
) -> Result<R, AppError>
where
    F: for<'t> FnMut(&'t DatabaseTransaction) -> TxnFuture<'t, R>,
{
    let mut attempt = 1;
    loop {
        match with_txn(db, &mut f).await {
            Ok(val) => {
                if attempt > 1 {
                    debug!(operation, attempt, "transaction succeeded after retry");
                }
                return Ok(val);
            }
            Err(err) if err.is_optimistic_lock() && attempt < policy.max_attempts => {
                let backoff = policy.backoff_for(attempt);
                let jitter = jitter_for(backoff);
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    backoff_ms = (backoff + jitter).as_millis() as u64,
                    "optimistic lock conflict, retrying"
                );
                tokio::time::sleep(backoff + jitter).await;
                attempt += 1;
            }
            Err(err) if err.is_optimistic_lock() => {
                warn!(operation, attempt, "giving up after repeated conflicts");
                return Err(AppError::concurrent_modification(format!(
                    "{operation}: gave up after {attempt} attempts ({})",
                    err.detail()
                )));
            }
            Err(err) => return Err(err),
        }
    }
}

/// Up to half the backoff, so racing writers spread out.
fn jitter_for(backoff: Duration) -> Duration {
    let half = backoff.as_millis() as u64 / 2;
    if half == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=half))
}
