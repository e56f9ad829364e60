//! 数据库写操作重试
//!
//! Lock contention (SQLite BUSY/LOCKED, MySQL deadlock or lock wait timeout,
//! PostgreSQL serialization failure) is transient: the whole operation is
//! run again with exponential backoff. Constraint violations are not retried.

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                return matches!(
                    code.as_ref(),
                    // MySQL: deadlock, lock wait timeout
                    "1213" | "1205"
                    // PostgreSQL: serialization failure, deadlock
                    | "40001" | "40P01"
                    // SQLite: BUSY, LOCKED (and their extended codes)
                    | "5" | "6" | "261" | "517" | "773" | "262"
                );
            }
            is_retryable_message(&sqlx_err.to_string().to_lowercase())
        }
        RuntimeErr::Internal(msg) => is_retryable_message(&msg.to_lowercase()),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_retryable_message(err_str: &str) -> bool {
    err_str.contains("deadlock")
        || err_str.contains("lock wait timeout")
        || err_str.contains("database is locked")
        || err_str.contains("database table is locked")
        || err_str.contains("serialization failure")
}

/// 重试配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 20,
            max_delay_ms: 1000,
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms.max(config.retry_base_delay_ms),
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `max_retries` is exhausted.
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(result);
            }
            Err(e) if is_retryable_error(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Operation '{}' hit lock contention (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// 指数退避 + 0-25% 随机抖动
fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    use rand::RngExt;
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp_delay.min(max_ms);
    let jitter = rand::rng().random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
        }
    }

    fn locked() -> DbErr {
        DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "database is locked".to_string(),
        ))
    }

    #[test]
    fn test_lock_errors_are_retryable() {
        assert!(is_retryable_error(&locked()));
        assert!(is_retryable_error(&DbErr::Query(
            sea_orm::error::RuntimeErr::Internal("Deadlock found when trying to get lock".into())
        )));
        assert!(is_retryable_error(&DbErr::ConnectionAcquire(
            sea_orm::error::ConnAcquireErr::Timeout
        )));
    }

    #[test]
    fn test_constraint_and_lookup_errors_are_not_retryable() {
        assert!(!is_retryable_error(&DbErr::RecordNotFound("mods".into())));
        assert!(!is_retryable_error(&DbErr::Exec(
            sea_orm::error::RuntimeErr::Internal("UNIQUE constraint failed: mods.mod_id".into())
        )));
        assert!(!is_retryable_error(&DbErr::Custom("boom".into())));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        assert!((10..=12).contains(&calculate_backoff(1, 10, 1000)));
        assert!((40..=50).contains(&calculate_backoff(3, 10, 1000)));
        assert!((1000..=1250).contains(&calculate_backoff(20, 10, 1000)));
    }

    #[test]
    fn test_config_from_database_config() {
        let db = DatabaseConfig {
            retry_count: 7,
            retry_base_delay_ms: 50,
            retry_max_delay_ms: 10,
            ..Default::default()
        };
        let retry = RetryConfig::from(&db);
        assert_eq!(retry.max_retries, 7);
        assert_eq!(retry.max_delay_ms, 50);
    }

    #[tokio::test]
    async fn test_retries_until_lock_clears() {
        let calls = AtomicU32::new(0);
        let result = with_retry("insert_mod", fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(locked()) } else { Ok(n) } }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result = with_retry("record_usage", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(locked()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result = with_retry("record_usage", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::RecordNotFound("telemetry".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
