//! Deadline enforcement for store and hasher calls

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::DomainError;

/// Run `fut` with an upper bound of `limit`
///
/// Expiry yields `DomainError::Timeout`; the call is not retried.
pub async fn with_timeout<T, F>(limit: Duration, what: &str, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation = what, limit_ms = limit.as_millis() as u64, "Call timed out");
            Err(DomainError::timeout(format!(
                "{} did not complete within {}ms",
                what,
                limit.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageCode;

    #[tokio::test]
    async fn test_completes_in_time() {
        let result = with_timeout(Duration::from_secs(1), "fast", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: Result<(), _> = with_timeout(Duration::from_secs(1), "failing", async {
            Err(DomainError::not_found("gone"))
        })
        .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_expiry() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(10), "slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.code(), MessageCode::ErrorTimeout);
        assert!(err.to_string().contains("slow"));
    }
}
