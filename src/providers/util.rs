use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Runs `operation` once, then up to `retries` more times while it fails,
/// sleeping `delay_ms` between attempts. The last error is returned as is.
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) if attempt < retries => {
                attempt += 1;
                warn!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt,
                    retries + 1,
                    err
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let result: Result<&str, String> = with_retry(
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(format!("fail {n}"))
                    } else {
                        Ok("page")
                    }
                }
            },
            3,
            1,
        )
        .await;
        assert_eq!(result, Ok("page"));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_exhausted() {
        let calls = Cell::new(0);
        let result: Result<(), String> = with_retry(
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Err(format!("fail {n}")) }
            },
            1,
            1,
        )
        .await;
        assert_eq!(result, Err("fail 2".to_string()));
        assert_eq!(calls.get(), 2);
    }
}
