use std::future::Future;
use std::time::Duration;

/// Delay schedule between attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// `step * n` after the n-th failed attempt.
    Linear { step: Duration },
    /// `base * 2^(n-1)`, capped at `max`, plus up to 25% random jitter.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after `attempt` (1-based) failed and before the next one.
    pub fn delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self {
            Backoff::Linear { step } => *step * attempt,
            Backoff::Exponential { base, max } => {
                let exp = 2u32.saturating_pow(attempt - 1);
                let delay = base.saturating_mul(exp).min(*max);
                let jitter_ms = fastrand::u64(0..=delay.as_millis() as u64 / 4);
                delay + Duration::from_millis(jitter_ms)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear { step },
        }
    }

    pub fn exponential(max_attempts: u32, base: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { base, max },
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Runs `op` until it succeeds or the policy's attempts are used up, sleeping
/// per the backoff in between. `op` receives the 1-based attempt number. The
/// last error is returned on exhaustion.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    with_retry_notify(policy, op, |_, _, _| {}).await
}

/// Like [`with_retry`], calling `notify(attempt, error, next_delay)` after
/// every failed attempt. `next_delay` is `None` when no attempt is left.
pub async fn with_retry_notify<T, E, F, Fut, N>(
    policy: &RetryPolicy,
    mut op: F,
    mut notify: N,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    N: FnMut(u32, &E, Option<Duration>),
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                notify(attempt, &err, None);
                return Err(err);
            }
            Err(err) => {
                let delay = policy.backoff.delay(attempt);
                notify(attempt, &err, Some(delay));
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[test]
    fn test_linear_backoff_has_no_jitter() {
        let backoff = Backoff::Linear {
            step: Duration::from_millis(1000),
        };
        assert_eq!(backoff.delay(1), Duration::from_millis(1000));
        assert_eq!(backoff.delay(2), Duration::from_millis(2000));
        assert_eq!(backoff.delay(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_exponential_backoff_is_capped_with_bounded_jitter() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(10),
        };
        for _ in 0..50 {
            let first = backoff.delay(1);
            assert!(first >= Duration::from_secs(1));
            assert!(first <= Duration::from_millis(1250));

            let late = backoff.delay(10);
            assert!(late >= Duration::from_secs(10));
            assert!(late <= Duration::from_millis(12500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_first_try_without_sleeping() {
        let policy = RetryPolicy::linear(2, Duration::from_secs(1));
        let start = Instant::now();
        let result: Result<u32, String> = with_retry(&policy, |attempt| async move { Ok(attempt) }).await;
        assert_eq!(result, Ok(1));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_then_succeed_waits_one_step() {
        let policy = RetryPolicy::linear(2, Duration::from_millis(1000));
        let start = Instant::now();
        let second_attempt_at = Cell::new(None);

        let result: Result<&str, String> = with_retry(&policy, |attempt| {
            if attempt == 2 {
                second_attempt_at.set(Some(start.elapsed()));
            }
            async move {
                if attempt == 1 {
                    Err("connection reset".to_string())
                } else {
                    Ok("second")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("second"));
        let waited = second_attempt_at.get().unwrap();
        assert!(waited >= Duration::from_millis(1000), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let policy = RetryPolicy::linear(3, Duration::from_millis(1000));
        let calls = Cell::new(0);
        let start = Instant::now();

        let result: Result<(), String> = with_retry(&policy, |attempt| {
            calls.set(calls.get() + 1);
            async move { Err(format!("failure {attempt}")) }
        })
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.get(), 3);
        // 1s after the first failure, 2s after the second, none after the last
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let policy = RetryPolicy::linear(0, Duration::from_secs(1));
        let calls = Cell::new(0);
        let result: Result<(), &str> = with_retry(&policy, |_| {
            calls.set(calls.get() + 1);
            async { Err("nope") }
        })
        .await;
        assert_eq!(result, Err("nope"));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_reports_each_failure() {
        let policy = RetryPolicy::linear(2, Duration::from_millis(500));
        let mut seen = Vec::new();
        let _: Result<(), &str> = with_retry_notify(
            &policy,
            |_| async { Err("down") },
            |attempt, err, delay| seen.push((attempt, err.to_string(), delay)),
        )
        .await;

        assert_eq!(
            seen,
            vec![
                (1, "down".to_string(), Some(Duration::from_millis(500))),
                (2, "down".to_string(), None),
            ]
        );
    }
}
