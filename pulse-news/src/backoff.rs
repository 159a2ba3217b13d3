//! Retry backoff policy for provider calls
//!
//! Pure policy: given the attempt number and an optional provider-supplied
//! retry hint, compute how long to wait before the next attempt.

use std::time::Duration;

/// Exponential backoff base in milliseconds
pub const BASE_BACKOFF_MS: u64 = 1_000;

/// Compute the wait before retry `attempt` (1-based).
///
/// The base policy is exponential: `base * 2^(attempt-1)`. A provider
/// hint (`Retry-After`, in seconds) can only lengthen the wait, never
/// shorten it: the result is the maximum of the exponential value and
/// the hint.
pub fn compute_backoff(attempt: u32, retry_after_secs: Option<u64>) -> Duration {
    // cap the shift so a runaway attempt counter cannot overflow
    let shift = attempt.saturating_sub(1).min(20);
    let exponential_ms = BASE_BACKOFF_MS << shift;
    let hint_ms = retry_after_secs
        .map(|secs| secs.saturating_mul(1_000))
        .unwrap_or(0);
    Duration::from_millis(exponential_ms.max(hint_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_without_hint() {
        assert_eq!(compute_backoff(1, None), Duration::from_millis(1_000));
        assert_eq!(compute_backoff(2, None), Duration::from_millis(2_000));
        assert_eq!(compute_backoff(3, None), Duration::from_millis(4_000));
        assert_eq!(compute_backoff(4, None), Duration::from_millis(8_000));
    }

    #[test]
    fn test_hint_extends_the_wait() {
        // 5s hint beats the 1s/2s/4s exponential values
        assert_eq!(compute_backoff(1, Some(5)), Duration::from_secs(5));
        assert_eq!(compute_backoff(2, Some(5)), Duration::from_secs(5));
        assert_eq!(compute_backoff(3, Some(5)), Duration::from_secs(5));
    }

    #[test]
    fn test_hint_never_shortens_the_wait() {
        // exponential at attempt 3 is 4s; a 1s hint must not reduce it
        assert_eq!(compute_backoff(3, Some(1)), Duration::from_secs(4));
    }

    #[test]
    fn test_zero_hint_is_ignored() {
        assert_eq!(compute_backoff(2, Some(0)), Duration::from_millis(2_000));
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let wait = compute_backoff(u32::MAX, None);
        assert_eq!(wait, Duration::from_millis(BASE_BACKOFF_MS << 20));
    }
}
