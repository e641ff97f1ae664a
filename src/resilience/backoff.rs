//! Linear backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before retry number `attempt` (1-based).
///
/// `base * attempt + jitter`, jitter uniform in `[0, base)`. Deliberately
/// linear, not exponential.
pub fn calculate_backoff(attempt: u32, base: Duration) -> Duration {
    calculate_backoff_with(attempt, base, &mut rand::thread_rng())
}

/// Same as [`calculate_backoff`] with an explicit random source.
pub fn calculate_backoff_with<R: Rng + ?Sized>(attempt: u32, base: Duration, rng: &mut R) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let linear = base_ms.saturating_mul(u64::from(attempt));
    let jitter = if base_ms > 0 {
        rng.gen_range(0..base_ms)
    } else {
        0
    };

    Duration::from_millis(linear.saturating_add(jitter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_backoff_is_linear_plus_bounded_jitter() {
        let base = Duration::from_millis(200);
        for _ in 0..200 {
            let first = calculate_backoff(1, base).as_millis();
            assert!((200..400).contains(&first), "first retry delay {}", first);

            let second = calculate_backoff(2, base).as_millis();
            assert!((400..600).contains(&second), "second retry delay {}", second);
        }
    }

    #[test]
    fn test_zero_attempt_and_zero_base() {
        assert_eq!(calculate_backoff(0, Duration::from_millis(200)), Duration::ZERO);
        assert_eq!(calculate_backoff(3, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let base = Duration::from_millis(100);
        let a = calculate_backoff_with(3, base, &mut StdRng::seed_from_u64(7));
        let b = calculate_backoff_with(3, base, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a >= Duration::from_millis(300) && a < Duration::from_millis(400));
    }
}
