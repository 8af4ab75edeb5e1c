//! Delay between retry attempts.
//!
//! Retries are immediate unless a base delay is configured. With a base delay
//! the wait doubles per retry, is capped, and gets up to 10% random jitter so
//! concurrent callers do not hit the provider in lockstep.

use rand::Rng;
use std::time::Duration;

/// Delay before retry number `retry` (1-based). A `base_ms` of zero disables backoff.
pub fn calculate_backoff(retry: u32, base_ms: u64, max_ms: u64) -> Duration {
    let delay_ms = capped_delay_ms(retry, base_ms, max_ms);
    if delay_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(delay_ms + jitter_ms(delay_ms))
}

fn capped_delay_ms(retry: u32, base_ms: u64, max_ms: u64) -> u64 {
    match retry.checked_sub(1) {
        Some(exponent) if base_ms > 0 => base_ms
            .saturating_mul(2u64.saturating_pow(exponent))
            .min(max_ms),
        _ => 0,
    }
}

fn jitter_ms(delay_ms: u64) -> u64 {
    match delay_ms / 10 {
        0 => 0,
        spread => rand::thread_rng().gen_range(0..spread),
    }
}
