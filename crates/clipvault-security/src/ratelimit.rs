//! Sliding-window request counters
//!
//! Fixed one-minute buckets keyed by origin. Counters are process-local
//! and reset on restart.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy)]
struct Bucket {
    minute: i64,
    count: u32,
}

/// Per-origin request counter over fixed minute buckets.
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request from `origin` and return the total for the current
    /// minute bucket, including this one.
    pub fn register(&self, origin: &str) -> u32 {
        self.register_at(origin, Utc::now())
    }

    pub fn register_at(&self, origin: &str, now: DateTime<Utc>) -> u32 {
        let minute = now.timestamp().div_euclid(60);
        let mut buckets = self.buckets.lock().unwrap();

        // Opportunistic cleanup so stale origins do not accumulate.
        if buckets.len() > 1024 {
            buckets.retain(|_, bucket| bucket.minute == minute);
        }

        let bucket = buckets.entry(origin.to_string()).or_insert(Bucket {
            minute,
            count: 0,
        });
        if bucket.minute != minute {
            bucket.minute = minute;
            bucket.count = 0;
        }
        bucket.count += 1;
        bucket.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn counts_within_one_bucket() {
        let limiter = RateLimiter::new();
        let now = Utc::now();
        assert_eq!(limiter.register_at("a", now), 1);
        assert_eq!(limiter.register_at("a", now), 2);
        assert_eq!(limiter.register_at("b", now), 1);
    }

    #[test]
    fn bucket_rolls_over_on_new_minute() {
        let limiter = RateLimiter::new();
        let now = Utc::now();
        for _ in 0..5 {
            limiter.register_at("a", now);
        }
        let next_minute = now + Duration::seconds(60);
        assert_eq!(limiter.register_at("a", next_minute), 1);
    }
}
