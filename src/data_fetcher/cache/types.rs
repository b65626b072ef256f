//! Cache data structures with TTL support

use std::time::{Duration, Instant};

/// Cached HTTP response body with TTL support
#[derive(Debug, Clone)]
pub struct CachedHttpResponse {
    pub data: String,
    pub cached_at: Instant,
    pub ttl_seconds: u64,
}

impl CachedHttpResponse {
    pub fn new(data: String, ttl_seconds: u64) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl_seconds,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > Duration::from_secs(self.ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = CachedHttpResponse::new("{}".to_string(), 300);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_backdated_entry_expires() {
        let mut entry = CachedHttpResponse::new("{}".to_string(), 1);
        if let Some(earlier) = Instant::now().checked_sub(Duration::from_secs(5)) {
            entry.cached_at = earlier;
            assert!(entry.is_expired());
        }
    }
}
