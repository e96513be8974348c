use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Window applied to resolution requests.
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
const MAX_REQUESTS: u32 = 2;

#[derive(Debug, Clone)]
struct Entry {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after_secs: u64,
}

/// In-memory per-caller rate limiter, 2 requests per 60 seconds. Expired
/// entries are swept lazily on access; there is no background task.
#[derive(Clone, Default)]
pub struct RateLimiter {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn check(&self, identity: &str) -> RateLimitDecision {
        self.check_at(identity, Instant::now()).await
    }

    async fn check_at(&self, identity: &str, now: Instant) -> RateLimitDecision {
        let mut entries = self.entries.write().await;

        entries.retain(|_, entry| entry.reset_at > now);

        match entries.get_mut(identity) {
            Some(entry) if entry.count >= MAX_REQUESTS => {
                let retry_after = entry.reset_at.saturating_duration_since(now);
                RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    retry_after_secs: retry_after.as_secs().max(1),
                }
            }
            Some(entry) => {
                entry.count += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining: MAX_REQUESTS - entry.count,
                    retry_after_secs: entry.reset_at.saturating_duration_since(now).as_secs(),
                }
            }
            None => {
                entries.insert(
                    identity.to_string(),
                    Entry {
                        count: 1,
                        reset_at: now + RATE_LIMIT_WINDOW,
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: MAX_REQUESTS - 1,
                    retry_after_secs: RATE_LIMIT_WINDOW.as_secs(),
                }
            }
        }
    }
}
