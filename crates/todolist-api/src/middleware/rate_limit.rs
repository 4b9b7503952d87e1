use crate::utils::ip_extraction::client_ip;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::ErrorResponse;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please slow down.";

/// Fixed-window counter for one client key
#[derive(Clone)]
struct RateLimitBucket {
    count: u32,
    reset_at: Instant,
}

impl RateLimitBucket {
    fn new(window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: Instant::now() + window,
        }
    }

    fn check_and_increment(&mut self, limit: u32, window: Duration) -> (bool, u32) {
        let now = Instant::now();

        if now >= self.reset_at {
            self.count = 0;
            self.reset_at = now + window;
        }

        if self.count < limit {
            self.count += 1;
            (true, limit.saturating_sub(self.count))
        } else {
            (false, 0)
        }
    }

    fn reset_in(&self) -> Duration {
        self.reset_at.saturating_duration_since(Instant::now())
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32, reset_in: Duration },
    Limited { reset_in: Duration },
}

/// Sharded fixed-window rate limiter
///
/// Keys are hashed onto independent shards, each a `HashMap` behind its own
/// mutex, so requests from different clients rarely contend. A key's counter is
/// only ever mutated while its shard lock is held.
#[derive(Clone)]
pub struct HttpRateLimiter {
    shards: Vec<Arc<Mutex<HashMap<String, RateLimitBucket>>>>,
    limit: u32,
    window: Duration,
    max_buckets: usize,
    trusted_proxy_count: usize,
}

impl HttpRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_shards(limit, window, 16)
    }

    pub fn with_shards(limit: u32, window: Duration, shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            limit,
            window,
            max_buckets: 10_000,
            trusted_proxy_count: 0,
        }
    }

    /// Number of trusted proxies used when deriving the client key
    pub fn with_trusted_proxies(mut self, trusted_proxy_count: usize) -> Self {
        self.trusted_proxy_count = trusted_proxy_count;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn shard_for(&self, key: &str) -> &Arc<Mutex<HashMap<String, RateLimitBucket>>> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    fn is_live(bucket: &RateLimitBucket, now: Instant, grace: Duration) -> bool {
        bucket.reset_at > now || (now - bucket.reset_at) < grace
    }

    /// Drop buckets whose window ended more than one window ago
    pub async fn cleanup_expired_buckets(&self) -> usize {
        let now = Instant::now();
        let mut total_cleaned = 0;

        for shard in &self.shards {
            let mut buckets = shard.lock().await;
            let before_count = buckets.len();
            buckets.retain(|_key, bucket| Self::is_live(bucket, now, self.window));
            total_cleaned += before_count - buckets.len();
        }

        if total_cleaned > 0 {
            tracing::debug!(
                buckets_cleaned = total_cleaned,
                "Cleaned up expired rate limit buckets"
            );
        }
        total_cleaned
    }

    /// Count one request for `key` and decide whether it may proceed
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let mut buckets = self.shard_for(key).lock().await;

        if buckets.len() >= self.max_buckets {
            let now = Instant::now();
            buckets.retain(|_key, bucket| Self::is_live(bucket, now, self.window));

            // Still full: evict the bucket closest to expiry
            if buckets.len() >= self.max_buckets {
                let oldest_key = buckets
                    .iter()
                    .min_by_key(|(_, bucket)| bucket.reset_at)
                    .map(|(k, _)| k.clone());
                if let Some(key_to_remove) = oldest_key {
                    buckets.remove(&key_to_remove);
                }
            }
        }

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| RateLimitBucket::new(self.window));

        let (allowed, remaining) = bucket.check_and_increment(self.limit, self.window);
        let reset_in = bucket.reset_in();
        if allowed {
            RateLimitDecision::Allowed {
                remaining,
                reset_in,
            }
        } else {
            RateLimitDecision::Limited { reset_in }
        }
    }

    /// Periodically sweep expired buckets until the runtime shuts down
    pub fn spawn_cleanup(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.cleanup_expired_buckets().await;
            }
        })
    }
}

fn insert_header(response: &mut Response, name: &'static str, value: u64) {
    if let Ok(header_value) = HeaderValue::from_str(&value.to_string()) {
        response.headers_mut().insert(name, header_value);
    }
}

/// HTTP rate limiting middleware
///
/// Keys requests by client IP. Adds `X-RateLimit-Limit`, `X-RateLimit-Remaining`
/// and `X-RateLimit-Reset` (seconds) to every response; requests over the limit
/// get `429 Too Many Requests` with `Retry-After` and never reach the handler.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<HttpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request, rate_limiter.trusted_proxy_count);
    let key = format!("ip:{}", ip);
    let limit = u64::from(rate_limiter.limit());

    match rate_limiter.check(&key).await {
        RateLimitDecision::Allowed {
            remaining,
            reset_in,
        } => {
            let mut response = next.run(request).await;
            insert_header(&mut response, "X-RateLimit-Limit", limit);
            insert_header(&mut response, "X-RateLimit-Remaining", u64::from(remaining));
            insert_header(&mut response, "X-RateLimit-Reset", reset_in.as_secs().max(1));
            response
        }
        RateLimitDecision::Limited { reset_in } => {
            let reset_seconds = reset_in.as_secs().max(1);
            tracing::warn!(
                client_ip = %ip,
                path = %request.uri().path(),
                limit,
                retry_after_secs = reset_seconds,
                "Rate limit exceeded"
            );

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse::new(RATE_LIMITED_MESSAGE)),
            )
                .into_response();
            insert_header(&mut response, "X-RateLimit-Limit", limit);
            insert_header(&mut response, "X-RateLimit-Remaining", 0);
            insert_header(&mut response, "X-RateLimit-Reset", reset_seconds);
            insert_header(&mut response, "Retry-After", reset_seconds);
            response
        }
    }
}
