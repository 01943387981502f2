use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

/// Fixed-window budget applied per key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

/// In-memory limiter keyed by `ip:path`. Single-instance only; state is not
/// shared between replicas.
#[derive(Clone, Default)]
pub struct RateLimiter {
    limit: RateLimit,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

struct Window {
    hits: u32,
    started: Instant,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            windows: Arc::default(),
        }
    }

    /// Count a request against `key`. Ok(remaining) or Err(retry_after).
    pub async fn hit(&self, key: &str) -> Result<u32, Duration> {
        self.hit_at(key, Instant::now()).await
    }

    async fn hit_at(&self, key: &str, now: Instant) -> Result<u32, Duration> {
        let mut windows = self.windows.lock().await;
        let window = windows.entry(key.to_string()).or_insert(Window {
            hits: 0,
            started: now,
        });

        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.limit.window {
            window.hits = 0;
            window.started = now;
        }

        if window.hits >= self.limit.max_requests {
            return Err(self.limit.window.saturating_sub(elapsed));
        }

        window.hits += 1;
        Ok(self.limit.max_requests - window.hits)
    }

    /// Drop windows that ended more than one window ago; returns how many.
    pub async fn purge_stale(&self) -> usize {
        self.purge_stale_at(Instant::now()).await
    }

    async fn purge_stale_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let keep_for = self.limit.window * 2;
        let before = windows.len();
        windows.retain(|_, w| now.saturating_duration_since(w.started) < keep_for);
        before - windows.len()
    }
}

/// Sweep stale rate-limit windows every five minutes.
pub fn spawn_cleanup_worker(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let purged = limiter.purge_stale().await;
            if purged > 0 {
                tracing::debug!(purged, "Rate limiter cleanup: dropped stale windows");
            }
        }
    });
}

/// Rate limiting middleware for the credential endpoints
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = addr.ip().to_string();
    let path = req.uri().path().to_string();

    // Separate budgets per endpoint: a burst of logins does not block register.
    let key = format!("{}:{}", ip, path);

    match state.rate_limiter.hit(&key).await {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, path = %path, remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                ip = %ip,
                path = %path,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimit {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_blocks() {
        let limiter = limiter(3, 60);
        let t0 = Instant::now();

        assert_eq!(limiter.hit_at("k", t0).await, Ok(2));
        assert_eq!(limiter.hit_at("k", t0).await, Ok(1));
        assert_eq!(limiter.hit_at("k", t0).await, Ok(0));

        let retry = limiter.hit_at("k", t0 + Duration::from_secs(20)).await.unwrap_err();
        assert_eq!(retry, Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        assert!(limiter.hit_at("10.0.0.1:/api/auth/login", t0).await.is_ok());
        assert!(limiter.hit_at("10.0.0.1:/api/auth/login", t0).await.is_err());
        assert!(limiter.hit_at("10.0.0.1:/api/auth/register", t0).await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        assert!(limiter.hit_at("k", t0).await.is_ok());
        assert!(limiter.hit_at("k", t0 + Duration::from_secs(59)).await.is_err());
        assert!(limiter.hit_at("k", t0 + Duration::from_secs(60)).await.is_ok());
    }

    #[tokio::test]
    async fn test_purge_drops_only_stale_windows() {
        let limiter = limiter(5, 60);
        let t0 = Instant::now();

        let _ = limiter.hit_at("old", t0).await;
        let _ = limiter.hit_at("fresh", t0 + Duration::from_secs(100)).await;

        assert_eq!(limiter.purge_stale_at(t0 + Duration::from_secs(130)).await, 1);
        assert_eq!(limiter.purge_stale_at(t0 + Duration::from_secs(130)).await, 0);
    }

    #[test]
    fn test_default_limit() {
        let limit = RateLimit::default();
        assert_eq!(limit.max_requests, 5);
        assert_eq!(limit.window, Duration::from_secs(60));
    }
}
