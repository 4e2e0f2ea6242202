//! # Per-client rate limiting
//!
//! Every route shares one [`RateLimiter`]. Each client gets a fixed window
//! (default 30 requests per 60 seconds). The request that exceeds the limit
//! is answered with `429 Too Many Requests` before any handler runs.
//!
//! Counters live in a [`RateLimitStore`] injected through [`AppState`], so
//! tests and alternative deployments can swap the storage. The default
//! [`InMemoryRateLimitStore`] resets a client's window once it expires and
//! [`RateLimiter::sweep_expired`] evicts stale clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::config::RateLimitConfig;
use crate::error::AppError;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Hit count for one client inside its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub hits: u32,
    pub resets_at: Instant,
}

/// Storage for per-client counters.
///
/// `increment` must count the hit and return the new total atomically with
/// respect to other callers for the same key.
pub trait RateLimitStore: Send + Sync {
    fn increment(&self, key: &str, now: Instant, window: Duration) -> WindowCount;

    /// Drop every window that has expired at `now`. Returns how many were removed.
    fn sweep(&self, now: Instant) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, WindowCount>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn increment(&self, key: &str, now: Instant, window: Duration) -> WindowCount {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let entry = windows.entry(key.to_string()).or_insert(WindowCount {
            hits: 0,
            resets_at: now + window,
        });

        if now >= entry.resets_at {
            *entry = WindowCount {
                hits: 0,
                resets_at: now + window,
            };
        }

        entry.hits = entry.hits.saturating_add(1);
        *entry
    }

    fn sweep(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        windows.retain(|_, count| count.resets_at > now);
        before - windows.len()
    }
}

/// Outcome of one rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Whole seconds until the window resets, rounded up.
    pub reset_secs: u64,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs.max(1)),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let count = self.store.increment(key, now, self.window);
        let remaining_time = count.resets_at.saturating_duration_since(now);
        let reset_secs = remaining_time.as_secs() + u64::from(remaining_time.subsec_nanos() > 0);

        RateDecision {
            allowed: count.hits <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(count.hits),
            reset_secs,
        }
    }

    pub fn sweep_expired(&self) -> usize {
        self.store.sweep(Instant::now())
    }
}

/// Identify the caller. Uses the first `X-Forwarded-For` hop when the
/// deployment trusts its proxy, otherwise the peer address.
pub fn client_key(request: &Request<Body>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RATELIMIT_RESET, HeaderValue::from(decision.reset_secs));
}

/// Axum middleware applying the shared limiter to every request.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request, state.config.server.trust_proxy);
    let decision = state.limiter.check(&key);

    if !decision.allowed {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        let mut response = AppError::RateLimited {
            retry_after: decision.reset_secs,
        }
        .into_response();
        apply_headers(response.headers_mut(), &decision);
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), &decision);
    response
}
