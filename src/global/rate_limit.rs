//! Upload rate limiting.
//!
//! Per-client sliding window with a temporary block once the limit is crossed.
//! State lives in this process only, so limits are advisory: they reset on restart
//! and are not shared between instances.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            RateLimitDecision::Limited { retry_after_secs } => Some(*retry_after_secs),
            RateLimitDecision::Allowed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    count: u32,
    window_start: Instant,
    blocked_until: Option<Instant>,
}

impl ClientWindow {
    fn fresh(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
            blocked_until: None,
        }
    }
}

/// Counts upload requests per client key (IP).
#[derive(Debug)]
pub struct UploadRateLimiter {
    clients: Mutex<HashMap<String, ClientWindow>>,
    config: RateLimitConfig,
}

impl UploadRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn check(&self, client: &str) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    /// Registers one request from `client` at `now` and decides whether it may proceed.
    pub fn check_at(&self, client: &str, now: Instant) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision::Allowed {
                remaining: self.config.max_requests,
            };
        }

        let mut clients = self.lock();
        let entry = clients
            .entry(client.to_string())
            .or_insert_with(|| ClientWindow::fresh(now));

        if let Some(blocked_until) = entry.blocked_until {
            if now < blocked_until {
                return RateLimitDecision::Limited {
                    retry_after_secs: ceil_secs(blocked_until - now),
                };
            }
            // Block served; start over with a clean window.
            *entry = ClientWindow::fresh(now);
        }

        if now.duration_since(entry.window_start) >= self.config.window {
            *entry = ClientWindow::fresh(now);
        }

        entry.count += 1;

        if entry.count > self.config.max_requests {
            entry.blocked_until = Some(now + self.config.block_duration);
            tracing::warn!(
                client = %client,
                count = entry.count,
                block_secs = self.config.block_duration.as_secs(),
                "Upload rate limit exceeded; client blocked"
            );
            return RateLimitDecision::Limited {
                retry_after_secs: ceil_secs(self.config.block_duration),
            };
        }

        RateLimitDecision::Allowed {
            remaining: self.config.max_requests - entry.count,
        }
    }

    /// Drops clients whose window and block have both expired.
    pub fn purge_idle_at(&self, now: Instant) -> usize {
        let mut clients = self.lock();
        let before = clients.len();
        let window = self.config.window;
        clients.retain(|_, entry| {
            let blocked = entry.blocked_until.is_some_and(|until| now < until);
            blocked || now.duration_since(entry.window_start) < window
        });
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    pub fn reset_client(&self, client: &str) {
        self.lock().remove(client);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ClientWindow>> {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Periodically purges idle entries. The returned handle is aborted at shutdown.
pub fn spawn_purge_task(
    limiter: Arc<UploadRateLimiter>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let purged = limiter.purge_idle_at(Instant::now());
            if purged > 0 {
                tracing::debug!(purged = purged, "Purged idle rate limiter entries");
            }
        }
    })
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

/// Client key: first `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware guarding the upload route.
pub async fn upload_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    match state.rate_limiter.check(&key) {
        RateLimitDecision::Allowed { .. } => next.run(request).await,
        RateLimitDecision::Limited { retry_after_secs } => {
            metrics::counter!("upload_rejected_total", "reason" => "rate_limit").increment(1);
            AppError::RateLimited {
                message: format!(
                    "Muitos envios de arquivos. Tente novamente em {} segundos.",
                    retry_after_secs
                ),
                retry_after_secs,
            }
            .into_response()
        }
    }
}
