use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{GuardError, Result, rate_limit_headers};
use crate::metrics::{RATE_LIMIT_CHECKS, RATE_LIMIT_REJECTIONS, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::policy::{ActionCategory, RateLimitKey, RateLimitPolicy, Scope};
use crate::rate_limit::{RateLimitResult, RateLimiter, key_fingerprint};
use crate::state::AppState;

pub const WALLET_HEADER: &str = "x-wallet-address";

/// Consumes one unit of quota for `key`, turning a denial into
/// [`GuardError::RateLimited`].
pub fn enforce(
    limiter: &RateLimiter,
    key: &str,
    policy: RateLimitPolicy,
    action: ActionCategory,
) -> Result<RateLimitResult> {
    if key.trim().is_empty() {
        return Err(GuardError::invalid("rate limit key must not be empty"));
    }
    RATE_LIMIT_CHECKS.with_label_values(&[action.as_str()]).inc();

    let result = limiter.check_and_consume(key, policy.window_ms, policy.max_requests);
    if result.success {
        return Ok(result);
    }

    RATE_LIMIT_REJECTIONS
        .with_label_values(&[action.as_str()])
        .inc();
    let retry_after_secs = result.retry_after_secs(limiter.now_millis());
    tracing::warn!(
        key = %key_fingerprint(key),
        action = %action,
        limit = result.limit,
        retry_after = retry_after_secs,
        "rate limit exceeded"
    );
    Err(GuardError::RateLimited {
        result,
        retry_after_secs,
    })
}

fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Client IP: first `X-Forwarded-For` hop, then `X-Real-IP`, then the peer
/// address.
pub fn client_ip(request: &Request) -> String {
    let forwarded = header(request, "x-forwarded-for")
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded.or_else(|| header(request, "x-real-ip")) {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn client_wallet(request: &Request) -> Option<&str> {
    header(request, WALLET_HEADER)
}

/// Every key a request is throttled under. The IP key always applies; a
/// declared wallet adds its own key on top, since the header is unverified.
pub fn client_keys(request: &Request, action: ActionCategory) -> Result<Vec<RateLimitKey>> {
    let mut keys = vec![RateLimitKey::new(Scope::Ip, action, &client_ip(request))?];
    if let Some(wallet) = client_wallet(request) {
        keys.push(RateLimitKey::new(Scope::Wallet, action, wallet)?);
    }
    Ok(keys)
}

// Route-level state: which preset this layer applies
#[derive(Clone)]
pub struct RateLimitGuard {
    pub state: Arc<AppState>,
    pub action: ActionCategory,
}

impl RateLimitGuard {
    pub fn new(state: Arc<AppState>, action: ActionCategory) -> Self {
        Self { state, action }
    }
}

pub async fn rate_limit_middleware(
    State(guard): State<RateLimitGuard>,
    request: Request,
    next: Next,
) -> Response {
    let keys = match client_keys(&request, guard.action) {
        Ok(keys) => keys,
        Err(e) => return e.into_response(),
    };
    let policy = guard.state.policies.get(guard.action);

    // headers report whichever key is closest to its quota
    let mut tightest: Option<RateLimitResult> = None;
    for key in &keys {
        match enforce(&guard.state.limiter, &key.to_string(), policy, guard.action) {
            Ok(result) => {
                if tightest.is_none_or(|t| result.remaining < t.remaining) {
                    tightest = Some(result);
                }
            }
            Err(e) => return e.into_response(),
        }
    }

    let mut response = next.run(request).await;
    if let Some(result) = tightest {
        response.headers_mut().extend(rate_limit_headers(&result));
    }
    response
}

// Request counter, latency histogram and completion log
pub async fn request_metrics(request: Request, next: Next) -> Response {
    REQUEST_TOTAL.inc();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start_time = Instant::now();

    let response = next.run(request).await;

    let elapsed = start_time.elapsed();
    REQUEST_LATENCY.observe(elapsed.as_secs_f64());
    tracing::debug!(
        method = %method,
        path = %path,
        status = %response.status(),
        duration_ms = elapsed.as_millis() as u64,
        "request completed"
    );
    response
}
