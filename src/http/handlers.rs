//! Route handlers: translate HTTP requests into limiter calls and verdicts
//! into JSON responses.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::limiter::{ClientLimits, RateLimiter};

/// Request header carrying the caller identity.
pub const CLIENT_ID_HEADER: &str = "clientID";

/// Uniform JSON body for status/message responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub message: String,
}

/// Client limits as supplied in a `POST /config` body. The window is in
/// seconds. Fields default to zero so a partial or empty body fails the
/// greater-than-zero validation rather than the decode step.
#[derive(Debug, Default, Deserialize)]
pub struct LimitsBody {
    #[serde(default)]
    limit: i64,
    #[serde(default)]
    window: i64,
}

impl LimitsBody {
    fn into_limits(self) -> Option<ClientLimits> {
        if self.limit <= 0 || self.window <= 0 {
            return None;
        }
        let limit = u32::try_from(self.limit).ok()?;
        Some(ClientLimits {
            limit,
            window: Duration::from_secs(self.window as u64),
        })
    }
}

/// Diagnostics view of a client's current state.
#[derive(Debug, Serialize)]
pub struct ClientStatus {
    pub status: u16,
    pub identity: String,
    pub limit: u32,
    pub window_secs: u64,
    pub count: u32,
}

/// Build the application router around a shared limiter.
pub fn router(limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .route("/", get(greet))
        .route(
            "/config",
            post(set_client_limits)
                .get(client_limits)
                .fallback(method_not_allowed),
        )
        .with_state(limiter)
}

fn reply(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse {
            status: status.as_u16(),
            message: message.into(),
        }),
    )
        .into_response()
}

/// The caller identity, if a non-empty `clientID` header is present.
fn client_identity(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CLIENT_ID_HEADER)?.to_str().ok()?;
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Admission-gated greeting.
#[instrument(skip_all)]
async fn greet(State(limiter): State<Arc<RateLimiter>>, headers: HeaderMap) -> Response {
    let Some(identity) = client_identity(&headers) else {
        warn!("request without clientID header");
        return reply(StatusCode::BAD_REQUEST, "No clientID provided");
    };

    let decision = limiter.check_and_admit(&identity, Instant::now());
    if decision.admitted {
        info!(
            identity = %identity,
            count = decision.state.count,
            limit = decision.state.limit,
            "request admitted"
        );
        reply(StatusCode::OK, format!("Hello {identity}"))
    } else {
        info!(identity = %identity, limit = decision.state.limit, "request rejected");
        reply(
            StatusCode::TOO_MANY_REQUESTS,
            format!("Too Many Requests for {identity}"),
        )
    }
}

/// Replace a client's limits at runtime. Overwrites any existing entry and
/// resets its window.
#[instrument(skip_all)]
async fn set_client_limits(
    State(limiter): State<Arc<RateLimiter>>,
    headers: HeaderMap,
    body: Option<Json<LimitsBody>>,
) -> Response {
    let Some(identity) = client_identity(&headers) else {
        warn!("config update without clientID header");
        return reply(StatusCode::BAD_REQUEST, "No clientID provided");
    };

    let Some(limits) = body.and_then(|Json(body)| body.into_limits()) else {
        warn!(identity = %identity, "rejecting non-positive client limits");
        return reply(StatusCode::BAD_REQUEST, "Config data must be greater than 0");
    };

    match limiter.apply_config(&identity, limits, Instant::now()) {
        Ok(()) => {
            info!(
                identity = %identity,
                limit = limits.limit,
                window = ?limits.window,
                "client limits updated"
            );
            reply(StatusCode::OK, format!("New config created for {identity}"))
        }
        Err(e) => reply(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// Read-only view of a client's current limits and counter.
async fn client_limits(
    State(limiter): State<Arc<RateLimiter>>,
    headers: HeaderMap,
) -> Response {
    let Some(identity) = client_identity(&headers) else {
        return reply(StatusCode::BAD_REQUEST, "No clientID provided");
    };

    match limiter.lookup(&identity) {
        Some(state) => (
            StatusCode::OK,
            Json(ClientStatus {
                status: StatusCode::OK.as_u16(),
                identity,
                limit: state.limit,
                window_secs: state.window.as_secs(),
                count: state.count,
            }),
        )
            .into_response(),
        None => reply(
            StatusCode::NOT_FOUND,
            format!("No config found for {identity}"),
        ),
    }
}

async fn method_not_allowed() -> Response {
    reply(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
