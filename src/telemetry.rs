//! Logging setup and per-request tracing
//!
//! Logs go to stderr, as pretty text in development and JSON in production.
//! Each request is tagged with an `x-request-id` (kept from the client when
//! present) and wrapped in a span carrying that id, so every log line emitted
//! while handling it can be correlated.

use crate::config::{AppInfoConfig, LogFormat};
use axum::http::{Request, Response};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::{Span, error, info, info_span};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Length of generated request ids
pub const REQUEST_ID_LEN: usize = 10;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Host name for log metadata, `unknown` when the OS lookup fails
pub fn hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Generates short random alphanumeric request ids
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortRequestId;

impl MakeRequestId for ShortRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(REQUEST_ID_LEN)
            .map(char::from)
            .collect();
        id.parse().ok().map(RequestId::new)
    }
}

/// Builds the request span; used with `TraceLayer::make_span_with`
#[derive(Debug, Clone)]
pub struct RequestSpan {
    service: String,
    env: &'static str,
}

impl RequestSpan {
    pub fn new(app: &AppInfoConfig) -> Self {
        Self {
            service: app.name.clone(),
            env: app.env.as_str(),
        }
    }

    pub fn make_span<B>(&self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        info_span!(
            "request",
            service = %self.service,
            env = self.env,
            request_id = %request_id,
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

/// Completion line: `status` and latency
pub fn on_response<B>(response: &Response<B>, latency: Duration, _span: &Span) {
    info!(
        status = response.status().as_u16(),
        latency_ms = latency.as_millis() as u64,
        "Request completed"
    );
}

/// Failure line for 5xx responses and transport errors
pub fn on_failure(failure: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    error!(
        failure = %failure,
        latency_ms = latency.as_millis() as u64,
        "Request failed"
    );
}
