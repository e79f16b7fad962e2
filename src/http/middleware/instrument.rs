//! Request/response instrumentation middleware.
//!
//! # Responsibilities
//! - Track active sessions from bearer tokens
//! - Count requests and record latency per `(method, route template)`
//! - Detect completed purchases in order responses
//! - Emit one sanitized log record per request
//!
//! # Design Decisions
//! - Registry updates happen inline before the response is returned;
//!   encoding and pushes run on the transport's tracked task set
//! - Bodies are buffered only when their exact size is known and within
//!   the configured limit, otherwise they stream through untouched
//! - Unmatched requests fall back to the raw path as route

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{MatchedPath, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::config::InstrumentationConfig;
use crate::export::Exporter;
use crate::http::purchase;
use crate::http::sanitize::sanitize;
use crate::telemetry::names::*;
use crate::telemetry::{
    ActiveUsers, LogLevel, MetricRecord, MetricRegistry, RequestKey, SeriesKey,
};

/// Logged in place of a body that was not buffered.
pub const BODY_NOT_CAPTURED: &str = "<body too large>";

/// Shared state for [`instrument`].
#[derive(Clone)]
pub struct InstrumentationState {
    registry: Arc<MetricRegistry>,
    active_users: Arc<ActiveUsers>,
    exporter: Exporter,
    purchase_method: Method,
    purchase_route: Arc<str>,
    max_body_bytes: usize,
}

impl InstrumentationState {
    pub fn new(
        registry: Arc<MetricRegistry>,
        active_users: Arc<ActiveUsers>,
        exporter: Exporter,
        config: &InstrumentationConfig,
    ) -> Self {
        let purchase_method =
            Method::from_bytes(config.purchase_method.as_bytes()).unwrap_or(Method::POST);
        Self {
            registry,
            active_users,
            exporter,
            purchase_method,
            purchase_route: Arc::from(config.purchase_route.as_str()),
            max_body_bytes: config.max_body_bytes,
        }
    }

    fn is_purchase(&self, key: &RequestKey) -> bool {
        key.method == self.purchase_method.as_str() && key.route == *self.purchase_route
    }

    fn count(&self, key: &SeriesKey, unit: &str, delta: u64) -> Option<MetricRecord> {
        let delta = i64::try_from(delta).unwrap_or(i64::MAX);
        match self.registry.increment_counter(key, unit, delta) {
            Ok(total) => Some(MetricRecord::counter(key, unit, total)),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected counter update");
                None
            }
        }
    }

    fn revenue(&self, micros: u64) -> Option<MetricRecord> {
        let key = SeriesKey::new(PIZZA_REVENUE_TOTAL);
        match self.registry.increment_scaled_counter(
            &key,
            UNIT_CENTS,
            micros,
            purchase::MICROS_PER_CENT,
        ) {
            Ok(cents) => Some(MetricRecord::counter(&key, UNIT_CENTS, cents)),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected revenue update");
                None
            }
        }
    }

    fn gauge(&self, key: &SeriesKey, unit: &str, value: f64) -> Option<MetricRecord> {
        match self.registry.set_gauge(key, unit, value) {
            Ok(()) => Some(MetricRecord::gauge(key, unit, value)),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected gauge update");
                None
            }
        }
    }

    /// Apply a finished request to the registry and schedule its export.
    fn record(&self, observed: Observed) {
        let mut outbound = Vec::with_capacity(5);
        let latency_ms = observed.elapsed_ms.round();

        outbound.extend(self.count(&observed.key.series(HTTP_REQUESTS_TOTAL), UNIT_COUNT, 1));
        outbound.extend(self.gauge(
            &SeriesKey::new(HTTP_REQUEST_LATENCY_MS),
            UNIT_MILLIS,
            latency_ms,
        ));

        if self.is_purchase(&observed.key) {
            let order = observed
                .response_body
                .as_deref()
                .and_then(purchase::inspect);
            if let Some(order) = order {
                outbound.extend(self.count(
                    &SeriesKey::new(PIZZA_PURCHASES_TOTAL),
                    UNIT_COUNT,
                    order.items,
                ));
                outbound.extend(self.revenue(order.revenue_micros));
            }
            outbound.extend(self.gauge(
                &SeriesKey::new(PIZZA_ORDER_LATENCY_MS),
                UNIT_MILLIS,
                latency_ms,
            ));
        }

        let exporter = self.exporter.clone();
        self.exporter.transport().spawn(async move {
            for record in &outbound {
                exporter.push_metric(record);
            }
            let level = LogLevel::from_status(observed.status);
            exporter.log(level, "http-request", observed.log_payload(latency_ms));
        });
    }
}

/// Facts about one completed request.
struct Observed {
    key: RequestKey,
    path: String,
    status: u16,
    has_auth: bool,
    elapsed_ms: f64,
    request_body: Option<Bytes>,
    response_body: Option<Bytes>,
}

impl Observed {
    fn log_payload(&self, latency_ms: f64) -> serde_json::Value {
        json!({
            "method": self.key.method,
            "path": self.path,
            "statusCode": self.status,
            "hasAuth": self.has_auth,
            "reqBody": body_text(self.request_body.as_ref()),
            "resBody": body_text(self.response_body.as_ref()),
            "duration": format!("{}ms", latency_ms as u64),
        })
    }
}

fn body_text(body: Option<&Bytes>) -> String {
    match body {
        Some(bytes) if bytes.is_empty() => "{}".to_string(),
        Some(bytes) => sanitize(&String::from_utf8_lossy(bytes)).into_owned(),
        None => BODY_NOT_CAPTURED.to_string(),
    }
}

/// Session identifier from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace()
        .nth(1)
}

/// Buffer `body` if its exact size is known and within `limit`.
/// Returns a replacement body plus the captured bytes, if any.
async fn capture(body: Body, limit: usize) -> Result<(Body, Option<Bytes>), axum::Error> {
    let fits = body
        .size_hint()
        .upper()
        .is_some_and(|n| n <= limit as u64);
    if !fits {
        return Ok((body, None));
    }
    let bytes = axum::body::to_bytes(body, limit).await?;
    Ok((Body::from(bytes.clone()), Some(bytes)))
}

/// Middleware entry point; install with `middleware::from_fn_with_state`.
pub async fn instrument(
    State(state): State<InstrumentationState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let raw_path = request.uri().path().to_string();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| raw_path.clone());
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or(raw_path);
    let has_auth = request.headers().contains_key(AUTHORIZATION);
    if let Some(token) = bearer_token(request.headers()) {
        state.active_users.observe(token);
    }

    let (parts, body) = request.into_parts();
    let (response, request_body) = match capture(body, state.max_body_bytes).await {
        Ok((body, captured)) => (next.run(Request::from_parts(parts, body)).await, captured),
        // Only exact-size bodies are read here; a failed read cannot be
        // replayed to the handler, so the request is answered here.
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Failed to read request body");
            (StatusCode::BAD_REQUEST.into_response(), None)
        }
    };

    let (parts, body) = response.into_parts();
    let (response, response_body) = match capture(body, state.max_body_bytes).await {
        Ok((body, captured)) => (Response::from_parts(parts, body), captured),
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to read response body");
            (StatusCode::INTERNAL_SERVER_ERROR.into_response(), None)
        }
    };

    let observed = Observed {
        key: RequestKey::new(method.as_str(), route),
        path,
        status: response.status().as_u16(),
        has_auth,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        request_body,
        response_body,
    };
    tracing::debug!(
        request = %observed.key,
        status = observed.status,
        elapsed_ms = observed.elapsed_ms,
        "Request observed"
    );
    state.record(observed);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_body_text() {
        assert_eq!(body_text(None), BODY_NOT_CAPTURED);
        assert_eq!(body_text(Some(&Bytes::new())), "{}");
        assert_eq!(
            body_text(Some(&Bytes::from_static(br#"{"password":"pw"}"#))),
            r#"{"password":"****"}"#
        );
    }

    #[tokio::test]
    async fn test_capture_respects_limit() {
        let (_, captured) = capture(Body::from("hello"), 16).await.unwrap();
        assert_eq!(captured.as_deref(), Some(&b"hello"[..]));

        let (body, captured) = capture(Body::from("hello world"), 4).await.unwrap();
        assert!(captured.is_none());
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello world");
    }
}
