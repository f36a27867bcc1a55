//! Request correlation and timing.
//!
//! `RequestTracking` resolves the request id (incoming `x-request-id` or a
//! fresh v4 uuid), echoes it back with the response time, and reports slow or
//! failed requests. It must wrap outside `TracingLogger` so the id is in the
//! request extensions before `RequestIdRootSpan` opens the root span.

use std::future::{ready, Ready};
use std::time::{Duration, Instant};

use actix_web::{
    body::MessageBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(1000);

/// Correlation id of the current request, stored in the request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Takes a non-empty, valid `x-request-id` header or generates a new id.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match incoming {
            Some(value) => Self(value.to_string()),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn format_response_time(elapsed: Duration) -> String {
    format!("{:.2}ms", elapsed.as_secs_f64() * 1000.0)
}

/// Root span that records the caller's correlation id next to the
/// fields `TracingLogger` already captures.
pub struct RequestIdRootSpan;

impl RootSpanBuilder for RequestIdRootSpan {
    fn on_request_start(request: &ServiceRequest) -> Span {
        let correlation_id = request
            .extensions()
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(|| RequestId::from_headers(request.headers()));
        tracing_actix_web::root_span!(request, correlation_id = %correlation_id.as_str())
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

pub struct RequestTracking;

impl<S, B> Transform<S, ServiceRequest> for RequestTracking
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTrackingMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTrackingMiddleware { service }))
    }
}

pub struct RequestTrackingMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTrackingMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let request_id = RequestId::from_headers(req.headers());
        req.extensions_mut().insert(request_id.clone());

        let method = req.method().to_string();
        let path = req.path().to_string();
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let elapsed = started.elapsed();
            let duration_ms = elapsed.as_millis() as u64;

            let headers = res.headers_mut();
            if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            if let Ok(value) = HeaderValue::from_str(&format_response_time(elapsed)) {
                headers.insert(HeaderName::from_static(RESPONSE_TIME_HEADER), value);
            }

            if elapsed > SLOW_REQUEST_THRESHOLD {
                tracing::warn!(
                    request_id = %request_id.as_str(),
                    method = %method,
                    path = %path,
                    duration_ms,
                    "Slow request detected"
                );
            }

            let status = res.status();
            if status.as_u16() >= 400 {
                tracing::error!(
                    request_id = %request_id.as_str(),
                    method = %method,
                    path = %path,
                    status_code = status.as_u16(),
                    duration_ms,
                    "Request error"
                );
            }

            Ok(res)
        })
    }
}
