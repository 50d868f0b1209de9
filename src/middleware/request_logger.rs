//! Request logging middleware for API request/response logging.
//!
//! Upload tokens appear in paths, so the path is truncated before logging:
//! a leaked log line must not leak a live upload capability.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::time::Instant;
use tracing::{info, warn};

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

/// Redact token-carrying path segments down to a recognizable prefix.
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.len() > 16 && segment.chars().all(|c| c.is_ascii_alphanumeric()) {
                format!("{}...", &segment[..8])
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
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
        let start = Instant::now();
        let method = req.method().to_string();
        let path = sanitize_path(req.path());
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        info!(
            target: "api",
            method = %method,
            path = %path,
            remote_addr = %remote_addr,
            "Request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let elapsed = start.elapsed();
            let status = res.status();

            if status.is_success() {
                info!(
                    target: "api",
                    method = %method,
                    path = %path,
                    status = %status.as_u16(),
                    duration_ms = %elapsed.as_millis(),
                    "Request completed"
                );
            } else {
                warn!(
                    target: "api",
                    method = %method,
                    path = %path,
                    status = %status.as_u16(),
                    duration_ms = %elapsed.as_millis(),
                    "Request failed"
                );
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_truncates_tokens() {
        let path = "/api/v1/uploads/aB3dEfGh1jKlMnOpQrStUvWxYz012345/status";
        assert_eq!(sanitize_path(path), "/api/v1/uploads/aB3dEfGh.../status");
    }

    #[test]
    fn test_sanitize_path_leaves_short_segments() {
        assert_eq!(sanitize_path("/api/v1/health"), "/api/v1/health");
    }
}
