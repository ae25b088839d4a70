//! Request ID middleware - tags every request with an `X-Request-ID`.

use std::future::{Future, Ready, ready};
use std::pin::Pin;

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub static REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied ID that is echoed back; longer ones are replaced.
const MAX_INBOUND_LEN: usize = 128;

/// Request ID of the current request, stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse the caller's ID (from a client or load balancer) when it is sane.
    fn from_inbound(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty() && s.len() <= MAX_INBOUND_LEN)
            .filter(|s| s.chars().all(|c| c.is_ascii_graphic()))
            .map(|s| Self(s.to_string()))
            .unwrap_or_else(Self::generate)
    }
}

/// Middleware that assigns each request an ID, runs the rest of the
/// pipeline inside a span carrying it and echoes it in the response.
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestIdService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdService { service }))
    }
}

pub struct RequestIdService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = RequestId::from_inbound(req.headers().get(REQUEST_ID_HEADER));
        req.extensions_mut().insert(request_id.clone());

        let span = tracing::info_span!("request", request_id = %request_id.as_str());
        let fut = self.service.call(req);

        Box::pin(
            async move {
                let mut res = fut.await?;
                let value = HeaderValue::from_str(request_id.as_str())
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                Ok(res)
            }
            .instrument(span),
        )
    }
}

impl actix_web::FromRequest for RequestId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(RequestId::generate);

        ready(Ok(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_id_is_reused() {
        let header = HeaderValue::from_static("lb-1234");
        assert_eq!(RequestId::from_inbound(Some(&header)).as_str(), "lb-1234");
    }

    #[test]
    fn test_oversized_inbound_id_is_replaced() {
        let long = "x".repeat(MAX_INBOUND_LEN + 1);
        let header = HeaderValue::from_str(&long).unwrap();
        let id = RequestId::from_inbound(Some(&header));
        assert_ne!(id.as_str(), long);
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }
}
