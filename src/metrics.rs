use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};

use actix_service::{Service, Transform};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::get;
use actix_web::web::Data;
use actix_web::Error;
use futures::future::{ok, Ready};
use futures::Future;

use crate::server::Response;

/// request counters since the server started
#[derive(Debug, Default)]
pub struct Metrics {
    pub requests: AtomicU32,
    pub errors: AtomicU32,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub requests: u32,
    pub errors: u32,
}

impl Metrics {
    pub fn new() -> Metrics {
        Metrics::default()
    }

    pub fn load(&self) -> MetricsResponse {
        MetricsResponse {
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    fn record(&self, server_error: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if server_error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[get("/server/stats")]
pub async fn route(metrics: Data<Metrics>) -> Response {
    http_ok_json!(metrics.load());
}

/// Counts every request and every response with a 5xx status
#[derive(Debug)]
pub struct Middleware;

impl Middleware {
    pub fn default() -> Middleware {
        Middleware
    }
}

impl<S, B> Transform<S> for Middleware
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestCountMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestCountMiddleware { service })
    }
}

pub struct RequestCountMiddleware<S> {
    service: S,
}

impl<S, B> Service for RequestCountMiddleware<S>
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: ServiceRequest) -> Self::Future {
        let metrics = request.app_data::<Data<Metrics>>().cloned();

        let fut = self.service.call(request);

        Box::pin(async move {
            let res = fut.await;

            if let Some(metrics) = metrics {
                let server_error = match &res {
                    Ok(res) => res.response().status().is_server_error(),
                    Err(_) => true,
                };
                metrics.record(server_error);
            }

            res
        })
    }
}
