//! Path-prefix reverse proxy in front of the two services.
//!
//! Every request outside `/health` is matched against the [`RouteTable`] and
//! forwarded with its method, path, query, headers and body. Hop-by-hop
//! headers and `host` are not forwarded in either direction. The current
//! trace id is sent downstream so both hops log under one identifier.

pub mod routes;

use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error, info};

use crate::domain::{Error, TRACE_ID_HEADER, TraceId};
use crate::inbound::http::ApiResult;

pub use routes::{Route, RouteTable, RouteTableError};

/// Downstream request timeout.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

fn forwardable(name: &str) -> bool {
    !HOP_BY_HOP.contains(&name) && name != "content-length" && name != TRACE_ID_HEADER
}

/// Shared proxy state: the route table and one pooled HTTP client.
#[derive(Debug, Clone)]
pub struct Gateway {
    routes: RouteTable,
    client: reqwest::Client,
}

impl Gateway {
    /// Build a gateway forwarding with [`UPSTREAM_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(routes: RouteTable) -> Result<Self, reqwest::Error> {
        Self::with_timeout(routes, UPSTREAM_TIMEOUT)
    }

    /// Build a gateway with an explicit downstream timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(routes: RouteTable, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { routes, client })
    }

    /// Routes this gateway resolves against.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    async fn forward(&self, req: &HttpRequest, body: web::Bytes) -> ApiResult<HttpResponse> {
        let path = req.path();
        let route = self.routes.resolve(path).ok_or_else(|| {
            debug!(path, "no gateway route");
            Error::not_found(format!("no route for {path}"))
        })?;
        let path_and_query = req
            .uri()
            .path_and_query()
            .map_or(path, |value| value.as_str());
        let target = route.target(path_and_query);

        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
            .map_err(|err| Error::invalid_request(format!("unsupported method: {err}")))?;
        let mut outbound = self.client.request(method, &target);
        for (name, value) in req.headers() {
            if forwardable(name.as_str()) {
                outbound = outbound.header(name.as_str(), value.as_bytes());
            }
        }
        if let Some(trace_id) = TraceId::current() {
            outbound = outbound.header(TRACE_ID_HEADER, trace_id.to_string());
        }

        let upstream = outbound.body(body.to_vec()).send().await.map_err(|err| {
            error!(url = %target, error = %err, "upstream request failed");
            Error::upstream_unavailable(format!("upstream for {} is unavailable", route.prefix))
        })?;
        let status = StatusCode::from_u16(upstream.status().as_u16()).map_err(|err| {
            error!(url = %target, error = %err, "upstream returned an invalid status");
            Error::upstream_unavailable("upstream returned an invalid status")
        })?;
        let headers: Vec<(HeaderName, HeaderValue)> = upstream
            .headers()
            .iter()
            .filter(|(name, _)| forwardable(name.as_str()))
            .filter_map(|(name, value)| {
                let name = HeaderName::from_bytes(name.as_str().as_bytes()).ok()?;
                let value = HeaderValue::from_bytes(value.as_bytes()).ok()?;
                Some((name, value))
            })
            .collect();
        let bytes = upstream.bytes().await.map_err(|err| {
            error!(url = %target, error = %err, "upstream body read failed");
            Error::upstream_unavailable(format!("upstream for {} is unavailable", route.prefix))
        })?;

        info!(url = %target, status = status.as_u16(), "forwarded");
        let mut response = HttpResponse::build(status).body(bytes);
        for (name, value) in headers {
            response.headers_mut().append(name, value);
        }
        Ok(response)
    }
}

/// Catch-all handler forwarding to the resolved upstream.
pub async fn proxy(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    gateway.forward(&req, body).await
}
