//! HTTP mapping for domain errors.
//!
//! Failures are rendered as RFC 7807 problem details so every endpoint of
//! both services, and the gateway, returns the same error shape. Extractor
//! failures (malformed JSON, unreadable paths) are funnelled through the same
//! mapping by the configs returned from [`json_config`] and [`path_config`].

use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, ObjectId, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Media type of problem details bodies.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// RFC 7807 problem details body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// URI reference identifying the problem type.
    #[serde(rename = "type")]
    #[schema(example = "https://tools.ietf.org/html/rfc9110#section-15.5.5")]
    pub kind: String,
    /// Short summary of the problem type.
    #[schema(example = "Not Found")]
    pub title: String,
    /// HTTP status code.
    #[schema(example = 404)]
    pub status: u16,
    /// Explanation specific to this occurrence.
    #[schema(example = "news with id 6737301a2b9c4e1f0a000001 not found")]
    pub detail: String,
    /// Correlation identifier of the failing request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ProblemDetails {
    /// Build the body for `error`.
    #[must_use]
    pub fn from_error(error: &Error) -> Self {
        let status = status_for(error.code());
        Self {
            kind: type_uri(status).to_owned(),
            title: error.code().title().to_owned(),
            status: status.as_u16(),
            detail: error.message().to_owned(),
            trace_id: error.trace_id().map(str::to_owned),
        }
    }
}

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
    }
}

fn type_uri(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "https://tools.ietf.org/html/rfc9110#section-15.5.1",
        StatusCode::NOT_FOUND => "https://tools.ietf.org/html/rfc9110#section-15.5.5",
        StatusCode::UNPROCESSABLE_ENTITY => "https://tools.ietf.org/html/rfc4918#section-11.2",
        StatusCode::BAD_GATEWAY => "https://tools.ietf.org/html/rfc9110#section-15.6.3",
        _ => "about:blank",
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header((header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON)));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.body(serde_json::to_string(&ProblemDetails::from_error(self)).unwrap_or_default())
    }
}

/// Parse a path identifier, rejecting anything that is not 24 hex
/// characters.
///
/// # Errors
/// Returns an `Unprocessable` error naming `entity` and the raw value.
pub fn parse_path_id(raw: &str, entity: &str) -> ApiResult<ObjectId> {
    raw.parse().map_err(|err| {
        debug!(id = raw, error = %err, "rejected path identifier");
        Error::unprocessable(format!("{entity} identifier {raw} is not valid"))
    })
}

/// JSON extractor config that reports malformed bodies as problem details.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        debug!(error = %err, "rejected request body");
        Error::invalid_request(format!("request body is not valid: {err}")).into()
    })
}

/// Path extractor config that reports unreadable segments as problem details.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        debug!(error = %err, "rejected request path");
        Error::invalid_request(format!("request path is not valid: {err}")).into()
    })
}
