//! OpenAPI documents for the two services.
//!
//! Each service publishes its own document, served by Swagger UI at `/docs`
//! in debug builds and printed by `openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{ErrorCode, News, NewsDraft, User, UserDraft};
use crate::inbound::http::error::ProblemDetails;
use crate::inbound::http::news::ConfirmationRequest;
use crate::inbound::http::users::ProcessNewsRequest;

/// News service API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SportNews news service",
        description = "News items, their read-through cache and manual confirmation."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        crate::inbound::http::news::list_all,
        crate::inbound::http::news::get_by_id,
        crate::inbound::http::news::create,
        crate::inbound::http::news::update,
        crate::inbound::http::news::delete_by_id,
        crate::inbound::http::news::delete_all,
        crate::inbound::http::news::update_timestamp,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(News, NewsDraft, ConfirmationRequest, ProblemDetails, ErrorCode)),
    tags(
        (name = "news", description = "News item operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct NewsApiDoc;

/// Users service API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SportNews users service",
        description = "Users and their registered news counters."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        crate::inbound::http::users::create,
        crate::inbound::http::users::get_by_id,
        crate::inbound::http::users::delete_by_id,
        crate::inbound::http::users::process_news,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(User, UserDraft, ProcessNewsRequest, ProblemDetails, ErrorCode)),
    tags(
        (name = "users", description = "User operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct UsersApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api/news/all")]
    #[case("/api/news/{id}")]
    #[case("/api/news")]
    #[case("/api/news/update-timestamp")]
    #[case("/health/ready")]
    fn news_document_lists_paths(#[case] path: &str) {
        assert!(NewsApiDoc::openapi().paths.paths.contains_key(path));
    }

    #[rstest]
    #[case("/api/users")]
    #[case("/api/users/{id}")]
    #[case("/api/users/process-news")]
    #[case("/health/live")]
    fn users_document_lists_paths(#[case] path: &str) {
        assert!(UsersApiDoc::openapi().paths.paths.contains_key(path));
    }

    #[rstest]
    fn problem_details_schema_is_registered() {
        let doc = NewsApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.schemas.contains_key("ProblemDetails"));
        assert!(components.schemas.contains_key("News"));
    }
}
