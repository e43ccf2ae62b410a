//! News API handlers.
//!
//! ```text
//! GET    /api/news/all
//! GET    /api/news/{id}
//! POST   /api/news                   {"title":"..","content":"..","category":".."}
//! PUT    /api/news/{id}              {"title":"..","content":"..","category":".."}
//! DELETE /api/news/{id}
//! DELETE /api/news/all
//! POST   /api/news/update-timestamp  {"ObjectId":"..","ConfirmationTimestamp":".."}
//! ```
//!
//! `/all` routes are registered before `/{id}` so the literal segment wins.

use actix_web::{HttpResponse, delete, get, post, put, web};
use event_contracts::ConfirmationMessage;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{News, NewsDraft, NewsService};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{ProblemDetails, parse_path_id};

/// Body of `POST /api/news/update-timestamp`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConfirmationRequest {
    /// Identifier of the news item to confirm.
    #[serde(alias = "objectId")]
    #[schema(example = "6737301a2b9c4e1f0a000001")]
    pub object_id: String,
    /// Confirmation time as a date-time string.
    #[serde(alias = "confirmationTimestamp")]
    #[schema(example = "2024-11-15T11:17:05Z")]
    pub confirmation_timestamp: String,
}

impl From<ConfirmationRequest> for ConfirmationMessage {
    fn from(value: ConfirmationRequest) -> Self {
        Self::new(value.object_id, value.confirmation_timestamp)
    }
}

/// List every news item.
#[utoipa::path(
    get,
    path = "/api/news/all",
    responses(
        (status = 200, description = "All news items", body = [News]),
        (status = 422, description = "Store failure", body = ProblemDetails)
    ),
    tags = ["news"],
    operation_id = "listNews"
)]
#[get("/all")]
pub async fn list_all(service: web::Data<NewsService>) -> ApiResult<web::Json<Vec<News>>> {
    service.list_all().await.map(web::Json)
}

/// Fetch one news item, cache first.
#[utoipa::path(
    get,
    path = "/api/news/{id}",
    params(("id" = String, Path, description = "News identifier")),
    responses(
        (status = 200, description = "News item", body = News),
        (status = 404, description = "No such item", body = ProblemDetails),
        (status = 422, description = "Invalid identifier or backend failure", body = ProblemDetails)
    ),
    tags = ["news"],
    operation_id = "getNews"
)]
#[get("/{id}")]
pub async fn get_by_id(
    service: web::Data<NewsService>,
    path: web::Path<String>,
) -> ApiResult<web::Json<News>> {
    let id = parse_path_id(&path, "news")?;
    service.get_by_id(&id).await.map(web::Json)
}

/// Create a news item and request its registration.
#[utoipa::path(
    post,
    path = "/api/news",
    request_body = NewsDraft,
    responses(
        (status = 200, description = "Item created"),
        (status = 400, description = "Malformed body", body = ProblemDetails),
        (status = 422, description = "Backend failure", body = ProblemDetails)
    ),
    tags = ["news"],
    operation_id = "createNews"
)]
#[post("")]
pub async fn create(
    service: web::Data<NewsService>,
    payload: web::Json<NewsDraft>,
) -> ApiResult<HttpResponse> {
    service.create(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Replace the mutable fields of a news item.
#[utoipa::path(
    put,
    path = "/api/news/{id}",
    params(("id" = String, Path, description = "News identifier")),
    request_body = NewsDraft,
    responses(
        (status = 200, description = "Item updated"),
        (status = 404, description = "No such item", body = ProblemDetails),
        (status = 422, description = "Invalid identifier or backend failure", body = ProblemDetails)
    ),
    tags = ["news"],
    operation_id = "updateNews"
)]
#[put("/{id}")]
pub async fn update(
    service: web::Data<NewsService>,
    path: web::Path<String>,
    payload: web::Json<NewsDraft>,
) -> ApiResult<HttpResponse> {
    let id = parse_path_id(&path, "news")?;
    service.update(&id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Delete one news item.
#[utoipa::path(
    delete,
    path = "/api/news/{id}",
    params(("id" = String, Path, description = "News identifier")),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 404, description = "No such item", body = ProblemDetails),
        (status = 422, description = "Invalid identifier or backend failure", body = ProblemDetails)
    ),
    tags = ["news"],
    operation_id = "deleteNews"
)]
#[delete("/{id}")]
pub async fn delete_by_id(
    service: web::Data<NewsService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_path_id(&path, "news")?;
    service.delete(&id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Delete every news item.
#[utoipa::path(
    delete,
    path = "/api/news/all",
    responses(
        (status = 200, description = "All items deleted"),
        (status = 422, description = "Backend failure", body = ProblemDetails)
    ),
    tags = ["news"],
    operation_id = "deleteAllNews"
)]
#[delete("/all")]
pub async fn delete_all(service: web::Data<NewsService>) -> ApiResult<HttpResponse> {
    service.delete_all().await?;
    Ok(HttpResponse::Ok().finish())
}

/// Apply a confirmation by hand, as the confirmation consumer would.
#[utoipa::path(
    post,
    path = "/api/news/update-timestamp",
    request_body = ConfirmationRequest,
    responses(
        (status = 200, description = "Timestamp updated"),
        (status = 404, description = "No such item", body = ProblemDetails),
        (status = 422, description = "Unreadable identifier or timestamp", body = ProblemDetails)
    ),
    tags = ["news"],
    operation_id = "updateNewsTimestamp"
)]
#[post("/update-timestamp")]
pub async fn update_timestamp(
    service: web::Data<NewsService>,
    payload: web::Json<ConfirmationRequest>,
) -> ApiResult<HttpResponse> {
    let message = ConfirmationMessage::from(payload.into_inner());
    service.apply_confirmation(&message).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Register the news routes under `/api/news`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/news")
            .service(list_all)
            .service(delete_all)
            .service(update_timestamp)
            .service(create)
            .service(get_by_id)
            .service(update)
            .service(delete_by_id),
    );
}
