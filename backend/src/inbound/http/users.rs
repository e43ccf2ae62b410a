//! Users API handlers.
//!
//! ```text
//! POST   /api/users               {"name":"Ada"}
//! GET    /api/users/{id}
//! DELETE /api/users/{id}
//! POST   /api/users/process-news  {"ObjectId":"..","UserId":".."}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use event_contracts::NewsProcessMessage;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserDraft, UserService};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{ProblemDetails, parse_path_id};

/// Body of `POST /api/users/process-news`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProcessNewsRequest {
    /// Identifier of the news item being registered.
    #[serde(alias = "objectId")]
    #[schema(example = "6737301a2b9c4e1f0a000001")]
    pub object_id: String,
    /// Identifier of the user whose counter is incremented.
    #[serde(alias = "userId")]
    #[schema(example = "67372df1077cd2c1072a883b")]
    pub user_id: String,
}

impl From<ProcessNewsRequest> for NewsProcessMessage {
    fn from(value: ProcessNewsRequest) -> Self {
        Self::new(value.object_id, value.user_id)
    }
}

/// Create a user with a zero counter.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserDraft,
    responses(
        (status = 200, description = "User created"),
        (status = 400, description = "Malformed body", body = ProblemDetails),
        (status = 422, description = "Store failure", body = ProblemDetails)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("")]
pub async fn create(
    service: web::Data<UserService>,
    payload: web::Json<UserDraft>,
) -> ApiResult<HttpResponse> {
    service.create(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "No such user", body = ProblemDetails),
        (status = 422, description = "Invalid identifier or store failure", body = ProblemDetails)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/{id}")]
pub async fn get_by_id(
    service: web::Data<UserService>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_path_id(&path, "user")?;
    service.get_by_id(&id).await.map(web::Json)
}

/// Delete one user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "No such user", body = ProblemDetails),
        (status = 422, description = "Invalid identifier or store failure", body = ProblemDetails)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/{id}")]
pub async fn delete_by_id(
    service: web::Data<UserService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_path_id(&path, "user")?;
    service.delete(&id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Register a news item by hand, as the registration consumer would.
#[utoipa::path(
    post,
    path = "/api/users/process-news",
    request_body = ProcessNewsRequest,
    responses(
        (status = 200, description = "Counter incremented and confirmation sent"),
        (status = 404, description = "No such user", body = ProblemDetails),
        (status = 422, description = "Invalid identifier or store failure", body = ProblemDetails)
    ),
    tags = ["users"],
    operation_id = "processNews"
)]
#[post("/process-news")]
pub async fn process_news(
    service: web::Data<UserService>,
    payload: web::Json<ProcessNewsRequest>,
) -> ApiResult<HttpResponse> {
    let message = NewsProcessMessage::from(payload.into_inner());
    service.process_news(&message).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Register the users routes under `/api/users`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .service(process_news)
            .service(create)
            .service(get_by_id)
            .service(delete_by_id),
    );
}
