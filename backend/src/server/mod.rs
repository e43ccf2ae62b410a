//! App construction and HTTP server wiring for the three binaries.
//!
//! The `*_app` builders are shared by the binaries and the integration tests
//! so both exercise the same middleware, extractor configs and routes.

mod lifecycle;

pub use lifecycle::{run_until, run_until_ctrl_c};

use std::net::SocketAddr;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::{NewsApiDoc, UsersApiDoc};
use crate::domain::{NewsService, UserService};
use crate::gateway::{self, Gateway};
use crate::inbound::http::error::{json_config, path_config};
use crate::inbound::http::health::{self, HealthState};
use crate::inbound::http::{news, users};
use crate::middleware::Trace;

/// App serving the news API.
pub fn news_app(
    service: web::Data<NewsService>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(service)
        .app_data(health_state)
        .app_data(json_config())
        .app_data(path_config())
        .wrap(Trace)
        .configure(news::configure)
        .configure(health::configure);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", NewsApiDoc::openapi()));

    app
}

/// App serving the users API.
pub fn users_app(
    service: web::Data<UserService>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(service)
        .app_data(health_state)
        .app_data(json_config())
        .app_data(path_config())
        .wrap(Trace)
        .configure(users::configure)
        .configure(health::configure);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", UsersApiDoc::openapi()));

    app
}

/// App forwarding everything except the health endpoints to the upstream services.
pub fn gateway_app(
    gateway: web::Data<Gateway>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(gateway)
        .app_data(health_state)
        .wrap(Trace)
        .configure(health::configure)
        .default_service(web::to(gateway::proxy))
}

/// Bind the news API. Signal handling is left to [`run_until_ctrl_c`].
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_news_server(
    service: web::Data<NewsService>,
    health_state: web::Data<HealthState>,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    Ok(
        HttpServer::new(move || news_app(service.clone(), health_state.clone()))
            .disable_signals()
            .bind(bind_addr)?
            .run(),
    )
}

/// Bind the users API. Signal handling is left to [`run_until_ctrl_c`].
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_users_server(
    service: web::Data<UserService>,
    health_state: web::Data<HealthState>,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    Ok(
        HttpServer::new(move || users_app(service.clone(), health_state.clone()))
            .disable_signals()
            .bind(bind_addr)?
            .run(),
    )
}

/// Bind the gateway. Signal handling is left to [`run_until_ctrl_c`].
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_gateway_server(
    gateway: web::Data<Gateway>,
    health_state: web::Data<HealthState>,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    Ok(
        HttpServer::new(move || gateway_app(gateway.clone(), health_state.clone()))
            .disable_signals()
            .bind(bind_addr)?
            .run(),
    )
}
