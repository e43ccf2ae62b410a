//! API gateway forwarding `/api/news` and `/api/users` to the services.

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::info;

use sportnews::config::GatewaySettings;
use sportnews::gateway::{Gateway, RouteTable};
use sportnews::inbound::http::health::HealthState;
use sportnews::server::{create_gateway_server, run_until_ctrl_c};
use sportnews::telemetry::init_tracing;

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = GatewaySettings::load_from_iter(std::env::args_os())
        .map_err(|e| eyre!("failed to load gateway settings: {e}"))?;
    let routes = match &settings.routes_file {
        Some(path) => RouteTable::from_file(path)
            .wrap_err_with(|| format!("failed to load routes from {}", path.display()))?,
        None => RouteTable::defaults(settings.news_upstream(), settings.users_upstream()),
    };
    for route in routes.routes() {
        info!(prefix = %route.prefix, upstream = %route.upstream, "route");
    }
    let gateway = Gateway::new(routes).wrap_err("failed to build the forwarding client")?;

    let health_state = web::Data::new(HealthState::new());
    let bind_addr = settings.bind_addr;
    let server = create_gateway_server(web::Data::new(gateway), health_state.clone(), bind_addr)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "gateway listening");

    run_until_ctrl_c(server, health_state, None)
        .await
        .wrap_err("gateway failed")
}
