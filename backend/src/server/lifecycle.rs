//! Process lifecycle: readiness, graceful stop and consumer join.

use std::future::Future;

use actix_web::dev::Server;
use actix_web::web;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::inbound::events::ConsumerHandle;
use crate::inbound::http::health::HealthState;

fn flatten(joined: Result<std::io::Result<()>, JoinError>) -> std::io::Result<()> {
    joined.map_err(std::io::Error::other)?
}

/// Drive `server` until `shutdown` resolves or the server exits.
///
/// The health endpoints report ready while serving. On the way out they flip to
/// unhealthy, the server drains gracefully and then the consumer, if any,
/// is cancelled and joined.
///
/// # Errors
/// Returns the server's own I/O error, or an error if its task panicked.
pub async fn run_until<F>(
    server: Server,
    health_state: web::Data<HealthState>,
    consumer: Option<ConsumerHandle>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let handle = server.handle();
    let mut running = actix_web::rt::spawn(server);
    health_state.mark_ready();
    info!("serving");

    let exited = tokio::select! {
        joined = &mut running => Some(joined),
        () = shutdown => None,
    };
    health_state.mark_unhealthy();

    let result = match exited {
        Some(joined) => flatten(joined),
        None => {
            info!("shutdown requested");
            handle.stop(true).await;
            flatten(running.await)
        }
    };
    if let Some(consumer) = consumer {
        consumer.shutdown().await;
    }
    info!("stopped");
    result
}

/// [`run_until`] Ctrl-C.
///
/// # Errors
/// See [`run_until`].
pub async fn run_until_ctrl_c(
    server: Server,
    health_state: web::Data<HealthState>,
    consumer: Option<ConsumerHandle>,
) -> std::io::Result<()> {
    run_until(server, health_state, consumer, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "cannot listen for Ctrl-C, shutting down");
        }
    })
    .await
}
