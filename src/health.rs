use axum::{Router, routing::get};
use std::net::SocketAddr;
use tracing::{error, info};

/// Start the HTTP health-check server as a background task
///
/// Runs independently of the bot and the scheduler; hosting platforms poll
/// it to decide the process is alive. A bind failure is logged but does not
/// take the bot down.
pub fn start_health_server(port: u16) {
    tokio::spawn(async move {
        let app = Router::new().route("/", get(health_handler));
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind health server on {}: {}", addr, e);
                return;
            }
        };

        info!("Health server listening on http://{}", addr);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Health server error: {}", e);
        }
    });
}

/// GET / — fixed 200 OK body
async fn health_handler() -> &'static str {
    "ok"
}
