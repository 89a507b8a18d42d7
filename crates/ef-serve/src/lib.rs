pub mod middleware;
pub mod openapi;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use ef_core::EventFinderError;
use ef_db::schema;
use ef_db::store::DbStore;
use ef_upstream::Upstream;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
    pub upstream: Arc<Upstream>,
}

/// Opens a fresh store connection for one request. Connections are cheap
/// under WAL and keep the handlers free of shared mutable state.
pub fn build_store(state: &AppState) -> Result<DbStore, EventFinderError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(|err| {
        EventFinderError::Internal {
            message: err.to_string(),
        }
    })?;
    Ok(DbStore::new(conn))
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

/// Binds and serves until SIGINT/SIGTERM. The connect-info make-service is
/// required so the geo handler can fall back to the peer address when no
/// forwarded-for header is present.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "server listening");
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
