//! HTTP server for the RSVP form and the organizer dashboard.
//!
//! Handlers live in [`api`]. Every response is logged by
//! [`middleware::logging_middleware`] and, when frame ancestors are
//! configured, carries a `Content-Security-Policy` so the form can be
//! embedded on the allowed sites.

pub mod api;
pub mod error;
pub mod middleware;
pub mod state;

use axum::{http::header, Router};
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::storage::Storage;

pub use error::ApiError;
pub use state::AppState;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let mut router = api::routes(&state).layer(axum::middleware::from_fn(
        middleware::logging_middleware,
    ));

    if let Some(csp) = state.content_security_policy().cloned() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            csp,
        ));
    }

    router.with_state(state)
}

/// Serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address is invalid or cannot be bound.
pub async fn serve(config: &Config, storage: Storage) -> Result<()> {
    let addr = config.bind_addr()?;
    let state = AppState::new(storage, config);

    if !state.admin_enabled() {
        info!("No admin password configured; dashboard endpoints are disabled");
    }

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
