//! HTTP API for the movie catalogue: accounts, catalogue browsing backed by
//! TMDB, and per-user watch lists and notes.
//!
//! All routes live under `/api`. Listing pages are remapped from TMDB's
//! fixed page size onto the configured one by [`cine_pager`].

pub mod auth;
pub mod config;
pub mod error;
mod routes;
mod state;

use std::{future::Future, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;

/// The complete application, with CORS opened to `allowed_origin`.
pub fn app(state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)
        .map_err(|error| Error::Config(format!("invalid allowed origin: {error}")))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Ok(Router::new()
        .nest("/api", routes::router())
        .layer(cors)
        .with_state(state))
}

/// Run the server described by `config` until a shutdown signal arrives.
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = app(state, &config.server.allowed_origin)?;

    let address = format!("{}:{}", config.server.address, config.server.port);
    let listener = TcpListener::bind(&address).await?;
    info!(%address, dev = config.server.dev, "Server listening.");

    serve_on(listener, app, shutdown_signal()).await
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down.");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down.");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
