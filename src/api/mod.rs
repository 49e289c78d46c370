//! The HTTP API.
//!
//! | Method   | Path                                 | Body                    |
//! |----------|--------------------------------------|-------------------------|
//! | `POST`   | `/transaction`                       | a new transaction       |
//! | `GET`    | `/transactions/{category}`           |                         |
//! | `PUT`    | `/transactions/{category}/{index}`   | a partial record        |
//! | `DELETE` | `/transactions/{category}/{index}`   |                         |
//! | `GET`    | `/schema`                            |                         |
//!
//! Errors are returned as `{"detail": "..."}`.

mod error;
mod handlers;

use crate::config::ANY_ORIGIN;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use axum::extract::{MatchedPath, Request};
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// The state shared by all handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppState {
    config: Config,
}

/// Builds the router with CORS and request tracing.
///
/// # Errors
/// - `ErrorType::Config` if a configured origin is not a valid header value.
pub(crate) fn router(config: Config) -> Result<Router> {
    let cors = cors_layer(config.allowed_origins())?;
    let router = Router::new()
        .route("/transaction", post(handlers::create_transaction))
        .route("/transactions/{category}", get(handlers::list_transactions))
        .route(
            "/transactions/{category}/{index}",
            put(handlers::update_transaction).delete(handlers::delete_transaction),
        )
        .route("/schema", get(handlers::schema))
        .with_state(AppState { config });
    Ok(add_tracing_layer(router).layer(cors))
}

/// Binds `addr` and serves the API until ctrl-c or SIGTERM.
pub(crate) async fn serve(config: Config, addr: &str) -> Result<()> {
    config.store().open().await?;
    let router = router(config)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))
        .pub_result(ErrorType::Config)?;
    info!("HTTP server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("The HTTP server failed")
        .pub_result(ErrorType::Internal)
}

/// `*` mirrors the request's origin and allows credentials. Otherwise only the listed origins are
/// allowed.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.iter().any(|o| o == ANY_ORIGIN) {
        return Ok(CorsLayer::very_permissive());
    }
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid origin '{o}'")))
        .collect::<anyhow::Result<Vec<_>>>()
        .pub_result(ErrorType::Config)?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // 5xx responses are logged where the error is converted.
        .on_failure(());

    router.layer(tracing_layer)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Unable to listen for ctrl-c: {e}");
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
                error!("Unable to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => debug!("Received ctrl-c"),
        _ = terminate => debug!("Received SIGTERM"),
    }
    info!("Shutting down");
}
