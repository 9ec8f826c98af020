//! StockSync JSON API Server

use std::process::ExitCode;

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use stocksync_app::{
    context::{AppContext, AppInitError},
    realtime::Broadcaster,
};

use crate::{
    auth::ApiToken,
    config::{ServerConfig, storage::StorageBackend},
    observability::{Observability, metrics_handler, request_logging},
    state::State,
};

mod auth;
mod config;
mod extensions;
mod healthcheck;
mod movements;
mod observability;
mod products;
mod realtime;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// StockSync JSON API Server entry point
#[tokio::main]
pub async fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(config_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging not initialized yet, must use eprintln for config errors"
            )]
            {
                eprintln!("Configuration error: {config_error}");
            }

            return ExitCode::FAILURE;
        }
    };

    let observability = match Observability::init(&config) {
        Ok(observability) => observability,
        Err(init_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "the subscriber failed to install, so tracing has nowhere to write"
            )]
            {
                eprintln!("Failed to initialize logging: {init_error}");
            }

            return ExitCode::FAILURE;
        }
    };

    let broadcaster = Broadcaster::new(&config.stock.supervisor_channel)
        .with_queue_capacity(config.stock.broadcast_queue_capacity);

    let app = match build_app_context(&config, broadcaster.clone()).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            return ExitCode::FAILURE;
        }
    };

    let api_token = config.auth.api_token.as_deref().and_then(ApiToken::from_raw);

    if api_token.is_none() {
        info!("no API token configured, /api routes are open");
    }

    let addr = config.socket_addr();

    info!(
        backend = ?config.storage.storage_backend,
        policy = ?config.stock.overdraft_policy,
        supervisor_channel = broadcaster.supervisor_channel(),
        queue_capacity = broadcaster.queue_capacity().get(),
        "Starting server on {addr}"
    );

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(request_logging)
        .hoop(inject(State::shared(app, api_token)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(Router::with_path("ws").goal(realtime::socket::handler))
        .push(router::app_router());

    let doc = OpenApi::new("StockSync API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();

    // Listen for shutdown signal
    let session_registry = broadcaster.clone();

    tokio::spawn(async move {
        if let Err(signal_error) = shutdown::listen(handle, session_registry).await {
            error!("failed to listen for shutdown signal: {signal_error}");
        }
    });

    // Start serving requests
    server.serve(router).await;

    shutdown::close_sessions(&broadcaster);
    observability.shutdown();

    ExitCode::SUCCESS
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("DATABASE_URL is required for the postgres backend")]
    MissingDatabaseUrl,

    #[error(transparent)]
    App(#[from] AppInitError),
}

async fn build_app_context(
    config: &ServerConfig,
    broadcaster: Broadcaster,
) -> Result<AppContext, StartupError> {
    let policy = config.stock.overdraft_policy;

    match config.storage.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .ok_or(StartupError::MissingDatabaseUrl)?;

            Ok(AppContext::from_database_url(url, policy, broadcaster).await?)
        }
        StorageBackend::Memory => {
            info!("using in-memory storage, inventory is lost on exit");

            Ok(AppContext::in_memory(policy, broadcaster))
        }
    }
}
