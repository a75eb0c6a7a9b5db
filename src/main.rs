//! swiv server binary.
//!
//! Serves a local directory tree as a browsable image gallery: directories
//! render as thumbnail grids (or a swipeable strip in viewer mode), files
//! stream their raw bytes. The main entry point builds the Axum router,
//! wires in the auth gate, and starts the HTTP listener.

mod auth;
mod config;
mod error;
mod logging;
mod render;
mod serve;
mod stream;
mod tree;

use axum::extract::{Extension, connect_info::ConnectInfo};
use axum::http::Request;
use axum::{Router, middleware};
use axum_server::Handle;
use clap::Parser;
use shadow_rs::shadow;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, info_span};

use crate::auth::AuthGate;
use crate::config::Args;
use crate::tree::Tree;

shadow!(build);

/// Starts the swiv server and blocks until shutdown.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    logging::init_logging();

    let args = Args::parse();
    let root = std::fs::canonicalize(&args.root)?;
    let tree = Arc::new(Tree::new(root));
    let gate = Arc::new(AuthGate::from_secret(args.auth.as_deref()));

    let app = Router::new()
        .fallback(serve::serve_entry)
        .layer(middleware::from_fn(auth::require_auth))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let connect_ip = request
                        .extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|ConnectInfo(addr)| addr.to_string());
                    let client_ip = connect_ip.unwrap_or_else(|| "unknown".to_string());

                    info_span!(
                        env!("CARGO_CRATE_NAME"),
                        client_ip,
                        method = ?request.method(),
                        path = ?request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(Extension(tree.clone()))
        .layer(Extension(gate));

    let host = args
        .host
        .parse::<IpAddr>()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;
    let addr = SocketAddr::new(host, args.port);
    let handle = Handle::new();

    info!("🖼️ Serving {} at http://{}", tree.root().display(), addr);

    let server = axum_server::bind(addr)
        .handle(handle.clone())
        .serve(app.into_make_service_with_connect_info::<SocketAddr>());

    tokio::select! {
        result = server => result?,
        _ = shutdown_signal(handle) => {}
    }

    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received termination signal shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
