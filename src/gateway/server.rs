use super::handlers::{handle_health, handle_run_all, handle_run_target};
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};
use crate::diagnostics::health;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Run the HTTP gateway using axum.
pub async fn run_gateway(state: AppState) -> Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        state.config.gateway.host, state.config.gateway.port
    )
    .parse()
    .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, state).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    state: AppState,
) -> Result<()> {
    let addr = listener
        .local_addr()
        .context("get gateway listener local address")?;

    print_gateway_banner(addr);
    health::mark_component_ok("gateway");

    let app = build_app(state);
    axum::serve(listener, app)
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

fn print_gateway_banner(addr: SocketAddr) {
    println!("Gateway listening on {addr}");
    println!("  GET  /health");
    println!("  POST /cycle");
    println!("  POST /cycle/{{id}}");
}

fn build_app(state: AppState) -> Router {
    let cors_origins = state.config.gateway.cors_origins.clone();

    let mut app = Router::new()
        .route("/health", get(handle_health))
        .route("/cycle", post(handle_run_all))
        .route("/cycle/{id}", post(handle_run_target))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ));

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app
}
