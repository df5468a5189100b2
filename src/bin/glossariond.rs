//! glossariond — the glossarion daemon.
//!
//! Hosts the query engine over HTTP:
//!
//! - `GET  /query/{lang}/{term}` — unified lookup (`?refresh=true` bypasses
//!   cache and fact index)
//! - `GET  /health` — component health
//! - `GET  /cache/stats` — cache statistics
//! - `DELETE /cache/{lang}` — language-scoped cache clear
//!
//! The engine is synchronous (adapters fan out on OS threads); handlers hop
//! through `spawn_blocking` so the async runtime never blocks on upstream
//! I/O. A SIGCHLD reaper harvests zombie helper children for the CGI-style
//! backends.
//!
//! Build and run: `cargo run --features server --bin glossariond`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use clap::Parser;
use tower_http::cors::CorsLayer;

use glossarion::config::Config;
use glossarion::engine::{QueryEngine, Wiring};
use glossarion::error::QueryError;
use glossarion::language::Language;
use glossarion::paths::GlossarionPaths;
use glossarion::reaper::Reaper;

#[derive(Parser)]
#[command(name = "glossariond", version, about = "glossarion HTTP daemon")]
struct Cli {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:7444")]
    listen: String,

    /// Data directory for persistent storage (overrides the XDG path).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/glossarion/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

struct ServerState {
    engine: QueryEngine,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.data_dir {
        Some(root) => GlossarionPaths::rooted_at(root.clone()),
        None => GlossarionPaths::resolve()?,
    };
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let mut config = Config::load_or_default(&config_path)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "glossarion={},tower_http=info",
                    config.log_level.as_filter()
                ))
            }),
        )
        .init();

    let reaper = Reaper::spawn();
    let wiring = Wiring::open(&config)?;
    let state = Arc::new(ServerState {
        engine: QueryEngine::new(wiring),
    });

    let app = Router::new()
        .route("/query/{lang}/{term}", get(query_handler))
        .route("/health", get(health_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/{lang}", delete(cache_clear_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cli.listen)
        .await
        .map_err(|e| miette::miette!("failed to bind {}: {e}", cli.listen))?;
    tracing::info!(listen = %cli.listen, "glossariond listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| miette::miette!("server error: {e}"))?;

    if let Some(reaper) = reaper {
        reaper.shutdown();
    }
    Ok(())
}

async fn query_handler(
    State(state): State<Arc<ServerState>>,
    Path((lang, term)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let refresh = params
        .get("refresh")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let result = tokio::task::spawn_blocking(move || {
        state.engine.query_code(&lang, &term, refresh)
    })
    .await;

    match result {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(err @ QueryError::UnsupportedLanguage { .. })) => {
            error_response(StatusCode::BAD_REQUEST, &err)
        }
        Ok(Err(err @ QueryError::Normalization(_))) => {
            error_response(StatusCode::BAD_REQUEST, &err)
        }
        Ok(Err(err)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err),
        Err(join_err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &std::io::Error::other(join_err.to_string()),
        ),
    }
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> Response {
    match tokio::task::spawn_blocking(move || state.engine.health()).await {
        Ok(report) => {
            let status = if report.all_healthy() {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            (status, Json(report)).into_response()
        }
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &std::io::Error::other(err.to_string()),
        ),
    }
}

async fn cache_stats_handler(State(state): State<Arc<ServerState>>) -> Response {
    match tokio::task::spawn_blocking(move || state.engine.cache_stats()).await {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &std::io::Error::other(err.to_string()),
        ),
    }
}

#[derive(serde::Serialize)]
struct ClearResponse {
    deleted_rows: u64,
}

async fn cache_clear_handler(
    State(state): State<Arc<ServerState>>,
    Path(lang): Path<String>,
) -> Response {
    let Some(language) = Language::from_code(&lang) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            &std::io::Error::other(format!("unsupported language: {lang}")),
        );
    };
    match tokio::task::spawn_blocking(move || state.engine.cache_clear(Some(language))).await {
        Ok(deleted_rows) => Json(ClearResponse { deleted_rows }).into_response(),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &std::io::Error::other(err.to_string()),
        ),
    }
}

fn error_response(status: StatusCode, err: &dyn std::error::Error) -> Response {
    #[derive(serde::Serialize)]
    struct ErrorBody {
        error: String,
    }
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}
