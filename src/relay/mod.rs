//! HTTP relay in front of the Ollama API
//!
//! The relay forwards the model catalog, text generation and a synthesized
//! health check to a fixed upstream base URL, with permissive CORS so any
//! origin may call it. It serves plaintext and, when a development
//! certificate pair is present, TLS as well.

pub mod tls;

use crate::config::RelayConfig;
use crate::error::{DocchatError, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Plain-text answer for `GET /`
pub const BANNER: &str =
    "Proxy server is running. Use /api/ollama/* endpoints to access Ollama API.";

/// Shared relay state
#[derive(Debug, Clone)]
pub struct RelayState {
    http: reqwest::Client,
    upstream: String,
}

impl RelayState {
    /// Create relay state forwarding to `upstream` (e.g. `http://localhost:11434/api`)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created
    pub fn new(upstream: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("docchat-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DocchatError::Relay(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            upstream: upstream.trim_end_matches('/').to_string(),
        })
    }

    /// Upstream base URL
    pub fn upstream(&self) -> &str {
        &self.upstream
    }
}

/// Forwarding failure, answered as `500 {"error": ...}`
#[derive(Debug)]
pub struct RelayError(String);

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0 })),
        )
            .into_response()
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// Build the relay router
///
/// # Examples
///
/// ```
/// use docchat::relay::{create_router, RelayState};
/// use std::sync::Arc;
///
/// let state = Arc::new(RelayState::new("http://localhost:11434/api").unwrap());
/// let _router = create_router(state);
/// ```
pub fn create_router(state: Arc<RelayState>) -> Router {
    let api = Router::new()
        .route("/tags", get(tags))
        .route("/generate", post(generate))
        .route("/health", get(health));

    Router::new()
        .route("/", get(banner))
        .nest("/api/ollama", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn banner() -> &'static str {
    BANNER
}

async fn tags(State(state): State<Arc<RelayState>>) -> std::result::Result<Json<Value>, RelayError> {
    let url = format!("{}/tags", state.upstream);
    tracing::debug!(%url, "Forwarding catalog request");
    let body = state
        .http
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?;
    Ok(Json(body))
}

async fn generate(
    State(state): State<Arc<RelayState>>,
    Json(request): Json<Value>,
) -> std::result::Result<Json<Value>, RelayError> {
    let url = format!("{}/generate", state.upstream);
    tracing::debug!(%url, model = ?request.get("model"), "Forwarding generate request");
    let body = state
        .http
        .post(&url)
        .json(&request)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?;
    Ok(Json(body))
}

async fn health(State(state): State<Arc<RelayState>>) -> (StatusCode, Json<Value>) {
    let url = format!("{}/tags", state.upstream);
    let result = state
        .http
        .head(&url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .and_then(reqwest::Response::error_for_status);

    match result {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "message": "Ollama is running" })),
        ),
        Err(e) => {
            tracing::warn!("Ollama health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "message": "Ollama is not accessible" })),
            )
        }
    }
}

/// Serve the relay on an already bound listener until `shutdown` resolves
///
/// # Errors
///
/// Returns error if the server fails
pub async fn serve<F>(listener: TcpListener, state: Arc<RelayState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Run the relay with the given configuration until Ctrl-C
///
/// The TLS listener is started best-effort; failing to start it is logged
/// and never stops the plaintext listener.
///
/// # Errors
///
/// Returns error if the plaintext listener cannot be bound or fails
pub async fn run(config: &RelayConfig) -> Result<()> {
    let state = Arc::new(RelayState::new(&config.upstream_url)?);

    let http_addr: SocketAddr = format!("{}:{}", config.bind_address, config.http_port)
        .parse()
        .map_err(|e| DocchatError::Config(format!("Invalid relay address: {}", e)))?;

    let tls_handle = axum_server::Handle::new();
    if config.enable_tls {
        tls::start(config, Arc::clone(&state), tls_handle.clone()).await;
    } else {
        tracing::info!("TLS listener disabled");
    }

    let listener = TcpListener::bind(http_addr)
        .await
        .map_err(|e| DocchatError::Relay(format!("Failed to bind {}: {}", http_addr, e)))?;
    tracing::info!(
        "HTTP relay running on http://{} forwarding to {}",
        http_addr,
        state.upstream()
    );

    serve(listener, state, shutdown_signal(tls_handle)).await?;
    tracing::info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal(tls_handle: axum_server::Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    tls_handle.graceful_shutdown(Some(Duration::from_secs(5)));
}
