#![allow(clippy::result_large_err)] // Server bootstrap returns AppError for consistent diagnostics.

//! HTTP front end: routing, shared request state and listener lifecycle.

pub mod api;
pub mod rejection;

use crate::core::config::{BackendConfig, ConfigLoader, ServerConfig};
use crate::core::error::AppError;
use crate::core::invoker::{AimsApplyTransform, PointTransformer};
use crate::core::transform_graph::{lint, TransformGraph};
use crate::core::types::ErrorCategory;
use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Extension},
    http::{header, HeaderMap, HeaderValue, Response, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::util::MapResponseLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

/// Read-only state shared by every request.
pub struct ApiState {
    pub graph: Arc<TransformGraph>,
    /// Raw bytes of the document the graph was loaded from.
    pub graph_yaml: Bytes,
    pub transformer: Arc<dyn PointTransformer>,
    /// Working directory of the transform tool; relative transform files resolve here.
    pub instance_path: PathBuf,
}

impl ApiState {
    pub fn new(
        graph: TransformGraph,
        graph_yaml: impl Into<Bytes>,
        transformer: Arc<dyn PointTransformer>,
        instance_path: PathBuf,
    ) -> Self {
        Self {
            graph: Arc::new(graph),
            graph_yaml: graph_yaml.into(),
            transformer,
            instance_path,
        }
    }

    /// Load the graph named by the configuration and wire the external tool.
    pub fn from_config(config: &BackendConfig) -> Result<Self, AppError> {
        let graph_path = config.transform.graph_path();
        let raw = fs::read(&graph_path).map_err(|err| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!(
                    "failed to read transform graph {}: {}",
                    graph_path.display(),
                    err
                ),
            )
        })?;
        let graph = TransformGraph::from_yaml_slice(&raw, &graph_path.display().to_string())?;
        log_graph_report(&graph);
        info!(
            "loaded transform graph {} ({} spaces, {} links)",
            graph_path.display(),
            graph.space_count(),
            graph.link_count()
        );

        let transformer = AimsApplyTransform::new(&config.transform.program)
            .with_timeout(ConfigLoader::request_timeout(config)?);
        Ok(Self::new(
            graph,
            raw,
            Arc::new(transformer),
            config.transform.instance_path.clone(),
        ))
    }
}

fn log_graph_report(graph: &TransformGraph) {
    let report = lint::lint(graph);
    for (from, to) in &report.unreachable {
        tracing::warn!("no transform chain from {:?} to {:?}", from, to);
    }
    for route in &report.ambiguous {
        tracing::warn!(
            "{} shortest transform chains from {:?} to {:?}; the first declared link wins",
            route.shortest_chains,
            route.from,
            route.to
        );
    }
}

/// Assemble the full application router.
pub fn build_router(state: Arc<ApiState>, settings: &ServerConfig) -> Router {
    let source_url = settings.source_url.clone();
    let redirect = get(move || source_redirect(source_url.clone()));
    let mut router = Router::new()
        .route("/", redirect.clone())
        .route("/source", redirect)
        .route("/health", get(health));
    if settings.enable_echo {
        router = router.route("/echo", get(echo));
    }
    let router = router
        .nest("/v1", api::routes())
        .layer(Extension(state))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(MapResponseLayer::new(|mut response: Response<Body>| {
            if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
                let body = json!({
                    "error": {
                        "code": "SB-413",
                        "message": "payload too large"
                    }
                })
                .to_string();
                *response.body_mut() = Body::from(body);
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            response
        }));
    match cors_layer(&settings.cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };
    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn source_redirect(source_url: String) -> Response<Body> {
    match HeaderValue::from_str(&source_url) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn echo(headers: HeaderMap) -> StatusCode {
    info!("ECHO:\nHeaders\n=======\n{:?}", headers);
    StatusCode::OK
}

/// Load everything from configuration and serve until interrupted.
pub async fn serve(config: BackendConfig) -> Result<(), AppError> {
    let state = Arc::new(ApiState::from_config(&config)?);
    serve_internal(state, &config.server, None).await
}

/// Serve `state` and report the bound address once listening (test helper).
pub async fn serve_with_ready_notifier(
    state: Arc<ApiState>,
    settings: &ServerConfig,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> Result<(), AppError> {
    serve_internal(state, settings, Some(ready_notifier)).await
}

async fn serve_internal(
    state: Arc<ApiState>,
    settings: &ServerConfig,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let bind_addr: SocketAddr = settings.bind.parse().map_err(|err| {
        AppError::new(
            ErrorCategory::ConfigError,
            format!("invalid bind address {}: {}", settings.bind, err),
        )
    })?;
    let router = build_router(state, settings);
    let listener = TcpListener::bind(bind_addr).await.map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to bind listener {}: {}", bind_addr, err),
        )
    })?;
    let local_addr = listener.local_addr().map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to determine listener address: {}", err),
        )
    })?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("spatial backend listening on {}", local_addr);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::InternalError,
                format!("server terminated: {}", err),
            )
        })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    } else {
        std::future::pending::<()>().await;
    }
}
