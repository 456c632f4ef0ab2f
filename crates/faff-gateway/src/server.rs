// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, Uri, header},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use faff_config::model::{FaffConfig, ServerConfig};
use faff_core::{
    EmbeddingAdapter, FaffError, MessageStore, PluginAdapter, TokenVerifier, UserStore,
};
use faff_messaging::{MessageService, SearchService};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{JwtAuthority, require_auth};
use crate::error::ErrorResponse;
use crate::handlers;
use crate::registry::PresenceRegistry;
use crate::session::SessionContext;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub messages: MessageService,
    pub search: SearchService,
    /// Live connections; also the delivery hook for `new_message`.
    pub registry: Arc<PresenceRegistry>,
    pub tokens: Arc<JwtAuthority>,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Storage adapter probed by `/health`.
    pub storage: Arc<dyn PluginAdapter>,
    pub min_password_len: usize,
}

impl AppState {
    /// Wire the services over one store that serves both users and messages.
    pub fn new<S>(store: Arc<S>, embedder: Arc<dyn EmbeddingAdapter>, config: &FaffConfig) -> Self
    where
        S: UserStore + MessageStore + PluginAdapter,
    {
        let tokens = Arc::new(JwtAuthority::from_config(&config.auth));
        let messages = MessageService::new(store.clone(), embedder.clone());
        let search = SearchService::new(store.clone(), embedder, config.search.clone());
        Self {
            users: store.clone(),
            messages,
            search,
            registry: Arc::new(PresenceRegistry::new()),
            verifier: tokens.clone(),
            tokens,
            storage: store,
            min_password_len: config.auth.min_password_len,
        }
    }

    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            registry: self.registry.clone(),
            users: self.users.clone(),
            verifier: self.verifier.clone(),
        }
    }
}

/// Build the full application router.
///
/// - GET /health, POST /api/users, POST /api/login (public)
/// - GET /api/me, GET /api/users, POST /api/messages, conversation and search routes (bearer auth)
/// - GET /ws (auth happens in-band, not via middleware)
pub fn build_router(state: AppState, config: &ServerConfig) -> Result<Router, FaffError> {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/users", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/me", get(handlers::me))
        .route("/api/users", get(handlers::list_users))
        .route("/api/messages", post(handlers::send_message))
        .route(
            "/api/conversation/{other_user_id}",
            get(handlers::conversation_by_path),
        )
        .route(
            "/api/messages/conversation",
            get(handlers::conversation_by_query),
        )
        .route("/api/messages/search", get(handlers::search))
        .route("/api/semantic-search", get(handlers::search))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state.clone());

    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Ok(Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .fallback(not_found)
        .layer(cors_layer(&config.frontend_url)?)
        .layer(TraceLayer::new_for_http()))
}

fn cors_layer(frontend_url: &str) -> Result<CorsLayer, FaffError> {
    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))
        .map_err(|e| FaffError::Config(format!("invalid server.frontend_url: {e}")))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

async fn not_found(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        handlers::api_not_found().await.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Not found".into(),
            }),
        )
            .into_response()
    }
}

/// Serve HTTP and WebSocket traffic until `shutdown` is cancelled.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), FaffError> {
    let app = build_router(state, config)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FaffError::Internal(format!("failed to bind to {addr}: {e}")))?;

    tracing::info!("server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| FaffError::Internal(format!("server error: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_rejects_unparseable_origin() {
        assert!(cors_layer("http://localhost:3000").is_ok());
        assert!(matches!(
            cors_layer("http://bad\norigin"),
            Err(FaffError::Config(_))
        ));
    }

    #[tokio::test]
    async fn unknown_api_route_is_json_404() {
        let resp = not_found("/api/nope".parse().unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = not_found("/elsewhere".parse().unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
