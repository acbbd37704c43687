use std::future::Future;
use std::sync::Arc;

use axum::{Router, middleware};
use parking_lot::RwLock;
use shared::AppError;
use tokio::net::TcpListener;
use tower::Service;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};

pub type OneshotResult =
    Result<http::Response<axum::body::Body>, Box<dyn std::error::Error + Send + Sync>>;

/// HTTP access log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (state still unbound)
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::modules::router())
        .merge(crate::api::user_modules::router())
        .merge(crate::api::role_modules::router(state))
}

#[derive(Clone, Debug)]
pub struct HttpService {
    config: Config,
    router: Arc<RwLock<Option<Router>>>,
}

impl HttpService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            router: Arc::new(RwLock::new(None)),
        }
    }

    /// Build and cache the router for `state`
    pub fn initialize(&self, state: ServerState) {
        let app = build_app(&state)
            // require_auth skips public routes itself
            .layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(middleware::from_fn(log_request));

        *self.router.write() = Some(app);
    }

    pub fn router(&self) -> Option<Router> {
        self.router.read().clone()
    }

    /// Dispatch one request through the router without a socket
    pub async fn oneshot(&self, request: http::Request<axum::body::Body>) -> OneshotResult {
        match self.router() {
            Some(mut router) => match router.call(request).await {
                Ok(response) => Ok(response),
                Err(_) => Err(AppError::internal("Oneshot call failed").into()),
            },
            None => Err(AppError::internal("HttpService not initialized").into()),
        }
    }

    /// Serve on `listener` until `shutdown_signal` resolves
    pub async fn start_server<F>(
        &self,
        listener: TcpListener,
        shutdown_signal: F,
    ) -> Result<(), AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self
            .router()
            .ok_or_else(|| AppError::internal("HttpService not initialized with router"))?;

        tracing::info!(
            port = self.config.http_port,
            environment = %self.config.environment,
            "Starting HTTP server"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}
