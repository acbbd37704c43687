//! Server Implementation
//!
//! HTTP listener startup and shutdown

use std::future::Future;

use tokio::net::TcpListener;

use crate::core::{Config, Result, ServerError, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (shared with oneshot callers)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    async fn state(&self) -> Result<ServerState> {
        match &self.state {
            Some(s) => Ok(s.clone()),
            None => ServerState::initialize(&self.config).await,
        }
    }

    /// Bind `0.0.0.0:{http_port}` and serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        self.run_with_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn run_with_listener<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = self.state().await?;
        tracing::info!(addr = ?listener.local_addr().ok(), "Bakery server starting");

        state
            .http
            .start_server(listener, shutdown)
            .await
            .map_err(ServerError::App)
    }
}
