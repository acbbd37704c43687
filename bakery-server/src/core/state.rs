use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::db::repository::role_module;
use crate::services::HttpService;

/// Server state, shared by every handler
///
/// Cheap to clone: the pool and services are reference counted.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | pool | SQLite pool holding the grant store |
/// | jwt_service | token validation |
/// | http | router holder used by the listener and by `oneshot` |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub http: HttpService,
}

impl ServerState {
    /// Assemble state from parts and build the router
    pub fn new(config: Config, pool: SqlitePool, jwt_service: Arc<JwtService>) -> Self {
        let http = HttpService::new(config.clone());
        let state = Self {
            config,
            pool,
            jwt_service,
            http,
        };
        state.http.initialize(state.clone());
        state
    }

    /// Initialize state from configuration
    ///
    /// 1. Work directory
    /// 2. Database at `config.database_path()` with migrations
    /// 3. Default grants for roles that were never configured
    /// 4. JWT service and router
    pub async fn initialize(config: &Config) -> Result<Self> {
        if !config.is_in_memory() {
            std::fs::create_dir_all(&config.work_dir)?;
        }

        let db = DbService::new(&config.database_path()).await?;
        role_module::seed_defaults(&db.pool)
            .await
            .map_err(|e| crate::core::ServerError::Database(e.to_string()))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Ok(Self::new(config.clone(), db.pool, jwt_service))
    }
}
