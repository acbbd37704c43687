//! Bakery Server - role-based module access control backend
//!
//! # Overview
//!
//! - **Grant store** (`db`): SQLite table of role -> module grants
//! - **Auth** (`auth`): JWT bearer tokens, admin and module gates
//! - **HTTP API** (`api`): module catalog, session grants, admin assignment
//!
//! # Layout
//!
//! ```text
//! bakery-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # JWT, middleware, extractor
//! ├── services/      # router holder and listener
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # pool, migrations, repositories
//! └── utils/         # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtConfig, JwtService};
pub use core::{Config, Server, ServerError, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and start logging
pub fn setup_environment() -> Result<(), ServerError> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____        __
   / __ )____ _/ /_____  _______  __
  / __  / __ `/ //_/ _ \/ ___/ / / /
 / /_/ / /_/ / ,< /  __/ /  / /_/ /
/_____/\__,_/_/|_|\___/_/   \__, /
                           /____/
    "#
    );
}
