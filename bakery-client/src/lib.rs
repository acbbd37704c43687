//! Bakery Client - role-based module access for the bakery front end
//!
//! Talks to the bakery server, caches the session's granted modules and
//! drives the admin role-module assignment screen.

pub mod access;
pub mod config;
pub mod editor;
pub mod error;
pub mod http;
pub mod source;

pub use access::RoleAccess;
pub use config::ClientConfig;
pub use editor::{CategoryState, LoadOutcome, LoadTicket, RoleModuleEditor};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use source::ModuleSource;

// Re-export shared types for convenience
pub use shared::models::{Action, ModuleCategory, ModuleId, Resource, Role, RoleModuleGrant, User};
