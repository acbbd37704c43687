//! Data models
//!
//! Shared between bakery-server and bakery-client (via API).
//! Roles, resources, module ids and categories are closed enums serialized
//! as their snake_case wire strings.

pub mod grant;
pub mod module;
pub mod resource;
pub mod role;
pub mod user;

// Re-exports
pub use grant::*;
pub use module::*;
pub use resource::*;
pub use role::*;
pub use user::*;
