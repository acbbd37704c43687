//! Authentication and authorization
//!
//! - [`JwtService`] - token issue/validation
//! - [`CurrentUser`] - session user resolved from the token
//! - [`require_auth`] - authentication middleware
//! - [`require_admin`] / [`require_module`] - role and module gates

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth, require_module};

use shared::AppResult;
use shared::access::GrantSet;
use shared::models::ModuleId;

use crate::core::ServerState;
use crate::db::repository::role_module;

/// Modules held by the caller's role
///
/// Super admin has no stored grants and receives every module.
pub async fn session_grants(state: &ServerState, user: &CurrentUser) -> AppResult<GrantSet> {
    if user.is_super_admin() {
        return Ok(ModuleId::ALL.into_iter().collect());
    }
    let ids = role_module::granted_module_ids(&state.pool, user.role).await?;
    Ok(ids.into_iter().collect())
}
