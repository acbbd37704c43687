//! Role-module grant DTOs shared by the server and the client

use serde::{Deserialize, Serialize};

use super::{ModuleId, Role};

/// Persisted fact: "role R is granted module M"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleModuleGrant {
    pub role: Role,
    pub module_id: ModuleId,
    pub granted: bool,
}

/// `POST /api/admin/role-modules` body: replace every grant of `role`
///
/// Kept as raw strings so the server can answer unknown ids with a
/// module-specific error instead of a generic JSON rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRoleModulesRequest {
    pub role: String,
    pub module_ids: Vec<String>,
}

impl SaveRoleModulesRequest {
    pub fn new(role: Role, module_ids: impl IntoIterator<Item = ModuleId>) -> Self {
        Self {
            role: role.as_str().to_string(),
            module_ids: module_ids
                .into_iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        }
    }
}

/// `POST /api/admin/role-modules` response data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRoleModulesResponse {
    pub role: Role,
}

/// `GET /api/user/modules` response data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModulesResponse {
    pub module_ids: Vec<ModuleId>,
}
