//! User Model
//!
//! Users are owned by the user-management pages; this layer only reads the
//! fields that drive access decisions.

use serde::{Deserialize, Serialize};

use super::Role;

/// Authenticated user as seen by the access-control layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    /// Home branch; `None` for head-office accounts
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub can_access_all_branches: bool,
    /// Fine-grained permission keys (e.g. `["reports:read", "stock:*"]`)
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            role,
            branch_id: None,
            can_access_all_branches: false,
            permissions: Vec::new(),
        }
    }

    pub fn with_branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }

    pub fn with_all_branches(mut self) -> Self {
        self.can_access_all_branches = true;
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Check a fine-grained permission key
    ///
    /// - `"all"` grants everything
    /// - `"stock:*"` matches `"stock:read"`, `"stock:update"`, ...
    /// - otherwise exact match
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| {
            if p == "all" || p == permission {
                return true;
            }
            match p.strip_suffix(":*") {
                Some(prefix) => permission
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(':')),
                None => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_permission_exact_and_wildcard() {
        let user = User::new("1", "flour", Role::Staff)
            .with_permissions(["reports:read", "stock:*"]);

        assert!(user.has_permission("reports:read"));
        assert!(!user.has_permission("reports:delete"));
        assert!(user.has_permission("stock:update"));
        assert!(!user.has_permission("stocktake:update"));
    }

    #[test]
    fn test_has_permission_all() {
        let user = User::new("1", "owner", Role::Staff).with_permissions(["all"]);
        assert!(user.has_permission("salary:delete"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"id":"7","username":"ana","role":"supervisor"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Supervisor);
        assert!(user.branch_id.is_none());
        assert!(!user.can_access_all_branches);
        assert!(user.permissions.is_empty());
    }

    #[test]
    fn test_serialize_camel_case() {
        let user = User::new("7", "ana", Role::Manager).with_branch("north");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["branchId"], "north");
        assert_eq!(json["canAccessAllBranches"], false);
    }
}
