//! Resource and action vocabulary used by page-level guards

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page-level resource key
///
/// Every resource must be owned by exactly one module of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Dashboard,
    Orders,
    Products,
    Categories,
    Production,
    Inventory,
    Ingredients,
    Stock,
    Purchases,
    PurchaseReturns,
    Suppliers,
    Customers,
    Marketing,
    Staff,
    Attendance,
    LeaveRequests,
    Salary,
    Expenses,
    Assets,
    Payments,
    Reports,
    Users,
    Branches,
    Settings,
    RoleModules,
    SuperAdmin,
}

impl Resource {
    pub const ALL: [Resource; 26] = [
        Resource::Dashboard,
        Resource::Orders,
        Resource::Products,
        Resource::Categories,
        Resource::Production,
        Resource::Inventory,
        Resource::Ingredients,
        Resource::Stock,
        Resource::Purchases,
        Resource::PurchaseReturns,
        Resource::Suppliers,
        Resource::Customers,
        Resource::Marketing,
        Resource::Staff,
        Resource::Attendance,
        Resource::LeaveRequests,
        Resource::Salary,
        Resource::Expenses,
        Resource::Assets,
        Resource::Payments,
        Resource::Reports,
        Resource::Users,
        Resource::Branches,
        Resource::Settings,
        Resource::RoleModules,
        Resource::SuperAdmin,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Resource::Dashboard => "dashboard",
            Resource::Orders => "orders",
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Production => "production",
            Resource::Inventory => "inventory",
            Resource::Ingredients => "ingredients",
            Resource::Stock => "stock",
            Resource::Purchases => "purchases",
            Resource::PurchaseReturns => "purchase_returns",
            Resource::Suppliers => "suppliers",
            Resource::Customers => "customers",
            Resource::Marketing => "marketing",
            Resource::Staff => "staff",
            Resource::Attendance => "attendance",
            Resource::LeaveRequests => "leave_requests",
            Resource::Salary => "salary",
            Resource::Expenses => "expenses",
            Resource::Assets => "assets",
            Resource::Payments => "payments",
            Resource::Reports => "reports",
            Resource::Users => "users",
            Resource::Branches => "branches",
            Resource::Settings => "settings",
            Resource::RoleModules => "role_modules",
            Resource::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

/// Operation performed on a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Fine-grained permission key, e.g. `"staff:read"`
    pub fn permission_key(&self, resource: Resource) -> String {
        format!("{}:{}", resource.as_str(), self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
