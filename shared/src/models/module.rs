//! Module identifiers and categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grouping tag used by the admin assignment screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleCategory {
    Core,
    Finance,
    Inventory,
    Crm,
    Operations,
    Hr,
    Analytics,
    Administration,
}

impl ModuleCategory {
    /// All categories in display order
    pub const ALL: [ModuleCategory; 8] = [
        ModuleCategory::Core,
        ModuleCategory::Finance,
        ModuleCategory::Inventory,
        ModuleCategory::Crm,
        ModuleCategory::Operations,
        ModuleCategory::Hr,
        ModuleCategory::Analytics,
        ModuleCategory::Administration,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ModuleCategory::Core => "core",
            ModuleCategory::Finance => "finance",
            ModuleCategory::Inventory => "inventory",
            ModuleCategory::Crm => "crm",
            ModuleCategory::Operations => "operations",
            ModuleCategory::Hr => "hr",
            ModuleCategory::Analytics => "analytics",
            ModuleCategory::Administration => "administration",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            ModuleCategory::Core => "Core",
            ModuleCategory::Finance => "Finance",
            ModuleCategory::Inventory => "Inventory",
            ModuleCategory::Crm => "Customers & Marketing",
            ModuleCategory::Operations => "Operations",
            ModuleCategory::Hr => "Human Resources",
            ModuleCategory::Analytics => "Analytics",
            ModuleCategory::Administration => "Administration",
        }
    }
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a registry module
///
/// Serialized as the snake_case string persisted in the grant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    Dashboard,
    OrderManagement,
    ProductManagement,
    ProductionManagement,
    InventoryManagement,
    PurchaseManagement,
    CustomerManagement,
    MarketingManagement,
    HrManagement,
    FinanceManagement,
    ReportsAnalytics,
    UserManagement,
    BranchManagement,
    SystemSettings,
    SuperAdminConsole,
}

impl ModuleId {
    pub const ALL: [ModuleId; 15] = [
        ModuleId::Dashboard,
        ModuleId::OrderManagement,
        ModuleId::ProductManagement,
        ModuleId::ProductionManagement,
        ModuleId::InventoryManagement,
        ModuleId::PurchaseManagement,
        ModuleId::CustomerManagement,
        ModuleId::MarketingManagement,
        ModuleId::HrManagement,
        ModuleId::FinanceManagement,
        ModuleId::ReportsAnalytics,
        ModuleId::UserManagement,
        ModuleId::BranchManagement,
        ModuleId::SystemSettings,
        ModuleId::SuperAdminConsole,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ModuleId::Dashboard => "dashboard",
            ModuleId::OrderManagement => "order_management",
            ModuleId::ProductManagement => "product_management",
            ModuleId::ProductionManagement => "production_management",
            ModuleId::InventoryManagement => "inventory_management",
            ModuleId::PurchaseManagement => "purchase_management",
            ModuleId::CustomerManagement => "customer_management",
            ModuleId::MarketingManagement => "marketing_management",
            ModuleId::HrManagement => "hr_management",
            ModuleId::FinanceManagement => "finance_management",
            ModuleId::ReportsAnalytics => "reports_analytics",
            ModuleId::UserManagement => "user_management",
            ModuleId::BranchManagement => "branch_management",
            ModuleId::SystemSettings => "system_settings",
            ModuleId::SuperAdminConsole => "super_admin_console",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ModuleCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Unknown module id string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown module: {0}")]
pub struct UnknownModule(pub String);

impl FromStr for ModuleId {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}
