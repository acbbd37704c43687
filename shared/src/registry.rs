//! Module Registry
//!
//! Static catalog of feature bundles. Each module governs a set of route
//! prefixes and page resources; roles are granted whole modules.
//!
//! ## Rules
//! - Lookups return the **first** match in declaration order, so overlapping
//!   route prefixes resolve by position in [`SYSTEM_MODULES`].
//! - A route matches a prefix when it equals it or continues with `/`.
//! - Every [`Resource`] belongs to exactly one module ([`ModuleRegistry::validate`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ModuleCategory, ModuleId, Resource, Role};

/// A named bundle of functionality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Module {
    pub id: ModuleId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ModuleCategory,
    /// Path prefixes in priority order
    pub routes: &'static [&'static str],
    pub resources: &'static [Resource],
    /// Role required to even see the module in the assignment screen
    pub required_role: Option<Role>,
}

impl Module {
    /// Prefix match: `/stock` matches `/stock` and `/stock/42`, not `/stocktake`
    pub fn matches_route(&self, route: &str) -> bool {
        self.routes.iter().any(|prefix| {
            route
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub fn owns(&self, resource: Resource) -> bool {
        self.resources.contains(&resource)
    }

    /// Whether `role` may be granted this module
    pub fn is_assignable_to(&self, role: Role) -> bool {
        match self.required_role {
            Some(Role::SuperAdmin) => role.is_super_admin(),
            _ => true,
        }
    }
}

/// Immutable module table, defined once
pub static SYSTEM_MODULES: &[Module] = &[
    Module {
        id: ModuleId::Dashboard,
        name: "Dashboard",
        description: "Daily overview of sales, production and stock alerts",
        category: ModuleCategory::Core,
        routes: &["/dashboard"],
        resources: &[Resource::Dashboard],
        required_role: None,
    },
    Module {
        id: ModuleId::OrderManagement,
        name: "Order Management",
        description: "Order intake, fulfilment and order history",
        category: ModuleCategory::Core,
        routes: &["/orders"],
        resources: &[Resource::Orders],
        required_role: None,
    },
    Module {
        id: ModuleId::ProductManagement,
        name: "Product Management",
        description: "Product catalog, recipes and categories",
        category: ModuleCategory::Operations,
        routes: &["/products", "/categories"],
        resources: &[Resource::Products, Resource::Categories],
        required_role: None,
    },
    Module {
        id: ModuleId::ProductionManagement,
        name: "Production Management",
        description: "Production schedules and batch tracking",
        category: ModuleCategory::Operations,
        routes: &["/production"],
        resources: &[Resource::Production],
        required_role: None,
    },
    Module {
        id: ModuleId::InventoryManagement,
        name: "Inventory Management",
        description: "Ingredients, stock levels and stock movements",
        category: ModuleCategory::Inventory,
        routes: &["/inventory", "/ingredients", "/stock"],
        resources: &[Resource::Inventory, Resource::Ingredients, Resource::Stock],
        required_role: None,
    },
    Module {
        id: ModuleId::PurchaseManagement,
        name: "Purchase Management",
        description: "Supplier purchases and purchase returns ledger",
        category: ModuleCategory::Inventory,
        routes: &["/purchases", "/purchase-returns", "/suppliers"],
        resources: &[
            Resource::Purchases,
            Resource::PurchaseReturns,
            Resource::Suppliers,
        ],
        required_role: None,
    },
    Module {
        id: ModuleId::CustomerManagement,
        name: "Customer Management",
        description: "Customer records and order history per customer",
        category: ModuleCategory::Crm,
        routes: &["/customers"],
        resources: &[Resource::Customers],
        required_role: None,
    },
    Module {
        id: ModuleId::MarketingManagement,
        name: "Marketing",
        description: "Campaigns and promotions",
        category: ModuleCategory::Crm,
        routes: &["/marketing"],
        resources: &[Resource::Marketing],
        required_role: None,
    },
    Module {
        id: ModuleId::HrManagement,
        name: "HR Management",
        description: "Staff records, attendance, leave and payroll",
        category: ModuleCategory::Hr,
        routes: &["/staff", "/attendance", "/leave-requests", "/salary"],
        resources: &[
            Resource::Staff,
            Resource::Attendance,
            Resource::LeaveRequests,
            Resource::Salary,
        ],
        required_role: None,
    },
    Module {
        id: ModuleId::FinanceManagement,
        name: "Finance",
        description: "Expenses, assets and payments",
        category: ModuleCategory::Finance,
        routes: &["/expenses", "/assets", "/payments"],
        resources: &[Resource::Expenses, Resource::Assets, Resource::Payments],
        required_role: None,
    },
    Module {
        id: ModuleId::ReportsAnalytics,
        name: "Reports & Analytics",
        description: "Sales, production and finance reports",
        category: ModuleCategory::Analytics,
        routes: &["/reports"],
        resources: &[Resource::Reports],
        required_role: None,
    },
    Module {
        id: ModuleId::UserManagement,
        name: "User Management",
        description: "User accounts and role assignment",
        category: ModuleCategory::Administration,
        routes: &["/admin/users"],
        resources: &[Resource::Users],
        required_role: None,
    },
    Module {
        id: ModuleId::BranchManagement,
        name: "Branch Management",
        description: "Bakery branches and their settings",
        category: ModuleCategory::Administration,
        routes: &["/admin/branches"],
        resources: &[Resource::Branches],
        required_role: None,
    },
    Module {
        id: ModuleId::SystemSettings,
        name: "System Settings",
        description: "Application settings and role module access",
        category: ModuleCategory::Administration,
        routes: &["/admin/settings", "/admin/role-modules"],
        resources: &[Resource::Settings, Resource::RoleModules],
        required_role: None,
    },
    Module {
        id: ModuleId::SuperAdminConsole,
        name: "Super Admin Console",
        description: "Tenant-wide maintenance tools",
        category: ModuleCategory::Administration,
        routes: &["/super-admin"],
        resources: &[Resource::SuperAdmin],
        required_role: Some(Role::SuperAdmin),
    },
];

/// Registry consistency problems
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("module {0} is declared more than once")]
    DuplicateModule(ModuleId),

    #[error("resource {0} is not owned by any module")]
    UnownedResource(Resource),

    #[error("resource {resource} is owned by both {first} and {second}")]
    SharedResource {
        resource: Resource,
        first: ModuleId,
        second: ModuleId,
    },
}

/// Read-only view over a module table
#[derive(Debug, Clone, Copy)]
pub struct ModuleRegistry<'a> {
    modules: &'a [Module],
}

impl ModuleRegistry<'static> {
    /// The application-wide registry
    pub fn system() -> Self {
        Self::new(SYSTEM_MODULES)
    }
}

impl Default for ModuleRegistry<'static> {
    fn default() -> Self {
        Self::system()
    }
}

impl<'a> ModuleRegistry<'a> {
    pub fn new(modules: &'a [Module]) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &'a [Module] {
        self.modules
    }

    pub fn get(&self, id: ModuleId) -> Option<&'a Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// First module (declaration order) with a prefix matching `route`
    pub fn route_module(&self, route: &str) -> Option<&'a Module> {
        self.modules.iter().find(|m| m.matches_route(route))
    }

    /// First module whose resources include `resource`
    pub fn resource_module(&self, resource: Resource) -> Option<&'a Module> {
        self.modules.iter().find(|m| m.owns(resource))
    }

    pub fn modules_by_category(&self, category: ModuleCategory) -> Vec<&'a Module> {
        self.modules
            .iter()
            .filter(|m| m.category == category)
            .collect()
    }

    pub fn all_module_ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id).collect()
    }

    /// Modules of `category` that the assignment screen shows for `role`
    ///
    /// Modules requiring the super admin are hidden from every other role.
    pub fn assignable_modules(&self, role: Role, category: ModuleCategory) -> Vec<&'a Module> {
        self.modules
            .iter()
            .filter(|m| m.category == category && m.is_assignable_to(role))
            .collect()
    }

    /// Check unique module ids and single ownership of every resource
    pub fn validate(&self) -> Result<(), RegistryError> {
        for (i, module) in self.modules.iter().enumerate() {
            if self.modules[..i].iter().any(|m| m.id == module.id) {
                return Err(RegistryError::DuplicateModule(module.id));
            }
        }

        for resource in Resource::ALL {
            let mut owners = self.modules.iter().filter(|m| m.owns(resource));
            let first = owners
                .next()
                .ok_or(RegistryError::UnownedResource(resource))?;
            if let Some(second) = owners.next() {
                return Err(RegistryError::SharedResource {
                    resource,
                    first: first.id,
                    second: second.id,
                });
            }
        }

        Ok(())
    }
}

pub fn get_route_module(route: &str) -> Option<&'static Module> {
    ModuleRegistry::system().route_module(route)
}

pub fn get_resource_module(resource: Resource) -> Option<&'static Module> {
    ModuleRegistry::system().resource_module(resource)
}

pub fn get_modules_by_category(category: ModuleCategory) -> Vec<&'static Module> {
    ModuleRegistry::system().modules_by_category(category)
}

pub fn get_all_module_ids() -> Vec<ModuleId> {
    ModuleRegistry::system().all_module_ids()
}

/// Catalog entry served by `GET /api/modules`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub id: ModuleId,
    pub name: String,
    pub description: String,
    pub category: ModuleCategory,
    pub routes: Vec<String>,
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_role: Option<Role>,
}

impl From<&Module> for ModuleInfo {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id,
            name: module.name.to_string(),
            description: module.description.to_string(),
            category: module.category,
            routes: module.routes.iter().map(|r| r.to_string()).collect(),
            resources: module.resources.to_vec(),
            required_role: module.required_role,
        }
    }
}
