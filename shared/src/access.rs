//! Access Decision Engine
//!
//! Combines the session user, the modules granted to the user's role and the
//! static [`ModuleRegistry`] into allow/deny answers.
//!
//! ## Layers
//! - **Module gate** (coarse): does the role have the feature bundle at all
//! - **Role allow-list** (fine): within an enabled bundle, which resources the
//!   role may touch; roles without an allow-list fall back to the user's
//!   fine-grained permissions (`"<resource>:<action>"`)
//! - **Super admin** short-circuits both layers everywhere
//!
//! Every predicate answers `false` when there is no user, and resources or
//! routes without an owning module are denied (fail closed).

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::{Action, ModuleId, Resource, Role, User};
use crate::registry::ModuleRegistry;

// ========== Role allow-lists ==========

/// Resources a role may touch once the owning module is granted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    /// Every resource except the listed ones
    AllExcept(&'static [Resource]),
    /// Only the listed resources
    Only(&'static [Resource]),
}

impl AllowList {
    pub fn allows(&self, resource: Resource) -> bool {
        match self {
            AllowList::AllExcept(denied) => !denied.contains(&resource),
            AllowList::Only(allowed) => allowed.contains(&resource),
        }
    }
}

const MANAGER_RESOURCES: &[Resource] = &[
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
];

const SUPERVISOR_RESOURCES: &[Resource] = &[
    Resource::Dashboard,
    Resource::Orders,
    Resource::Products,
    Resource::Categories,
    Resource::Production,
    Resource::Inventory,
    Resource::Ingredients,
    Resource::Stock,
    Resource::Staff,
    Resource::Attendance,
    Resource::LeaveRequests,
    Resource::Reports,
];

const MARKETER_RESOURCES: &[Resource] = &[
    Resource::Dashboard,
    Resource::Orders,
    Resource::Products,
    Resource::Customers,
    Resource::Marketing,
    Resource::Reports,
];

const STAFF_RESOURCES: &[Resource] = &[
    Resource::Dashboard,
    Resource::Orders,
    Resource::Production,
    Resource::Inventory,
    Resource::Ingredients,
    Resource::Attendance,
    Resource::LeaveRequests,
];

/// `{role -> allow-list}` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePolicy {
    entries: HashMap<Role, AllowList>,
}

static DEFAULT_POLICY: LazyLock<RolePolicy> = LazyLock::new(RolePolicy::defaults);

impl RolePolicy {
    /// Table with no allow-lists: every role falls through to permissions
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        Self::empty()
            .with(Role::Admin, AllowList::AllExcept(&[Resource::SuperAdmin]))
            .with(Role::Manager, AllowList::Only(MANAGER_RESOURCES))
            .with(Role::Supervisor, AllowList::Only(SUPERVISOR_RESOURCES))
            .with(Role::Marketer, AllowList::Only(MARKETER_RESOURCES))
            .with(Role::Staff, AllowList::Only(STAFF_RESOURCES))
    }

    /// Shared instance of [`RolePolicy::defaults`]
    pub fn system() -> &'static RolePolicy {
        &DEFAULT_POLICY
    }

    pub fn with(mut self, role: Role, list: AllowList) -> Self {
        self.entries.insert(role, list);
        self
    }

    pub fn without(mut self, role: Role) -> Self {
        self.entries.remove(&role);
        self
    }

    pub fn allow_list(&self, role: Role) -> Option<&AllowList> {
        self.entries.get(&role)
    }
}

/// Modules a role receives when the grant store is first seeded
pub fn default_modules(role: Role) -> &'static [ModuleId] {
    match role {
        Role::SuperAdmin => &ModuleId::ALL,
        Role::Admin => &[
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
        ],
        Role::Manager => &[
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
        ],
        Role::Supervisor => &[
            ModuleId::Dashboard,
            ModuleId::OrderManagement,
            ModuleId::ProductManagement,
            ModuleId::ProductionManagement,
            ModuleId::InventoryManagement,
            ModuleId::HrManagement,
            ModuleId::ReportsAnalytics,
        ],
        Role::Marketer => &[
            ModuleId::Dashboard,
            ModuleId::OrderManagement,
            ModuleId::ProductManagement,
            ModuleId::CustomerManagement,
            ModuleId::MarketingManagement,
            ModuleId::ReportsAnalytics,
        ],
        Role::Staff => &[
            ModuleId::Dashboard,
            ModuleId::OrderManagement,
            ModuleId::ProductionManagement,
            ModuleId::InventoryManagement,
            ModuleId::HrManagement,
        ],
    }
}

// ========== Grant set ==========

/// Module ids granted to the session user's role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantSet {
    modules: BTreeSet<ModuleId>,
}

impl GrantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.modules.contains(&id)
    }

    pub fn insert(&mut self, id: ModuleId) -> bool {
        self.modules.insert(id)
    }

    pub fn remove(&mut self, id: ModuleId) -> bool {
        self.modules.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<ModuleId> {
        self.iter().collect()
    }
}

impl FromIterator<ModuleId> for GrantSet {
    fn from_iter<I: IntoIterator<Item = ModuleId>>(iter: I) -> Self {
        Self {
            modules: iter.into_iter().collect(),
        }
    }
}

impl Extend<ModuleId> for GrantSet {
    fn extend<I: IntoIterator<Item = ModuleId>>(&mut self, iter: I) {
        self.modules.extend(iter);
    }
}

// ========== Branch scope ==========

/// Which branch records a user may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchScope<'a> {
    /// No user, or a user with neither a branch nor all-branch access
    Denied,
    /// No branch filtering
    All,
    /// Records of this branch only
    Only(&'a str),
}

// ========== Decision engine ==========

/// One evaluation of the access rules for a session
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    user: Option<&'a User>,
    grants: &'a GrantSet,
    registry: ModuleRegistry<'a>,
    policy: &'a RolePolicy,
}

impl<'a> AccessContext<'a> {
    /// Context over the system registry and default role policy
    pub fn new(user: Option<&'a User>, grants: &'a GrantSet) -> Self {
        Self {
            user,
            grants,
            registry: ModuleRegistry::system(),
            policy: RolePolicy::system(),
        }
    }

    pub fn with_registry(mut self, registry: ModuleRegistry<'a>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_policy(mut self, policy: &'a RolePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn user(&self) -> Option<&'a User> {
        self.user
    }

    fn role(&self) -> Option<Role> {
        self.user.map(|u| u.role)
    }

    fn role_in(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|r| roles.contains(&r))
    }

    /// Coarse gate: is the module granted to the user's role
    pub fn can_access_module(&self, module_id: ModuleId) -> bool {
        let Some(user) = self.user else {
            return false;
        };
        if user.role.is_super_admin() {
            return true;
        }
        self.grants.contains(module_id)
    }

    /// Route gate: the owning module must be granted; unmapped routes are denied
    pub fn can_access_route(&self, route: &str) -> bool {
        let Some(user) = self.user else {
            return false;
        };
        if user.role.is_super_admin() {
            return true;
        }
        match self.registry.route_module(route) {
            Some(module) => self.can_access_module(module.id),
            None => false,
        }
    }

    /// Page gate: module gate, then the role allow-list or permission fallback
    pub fn can_access_page(&self, resource: Resource, action: Action) -> bool {
        let Some(user) = self.user else {
            return false;
        };
        if user.role.is_super_admin() {
            return true;
        }

        match self.registry.resource_module(resource) {
            Some(module) if !self.can_access_module(module.id) => return false,
            Some(_) => {}
            None => {
                tracing::warn!(
                    resource = %resource,
                    "Resource has no owning module, denying access"
                );
                return false;
            }
        }

        match self.policy.allow_list(user.role) {
            Some(list) => list.allows(resource),
            None => user.has_permission(&action.permission_key(resource)),
        }
    }

    /// Sidebar gate: module gate first, then [`Self::can_access_page`]
    pub fn can_access_sidebar_item(&self, resource: Resource, action: Action) -> bool {
        let Some(user) = self.user else {
            return false;
        };
        if user.role.is_super_admin() {
            return true;
        }
        if let Some(module) = self.registry.resource_module(resource)
            && !self.can_access_module(module.id)
        {
            return false;
        }
        self.can_access_page(resource, action)
    }

    /// Modules effectively available to the user, in registry order
    pub fn effective_modules(&self) -> Vec<ModuleId> {
        self.registry
            .modules()
            .iter()
            .map(|m| m.id)
            .filter(|id| self.can_access_module(*id))
            .collect()
    }

    // ========== Capability helpers ==========

    pub fn is_super_admin(&self) -> bool {
        self.role_in(&[Role::SuperAdmin])
    }

    pub fn is_admin(&self) -> bool {
        self.role_in(&[Role::Admin])
    }

    pub fn can_manage_users(&self) -> bool {
        self.role_in(&[Role::SuperAdmin, Role::Admin])
    }

    pub fn can_manage_role_modules(&self) -> bool {
        self.role_in(&[Role::SuperAdmin, Role::Admin])
    }

    pub fn can_manage_staff(&self) -> bool {
        self.role_in(&[Role::SuperAdmin, Role::Admin, Role::Manager])
    }

    pub fn can_view_finance(&self) -> bool {
        self.role_in(&[Role::SuperAdmin, Role::Admin, Role::Manager])
    }

    pub fn can_manage_inventory(&self) -> bool {
        self.role_in(&[Role::SuperAdmin, Role::Admin, Role::Manager, Role::Supervisor])
    }

    pub fn can_view_reports(&self) -> bool {
        self.role_in(&[
            Role::SuperAdmin,
            Role::Admin,
            Role::Manager,
            Role::Supervisor,
            Role::Marketer,
        ])
    }

    pub fn can_manage_branches(&self) -> bool {
        self.role_in(&[Role::SuperAdmin])
    }

    // ========== Branch scoping ==========

    pub fn can_access_all_branches(&self) -> bool {
        self.user
            .is_some_and(|u| u.role.is_super_admin() || u.can_access_all_branches)
    }

    pub fn can_access_branch_data(&self, branch_id: &str) -> bool {
        match self.branch_scope() {
            BranchScope::All => true,
            BranchScope::Only(own) => own == branch_id,
            BranchScope::Denied => false,
        }
    }

    /// Branch filter the data layer should apply
    pub fn branch_scope(&self) -> BranchScope<'a> {
        let Some(user) = self.user else {
            return BranchScope::Denied;
        };
        if self.can_access_all_branches() {
            return BranchScope::All;
        }
        match user.branch_id.as_deref() {
            Some(branch) => BranchScope::Only(branch),
            None => BranchScope::Denied,
        }
    }
}
