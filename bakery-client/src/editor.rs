//! Role-module assignment editor
//!
//! Model behind the admin screen that assigns modules to roles. The admin
//! picks a role, the editor loads that role's saved grants into a working
//! set, edits toggle modules or whole categories, and save sends the full
//! working set as one replace-all request.
//!
//! Loads are fenced: each [`RoleModuleEditor::begin_load`] hands out a
//! [`LoadTicket`], and a response is applied only when its ticket still
//! matches the latest request and the selected role. Switching roles
//! quickly can therefore never show one role's grants under another.

use std::collections::{BTreeSet, HashMap};

use shared::models::{Action, ModuleCategory, ModuleId, Resource, Role, RoleModuleGrant};
use shared::registry::{Module, ModuleRegistry};

use crate::{ClientError, ClientResult, ModuleSource, RoleAccess};

/// Proof of one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    request_id: u64,
    role: Role,
}

impl LoadTicket {
    pub fn role(&self) -> Role {
        self.role
    }
}

/// What happened to a load response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// Superseded by a newer request or a role switch; dropped
    Stale,
}

/// Checkbox state of a category header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryState {
    None,
    Partial,
    All,
}

#[derive(Debug)]
pub struct RoleModuleEditor {
    registry: ModuleRegistry<'static>,
    selected_role: Option<Role>,
    request_id: u64,
    saved: BTreeSet<ModuleId>,
    working: BTreeSet<ModuleId>,
    /// Category members selected before the header was checked
    category_undo: HashMap<ModuleCategory, BTreeSet<ModuleId>>,
    loading: bool,
    last_error: Option<String>,
}

impl RoleModuleEditor {
    /// Open the editor for the session user
    ///
    /// Requires update access to the role-modules page.
    pub fn open<S: ModuleSource>(access: &RoleAccess<S>) -> ClientResult<Self> {
        if !access.can_access_page(Resource::RoleModules, Action::Update) {
            return Err(ClientError::Forbidden(
                "Role module assignment is not available to this user".into(),
            ));
        }
        Ok(Self::new())
    }

    fn new() -> Self {
        Self {
            registry: ModuleRegistry::system(),
            selected_role: None,
            request_id: 0,
            saved: BTreeSet::new(),
            working: BTreeSet::new(),
            category_undo: HashMap::new(),
            loading: false,
            last_error: None,
        }
    }

    /// Roles offered in the role picker
    pub fn assignable_roles(&self) -> &'static [Role] {
        &Role::ASSIGNABLE
    }

    pub fn selected_role(&self) -> Option<Role> {
        self.selected_role
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed load or save
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Select `role` and start loading its grants
    ///
    /// Edits of the previously selected role are discarded.
    pub fn begin_load(&mut self, role: Role) -> ClientResult<LoadTicket> {
        if !role.is_assignable() {
            return Err(ClientError::Validation(format!(
                "Role {} cannot be edited",
                role
            )));
        }

        self.request_id += 1;
        self.selected_role = Some(role);
        self.saved.clear();
        self.working.clear();
        self.category_undo.clear();
        self.loading = true;
        self.last_error = None;

        Ok(LoadTicket {
            request_id: self.request_id,
            role,
        })
    }

    /// Apply the response for `ticket` unless it has been superseded
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: ClientResult<Vec<RoleModuleGrant>>,
    ) -> ClientResult<LoadOutcome> {
        if ticket.request_id != self.request_id || Some(ticket.role) != self.selected_role {
            tracing::debug!(role = %ticket.role, "Dropping stale role module response");
            return Ok(LoadOutcome::Stale);
        }

        self.loading = false;
        match result {
            Ok(grants) => {
                self.saved = grants
                    .into_iter()
                    .filter(|g| g.role == ticket.role && g.granted)
                    .map(|g| g.module_id)
                    .collect();
                self.working = self.saved.clone();
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Select `role` and load its grants from `source`
    pub async fn load<S: ModuleSource + ?Sized>(
        &mut self,
        source: &S,
        role: Role,
    ) -> ClientResult<LoadOutcome> {
        let ticket = self.begin_load(role)?;
        let result = source.role_modules_for(role).await;
        self.finish_load(ticket, result)
    }

    /// Modules of `category` shown for the selected role
    pub fn visible_modules(&self, category: ModuleCategory) -> Vec<&'static Module> {
        match self.selected_role {
            Some(role) => self.registry.assignable_modules(role, category),
            None => Vec::new(),
        }
    }

    pub fn is_selected(&self, module_id: ModuleId) -> bool {
        self.working.contains(&module_id)
    }

    /// Working set in registry order
    pub fn selected_modules(&self) -> Vec<ModuleId> {
        self.working.iter().copied().collect()
    }

    fn is_editable(&self, module_id: ModuleId) -> bool {
        match (self.selected_role, self.registry.get(module_id)) {
            (Some(role), Some(module)) => !self.loading && module.is_assignable_to(role),
            _ => false,
        }
    }

    /// Flip one module; returns whether it is now selected
    pub fn toggle_module(&mut self, module_id: ModuleId) -> bool {
        if !self.is_editable(module_id) {
            return self.is_selected(module_id);
        }
        if let Some(module) = self.registry.get(module_id) {
            self.category_undo.remove(&module.category);
        }
        if !self.working.remove(&module_id) {
            self.working.insert(module_id);
        }
        self.is_selected(module_id)
    }

    /// Select or clear every visible module of `category`
    ///
    /// Clearing right after selecting puts back the members that were
    /// selected before; a single-module toggle in between forgets them.
    pub fn set_category(&mut self, category: ModuleCategory, selected: bool) {
        if self.loading {
            return;
        }
        let members: Vec<ModuleId> = self
            .visible_modules(category)
            .iter()
            .map(|m| m.id)
            .collect();

        if selected {
            let before = members
                .iter()
                .filter(|id| self.working.contains(*id))
                .copied()
                .collect();
            self.category_undo.entry(category).or_insert(before);
            self.working.extend(members);
            return;
        }

        let restore = self.category_undo.remove(&category).unwrap_or_default();
        for id in members {
            if !restore.contains(&id) {
                self.working.remove(&id);
            }
        }
    }

    pub fn category_state(&self, category: ModuleCategory) -> CategoryState {
        let modules = self.visible_modules(category);
        let selected = modules.iter().filter(|m| self.is_selected(m.id)).count();
        match selected {
            0 => CategoryState::None,
            n if n == modules.len() => CategoryState::All,
            _ => CategoryState::Partial,
        }
    }

    /// Working set differs from the last loaded or saved set
    pub fn is_dirty(&self) -> bool {
        self.working != self.saved
    }

    /// Send the full working set for the selected role
    ///
    /// On failure the working set is kept so the admin can retry.
    pub async fn save<S: ModuleSource + ?Sized>(&mut self, source: &S) -> ClientResult<()> {
        let Some(role) = self.selected_role else {
            return Err(ClientError::Validation("No role selected".into()));
        };
        if self.loading {
            return Err(ClientError::Validation(
                "Role modules are still loading".into(),
            ));
        }

        let modules = self.selected_modules();
        match source.save_role_modules(role, &modules).await {
            Ok(()) => {
                tracing::info!(role = %role, modules = modules.len(), "Role modules saved");
                self.saved = self.working.clone();
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "Failed to save role modules");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Discard local edits by reloading the selected role from `source`
    pub async fn reset<S: ModuleSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> ClientResult<LoadOutcome> {
        let Some(role) = self.selected_role else {
            return Err(ClientError::Validation("No role selected".into()));
        };
        self.load(source, role).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MemorySource;
    use shared::models::User;

    fn editor() -> RoleModuleEditor {
        RoleModuleEditor::new()
    }

    fn grants(role: Role, ids: &[ModuleId]) -> Vec<RoleModuleGrant> {
        ids.iter()
            .map(|id| RoleModuleGrant {
                role,
                module_id: *id,
                granted: true,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_open_requires_role_modules_update() {
        let source = MemorySource::for_role(Role::Admin, &[ModuleId::SystemSettings]);
        let access = RoleAccess::new(source);
        access.set_user(Some(User::new("1", "boss", Role::Admin)));
        access.refresh().await.unwrap();
        assert!(RoleModuleEditor::open(&access).is_ok());

        let source = MemorySource::for_role(Role::Manager, &[ModuleId::Dashboard]);
        let access = RoleAccess::new(source);
        access.set_user(Some(User::new("2", "lead", Role::Manager)));
        access.refresh().await.unwrap();
        assert!(matches!(
            RoleModuleEditor::open(&access),
            Err(ClientError::Forbidden(_))
        ));

        // Admin whose role lost the settings module
        let source = MemorySource::for_role(Role::Admin, &[ModuleId::Dashboard]);
        let access = RoleAccess::new(source);
        access.set_user(Some(User::new("1", "boss", Role::Admin)));
        access.refresh().await.unwrap();
        assert!(RoleModuleEditor::open(&access).is_err());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut editor = editor();
        let first = editor.begin_load(Role::Manager).unwrap();
        let second = editor.begin_load(Role::Staff).unwrap();

        // Staff answer arrives first, manager answer last
        let outcome = editor
            .finish_load(second, Ok(grants(Role::Staff, &[ModuleId::Dashboard])))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Applied);

        let outcome = editor
            .finish_load(
                first,
                Ok(grants(Role::Manager, &[ModuleId::FinanceManagement])),
            )
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);

        assert_eq!(editor.selected_role(), Some(Role::Staff));
        assert_eq!(editor.selected_modules(), vec![ModuleId::Dashboard]);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_repeat_request_for_same_role_is_fenced() {
        let mut editor = editor();
        let old = editor.begin_load(Role::Staff).unwrap();
        let new = editor.begin_load(Role::Staff).unwrap();

        assert_eq!(
            editor.finish_load(old, Ok(grants(Role::Staff, &[ModuleId::HrManagement]))).unwrap(),
            LoadOutcome::Stale
        );
        assert!(editor.is_loading());
        editor
            .finish_load(new, Ok(grants(Role::Staff, &[ModuleId::Dashboard])))
            .unwrap();
        assert_eq!(editor.selected_modules(), vec![ModuleId::Dashboard]);
    }

    #[test]
    fn test_stale_error_is_swallowed() {
        let mut editor = editor();
        let old = editor.begin_load(Role::Staff).unwrap();
        editor.begin_load(Role::Marketer).unwrap();
        let outcome = editor.finish_load(old, Err(ClientError::Internal("boom".into())));
        assert_eq!(outcome.unwrap(), LoadOutcome::Stale);
        assert!(editor.last_error().is_none());
    }

    #[test]
    fn test_super_admin_is_not_selectable() {
        let mut editor = editor();
        assert!(editor.begin_load(Role::SuperAdmin).is_err());
        assert!(!editor.assignable_roles().contains(&Role::SuperAdmin));
    }

    #[test]
    fn test_super_admin_module_hidden_and_not_toggleable() {
        let mut editor = editor();
        let ticket = editor.begin_load(Role::Admin).unwrap();
        editor.finish_load(ticket, Ok(Vec::new())).unwrap();

        let admin_modules: Vec<ModuleId> = editor
            .visible_modules(ModuleCategory::Administration)
            .iter()
            .map(|m| m.id)
            .collect();
        assert!(!admin_modules.contains(&ModuleId::SuperAdminConsole));
        assert!(!editor.toggle_module(ModuleId::SuperAdminConsole));

        editor.set_category(ModuleCategory::Administration, true);
        assert!(!editor.is_selected(ModuleId::SuperAdminConsole));
        assert_eq!(
            editor.category_state(ModuleCategory::Administration),
            CategoryState::All
        );
    }

    #[test]
    fn test_toggle_and_category_states() {
        let mut editor = editor();
        let ticket = editor.begin_load(Role::Manager).unwrap();
        editor
            .finish_load(ticket, Ok(grants(Role::Manager, &[ModuleId::ProductManagement])))
            .unwrap();

        assert_eq!(
            editor.category_state(ModuleCategory::Operations),
            CategoryState::Partial
        );
        assert!(editor.toggle_module(ModuleId::ProductionManagement));
        assert_eq!(
            editor.category_state(ModuleCategory::Operations),
            CategoryState::All
        );
        assert!(editor.is_dirty());

        editor.set_category(ModuleCategory::Operations, false);
        assert_eq!(
            editor.category_state(ModuleCategory::Operations),
            CategoryState::None
        );
        assert!(editor.toggle_module(ModuleId::ProductManagement));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_category_round_trip_restores_previous_selection() {
        let mut editor = editor();
        let ticket = editor.begin_load(Role::Manager).unwrap();
        editor
            .finish_load(ticket, Ok(grants(Role::Manager, &[ModuleId::ProductManagement])))
            .unwrap();
        let before = editor.selected_modules();

        editor.set_category(ModuleCategory::Operations, true);
        assert_eq!(
            editor.category_state(ModuleCategory::Operations),
            CategoryState::All
        );
        editor.set_category(ModuleCategory::Operations, false);
        assert_eq!(editor.selected_modules(), before);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_category_round_trip_skips_super_admin_modules() {
        let mut editor = editor();
        let ticket = editor.begin_load(Role::Admin).unwrap();
        editor
            .finish_load(ticket, Ok(grants(Role::Admin, &[ModuleId::SystemSettings])))
            .unwrap();

        editor.set_category(ModuleCategory::Administration, true);
        assert!(!editor.is_selected(ModuleId::SuperAdminConsole));
        editor.set_category(ModuleCategory::Administration, false);
        assert_eq!(editor.selected_modules(), vec![ModuleId::SystemSettings]);
    }

    #[test]
    fn test_toggle_between_category_clicks_clears_category() {
        let mut editor = editor();
        let ticket = editor.begin_load(Role::Manager).unwrap();
        editor
            .finish_load(ticket, Ok(grants(Role::Manager, &[ModuleId::ProductManagement])))
            .unwrap();

        editor.set_category(ModuleCategory::Operations, true);
        editor.toggle_module(ModuleId::ProductionManagement);
        editor.toggle_module(ModuleId::ProductionManagement);
        editor.set_category(ModuleCategory::Operations, false);
        assert_eq!(
            editor.category_state(ModuleCategory::Operations),
            CategoryState::None
        );
    }

    #[test]
    fn test_edits_blocked_while_loading() {
        let mut editor = editor();
        editor.begin_load(Role::Staff).unwrap();
        assert!(!editor.toggle_module(ModuleId::Dashboard));
        editor.set_category(ModuleCategory::Core, true);
        assert!(editor.selected_modules().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_working_set() {
        let source = MemorySource::for_role(Role::Staff, &[ModuleId::Dashboard]);
        let mut editor = editor();
        editor.load(&source, Role::Staff).await.unwrap();
        editor.toggle_module(ModuleId::OrderManagement);

        source.set_failing(true);
        assert!(editor.save(&source).await.is_err());
        assert_eq!(editor.last_error(), Some("Internal error: store offline"));
        assert!(editor.is_dirty());
        assert_eq!(
            editor.selected_modules(),
            vec![ModuleId::Dashboard, ModuleId::OrderManagement]
        );

        source.set_failing(false);
        editor.save(&source).await.unwrap();
        assert!(!editor.is_dirty());
        assert!(editor.last_error().is_none());
        assert_eq!(
            source.grants.lock().get(&Role::Staff).cloned(),
            Some(vec![ModuleId::Dashboard, ModuleId::OrderManagement])
        );
    }

    #[tokio::test]
    async fn test_reset_discards_edits() {
        let source = MemorySource::for_role(Role::Staff, &[ModuleId::Dashboard]);
        let mut editor = editor();
        editor.load(&source, Role::Staff).await.unwrap();
        editor.set_category(ModuleCategory::Hr, true);
        assert!(editor.is_dirty());

        editor.reset(&source).await.unwrap();
        assert!(!editor.is_dirty());
        assert_eq!(editor.selected_modules(), vec![ModuleId::Dashboard]);
    }

    #[tokio::test]
    async fn test_save_without_role() {
        let source = MemorySource::default();
        let mut editor = editor();
        assert!(matches!(
            editor.save(&source).await,
            Err(ClientError::Validation(_))
        ));
    }
}
