//! Grant store seam
//!
//! [`crate::HttpClient`] talks to the real server; tests plug in doubles.

use async_trait::async_trait;
use shared::models::{ModuleId, Role, RoleModuleGrant};

use crate::ClientResult;

/// Where role-module grants come from
#[async_trait]
pub trait ModuleSource: Send + Sync {
    /// Module ids granted to the session user's role
    async fn user_modules(&self) -> ClientResult<Vec<ModuleId>>;

    /// Stored grants of one role
    async fn role_modules_for(&self, role: Role) -> ClientResult<Vec<RoleModuleGrant>>;

    /// Replace every grant of `role`
    async fn save_role_modules(&self, role: Role, module_ids: &[ModuleId]) -> ClientResult<()>;
}

#[async_trait]
impl<S: ModuleSource + ?Sized> ModuleSource for std::sync::Arc<S> {
    async fn user_modules(&self) -> ClientResult<Vec<ModuleId>> {
        (**self).user_modules().await
    }

    async fn role_modules_for(&self, role: Role) -> ClientResult<Vec<RoleModuleGrant>> {
        (**self).role_modules_for(role).await
    }

    async fn save_role_modules(&self, role: Role, module_ids: &[ModuleId]) -> ClientResult<()> {
        (**self).save_role_modules(role, module_ids).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::ClientError;

    /// In-memory grant store with switchable failure
    #[derive(Default)]
    pub struct MemorySource {
        pub session_role: Mutex<Option<Role>>,
        pub grants: Mutex<HashMap<Role, Vec<ModuleId>>>,
        pub failing: Mutex<bool>,
        pub fetches: AtomicUsize,
    }

    impl MemorySource {
        pub fn for_role(role: Role, modules: &[ModuleId]) -> Self {
            let source = Self::default();
            *source.session_role.lock() = Some(role);
            source.grants.lock().insert(role, modules.to_vec());
            source
        }

        pub fn set_failing(&self, failing: bool) {
            *self.failing.lock() = failing;
        }

        pub fn set(&self, role: Role, modules: &[ModuleId]) {
            self.grants.lock().insert(role, modules.to_vec());
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        fn check(&self) -> ClientResult<()> {
            if *self.failing.lock() {
                return Err(ClientError::Internal("store offline".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ModuleSource for MemorySource {
        async fn user_modules(&self) -> ClientResult<Vec<ModuleId>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let role = *self.session_role.lock();
            Ok(role
                .and_then(|r| self.grants.lock().get(&r).cloned())
                .unwrap_or_default())
        }

        async fn role_modules_for(&self, role: Role) -> ClientResult<Vec<RoleModuleGrant>> {
            self.check()?;
            let granted = self.grants.lock().get(&role).cloned().unwrap_or_default();
            Ok(granted
                .into_iter()
                .map(|module_id| RoleModuleGrant {
                    role,
                    module_id,
                    granted: true,
                })
                .collect())
        }

        async fn save_role_modules(&self, role: Role, module_ids: &[ModuleId]) -> ClientResult<()> {
            self.check()?;
            self.set(role, module_ids);
            Ok(())
        }
    }
}
