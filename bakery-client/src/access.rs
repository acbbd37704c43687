//! Session access engine
//!
//! Holds the signed-in user and a cached copy of the modules granted to the
//! user's role, and answers access questions through
//! [`shared::access::AccessContext`].
//!
//! The grant set is refetched when it is older than the configured TTL and
//! the caller asks for freshness (`ensure_fresh`, `on_focus`), so a change
//! saved by an administrator reaches an open session within one TTL or on
//! the next focus.

use std::time::{Duration, Instant};

use parking_lot::RwLock;
use shared::access::{AccessContext, GrantSet};
use shared::models::{Action, ModuleId, Resource, User};

use crate::config::DEFAULT_MODULE_CACHE_TTL;
use crate::{ClientConfig, ClientResult, HttpClient, ModuleSource};

#[derive(Debug, Default)]
struct GrantCache {
    grants: GrantSet,
    /// Start time of the request that produced `grants`
    fetched_at: Option<Instant>,
}

/// Session-side access engine
pub struct RoleAccess<S> {
    source: S,
    user: RwLock<Option<User>>,
    cache: RwLock<GrantCache>,
    ttl: Duration,
}

impl RoleAccess<HttpClient> {
    /// Engine backed by the server named in `config`
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::with_ttl(
            config.build_http_client()?,
            config.module_cache_ttl,
        ))
    }
}

impl<S: ModuleSource> RoleAccess<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, DEFAULT_MODULE_CACHE_TTL)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            user: RwLock::new(None),
            cache: RwLock::new(GrantCache::default()),
            ttl,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// Switch the session user; cached grants belong to the previous user
    pub fn set_user(&self, user: Option<User>) {
        *self.user.write() = user;
        *self.cache.write() = GrantCache::default();
    }

    pub fn grants(&self) -> GrantSet {
        self.cache.read().grants.clone()
    }

    pub fn is_stale(&self) -> bool {
        match self.cache.read().fetched_at {
            Some(at) => at.elapsed() >= self.ttl,
            None => true,
        }
    }

    /// Fetch the grant set now
    ///
    /// Without a user there is nothing to fetch. On failure the previous
    /// set is kept (empty if none was ever fetched) and the error returned.
    pub async fn refresh(&self) -> ClientResult<()> {
        let Some(user_id) = self.user.read().as_ref().map(|u| u.id.clone()) else {
            return Ok(());
        };

        let started = Instant::now();
        match self.source.user_modules().await {
            Ok(ids) => {
                if self.user.read().as_ref().map(|u| u.id.as_str()) != Some(user_id.as_str()) {
                    tracing::debug!(user_id = %user_id, "Discarding grants fetched for previous user");
                    return Ok(());
                }
                let mut cache = self.cache.write();
                if cache.fetched_at.is_some_and(|at| at > started) {
                    return Ok(());
                }
                cache.grants = ids.into_iter().collect();
                cache.fetched_at = Some(started);
                tracing::debug!(user_id = %user_id, modules = cache.grants.len(), "Grant set refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to fetch user modules");
                Err(e)
            }
        }
    }

    /// Refetch when the cached set is older than the TTL
    pub async fn ensure_fresh(&self) -> ClientResult<()> {
        if self.is_stale() {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Window regained focus
    pub async fn on_focus(&self) -> ClientResult<()> {
        self.ensure_fresh().await
    }

    /// Evaluate `f` against the current user and grants
    pub fn with_context<R>(&self, f: impl FnOnce(&AccessContext<'_>) -> R) -> R {
        let user = self.user.read();
        let cache = self.cache.read();
        f(&AccessContext::new(user.as_ref(), &cache.grants))
    }

    pub fn can_access_module(&self, module_id: ModuleId) -> bool {
        self.with_context(|ctx| ctx.can_access_module(module_id))
    }

    pub fn can_access_route(&self, route: &str) -> bool {
        self.with_context(|ctx| ctx.can_access_route(route))
    }

    pub fn can_access_page(&self, resource: Resource, action: Action) -> bool {
        self.with_context(|ctx| ctx.can_access_page(resource, action))
    }

    pub fn can_access_sidebar_item(&self, resource: Resource, action: Action) -> bool {
        self.with_context(|ctx| ctx.can_access_sidebar_item(resource, action))
    }

    /// Modules the user can currently reach, in registry order
    pub fn user_modules(&self) -> Vec<ModuleId> {
        self.with_context(|ctx| ctx.effective_modules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MemorySource;
    use shared::models::Role;

    fn staff() -> User {
        User::new("7", "flour", Role::Staff)
    }

    #[tokio::test]
    async fn test_no_user_denies_and_skips_fetch() {
        let access = RoleAccess::new(MemorySource::for_role(Role::Staff, &[ModuleId::Dashboard]));
        access.refresh().await.unwrap();

        assert_eq!(access.source().fetch_count(), 0);
        assert!(!access.can_access_module(ModuleId::Dashboard));
        assert!(!access.can_access_route("/dashboard"));
    }

    #[tokio::test]
    async fn test_refresh_loads_grants() {
        let access = RoleAccess::new(MemorySource::for_role(
            Role::Staff,
            &[ModuleId::Dashboard, ModuleId::HrManagement],
        ));
        access.set_user(Some(staff()));
        access.refresh().await.unwrap();

        assert!(access.can_access_route("/attendance"));
        assert!(access.can_access_page(Resource::LeaveRequests, Action::Create));
        assert!(!access.can_access_page(Resource::Salary, Action::Read));
        assert!(!access.can_access_route("/orders"));
        assert_eq!(
            access.user_modules(),
            vec![ModuleId::Dashboard, ModuleId::HrManagement]
        );
    }

    #[tokio::test]
    async fn test_initial_failure_fails_closed() {
        let source = MemorySource::for_role(Role::Staff, &[ModuleId::Dashboard]);
        source.set_failing(true);
        let access = RoleAccess::new(source);
        access.set_user(Some(staff()));

        assert!(access.refresh().await.is_err());
        assert!(access.grants().is_empty());
        assert!(!access.can_access_module(ModuleId::Dashboard));
        assert!(access.is_stale());
    }

    #[tokio::test]
    async fn test_later_failure_keeps_last_good_set() {
        let access = RoleAccess::with_ttl(
            MemorySource::for_role(Role::Staff, &[ModuleId::Dashboard]),
            Duration::ZERO,
        );
        access.set_user(Some(staff()));
        access.refresh().await.unwrap();

        access.source().set_failing(true);
        assert!(access.on_focus().await.is_err());
        assert!(access.can_access_module(ModuleId::Dashboard));
    }

    #[tokio::test]
    async fn test_fresh_cache_is_not_refetched() {
        let access = RoleAccess::with_ttl(
            MemorySource::for_role(Role::Staff, &[ModuleId::Dashboard]),
            Duration::from_secs(3600),
        );
        access.set_user(Some(staff()));
        access.ensure_fresh().await.unwrap();
        access.ensure_fresh().await.unwrap();
        access.on_focus().await.unwrap();

        assert_eq!(access.source().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_picks_up_admin_change() {
        let access = RoleAccess::with_ttl(
            MemorySource::for_role(Role::Staff, &[ModuleId::Dashboard]),
            Duration::ZERO,
        );
        access.set_user(Some(staff()));
        access.refresh().await.unwrap();
        assert!(!access.can_access_route("/orders"));

        access
            .source()
            .set(Role::Staff, &[ModuleId::Dashboard, ModuleId::OrderManagement]);
        access.on_focus().await.unwrap();
        assert!(access.can_access_route("/orders/42"));
    }

    #[tokio::test]
    async fn test_switching_user_drops_grants() {
        let access = RoleAccess::new(MemorySource::for_role(Role::Staff, &[ModuleId::Dashboard]));
        access.set_user(Some(staff()));
        access.refresh().await.unwrap();
        assert!(!access.grants().is_empty());

        access.set_user(Some(User::new("8", "rye", Role::Staff)));
        assert!(access.grants().is_empty());
        assert!(access.is_stale());
    }

    #[test]
    fn test_from_config_uses_cache_ttl() {
        let config = ClientConfig::new("http://localhost:3000")
            .with_module_cache_ttl(Duration::from_secs(5));
        let access = RoleAccess::from_config(&config).unwrap();
        assert_eq!(access.ttl, Duration::from_secs(5));
        assert!(access.is_stale());
    }

    #[tokio::test]
    async fn test_super_admin_needs_no_grants() {
        let source = MemorySource::default();
        source.set_failing(true);
        let access = RoleAccess::new(source);
        access.set_user(Some(User::new("1", "owner", Role::SuperAdmin)));

        assert!(access.refresh().await.is_err());
        assert!(access.can_access_page(Resource::SuperAdmin, Action::Delete));
        assert!(access.with_context(|ctx| ctx.can_manage_branches()));
    }
}
