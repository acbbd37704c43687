//! Role-Module Grant Repository
//!
//! Every assignable module has one row per role once the role has been seeded
//! or saved, with `granted` telling whether the role holds it. A role with no
//! rows at all has never been configured and is eligible for seeding.

use std::collections::BTreeSet;

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::access::default_modules;
use shared::models::{ModuleId, Role, RoleModuleGrant};
use shared::registry::ModuleRegistry;
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, sqlx::FromRow)]
struct RoleModuleRow {
    role: String,
    module_id: String,
    granted: bool,
}

impl TryFrom<RoleModuleRow> for RoleModuleGrant {
    type Error = RepoError;

    fn try_from(row: RoleModuleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: row
                .role
                .parse()
                .map_err(|e| RepoError::Corrupt(format!("{e}")))?,
            module_id: row
                .module_id
                .parse()
                .map_err(|e| RepoError::Corrupt(format!("{e}")))?,
            granted: row.granted,
        })
    }
}

/// Convert rows and order them by role, then registry order
fn into_grants(rows: Vec<RoleModuleRow>) -> RepoResult<Vec<RoleModuleGrant>> {
    let mut grants = rows
        .into_iter()
        .map(RoleModuleGrant::try_from)
        .collect::<RepoResult<Vec<_>>>()?;
    grants.sort_by_key(|g| (g.role, g.module_id));
    Ok(grants)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<RoleModuleGrant>> {
    let rows = sqlx::query_as::<_, RoleModuleRow>(
        "SELECT role, module_id, granted FROM role_module",
    )
    .fetch_all(pool)
    .await?;
    into_grants(rows)
}

pub async fn find_by_role(pool: &SqlitePool, role: Role) -> RepoResult<Vec<RoleModuleGrant>> {
    let rows = sqlx::query_as::<_, RoleModuleRow>(
        "SELECT role, module_id, granted FROM role_module WHERE role = ?",
    )
    .bind(role.as_str())
    .fetch_all(pool)
    .await?;
    into_grants(rows)
}

/// Module ids currently granted to `role`, in registry order
pub async fn granted_module_ids(pool: &SqlitePool, role: Role) -> RepoResult<Vec<ModuleId>> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT module_id FROM role_module WHERE role = ? AND granted = 1",
    )
    .bind(role.as_str())
    .fetch_all(pool)
    .await?;

    let mut ids = ids
        .iter()
        .map(|id| id.parse().map_err(|e| RepoError::Corrupt(format!("{e}"))))
        .collect::<RepoResult<Vec<ModuleId>>>()?;
    ids.sort();
    Ok(ids)
}

async fn write_role(
    conn: &mut SqliteConnection,
    role: Role,
    granted: &BTreeSet<ModuleId>,
) -> RepoResult<()> {
    let now = chrono::Utc::now().timestamp_millis();

    sqlx::query("DELETE FROM role_module WHERE role = ?")
        .bind(role.as_str())
        .execute(&mut *conn)
        .await?;

    for module in ModuleRegistry::system().modules() {
        if !module.is_assignable_to(role) {
            continue;
        }
        sqlx::query(
            "INSERT INTO role_module (role, module_id, granted, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(role.as_str())
        .bind(module.id.as_str())
        .bind(granted.contains(&module.id))
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Replace every grant of `role` with `module_ids` in one transaction
///
/// Duplicates collapse; saving the same set twice leaves the same state.
/// Returns the granted ids in sorted order.
pub async fn replace_for_role(
    pool: &SqlitePool,
    role: Role,
    module_ids: &[ModuleId],
) -> RepoResult<Vec<ModuleId>> {
    if role.is_super_admin() {
        return Err(RepoError::Business(
            ErrorCode::RoleNotEditable,
            "Super admin access is not stored and cannot be edited".into(),
        ));
    }

    let registry = ModuleRegistry::system();
    let granted: BTreeSet<ModuleId> = module_ids.iter().copied().collect();
    if let Some(id) = granted
        .iter()
        .find(|id| registry.get(**id).is_some_and(|m| !m.is_assignable_to(role)))
    {
        return Err(RepoError::Business(
            ErrorCode::ModuleRequiresSuperAdmin,
            format!("Module {id} can only be held by super admin"),
        ));
    }

    let mut tx = pool.begin().await?;
    write_role(&mut tx, role, &granted).await?;
    tx.commit().await?;

    tracing::info!(role = %role, modules = granted.len(), "Role modules replaced");
    Ok(granted.into_iter().collect())
}

/// Give every assignable role without rows its default modules
///
/// Returns the roles that were seeded.
pub async fn seed_defaults(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let mut tx = pool.begin().await?;
    let mut seeded = Vec::new();

    for role in Role::ASSIGNABLE {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_module WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            continue;
        }
        let defaults: BTreeSet<ModuleId> = default_modules(role).iter().copied().collect();
        write_role(&mut tx, role, &defaults).await?;
        seeded.push(role);
    }

    tx.commit().await?;

    if !seeded.is_empty() {
        tracing::info!(roles = ?seeded, "Seeded default role modules");
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    #[tokio::test]
    async fn test_replace_then_read_back() {
        let pool = pool().await;
        let saved = replace_for_role(
            &pool,
            Role::Staff,
            &[ModuleId::OrderManagement, ModuleId::Dashboard],
        )
        .await
        .unwrap();
        assert_eq!(saved, vec![ModuleId::Dashboard, ModuleId::OrderManagement]);

        let ids = granted_module_ids(&pool, Role::Staff).await.unwrap();
        assert_eq!(ids, vec![ModuleId::Dashboard, ModuleId::OrderManagement]);

        // Other roles are untouched
        assert!(find_by_role(&pool, Role::Manager).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rows_cover_every_assignable_module() {
        let pool = pool().await;
        replace_for_role(&pool, Role::Marketer, &[ModuleId::MarketingManagement])
            .await
            .unwrap();

        let rows = find_by_role(&pool, Role::Marketer).await.unwrap();
        assert_eq!(rows.len(), ModuleId::ALL.len() - 1);
        assert!(rows.iter().all(|g| g.module_id != ModuleId::SuperAdminConsole));
        assert_eq!(rows.iter().filter(|g| g.granted).count(), 1);
    }

    #[tokio::test]
    async fn test_replace_is_idempotent_and_dedupes() {
        let pool = pool().await;
        let set = [
            ModuleId::HrManagement,
            ModuleId::Dashboard,
            ModuleId::HrManagement,
        ];
        replace_for_role(&pool, Role::Supervisor, &set).await.unwrap();
        let first = find_by_role(&pool, Role::Supervisor).await.unwrap();
        replace_for_role(&pool, Role::Supervisor, &set).await.unwrap();
        let second = find_by_role(&pool, Role::Supervisor).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            granted_module_ids(&pool, Role::Supervisor).await.unwrap(),
            vec![ModuleId::Dashboard, ModuleId::HrManagement]
        );
    }

    #[tokio::test]
    async fn test_replace_with_empty_set_revokes_everything() {
        let pool = pool().await;
        replace_for_role(&pool, Role::Staff, &[ModuleId::Dashboard])
            .await
            .unwrap();
        replace_for_role(&pool, Role::Staff, &[]).await.unwrap();

        assert!(granted_module_ids(&pool, Role::Staff).await.unwrap().is_empty());
        // An emptied role keeps its rows and is not re-seeded
        let seeded = seed_defaults(&pool).await.unwrap();
        assert!(!seeded.contains(&Role::Staff));
        assert!(granted_module_ids(&pool, Role::Staff).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_super_admin_cannot_be_stored() {
        let pool = pool().await;
        let err = replace_for_role(&pool, Role::SuperAdmin, &[ModuleId::Dashboard])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::RoleNotEditable, _)
        ));
    }

    #[tokio::test]
    async fn test_super_admin_module_rejected_for_other_roles() {
        let pool = pool().await;
        let err = replace_for_role(&pool, Role::Admin, &[ModuleId::SuperAdminConsole])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::ModuleRequiresSuperAdmin, _)
        ));
        assert!(find_by_role(&pool, Role::Admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_defaults_only_fills_empty_roles() {
        let pool = pool().await;
        replace_for_role(&pool, Role::Manager, &[ModuleId::Dashboard])
            .await
            .unwrap();

        let seeded = seed_defaults(&pool).await.unwrap();
        assert!(!seeded.contains(&Role::Manager));
        assert_eq!(seeded.len(), Role::ASSIGNABLE.len() - 1);

        assert_eq!(
            granted_module_ids(&pool, Role::Manager).await.unwrap(),
            vec![ModuleId::Dashboard]
        );
        let staff = granted_module_ids(&pool, Role::Staff).await.unwrap();
        let mut expected = default_modules(Role::Staff).to_vec();
        expected.sort();
        assert_eq!(staff, expected);

        assert!(seed_defaults(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_all_spans_roles() {
        let pool = pool().await;
        seed_defaults(&pool).await.unwrap();
        let all = find_all(&pool).await.unwrap();
        assert_eq!(all.len(), Role::ASSIGNABLE.len() * (ModuleId::ALL.len() - 1));
        assert!(all.iter().all(|g| g.role != Role::SuperAdmin));
        assert!(
            all.windows(2)
                .all(|w| (w[0].role, w[0].module_id) < (w[1].role, w[1].module_id))
        );
    }

    #[tokio::test]
    async fn test_grants_follow_registry_order() {
        let pool = pool().await;
        replace_for_role(&pool, Role::Staff, &[ModuleId::Dashboard])
            .await
            .unwrap();

        let ids: Vec<ModuleId> = find_by_role(&pool, Role::Staff)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.module_id)
            .collect();
        let expected: Vec<ModuleId> = ModuleId::ALL
            .into_iter()
            .filter(|id| *id != ModuleId::SuperAdminConsole)
            .collect();
        assert_eq!(ids, expected);
    }
}
