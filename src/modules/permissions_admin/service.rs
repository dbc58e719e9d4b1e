use shiftdesk_core::{AdminAction, AppError, DomainError, PermissionCatalog};
use shiftdesk_db::TenantStore;
use shiftdesk_models::audit::AuditEntry;
use shiftdesk_models::ids::{BusinessId, UserId};
use shiftdesk_models::profiles::{ProfileMutation, UserPermissionsResponse, UserProfile};
use tracing::{info, instrument};

use crate::metrics::track_admin_mutation;

pub struct PermissionsAdminService;

impl PermissionsAdminService {
    /// Rules that hold no matter what the actor is allowed to do.
    pub fn check_self_modification(
        actor: &UserProfile,
        target: &UserProfile,
        action: AdminAction,
    ) -> Result<(), DomainError> {
        if actor.id == target.id && action.forbidden_on_self(target.role) {
            return Err(DomainError::SelfModificationForbidden { action });
        }
        Ok(())
    }

    /// Loads a profile and checks it belongs to `business_id`.
    #[instrument(skip(store))]
    pub async fn load_target(
        store: &dyn TenantStore,
        business_id: BusinessId,
        user_id: UserId,
    ) -> Result<UserProfile, AppError> {
        let profile = store
            .find_profile(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user_profile", user_id))?;

        if profile.business_id != business_id {
            return Err(DomainError::TenantMismatch.into());
        }

        Ok(profile)
    }

    #[instrument(skip(store, catalog))]
    pub async fn list_users(
        store: &dyn TenantStore,
        catalog: &PermissionCatalog,
        business_id: BusinessId,
    ) -> Result<Vec<UserPermissionsResponse>, AppError> {
        let profiles = store.list_profiles(business_id).await?;

        Ok(profiles
            .iter()
            .map(|p| UserPermissionsResponse::from_profile(p, catalog))
            .collect())
    }

    #[instrument(skip(store, catalog))]
    pub async fn get_user(
        store: &dyn TenantStore,
        catalog: &PermissionCatalog,
        business_id: BusinessId,
        user_id: UserId,
    ) -> Result<UserPermissionsResponse, AppError> {
        let profile = Self::load_target(store, business_id, user_id).await?;
        Ok(UserPermissionsResponse::from_profile(&profile, catalog))
    }

    /// Target lookup, tenant check, self-protection, then the audited write.
    /// The caller has already passed the authorization guard. The store
    /// repeats the self-protection check against the locked row.
    #[instrument(skip(store, actor), fields(actor_id = %actor.id))]
    pub async fn apply_mutation(
        store: &dyn TenantStore,
        actor: &UserProfile,
        target_id: UserId,
        mutation: ProfileMutation,
    ) -> Result<(UserProfile, AuditEntry), AppError> {
        let action = mutation.action();
        let target = Self::load_target(store, actor.business_id, target_id).await?;

        Self::check_self_modification(actor, &target, action)?;

        let (updated, entry) = store
            .apply_profile_mutation(actor.business_id, actor.id, target_id, &mutation)
            .await?;

        track_admin_mutation(action);
        info!(
            action = %action,
            target_id = %target_id,
            audit_id = %entry.id,
            "Profile updated"
        );

        Ok((updated, entry))
    }

    #[instrument(skip(store))]
    pub async fn list_audit(
        store: &dyn TenantStore,
        business_id: BusinessId,
        target_id: Option<UserId>,
    ) -> Result<Vec<AuditEntry>, AppError> {
        store.list_audit_entries(business_id, target_id).await
    }
}
