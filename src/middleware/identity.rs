use std::str::FromStr;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use shiftdesk_config::IdentityConfig;
use shiftdesk_core::{AppError, DomainError, PermissionSet, Role, Subject};
use shiftdesk_models::ids::{BusinessId, UserId};
use shiftdesk_models::profiles::UserProfile;
use tracing::debug;

use crate::state::AppState;

/// Identity asserted by the gateway, not yet checked against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub business_id: BusinessId,
}

impl Principal {
    pub fn from_headers(headers: &HeaderMap, config: &IdentityConfig) -> Result<Self, DomainError> {
        Ok(Self {
            user_id: header_id(headers, &config.user_header)?,
            business_id: header_id(headers, &config.business_header)?,
        })
    }
}

fn header_id<T: FromStr>(headers: &HeaderMap, name: &str) -> Result<T, DomainError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| {
            debug!(header = %name, "missing or malformed identity header");
            DomainError::Unauthenticated
        })
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Principal::from_headers(
            &parts.headers,
            &state.identity_config,
        )?)
    }
}

/// The calling user with their stored profile.
///
/// Extraction fails with `Unauthenticated` when the profile does not exist
/// and with `TenantMismatch` when it belongs to a different business than the
/// one the gateway asserted. Deactivated users are still extracted; every
/// guard check denies them.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: Principal,
    pub profile: UserProfile,
}

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.profile.id
    }

    pub fn business_id(&self) -> BusinessId {
        self.profile.business_id
    }
}

impl Subject for AuthUser {
    fn role(&self) -> Role {
        self.profile.role
    }

    fn is_active(&self) -> bool {
        self.profile.is_active
    }

    fn custom_permissions(&self) -> &PermissionSet {
        &self.profile.custom_permissions
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;

        let profile = state
            .store
            .find_profile(principal.user_id)
            .await?
            .ok_or(DomainError::Unauthenticated)?;

        if profile.business_id != principal.business_id {
            return Err(DomainError::TenantMismatch.into());
        }

        Ok(AuthUser { principal, profile })
    }
}
