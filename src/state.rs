use std::fmt;
use std::sync::Arc;

use shiftdesk_config::{CorsConfig, IdentityConfig, ServerConfig};
use shiftdesk_core::{AppError, AuthorizationGuard, PermissionCatalog, Requirement};
use shiftdesk_db::{PgTenantStore, TenantStore, init_db_pool};

use crate::metrics::track_authorization_check;
use crate::middleware::identity::AuthUser;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TenantStore>,
    pub catalog: Arc<PermissionCatalog>,
    pub identity_config: IdentityConfig,
    pub cors_config: CorsConfig,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog)
            .field("identity_config", &self.identity_config)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        store: Arc<dyn TenantStore>,
        identity_config: IdentityConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            store,
            catalog: Arc::new(PermissionCatalog::standard()),
            identity_config,
            cors_config,
        }
    }

    pub fn guard(&self) -> AuthorizationGuard<'_> {
        AuthorizationGuard::new(&self.catalog)
    }

    /// Runs the guard for the calling user and records the outcome.
    pub fn authorize(&self, user: &AuthUser, requirement: Requirement) -> Result<(), AppError> {
        let result = self.guard().check(&user.profile, &requirement);
        track_authorization_check(requirement.kind(), result.is_ok());
        Ok(result?)
    }
}

pub async fn init_app_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let pool = init_db_pool(&config.database_url).await?;

    Ok(AppState::new(
        Arc::new(PgTenantStore::new(pool)),
        IdentityConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
