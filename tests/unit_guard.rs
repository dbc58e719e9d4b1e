use shiftdesk::shiftdesk_core::{
    AuthorizationGuard, DenialReason, DomainError, Permission, PermissionCatalog, PermissionSet,
    Role,
};
use shiftdesk::shiftdesk_models::ids::{BusinessId, UserId};
use shiftdesk::shiftdesk_models::profiles::UserProfile;

fn profile(role: Role, custom: &[Permission], is_active: bool) -> UserProfile {
    UserProfile {
        id: UserId::from_u128(1),
        business_id: BusinessId::from_u128(1),
        full_name: None,
        email: None,
        role,
        custom_permissions: custom.iter().copied().collect::<PermissionSet>(),
        is_active,
    }
}

#[test]
fn test_admin_custom_list_is_never_consulted() {
    let catalog = PermissionCatalog::standard();
    let admin = profile(Role::Admin, &[Permission::ViewDashboard], true);

    assert_eq!(catalog.resolve(&admin), *catalog.all());
    assert!(
        AuthorizationGuard::new(&catalog)
            .require_permission(&admin, Permission::EditBusiness)
            .is_ok()
    );
}

#[test]
fn test_custom_grants_only_add() {
    let catalog = PermissionCatalog::standard();
    let employee = profile(Role::Employee, &[Permission::EditSchedule], true);
    let resolved = catalog.resolve(&employee);

    assert!(resolved.contains(&Permission::EditSchedule));
    assert!(resolved.is_superset(catalog.role_defaults(Role::Employee)));
    assert_eq!(
        resolved.len(),
        catalog.role_defaults(Role::Employee).len() + 1
    );
}

#[test]
fn test_deactivated_user_resolves_but_is_denied() {
    let catalog = PermissionCatalog::standard();
    let guard = AuthorizationGuard::new(&catalog);
    let employee = profile(Role::Employee, &[], false);

    assert!(catalog.resolve(&employee).contains(&Permission::ViewSchedule));

    let err = guard
        .require_permission(&employee, Permission::ViewSchedule)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::PermissionDenied {
            reason: DenialReason::Inactive,
            ..
        }
    ));
}

#[test]
fn test_schedule_endpoints_requirements() {
    let catalog = PermissionCatalog::standard();
    let guard = AuthorizationGuard::new(&catalog);
    let employee = profile(Role::Employee, &[], true);
    let scheduler = profile(Role::Employee, &[Permission::GenerateSchedule], true);

    let edit_or_generate = [Permission::EditSchedule, Permission::GenerateSchedule];
    assert!(
        guard
            .require_any_permission(&employee, &edit_or_generate)
            .is_err()
    );
    assert!(
        guard
            .require_any_permission(&scheduler, &edit_or_generate)
            .is_ok()
    );

    let overview = [Permission::ViewSchedule, Permission::ViewEmployees];
    assert!(guard.require_all_permissions(&employee, &overview).is_err());
    assert!(guard.require_admin(&employee).is_err());
}
