//! Route access decisions.
//!
//! Maps a route's declared sensitivity and the request's identity, if any,
//! to allow or deny. Evaluated on every request; nothing is cached.

use thiserror::Error;

use crate::domain::principal::models::Identity;
use crate::domain::principal::models::Role;

/// What a route requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSensitivity {
    /// Anyone, including anonymous callers
    Public,
    /// Any resolved identity
    Authenticated,
    /// A resolved identity holding the given role
    RoleGated(Role),
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient permissions")]
    Forbidden,
}

/// Decide whether a caller may reach a route.
///
/// # Errors
/// * `Unauthenticated` - Route needs an identity and there is none
/// * `Forbidden` - Identity lacks the required role
pub fn decide(
    sensitivity: RouteSensitivity,
    identity: Option<&Identity>,
) -> Result<(), AccessDenied> {
    match (sensitivity, identity) {
        (RouteSensitivity::Public, _) => Ok(()),
        (_, None) => Err(AccessDenied::Unauthenticated),
        (RouteSensitivity::Authenticated, Some(_)) => Ok(()),
        (RouteSensitivity::RoleGated(role), Some(identity)) if identity.has_role(role) => Ok(()),
        (RouteSensitivity::RoleGated(_), Some(_)) => Err(AccessDenied::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::principal::models::EmailAddress;
    use crate::domain::principal::models::Identifier;
    use crate::domain::principal::models::Principal;
    use crate::domain::principal::models::PrincipalId;
    use crate::domain::principal::models::RoleSet;

    fn identity(roles: &[Role]) -> Identity {
        Principal {
            id: PrincipalId::new(),
            identifier: Identifier::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("alice@x.com".to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            roles: RoleSet::new(roles.iter().copied()).unwrap(),
            enabled: true,
            created_at: Utc::now(),
        }
        .identity()
    }

    #[test]
    fn test_public_always_allowed() {
        assert_eq!(decide(RouteSensitivity::Public, None), Ok(()));
        assert_eq!(
            decide(RouteSensitivity::Public, Some(&identity(&[Role::Standard]))),
            Ok(())
        );
    }

    #[test]
    fn test_authenticated_requires_identity() {
        assert_eq!(
            decide(RouteSensitivity::Authenticated, None),
            Err(AccessDenied::Unauthenticated)
        );
        assert_eq!(
            decide(
                RouteSensitivity::Authenticated,
                Some(&identity(&[Role::Standard]))
            ),
            Ok(())
        );
    }

    #[test]
    fn test_role_gated() {
        let admin_route = RouteSensitivity::RoleGated(Role::Administrator);

        assert_eq!(
            decide(admin_route, None),
            Err(AccessDenied::Unauthenticated)
        );
        assert_eq!(
            decide(admin_route, Some(&identity(&[Role::Standard]))),
            Err(AccessDenied::Forbidden)
        );
        assert_eq!(
            decide(
                admin_route,
                Some(&identity(&[Role::Standard, Role::Administrator]))
            ),
            Ok(())
        );
    }
}
