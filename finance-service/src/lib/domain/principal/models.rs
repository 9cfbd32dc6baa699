use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::principal::errors::CredentialError;
use crate::domain::principal::errors::EmailError;
use crate::domain::principal::errors::IdentifierError;
use crate::domain::principal::errors::PrincipalIdError;
use crate::domain::principal::errors::RoleError;

/// Principal aggregate entity.
///
/// An account capable of authenticating. `id` never changes; `identifier`,
/// `email`, and the credential hash may be changed through a profile update.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: PrincipalId,
    pub identifier: Identifier,
    pub email: EmailAddress,
    pub password_hash: String,
    pub roles: RoleSet,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    /// The request identity this principal authenticates as.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            identifier: self.identifier.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// Principal storage key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Generate a new random principal ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a principal ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, PrincipalIdError> {
        Uuid::parse_str(s)
            .map(PrincipalId)
            .map_err(|e| PrincipalIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Principal identifier (username).
///
/// Ensures the identifier is 3-50 characters and contains only alphanumeric,
/// underscore, and hyphen. This is the token subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid identifier.
    ///
    /// # Errors
    /// * `TooShort` - Shorter than 3 characters
    /// * `TooLong` - Longer than 50 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(identifier: String) -> Result<Self, IdentifierError> {
        let identifier = Self::with_valid_length(identifier)?;
        let identifier = Self::with_valid_chars(identifier)?;
        Ok(Self(identifier))
    }

    fn with_valid_length(identifier: String) -> Result<String, IdentifierError> {
        let length = identifier.chars().count();
        if length < Self::MIN_LENGTH {
            Err(IdentifierError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(IdentifierError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(identifier)
        }
    }

    fn with_valid_chars(identifier: String) -> Result<String, IdentifierError> {
        if identifier
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(identifier)
        } else {
            Err(IdentifierError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 100;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    /// * `TooLong` - Longer than 100 characters
    pub fn new(email: String) -> Result<Self, EmailError> {
        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext credential as presented by a caller.
///
/// Only lives long enough to be hashed or checked. `Debug` is redacted so
/// the value cannot reach a log line through `{:?}`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;

    /// Create a password that satisfies the registration policy.
    ///
    /// # Errors
    /// * `TooShort` - Shorter than 6 characters
    pub fn new(password: String) -> Result<Self, CredentialError> {
        if password.chars().count() < Self::MIN_LENGTH {
            return Err(CredentialError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(password))
    }

    /// Wrap a presented credential without applying the policy.
    ///
    /// Login must check whatever was sent, even if it could never have been
    /// registered.
    pub fn presented(password: String) -> Self {
        Self(password)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Coarse access role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Standard user role with basic permissions
    Standard,
    /// Administrator role with elevated permissions
    Administrator,
}

impl Role {
    /// Wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "USER",
            Role::Administrator => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::Standard),
            "ADMIN" => Ok(Role::Administrator),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-empty set of roles held by a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Build a role set, refusing an empty one.
    ///
    /// # Errors
    /// * `Empty` - No roles given
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Result<Self, RoleError> {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(RoleError::Empty);
        }
        Ok(Self(roles))
    }

    /// Parse stored role names.
    ///
    /// # Errors
    /// * `Unknown` - A name is not a known role
    /// * `Empty` - No names given
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, RoleError> {
        let roles = names
            .iter()
            .map(|name| name.as_ref().parse::<Role>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(roles)
    }

    /// Role assigned to every newly registered principal.
    pub fn default_for_new() -> Self {
        Self(BTreeSet::from([Role::Standard]))
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|role| role.as_str().to_string()).collect()
    }
}

/// Authenticated identity for the duration of one request.
///
/// Handlers can read it but have no way to construct or alter one; only a
/// resolved principal produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: PrincipalId,
    identifier: Identifier,
    roles: RoleSet,
}

impl Identity {
    pub fn id(&self) -> PrincipalId {
        self.id
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}

/// Command to register a new principal with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub identifier: Identifier,
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterCommand {
    pub fn new(identifier: Identifier, email: EmailAddress, password: Password) -> Self {
        Self {
            identifier,
            email,
            password,
        }
    }
}

/// Command to update the caller's own profile.
///
/// All fields are optional to support partial updates.
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateProfileCommand {
    pub identifier: Option<Identifier>,
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
}

/// Principal together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub principal: Principal,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(Identifier::new("alice".to_string()).is_ok());
        assert!(Identifier::new("alice_smith-2".to_string()).is_ok());
        assert_eq!(
            Identifier::new("al".to_string()),
            Err(IdentifierError::TooShort { min: 3, actual: 2 })
        );
        assert_eq!(
            Identifier::new("a".repeat(51)),
            Err(IdentifierError::TooLong {
                max: 50,
                actual: 51
            })
        );
        assert_eq!(
            Identifier::new("alice smith".to_string()),
            Err(IdentifierError::InvalidCharacters)
        );
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("alice@x.com".to_string()).is_ok());
        assert!(matches!(
            EmailAddress::new("not-an-email".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
        let long = format!("{}@example.com", "a".repeat(95));
        assert!(matches!(
            EmailAddress::new(long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_password_policy_and_redaction() {
        assert!(Password::new("secret1".to_string()).is_ok());
        assert_eq!(
            Password::new("abc".to_string()),
            Err(CredentialError::TooShort { min: 6 })
        );

        let password = Password::presented("abc".to_string());
        assert_eq!(password.expose(), "abc");
        assert_eq!(format!("{:?}", password), "Password(***)");
    }

    #[test]
    fn test_role_names_round_trip() {
        for role in [Role::Standard, Role::Administrator] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!(
            "ROOT".parse::<Role>(),
            Err(RoleError::Unknown("ROOT".to_string()))
        );
    }

    #[test]
    fn test_role_set_is_never_empty() {
        assert_eq!(RoleSet::new(Vec::new()), Err(RoleError::Empty));
        assert_eq!(RoleSet::from_names::<&str>(&[]), Err(RoleError::Empty));

        let defaults = RoleSet::default_for_new();
        assert!(defaults.contains(Role::Standard));
        assert!(!defaults.contains(Role::Administrator));
        assert_eq!(defaults.names(), vec!["USER".to_string()]);
    }

    #[test]
    fn test_role_set_from_names() {
        let roles = RoleSet::from_names(&["ADMIN", "USER", "USER"]).unwrap();
        assert_eq!(roles.names(), vec!["USER".to_string(), "ADMIN".to_string()]);
    }

    #[test]
    fn test_identity_from_principal() {
        let principal = Principal {
            id: PrincipalId::new(),
            identifier: Identifier::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("alice@x.com".to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            roles: RoleSet::new([Role::Standard, Role::Administrator]).unwrap(),
            enabled: true,
            created_at: Utc::now(),
        };

        let identity = principal.identity();
        assert_eq!(identity.id(), principal.id);
        assert_eq!(identity.identifier().as_str(), "alice");
        assert!(identity.has_role(Role::Administrator));
    }

    #[test]
    fn test_principal_id_from_string() {
        let id = PrincipalId::new();

        assert_eq!(PrincipalId::from_string(&id.to_string()), Ok(id));
        assert!(matches!(
            PrincipalId::from_string("alice"),
            Err(PrincipalIdError::InvalidFormat(_))
        ));
    }
}
