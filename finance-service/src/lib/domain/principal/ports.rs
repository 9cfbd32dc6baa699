use async_trait::async_trait;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::AuthenticatedPrincipal;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Identity;
use crate::domain::principal::models::Password;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::UpdateProfileCommand;

/// Port for principal domain service operations.
#[async_trait]
pub trait PrincipalServicePort: Send + Sync + 'static {
    /// Register a new principal and issue its first token.
    ///
    /// # Arguments
    /// * `command` - Validated identifier, email, and password
    ///
    /// # Returns
    /// Created principal with an access token
    ///
    /// # Errors
    /// * `DuplicateIdentifier` - Identifier is already taken
    /// * `DuplicateEmail` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand)
        -> Result<AuthenticatedPrincipal, PrincipalError>;

    /// Check a credential and issue a token.
    ///
    /// # Arguments
    /// * `identifier` - Identifier as presented by the caller
    /// * `password` - Presented credential
    ///
    /// # Returns
    /// Principal with an access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier, wrong password, or disabled principal
    /// * `DatabaseError` - Database operation failed
    async fn login(
        &self,
        identifier: &str,
        password: &Password,
    ) -> Result<AuthenticatedPrincipal, PrincipalError>;

    /// Resolve a verified token subject to the current identity.
    ///
    /// The subject is the principal ID, never the identifier, so a token
    /// keeps pointing at the same principal across renames.
    ///
    /// # Errors
    /// * `NotFound` - Subject is not a principal ID, or no such principal
    /// * `Disabled` - Principal exists but is disabled
    /// * `DatabaseError` - Database operation failed
    async fn resolve(&self, subject: &str) -> Result<Identity, PrincipalError>;

    /// Retrieve principal by ID.
    ///
    /// # Errors
    /// * `NotFound` - No principal with this ID
    /// * `DatabaseError` - Database operation failed
    async fn get_principal(&self, id: &PrincipalId) -> Result<Principal, PrincipalError>;

    /// Update the profile of an existing principal.
    ///
    /// # Arguments
    /// * `id` - ID of the principal
    /// * `command` - Optional new identifier, email, and password
    ///
    /// # Errors
    /// * `NotFound` - No principal with this ID
    /// * `DuplicateIdentifier` - New identifier belongs to another principal
    /// * `DuplicateEmail` - New email belongs to another principal
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(
        &self,
        id: &PrincipalId,
        command: UpdateProfileCommand,
    ) -> Result<Principal, PrincipalError>;

    /// Retrieve all principals.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_principals(&self) -> Result<Vec<Principal>, PrincipalError>;

    /// Enable or disable a principal.
    ///
    /// A disabled principal can neither log in nor use tokens issued before
    /// it was disabled.
    ///
    /// # Errors
    /// * `NotFound` - No principal with this identifier
    /// * `DatabaseError` - Database operation failed
    async fn set_enabled(
        &self,
        identifier: &Identifier,
        enabled: bool,
    ) -> Result<Principal, PrincipalError>;
}

/// Credential store operations for the principal aggregate.
#[async_trait]
pub trait PrincipalRepository: Send + Sync + 'static {
    /// Persist a new principal.
    ///
    /// # Errors
    /// * `DuplicateIdentifier` - Identifier is already taken
    /// * `DuplicateEmail` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn save(&self, principal: Principal) -> Result<Principal, PrincipalError>;

    /// Retrieve principal by ID.
    ///
    /// # Returns
    /// Optional principal (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, PrincipalError>;

    /// Retrieve principal by identifier.
    ///
    /// # Returns
    /// Optional principal (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError>;

    /// Check whether an identifier is taken.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_identifier(&self, identifier: &Identifier) -> Result<bool, PrincipalError>;

    /// Check whether an email is registered.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, PrincipalError>;

    /// Retrieve all principals, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<Principal>, PrincipalError>;

    /// Update an existing principal, matched by its ID.
    ///
    /// # Errors
    /// * `NotFound` - Principal does not exist
    /// * `DuplicateIdentifier` - New identifier is already taken
    /// * `DuplicateEmail` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, principal: Principal) -> Result<Principal, PrincipalError>;
}
