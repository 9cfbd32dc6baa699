use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::AuthenticationResult;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::AuthenticatedPrincipal;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Identity;
use crate::domain::principal::models::Password;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::RoleSet;
use crate::domain::principal::models::UpdateProfileCommand;
use crate::domain::principal::ports::PrincipalRepository;
use crate::domain::principal::ports::PrincipalServicePort;

/// Domain service for principal registration, login, and identity resolution.
///
/// Credential hashing runs on the blocking pool.
pub struct PrincipalService<PR>
where
    PR: PrincipalRepository,
{
    repository: Arc<PR>,
    authenticator: Arc<Authenticator>,
}

impl<PR> PrincipalService<PR>
where
    PR: PrincipalRepository,
{
    /// Create a new principal service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Shared hashing and token issuance
    pub fn new(repository: Arc<PR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: &Password) -> Result<String, PrincipalError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.clone();

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await
            .map_err(|e| PrincipalError::Unknown(format!("Hashing task failed: {}", e)))?
            .map_err(PrincipalError::from)
    }

    async fn check_credential(
        &self,
        password: &Password,
        principal: &Principal,
    ) -> Result<AuthenticationResult, PrincipalError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.clone();
        let stored_hash = principal.password_hash.clone();
        let subject = principal.id.to_string();
        let roles = principal.roles.names();

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.expose(), &stored_hash, &subject, roles, Utc::now())
        })
        .await
        .map_err(|e| PrincipalError::Unknown(format!("Verification task failed: {}", e)))?;

        result.map_err(|e| match e {
            AuthenticationError::InvalidCredentials => PrincipalError::InvalidCredentials,
            AuthenticationError::PasswordError(err) => PrincipalError::from(err),
            AuthenticationError::JwtError(err) => PrincipalError::from(err),
        })
    }

    async fn reject_unknown(&self, password: &Password) -> PrincipalError {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.clone();

        let _ = tokio::task::spawn_blocking(move || {
            authenticator.reject_unknown(password.expose());
        })
        .await;

        PrincipalError::InvalidCredentials
    }

    async fn find(&self, identifier: &Identifier) -> Result<Principal, PrincipalError> {
        self.repository
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| PrincipalError::NotFound(identifier.to_string()))
    }

    async fn find_by_id(&self, id: &PrincipalId) -> Result<Principal, PrincipalError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| PrincipalError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<PR> PrincipalServicePort for PrincipalService<PR>
where
    PR: PrincipalRepository,
{
    async fn register(
        &self,
        command: RegisterCommand,
    ) -> Result<AuthenticatedPrincipal, PrincipalError> {
        if self
            .repository
            .exists_by_identifier(&command.identifier)
            .await?
        {
            return Err(PrincipalError::DuplicateIdentifier(
                command.identifier.to_string(),
            ));
        }

        if self.repository.exists_by_email(&command.email).await? {
            return Err(PrincipalError::DuplicateEmail(command.email.to_string()));
        }

        let password_hash = self.hash_password(&command.password).await?;

        let principal = Principal {
            id: PrincipalId::new(),
            identifier: command.identifier,
            email: command.email,
            password_hash,
            roles: RoleSet::default_for_new(),
            enabled: true,
            created_at: Utc::now(),
        };

        let principal = self.repository.save(principal).await?;

        let token = self.authenticator.issue_token(
            &principal.id.to_string(),
            principal.roles.names(),
            Utc::now(),
        )?;

        tracing::info!(
            principal_id = %principal.id,
            identifier = %principal.identifier,
            "Principal registered"
        );

        Ok(AuthenticatedPrincipal {
            principal,
            access_token: token.access_token,
            expires_at: token.expires_at,
        })
    }

    async fn login(
        &self,
        identifier: &str,
        password: &Password,
    ) -> Result<AuthenticatedPrincipal, PrincipalError> {
        let Ok(identifier) = Identifier::new(identifier.to_string()) else {
            return Err(self.reject_unknown(password).await);
        };

        let Some(principal) = self.repository.find_by_identifier(&identifier).await? else {
            tracing::debug!(identifier = %identifier, "Login for unknown identifier");
            return Err(self.reject_unknown(password).await);
        };

        let token = self.check_credential(password, &principal).await?;

        if !principal.enabled {
            tracing::debug!(identifier = %identifier, "Login for disabled principal");
            return Err(PrincipalError::InvalidCredentials);
        }

        tracing::info!(identifier = %identifier, "Principal logged in");

        Ok(AuthenticatedPrincipal {
            principal,
            access_token: token.access_token,
            expires_at: token.expires_at,
        })
    }

    async fn resolve(&self, subject: &str) -> Result<Identity, PrincipalError> {
        let id = PrincipalId::from_string(subject)
            .map_err(|_| PrincipalError::NotFound(subject.to_string()))?;

        let principal = self.find_by_id(&id).await?;
        if !principal.enabled {
            return Err(PrincipalError::Disabled(principal.identifier.to_string()));
        }

        Ok(principal.identity())
    }

    async fn get_principal(&self, id: &PrincipalId) -> Result<Principal, PrincipalError> {
        self.find_by_id(id).await
    }

    async fn update_profile(
        &self,
        id: &PrincipalId,
        command: UpdateProfileCommand,
    ) -> Result<Principal, PrincipalError> {
        let mut principal = self.find_by_id(id).await?;

        if let Some(new_identifier) = command.identifier {
            if new_identifier != principal.identifier
                && self.repository.exists_by_identifier(&new_identifier).await?
            {
                return Err(PrincipalError::DuplicateIdentifier(
                    new_identifier.to_string(),
                ));
            }
            principal.identifier = new_identifier;
        }

        if let Some(new_email) = command.email {
            if new_email != principal.email && self.repository.exists_by_email(&new_email).await? {
                return Err(PrincipalError::DuplicateEmail(new_email.to_string()));
            }
            principal.email = new_email;
        }

        if let Some(new_password) = command.password {
            principal.password_hash = self.hash_password(&new_password).await?;
        }

        let principal = self.repository.update(principal).await?;

        tracing::info!(
            principal_id = %principal.id,
            identifier = %principal.identifier,
            "Principal profile updated"
        );

        Ok(principal)
    }

    async fn list_principals(&self) -> Result<Vec<Principal>, PrincipalError> {
        self.repository.list_all().await
    }

    async fn set_enabled(
        &self,
        identifier: &Identifier,
        enabled: bool,
    ) -> Result<Principal, PrincipalError> {
        let mut principal = self.find(identifier).await?;
        principal.enabled = enabled;

        let principal = self.repository.update(principal).await?;

        tracing::info!(
            identifier = %principal.identifier,
            enabled = principal.enabled,
            "Principal access changed"
        );

        Ok(principal)
    }
}
