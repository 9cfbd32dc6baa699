use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::ports::PrincipalRepository;

/// Process-local PrincipalRepository.
///
/// Holds the same uniqueness rules as the PostgreSQL table.
#[derive(Default)]
pub struct InMemoryPrincipalRepository {
    principals: RwLock<HashMap<PrincipalId, Principal>>,
}

impl InMemoryPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Checks `candidate` against every stored principal other than itself.
fn check_unique(
    principals: &HashMap<PrincipalId, Principal>,
    candidate: &Principal,
) -> Result<(), PrincipalError> {
    let others = principals.values().filter(|p| p.id != candidate.id);

    for other in others {
        if other.identifier == candidate.identifier {
            return Err(PrincipalError::DuplicateIdentifier(
                candidate.identifier.as_str().to_string(),
            ));
        }
        if other.email == candidate.email {
            return Err(PrincipalError::DuplicateEmail(
                candidate.email.as_str().to_string(),
            ));
        }
    }

    Ok(())
}

#[async_trait]
impl PrincipalRepository for InMemoryPrincipalRepository {
    async fn save(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let mut principals = self.principals.write().await;

        if principals.contains_key(&principal.id) {
            return Err(PrincipalError::DatabaseError(format!(
                "Principal {} already stored",
                principal.id
            )));
        }
        check_unique(&principals, &principal)?;

        principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, PrincipalError> {
        let principals = self.principals.read().await;
        Ok(principals.get(id).cloned())
    }

    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError> {
        let principals = self.principals.read().await;

        Ok(principals
            .values()
            .find(|p| &p.identifier == identifier)
            .cloned())
    }

    async fn exists_by_identifier(&self, identifier: &Identifier) -> Result<bool, PrincipalError> {
        let principals = self.principals.read().await;
        Ok(principals.values().any(|p| &p.identifier == identifier))
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, PrincipalError> {
        let principals = self.principals.read().await;
        Ok(principals.values().any(|p| &p.email == email))
    }

    async fn list_all(&self) -> Result<Vec<Principal>, PrincipalError> {
        let principals = self.principals.read().await;

        let mut all: Vec<Principal> = principals.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let mut principals = self.principals.write().await;

        if !principals.contains_key(&principal.id) {
            return Err(PrincipalError::NotFound(principal.id.to_string()));
        }
        check_unique(&principals, &principal)?;

        principals.insert(principal.id, principal.clone());
        Ok(principal)
    }
}
