use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::RoleSet;
use crate::domain::principal::ports::PrincipalRepository;

const PRINCIPAL_COLUMNS: &str =
    "id, identifier, email, password_hash, roles, enabled, created_at";

/// PostgreSQL implementation of PrincipalRepository.
///
/// Uniqueness of identifier and email is enforced by the table's
/// constraints; violations are reported as the matching duplicate error.
pub struct PostgresPrincipalRepository {
    pool: PgPool,
}

impl PostgresPrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    identifier: String,
    email: String,
    password_hash: String,
    roles: Vec<String>,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = PrincipalError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        Ok(Principal {
            id: PrincipalId(row.id),
            identifier: Identifier::new(row.identifier)?,
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            roles: RoleSet::from_names(&row.roles)?,
            enabled: row.enabled,
            created_at: row.created_at,
        })
    }
}

fn write_error(e: sqlx::Error, principal: &Principal) -> PrincipalError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("principals_identifier_key") => {
                    return PrincipalError::DuplicateIdentifier(
                        principal.identifier.as_str().to_string(),
                    );
                }
                Some("principals_email_key") => {
                    return PrincipalError::DuplicateEmail(principal.email.as_str().to_string());
                }
                _ => {}
            }
        }
    }
    PrincipalError::DatabaseError(e.to_string())
}

fn read_error(e: sqlx::Error) -> PrincipalError {
    PrincipalError::DatabaseError(e.to_string())
}

#[async_trait]
impl PrincipalRepository for PostgresPrincipalRepository {
    async fn save(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        sqlx::query(
            r#"
            INSERT INTO principals
                (id, identifier, email, password_hash, roles, enabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(principal.id.0)
        .bind(principal.identifier.as_str())
        .bind(principal.email.as_str())
        .bind(&principal.password_hash)
        .bind(principal.roles.names())
        .bind(principal.enabled)
        .bind(principal.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &principal))?;

        tracing::debug!(principal_id = %principal.id, "Principal row inserted");
        Ok(principal)
    }

    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, PrincipalError> {
        let query = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = $1");

        sqlx::query_as::<_, PrincipalRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)?
            .map(Principal::try_from)
            .transpose()
    }

    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError> {
        let query = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE identifier = $1");

        sqlx::query_as::<_, PrincipalRow>(&query)
            .bind(identifier.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)?
            .map(Principal::try_from)
            .transpose()
    }

    async fn exists_by_identifier(&self, identifier: &Identifier) -> Result<bool, PrincipalError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM principals WHERE identifier = $1)",
        )
        .bind(identifier.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(read_error)
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, PrincipalError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM principals WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn list_all(&self) -> Result<Vec<Principal>, PrincipalError> {
        let query = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals ORDER BY created_at DESC");

        sqlx::query_as::<_, PrincipalRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)?
            .into_iter()
            .map(Principal::try_from)
            .collect()
    }

    async fn update(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let result = sqlx::query(
            r#"
            UPDATE principals
            SET identifier = $2, email = $3, password_hash = $4, roles = $5, enabled = $6
            WHERE id = $1
            "#,
        )
        .bind(principal.id.0)
        .bind(principal.identifier.as_str())
        .bind(principal.email.as_str())
        .bind(&principal.password_hash)
        .bind(principal.roles.names())
        .bind(principal.enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &principal))?;

        if result.rows_affected() == 0 {
            return Err(PrincipalError::NotFound(principal.id.to_string()));
        }

        Ok(principal)
    }
}
