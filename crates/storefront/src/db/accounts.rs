//! Customer account repository.

use sqlx::{FromRow, PgPool};

use tidewater_core::AccountId;

use super::RepositoryError;
use crate::models::CurrentCustomer;

#[derive(Debug, FromRow)]
struct AccountRow {
    id: AccountId,
    email: String,
    fullname: Option<String>,
}

impl From<AccountRow> for CurrentCustomer {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            fullname: row.fullname,
        }
    }
}

#[derive(Debug, FromRow)]
struct AccountWithHashRow {
    id: AccountId,
    email: String,
    fullname: Option<String>,
    password_hash: Option<String>,
}

/// Repository for customer accounts.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AccountId) -> Result<Option<CurrentCustomer>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, email, fullname FROM account WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CurrentCustomer::from))
    }

    /// Get an account and its password hash by email (case-insensitive).
    ///
    /// Accounts without a password cannot log in and are reported as absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &str,
    ) -> Result<Option<(CurrentCustomer, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithHashRow>(
            r"
            SELECT id, email, fullname, password_hash
            FROM account
            WHERE lower(email) = lower($1)
            ",
        )
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.and_then(|r| {
            let hash = r.password_hash?;
            Some((
                CurrentCustomer {
                    id: r.id,
                    email: r.email,
                    fullname: r.fullname,
                },
                hash,
            ))
        }))
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &str,
        fullname: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<CurrentCustomer, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO account (email, fullname, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, fullname
            ",
        )
        .bind(email.trim())
        .bind(fullname)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }
}
