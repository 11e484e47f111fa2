use crate::auth::repo_types::{Role, User};
use crate::error::{is_unique_violation, AppError, AppResult};
use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, company_id, username, email, password_hash, full_name, role, \
                            employment_type, shift_type, is_active, created_at, updated_at";

/// Tenant a new user joins.
#[derive(Debug, Clone)]
pub enum CompanyChoice {
    Create(String),
    Existing(Uuid),
}

/// Validated registration data with an already hashed password.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

impl User {
    /// Find an active user by username.
    pub async fn find_active_by_username(
        db: &PgPool,
        username: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_active = true"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    /// Find an active user by id.
    pub async fn find_active_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active = true"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    /// Create a user, and its company when asked to, in one transaction.
    pub async fn register(
        db: &PgPool,
        company: CompanyChoice,
        new: NewUser<'_>,
    ) -> AppResult<User> {
        let mut tx = db.begin().await?;

        let company_id = match company {
            CompanyChoice::Create(name) => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    INSERT INTO companies (name)
                    VALUES ($1)
                    RETURNING id
                    "#,
                )
                .bind(name)
                .fetch_one(&mut *tx)
                .await?
            }
            CompanyChoice::Existing(id) => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1)",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
                if !exists {
                    return Err(AppError::validation("Unknown company"));
                }
                id
            }
        };

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (company_id, username, email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(company_id)
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.full_name)
        .bind(new.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("Username or email already exists")
            } else {
                AppError::from(e)
            }
        })?;

        tx.commit().await?;
        Ok(user)
    }
}
