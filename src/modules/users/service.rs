use anyhow::Context as _;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sales_auth::Claims;
use sales_core::{StoreError, hash_password_with_cost, verify_password};
use sales_models::{NewUser, User};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Persistence and credential checks for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Checks credentials and returns claims valid from `now` for `ttl`.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Claims, StoreError>;

    async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<User, StoreError>;
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    db: PgPool,
    hash_cost: u32,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self::with_cost(db, bcrypt::DEFAULT_COST)
    }

    pub fn with_cost(db: PgPool, hash_cost: u32) -> Self {
        Self { db, hash_cost }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, password))]
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Claims, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, roles, password_hash, date_created, date_updated
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("selecting single user")?
        .ok_or(StoreError::AuthenticationFailure)?;

        let matches = verify_password(password, &user.password_hash)
            .map_err(|e| anyhow::anyhow!("verifying password: {}", e))?;
        if !matches {
            return Err(StoreError::AuthenticationFailure);
        }

        let claims = Claims::new(user.id.to_string(), user.roles, now, ttl)
            .context("building claims")?;
        Ok(claims)
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<User, StoreError> {
        let password_hash = hash_password_with_cost(&new_user.password, self.hash_cost)
            .map_err(|e| anyhow::anyhow!("generating password hash: {}", e))?;

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            roles: new_user.roles,
            password_hash,
            date_created: now,
            date_updated: now,
        };

        sqlx::query(
            r#"
            INSERT INTO users
                (user_id, name, email, password_hash, roles, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.roles)
        .bind(user.date_created)
        .bind(user.date_updated)
        .execute(&self.db)
        .await
        .context("inserting user")?;

        Ok(user)
    }
}
