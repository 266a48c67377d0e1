//! Administrative commands behind the `sales-admin` binary.

pub mod keygen;
pub mod seed;

use anyhow::Context as _;
use chrono::Utc;
use sales_auth::{ROLE_ADMIN, ROLE_USER};
use sales_models::{NewUser, User};
use sqlx::PgPool;
use validator::Validate;

use crate::modules::users::service::{PgUserStore, UserStore};

pub use keygen::keygen;
pub use seed::seed;

/// Applies every pending schema migration.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("running migrations")?;
    Ok(())
}

/// Creates a user holding both the admin and user roles.
pub async fn useradd(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<User> {
    let new_user = NewUser {
        name: name.to_string(),
        email: email.to_string(),
        roles: vec![ROLE_ADMIN.to_string(), ROLE_USER.to_string()],
        password: password.to_string(),
        password_confirm: password.to_string(),
    };
    new_user.validate().context("invalid user details")?;

    let user = PgUserStore::new(pool.clone())
        .create(new_user, Utc::now())
        .await
        .context("creating user")?;

    Ok(user)
}
