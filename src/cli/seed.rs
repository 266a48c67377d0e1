use anyhow::Context as _;
use chrono::Utc;
use sales_auth::{ROLE_ADMIN, ROLE_USER};
use sales_core::hash_password_with_cost;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Password shared by the seeded accounts.
pub const SEED_PASSWORD: &str = "gophers";

pub const ADMIN_ID: Uuid = Uuid::from_u128(0x5cf37266_3473_4006_984f_9325122678b7);
pub const USER_ID: Uuid = Uuid::from_u128(0x45b5fbd3_755f_4379_8f07_a58d4a30fa2f);

const COMIC_BOOKS_ID: Uuid = Uuid::from_u128(0xa2b0639f_2cc6_44b8_b97b_15d69dbb511e);
const MCDONALDS_TOYS_ID: Uuid = Uuid::from_u128(0x72f8b983_3eb4_48db_9ed0_e45cc6bd716b);

struct SeedUser {
    id: Uuid,
    name: &'static str,
    email: &'static str,
    roles: &'static [&'static str],
}

struct SeedProduct {
    id: Uuid,
    name: &'static str,
    cost: i32,
    quantity: i32,
}

const USERS: [SeedUser; 2] = [
    SeedUser {
        id: ADMIN_ID,
        name: "Admin Gopher",
        email: "admin@example.com",
        roles: &[ROLE_ADMIN, ROLE_USER],
    },
    SeedUser {
        id: USER_ID,
        name: "User Gopher",
        email: "user@example.com",
        roles: &[ROLE_USER],
    },
];

const PRODUCTS: [SeedProduct; 2] = [
    SeedProduct {
        id: COMIC_BOOKS_ID,
        name: "Comic Books",
        cost: 50,
        quantity: 42,
    },
    SeedProduct {
        id: MCDONALDS_TOYS_ID,
        name: "McDonalds Toys",
        cost: 75,
        quantity: 120,
    },
];

// (sale_id, product_id, quantity, paid)
const SALES: [(Uuid, Uuid, i32, i32); 4] = [
    (Uuid::from_u128(0x98b6d4b8_f04b_4c79_8c2e_a0aef46854b7), COMIC_BOOKS_ID, 2, 100),
    (Uuid::from_u128(0x85f6fb09_eb05_4874_ae39_82d1a30fe0d7), COMIC_BOOKS_ID, 5, 250),
    (Uuid::from_u128(0xa235be9e_ab5d_44e6_a987_fa1c749264c7), MCDONALDS_TOYS_ID, 3, 225),
    (Uuid::from_u128(0x0a6f7c52_1f2c_4c1e_9d3b_7e8a2b4f6d10), MCDONALDS_TOYS_ID, 1, 75),
];

/// Hash stored for every seeded account.
fn seed_password_hash(cost: u32) -> anyhow::Result<String> {
    hash_password_with_cost(SEED_PASSWORD, cost)
        .map_err(|e| anyhow::anyhow!("hashing seed password: {}", e))
}

/// Inserts the demo accounts, products and sales. Rows that already exist are
/// left untouched, so seeding twice is harmless.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let password_hash = seed_password_hash(bcrypt::DEFAULT_COST)?;

    let mut tx = pool.begin().await.context("starting seed transaction")?;

    for user in &USERS {
        let roles: Vec<String> = user.roles.iter().map(|r| r.to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO users
                (user_id, name, email, roles, password_hash, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(user.name)
        .bind(user.email)
        .bind(&roles)
        .bind(&password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("seeding user {}", user.email))?;
    }

    for product in &PRODUCTS {
        sqlx::query(
            r#"
            INSERT INTO products
                (product_id, user_id, name, cost, quantity, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(product.id)
        .bind(ADMIN_ID)
        .bind(product.name)
        .bind(product.cost)
        .bind(product.quantity)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("seeding product {}", product.name))?;
    }

    for (sale_id, product_id, quantity, paid) in SALES {
        sqlx::query(
            r#"
            INSERT INTO sales (sale_id, product_id, quantity, paid, date_created)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(quantity)
        .bind(paid)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("seeding sale")?;
    }

    tx.commit().await.context("committing seed data")?;
    info!(
        users = USERS.len(),
        products = PRODUCTS.len(),
        sales = SALES.len(),
        "Seed data loaded"
    );
    Ok(())
}
