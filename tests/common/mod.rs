#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use sales_api::metrics::Metrics;
use sales_api::modules::health::service::StatusCheck;
use sales_api::modules::products::service::ProductStore;
use sales_api::modules::users::service::UserStore;
use sales_api::router::build_app;
use sales_api::state::AppState;
use sales_api::web::{App, ShutdownReceiver, shutdown};
use sales_auth::{Authenticator, Claims, KeyRing, ROLE_ADMIN, ROLE_USER};
use sales_core::{StoreError, hash_password_with_cost, verify_password};
use sales_models::{NewProduct, NewSale, NewUser, Product, Sale, User};
use tower::ServiceExt;
use uuid::Uuid;

pub const KID: &str = "54bb2165-71e1-41a6-af3e-7da4a0e1e2c1";
pub const OTHER_KID: &str = "0fd8b9d5-a8c4-4ac3-9e21-2f3bd7a0c4b8";

const PRIVATE_PEM: &[u8] =
    include_bytes!("../../crates/sales-auth/testdata/private/54bb2165-71e1-41a6-af3e-7da4a0e1e2c1.pem");
const PUBLIC_PEM: &[u8] =
    include_bytes!("../../crates/sales-auth/testdata/keys/54bb2165-71e1-41a6-af3e-7da4a0e1e2c1.pem");
const OTHER_PRIVATE_PEM: &[u8] =
    include_bytes!("../../crates/sales-auth/testdata/private/0fd8b9d5-a8c4-4ac3-9e21-2f3bd7a0c4b8.pem");

pub const PASSWORD: &str = "gophers";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "user@example.com";

/// Authenticator signing with [`KID`] and verifying only [`KID`].
pub fn authenticator() -> Arc<Authenticator> {
    let ring = KeyRing::new();
    ring.insert_pem(KID, PUBLIC_PEM).unwrap();

    let authenticator = Authenticator::builder()
        .private_key_pem(PRIVATE_PEM)
        .unwrap()
        .active_kid(KID)
        .algorithm("RS256")
        .key_lookup(ring)
        .build()
        .unwrap();
    Arc::new(authenticator)
}

/// Signs with a key the application's key ring does not know.
pub fn foreign_authenticator() -> Authenticator {
    let ring = KeyRing::new();
    Authenticator::builder()
        .private_key_pem(OTHER_PRIVATE_PEM)
        .unwrap()
        .active_kid(OTHER_KID)
        .algorithm("RS256")
        .key_lookup(ring)
        .build()
        .unwrap()
}

#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<HashMap<Uuid, Product>>,
    sales: Mutex<Vec<Sale>>,
}

impl MemoryProductStore {
    fn with_totals(&self, mut product: Product) -> Product {
        let id = product.id;
        let sales = self.sales.lock().unwrap();
        let sales = sales.iter().filter(|s| s.product_id == id);
        product.sold = sales.clone().map(|s| i64::from(s.quantity)).sum();
        product.revenue = sales.map(|s| i64::from(s.paid)).sum();
        product
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        Ok(products.into_iter().map(|p| self.with_totals(p)).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Product, StoreError> {
        let product = self
            .products
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("product"))?;
        Ok(self.with_totals(product))
    }

    async fn create(
        &self,
        owner: Uuid,
        new_product: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, StoreError> {
        let product = Product {
            id: Uuid::new_v4(),
            name: new_product.name,
            cost: new_product.cost,
            quantity: new_product.quantity,
            sold: 0,
            revenue: 0,
            user_id: owner,
            date_created: now,
            date_updated: now,
        };
        self.products
            .lock()
            .unwrap()
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let mut products = self.products.lock().unwrap();
        let stored = products
            .get_mut(&product.id)
            .ok_or(StoreError::NotFound("product"))?;
        stored.name = product.name.clone();
        stored.cost = product.cost;
        stored.quantity = product.quantity;
        stored.date_updated = product.date_updated;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.products.lock().unwrap().remove(&id);
        self.sales.lock().unwrap().retain(|s| s.product_id != id);
        Ok(())
    }

    async fn add_sale(
        &self,
        product_id: Uuid,
        new_sale: NewSale,
        now: DateTime<Utc>,
    ) -> Result<Sale, StoreError> {
        if !self.products.lock().unwrap().contains_key(&product_id) {
            return Err(StoreError::NotFound("product"));
        }
        let sale = Sale {
            id: Uuid::new_v4(),
            product_id,
            quantity: new_sale.quantity,
            paid: new_sale.paid,
            date_created: now,
        };
        self.sales.lock().unwrap().push(sale.clone());
        Ok(sale)
    }

    async fn list_sales(&self, product_id: Uuid) -> Result<Vec<Sale>, StoreError> {
        Ok(self
            .sales
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.product_id == product_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Claims, StoreError> {
        let user = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::AuthenticationFailure)?;

        if !verify_password(password, &user.password_hash).unwrap() {
            return Err(StoreError::AuthenticationFailure);
        }
        Ok(Claims::new(user.id.to_string(), user.roles, now, ttl).unwrap())
    }

    async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            roles: new_user.roles,
            password_hash: hash_password_with_cost(&new_user.password, 4).unwrap(),
            date_created: now,
            date_updated: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

pub struct StubStatus {
    pub healthy: bool,
}

#[async_trait]
impl StatusCheck for StubStatus {
    async fn status_check(&self) -> anyhow::Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(anyhow::anyhow!("connection refused"))
        }
    }
}

pub struct TestApp {
    pub state: AppState,
    pub products: Arc<MemoryProductStore>,
    pub admin: User,
    pub user: User,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_health(true).await
    }

    pub async fn with_health(healthy: bool) -> Self {
        let products = Arc::new(MemoryProductStore::default());
        let users = Arc::new(MemoryUserStore::default());

        let admin = users
            .create(new_user("Admin Gopher", ADMIN_EMAIL, &[ROLE_ADMIN, ROLE_USER]), Utc::now())
            .await
            .unwrap();
        let user = users
            .create(new_user("User Gopher", USER_EMAIL, &[ROLE_USER]), Utc::now())
            .await
            .unwrap();

        let state = AppState {
            authenticator: authenticator(),
            products: products.clone(),
            users,
            health: Arc::new(StubStatus { healthy }),
            metrics: Arc::new(Metrics::new()),
            token_ttl: Duration::hours(1),
        };

        Self {
            state,
            products,
            admin,
            user,
        }
    }

    pub fn app(&self) -> (App, ShutdownReceiver) {
        let (signal, receiver) = shutdown::channel();
        (build_app(&self.state, signal), receiver)
    }

    pub fn router(&self) -> (Router, ShutdownReceiver) {
        let (app, receiver) = self.app();
        (app.into_router(), receiver)
    }

    pub fn token_for(&self, user: &User) -> String {
        let claims = Claims::new(user.id.to_string(), user.roles.clone(), Utc::now(), Duration::hours(1))
            .unwrap();
        self.state.authenticator.generate_token(&claims).unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token_for(&self.admin)
    }

    pub fn user_token(&self) -> String {
        self.token_for(&self.user)
    }

    pub async fn seed_product(&self, owner: &User, name: &str) -> Product {
        self.products
            .create(
                owner.id,
                NewProduct {
                    name: name.to_string(),
                    cost: 25,
                    quantity: 10,
                },
                Utc::now(),
            )
            .await
            .unwrap()
    }
}

fn new_user(name: &str, email: &str, roles: &[&str]) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        password: PASSWORD.to_string(),
        password_confirm: PASSWORD.to_string(),
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
