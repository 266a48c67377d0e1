use anyhow::Context as _;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sales_core::StoreError;
use sales_models::{NewProduct, NewSale, Product, Sale};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Persistence for products and their sales.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product with sold/revenue totals.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Product, StoreError>;

    async fn create(
        &self,
        owner: Uuid,
        new_product: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, StoreError>;

    /// Writes name, cost, quantity and date_updated of `product`.
    async fn update(&self, product: &Product) -> Result<(), StoreError>;

    /// Deleting a missing product is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn add_sale(
        &self,
        product_id: Uuid,
        new_sale: NewSale,
        now: DateTime<Utc>,
    ) -> Result<Sale, StoreError>;

    async fn list_sales(&self, product_id: Uuid) -> Result<Vec<Sale>, StoreError>;
}

const SELECT_PRODUCTS: &str = r#"
    SELECT
        p.product_id, p.name, p.cost, p.quantity, p.user_id,
        p.date_created, p.date_updated,
        COALESCE(SUM(s.quantity), 0)::BIGINT AS sold,
        COALESCE(SUM(s.paid), 0)::BIGINT AS revenue
    FROM products AS p
    LEFT JOIN sales AS s ON p.product_id = s.product_id
"#;

/// Foreign key violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone, Debug)]
pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let query = format!(
            "{} GROUP BY p.product_id ORDER BY p.date_created",
            SELECT_PRODUCTS
        );
        let products = sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.db)
            .await
            .context("selecting products")?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Product, StoreError> {
        let query = format!(
            "{} WHERE p.product_id = $1 GROUP BY p.product_id",
            SELECT_PRODUCTS
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("selecting single product")?
            .ok_or(StoreError::NotFound("product"))
    }

    #[instrument(skip(self, new_product))]
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

        sqlx::query(
            r#"
            INSERT INTO products
                (product_id, user_id, name, cost, quantity, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.id)
        .bind(product.user_id)
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.quantity)
        .bind(product.date_created)
        .bind(product.date_updated)
        .execute(&self.db)
        .await
        .context("inserting product")?;

        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, cost = $3, quantity = $4, date_updated = $5
            WHERE product_id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.quantity)
        .bind(product.date_updated)
        .execute(&self.db)
        .await
        .context("updating product")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("deleting product")?;

        Ok(())
    }

    #[instrument(skip(self, new_sale))]
    async fn add_sale(
        &self,
        product_id: Uuid,
        new_sale: NewSale,
        now: DateTime<Utc>,
    ) -> Result<Sale, StoreError> {
        let sale = Sale {
            id: Uuid::new_v4(),
            product_id,
            quantity: new_sale.quantity,
            paid: new_sale.paid,
            date_created: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO sales (sale_id, product_id, quantity, paid, date_created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(sale.id)
        .bind(sale.product_id)
        .bind(sale.quantity)
        .bind(sale.paid)
        .bind(sale.date_created)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(sale),
            Err(sqlx::Error::Database(err)) if err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                Err(StoreError::NotFound("product"))
            }
            Err(err) => Err(anyhow::Error::new(err).context("inserting sale").into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_sales(&self, product_id: Uuid) -> Result<Vec<Sale>, StoreError> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT sale_id, product_id, quantity, paid, date_created
            FROM sales
            WHERE product_id = $1
            ORDER BY date_created
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await
        .context("selecting sales")?;

        Ok(sales)
    }
}
