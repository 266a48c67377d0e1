//! Product and sale models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// An item for sale, with totals aggregated from its sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    #[sqlx(rename = "product_id")]
    pub id: Uuid,
    pub name: String,
    /// Unit cost in cents
    pub cost: i32,
    /// Units originally stocked
    pub quantity: i32,
    /// Units sold across all sales
    pub sold: i64,
    /// Total paid across all sales
    pub revenue: i64,
    /// Owner of the product
    pub user_id: Uuid,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "name is a required field"))]
    pub name: String,
    #[validate(range(min = 0, message = "cost must be 0 or greater"))]
    pub cost: i32,
    #[validate(range(min = 1, message = "quantity must be 1 or greater"))]
    pub quantity: i32,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "cost must be 0 or greater"))]
    pub cost: Option<i32>,
    #[validate(range(min = 1, message = "quantity must be 1 or greater"))]
    pub quantity: Option<i32>,
}

impl UpdateProduct {
    /// Applies the present fields onto `product`.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(cost) = self.cost {
            product.cost = cost;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
    }
}

/// A single transaction against a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Sale {
    #[sqlx(rename = "sale_id")]
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Amount paid in cents
    pub paid: i32,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NewSale {
    #[validate(range(min = 0, message = "quantity must be 0 or greater"))]
    pub quantity: i32,
    #[validate(range(min = 0, message = "paid must be 0 or greater"))]
    pub paid: i32,
}
