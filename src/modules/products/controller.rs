use std::sync::Arc;

use axum::{
    RequestExt,
    extract::{Path, Request},
    http::StatusCode,
};
use sales_auth::{Claims, ROLE_ADMIN};
use sales_core::{AppError, StoreError};
use sales_models::{NewProduct, NewSale, Product, UpdateProduct};
use uuid::Uuid;

use crate::modules::products::service::ProductStore;
use crate::web::{Context, HandlerFuture, request::decode, respond};

/// A non-admin may only modify products they own.
pub fn can_modify(claims: &Claims, product: &Product) -> bool {
    claims.has_role(&[ROLE_ADMIN]) || claims.sub == product.user_id.to_string()
}

async fn product_id(req: &mut Request) -> Result<Uuid, AppError> {
    let Path(id) = req
        .extract_parts::<Path<String>>()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("{}", e.body_text())))?;

    Uuid::parse_str(&id).map_err(|_| StoreError::InvalidId.into_app_error())
}

pub struct ProductController {
    products: Arc<dyn ProductStore>,
}

impl ProductController {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    pub fn list<'a>(&'a self, ctx: &'a mut Context, _req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let products = self
                .products
                .list()
                .await
                .map_err(StoreError::into_app_error)?;

            respond(ctx, &products, StatusCode::OK)
        })
    }

    pub fn retrieve<'a>(&'a self, ctx: &'a mut Context, mut req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let id = product_id(&mut req).await?;
            let product = self
                .products
                .get_by_id(id)
                .await
                .map_err(StoreError::into_app_error)?;

            respond(ctx, &product, StatusCode::OK)
        })
    }

    pub fn create<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let owner = Uuid::parse_str(&ctx.claims()?.sub).map_err(|_| {
                AppError::unauthorized(anyhow::anyhow!("token subject is not a user id"))
            })?;
            let now = ctx.values()?.now;

            let new_product: NewProduct = decode(req).await?;
            let product = self
                .products
                .create(owner, new_product, now)
                .await
                .map_err(StoreError::into_app_error)?;

            respond(ctx, &product, StatusCode::CREATED)
        })
    }

    pub fn update<'a>(&'a self, ctx: &'a mut Context, mut req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let id = product_id(&mut req).await?;
            let update: UpdateProduct = decode(req).await?;
            let now = ctx.values()?.now;

            let mut product = self
                .products
                .get_by_id(id)
                .await
                .map_err(StoreError::into_app_error)?;

            if !can_modify(ctx.claims()?, &product) {
                return Err(StoreError::Forbidden.into_app_error());
            }

            update.apply(&mut product);
            product.date_updated = now;
            self.products
                .update(&product)
                .await
                .map_err(StoreError::into_app_error)?;

            respond(ctx, &(), StatusCode::NO_CONTENT)
        })
    }

    pub fn delete<'a>(&'a self, ctx: &'a mut Context, mut req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let id = product_id(&mut req).await?;
            self.products
                .delete(id)
                .await
                .map_err(StoreError::into_app_error)?;

            respond(ctx, &(), StatusCode::NO_CONTENT)
        })
    }

    pub fn add_sale<'a>(&'a self, ctx: &'a mut Context, mut req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let id = product_id(&mut req).await?;
            let new_sale: NewSale = decode(req).await?;
            let now = ctx.values()?.now;

            let sale = self
                .products
                .add_sale(id, new_sale, now)
                .await
                .map_err(StoreError::into_app_error)?;

            respond(ctx, &sale, StatusCode::CREATED)
        })
    }

    pub fn list_sales<'a>(&'a self, ctx: &'a mut Context, mut req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let id = product_id(&mut req).await?;
            let sales = self
                .products
                .list_sales(id)
                .await
                .map_err(StoreError::into_app_error)?;

            respond(ctx, &sales, StatusCode::OK)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sales_auth::ROLE_USER;

    fn product_owned_by(owner: Uuid) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "Comic Books".to_string(),
            cost: 50,
            quantity: 42,
            sold: 0,
            revenue: 0,
            user_id: owner,
            date_created: now,
            date_updated: now,
        }
    }

    fn claims(subject: Uuid, role: &str) -> Claims {
        Claims::new(subject.to_string(), [role], Utc::now(), Duration::hours(1)).unwrap()
    }

    #[test]
    fn test_owner_can_modify() {
        let owner = Uuid::new_v4();
        assert!(can_modify(&claims(owner, ROLE_USER), &product_owned_by(owner)));
    }

    #[test]
    fn test_other_user_cannot_modify() {
        let product = product_owned_by(Uuid::new_v4());
        assert!(!can_modify(&claims(Uuid::new_v4(), ROLE_USER), &product));
    }

    #[test]
    fn test_admin_can_modify_any_product() {
        let product = product_owned_by(Uuid::new_v4());
        assert!(can_modify(&claims(Uuid::new_v4(), ROLE_ADMIN), &product));
    }
}
