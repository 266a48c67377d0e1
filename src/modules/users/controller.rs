use std::sync::Arc;

use axum::{RequestExt, extract::Request, http::StatusCode};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use chrono::Duration;
use sales_auth::Authenticator;
use sales_core::{AppError, StoreError};
use serde::Serialize;
use tracing::info;

use crate::modules::users::service::UserStore;
use crate::web::{Context, HandlerFuture, respond};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub struct UserController {
    users: Arc<dyn UserStore>,
    authenticator: Arc<Authenticator>,
    token_ttl: Duration,
}

impl UserController {
    pub fn new(
        users: Arc<dyn UserStore>,
        authenticator: Arc<Authenticator>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            authenticator,
            token_ttl,
        }
    }

    /// Exchanges Basic auth credentials for a signed token.
    pub fn token<'a>(&'a self, ctx: &'a mut Context, mut req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let now = ctx.values()?.now;

            let TypedHeader(Authorization(basic)) = req
                .extract_parts::<TypedHeader<Authorization<Basic>>>()
                .await
                .map_err(|_| {
                    AppError::unauthorized(anyhow::anyhow!(
                        "must provide email and password in Basic auth"
                    ))
                })?;

            let claims = self
                .users
                .authenticate(basic.username(), basic.password(), now, self.token_ttl)
                .await
                .map_err(StoreError::into_app_error)?;

            let token = self.authenticator.generate_token(&claims)?;
            info!(subject = %claims.sub, "Issued token");

            respond(ctx, &TokenResponse { token }, StatusCode::OK)
        })
    }
}
