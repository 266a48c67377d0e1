//! Route middlewares: token authentication and the role gate.

use std::sync::Arc;

use axum::{extract::Request, http::header};
use sales_auth::Authenticator;
use sales_core::AppError;
use tracing::debug;

use crate::web::{Context, Handler, HandlerFuture, Middleware};

const BEARER_FORMAT: &str = "expected authorization header format: Bearer <token>";

/// Extracts the token from an `Authorization` value of the form
/// `Bearer <token>`, matching the scheme case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

/// Verifies the bearer token and stores its claims in the context.
pub struct Authenticate {
    authenticator: Arc<Authenticator>,
}

impl Authenticate {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl Middleware for Authenticate {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(AuthenticateHandler {
            authenticator: self.authenticator.clone(),
            next,
        })
    }
}

struct AuthenticateHandler {
    authenticator: Arc<Authenticator>,
    next: Arc<dyn Handler>,
}

impl Handler for AuthenticateHandler {
    fn call<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(bearer_token)
                .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!(BEARER_FORMAT)))?;

            let claims = self.authenticator.parse_claims(token).map_err(|err| {
                debug!(trace_id = ?ctx.trace_id(), error = %err, "Token rejected");
                AppError::unauthorized(err)
            })?;

            ctx.set_claims(claims);
            self.next.call(ctx, req).await
        })
    }
}

/// Lets the request through only when the authenticated claims hold one of
/// the listed roles. Must be composed after [`Authenticate`].
pub struct Authorize {
    roles: Arc<[String]>,
}

impl Authorize {
    pub fn new(roles: &[&str]) -> Self {
        Self {
            roles: roles.iter().map(|role| role.to_string()).collect(),
        }
    }
}

impl Middleware for Authorize {
    fn name(&self) -> &'static str {
        "authorize"
    }

    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(AuthorizeHandler {
            roles: self.roles.clone(),
            next,
        })
    }
}

struct AuthorizeHandler {
    roles: Arc<[String]>,
    next: Arc<dyn Handler>,
}

impl Handler for AuthorizeHandler {
    fn call<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let roles: Vec<&str> = self.roles.iter().map(String::as_str).collect();
            if !ctx.claims()?.has_role(&roles) {
                return Err(AppError::forbidden(anyhow::anyhow!(
                    "you are not authorized for that action"
                )));
            }

            self.next.call(ctx, req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER abc"), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_forms() {
        for header in ["", "Bearer", "Bearer ", "Basic abc", "Bearer a b", "Bearerabc"] {
            assert_eq!(bearer_token(header), None, "{:?}", header);
        }
    }
}
