use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use sales_core::AppError;
use serde::Serialize;
use tracing::warn;

use super::context::Context;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Writes `data` as JSON and records `status` in the request values.
///
/// A 204 carries no body.
pub fn respond<T>(ctx: &mut Context, data: &T, status: StatusCode) -> Result<Response, AppError>
where
    T: Serialize + ?Sized,
{
    let values = ctx.values_mut()?;
    if values.responses() > 0 {
        warn!(trace_id = %values.trace_id, status = status.as_u16(), "Response already written for request");
    }
    values.record_response(status);

    if status == StatusCode::NO_CONTENT {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = status;
        return Ok(response);
    }

    let body = serde_json::to_vec(data)?;
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );

    Ok(response)
}

/// Writes the client-visible form of `err`.
pub fn respond_error(ctx: &mut Context, err: &AppError) -> Result<Response, AppError> {
    respond(ctx, &err.to_error_response(), err.status())
}

/// Response used when nothing in the chain could answer.
pub(crate) fn fallback_internal_error() -> Response {
    let body = serde_json::json!({ "error": "Internal Server Error" }).to_string();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    response
}
