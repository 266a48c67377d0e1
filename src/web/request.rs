use axum::{body::to_bytes, extract::Request};
use sales_core::AppError;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Largest request body accepted for decoding.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Reads the request body as JSON and validates it.
///
/// Malformed JSON is a 400 with the parser's message; validation failures are
/// a 400 listing every failed field.
pub async fn decode<T>(req: Request) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    let bytes = to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("reading request body: {}", e)))?;

    let value: T = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("decoding request body: {}", e)))?;

    value.validate().map_err(|e| AppError::validation(&e))?;

    Ok(value)
}
