use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::{ApiError, CREATE_FAILED, INVALID_URL, MISSING_SHORT_CODE};
use crate::models::{UrlPayload, UrlRecord, UrlStats};
use crate::storage::RecordStore;

pub struct AppState {
    pub store: RecordStore,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

fn require_url(payload: Result<Json<UrlPayload>, JsonRejection>) -> Result<String, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        ApiError::Validation(INVALID_URL)
    })?;

    payload
        .valid_url()
        .map(str::to_string)
        .ok_or(ApiError::Validation(INVALID_URL))
}

fn require_code(short_code: &str) -> Result<&str, ApiError> {
    if short_code.is_empty() {
        return Err(ApiError::Validation(MISSING_SHORT_CODE));
    }
    Ok(short_code)
}

/// Create a new shortened URL
pub async fn create_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UrlPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<UrlRecord>), ApiError> {
    let url = require_url(payload)?;

    let record = state
        .store
        .create(&url)
        .await
        .map_err(|err| ApiError::from(err).with_public_message(CREATE_FAILED))?;

    tracing::info!(short_code = %record.short_code, "created short URL");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Look up a short URL, counting the access
pub async fn get_url(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> Result<Json<UrlRecord>, ApiError> {
    let short_code = require_code(&short_code)?;

    match state.store.increment_access(short_code).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::storage(e)),
    }
}

/// Point an existing short code at a new URL
pub async fn update_url(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
    payload: Result<Json<UrlPayload>, JsonRejection>,
) -> Result<Json<UrlRecord>, ApiError> {
    let short_code = require_code(&short_code)?;
    let url = require_url(payload)?;

    match state.store.update_url(short_code, &url).await {
        Ok(Some(record)) => {
            tracing::info!(short_code = %record.short_code, "updated short URL");
            Ok(Json(record))
        }
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::storage(e)),
    }
}

/// Delete a short URL
pub async fn delete_url(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let short_code = require_code(&short_code)?;

    match state.store.delete(short_code).await {
        Ok(true) => {
            tracing::info!(short_code = %short_code, "deleted short URL");
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::storage(e)),
    }
}

/// Access statistics; does not count as an access
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> Result<Json<UrlStats>, ApiError> {
    let short_code = require_code(&short_code)?;

    match state.store.find_by_code(short_code).await {
        Ok(Some(record)) => Ok(Json(record.into())),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::storage(e)),
    }
}

/// `/shorten/` with an empty code segment
pub async fn missing_short_code() -> ApiError {
    ApiError::Validation(MISSING_SHORT_CODE)
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
