//! API Handlers
//!
//! HTTP request handlers for each service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::cache::{CacheManager, Lookup};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::models::{
    CleanupErrorsRequest, DeleteResponse, GetResponse, InvalidateRequest, ListErrorsQuery,
    PutCacheRequest, RemovedResponse, SetResponse, StatsResponse,
};
use crate::monitoring::{HealthReport, HealthStatus};
use crate::recovery::{CapturedError, ErrorContext, ErrorHandler, ErrorLog, ErrorStats};
use crate::validation::{
    validate_json, validate_json_batch, BatchValidation, RecordKind, ValidationResult,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheManager,
    pub errors: Arc<ErrorHandler>,
}

impl AppState {
    pub fn new(cache: CacheManager, errors: ErrorHandler) -> Self {
        Self {
            cache,
            errors: Arc::new(errors),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CacheManager::new(config.cache_settings()),
            ErrorHandler::new(config.retry_policy(), config.error_log_capacity),
        )
    }
}

// == Cache ==

/// Handler for PUT /cache/:key
///
/// Failed writes are recorded in the error log before being returned.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutCacheRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate(&key) {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    if let Err(e) = state.cache.set(key.clone(), req.value, req.ttl_ms).await {
        let context = ErrorContext::new("cache_set")
            .component("api")
            .with("key", key);
        state
            .errors
            .handle_error(CapturedError::from_error(&e), context)
            .await;
        return Err(e);
    }

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /cache/:key
///
/// Never fetches; expired entries inside the stale window are returned with
/// `stale: true`.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.peek(&key).await {
        Lookup::Fresh(value) => Ok(Json(GetResponse::new(key, value, false))),
        Lookup::Stale(value) => Ok(Json(GetResponse::new(key, value, true))),
        Lookup::Miss => Err(ServiceError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&key).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<RemovedResponse>> {
    let pattern = req.into_pattern()?;
    let removed = state.cache.invalidate(Some(&pattern)).await;
    Ok(Json(RemovedResponse { removed }))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

// == Validation ==

fn parse_kind(kind: &str) -> Result<RecordKind> {
    kind.parse().map_err(ServiceError::InvalidRequest)
}

/// Handler for POST /validate/:kind
///
/// An invalid record is still a 200; the verdict is in the body.
pub async fn validate_handler(
    Path(kind): Path<String>,
    Json(record): Json<Value>,
) -> Result<Json<ValidationResult>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(validate_json(kind, &record)))
}

/// Handler for POST /validate/:kind/batch
pub async fn validate_batch_handler(
    Path(kind): Path<String>,
    Json(records): Json<Vec<Value>>,
) -> Result<Json<BatchValidation<Value>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(validate_json_batch(kind, records)))
}

// == Error Log ==

/// Handler for GET /errors
pub async fn list_errors_handler(
    State(state): State<AppState>,
    Query(query): Query<ListErrorsQuery>,
) -> Json<Vec<ErrorLog>> {
    Json(state.errors.recent(query.limit).await)
}

/// Handler for GET /errors/stats
pub async fn error_stats_handler(State(state): State<AppState>) -> Json<ErrorStats> {
    Json(state.errors.stats().await)
}

/// Handler for POST /errors/:id/resolve
pub async fn resolve_error_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ErrorLog>> {
    Ok(Json(state.errors.resolve(id).await?))
}

/// Handler for POST /errors/cleanup
pub async fn cleanup_errors_handler(
    State(state): State<AppState>,
    Json(req): Json<CleanupErrorsRequest>,
) -> Result<Json<RemovedResponse>> {
    let max_age = i64::try_from(req.max_age_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| ServiceError::InvalidRequest("max_age_secs is too large".to_string()))?;

    let removed = state.errors.cleanup(max_age).await;
    Ok(Json(RemovedResponse { removed }))
}

// == Health ==

/// Handler for GET /health
///
/// Responds 503 while unresolved critical errors are held.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = HealthReport::assess(&state.cache.stats().await, &state.errors.stats().await);
    let status = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheSettings;
    use crate::recovery::RetryPolicy;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(
            CacheManager::new(CacheSettings::default()),
            ErrorHandler::new(RetryPolicy::no_retry(), 100),
        )
    }

    fn put(value: Value, ttl_ms: Option<u64>) -> Json<PutCacheRequest> {
        Json(PutCacheRequest { value, ttl_ms })
    }

    #[tokio::test]
    async fn test_put_and_get_handler() {
        let state = test_state();

        let result = put_handler(
            State(state.clone()),
            Path("brands:top".to_string()),
            put(json!({"v": 1}), None),
        )
        .await;
        assert!(result.is_ok());

        let response = get_handler(State(state), Path("brands:top".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"v": 1}));
        assert!(!response.stale);
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(test_state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        put_handler(
            State(state.clone()),
            Path("to_delete".to_string()),
            put(json!("value"), None),
        )
        .await
        .unwrap();

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = get_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_oversized_put_is_logged() {
        let state = AppState::new(
            CacheManager::new(CacheSettings {
                max_bytes: 16,
                ..CacheSettings::default()
            }),
            ErrorHandler::default(),
        );

        let result = put_handler(
            State(state.clone()),
            Path("big".to_string()),
            put(json!("a string well past sixteen bytes"), None),
        )
        .await;

        assert!(matches!(result, Err(ServiceError::ValueTooLarge { .. })));
        let logs = state.errors.recent(10).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].context.operation.as_deref(), Some("cache_set"));
    }

    #[tokio::test]
    async fn test_validate_handler_unknown_kind() {
        let result = validate_handler(Path("store".to_string()), Json(json!({}))).await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_validate_handler_returns_verdict() {
        let response = validate_handler(
            Path("brand".to_string()),
            Json(json!({"name": "Alaska", "revenue": -0.01})),
        )
        .await
        .unwrap();
        assert!(!response.is_valid);
    }

    #[tokio::test]
    async fn test_resolve_unknown_error() {
        let result = resolve_error_handler(State(test_state()), Path(Uuid::new_v4())).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_health_handler_statuses() {
        let state = test_state();
        let (status, report) = health_handler(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.status, HealthStatus::Healthy);

        state
            .errors
            .handle_error(
                CapturedError::new("Error", "fatal: disk corrupt"),
                ErrorContext::new("snapshot"),
            )
            .await;
        let (status, report) = health_handler(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, HealthStatus::Unhealthy);
    }
}
