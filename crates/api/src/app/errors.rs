use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use holotrack_core::DomainError;
use holotrack_infra::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Concurrency(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        e @ StoreError::Database { .. } => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::DuplicateIdentifier { .. } => {
            json_error(StatusCode::CONFLICT, "duplicate_identifier", message)
        }
        DomainError::InvalidRange { .. } => json_error(StatusCode::BAD_REQUEST, "invalid_range", message),
        DomainError::InvalidCapacity { .. } => json_error(StatusCode::BAD_REQUEST, "invalid_capacity", message),
        DomainError::InvalidPermitDate { .. } => {
            json_error(StatusCode::BAD_REQUEST, "invalid_permit_date", message)
        }
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock", message)
        }
        DomainError::Exhausted { .. } | DomainError::AllocationRace { .. } => {
            json_error(StatusCode::CONFLICT, "allocation_race", message)
        }
        DomainError::CartonInUse(_) => json_error(StatusCode::CONFLICT, "carton_in_use", message),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
