use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub async fn list_stock(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let cartons = match services.holograms.stock().await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };

    let total_available: u64 = cartons.iter().map(|c| c.total_available).sum();
    let items = cartons
        .into_iter()
        .map(dto::carton_stock_to_json)
        .collect::<Vec<_>>();

    (
        StatusCode::OK,
        Json(serde_json::json!({ "items": items, "total_available": total_available })),
    )
        .into_response()
}

pub async fn locate_series(
    Extension(services): Extension<Arc<AppServices>>,
    series: Result<Path<u64>, PathRejection>,
) -> axum::response::Response {
    let Path(series) = match series {
        Ok(p) => p,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_series", "series must be a positive integer"),
    };

    match services.holograms.locate_series(series).await {
        Ok(location) => (StatusCode::OK, Json(dto::series_location_to_json(location))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
