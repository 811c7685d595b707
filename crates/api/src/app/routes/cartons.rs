use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_carton))
        .route("/:carton_no", delete(delete_carton))
}

pub async fn create_carton(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateCartonRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services
        .holograms
        .add_carton(&body.carton_no, body.start_series, body.end_series)
        .await
    {
        Ok(stock) => (StatusCode::CREATED, Json(dto::carton_stock_to_json(stock))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_carton(
    Extension(services): Extension<Arc<AppServices>>,
    Path(carton_no): Path<String>,
) -> axum::response::Response {
    match services.holograms.delete_carton(&carton_no).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
