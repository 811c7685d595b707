use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/monthly", get(monthly_report))
}

pub async fn dashboard(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.holograms.dashboard().await {
        Ok(d) => (StatusCode::OK, Json(dto::dashboard_to_json(d))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn monthly_report(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::MonthlyReportQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()),
    };

    match services.holograms.monthly_report(query.month, query.year).await {
        Ok(report) => (StatusCode::OK, Json(dto::monthly_report_to_json(report))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
