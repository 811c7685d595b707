use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use holotrack_infra::IssueOrder;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(list_issues).post(issue_holograms))
}

pub async fn issue_holograms(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::IssueHologramsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    let order = IssueOrder {
        issue_no: body.issue_no,
        total_required: body.total_required,
        permit_text: body.permits,
        issue_date: body.issue_date,
    };

    match services.holograms.issue_holograms(order).await {
        Ok(issue) => (StatusCode::CREATED, Json(dto::issue_to_json(issue))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_issues(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.holograms.issues().await {
        Ok(issues) => {
            let items = issues.into_iter().map(dto::issue_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
