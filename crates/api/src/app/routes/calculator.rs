use axum::{response::IntoResponse, Json};
use serde_json::Value;

use holotrack_issuance::calculate;

/// Bottles × cases. Bad or missing input yields zero rather than an error.
pub async fn calculate_holograms(body: Option<Json<Value>>) -> impl IntoResponse {
    let holograms = match body {
        Some(Json(body)) => calculate(body.get("bottles"), body.get("cases")),
        None => 0,
    };
    Json(serde_json::json!({ "holograms": holograms }))
}
