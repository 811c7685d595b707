use axum::{routing::{get, post}, Router};

pub mod calculator;
pub mod cartons;
pub mod issues;
pub mod reports;
pub mod stock;
pub mod system;

/// Router for all hologram endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(reports::dashboard))
        .route("/stock", get(stock::list_stock))
        .route("/stock/series/:series", get(stock::locate_series))
        .route("/api/calculate_holograms", post(calculator::calculate_holograms))
        .nest("/cartons", cartons::router())
        .nest("/issues", issues::router())
        .nest("/reports", reports::router())
}
