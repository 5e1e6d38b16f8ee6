//! Dashboard route.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{Datelike, Utc};
use medfin_core::dashboard::DashboardView;
use medfin_db::DashboardRepository;
use serde::Deserialize;

use crate::{AppState, error::ApiResult};

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(show_dashboard))
}

/// Query parameters for the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Selected year; defaults to the current year.
    pub year: Option<i32>,
    /// Selected month; defaults to the current month.
    pub month: Option<u32>,
}

/// GET `/dashboard` - Financial summary, trend, budget comparison and recent activity.
async fn show_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardView>> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let view = DashboardRepository::new(state.conn())
        .view(year, month, state.config.ledger.recent_limit)
        .await?;
    Ok(Json(view))
}
