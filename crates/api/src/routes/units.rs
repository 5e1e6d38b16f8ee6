//! Organizational unit routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use medfin_core::unit::UnitForm;
use medfin_db::UnitRepository;
use medfin_db::entities::organizational_units;
use medfin_shared::types::UnitId;
use serde::Deserialize;

use crate::{ActingUser, AppState, error::ApiResult};

/// Creates the unit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/units", get(list_units).post(create_unit))
        .route(
            "/units/{unit_id}",
            get(get_unit).patch(update_unit).delete(delete_unit),
        )
}

/// Query parameters for listing units.
#[derive(Debug, Default, Deserialize)]
pub struct ListUnitsQuery {
    /// Only active units.
    #[serde(default)]
    pub active: bool,
}

async fn list_units(
    State(state): State<AppState>,
    Query(query): Query<ListUnitsQuery>,
) -> ApiResult<Json<Vec<organizational_units::Model>>> {
    let units = UnitRepository::new(state.conn()).list(query.active).await?;
    Ok(Json(units))
}

async fn create_unit(
    State(state): State<AppState>,
    _user: ActingUser,
    Json(form): Json<UnitForm>,
) -> ApiResult<(StatusCode, Json<organizational_units::Model>)> {
    let input = form.validate()?;
    let unit = UnitRepository::new(state.conn()).create(input).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

async fn get_unit(
    State(state): State<AppState>,
    Path(unit_id): Path<i64>,
) -> ApiResult<Json<organizational_units::Model>> {
    let unit = UnitRepository::new(state.conn())
        .find(UnitId::new(unit_id))
        .await?;
    Ok(Json(unit))
}

async fn update_unit(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(unit_id): Path<i64>,
    Json(form): Json<UnitForm>,
) -> ApiResult<Json<organizational_units::Model>> {
    let input = form.validate()?;
    let unit = UnitRepository::new(state.conn())
        .update(UnitId::new(unit_id), input)
        .await?;
    Ok(Json(unit))
}

async fn delete_unit(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(unit_id): Path<i64>,
) -> ApiResult<StatusCode> {
    UnitRepository::new(state.conn())
        .delete(UnitId::new(unit_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
