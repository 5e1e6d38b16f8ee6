//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod budgets;
pub mod dashboard;
pub mod health;
pub mod transactions;
pub mod units;

#[cfg(test)]
mod tests;

/// Creates the `/api/v1` router.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(dashboard::routes())
        .merge(accounts::routes())
        .merge(units::routes())
        .merge(budgets::routes())
        .merge(transactions::routes(state.config.storage.max_file_size))
}
