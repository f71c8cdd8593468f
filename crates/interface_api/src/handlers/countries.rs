//! Country catalog handlers

use axum::{extract::State, Json};

use domain_catalog::{Country, CountrySynchronizer, SyncSummary};

use crate::error::ApiError;
use crate::AppState;

/// Lists the persisted country catalog
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Country>>, ApiError> {
    let store = (state.country_stores)();
    Ok(Json(store.list_countries().await?))
}

/// Runs one synchronization pass against the external feed
pub async fn sync(State(state): State<AppState>) -> Result<Json<SyncSummary>, ApiError> {
    let synchronizer = CountrySynchronizer::new(state.feed.clone(), (state.country_stores)());
    Ok(Json(synchronizer.synchronize().await?))
}
