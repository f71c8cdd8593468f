//! Service handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use core_kernel::ServiceId;
use domain_providers::{
    CountryServices, NewService, ProviderServiceSummary, ServiceUpdate, ServiceWriter,
};

use crate::dto::OperationResponse;
use crate::error::{validated, ApiError};
use crate::AppState;

fn writer(state: &AppState) -> ServiceWriter {
    ServiceWriter::new((state.provider_stores)())
}

/// Creates a bare service row
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<NewService>,
) -> Result<Json<OperationResponse>, ApiError> {
    let input = validated(request)?;
    let id = writer(&state).create(input).await?;
    Ok(Json(OperationResponse::created(id)))
}

/// Updates a service's scalars and reconciles its country associations
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<ServiceUpdate>,
) -> Result<(StatusCode, Json<OperationResponse>), ApiError> {
    let input = validated(request)?;
    let outcome = writer(&state).update(input).await?;
    let (code, body) = OperationResponse::from_outcome(outcome);
    Ok((code, Json(body)))
}

/// Deletes a service together with its country and provider links
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<OperationResponse>), ApiError> {
    let outcome = writer(&state).delete(ServiceId::new(id)).await?;
    let (code, body) = OperationResponse::from_outcome(outcome);
    Ok((code, Json(body)))
}

#[derive(Debug, Deserialize)]
pub struct ByProviderQuery {
    /// Substring matched against provider names
    #[serde(default)]
    pub name: String,
}

/// Services offered by providers whose name contains the fragment
pub async fn by_provider(
    State(state): State<AppState>,
    Query(query): Query<ByProviderQuery>,
) -> Result<Json<Vec<ProviderServiceSummary>>, ApiError> {
    Ok(Json(
        writer(&state).services_by_provider_name(&query.name).await?,
    ))
}

/// Services available in the given country, grouped by country name
pub async fn by_country(
    State(state): State<AppState>,
    Path(iso): Path<String>,
) -> Result<Json<Vec<CountryServices>>, ApiError> {
    Ok(Json(writer(&state).services_by_country(&iso).await?))
}
